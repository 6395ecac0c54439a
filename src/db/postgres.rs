// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! PostgreSQL pool wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (login-or-register, week state)
//! - Athlete cards (rarity pools, catalog counts)
//! - User cards and workout history (grants, collection, leaderboard)

use chrono::NaiveDate;
use rand::Rng;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgExecutor, PgPool};

use crate::config::Config;
use crate::error::AppError;
use crate::models::stats::LEADERBOARD_LIMIT;
use crate::models::{AthleteCard, LeaderboardRow, OwnedCard, Rarity, RarityStats, User, WeekState};
use crate::services::reward::{self, Difficulty};

/// Embedded schema and seed migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Result of a login-or-register call.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    /// `true` if the phone number was not known before this call.
    pub created: bool,
}

#[derive(sqlx::FromRow)]
struct LoginRow {
    #[sqlx(flatten)]
    user: User,
    created: bool,
}

/// Everything granted by one completed workout.
#[derive(Debug, Clone)]
pub struct WorkoutGrant {
    pub card: AthleteCard,
    pub points: i64,
    pub week_workouts: i32,
    pub was_weekly_bonus: bool,
}

/// Totals shown on the stats screen.
#[derive(Debug, Clone)]
pub struct UserStatsSummary {
    pub total_points: i64,
    pub week_workouts: i32,
    pub rarity_stats: RarityStats,
}

#[derive(sqlx::FromRow)]
struct UserTotals {
    total_points: i64,
    week_workouts: i32,
}

#[derive(sqlx::FromRow)]
struct RarityCount {
    #[sqlx(try_from = "String")]
    rarity: Rarity,
    count: i64,
}

/// PostgreSQL database client.
#[derive(Clone)]
pub struct PgDb {
    pool: Option<PgPool>,
}

impl PgDb {
    /// Connect a pool using the configured limits.
    pub async fn new(config: &Config) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(config.database_acquire_timeout)
            .connect(&config.database_url)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to database: {}", e)))?;

        tracing::info!(
            max_connections = config.database_max_connections,
            "Connected to PostgreSQL"
        );

        Ok(Self { pool: Some(pool) })
    }

    /// Wrap an existing pool (used by integration tests).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool: Some(pool) }
    }

    /// Create a mock client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { pool: None }
    }

    /// Helper to get the pool or return an error if offline.
    fn pool(&self) -> Result<&PgPool, AppError> {
        self.pool
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Apply embedded migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        MIGRATOR
            .run(self.pool()?)
            .await
            .map_err(|e| AppError::Database(format!("Migration failed: {}", e)))?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Find the user for `phone`, creating one with default totals if needed.
    ///
    /// A single upsert statement, so concurrent first logins for one phone
    /// number resolve to the same row. Existing users get `last_login`
    /// bumped; new rows open their first window on `today`.
    pub async fn login_or_register(
        &self,
        phone: &str,
        today: NaiveDate,
    ) -> Result<LoginOutcome, AppError> {
        let row: LoginRow = sqlx::query_as(
            r#"
            INSERT INTO users (phone, week_start_date) VALUES ($1, $2)
            ON CONFLICT (phone) DO UPDATE SET last_login = NOW()
            RETURNING id, phone, total_points, week_workouts, (xmax = 0) AS created
            "#,
        )
        .bind(phone)
        .bind(today)
        .fetch_one(self.pool()?)
        .await?;

        Ok(LoginOutcome {
            user: row.user,
            created: row.created,
        })
    }

    /// Get a user's stored week state, if the user exists.
    pub async fn get_week_state(&self, user_id: i64) -> Result<Option<WeekState>, AppError> {
        Ok(
            sqlx::query_as("SELECT week_workouts, week_start_date FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(self.pool()?)
                .await?,
        )
    }

    /// Overwrite a user's week state. Test and maintenance helper.
    pub async fn set_week_state(&self, user_id: i64, week: WeekState) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE users SET week_workouts = $1, week_start_date = $2 WHERE id = $3",
        )
        .bind(week.week_workouts)
        .bind(week.week_start_date)
        .bind(user_id)
        .execute(self.pool()?)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    // ─── Card Operations ─────────────────────────────────────────

    /// Number of catalog cards per rarity.
    pub async fn get_catalog_stats(&self) -> Result<RarityStats, AppError> {
        let rows: Vec<RarityCount> =
            sqlx::query_as("SELECT rarity, COUNT(*) AS count FROM athlete_cards GROUP BY rarity")
                .fetch_all(self.pool()?)
                .await?;

        Ok(RarityStats::from_counts(
            rows.into_iter().map(|r| (r.rarity, r.count)),
        ))
    }

    /// Cards granted to a user, newest first.
    pub async fn get_collection(&self, user_id: i64) -> Result<Vec<OwnedCard>, AppError> {
        Ok(sqlx::query_as(
            r#"
            SELECT ac.id, ac.name, ac.rarity, ac.image_url, ac.fact, ac.sport, uc.obtained_at
            FROM user_cards uc
            JOIN athlete_cards ac ON uc.card_id = ac.id
            WHERE uc.user_id = $1
            ORDER BY uc.obtained_at DESC, uc.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool()?)
        .await?)
    }

    /// Top users by points, with their card counts.
    pub async fn get_leaderboard(&self) -> Result<Vec<LeaderboardRow>, AppError> {
        Ok(sqlx::query_as(
            r#"
            SELECT u.id AS user_id, u.phone, u.total_points, COUNT(uc.id) AS card_count
            FROM users u
            LEFT JOIN user_cards uc ON u.id = uc.user_id
            GROUP BY u.id
            ORDER BY u.total_points DESC, u.id ASC
            LIMIT $1
            "#,
        )
        .bind(LEADERBOARD_LIMIT)
        .fetch_all(self.pool()?)
        .await?)
    }

    /// Points, week counter and owned-card breakdown for one user.
    pub async fn get_user_stats(&self, user_id: i64) -> Result<Option<UserStatsSummary>, AppError> {
        let pool = self.pool()?;

        let totals: Option<UserTotals> =
            sqlx::query_as("SELECT total_points, week_workouts FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(pool)
                .await?;

        let Some(totals) = totals else {
            return Ok(None);
        };

        let rows: Vec<RarityCount> = sqlx::query_as(
            r#"
            SELECT ac.rarity, COUNT(*) AS count
            FROM user_cards uc
            JOIN athlete_cards ac ON uc.card_id = ac.id
            WHERE uc.user_id = $1
            GROUP BY ac.rarity
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(Some(UserStatsSummary {
            total_points: totals.total_points,
            week_workouts: totals.week_workouts,
            rarity_stats: RarityStats::from_counts(rows.into_iter().map(|r| (r.rarity, r.count))),
        }))
    }

    // ─── Atomic Workout Completion ───────────────────────────────

    /// Atomically complete a workout: draft a card, record the grant and
    /// history entry, and update the user's points and week state.
    ///
    /// The user row is locked for the whole transaction, so concurrent
    /// workouts for the same user serialize instead of losing updates.
    /// Any error drops the transaction, which rolls it back.
    ///
    /// There is no idempotency key: a retried request grants another card.
    pub async fn complete_workout_atomic<R: Rng + Send>(
        &self,
        user_id: i64,
        difficulty: Difficulty,
        today: NaiveDate,
        rng: &mut R,
    ) -> Result<WorkoutGrant, AppError> {
        let mut tx = self.pool()?.begin().await?;

        // 1. Lock and read the week state
        let week: WeekState = sqlx::query_as(
            "SELECT week_workouts, week_start_date FROM users WHERE id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        // 2. Decide rarity, bonus and next week state
        let plan = reward::plan_workout(week, difficulty, today, rng);

        // 3. Draft a card from the rarity pool
        let pool = cards_by_rarity(&mut *tx, plan.rarity).await?;

        let card = reward::pick_card(&pool, rng)?.clone();
        let points = plan.points();
        let level = i32::from(difficulty.level());

        // 4. Record the grant and the workout
        sqlx::query(
            "INSERT INTO user_cards (user_id, card_id, difficulty_level, was_weekly_bonus) VALUES ($1, $2, $3, $4)",
        )
        .bind(user_id)
        .bind(card.id)
        .bind(level)
        .bind(plan.is_weekly_bonus)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO workout_history (user_id, difficulty_level, card_id) VALUES ($1, $2, $3)",
        )
        .bind(user_id)
        .bind(level)
        .bind(card.id)
        .execute(&mut *tx)
        .await?;

        // 5. Update totals and week state
        sqlx::query(
            r#"
            UPDATE users
            SET total_points = total_points + $1, week_workouts = $2, week_start_date = $3
            WHERE id = $4
            "#,
        )
        .bind(points)
        .bind(plan.next_week.week_workouts)
        .bind(plan.next_week.week_start_date)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        // 6. Commit
        tx.commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(
            user_id,
            card_id = card.id,
            rarity = %card.rarity,
            points,
            week_workouts = plan.next_week.week_workouts,
            weekly_bonus = plan.is_weekly_bonus,
            "Workout completed"
        );

        Ok(WorkoutGrant {
            card,
            points,
            week_workouts: plan.next_week.week_workouts,
            was_weekly_bonus: plan.is_weekly_bonus,
        })
    }
}

/// Catalog pool for one rarity, in id order so seeded picks are stable.
async fn cards_by_rarity<'e, E: PgExecutor<'e>>(
    executor: E,
    rarity: Rarity,
) -> Result<Vec<AthleteCard>, AppError> {
    Ok(sqlx::query_as(
        "SELECT id, name, rarity, image_url, fact, sport FROM athlete_cards WHERE rarity = $1 ORDER BY id",
    )
    .bind(rarity.as_str())
    .fetch_all(executor)
    .await?)
}
