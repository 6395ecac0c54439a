// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Game routes, dispatched on the `action` query parameter.

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::models::stats::rank_entries;
use crate::models::{AthleteCard, LeaderboardEntry, OwnedCard, Rarity, RarityStats};
use crate::routes::{endpoint_not_found, parse_json_body};
use crate::services::{Difficulty, RarityWeights};
use crate::time_utils::{format_utc_rfc3339, today_utc};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/game",
        get(game_get)
            .post(game_post)
            .head(endpoint_not_found)
            .fallback(endpoint_not_found),
    )
}

#[derive(Debug, Deserialize)]
struct GameQuery {
    #[serde(default)]
    action: String,
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

impl GameQuery {
    fn require_user_id(&self) -> Result<i64> {
        let raw = self
            .user_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::BadRequest("userId is required".to_string()))?;

        raw.parse()
            .map_err(|_| AppError::BadRequest("userId must be an integer".to_string()))
    }
}

async fn game_get(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<GameQuery>, QueryRejection>,
) -> Result<Response> {
    let Query(query) = query?;
    match query.action.as_str() {
        "collection" => Ok(collection(&state, query.require_user_id()?).await?.into_response()),
        "leaderboard" => Ok(leaderboard(&state).await?.into_response()),
        "stats" => Ok(stats(&state, query.require_user_id()?).await?.into_response()),
        "rarity-table" => Ok(rarity_table().into_response()),
        _ => Err(AppError::EndpointNotFound),
    }
}

async fn game_post(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<GameQuery>, QueryRejection>,
    body: Bytes,
) -> Result<Json<CompleteWorkoutResponse>> {
    let Query(query) = query?;
    match query.action.as_str() {
        "complete-workout" => complete_workout(&state, &body).await,
        _ => Err(AppError::EndpointNotFound),
    }
}

// ─── Complete Workout ────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompleteWorkoutRequest {
    #[serde(default)]
    user_id: Option<i64>,
    #[serde(default)]
    difficulty: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CompleteWorkoutResponse {
    pub card: AthleteCard,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub points: i64,
    pub week_workouts: i32,
    pub was_weekly_bonus: bool,
}

async fn complete_workout(state: &AppState, body: &[u8]) -> Result<Json<CompleteWorkoutResponse>> {
    let request: CompleteWorkoutRequest = parse_json_body(body)?;

    // Zero counts as absent.
    let (Some(user_id), Some(difficulty)) = (
        request.user_id.filter(|&id| id != 0),
        request.difficulty.filter(|&d| d != 0),
    ) else {
        return Err(AppError::BadRequest(
            "userId and difficulty are required".to_string(),
        ));
    };
    let difficulty = Difficulty::try_from(difficulty)?;

    let mut rng = state.rewards.fork();
    let grant = state
        .db
        .complete_workout_atomic(user_id, difficulty, today_utc(), &mut rng)
        .await?;

    Ok(Json(CompleteWorkoutResponse {
        card: grant.card,
        points: grant.points,
        week_workouts: grant.week_workouts,
        was_weekly_bonus: grant.was_weekly_bonus,
    }))
}

// ─── Collection ──────────────────────────────────────────────

/// Collection entry: catalog metadata plus grant time.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CollectionCard {
    #[serde(flatten)]
    pub card: AthleteCard,
    pub obtained_at: String,
}

impl From<OwnedCard> for CollectionCard {
    fn from(owned: OwnedCard) -> Self {
        Self {
            card: owned.card,
            obtained_at: format_utc_rfc3339(owned.obtained_at),
        }
    }
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CollectionResponse {
    pub cards: Vec<CollectionCard>,
}

async fn collection(state: &AppState, user_id: i64) -> Result<Json<CollectionResponse>> {
    let cards = state.db.get_collection(user_id).await?;
    tracing::debug!(user_id, count = cards.len(), "Fetched collection");

    Ok(Json(CollectionResponse {
        cards: cards.into_iter().map(CollectionCard::from).collect(),
    }))
}

// ─── Leaderboard ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LeaderboardResponse {
    pub leaderboard: Vec<LeaderboardEntry>,
}

async fn leaderboard(state: &AppState) -> Result<Json<LeaderboardResponse>> {
    let rows = state.db.get_leaderboard().await?;

    Ok(Json(LeaderboardResponse {
        leaderboard: rank_entries(rows),
    }))
}

// ─── Stats ───────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StatsResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_points: i64,
    pub week_workouts: i32,
    /// Owned cards per rarity
    pub rarity_stats: RarityStats,
    /// Catalog size per rarity
    pub catalog_stats: RarityStats,
}

async fn stats(state: &AppState, user_id: i64) -> Result<Json<StatsResponse>> {
    let summary = state
        .db
        .get_user_stats(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    let catalog_stats = state.db.get_catalog_stats().await?;

    Ok(Json(StatsResponse {
        total_points: summary.total_points,
        week_workouts: summary.week_workouts,
        rarity_stats: summary.rarity_stats,
        catalog_stats,
    }))
}

// ─── Rarity Table ────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DifficultyOdds {
    pub level: u8,
    #[serde(flatten)]
    pub weights: RarityWeights,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RarityPoints {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub common: i64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub rare: i64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub epic: i64,
}

/// Draw odds and point values, so clients need not hardcode them.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RarityTableResponse {
    pub difficulties: Vec<DifficultyOdds>,
    pub points: RarityPoints,
}

fn rarity_table() -> Json<RarityTableResponse> {
    Json(RarityTableResponse {
        difficulties: Difficulty::all()
            .map(|d| DifficultyOdds {
                level: d.level(),
                weights: d.weights(),
            })
            .collect(),
        points: RarityPoints {
            common: Rarity::Common.points(),
            rare: Rarity::Rare.points(),
            epic: Rarity::Epic.points(),
        },
    })
}
