// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use workout_cards::config::Config;
use workout_cards::db::PgDb;
use workout_cards::routes::create_router;
use workout_cards::services::RewardRng;
use workout_cards::AppState;

/// Check if a test database is available via environment variable.
#[allow(dead_code)]
pub fn database_available() -> bool {
    std::env::var("TEST_DATABASE_URL").is_ok()
}

/// Skip test with message if no test database is configured.
#[macro_export]
macro_rules! require_database {
    () => {
        if !crate::common::database_available() {
            eprintln!("⚠️  Skipping: TEST_DATABASE_URL not set");
            return;
        }
    };
}

/// Connect to the test database and apply migrations.
#[allow(dead_code)]
pub async fn test_db() -> PgDb {
    let mut config = Config::test_default();
    config.database_url =
        std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");

    let db = PgDb::new(&config)
        .await
        .expect("Failed to connect to test database");
    db.migrate().await.expect("Failed to run migrations");
    db
}

/// Connect to a fresh, migrated schema that no other test shares.
///
/// Returns the raw pool as well so a test can reshape the seed catalog.
/// Drop the schema with [`drop_scratch_schema`] when done.
#[allow(dead_code)]
pub async fn scratch_db() -> (PgDb, PgPool, String) {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    let schema = format!("scratch_{}", unique_phone().trim_start_matches('+'));

    let admin = PgPool::connect(&url)
        .await
        .expect("Failed to connect to test database");
    sqlx::query(&format!("CREATE SCHEMA {}", schema))
        .execute(&admin)
        .await
        .expect("Failed to create scratch schema");

    let search_path = format!("SET search_path TO {}", schema);
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .after_connect(move |conn, _meta| {
            let sql = search_path.clone();
            Box::pin(async move {
                sqlx::query(&sql).execute(&mut *conn).await?;
                Ok(())
            })
        })
        .connect(&url)
        .await
        .expect("Failed to connect scratch pool");

    let db = PgDb::from_pool(pool.clone());
    db.migrate().await.expect("Failed to run migrations");
    (db, pool, schema)
}

#[allow(dead_code)]
pub async fn drop_scratch_schema(pool: &PgPool, schema: &str) {
    sqlx::query(&format!("DROP SCHEMA {} CASCADE", schema))
        .execute(pool)
        .await
        .expect("Failed to drop scratch schema");
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> PgDb {
    PgDb::new_mock()
}

/// Build a router over the given database with a seeded reward source.
#[allow(dead_code)]
pub fn create_app_with_db(db: PgDb) -> axum::Router {
    let rewards = RewardRng::new(Config::test_default().reward_seed);
    let state = Arc::new(AppState { db, rewards });
    create_router(state)
}

/// Create a test app with an offline database.
#[allow(dead_code)]
pub fn create_test_app() -> axum::Router {
    create_app_with_db(test_db_offline())
}

/// A phone number no other test run will use.
#[allow(dead_code)]
pub fn unique_phone() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("+7{}", nanos % 10_000_000_000_000)
}

#[allow(dead_code)]
pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap()
}

#[allow(dead_code)]
pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Read a JSON response body.
#[allow(dead_code)]
pub async fn json_body(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).expect("Response body should be JSON")
}
