// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Phone-number login and registration.
//!
//! The phone number alone identifies a user. No password, OTP or session
//! token is issued or checked.

use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::routes::{parse_json_body, validation_message};
use crate::time_utils::today_utc;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/auth",
        post(login).fallback(|| async { AppError::MethodNotAllowed }),
    )
}

/// Login request body.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(max = 32, message = "Phone number is too long"))]
    pub phone: String,
}

/// Login response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LoginResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub user_id: i64,
    pub phone: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_points: i64,
    pub week_workouts: i32,
}

/// Look up or create the user for a phone number.
async fn login(State(state): State<Arc<AppState>>, body: Bytes) -> Result<Json<LoginResponse>> {
    let mut request: LoginRequest = parse_json_body(&body)?;
    request.phone = request.phone.trim().to_string();

    if request.phone.is_empty() {
        return Err(AppError::BadRequest("Phone number is required".to_string()));
    }
    request
        .validate()
        .map_err(|e| AppError::BadRequest(validation_message(&e)))?;

    let outcome = state
        .db
        .login_or_register(&request.phone, today_utc())
        .await?;

    tracing::info!(
        user_id = outcome.user.id,
        created = outcome.created,
        "User logged in"
    );

    Ok(Json(LoginResponse {
        user_id: outcome.user.id,
        phone: outcome.user.phone,
        total_points: outcome.user.total_points,
        week_workouts: outcome.user.week_workouts,
    }))
}
