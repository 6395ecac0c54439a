// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Workout Cards: collectible athlete cards earned by finishing workouts
//!
//! This crate provides the backend API for phone-number login, workout
//! completion with rarity-weighted card rewards, card collections, the
//! leaderboard and per-user stats.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use db::PgDb;
use services::RewardRng;

/// Shared application state.
pub struct AppState {
    pub db: PgDb,
    pub rewards: RewardRng,
}
