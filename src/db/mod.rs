// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (PostgreSQL).

pub mod postgres;

pub use postgres::{LoginOutcome, PgDb, UserStatsSummary, WorkoutGrant};
