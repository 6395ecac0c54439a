// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod card;
pub mod stats;
pub mod user;

pub use card::{AthleteCard, OwnedCard, Rarity};
pub use stats::{LeaderboardEntry, LeaderboardRow, RarityStats};
pub use user::{User, WeekState};
