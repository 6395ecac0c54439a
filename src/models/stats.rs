// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Per-rarity card counts and leaderboard rows.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::Rarity;

/// Number of leaderboard entries returned.
pub const LEADERBOARD_LIMIT: i64 = 100;

/// Card counts broken down by rarity. Rarities with no cards count as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RarityStats {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub common: i64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub rare: i64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub epic: i64,
}

impl RarityStats {
    /// Build from `(rarity, count)` rows as produced by a `GROUP BY rarity` query.
    pub fn from_counts<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (Rarity, i64)>,
    {
        let mut stats = Self::default();
        for (rarity, count) in rows {
            *stats.slot_mut(rarity) += count;
        }
        stats
    }

    pub fn total(&self) -> i64 {
        self.common + self.rare + self.epic
    }

    fn slot_mut(&mut self, rarity: Rarity) -> &mut i64 {
        match rarity {
            Rarity::Common => &mut self.common,
            Rarity::Rare => &mut self.rare,
            Rarity::Epic => &mut self.epic,
        }
    }
}

/// Raw leaderboard row from the store, before masking.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LeaderboardRow {
    pub user_id: i64,
    pub phone: String,
    pub total_points: i64,
    pub card_count: i64,
}

/// Public leaderboard entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LeaderboardEntry {
    pub rank: u32,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub user_id: i64,
    pub phone: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub points: i64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub card_count: i64,
}

/// Rank rows that are already ordered by points, starting at 1.
pub fn rank_entries(rows: Vec<LeaderboardRow>) -> Vec<LeaderboardEntry> {
    rows.into_iter()
        .zip(1..)
        .map(|(row, rank)| LeaderboardEntry {
            rank,
            user_id: row.user_id,
            phone: mask_phone(&row.phone),
            points: row.total_points,
            card_count: row.card_count,
        })
        .collect()
}

/// Keep only the last four characters of a phone number.
///
/// Shorter numbers are returned whole; an empty number becomes `****`.
pub fn mask_phone(phone: &str) -> String {
    if phone.is_empty() {
        return "****".to_string();
    }
    let count = phone.chars().count();
    phone.chars().skip(count.saturating_sub(4)).collect()
}
