// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Athlete card catalog model and rarity tiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Card rarity tier. Determines both draw odds and points awarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
}

impl Rarity {
    pub const ALL: [Rarity; 3] = [Rarity::Common, Rarity::Rare, Rarity::Epic];

    /// Points awarded for a grant of this rarity.
    pub fn points(self) -> i64 {
        match self {
            Rarity::Common => 10,
            Rarity::Rare => 20,
            Rarity::Epic => 30,
        }
    }

    /// Name as stored in the `athlete_cards.rarity` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown rarity: {0:?}")]
pub struct RarityParseError(String);

impl FromStr for Rarity {
    type Err = RarityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "common" => Ok(Rarity::Common),
            "rare" => Ok(Rarity::Rare),
            "epic" => Ok(Rarity::Epic),
            other => Err(RarityParseError(other.to_string())),
        }
    }
}

impl TryFrom<String> for Rarity {
    type Error = RarityParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Catalog entry from `athlete_cards`. Immutable reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AthleteCard {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: i64,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub rarity: Rarity,
    pub image_url: Option<String>,
    pub fact: String,
    pub sport: String,
}

/// A card in a user's collection: catalog metadata plus when it was granted.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OwnedCard {
    #[sqlx(flatten)]
    pub card: AthleteCard,
    pub obtained_at: DateTime<Utc>,
}
