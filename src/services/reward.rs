// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reward drafting for completed workouts.
//!
//! Planning a reward is a pure function of the user's week state, the
//! workout difficulty, the current date and a random generator:
//! 1. Roll the weekly window forward if it expired
//! 2. Force an epic card on the third workout of the window (weekly bonus)
//! 3. Otherwise draw a rarity with difficulty-dependent weights
//! 4. Pick a card uniformly from the catalog pool of that rarity
//!
//! Storage is left to the caller; see `PgDb::complete_workout_atomic`.

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::sync::Mutex;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::AppError;
use crate::models::{AthleteCard, Rarity, WeekState};

/// Workout difficulty, 1 (beginner) through 4 (hardest).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Difficulty(u8);

impl Difficulty {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    pub fn all() -> impl Iterator<Item = Difficulty> {
        (Self::MIN..=Self::MAX).map(Difficulty)
    }

    pub fn level(self) -> u8 {
        self.0
    }

    /// Rarity odds for this difficulty, in percent.
    pub fn weights(self) -> RarityWeights {
        match self.0 {
            1 => RarityWeights::new(80, 15, 5),
            2 => RarityWeights::new(70, 20, 10),
            3 => RarityWeights::new(60, 25, 15),
            _ => RarityWeights::new(50, 30, 20),
        }
    }
}

impl TryFrom<i64> for Difficulty {
    type Error = AppError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Difficulty(value as u8))
        } else {
            Err(AppError::BadRequest(format!(
                "difficulty must be between {} and {}",
                Self::MIN,
                Self::MAX
            )))
        }
    }
}

/// Percent chance of each rarity. Every row sums to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RarityWeights {
    pub common: u32,
    pub rare: u32,
    pub epic: u32,
}

impl RarityWeights {
    const fn new(common: u32, rare: u32, epic: u32) -> Self {
        Self { common, rare, epic }
    }

    pub fn total(&self) -> u32 {
        self.common + self.rare + self.epic
    }

    /// Map a roll in `[0, 100)` onto the common, rare and epic bands in order.
    pub fn rarity_for_roll(&self, roll: f64) -> Rarity {
        if roll < f64::from(self.common) {
            Rarity::Common
        } else if roll < f64::from(self.common + self.rare) {
            Rarity::Rare
        } else {
            Rarity::Epic
        }
    }

    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Rarity {
        self.rarity_for_roll(rng.gen_range(0.0..100.0))
    }
}

/// Outcome of the rarity stage of a workout reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkoutPlan {
    pub rarity: Rarity,
    pub is_weekly_bonus: bool,
    /// Week state to persist after this workout.
    pub next_week: WeekState,
}

impl WorkoutPlan {
    pub fn points(&self) -> i64 {
        self.rarity.points()
    }
}

/// Decide rarity, bonus and the following week state for one workout.
pub fn plan_workout<R: Rng + ?Sized>(
    week: WeekState,
    difficulty: Difficulty,
    today: NaiveDate,
    rng: &mut R,
) -> WorkoutPlan {
    let current = week.advance(today);
    let is_weekly_bonus = current.is_bonus_workout();

    let rarity = if is_weekly_bonus {
        Rarity::Epic
    } else {
        difficulty.weights().draw(rng)
    };

    WorkoutPlan {
        rarity,
        is_weekly_bonus,
        next_week: WeekState {
            week_workouts: current.next_count(),
            week_start_date: current.week_start_date,
        },
    }
}

/// Pick one card uniformly from a rarity pool.
pub fn pick_card<'a, R: Rng + ?Sized>(
    pool: &'a [AthleteCard],
    rng: &mut R,
) -> Result<&'a AthleteCard, AppError> {
    pool.choose(rng).ok_or(AppError::NoCardsAvailable)
}

/// Source of per-request reward generators.
///
/// With a seed, every generator is derived from one seeded master so a
/// sequence of requests replays identically. Without one, each request
/// gets a generator seeded from OS entropy.
pub struct RewardRng {
    master: Option<Mutex<ChaCha8Rng>>,
}

impl RewardRng {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            master: seed.map(|s| Mutex::new(ChaCha8Rng::seed_from_u64(s))),
        }
    }

    pub fn is_seeded(&self) -> bool {
        self.master.is_some()
    }

    /// Generator for a single request.
    pub fn fork(&self) -> ChaCha8Rng {
        match &self.master {
            Some(master) => {
                // A poisoned lock still holds a usable generator.
                let mut master = master.lock().unwrap_or_else(|e| e.into_inner());
                ChaCha8Rng::seed_from_u64(master.gen())
            }
            None => ChaCha8Rng::from_entropy(),
        }
    }
}
