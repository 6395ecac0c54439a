// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod reward;

pub use reward::{Difficulty, RarityWeights, RewardRng, WorkoutPlan};
