// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! User model and weekly workout window.

use chrono::NaiveDate;

/// Length of a weekly bonus window in days.
pub const WINDOW_DAYS: i64 = 7;

/// Workouts per window; the counter wraps at this value.
pub const WORKOUTS_PER_WINDOW: i32 = 3;

/// User row as returned to the client after login.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub phone: String,
    pub total_points: i64,
    pub week_workouts: i32,
}

/// The weekly bonus counter and the day its window opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct WeekState {
    pub week_workouts: i32,
    pub week_start_date: Option<NaiveDate>,
}

impl WeekState {
    /// Roll the window forward if it has elapsed as of `today`.
    ///
    /// An expired window resets the counter to zero and restarts on `today`.
    /// A missing start date opens a fresh window on `today` without touching
    /// the counter.
    pub fn advance(self, today: NaiveDate) -> Self {
        match self.week_start_date {
            Some(start) if (today - start).num_days() >= WINDOW_DAYS => Self {
                week_workouts: 0,
                week_start_date: Some(today),
            },
            Some(_) => self,
            None => Self {
                week_start_date: Some(today),
                ..self
            },
        }
    }

    /// The third workout of a window earns the bonus.
    pub fn is_bonus_workout(&self) -> bool {
        self.week_workouts == WORKOUTS_PER_WINDOW - 1
    }

    /// Counter value after recording one more workout.
    pub fn next_count(&self) -> i32 {
        (self.week_workouts + 1) % WORKOUTS_PER_WINDOW
    }
}
