//! Daily quota tracking for outbound provider calls

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use tracing::info;

/// Snapshot of the quota counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaState {
    pub daily_limit: u32,
    pub used_today: u32,
    pub last_reset_date: NaiveDate,
}

impl QuotaState {
    pub fn new(daily_limit: u32) -> Self {
        Self {
            daily_limit,
            used_today: 0,
            last_reset_date: today(),
        }
    }

    pub fn remaining(&self) -> u32 {
        self.daily_limit.saturating_sub(self.used_today)
    }

    fn roll_over(&mut self, today: NaiveDate) {
        if today != self.last_reset_date {
            info!(
                "Resetting daily quota ({} of {} used on {})",
                self.used_today, self.daily_limit, self.last_reset_date
            );
            self.used_today = 0;
            self.last_reset_date = today;
        }
    }
}

/// Daily counter gating provider calls
///
/// The counter resets when the local calendar date changes.
#[derive(Debug)]
pub struct QuotaTracker {
    state: Mutex<QuotaState>,
}

impl QuotaTracker {
    pub fn new(daily_limit: u32) -> Self {
        Self::with_state(QuotaState::new(daily_limit))
    }

    /// Start from an existing state
    pub fn with_state(state: QuotaState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Whether another call is allowed today
    pub fn check_quota(&self) -> bool {
        self.check_quota_on(today())
    }

    /// Count one call, regardless of its outcome
    pub fn consume(&self) {
        self.consume_on(today());
    }

    /// Check and consume in one step; returns false without consuming when exhausted
    pub fn try_acquire(&self) -> bool {
        self.try_acquire_on(today())
    }

    pub fn snapshot(&self) -> QuotaState {
        let mut state = self.lock();
        state.roll_over(today());
        *state
    }

    pub fn daily_limit(&self) -> u32 {
        self.lock().daily_limit
    }

    pub(crate) fn check_quota_on(&self, today: NaiveDate) -> bool {
        let mut state = self.lock();
        state.roll_over(today);
        state.used_today < state.daily_limit
    }

    pub(crate) fn consume_on(&self, today: NaiveDate) {
        let mut state = self.lock();
        state.roll_over(today);
        state.used_today = state.used_today.saturating_add(1);
    }

    pub(crate) fn try_acquire_on(&self, today: NaiveDate) -> bool {
        let mut state = self.lock();
        state.roll_over(today);
        if state.used_today < state.daily_limit {
            state.used_today += 1;
            true
        } else {
            false
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, QuotaState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for QuotaTracker {
    fn default() -> Self {
        Self::new(1000)
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
