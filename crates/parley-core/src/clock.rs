//! Wall clock abstraction.
//!
//! Quota days and subscription windows are measured in the store's local
//! time. Services read the time through [`Clock`] so day rollover and expiry
//! can be exercised deterministically.

use chrono::{Local, NaiveDate, NaiveDateTime, SubsecRound};

/// Source of the current local date and time.
pub trait Clock: Send + Sync {
    /// Current local time, truncated to whole seconds (the storage precision).
    fn now(&self) -> NaiveDateTime;

    /// Current local calendar date.
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// The process wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local().trunc_subsecs(0)
    }
}
