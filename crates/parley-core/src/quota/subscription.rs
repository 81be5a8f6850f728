//! Subscription tracker: paid windows that bypass the daily quota.

use chrono::{Datelike, Duration, NaiveDateTime};
use parley_types::error::{QuotaError, RepositoryError};
use parley_types::quota::SubscriptionWindow;
use parley_types::user::UserId;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::quota::MAX_CAS_ATTEMPTS;
use crate::repository::subscription::SubscriptionRepository;

/// Latest year a window may end in; stored dates carry a four-digit year.
pub const MAX_END_YEAR: i32 = 9999;

/// `from + duration_days`, or `None` when the result is not representable.
fn window_end(from: NaiveDateTime, duration_days: i64) -> Option<NaiveDateTime> {
    Duration::try_days(duration_days)
        .and_then(|duration| from.checked_add_signed(duration))
        .filter(|end| end.year() <= MAX_END_YEAR)
}

/// Answers "is this user subscribed?" and extends or opens windows.
///
/// Generic over `SubscriptionRepository` and `Clock` so it can run against
/// SQLite in production and in-memory fakes in tests.
pub struct SubscriptionTracker<S: SubscriptionRepository, C: Clock> {
    repo: S,
    clock: C,
}

impl<S: SubscriptionRepository, C: Clock> SubscriptionTracker<S, C> {
    pub fn new(repo: S, clock: C) -> Self {
        Self { repo, clock }
    }

    pub fn repo(&self) -> &S {
        &self.repo
    }

    /// Whether the user holds a window whose end is strictly in the future.
    pub async fn is_active(&self, user_id: UserId) -> Result<bool, RepositoryError> {
        let now = self.clock.now();
        Ok(self
            .repo
            .fetch_subscription(user_id)
            .await?
            .is_some_and(|window| window.is_active_at(now)))
    }

    /// Open a new window or extend the active one by `duration_days`.
    ///
    /// An active window keeps its start and gains `duration_days` on its end.
    /// An expired or missing window is replaced by `[now, now + duration)`.
    /// A duration that is not positive, or that would push the end past
    /// [`MAX_END_YEAR`], is rejected with `InvalidAmount`.
    pub async fn activate(
        &self,
        user_id: UserId,
        duration_days: i64,
    ) -> Result<SubscriptionWindow, QuotaError> {
        if duration_days <= 0 {
            return Err(QuotaError::InvalidAmount(duration_days));
        }

        for attempt in 1..=MAX_CAS_ATTEMPTS {
            let now = self.clock.now();
            let current = self.repo.fetch_subscription(user_id).await?;

            let (start, from) = match &current {
                Some(window) if window.is_active_at(now) => (window.start, window.end),
                _ => (now, now),
            };
            let end =
                window_end(from, duration_days).ok_or(QuotaError::InvalidAmount(duration_days))?;
            let next = SubscriptionWindow {
                user_id,
                start,
                end,
            };

            if self
                .repo
                .compare_and_set_subscription(current.as_ref(), &next)
                .await?
            {
                info!(
                    user_id = %user_id,
                    days = duration_days,
                    end = %next.end,
                    extended = current.as_ref().is_some_and(|w| w.start == next.start),
                    "Subscription activated"
                );
                return Ok(next);
            }
            debug!(user_id = %user_id, attempt, "Subscription changed concurrently, retrying");
        }

        Err(RepositoryError::Conflict(format!(
            "subscription for user {user_id} kept changing during activation"
        ))
        .into())
    }

    /// Whole days left on the active window, `None` without one.
    pub async fn status_days_left(
        &self,
        user_id: UserId,
    ) -> Result<Option<i64>, RepositoryError> {
        let now = self.clock.now();
        Ok(self
            .repo
            .fetch_subscription(user_id)
            .await?
            .and_then(|window| window.days_left_at(now)))
    }
}
