//! Quota ledger: per-user daily message counters.
//!
//! Each user has a single counter row tagged with the date it was last
//! written. A row dated before today is stale and counts as zero; the next
//! admitted message overwrites it with `{today, 1}`. Credit grants subtract
//! from the count, so it may go negative and admit more than `daily_limit`
//! messages on the day of the grant.
//!
//! Every write is a compare-and-set against the row that was read. When a
//! concurrent writer wins, the transition is recomputed from a fresh read so
//! two racing requests can never both take the last slot.

use parley_types::error::{QuotaError, RepositoryError};
use parley_types::quota::{MessagesLeft, QuotaDecision, UsageCounter, UserStatus};
use parley_types::user::UserId;
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::quota::MAX_CAS_ATTEMPTS;
use crate::quota::subscription::SubscriptionTracker;
use crate::repository::subscription::SubscriptionRepository;
use crate::repository::usage::UsageRepository;

/// Next count if one more message is admitted, `None` if the quota is spent.
fn admit(current: Option<&UsageCounter>, today: NaiveDate, daily_limit: i64) -> Option<i64> {
    match current {
        Some(counter) if counter.is_current(today) => {
            (counter.count < daily_limit).then_some(counter.count + 1)
        }
        _ => (daily_limit >= 1).then_some(1),
    }
}

/// Reported messages left for a user without a subscription.
///
/// A credit grant can push the raw figure above the limit; that value is
/// shown as-is. Otherwise it is clamped at zero.
fn messages_left(today_count: i64, daily_limit: i64) -> i64 {
    let raw = daily_limit.saturating_sub(today_count);
    if raw > daily_limit { raw } else { raw.max(0) }
}

/// Daily quota accounting on top of a usage repository and a subscription
/// tracker.
pub struct QuotaLedger<U: UsageRepository, S: SubscriptionRepository, C: Clock> {
    usage: U,
    tracker: SubscriptionTracker<S, C>,
    clock: C,
}

impl<U, S, C> QuotaLedger<U, S, C>
where
    U: UsageRepository,
    S: SubscriptionRepository,
    C: Clock + Clone,
{
    pub fn new(usage: U, subscriptions: S, clock: C) -> Self {
        Self {
            usage,
            tracker: SubscriptionTracker::new(subscriptions, clock.clone()),
            clock,
        }
    }

    /// The subscription tracker the ledger consults for status reports.
    pub fn tracker(&self) -> &SubscriptionTracker<S, C> {
        &self.tracker
    }

    /// Count one message against today's quota if there is room.
    ///
    /// A denial writes nothing. Store failures are returned immediately;
    /// only lost compare-and-set races are retried.
    pub async fn check_and_increment(
        &self,
        user_id: UserId,
        daily_limit: i64,
    ) -> Result<QuotaDecision, RepositoryError> {
        for attempt in 1..=MAX_CAS_ATTEMPTS {
            let today = self.clock.today();
            let current = self.usage.fetch_counter(user_id).await?;

            let Some(next_count) = admit(current.as_ref(), today, daily_limit) else {
                debug!(user_id = %user_id, daily_limit, "Daily limit reached");
                return Ok(QuotaDecision::LimitReached);
            };

            let next = UsageCounter::new(user_id, today, next_count);
            if self
                .usage
                .compare_and_set_counter(current.as_ref(), &next)
                .await?
            {
                debug!(user_id = %user_id, count = next_count, "Message counted");
                return Ok(QuotaDecision::Allowed);
            }
            debug!(user_id = %user_id, attempt, "Usage counter changed concurrently, retrying");
        }

        Err(RepositoryError::Conflict(format!(
            "usage counter for user {user_id} kept changing during quota check"
        )))
    }

    /// Grant `amount` extra messages for today and return the new count.
    ///
    /// The count is lowered by `amount`, going negative if needed. A stale
    /// row is treated as zero and replaced.
    pub async fn increase_credit(
        &self,
        user_id: UserId,
        amount: i64,
    ) -> Result<i64, QuotaError> {
        for attempt in 1..=MAX_CAS_ATTEMPTS {
            let today = self.clock.today();
            let current = self.usage.fetch_counter(user_id).await?;
            let today_count = current.as_ref().map_or(0, |c| c.count_on(today));

            let next = UsageCounter::new(user_id, today, today_count.saturating_sub(amount));
            if self
                .usage
                .compare_and_set_counter(current.as_ref(), &next)
                .await?
            {
                info!(user_id = %user_id, amount, count = next.count, "Credit granted");
                return Ok(next.count);
            }
            debug!(user_id = %user_id, attempt, "Usage counter changed concurrently, retrying");
        }

        Err(RepositoryError::Conflict(format!(
            "usage counter for user {user_id} kept changing during credit grant"
        ))
        .into())
    }

    /// Messages the user may still send today.
    pub async fn status_messages_left(
        &self,
        user_id: UserId,
        daily_limit: i64,
    ) -> Result<MessagesLeft, RepositoryError> {
        if self.tracker.status_days_left(user_id).await?.is_some_and(|d| d > 0) {
            return Ok(MessagesLeft::Unlimited);
        }
        self.remaining_today(user_id, daily_limit).await
    }

    /// Subscription days and messages left, in one report.
    pub async fn user_status(
        &self,
        user_id: UserId,
        daily_limit: i64,
    ) -> Result<UserStatus, RepositoryError> {
        let days_left = self.tracker.status_days_left(user_id).await?;
        let messages_left = if days_left.is_some_and(|d| d > 0) {
            MessagesLeft::Unlimited
        } else {
            self.remaining_today(user_id, daily_limit).await?
        };
        Ok(UserStatus {
            user_id,
            days_left,
            messages_left,
        })
    }

    /// Zero today's count, discarding any unused credit.
    pub async fn reset_today(&self, user_id: UserId) -> Result<(), RepositoryError> {
        let counter = UsageCounter::new(user_id, self.clock.today(), 0);
        self.usage.upsert_counter(&counter).await?;
        info!(user_id = %user_id, date = %counter.date, "Daily usage reset");
        Ok(())
    }

    async fn remaining_today(
        &self,
        user_id: UserId,
        daily_limit: i64,
    ) -> Result<MessagesLeft, RepositoryError> {
        let today = self.clock.today();
        let today_count = self
            .usage
            .fetch_counter(user_id)
            .await?
            .map_or(0, |c| c.count_on(today));
        Ok(MessagesLeft::Remaining(messages_left(today_count, daily_limit)))
    }
}
