//! Daily usage counters, subscription windows, and quota reporting types.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize, Serializer};

use crate::user::UserId;

/// The single per-user daily usage row.
///
/// `count` is signed: credit grants push it below zero so the user can send
/// more than the nominal daily limit before being denied again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCounter {
    pub user_id: UserId,
    pub date: NaiveDate,
    pub count: i64,
}

impl UsageCounter {
    pub fn new(user_id: UserId, date: NaiveDate, count: i64) -> Self {
        Self {
            user_id,
            date,
            count,
        }
    }

    /// Whether this row was written on `today`.
    pub fn is_current(&self, today: NaiveDate) -> bool {
        self.date == today
    }

    /// Effective count for `today`: a stale row counts as zero.
    pub fn count_on(&self, today: NaiveDate) -> i64 {
        if self.is_current(today) { self.count } else { 0 }
    }
}

/// A paid window during which quota checks are bypassed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionWindow {
    pub user_id: UserId,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl SubscriptionWindow {
    /// Active iff the end is strictly after `now`.
    pub fn is_active_at(&self, now: NaiveDateTime) -> bool {
        self.end > now
    }

    /// Whole days left, counting any partial day as one more.
    ///
    /// `None` once the window has expired. 23 hours left reports 1.
    pub fn days_left_at(&self, now: NaiveDateTime) -> Option<i64> {
        if !self.is_active_at(now) {
            return None;
        }
        Some((self.end - now).num_days() + 1)
    }
}

/// Outcome of a quota check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaDecision {
    /// The message is allowed and has been counted.
    Allowed,
    /// Today's quota is exhausted; nothing was written.
    LimitReached,
}

impl QuotaDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, QuotaDecision::Allowed)
    }
}

/// Messages a user may still send today.
///
/// Serializes as the string `"unlimited"` or a plain integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessagesLeft {
    Unlimited,
    Remaining(i64),
}

impl fmt::Display for MessagesLeft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessagesLeft::Unlimited => write!(f, "unlimited"),
            MessagesLeft::Remaining(n) => write!(f, "{n}"),
        }
    }
}

impl Serialize for MessagesLeft {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MessagesLeft::Unlimited => serializer.serialize_str("unlimited"),
            MessagesLeft::Remaining(n) => serializer.serialize_i64(*n),
        }
    }
}

/// Combined subscription and quota report for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserStatus {
    pub user_id: UserId,
    /// Days left on the subscription, `None` without an active one.
    pub days_left: Option<i64>,
    pub messages_left: MessagesLeft,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_stale_counter_counts_as_zero() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let yesterday = today.pred_opt().unwrap();
        let counter = UsageCounter::new(UserId(1), yesterday, 49);
        assert!(!counter.is_current(today));
        assert_eq!(counter.count_on(today), 0);
        assert_eq!(counter.count_on(yesterday), 49);
    }

    #[test]
    fn test_days_left_partial_day_counts_as_one() {
        let now = at(2024, 3, 2, 10, 0, 0);
        let window = SubscriptionWindow {
            user_id: UserId(1),
            start: now - Duration::days(29),
            end: now + Duration::hours(23),
        };
        assert_eq!(window.days_left_at(now), Some(1));
    }

    #[test]
    fn test_days_left_full_days() {
        let now = at(2024, 3, 2, 10, 0, 0);
        let window = SubscriptionWindow {
            user_id: UserId(1),
            start: now,
            end: now + Duration::days(30),
        };
        assert_eq!(window.days_left_at(now), Some(31));
        assert_eq!(
            window.days_left_at(now + Duration::days(29) + Duration::hours(1)),
            Some(1)
        );
    }

    #[test]
    fn test_days_left_expired_is_none() {
        let now = at(2024, 3, 2, 10, 0, 0);
        let window = SubscriptionWindow {
            user_id: UserId(1),
            start: now - Duration::days(30),
            end: now - Duration::seconds(1),
        };
        assert!(!window.is_active_at(now));
        assert_eq!(window.days_left_at(now), None);
    }

    #[test]
    fn test_window_ending_exactly_now_is_inactive() {
        let now = at(2024, 3, 2, 10, 0, 0);
        let window = SubscriptionWindow {
            user_id: UserId(1),
            start: now - Duration::days(30),
            end: now,
        };
        assert!(!window.is_active_at(now));
    }

    #[test]
    fn test_messages_left_serialization() {
        assert_eq!(
            serde_json::to_string(&MessagesLeft::Unlimited).unwrap(),
            "\"unlimited\""
        );
        assert_eq!(
            serde_json::to_string(&MessagesLeft::Remaining(12)).unwrap(),
            "12"
        );
    }

    #[test]
    fn test_user_status_serialization() {
        let status = UserStatus {
            user_id: UserId(5),
            days_left: None,
            messages_left: MessagesLeft::Remaining(3),
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["user_id"], 5);
        assert!(json["days_left"].is_null());
        assert_eq!(json["messages_left"], 3);
    }
}
