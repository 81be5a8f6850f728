//! User identity.
//!
//! Users are identified by the integer ID assigned by the chat platform the
//! bot is deployed on. Parley never stores users as entities; the ID is only
//! the key for per-user messages, counters, and subscriptions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// External user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        UserId(id)
    }
}

impl FromStr for UserId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(UserId)
            .map_err(|_| format!("invalid user id: '{s}'"))
    }
}

/// A user as seen by an inbound message: identity plus the name used to
/// personalize the system prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatUser {
    pub id: UserId,
    pub display_name: String,
}

impl ChatUser {
    pub fn new(id: impl Into<UserId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}
