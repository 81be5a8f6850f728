//! In-memory fakes shared by the unit tests of this crate.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use parley_types::chat::{MessageRole, StoredMessage};
use parley_types::error::RepositoryError;
use parley_types::llm::{CompletionRequest, CompletionResponse, LlmError, StopReason, Usage};
use parley_types::quota::{SubscriptionWindow, UsageCounter};
use parley_types::user::UserId;

use crate::clock::Clock;
use crate::llm::provider::LlmProvider;
use crate::repository::message::MessageRepository;
use crate::repository::subscription::SubscriptionRepository;
use crate::repository::usage::UsageRepository;

pub(crate) fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, s)
        .unwrap()
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// A clock that only moves when told to. Clones share the same time.
#[derive(Clone)]
pub(crate) struct FixedClock {
    now: Arc<Mutex<NaiveDateTime>>,
}

impl FixedClock {
    pub(crate) fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub(crate) fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap()
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Default)]
struct StoreState {
    messages: Vec<StoredMessage>,
    next_message_id: i64,
    counters: HashMap<UserId, UsageCounter>,
    subscriptions: HashMap<UserId, SubscriptionWindow>,
    writes: usize,
    unavailable: bool,
    counter_interference: VecDeque<UsageCounter>,
}

/// In-memory implementation of all three repositories. Clones share state.
#[derive(Clone, Default)]
pub(crate) struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Number of successful writes so far, across all tables.
    pub(crate) fn writes(&self) -> usize {
        self.state.lock().unwrap().writes
    }

    pub(crate) fn counter(&self, user_id: UserId) -> Option<UsageCounter> {
        self.state.lock().unwrap().counters.get(&user_id).cloned()
    }

    pub(crate) fn put_counter(&self, counter: UsageCounter) {
        self.state
            .lock()
            .unwrap()
            .counters
            .insert(counter.user_id, counter);
    }

    pub(crate) fn subscription(&self, user_id: UserId) -> Option<SubscriptionWindow> {
        self.state
            .lock()
            .unwrap()
            .subscriptions
            .get(&user_id)
            .cloned()
    }

    pub(crate) fn put_subscription(&self, window: SubscriptionWindow) {
        self.state
            .lock()
            .unwrap()
            .subscriptions
            .insert(window.user_id, window);
    }

    /// Make every subsequent call fail as if the database were gone.
    pub(crate) fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().unwrap().unavailable = unavailable;
    }

    /// Simulate a concurrent writer: the next counter compare-and-set sees
    /// `counter` stored just before it compares.
    pub(crate) fn interfere_with_next_counter_write(&self, counter: UsageCounter) {
        self.state
            .lock()
            .unwrap()
            .counter_interference
            .push_back(counter);
    }

    fn check_available(state: &StoreState) -> Result<(), RepositoryError> {
        if state.unavailable {
            return Err(RepositoryError::Unavailable("database is locked".to_string()));
        }
        Ok(())
    }
}

impl MessageRepository for InMemoryStore {
    async fn append_message(
        &self,
        user_id: UserId,
        role: MessageRole,
        content: &str,
    ) -> Result<i64, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        Self::check_available(&state)?;
        state.next_message_id += 1;
        let id = state.next_message_id;
        state.messages.push(StoredMessage {
            id,
            user_id,
            role,
            content: content.to_string(),
            created_at: at(2024, 1, 1, 0, 0, 0),
        });
        state.writes += 1;
        Ok(id)
    }

    async fn fetch_recent_messages(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<StoredMessage>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Self::check_available(&state)?;
        let mut recent: Vec<StoredMessage> = state
            .messages
            .iter()
            .rev()
            .filter(|m| m.user_id == user_id)
            .take(limit as usize)
            .cloned()
            .collect();
        recent.reverse();
        Ok(recent)
    }

    async fn delete_all_messages(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        Self::check_available(&state)?;
        let before = state.messages.len();
        state.messages.retain(|m| m.user_id != user_id);
        state.writes += 1;
        Ok((before - state.messages.len()) as u64)
    }

    async fn count_messages(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let state = self.state.lock().unwrap();
        Self::check_available(&state)?;
        Ok(state.messages.iter().filter(|m| m.user_id == user_id).count() as u64)
    }
}

impl UsageRepository for InMemoryStore {
    async fn fetch_counter(&self, user_id: UserId) -> Result<Option<UsageCounter>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Self::check_available(&state)?;
        Ok(state.counters.get(&user_id).cloned())
    }

    async fn upsert_counter(&self, counter: &UsageCounter) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        Self::check_available(&state)?;
        state.counters.insert(counter.user_id, counter.clone());
        state.writes += 1;
        Ok(())
    }

    async fn compare_and_set_counter(
        &self,
        expected: Option<&UsageCounter>,
        new: &UsageCounter,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        Self::check_available(&state)?;
        if let Some(concurrent) = state.counter_interference.pop_front() {
            state.counters.insert(concurrent.user_id, concurrent);
        }
        if state.counters.get(&new.user_id) != expected {
            return Ok(false);
        }
        state.counters.insert(new.user_id, new.clone());
        state.writes += 1;
        Ok(true)
    }
}

impl SubscriptionRepository for InMemoryStore {
    async fn fetch_subscription(
        &self,
        user_id: UserId,
    ) -> Result<Option<SubscriptionWindow>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Self::check_available(&state)?;
        Ok(state.subscriptions.get(&user_id).cloned())
    }

    async fn upsert_subscription(&self, window: &SubscriptionWindow) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        Self::check_available(&state)?;
        state.subscriptions.insert(window.user_id, window.clone());
        state.writes += 1;
        Ok(())
    }

    async fn compare_and_set_subscription(
        &self,
        expected: Option<&SubscriptionWindow>,
        new: &SubscriptionWindow,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        Self::check_available(&state)?;
        if state.subscriptions.get(&new.user_id) != expected {
            return Ok(false);
        }
        state.subscriptions.insert(new.user_id, new.clone());
        state.writes += 1;
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Provider that replays queued replies and records every request.
#[derive(Clone, Default)]
pub(crate) struct ScriptedProvider {
    replies: Arc<Mutex<VecDeque<Result<String, LlmError>>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    delay: Option<StdDuration>,
}

impl ScriptedProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_delay(mut self, delay: StdDuration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn reply(&self, text: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(text.to_string()));
    }

    pub(crate) fn fail(&self, err: LlmError) {
        self.replies.lock().unwrap().push_back(Err(err));
    }

    pub(crate) fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyResponse));
        next.map(|content| CompletionResponse {
            id: "resp-1".to_string(),
            content,
            model: "scripted-model".to_string(),
            stop_reason: StopReason::EndTurn,
            usage: Usage::default(),
        })
    }
}
