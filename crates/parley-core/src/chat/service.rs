//! Chat service: the path of one inbound user message.
//!
//! `handle_message` checks the subscription, then the daily quota, recalls
//! recent history, asks the model for a reply under a timeout, and stores
//! both sides of the exchange. A spent quota is reported as
//! `ChatOutcome::LimitReached`, not as an error.

use std::time::Duration;

use parley_types::chat::{ChatOutcome, MessageRole, StoredMessage};
use parley_types::config::ParleyConfig;
use parley_types::error::{ChatError, QuotaError, RepositoryError};
use parley_types::llm::LlmError;
use parley_types::quota::{SubscriptionWindow, UserStatus};
use parley_types::user::{ChatUser, UserId};
use tracing::{debug, error, info};

use crate::chat::memory::ConversationMemory;
use crate::chat::prompt::PromptBuilder;
use crate::clock::Clock;
use crate::llm::provider::LlmProvider;
use crate::quota::ledger::QuotaLedger;
use crate::repository::message::MessageRepository;
use crate::repository::subscription::SubscriptionRepository;
use crate::repository::usage::UsageRepository;

/// Limits applied by `ChatService`, usually taken from `ParleyConfig`.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub daily_limit: i64,
    pub history_limit: u32,
    pub subscription_days: i64,
    pub request_timeout: Duration,
}

impl ChatSettings {
    pub fn from_config(config: &ParleyConfig) -> Self {
        Self {
            daily_limit: config.daily_limit,
            history_limit: config.history_limit,
            subscription_days: config.subscription_days,
            request_timeout: Duration::from_secs(config.model.request_timeout_secs),
        }
    }
}

/// Orchestrates quota, memory, and the model provider for one deployment.
///
/// Generic over every repository, the provider, and the clock so that
/// parley-core never depends on parley-infra.
pub struct ChatService<M, U, S, P, C>
where
    M: MessageRepository,
    U: UsageRepository,
    S: SubscriptionRepository,
    P: LlmProvider,
    C: Clock + Clone,
{
    memory: ConversationMemory<M>,
    ledger: QuotaLedger<U, S, C>,
    provider: P,
    prompt: PromptBuilder,
    settings: ChatSettings,
    clock: C,
}

impl<M, U, S, P, C> ChatService<M, U, S, P, C>
where
    M: MessageRepository,
    U: UsageRepository,
    S: SubscriptionRepository,
    P: LlmProvider,
    C: Clock + Clone,
{
    pub fn new(
        messages: M,
        usage: U,
        subscriptions: S,
        provider: P,
        prompt: PromptBuilder,
        settings: ChatSettings,
        clock: C,
    ) -> Self {
        Self {
            memory: ConversationMemory::new(messages),
            ledger: QuotaLedger::new(usage, subscriptions, clock.clone()),
            provider,
            prompt,
            settings,
            clock,
        }
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn memory(&self) -> &ConversationMemory<M> {
        &self.memory
    }

    pub fn ledger(&self) -> &QuotaLedger<U, S, C> {
        &self.ledger
    }

    /// Answer one message from `user`.
    ///
    /// Subscribers bypass the quota. Otherwise one message is counted before
    /// the model is called; the count is not refunded if the call fails.
    /// Nothing is written to history unless the model replies.
    pub async fn handle_message(
        &self,
        user: &ChatUser,
        text: &str,
    ) -> Result<ChatOutcome, ChatError> {
        let user_id = user.id;

        if !self.ledger.tracker().is_active(user_id).await? {
            let decision = self
                .ledger
                .check_and_increment(user_id, self.settings.daily_limit)
                .await?;
            if !decision.is_allowed() {
                info!(user_id = %user_id, "Message refused, daily limit reached");
                return Ok(ChatOutcome::LimitReached);
            }
        }

        let history = self
            .memory
            .recent_history(user_id, self.settings.history_limit)
            .await?;
        let request = self
            .prompt
            .build(&user.display_name, self.clock.today(), history, text);

        debug!(
            user_id = %user_id,
            provider = self.provider.name(),
            turns = request.messages.len(),
            "Calling model"
        );

        let timeout = self.settings.request_timeout;
        let response = match tokio::time::timeout(timeout, self.provider.complete(&request)).await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                error!(user_id = %user_id, provider = self.provider.name(), error = %e, "Model call failed");
                return Err(e.into());
            }
            Err(_) => {
                let e = LlmError::Timeout {
                    after_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                };
                error!(user_id = %user_id, provider = self.provider.name(), error = %e, "Model call failed");
                return Err(e.into());
            }
        };

        self.memory.append(user_id, MessageRole::User, text).await?;
        self.memory
            .append(user_id, MessageRole::Assistant, &response.content)
            .await?;

        info!(
            user_id = %user_id,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "Reply sent"
        );

        Ok(ChatOutcome::Reply {
            text: response.content,
        })
    }

    pub async fn status(&self, user_id: UserId) -> Result<UserStatus, RepositoryError> {
        self.ledger
            .user_status(user_id, self.settings.daily_limit)
            .await
    }

    /// Activate or extend a subscription; `days` defaults to the configured length.
    pub async fn activate_subscription(
        &self,
        user_id: UserId,
        days: Option<i64>,
    ) -> Result<SubscriptionWindow, QuotaError> {
        self.ledger
            .tracker()
            .activate(user_id, days.unwrap_or(self.settings.subscription_days))
            .await
    }

    pub async fn grant_credit(&self, user_id: UserId, amount: i64) -> Result<i64, QuotaError> {
        self.ledger.increase_credit(user_id, amount).await
    }

    pub async fn reset_usage(&self, user_id: UserId) -> Result<(), RepositoryError> {
        self.ledger.reset_today(user_id).await
    }

    /// Stored history, oldest first; `limit` defaults to the configured window.
    pub async fn history(
        &self,
        user_id: UserId,
        limit: Option<u32>,
    ) -> Result<Vec<StoredMessage>, RepositoryError> {
        self.memory
            .recent_entries(user_id, limit.unwrap_or(self.settings.history_limit))
            .await
    }

    pub async fn clear_history(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        self.memory.clear(user_id).await
    }
}
