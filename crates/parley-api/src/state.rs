//! Application state wiring all services together.
//!
//! AppState owns the database pool and the model provider for the lifetime
//! of the process. `ChatService` is generic over repositories, provider, and
//! clock; AppState pins it to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use parley_core::chat::prompt::PromptBuilder;
use parley_core::chat::service::{ChatService, ChatSettings};
use parley_core::clock::SystemClock;
use parley_infra::config::{data_dir, load_config, resolve_api_key};
use parley_infra::llm::OpenAiCompatibleProvider;
use parley_infra::sqlite::message::SqliteMessageRepository;
use parley_infra::sqlite::pool::DatabasePool;
use parley_infra::sqlite::subscription::SqliteSubscriptionRepository;
use parley_infra::sqlite::usage::SqliteUsageRepository;
use parley_types::config::ParleyConfig;
use secrecy::SecretString;

pub type ConcreteChatService = ChatService<
    SqliteMessageRepository,
    SqliteUsageRepository,
    SqliteSubscriptionRepository,
    OpenAiCompatibleProvider,
    SystemClock,
>;

/// Shared application state used by both CLI commands and REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub config: Arc<ParleyConfig>,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
    /// Whether the model API key was found; without it every model call fails.
    pub has_api_key: bool,
}

impl AppState {
    /// Initialize from the environment: data directory, `config.toml`, and
    /// the API key variable it names.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_config(&data_dir).await;
        let api_key = resolve_api_key(&config.model);
        Self::build(data_dir, config, api_key).await
    }

    /// Wire the services for an explicit data directory and configuration.
    pub async fn build(
        data_dir: PathBuf,
        config: ParleyConfig,
        api_key: Option<SecretString>,
    ) -> anyhow::Result<Self> {
        let db_pool = DatabasePool::open_in(&data_dir).await?;

        let has_api_key = api_key.is_some();
        if !has_api_key {
            tracing::warn!(
                env = %config.model.api_key_env,
                "Model API key not set; chat requests will fail"
            );
        }
        let provider = OpenAiCompatibleProvider::from_settings(
            &config.model,
            api_key.unwrap_or_else(|| SecretString::from(String::new())),
        );

        let chat_service = ChatService::new(
            SqliteMessageRepository::new(db_pool.clone()),
            SqliteUsageRepository::new(db_pool.clone()),
            SqliteSubscriptionRepository::new(db_pool.clone()),
            provider,
            PromptBuilder::from_settings(config.system_prompt.clone(), &config.model),
            ChatSettings::from_config(&config),
            SystemClock,
        );

        Ok(Self {
            chat_service: Arc::new(chat_service),
            config: Arc::new(config),
            data_dir,
            db_pool,
            has_api_key,
        })
    }

    /// Close the database pools.
    pub async fn shutdown(&self) {
        self.db_pool.close().await;
    }
}
