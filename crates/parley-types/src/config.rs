//! Configuration types for Parley.
//!
//! `ParleyConfig` represents the top-level `config.toml` that controls the
//! daily quota, history window, subscription length, the system prompt, and
//! the model provider settings.

use serde::{Deserialize, Serialize};

/// Placeholder replaced by the user's display name in the system prompt.
pub const USER_NAME_PLACEHOLDER: &str = "{user_name}";

/// Placeholder replaced by today's date (`dd.mm.yyyy`) in the system prompt.
pub const DATE_PLACEHOLDER: &str = "{date}";

/// Top-level configuration. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParleyConfig {
    /// Messages a user without a subscription may send per calendar day.
    #[serde(default = "default_daily_limit")]
    pub daily_limit: i64,

    /// Number of past turns injected into each prompt.
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,

    /// Length of one subscription purchase, in days.
    #[serde(default = "default_subscription_days")]
    pub subscription_days: i64,

    /// System prompt template; see [`USER_NAME_PLACEHOLDER`] and [`DATE_PLACEHOLDER`].
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    #[serde(default)]
    pub model: ModelSettings,
}

fn default_daily_limit() -> i64 {
    50
}

fn default_history_limit() -> u32 {
    5
}

fn default_subscription_days() -> i64 {
    30
}

fn default_system_prompt() -> String {
    "You are a warm, attentive companion chatting with {user_name}. \
     Today is {date}. Keep replies short and personal, and remember what \
     the user told you earlier in the conversation."
        .to_string()
}

impl Default for ParleyConfig {
    fn default() -> Self {
        Self {
            daily_limit: default_daily_limit(),
            history_limit: default_history_limit(),
            subscription_days: default_subscription_days(),
            system_prompt: default_system_prompt(),
            model: ModelSettings::default(),
        }
    }
}

/// Settings for the OpenAI-compatible model endpoint.
///
/// The API key itself is never stored in the config file; `api_key_env`
/// names the environment variable it is read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    #[serde(default = "default_provider_name")]
    pub provider_name: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Upper bound on a single model call.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_provider_name() -> String {
    "deepseek".to_string()
}

fn default_base_url() -> String {
    "https://api.deepseek.com".to_string()
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

fn default_api_key_env() -> String {
    "DEEPSEEK_API_KEY".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            provider_name: default_provider_name(),
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            max_tokens: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}
