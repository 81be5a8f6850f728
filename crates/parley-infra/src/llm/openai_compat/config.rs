//! Configuration and per-provider defaults for OpenAI-compatible endpoints.
//!
//! Each provider that speaks the OpenAI chat completions protocol gets a
//! factory returning an [`OpenAiCompatConfig`] with its base URL filled in.

use parley_types::config::ModelSettings;
use secrecy::SecretString;

/// Configuration for an OpenAI-compatible LLM provider.
///
/// Used to construct an [`super::OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    /// Human-readable provider name (e.g., "openai", "deepseek").
    pub provider_name: String,
    /// Base URL for the API (e.g., "https://api.openai.com/v1").
    pub base_url: String,
    pub api_key: SecretString,
    /// Model used when a request does not name one.
    pub model: String,
}

/// OpenAI default configuration. Base URL: `https://api.openai.com/v1`
pub fn openai_defaults(api_key: SecretString, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "openai".into(),
        base_url: "https://api.openai.com/v1".into(),
        api_key,
        model: model.into(),
    }
}

/// DeepSeek default configuration. Base URL: `https://api.deepseek.com`
pub fn deepseek_defaults(api_key: SecretString, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "deepseek".into(),
        base_url: "https://api.deepseek.com".into(),
        api_key,
        model: model.into(),
    }
}

/// Configuration taken verbatim from the `[model]` section of `config.toml`.
pub fn from_settings(settings: &ModelSettings, api_key: SecretString) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: settings.provider_name.clone(),
        base_url: settings.base_url.clone(),
        api_key,
        model: settings.model.clone(),
    }
}
