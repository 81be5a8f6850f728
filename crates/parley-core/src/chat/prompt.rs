//! Completion request assembly.
//!
//! The system prompt is a template with `{user_name}` and `{date}`
//! placeholders. The request carries it in the `system` field, followed by
//! the recalled history and finally the new user message.

use chrono::NaiveDate;
use parley_types::config::{DATE_PLACEHOLDER, ModelSettings, USER_NAME_PLACEHOLDER};
use parley_types::llm::{CompletionRequest, Message, MessageRole};

/// Date format substituted for `{date}`.
pub const PROMPT_DATE_FORMAT: &str = "%d.%m.%Y";

/// Builds `CompletionRequest`s for one configured model.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    template: String,
    model: String,
    temperature: f64,
    max_tokens: Option<u32>,
}

impl PromptBuilder {
    pub fn new(template: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
        }
    }

    pub fn from_settings(template: impl Into<String>, settings: &ModelSettings) -> Self {
        Self {
            template: template.into(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// The system prompt for `user_name` on `today`.
    ///
    /// Placeholders are substituted in a single left-to-right pass, so text
    /// inserted for one is never scanned for the other.
    pub fn system_prompt(&self, user_name: &str, today: NaiveDate) -> String {
        let date = today.format(PROMPT_DATE_FORMAT).to_string();
        let substitutions = [
            (USER_NAME_PLACEHOLDER, user_name),
            (DATE_PLACEHOLDER, date.as_str()),
        ];

        let mut prompt = String::with_capacity(self.template.len() + user_name.len());
        let mut rest = self.template.as_str();
        loop {
            let next = substitutions
                .iter()
                .filter_map(|&(placeholder, value)| {
                    rest.find(placeholder).map(|pos| (pos, placeholder, value))
                })
                .min_by_key(|&(pos, _, _)| pos);
            let Some((pos, placeholder, value)) = next else {
                break;
            };
            prompt.push_str(&rest[..pos]);
            prompt.push_str(value);
            rest = &rest[pos + placeholder.len()..];
        }
        prompt.push_str(rest);
        prompt
    }

    pub fn build(
        &self,
        user_name: &str,
        today: NaiveDate,
        history: Vec<Message>,
        text: &str,
    ) -> CompletionRequest {
        let mut messages = history;
        messages.push(Message::new(MessageRole::User, text));

        CompletionRequest {
            model: self.model.clone(),
            messages,
            system: Some(self.system_prompt(user_name, today)),
            max_tokens: self.max_tokens,
            temperature: Some(self.temperature),
        }
    }
}
