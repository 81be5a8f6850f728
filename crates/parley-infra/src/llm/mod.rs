//! LLM provider implementations.
//!
//! Contains the concrete [`OpenAiCompatibleProvider`] behind the
//! `LlmProvider` trait defined in `parley-core`.

pub mod openai_compat;

pub use self::openai_compat::OpenAiCompatibleProvider;
