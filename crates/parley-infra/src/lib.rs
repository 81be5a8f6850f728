//! Infrastructure layer for Parley.
//!
//! Implements the repository traits defined in `parley-core` on SQLite,
//! provides the OpenAI-compatible model provider, and loads `config.toml`.

pub mod config;
pub mod llm;
pub mod sqlite;
