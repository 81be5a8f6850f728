//! Shared domain types for Parley.
//!
//! This crate contains the domain types used across the Parley chat backend:
//! users, conversation messages, usage counters, subscription windows, LLM
//! request/response shapes, configuration, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod quota;
pub mod user;
