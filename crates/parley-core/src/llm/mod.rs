//! LLM provider abstraction for Parley.
//!
//! The model is an external collaborator: messages in, text out, or failure.
//! Concrete providers live in parley-infra.

pub mod provider;
