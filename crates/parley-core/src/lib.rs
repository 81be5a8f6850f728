//! Business logic and repository trait definitions for Parley.
//!
//! This crate defines the "ports" (repository traits) that the infrastructure
//! layer implements, plus the quota ledger, subscription tracker, and
//! conversation memory built on top of them. It depends only on
//! `parley-types` -- never on `parley-infra` or any database/IO crate.

pub mod chat;
pub mod clock;
pub mod llm;
pub mod quota;
pub mod repository;

#[cfg(test)]
pub(crate) mod testing;
