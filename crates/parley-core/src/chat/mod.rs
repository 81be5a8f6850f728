//! Conversation handling: history memory, prompt assembly, and the chat
//! service that ties quota checks to model calls.

pub mod memory;
pub mod prompt;
pub mod service;
