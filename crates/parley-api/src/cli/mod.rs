//! CLI command definitions and dispatch for the `parley` binary.
//!
//! Uses clap derive macros for argument parsing. Every command except
//! `init` and `serve` acts on one user, named with `--user`.

pub mod chat;
pub mod history;
pub mod init;
pub mod quota;

use clap::{Parser, Subcommand};

/// Companion chat with per-user quotas and subscriptions.
#[derive(Parser)]
#[command(name = "parley", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also export spans through the OpenTelemetry stdout exporter.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the data directory, default config.toml, and database.
    Init,

    /// Send one message and print the reply.
    Chat {
        /// Numeric user id.
        #[arg(long)]
        user: i64,

        /// Display name used in the system prompt.
        #[arg(long, default_value = "friend")]
        name: String,

        /// The message text.
        message: String,
    },

    /// Show subscription days and messages left today.
    Status {
        #[arg(long)]
        user: i64,
    },

    /// Activate or extend a subscription.
    Subscribe {
        #[arg(long)]
        user: i64,

        /// Length in days (defaults to `subscription_days` from config.toml).
        #[arg(long)]
        days: Option<i64>,
    },

    /// Grant extra messages for today.
    Credit {
        #[arg(long)]
        user: i64,

        #[arg(long, allow_hyphen_values = true)]
        amount: i64,
    },

    /// Reset today's message count to zero.
    #[command(name = "reset-usage")]
    ResetUsage {
        #[arg(long)]
        user: i64,
    },

    /// Show recent conversation history, oldest first.
    History {
        #[arg(long)]
        user: i64,

        /// Number of messages (defaults to `history_limit` from config.toml).
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Delete a user's conversation history.
    Clear {
        #[arg(long)]
        user: i64,
    },

    /// Start the REST API server.
    Serve {
        /// Host address to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on.
        #[arg(long, short, default_value = "3000")]
        port: u16,
    },
}
