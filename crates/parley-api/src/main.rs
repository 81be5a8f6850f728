//! Parley CLI and REST API entry point.
//!
//! Binary name: `parley`
//!
//! Parses CLI arguments, initializes database and services, then dispatches
//! to the appropriate command handler or starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;
use parley_observe::tracing_setup::{init_tracing, shutdown_tracing, verbosity_filter};
use parley_types::user::UserId;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(verbosity_filter(cli.verbose, cli.quiet), cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // `init` creates what AppState::init expects to find
    if let Commands::Init = cli.command {
        return cli::init::init(cli.json).await;
    }

    let state = AppState::init().await?;

    let result = match cli.command {
        Commands::Init => Ok(()),

        Commands::Chat {
            user,
            name,
            message,
        } => cli::chat::chat(&state, UserId(user), name, &message, cli.json).await,

        Commands::Status { user } => cli::quota::status(&state, UserId(user), cli.json).await,

        Commands::Subscribe { user, days } => {
            cli::quota::subscribe(&state, UserId(user), days, cli.json).await
        }

        Commands::Credit { user, amount } => {
            cli::quota::credit(&state, UserId(user), amount, cli.json).await
        }

        Commands::ResetUsage { user } => {
            cli::quota::reset_usage(&state, UserId(user), cli.json).await
        }

        Commands::History { user, limit } => {
            cli::history::show_history(&state, UserId(user), limit, cli.json).await
        }

        Commands::Clear { user } => {
            cli::history::clear_history(&state, UserId(user), cli.json).await
        }

        Commands::Serve { host, port } => serve(state.clone(), &host, port).await,
    };

    state.shutdown().await;
    result
}

async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!(
        "  {} Parley API listening on {}",
        console::style("⚡").bold(),
        console::style(format!("http://{addr}")).cyan()
    );
    println!("  {}", console::style("Press Ctrl+C to stop").dim());

    let router = http::router::build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    println!("\n  Server stopped.");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
