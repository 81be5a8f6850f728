//! One-shot chat command.

use anyhow::{Result, bail};
use console::style;

use parley_types::chat::ChatOutcome;
use parley_types::user::{ChatUser, UserId};

use crate::state::AppState;

/// Send `message` as `user_id` and print the model's reply.
pub async fn chat(
    state: &AppState,
    user_id: UserId,
    name: String,
    message: &str,
    json: bool,
) -> Result<()> {
    if message.trim().is_empty() {
        bail!("message text must not be empty");
    }
    if !state.has_api_key {
        bail!(
            "model API key not set; export {} and try again",
            state.config.model.api_key_env
        );
    }

    let user = ChatUser::new(user_id, name);
    let outcome = state.chat_service.handle_message(&user, message).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match outcome {
        ChatOutcome::Reply { text } => {
            println!();
            println!("  {} {}", style(&state.config.model.provider_name).cyan().bold(), text);
            println!();
        }
        ChatOutcome::LimitReached => {
            println!();
            println!(
                "  {} Daily limit of {} messages reached for user {}.",
                style("!").yellow().bold(),
                state.config.daily_limit,
                style(user_id).cyan()
            );
            println!(
                "  {}",
                style("Come back tomorrow or activate a subscription.").dim()
            );
            println!();
        }
    }

    Ok(())
}
