//! Conversation history commands.

use anyhow::Result;
use console::style;

use parley_types::chat::MessageRole;
use parley_types::user::UserId;

use crate::state::AppState;

/// Print recent history, oldest first.
pub async fn show_history(
    state: &AppState,
    user_id: UserId,
    limit: Option<u32>,
    json: bool,
) -> Result<()> {
    let messages = state.chat_service.history(user_id, limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&messages)?);
        return Ok(());
    }

    if messages.is_empty() {
        println!();
        println!(
            "  {} No history for user {}",
            style("○").dim(),
            style(user_id).cyan()
        );
        println!();
        return Ok(());
    }

    println!();
    for message in &messages {
        let role = match message.role {
            MessageRole::User => style("user").cyan(),
            MessageRole::Assistant => style("assistant").green(),
            MessageRole::System => style("system").yellow(),
        };
        println!(
            "  {} {:>9}  {}",
            style(message.created_at.format("%Y-%m-%d %H:%M:%S")).dim(),
            role,
            message.content
        );
    }
    println!();

    Ok(())
}

/// Delete all stored messages for a user.
pub async fn clear_history(state: &AppState, user_id: UserId, json: bool) -> Result<()> {
    let deleted = state.chat_service.clear_history(user_id).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "user_id": user_id, "deleted": deleted }))?
        );
        return Ok(());
    }

    println!();
    println!(
        "  {} Deleted {} messages for user {}",
        style("✓").green().bold(),
        style(deleted).bold(),
        style(user_id).cyan()
    );
    println!();

    Ok(())
}
