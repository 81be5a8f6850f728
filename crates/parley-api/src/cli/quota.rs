//! Quota and subscription commands: status, subscribe, credit, reset-usage.

use anyhow::Result;
use console::style;

use parley_types::quota::MessagesLeft;
use parley_types::user::UserId;

use crate::state::AppState;

/// Display a user's subscription and remaining messages.
pub async fn status(state: &AppState, user_id: UserId, json: bool) -> Result<()> {
    let status = state.chat_service.status(user_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!("  {} User {}", style("●").bold(), style(user_id).cyan());
    println!();
    match status.days_left {
        Some(days) => println!("  Subscription:  {} days left", style(days).green()),
        None => println!("  Subscription:  {}", style("none").dim()),
    }
    match status.messages_left {
        MessagesLeft::Unlimited => println!("  Messages left: {}", style("unlimited").green()),
        MessagesLeft::Remaining(0) => println!("  Messages left: {}", style(0).red()),
        MessagesLeft::Remaining(n) => println!("  Messages left: {}", style(n).bold()),
    }
    println!();

    Ok(())
}

/// Activate or extend a user's subscription.
pub async fn subscribe(
    state: &AppState,
    user_id: UserId,
    days: Option<i64>,
    json: bool,
) -> Result<()> {
    let window = state
        .chat_service
        .activate_subscription(user_id, days)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&window)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Subscription for user {} active until {}",
        style("✓").green().bold(),
        style(user_id).cyan(),
        style(window.end.format("%Y-%m-%d %H:%M")).bold()
    );
    println!();

    Ok(())
}

/// Grant `amount` extra messages for today.
pub async fn credit(state: &AppState, user_id: UserId, amount: i64, json: bool) -> Result<()> {
    let count = state.chat_service.grant_credit(user_id, amount).await?;
    let status = state.chat_service.status(user_id).await?;

    if json {
        let result = serde_json::json!({
            "user_id": user_id,
            "count": count,
            "messages_left": status.messages_left,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Granted {} messages to user {} ({} left today)",
        style("✓").green().bold(),
        style(amount).bold(),
        style(user_id).cyan(),
        status.messages_left
    );
    println!();

    Ok(())
}

/// Reset today's count to zero.
pub async fn reset_usage(state: &AppState, user_id: UserId, json: bool) -> Result<()> {
    state.chat_service.reset_usage(user_id).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "user_id": user_id, "count": 0 }))?
        );
        return Ok(());
    }

    println!();
    println!(
        "  {} Usage reset for user {}",
        style("✓").green().bold(),
        style(user_id).cyan()
    );
    println!();

    Ok(())
}
