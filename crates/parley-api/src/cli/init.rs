//! `parley init`: prepare the data directory.

use anyhow::Result;
use console::style;

use parley_infra::config::{CONFIG_FILE, data_dir, write_default_config};
use parley_infra::sqlite::pool::{DATABASE_FILE, DatabasePool};

/// Write the default `config.toml` (if absent) and create the database.
pub async fn init(json: bool) -> Result<()> {
    let dir = data_dir();
    let wrote_config = write_default_config(&dir).await?;

    let pool = DatabasePool::open_in(&dir).await?;
    pool.close().await;

    if json {
        let result = serde_json::json!({
            "data_dir": dir.display().to_string(),
            "config_written": wrote_config,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Parley data directory: {}",
        style("✓").green().bold(),
        style(dir.display()).cyan()
    );
    if wrote_config {
        println!("  Wrote default {}", style(CONFIG_FILE).bold());
    } else {
        println!("  {} already exists, left unchanged", style(CONFIG_FILE).bold());
    }
    println!("  Database ready at {}", style(DATABASE_FILE).bold());
    println!();

    Ok(())
}
