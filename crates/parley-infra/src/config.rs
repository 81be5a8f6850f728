//! Configuration loader for Parley.
//!
//! Reads `config.toml` from the data directory (`~/.parley/` unless
//! `PARLEY_DATA_DIR` says otherwise) into [`ParleyConfig`]. Falls back to
//! defaults when the file is missing or malformed.

use std::path::{Path, PathBuf};

use parley_types::config::{ModelSettings, ParleyConfig};
use secrecy::SecretString;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "PARLEY_DATA_DIR";

pub const CONFIG_FILE: &str = "config.toml";

/// The Parley data directory: `$PARLEY_DATA_DIR`, else `~/.parley`.
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".parley")
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - Missing file: [`ParleyConfig::default()`].
/// - Unreadable or unparsable file: logs a warning and returns the default.
pub async fn load_config(data_dir: &Path) -> ParleyConfig {
    let config_path = data_dir.join(CONFIG_FILE);

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return ParleyConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ParleyConfig::default();
        }
    };

    match toml::from_str::<ParleyConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ParleyConfig::default()
        }
    }
}

/// Write a `config.toml` holding the defaults unless one already exists.
///
/// Returns `true` if a file was written.
pub async fn write_default_config(data_dir: &Path) -> std::io::Result<bool> {
    let config_path = data_dir.join(CONFIG_FILE);
    if tokio::fs::try_exists(&config_path).await? {
        return Ok(false);
    }
    let content = toml::to_string_pretty(&ParleyConfig::default())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    tokio::fs::create_dir_all(data_dir).await?;
    tokio::fs::write(&config_path, content).await?;
    tracing::info!(path = %config_path.display(), "Wrote default config");
    Ok(true)
}

/// Read the model API key from the environment variable named in `settings`.
pub fn resolve_api_key(settings: &ModelSettings) -> Option<SecretString> {
    resolve_api_key_with(settings, |name| std::env::var(name).ok())
}

fn resolve_api_key_with(
    settings: &ModelSettings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<SecretString> {
    lookup(&settings.api_key_env)
        .filter(|key| !key.trim().is_empty())
        .map(SecretString::from)
}
