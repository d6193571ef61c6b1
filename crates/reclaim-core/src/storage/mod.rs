mod config;
pub mod database;

pub use config::{Config, MessagesConfig, MilestonesConfig, ScoringConfig};
pub use database::LedgerDb;

use std::path::PathBuf;

/// Returns `~/.config/reclaim[-dev]/` based on RECLAIM_ENV.
///
/// Set RECLAIM_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("RECLAIM_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("reclaim-dev")
    } else {
        base_dir.join("reclaim")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
