//! TOML-based application configuration.
//!
//! Stores the tunable parameters of the engine:
//! - Scoring window, category ceilings, and trigger cost step
//! - Milestone day thresholds
//! - Daily encouragement messages and their cache TTL
//!
//! Configuration is stored at `~/.config/reclaim/config.toml`. The engine
//! itself never reads config ambiently; everything is converted into
//! explicit parameters ([`ScoreConfig`], [`MilestoneCatalogue`]) at the
//! call site.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, CoreError};
use crate::milestones::MilestoneCatalogue;
use crate::scoring::{CategoryCeilings, ScoreConfig};

use super::data_dir;

/// Scoring-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_window_days")]
    pub window_days: u32,
    #[serde(default = "default_tasks_ceiling")]
    pub tasks_ceiling: u32,
    #[serde(default = "default_mood_ceiling")]
    pub mood_ceiling: u32,
    #[serde(default = "default_devotional_ceiling")]
    pub devotional_ceiling: u32,
    #[serde(default = "default_sobriety_commitment_ceiling")]
    pub sobriety_commitment_ceiling: u32,
    #[serde(default = "default_reflection_ceiling")]
    pub reflection_ceiling: u32,
    #[serde(default = "default_trigger_step")]
    pub trigger_step: u32,
}

impl ScoringConfig {
    /// Explicit calculator parameters.
    pub fn to_score_config(&self) -> ScoreConfig {
        ScoreConfig {
            window_days: self.window_days,
            ceilings: CategoryCeilings {
                tasks: self.tasks_ceiling,
                mood: self.mood_ceiling,
                devotional: self.devotional_ceiling,
                sobriety_commitment: self.sobriety_commitment_ceiling,
                reflection: self.reflection_ceiling,
            },
            trigger_step: self.trigger_step,
        }
    }
}

/// Milestone catalogue configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilestonesConfig {
    #[serde(default = "default_thresholds")]
    pub thresholds: Vec<u32>,
}

impl MilestonesConfig {
    pub fn to_catalogue(&self) -> MilestoneCatalogue {
        MilestoneCatalogue::new(self.thresholds.clone())
    }
}

/// Daily encouragement configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesConfig {
    #[serde(default = "default_messages")]
    pub messages: Vec<String>,
    #[serde(default = "default_cache_ttl_hours")]
    pub cache_ttl_hours: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/reclaim/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub milestones: MilestonesConfig,
    #[serde(default)]
    pub messages: MessagesConfig,
}

// Default functions
fn default_window_days() -> u32 {
    7
}
fn default_tasks_ceiling() -> u32 {
    25
}
fn default_mood_ceiling() -> u32 {
    15
}
fn default_devotional_ceiling() -> u32 {
    20
}
fn default_sobriety_commitment_ceiling() -> u32 {
    25
}
fn default_reflection_ceiling() -> u32 {
    15
}
fn default_trigger_step() -> u32 {
    3
}
fn default_thresholds() -> Vec<u32> {
    vec![7, 30, 60, 90, 180, 365]
}
fn default_cache_ttl_hours() -> u32 {
    24
}
fn default_messages() -> Vec<String> {
    [
        "One day at a time.",
        "You have made it through every hard day so far.",
        "Progress, not perfection.",
        "Small steps still move you forward.",
        "Asking for help is a strength.",
        "Your streak is built one honest evening at a time.",
        "A hard morning does not decide the whole day.",
        "Keep showing up for yourself.",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            tasks_ceiling: default_tasks_ceiling(),
            mood_ceiling: default_mood_ceiling(),
            devotional_ceiling: default_devotional_ceiling(),
            sobriety_commitment_ceiling: default_sobriety_commitment_ceiling(),
            reflection_ceiling: default_reflection_ceiling(),
            trigger_step: default_trigger_step(),
        }
    }
}

impl Default for MilestonesConfig {
    fn default() -> Self {
        Self {
            thresholds: default_thresholds(),
        }
    }
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            messages: default_messages(),
            cache_ttl_hours: default_cache_ttl_hours(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            milestones: MilestonesConfig::default(),
            messages: MessagesConfig::default(),
        }
    }
}

impl Config {
    /// Path of the config file.
    pub fn path() -> Result<PathBuf, CoreError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing defaults on first run.
    ///
    /// # Errors
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, CoreError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)
                    .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), CoreError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Load from disk, returning defaults on any error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}
