//! # Reclaim Core Library
//!
//! This library provides the core business logic for Reclaim, a CLI-first
//! recovery/sobriety tracker. All operations are available via a
//! standalone CLI binary; any GUI shell is a thin layer over this same
//! library.
//!
//! ## Architecture
//!
//! - **Score engine**: a pure calculator that turns a window of activity
//!   records into a bounded 0-100 recovery score with a per-category
//!   breakdown and an escalating trigger penalty
//! - **Milestones**: idempotent evaluation of sobriety day thresholds
//!   against a configurable catalogue
//! - **Storage**: SQLite-based append-only activity ledger and TOML-based
//!   configuration
//!
//! ## Key Components
//!
//! - [`ScoreCalculator`]: the single source of truth for the scoring formula
//! - [`MilestoneEvaluator`]: newly earned badge detection
//! - [`ActivityLedger`]: the storage contract the engine scores against
//! - [`LedgerDb`]: rusqlite implementation of the ledger

pub mod activity;
pub mod daily;
pub mod error;
pub mod events;
pub mod ledger;
pub mod milestones;
pub mod scoring;
pub mod storage;

pub use activity::{ActivityCategory, ActivityRecord};
pub use daily::{MessageCache, MessageSelector};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use ledger::{ActivityLedger, ScoringWindow};
pub use milestones::{days_sober, AwardEvent, MilestoneCatalogue, MilestoneEvaluator};
pub use scoring::{
    CategoryCeilings, CategoryPoints, RecoveryZone, ScoreCalculator, ScoreConfig, ScoreResult,
    MAX_SCORE,
};
pub use storage::{data_dir, Config, LedgerDb};
