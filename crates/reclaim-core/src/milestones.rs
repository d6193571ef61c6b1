//! Sobriety milestone evaluation.
//!
//! Given a continuous-sobriety day count and the set of milestones already
//! awarded, determine which badges are newly earned. Evaluation is
//! idempotent: re-running with the same state is a no-op, so a scheduled
//! job can call it as often as it likes.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Catalogue of day thresholds that unlock badges.
///
/// The catalogue is configuration, not logic: thresholds are sorted and
/// deduplicated on construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneCatalogue {
    thresholds: Vec<u32>,
}

impl MilestoneCatalogue {
    pub fn new(mut thresholds: Vec<u32>) -> Self {
        thresholds.sort_unstable();
        thresholds.dedup();
        Self { thresholds }
    }

    /// Thresholds in ascending order.
    pub fn thresholds(&self) -> &[u32] {
        &self.thresholds
    }
}

impl Default for MilestoneCatalogue {
    fn default() -> Self {
        Self::new(vec![7, 30, 60, 90, 180, 365])
    }
}

/// A newly earned milestone badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardEvent {
    pub days_milestone: u32,
    pub earned_at: DateTime<Utc>,
}

/// Stateless evaluator over a milestone catalogue.
#[derive(Debug, Clone, Default)]
pub struct MilestoneEvaluator {
    catalogue: MilestoneCatalogue,
}

impl MilestoneEvaluator {
    /// Evaluator over the default catalogue.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalogue(catalogue: MilestoneCatalogue) -> Self {
        Self { catalogue }
    }

    pub fn catalogue(&self) -> &MilestoneCatalogue {
        &self.catalogue
    }

    /// Determine newly earned milestones.
    ///
    /// A negative `days_sober` (clock skew, bad start date) is treated as
    /// zero: nothing qualifies, nothing errors. Awards already present in
    /// `already_awarded` are never re-emitted. The current time is an
    /// explicit parameter; evaluation never reads the wall clock.
    pub fn evaluate(
        &self,
        days_sober: i64,
        already_awarded: &BTreeSet<u32>,
        now: DateTime<Utc>,
    ) -> Vec<AwardEvent> {
        let days = days_sober.max(0) as u64;

        self.catalogue
            .thresholds()
            .iter()
            .filter(|&&threshold| {
                days >= u64::from(threshold) && !already_awarded.contains(&threshold)
            })
            .map(|&threshold| AwardEvent {
                days_milestone: threshold,
                earned_at: now,
            })
            .collect()
    }
}

/// Continuous sobriety day count.
///
/// Reconciles the count derived from the start date with a user-asserted
/// stored counter by taking the larger of the two, matching the product's
/// observed behavior. Never negative: a start date in the future counts
/// as zero days.
pub fn days_sober(start_date: Option<NaiveDate>, stored_counter: i64, today: NaiveDate) -> i64 {
    let from_start = start_date
        .map(|start| (today - start).num_days())
        .unwrap_or(0);

    from_start.max(stored_counter).max(0)
}
