//! Recovery score calculator.
//!
//! This module turns a window of activity records into a bounded,
//! interpretable 0-100 score (the "recovery thermometer") with a
//! per-category breakdown and an escalating trigger penalty. It is the
//! single source of truth for the scoring formula.
//!
//! ## Scoring rules
//!
//! - Each positive category sums its raw points and is capped at a
//!   category-specific ceiling *before* cross-category summation, so one
//!   category can never donate headroom to another.
//! - The k-th trigger in the window (1-indexed, ordered by timestamp)
//!   costs `k * trigger_step` points: a single lapse is tolerated more
//!   leniently than repeated ones.
//! - `total = clamp(sum(capped) - penalty, 0, 100)`.
//!
//! ## Zones
//!
//! | Score | Zone |
//! |-------|------|
//! | 0-30 | Vulnerability |
//! | 31-60 | Attention |
//! | 61-90 | Stability |
//! | 91-100 | Growth |

use serde::{Deserialize, Serialize};

use crate::activity::{ActivityCategory, ActivityRecord};
use crate::error::ValidationError;

/// Upper bound of the recovery score.
pub const MAX_SCORE: u32 = 100;

/// Per-category point ceilings.
///
/// The defaults sum to 100, so a perfect score is reachable exactly when
/// every category is independently maxed with zero triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCeilings {
    pub tasks: u32,
    pub mood: u32,
    pub devotional: u32,
    pub sobriety_commitment: u32,
    pub reflection: u32,
}

impl CategoryCeilings {
    /// Ceiling for a category. Triggers have no ceiling; they never
    /// contribute positive points.
    pub fn get(&self, category: ActivityCategory) -> u32 {
        match category {
            ActivityCategory::Tasks => self.tasks,
            ActivityCategory::Mood => self.mood,
            ActivityCategory::Devotional => self.devotional,
            ActivityCategory::SobrietyCommitment => self.sobriety_commitment,
            ActivityCategory::Reflection => self.reflection,
            ActivityCategory::Trigger => 0,
        }
    }
}

impl Default for CategoryCeilings {
    fn default() -> Self {
        Self {
            tasks: 25,
            mood: 15,
            devotional: 20,
            sobriety_commitment: 25,
            reflection: 15,
        }
    }
}

/// Injectable calculator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreConfig {
    /// Trailing window length in days.
    pub window_days: u32,
    /// Per-category point ceilings.
    pub ceilings: CategoryCeilings,
    /// Marginal cost per trigger ordinal: the k-th trigger costs
    /// `k * trigger_step`.
    pub trigger_step: u32,
}

impl ScoreConfig {
    /// Validate that the configuration is usable.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.window_days == 0 {
            return Err(ValidationError::InvalidValue {
                field: "window_days".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.trigger_step == 0 {
            return Err(ValidationError::InvalidValue {
                field: "trigger_step".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            window_days: 7,
            ceilings: CategoryCeilings::default(),
            trigger_step: 3,
        }
    }
}

/// Capped point contribution of each positive category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPoints {
    pub tasks: u32,
    pub mood: u32,
    pub devotional: u32,
    pub sobriety_commitment: u32,
    pub reflection: u32,
}

impl CategoryPoints {
    pub fn get(&self, category: ActivityCategory) -> u32 {
        match category {
            ActivityCategory::Tasks => self.tasks,
            ActivityCategory::Mood => self.mood,
            ActivityCategory::Devotional => self.devotional,
            ActivityCategory::SobrietyCommitment => self.sobriety_commitment,
            ActivityCategory::Reflection => self.reflection,
            ActivityCategory::Trigger => 0,
        }
    }

    fn add(&mut self, category: ActivityCategory, points: u32) {
        let slot = match category {
            ActivityCategory::Tasks => &mut self.tasks,
            ActivityCategory::Mood => &mut self.mood,
            ActivityCategory::Devotional => &mut self.devotional,
            ActivityCategory::SobrietyCommitment => &mut self.sobriety_commitment,
            ActivityCategory::Reflection => &mut self.reflection,
            ActivityCategory::Trigger => return,
        };
        *slot = slot.saturating_add(points);
    }

    fn capped(&self, ceilings: &CategoryCeilings) -> Self {
        Self {
            tasks: self.tasks.min(ceilings.tasks),
            mood: self.mood.min(ceilings.mood),
            devotional: self.devotional.min(ceilings.devotional),
            sobriety_commitment: self.sobriety_commitment.min(ceilings.sobriety_commitment),
            reflection: self.reflection.min(ceilings.reflection),
        }
    }

    pub fn sum(&self) -> u32 {
        self.tasks
            .saturating_add(self.mood)
            .saturating_add(self.devotional)
            .saturating_add(self.sobriety_commitment)
            .saturating_add(self.reflection)
    }
}

/// Output of one scoring pass for one user over one window.
///
/// Computed fresh on each request and never stored as the source of
/// truth; the activity records are. Resetting the window and recomputing
/// therefore yields a clean zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Total score, clamped to `[0, 100]`.
    pub total_score: u32,
    /// Capped contribution of each positive category.
    pub category_points: CategoryPoints,
    /// Total penalty from trigger records.
    pub trigger_penalty: u32,
    /// Number of trigger records in the window.
    pub trigger_count: usize,
    /// True when more than one trigger record exists in the window.
    pub has_multiple_triggers: bool,
}

impl ScoreResult {
    /// Presentation band for this score.
    pub fn zone(&self) -> RecoveryZone {
        RecoveryZone::from_score(self.total_score)
    }
}

/// Presentation band derived from the total score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryZone {
    /// 0-30
    Vulnerability,
    /// 31-60
    Attention,
    /// 61-90
    Stability,
    /// 91-100
    Growth,
}

impl RecoveryZone {
    /// Determine the zone for a score. Boundaries are inclusive on the
    /// lower bound of each band.
    pub fn from_score(score: u32) -> Self {
        if score < 31 {
            RecoveryZone::Vulnerability
        } else if score < 61 {
            RecoveryZone::Attention
        } else if score <= 90 {
            RecoveryZone::Stability
        } else {
            RecoveryZone::Growth
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RecoveryZone::Vulnerability => "Vulnerability",
            RecoveryZone::Attention => "Attention",
            RecoveryZone::Stability => "Stability",
            RecoveryZone::Growth => "Growth",
        }
    }

    /// Human-readable description of the band.
    pub fn description(&self) -> &'static str {
        match self {
            RecoveryZone::Vulnerability => {
                "Vulnerability: reach out for support and keep logging."
            }
            RecoveryZone::Attention => "Attention: the week needs care. Small steps count.",
            RecoveryZone::Stability => "Stability: steady rhythm. Keep the routine going.",
            RecoveryZone::Growth => "Growth: a full week of consistent recovery work.",
        }
    }
}

/// Deterministic, pure mapping from an activity set to a [`ScoreResult`].
///
/// The calculator is stateless and total over well-formed input: empty
/// sets, duplicate timestamps, and out-of-order records are all fine.
#[derive(Debug, Clone, Default)]
pub struct ScoreCalculator {
    config: ScoreConfig,
}

impl ScoreCalculator {
    /// Create a calculator with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a calculator with custom configuration.
    pub fn with_config(config: ScoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoreConfig {
        &self.config
    }

    /// Score an activity set.
    ///
    /// The records are assumed to belong to one user and one window; the
    /// ledger contract guarantees both. Ordering does not matter, the
    /// calculator sorts triggers internally.
    pub fn compute(&self, activities: &[ActivityRecord]) -> ScoreResult {
        let mut raw = CategoryPoints::default();
        let mut triggers: Vec<&ActivityRecord> = Vec::new();

        for record in activities {
            if record.category.is_trigger() {
                triggers.push(record);
            } else {
                raw.add(record.category, record.points);
            }
        }

        let category_points = raw.capped(&self.config.ceilings);
        let trigger_penalty = self.trigger_penalty(&mut triggers);
        let trigger_count = triggers.len();

        let total_score = category_points
            .sum()
            .saturating_sub(trigger_penalty)
            .min(MAX_SCORE);

        tracing::debug!(
            total_score,
            trigger_penalty,
            trigger_count,
            "recovery score computed"
        );

        ScoreResult {
            total_score,
            category_points,
            trigger_penalty,
            trigger_count,
            has_multiple_triggers: trigger_count > 1,
        }
    }

    /// Strictly increasing marginal cost: the k-th trigger (1-indexed,
    /// by `recorded_at` ascending) costs `k * trigger_step`.
    fn trigger_penalty(&self, triggers: &mut [&ActivityRecord]) -> u32 {
        triggers.sort_by_key(|r| r.recorded_at);
        triggers
            .iter()
            .enumerate()
            .map(|(i, _)| (i as u32 + 1).saturating_mul(self.config.trigger_step))
            .fold(0u32, u32::saturating_add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use proptest::prelude::*;

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    fn record(category: ActivityCategory, points: u32, minute_offset: i64) -> ActivityRecord {
        ActivityRecord::new(
            "u1",
            category,
            points,
            base_time() + Duration::minutes(minute_offset),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_activity_set_scores_zero() {
        let result = ScoreCalculator::new().compute(&[]);

        assert_eq!(result.total_score, 0);
        assert_eq!(result.category_points, CategoryPoints::default());
        assert_eq!(result.trigger_penalty, 0);
        assert!(!result.has_multiple_triggers);
        assert_eq!(result.zone(), RecoveryZone::Vulnerability);
    }

    #[test]
    fn test_single_category_overflow_caps_at_ceiling() {
        // 30 raw task points cap at the 25 ceiling.
        let activities = vec![
            record(ActivityCategory::Tasks, 10, 0),
            record(ActivityCategory::Tasks, 10, 1),
            record(ActivityCategory::Tasks, 10, 2),
        ];

        let result = ScoreCalculator::new().compute(&activities);
        assert_eq!(result.category_points.tasks, 25);
        assert_eq!(result.total_score, 25);
    }

    #[test]
    fn test_capping_is_per_category_before_summation() {
        // 1000 raw points in one category yield exactly that ceiling;
        // headroom never spills into other categories.
        let activities = vec![record(ActivityCategory::Devotional, 1000, 0)];

        let result = ScoreCalculator::new().compute(&activities);
        assert_eq!(result.category_points.devotional, 20);
        assert_eq!(result.category_points.tasks, 0);
        assert_eq!(result.total_score, 20);
    }

    #[test]
    fn test_mixed_categories_sum() {
        let activities = vec![
            record(ActivityCategory::Tasks, 10, 0),
            record(ActivityCategory::Mood, 5, 1),
            record(ActivityCategory::Devotional, 10, 2),
            record(ActivityCategory::SobrietyCommitment, 20, 3),
            record(ActivityCategory::Reflection, 10, 4),
        ];

        let result = ScoreCalculator::new().compute(&activities);
        assert_eq!(result.total_score, 55);
        assert_eq!(result.trigger_penalty, 0);
        assert!(!result.has_multiple_triggers);
        assert_eq!(result.zone(), RecoveryZone::Attention);
    }

    #[test]
    fn test_trigger_penalty_escalates() {
        // 25 commitment points minus two triggers: 3*1 + 3*2 = 9.
        let activities = vec![
            record(ActivityCategory::SobrietyCommitment, 25, 0),
            record(ActivityCategory::Trigger, 0, 10),
            record(ActivityCategory::Trigger, 0, 20),
        ];

        let result = ScoreCalculator::new().compute(&activities);
        assert_eq!(result.trigger_penalty, 9);
        assert_eq!(result.total_score, 16);
        assert!(result.has_multiple_triggers);
        assert_eq!(result.trigger_count, 2);
    }

    #[test]
    fn test_single_trigger_is_not_multiple() {
        let activities = vec![
            record(ActivityCategory::Mood, 10, 0),
            record(ActivityCategory::Trigger, 0, 5),
        ];

        let result = ScoreCalculator::new().compute(&activities);
        assert_eq!(result.trigger_penalty, 3);
        assert!(!result.has_multiple_triggers);
    }

    #[test]
    fn test_penalty_never_drives_score_below_zero() {
        let mut activities = vec![record(ActivityCategory::Mood, 5, 0)];
        for i in 0..10 {
            activities.push(record(ActivityCategory::Trigger, 0, i));
        }

        let result = ScoreCalculator::new().compute(&activities);
        // Penalty 3 * (1 + ... + 10) = 165 against 5 points.
        assert_eq!(result.trigger_penalty, 165);
        assert_eq!(result.total_score, 0);
    }

    #[test]
    fn test_out_of_order_records_score_identically() {
        let mut activities = vec![
            record(ActivityCategory::Trigger, 0, 30),
            record(ActivityCategory::Tasks, 15, 5),
            record(ActivityCategory::Trigger, 0, 10),
            record(ActivityCategory::Mood, 8, 25),
        ];

        let calc = ScoreCalculator::new();
        let forward = calc.compute(&activities);
        activities.reverse();
        let backward = calc.compute(&activities);

        assert_eq!(forward, backward);
    }

    #[test]
    fn test_perfect_week_reaches_exactly_100() {
        let activities = vec![
            record(ActivityCategory::Tasks, 25, 0),
            record(ActivityCategory::Mood, 15, 1),
            record(ActivityCategory::Devotional, 20, 2),
            record(ActivityCategory::SobrietyCommitment, 25, 3),
            record(ActivityCategory::Reflection, 15, 4),
        ];

        let result = ScoreCalculator::new().compute(&activities);
        assert_eq!(result.total_score, 100);
        assert_eq!(result.zone(), RecoveryZone::Growth);
    }

    #[test]
    fn test_custom_ceilings_and_step() {
        let config = ScoreConfig {
            window_days: 14,
            ceilings: CategoryCeilings {
                tasks: 40,
                mood: 40,
                devotional: 40,
                sobriety_commitment: 40,
                reflection: 40,
            },
            trigger_step: 5,
        };
        let calc = ScoreCalculator::with_config(config);

        let activities = vec![
            record(ActivityCategory::Tasks, 60, 0),
            record(ActivityCategory::Trigger, 0, 1),
        ];

        let result = calc.compute(&activities);
        assert_eq!(result.category_points.tasks, 40);
        assert_eq!(result.trigger_penalty, 5);
        assert_eq!(result.total_score, 35);
    }

    #[test]
    fn test_total_clamps_to_100_with_oversized_ceilings() {
        let config = ScoreConfig {
            ceilings: CategoryCeilings {
                tasks: 80,
                mood: 80,
                devotional: 80,
                sobriety_commitment: 80,
                reflection: 80,
            },
            ..ScoreConfig::default()
        };
        let calc = ScoreCalculator::with_config(config);

        let activities: Vec<_> = ActivityCategory::SCORING
            .iter()
            .enumerate()
            .map(|(i, &c)| record(c, 80, i as i64))
            .collect();

        assert_eq!(calc.compute(&activities).total_score, 100);
    }

    #[test]
    fn test_zone_boundaries() {
        assert_eq!(RecoveryZone::from_score(0), RecoveryZone::Vulnerability);
        assert_eq!(RecoveryZone::from_score(30), RecoveryZone::Vulnerability);
        assert_eq!(RecoveryZone::from_score(31), RecoveryZone::Attention);
        assert_eq!(RecoveryZone::from_score(60), RecoveryZone::Attention);
        assert_eq!(RecoveryZone::from_score(61), RecoveryZone::Stability);
        assert_eq!(RecoveryZone::from_score(90), RecoveryZone::Stability);
        assert_eq!(RecoveryZone::from_score(91), RecoveryZone::Growth);
        assert_eq!(RecoveryZone::from_score(100), RecoveryZone::Growth);
    }

    #[test]
    fn test_config_validation() {
        assert!(ScoreConfig::default().validate().is_ok());

        let zero_window = ScoreConfig {
            window_days: 0,
            ..ScoreConfig::default()
        };
        assert!(zero_window.validate().is_err());

        let zero_step = ScoreConfig {
            trigger_step: 0,
            ..ScoreConfig::default()
        };
        assert!(zero_step.validate().is_err());
    }

    #[test]
    fn test_result_serialization() {
        let activities = vec![
            record(ActivityCategory::Tasks, 10, 0),
            record(ActivityCategory::Trigger, 0, 1),
        ];
        let result = ScoreCalculator::new().compute(&activities);

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("total_score"));
        assert!(json.contains("trigger_penalty"));

        let back: ScoreResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }

    // Property tests over the calculator's documented domain.

    const ALL_CATEGORIES: [ActivityCategory; 6] = [
        ActivityCategory::Tasks,
        ActivityCategory::Mood,
        ActivityCategory::Devotional,
        ActivityCategory::SobrietyCommitment,
        ActivityCategory::Reflection,
        ActivityCategory::Trigger,
    ];

    fn arb_record() -> impl Strategy<Value = ActivityRecord> {
        (0usize..ALL_CATEGORIES.len(), 0u32..500, 0i64..10_080).prop_map(
            |(index, points, minute_offset)| {
                let category = ALL_CATEGORIES[index];
                let points = if category.is_trigger() { 0 } else { points };
                record(category, points, minute_offset)
            },
        )
    }

    fn arb_positive_record() -> impl Strategy<Value = ActivityRecord> {
        (0usize..ActivityCategory::SCORING.len(), 1u32..500, 0i64..10_080).prop_map(
            |(index, points, minute_offset)| {
                record(ActivityCategory::SCORING[index], points, minute_offset)
            },
        )
    }

    proptest! {
        #[test]
        fn prop_total_score_is_bounded(
            activities in prop::collection::vec(arb_record(), 0..50)
        ) {
            let result = ScoreCalculator::new().compute(&activities);
            prop_assert!(result.total_score <= MAX_SCORE);
        }

        #[test]
        fn prop_no_triggers_means_sum_of_capped_points(
            activities in prop::collection::vec(arb_positive_record(), 0..50)
        ) {
            let result = ScoreCalculator::new().compute(&activities);
            prop_assert_eq!(result.trigger_penalty, 0);
            prop_assert_eq!(
                result.total_score,
                result.category_points.sum().min(MAX_SCORE)
            );
        }

        #[test]
        fn prop_category_contribution_never_exceeds_ceiling(
            activities in prop::collection::vec(arb_record(), 0..50)
        ) {
            let calc = ScoreCalculator::new();
            let result = calc.compute(&activities);
            for category in ActivityCategory::SCORING {
                prop_assert!(
                    result.category_points.get(category)
                        <= calc.config().ceilings.get(category)
                );
            }
        }

        #[test]
        fn prop_adding_positive_record_never_decreases_score(
            activities in prop::collection::vec(arb_record(), 0..50),
            extra in arb_positive_record()
        ) {
            let calc = ScoreCalculator::new();
            let before = calc.compute(&activities).total_score;

            let mut with_extra = activities;
            with_extra.push(extra);
            let after = calc.compute(&with_extra).total_score;

            prop_assert!(after >= before);
        }

        #[test]
        fn prop_trigger_penalty_matches_closed_form(count in 0usize..30) {
            let activities: Vec<_> = (0..count)
                .map(|i| record(ActivityCategory::Trigger, 0, i as i64))
                .collect();

            let result = ScoreCalculator::new().compute(&activities);
            let n = count as u32;
            prop_assert_eq!(result.trigger_penalty, 3 * n * (n + 1) / 2);
            prop_assert_eq!(result.has_multiple_triggers, count > 1);
        }
    }
}
