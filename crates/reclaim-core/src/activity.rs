//! Activity model and the ingestion validation boundary.
//!
//! An [`ActivityRecord`] is one logged user action. Records are immutable
//! after creation; the ledger is append-only from the engine's point of
//! view. Category strings are parsed exactly once, here, against a closed
//! enum so miscategorized input can never reach the score calculator.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Category of a logged activity.
///
/// The set is closed: anything outside these six variants is rejected at
/// the ingestion boundary with [`ValidationError::InvalidCategory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCategory {
    /// Completed daily tasks
    Tasks,
    /// Mood check-in
    Mood,
    /// Devotional reading
    Devotional,
    /// Explicit "not today" sobriety declaration
    SobrietyCommitment,
    /// Written reflection
    Reflection,
    /// A relapse-risk event. Carries no intrinsic points; its cost is
    /// positional and computed by the score calculator.
    Trigger,
}

impl ActivityCategory {
    /// The five categories that contribute positive points to the score.
    pub const SCORING: [ActivityCategory; 5] = [
        ActivityCategory::Tasks,
        ActivityCategory::Mood,
        ActivityCategory::Devotional,
        ActivityCategory::SobrietyCommitment,
        ActivityCategory::Reflection,
    ];

    /// Canonical string form, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityCategory::Tasks => "tasks",
            ActivityCategory::Mood => "mood",
            ActivityCategory::Devotional => "devotional",
            ActivityCategory::SobrietyCommitment => "sobriety_commitment",
            ActivityCategory::Reflection => "reflection",
            ActivityCategory::Trigger => "trigger",
        }
    }

    pub fn is_trigger(&self) -> bool {
        matches!(self, ActivityCategory::Trigger)
    }
}

impl fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tasks" => Ok(ActivityCategory::Tasks),
            "mood" => Ok(ActivityCategory::Mood),
            "devotional" => Ok(ActivityCategory::Devotional),
            "sobriety_commitment" => Ok(ActivityCategory::SobrietyCommitment),
            "reflection" => Ok(ActivityCategory::Reflection),
            "trigger" => Ok(ActivityCategory::Trigger),
            other => Err(ValidationError::InvalidCategory {
                value: other.to_string(),
            }),
        }
    }
}

/// One logged user action.
///
/// `points` is an unsigned magnitude attributed at logging time, so a
/// negative value is unrepresentable. Trigger records always carry zero
/// points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: String,
    pub user_id: String,
    pub category: ActivityCategory,
    pub points: u32,
    pub recorded_at: DateTime<Utc>,
    /// Free text, not used in scoring.
    pub note: Option<String>,
}

impl ActivityRecord {
    /// Create a new record with a fresh id.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidValue`] if a trigger record
    /// carries nonzero points.
    pub fn new(
        user_id: impl Into<String>,
        category: ActivityCategory,
        points: u32,
        recorded_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if category.is_trigger() && points != 0 {
            return Err(ValidationError::InvalidValue {
                field: "points".to_string(),
                message: format!(
                    "trigger records carry no intrinsic points (got {points})"
                ),
            });
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            category,
            points,
            recorded_at,
            note: None,
        })
    }

    /// Attach a free-text note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc_datetime(year: i32, month: u32, day: u32, hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, min, 0).unwrap()
    }

    #[test]
    fn test_category_parse_roundtrip() {
        for category in [
            ActivityCategory::Tasks,
            ActivityCategory::Mood,
            ActivityCategory::Devotional,
            ActivityCategory::SobrietyCommitment,
            ActivityCategory::Reflection,
            ActivityCategory::Trigger,
        ] {
            let parsed: ActivityCategory = category.as_str().parse().unwrap();
            assert_eq!(parsed, category);
        }
    }

    #[test]
    fn test_unknown_category_rejected() {
        let err = "HojeNaoVouUsar".parse::<ActivityCategory>().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidCategory { .. }));

        // Casing is significant: the boundary is strict.
        assert!("Tasks".parse::<ActivityCategory>().is_err());
        assert!("".parse::<ActivityCategory>().is_err());
    }

    #[test]
    fn test_scoring_categories_exclude_trigger() {
        assert_eq!(ActivityCategory::SCORING.len(), 5);
        assert!(!ActivityCategory::SCORING.contains(&ActivityCategory::Trigger));
    }

    #[test]
    fn test_record_creation() {
        let at = utc_datetime(2025, 3, 10, 9, 30);
        let record = ActivityRecord::new("u1", ActivityCategory::Mood, 5, at)
            .unwrap()
            .with_note("feeling steady");

        assert_eq!(record.user_id, "u1");
        assert_eq!(record.points, 5);
        assert_eq!(record.recorded_at, at);
        assert_eq!(record.note.as_deref(), Some("feeling steady"));
        assert!(!record.id.is_empty());
    }

    #[test]
    fn test_trigger_with_points_rejected() {
        let at = utc_datetime(2025, 3, 10, 9, 30);
        let err = ActivityRecord::new("u1", ActivityCategory::Trigger, 3, at).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue { .. }));

        // Zero points is the only valid trigger shape.
        assert!(ActivityRecord::new("u1", ActivityCategory::Trigger, 0, at).is_ok());
    }

    #[test]
    fn test_serde_uses_snake_case_tags() {
        let at = utc_datetime(2025, 3, 10, 9, 30);
        let record = ActivityRecord::new("u1", ActivityCategory::SobrietyCommitment, 25, at).unwrap();
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"sobriety_commitment\""));

        let back: ActivityRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
