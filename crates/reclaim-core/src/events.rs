use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::activity::ActivityCategory;
use crate::scoring::RecoveryZone;

/// Every state change in the system produces an Event.
/// The CLI emits them as JSON; a GUI shell or integration subscribes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    ActivityLogged {
        id: String,
        user_id: String,
        category: ActivityCategory,
        points: u32,
        at: DateTime<Utc>,
    },
    ScoreComputed {
        user_id: String,
        total_score: u32,
        zone: RecoveryZone,
        at: DateTime<Utc>,
    },
    MilestoneAwarded {
        user_id: String,
        days_milestone: u32,
        at: DateTime<Utc>,
    },
    /// Thermometer reset: all activities in the window were deleted.
    LedgerReset {
        user_id: String,
        removed: usize,
        at: DateTime<Utc>,
    },
    SobrietyStartSet {
        user_id: String,
        start_date: NaiveDate,
        at: DateTime<Utc>,
    },
}
