//! Activity ledger contract.
//!
//! The ledger is the only boundary that performs IO. The engine defines
//! the exact shape and filtering contract it requires here; the SQLite
//! implementation lives in [`crate::storage::database`].

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::activity::ActivityRecord;
use crate::error::{CoreError, ValidationError};

/// Half-open time range `[start, end)` over which activities are scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl ScoringWindow {
    /// Create a window.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidWindow`] if `start > end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Trailing window of `days` days ending at `end` (exclusive).
    pub fn trailing_days(end: DateTime<Utc>, days: u32) -> Self {
        Self {
            start: end - Duration::days(i64::from(days)),
            end,
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Whether a timestamp falls inside the window. The end bound is
    /// exclusive.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

/// Read side of the activity store.
///
/// Implementations must return only records with `recorded_at` inside the
/// window, and an empty vec for a user with no records: a brand-new user
/// scores a well-defined zero rather than erroring. The returned set is a
/// consistent snapshot for the window; no cross-request isolation is
/// required.
pub trait ActivityLedger {
    fn fetch_activities(
        &self,
        user_id: &str,
        window: &ScoringWindow,
    ) -> Result<Vec<ActivityRecord>, CoreError>;
}
