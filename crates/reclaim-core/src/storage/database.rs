//! SQLite-backed activity ledger.
//!
//! Provides persistent storage for:
//! - The append-only activity ledger (the source of truth for scoring)
//! - Awarded sobriety milestones
//! - A key-value store for per-user state (sobriety start date, stored
//!   day counter, daily message cache)

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::activity::{ActivityCategory, ActivityRecord};
use crate::error::{CoreError, DatabaseError};
use crate::ledger::{ActivityLedger, ScoringWindow};

use super::data_dir;

/// SQLite database holding the activity ledger.
///
/// Activity rows are never updated: the "reset thermometer" action deletes
/// rows in a window, and everything else is an append or a read.
pub struct LedgerDb {
    conn: Connection,
}

impl LedgerDb {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/reclaim/reclaim.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("reclaim.db");
        Self::open_at(&path)
    }

    /// Open the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, CoreError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: PathBuf::from(path),
            source,
        })?;
        // Concurrent writers (two devices, parallel CLI invocations) wait
        // instead of failing with SQLITE_BUSY.
        conn.busy_timeout(std::time::Duration::from_secs(5))
            .map_err(DatabaseError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS activities (
                    id          TEXT PRIMARY KEY,
                    user_id     TEXT NOT NULL,
                    category    TEXT NOT NULL,
                    points      INTEGER NOT NULL,
                    recorded_at TEXT NOT NULL,
                    note        TEXT
                );

                CREATE TABLE IF NOT EXISTS milestone_awards (
                    user_id        TEXT NOT NULL,
                    days_milestone INTEGER NOT NULL,
                    earned_at      TEXT NOT NULL,
                    PRIMARY KEY (user_id, days_milestone)
                );

                CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                -- Window fetches always filter by user and time range
                CREATE INDEX IF NOT EXISTS idx_activities_user_recorded
                    ON activities(user_id, recorded_at);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    /// Append one activity record to the ledger.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_activity(&self, record: &ActivityRecord) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO activities (id, user_id, category, points, recorded_at, note)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.id,
                record.user_id,
                record.category.as_str(),
                record.points,
                record.recorded_at.to_rfc3339(),
                record.note,
            ],
        )?;

        tracing::debug!(
            user_id = %record.user_id,
            category = %record.category,
            points = record.points,
            "activity recorded"
        );
        Ok(())
    }

    fn fetch_in_window(
        &self,
        user_id: &str,
        window: &ScoringWindow,
    ) -> Result<Vec<ActivityRecord>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, category, points, recorded_at, note
             FROM activities
             WHERE user_id = ?1 AND recorded_at >= ?2 AND recorded_at < ?3
             ORDER BY recorded_at ASC",
        )?;

        let rows = stmt.query_map(
            params![
                user_id,
                window.start().to_rfc3339(),
                window.end().to_rfc3339(),
            ],
            |row| {
                let category: String = row.get(2)?;
                let recorded_at: String = row.get(4)?;
                Ok(ActivityRecord {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    category: ActivityCategory::from_str(&category).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            2,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?,
                    points: row.get(3)?,
                    recorded_at: DateTime::parse_from_rfc3339(&recorded_at)
                        .map_err(|e| {
                            rusqlite::Error::FromSqlConversionFailure(
                                4,
                                rusqlite::types::Type::Text,
                                Box::new(e),
                            )
                        })?
                        .with_timezone(&Utc),
                    note: row.get(5)?,
                })
            },
        )?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Delete all activity records for a user inside a window.
    ///
    /// This backs the "reset thermometer" action: recomputing afterwards
    /// yields a zero score. Returns the number of deleted records.
    pub fn reset_window(
        &self,
        user_id: &str,
        window: &ScoringWindow,
    ) -> Result<usize, DatabaseError> {
        let removed = self.conn.execute(
            "DELETE FROM activities
             WHERE user_id = ?1 AND recorded_at >= ?2 AND recorded_at < ?3",
            params![
                user_id,
                window.start().to_rfc3339(),
                window.end().to_rfc3339(),
            ],
        )?;

        tracing::debug!(user_id, removed, "ledger window reset");
        Ok(removed)
    }

    /// Persist a milestone award. Awarding is idempotent: re-inserting an
    /// existing (user, threshold) pair is a no-op. Returns true when the
    /// award is new.
    pub fn award_milestone(
        &self,
        user_id: &str,
        days_milestone: u32,
        earned_at: DateTime<Utc>,
    ) -> Result<bool, DatabaseError> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO milestone_awards (user_id, days_milestone, earned_at)
             VALUES (?1, ?2, ?3)",
            params![user_id, days_milestone, earned_at.to_rfc3339()],
        )?;
        Ok(inserted == 1)
    }

    /// Thresholds already awarded to a user.
    pub fn awarded_milestones(&self, user_id: &str) -> Result<BTreeSet<u32>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT days_milestone FROM milestone_awards WHERE user_id = ?1",
        )?;
        let rows = stmt.query_map(params![user_id], |row| row.get::<_, u32>(0))?;

        let mut awarded = BTreeSet::new();
        for row in rows {
            awarded.insert(row?);
        }
        Ok(awarded)
    }

    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}

impl ActivityLedger for LedgerDb {
    /// Fetch the records relevant to scoring.
    ///
    /// A user with no rows (including one that never existed) yields an
    /// empty vec, per the ledger contract.
    fn fetch_activities(
        &self,
        user_id: &str,
        window: &ScoringWindow,
    ) -> Result<Vec<ActivityRecord>, CoreError> {
        Ok(self.fetch_in_window(user_id, window)?)
    }
}
