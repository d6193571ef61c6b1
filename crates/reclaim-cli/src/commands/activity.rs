use chrono::Utc;
use clap::Subcommand;
use reclaim_core::storage::Config;
use reclaim_core::{ActivityCategory, ActivityLedger, ActivityRecord, Event, LedgerDb, ScoringWindow};

#[derive(Subcommand)]
pub enum ActivityAction {
    /// Log an activity
    Log {
        /// Category: tasks, mood, devotional, sobriety_commitment,
        /// reflection, trigger
        category: String,
        /// Points for this record (triggers take none)
        #[arg(default_value_t = 0)]
        points: u32,
        /// Optional free-text note
        #[arg(long)]
        note: Option<String>,
    },
    /// List activities in the scoring window
    List {
        /// Window length in days (defaults to the configured window)
        #[arg(long)]
        days: Option<u32>,
    },
}

pub fn run(user: &str, action: ActivityAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = LedgerDb::open()?;

    match action {
        ActivityAction::Log {
            category,
            points,
            note,
        } => {
            let category: ActivityCategory = category.parse()?;
            let now = Utc::now();
            let mut record = ActivityRecord::new(user, category, points, now)?;
            if let Some(note) = note {
                record = record.with_note(note);
            }
            db.record_activity(&record)?;

            let event = Event::ActivityLogged {
                id: record.id.clone(),
                user_id: record.user_id.clone(),
                category,
                points,
                at: now,
            };
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        ActivityAction::List { days } => {
            let config = Config::load()?;
            let days = days.unwrap_or(config.scoring.window_days);
            let window = ScoringWindow::trailing_days(Utc::now(), days);
            let records = db.fetch_activities(user, &window)?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }
    Ok(())
}
