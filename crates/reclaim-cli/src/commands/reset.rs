use chrono::Utc;

use reclaim_core::storage::Config;
use reclaim_core::{Event, LedgerDb, ScoringWindow};

pub fn run(user: &str, days: Option<u32>) -> Result<(), Box<dyn std::error::Error>> {
    let db = LedgerDb::open()?;
    let config = Config::load()?;

    let days = days.unwrap_or(config.scoring.window_days);
    let now = Utc::now();
    let window = ScoringWindow::trailing_days(now, days);
    let removed = db.reset_window(user, &window)?;

    let event = Event::LedgerReset {
        user_id: user.to_string(),
        removed,
        at: now,
    };
    println!("{}", serde_json::to_string_pretty(&event)?);
    Ok(())
}
