use chrono::{Duration, Utc};
use clap::Subcommand;

use reclaim_core::storage::Config;
use reclaim_core::{LedgerDb, MessageCache, MessageSelector};

#[derive(Subcommand)]
pub enum DailyAction {
    /// Today's encouragement message
    Show,
}

pub fn run(user: &str, action: DailyAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = LedgerDb::open()?;
    let config = Config::load()?;

    match action {
        DailyAction::Show => {
            let selector = MessageSelector::new(config.messages.messages.clone());
            let cache = MessageCache::new(
                &db,
                Duration::hours(i64::from(config.messages.cache_ttl_hours)),
            );

            let now = Utc::now();
            let message = cache.get_or_insert(user, now.date_naive(), now, &selector)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "date": now.date_naive(),
                    "message": message,
                }))?
            );
        }
    }
    Ok(())
}
