use chrono::Utc;
use clap::Subcommand;
use serde::Serialize;

use reclaim_core::storage::Config;
use reclaim_core::{
    ActivityLedger, LedgerDb, RecoveryZone, ScoreCalculator, ScoreResult, ScoringWindow,
};

#[derive(Subcommand)]
pub enum ScoreAction {
    /// Current score with zone and per-category breakdown
    Show {
        /// Window length in days (defaults to the configured window)
        #[arg(long)]
        days: Option<u32>,
    },
}

#[derive(Serialize)]
struct ScoreView {
    #[serde(flatten)]
    result: ScoreResult,
    zone: RecoveryZone,
    zone_description: &'static str,
}

pub fn run(user: &str, action: ScoreAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = LedgerDb::open()?;
    let config = Config::load()?;
    let score_config = config.scoring.to_score_config();
    score_config.validate()?;

    match action {
        ScoreAction::Show { days } => {
            let days = days.unwrap_or(score_config.window_days);
            let window = ScoringWindow::trailing_days(Utc::now(), days);
            let activities = db.fetch_activities(user, &window)?;

            let result = ScoreCalculator::with_config(score_config).compute(&activities);
            let zone = result.zone();
            let view = ScoreView {
                result,
                zone,
                zone_description: zone.description(),
            };
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
    }
    Ok(())
}
