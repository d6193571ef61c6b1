use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use serde::Serialize;

use reclaim_core::storage::Config;
use reclaim_core::{days_sober, Event, LedgerDb, MilestoneEvaluator};

#[derive(Subcommand)]
pub enum SobrietyAction {
    /// Days sober and both day-count sources
    Status,
    /// Set the sobriety start date (YYYY-MM-DD)
    SetStart { date: NaiveDate },
    /// Set the stored day counter (for streaks that predate the app)
    SetCounter { days: i64 },
    /// Evaluate and award newly reached milestones
    Milestones,
}

#[derive(Serialize)]
struct SobrietyStatus {
    user_id: String,
    start_date: Option<NaiveDate>,
    stored_counter: i64,
    days_sober: i64,
}

fn start_key(user: &str) -> String {
    format!("sobriety_start:{user}")
}

fn counter_key(user: &str) -> String {
    format!("sobriety_counter:{user}")
}

fn load_sources(db: &LedgerDb, user: &str) -> Result<(Option<NaiveDate>, i64), Box<dyn std::error::Error>> {
    let start_date = db
        .kv_get(&start_key(user))?
        .map(|raw| raw.parse::<NaiveDate>())
        .transpose()?;
    let stored_counter = db
        .kv_get(&counter_key(user))?
        .map(|raw| raw.parse::<i64>())
        .transpose()?
        .unwrap_or(0);
    Ok((start_date, stored_counter))
}

pub fn run(user: &str, action: SobrietyAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = LedgerDb::open()?;

    match action {
        SobrietyAction::Status => {
            let (start_date, stored_counter) = load_sources(&db, user)?;
            let status = SobrietyStatus {
                user_id: user.to_string(),
                start_date,
                stored_counter,
                days_sober: days_sober(start_date, stored_counter, Utc::now().date_naive()),
            };
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        SobrietyAction::SetStart { date } => {
            db.kv_set(&start_key(user), &date.to_string())?;
            let event = Event::SobrietyStartSet {
                user_id: user.to_string(),
                start_date: date,
                at: Utc::now(),
            };
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        SobrietyAction::SetCounter { days } => {
            db.kv_set(&counter_key(user), &days.to_string())?;
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({
                "user_id": user,
                "stored_counter": days,
            }))?);
        }
        SobrietyAction::Milestones => {
            let config = Config::load()?;
            let (start_date, stored_counter) = load_sources(&db, user)?;
            let now = Utc::now();
            let days = days_sober(start_date, stored_counter, now.date_naive());

            let awarded = db.awarded_milestones(user)?;
            let evaluator = MilestoneEvaluator::with_catalogue(config.milestones.to_catalogue());

            let mut events = Vec::new();
            for award in evaluator.evaluate(days, &awarded, now) {
                db.award_milestone(user, award.days_milestone, award.earned_at)?;
                events.push(Event::MilestoneAwarded {
                    user_id: user.to_string(),
                    days_milestone: award.days_milestone,
                    at: award.earned_at,
                });
            }
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
    }
    Ok(())
}
