use becomeit_core::stats::{chart, Granularity};
use becomeit_core::storage::{HabitStore, PersistenceGateway};
use chrono::Local;
use clap::Subcommand;
use serde::Serialize;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Accuracy, totals and the weekly completion row
    Show,
    /// Completion counts bucketed for charting
    Chart {
        /// Bucket granularity: hour, day, week or month
        #[arg(long, default_value = "day")]
        granularity: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsSnapshot {
    total_opportunities: u64,
    total_completions: u64,
    accuracy: u8,
    /// Mon..Sun of the current week.
    weekly_completion: [bool; 7],
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = HabitStore::open()?;
    let stats = store.load_stats()?;
    let now = Local::now();

    match action {
        StatsAction::Show => {
            let snapshot = StatsSnapshot {
                total_opportunities: stats.total_opportunities,
                total_completions: stats.total_completions,
                accuracy: stats.accuracy(),
                weekly_completion: stats.weekly_completion(now),
            };
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        StatsAction::Chart { granularity } => {
            let granularity: Granularity = granularity.parse()?;
            let buckets = chart(&stats.completion_dates, granularity, now);
            println!("{}", serde_json::to_string_pretty(&buckets)?);
        }
    }
    Ok(())
}
