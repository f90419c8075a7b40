//! Statistics for habit tracking.
//!
//! Derived metrics over the ledger's completion history: the global
//! accuracy percentage, the Monday-to-Sunday weekly completion row and
//! the chart bucketing used by the metrics views. Everything here is a
//! pure read; the counters themselves are mutated only by the ledger.

mod accuracy;
mod charts;
mod weekly;

pub use accuracy::accuracy;
pub use charts::{chart, ChartBucket, Granularity};
pub use weekly::{completed_today, week_start, weekly_completion};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Accumulated opportunity/completion aggregate.
///
/// Persisted alongside the habits but logically derivable from them.
/// Mutated only by ledger operations, which keep
/// `total_completions <= total_opportunities` by construction: every
/// completion consumes one previously fired opportunity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitStats {
    /// Total notification opportunities ever fired, across all habits.
    #[serde(default)]
    pub total_opportunities: u64,
    /// Total confirmed completions, across all habits.
    #[serde(default)]
    pub total_completions: u64,
    /// Completion instants, append-ordered.
    #[serde(default)]
    pub completion_dates: Vec<DateTime<Local>>,
}

impl HabitStats {
    /// Completions over opportunities as a whole percentage, 0-100.
    pub fn accuracy(&self) -> u8 {
        accuracy(self.total_completions, self.total_opportunities)
    }

    /// Weekly completion row for the week containing `now`.
    pub fn weekly_completion(&self, now: DateTime<Local>) -> [bool; 7] {
        weekly_completion(&self.completion_dates, now)
    }
}
