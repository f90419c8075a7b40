//! Completion-eligibility windows for fired notifications.

use chrono::{DateTime, Local, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::recurrence::resolve_local;

/// The time range during which a fired notification's completion action
/// is considered valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceWindow {
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
}

impl OccurrenceWindow {
    /// Inclusive containment check.
    pub fn contains(&self, instant: DateTime<Local>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

/// Window for a firing at `scheduled_at`: opens at the fire instant and
/// closes at 23:59:59.999 local time on the same calendar day.
///
/// The window is deliberately not a function of the recurrence unit; an
/// hourly habit notified at 23:30 still closes at midnight. Whether
/// overnight-spanning schedules deserve a window past midnight is an
/// open product question, recorded here rather than resolved.
pub fn occurrence_window(scheduled_at: DateTime<Local>) -> OccurrenceWindow {
    let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    let end = resolve_local(scheduled_at.date_naive().and_time(end_of_day));
    OccurrenceWindow {
        start: scheduled_at,
        end,
    }
}
