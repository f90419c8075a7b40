//! Weekly completion row.

use chrono::{DateTime, Datelike, Duration, Local, NaiveTime};

use crate::recurrence::resolve_local;

/// Monday 00:00 local of the week containing `now`.
pub fn week_start(now: DateTime<Local>) -> DateTime<Local> {
    let days_from_monday = i64::from(now.weekday().num_days_from_monday());
    let monday = now.date_naive() - Duration::days(days_from_monday);
    resolve_local(monday.and_time(NaiveTime::MIN))
}

/// Mon..Sun booleans for the current week.
///
/// A weekday is marked when any completion instant falls inside the
/// Monday-00:00-to-`now` window. Days later in the week than `now` are
/// always false.
pub fn weekly_completion(dates: &[DateTime<Local>], now: DateTime<Local>) -> [bool; 7] {
    let start = week_start(now);
    let mut row = [false; 7];
    for date in dates {
        if *date >= start && *date <= now {
            row[date.weekday().num_days_from_monday() as usize] = true;
        }
    }
    row
}

/// Whether any completion instant falls on `now`'s local calendar day.
pub fn completed_today(dates: &[DateTime<Local>], now: DateTime<Local>) -> bool {
    let today = now.date_naive();
    dates.iter().any(|date| date.date_naive() == today)
}
