//! Chart bucketing for the metrics views.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};

use super::weekly::week_start;
use crate::error::CoreError;

const DAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Chart bucket granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// 24 hourly buckets of `now`'s day.
    Hour,
    /// Mon..Sun buckets of `now`'s week.
    Day,
    /// Week-of-month buckets of `now`'s month.
    Week,
    /// Jan..Dec buckets of `now`'s year.
    Month,
}

impl std::str::FromStr for Granularity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hour" => Ok(Granularity::Hour),
            "day" => Ok(Granularity::Day),
            "week" => Ok(Granularity::Week),
            "month" => Ok(Granularity::Month),
            other => Err(CoreError::Custom(format!("unknown granularity '{other}'"))),
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Granularity::Hour => "hour",
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
        };
        f.write_str(s)
    }
}

/// One labelled bucket of completion counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartBucket {
    pub label: String,
    pub count: u32,
}

/// Group completion instants into fixed, fully-populated buckets.
///
/// The label row is always complete (24 hours, 7 days, every week of
/// the month, 12 months) so chart axes stay stable when counts are
/// zero. Pure aggregation, no mutation.
pub fn chart(
    dates: &[DateTime<Local>],
    granularity: Granularity,
    now: DateTime<Local>,
) -> Vec<ChartBucket> {
    match granularity {
        Granularity::Hour => {
            let today = now.date_naive();
            bucketize(24, |i| format!("{i:02}"), dates, |date| {
                (date.date_naive() == today).then(|| date.hour() as usize)
            })
        }
        Granularity::Day => {
            let start = week_start(now);
            let end = crate::recurrence::advance(start, 1, crate::recurrence::RepeatUnit::Weekly);
            bucketize(7, |i| DAY_LABELS[i].to_string(), dates, |date| {
                (*date >= start && *date < end)
                    .then(|| date.weekday().num_days_from_monday() as usize)
            })
        }
        Granularity::Week => {
            // Buckets are calendar weeks, counted from the Monday of the
            // week containing the 1st.
            let first = now.date_naive().with_day(1).unwrap_or_else(|| now.date_naive());
            let origin = first - Duration::days(i64::from(first.weekday().num_days_from_monday()));
            let weeks = weeks_in_month(now.year(), now.month());
            bucketize(weeks, |i| format!("W{}", i + 1), dates, |date| {
                (date.year() == now.year() && date.month() == now.month())
                    .then(|| ((date.date_naive() - origin).num_days() / 7) as usize)
            })
        }
        Granularity::Month => bucketize(12, |i| MONTH_LABELS[i].to_string(), dates, |date| {
            (date.year() == now.year()).then(|| date.month0() as usize)
        }),
    }
}

fn bucketize(
    len: usize,
    label: impl Fn(usize) -> String,
    dates: &[DateTime<Local>],
    slot: impl Fn(&DateTime<Local>) -> Option<usize>,
) -> Vec<ChartBucket> {
    let mut buckets: Vec<ChartBucket> = (0..len)
        .map(|i| ChartBucket {
            label: label(i),
            count: 0,
        })
        .collect();
    for date in dates {
        if let Some(i) = slot(date) {
            if i < buckets.len() {
                buckets[i].count += 1;
            }
        }
    }
    buckets
}

/// Calendar weeks overlapping the month, counted from the Monday of the
/// week containing the 1st.
fn weeks_in_month(year: i32, month: u32) -> usize {
    let days = days_in_month(year, month);
    let offset = NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.weekday().num_days_from_monday())
        .unwrap_or(0);
    ((offset + days + 6) / 7) as usize
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match (first, next) {
        (Some(first), Some(next)) => (next - first).num_days() as u32,
        _ => 30,
    }
}
