//! Recurrence rules and next-fire-date math.
//!
//! A [`Recurrence`] is the pure schedule value embedded in every habit:
//! a repeat unit, a whole-number interval and a wall-clock anchor time
//! ("HH:mm"). All date math is local wall-clock time; callers pass `now`
//! explicitly so the functions stay deterministic under test.

use chrono::{DateTime, Duration, Local, LocalResult, Months, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

const MS_PER_MINUTE: u64 = 60_000;
const MS_PER_HOUR: u64 = 3_600_000;
const MS_PER_DAY: u64 = 86_400_000;

/// Upper bound on [`Recurrence::interval`], enforced at construction.
/// Keeps every calendar step well inside the representable date range.
pub const MAX_INTERVAL: u32 = 10_000;

/// Supported repeat units.
///
/// Serialized lowercase (`"daily"`, `"weekly"`, ...) to match the
/// persisted habit shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatUnit {
    Minutes,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RepeatUnit {
    pub const ALL: [RepeatUnit; 6] = [
        RepeatUnit::Minutes,
        RepeatUnit::Hourly,
        RepeatUnit::Daily,
        RepeatUnit::Weekly,
        RepeatUnit::Monthly,
        RepeatUnit::Yearly,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RepeatUnit::Minutes => "minutes",
            RepeatUnit::Hourly => "hourly",
            RepeatUnit::Daily => "daily",
            RepeatUnit::Weekly => "weekly",
            RepeatUnit::Monthly => "monthly",
            RepeatUnit::Yearly => "yearly",
        }
    }
}

impl std::str::FromStr for RepeatUnit {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minutes" => Ok(RepeatUnit::Minutes),
            "hourly" => Ok(RepeatUnit::Hourly),
            "daily" => Ok(RepeatUnit::Daily),
            "weekly" => Ok(RepeatUnit::Weekly),
            "monthly" => Ok(RepeatUnit::Monthly),
            "yearly" => Ok(RepeatUnit::Yearly),
            other => Err(ScheduleError::UnknownUnit(other.to_string())),
        }
    }
}

impl std::fmt::Display for RepeatUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One whole interval in milliseconds.
///
/// Monthly and yearly use the 30-day / 365-day approximation. This table
/// backs duration displays and elapsed-interval counting; calendar
/// stepping in [`advance`] uses real month arithmetic instead.
///
/// Uses saturating arithmetic: returns `u64::MAX` instead of
/// overflowing for intervals beyond any validated rule.
pub fn interval_ms(interval: u32, unit: RepeatUnit) -> u64 {
    let per_step = match unit {
        RepeatUnit::Minutes => MS_PER_MINUTE,
        RepeatUnit::Hourly => MS_PER_HOUR,
        RepeatUnit::Daily => MS_PER_DAY,
        RepeatUnit::Weekly => 7 * MS_PER_DAY,
        RepeatUnit::Monthly => 30 * MS_PER_DAY,
        RepeatUnit::Yearly => 365 * MS_PER_DAY,
    };
    per_step.saturating_mul(u64::from(interval))
}

/// A habit's recurrence rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recurrence {
    pub unit: RepeatUnit,
    pub interval: u32,
    /// Wall-clock anchor, "HH:mm".
    pub start_time: String,
}

impl Recurrence {
    /// Build a validated rule.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidInterval`] when `interval` is zero
    /// or above [`MAX_INTERVAL`], and [`ScheduleError::InvalidStartTime`]
    /// when `start_time` is not a valid `HH:mm` string.
    pub fn new(
        unit: RepeatUnit,
        interval: u32,
        start_time: impl Into<String>,
    ) -> Result<Self, ScheduleError> {
        let rule = Self {
            unit,
            interval,
            start_time: start_time.into(),
        };
        rule.validate()?;
        Ok(rule)
    }

    /// Re-check the rule's invariants.
    ///
    /// Used on values that did not go through [`Recurrence::new`], e.g.
    /// deserialized from storage.
    ///
    /// # Errors
    ///
    /// Same failures as [`Recurrence::new`].
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.interval == 0 || self.interval > MAX_INTERVAL {
            return Err(ScheduleError::InvalidInterval {
                interval: self.interval,
            });
        }
        self.anchor_time()?;
        Ok(())
    }

    /// The parsed "HH:mm" anchor.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidStartTime`] when the stored string
    /// does not parse.
    pub fn anchor_time(&self) -> Result<NaiveTime, ScheduleError> {
        parse_hhmm(&self.start_time)
    }

    /// One whole interval of this rule in milliseconds.
    pub fn interval_ms(&self) -> u64 {
        interval_ms(self.interval, self.unit)
    }

    /// Human-readable schedule label, e.g. `"daily @ 08:00"` or
    /// `"every 3 hourly @ 09:30"`.
    pub fn label(&self) -> String {
        if self.interval == 1 {
            format!("{} @ {}", self.unit, self.start_time)
        } else {
            format!("every {} {} @ {}", self.interval, self.unit, self.start_time)
        }
    }
}

/// Parse a "HH:mm" wall-clock string.
pub(crate) fn parse_hhmm(value: &str) -> Result<NaiveTime, ScheduleError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| ScheduleError::InvalidStartTime {
        value: value.to_string(),
    })
}

/// Resolve a naive wall-clock time to a concrete local instant.
///
/// Times skipped by a DST jump resolve to the first valid instant after
/// the gap; ambiguous times take the earlier offset.
pub(crate) fn resolve_local(mut naive: NaiveDateTime) -> DateTime<Local> {
    loop {
        match naive.and_local_timezone(Local) {
            LocalResult::Single(dt) => return dt,
            LocalResult::Ambiguous(earlier, _) => return earlier,
            LocalResult::None => naive += Duration::minutes(15),
        }
    }
}

/// Step a date forward by one whole interval.
///
/// Minutes through weekly are fixed durations. Monthly and yearly use
/// calendar month arithmetic (Jan 31 + 1 month = Feb 28/29), falling
/// back to the approximate duration only if the calendar step cannot be
/// represented. A step that would leave the representable date range
/// returns `date` unchanged instead of panicking; for any validated
/// rule and a real clock the result is strictly after `date`.
pub fn advance(date: DateTime<Local>, interval: u32, unit: RepeatUnit) -> DateTime<Local> {
    let n = i64::from(interval);
    let stepped = match unit {
        RepeatUnit::Minutes => date.checked_add_signed(Duration::minutes(n)),
        RepeatUnit::Hourly => date.checked_add_signed(Duration::hours(n)),
        RepeatUnit::Daily => date.checked_add_signed(Duration::days(n)),
        RepeatUnit::Weekly => date.checked_add_signed(Duration::weeks(n)),
        RepeatUnit::Monthly => date
            .checked_add_months(Months::new(interval))
            .or_else(|| Duration::try_days(30 * n).and_then(|d| date.checked_add_signed(d))),
        RepeatUnit::Yearly => date
            .checked_add_months(Months::new(interval.saturating_mul(12)))
            .or_else(|| Duration::try_days(365 * n).and_then(|d| date.checked_add_signed(d))),
    };
    stepped.unwrap_or(date)
}

/// Next occurrence derived purely from the rule's anchor time.
///
/// Anchors `start_time` on `now`'s calendar day, then advances in whole
/// intervals until strictly after `now`. Used for first-ever scheduling,
/// before any notification has fired. Terminates because `advance`
/// strictly increases the date for any validated rule.
///
/// # Errors
///
/// Returns [`ScheduleError::InvalidStartTime`] when the stored anchor
/// does not parse.
pub fn next_occurrence(
    rule: &Recurrence,
    now: DateTime<Local>,
) -> Result<DateTime<Local>, ScheduleError> {
    let at = rule.anchor_time()?;
    let mut next = resolve_local(now.date_naive().and_time(at));
    while next <= now {
        next = advance(next, rule.interval.max(1), rule.unit);
    }
    Ok(next)
}

/// Next fire date for a habit.
///
/// With `from` given (typically the last fire), steps one interval past
/// it, then keeps stepping until strictly after `now`: a stale `from`
/// never yields an instant in the past. Without it, falls back to
/// anchoring on `now`'s day via [`next_occurrence`].
///
/// # Errors
///
/// Returns [`ScheduleError::InvalidStartTime`] when anchoring is needed
/// and the stored anchor does not parse.
pub fn next_fire_date(
    rule: &Recurrence,
    from: Option<DateTime<Local>>,
    now: DateTime<Local>,
) -> Result<DateTime<Local>, ScheduleError> {
    match from {
        Some(from) => {
            let mut next = advance(from, rule.interval.max(1), rule.unit);
            while next <= now {
                next = advance(next, rule.interval.max(1), rule.unit);
            }
            Ok(next)
        }
        None => next_occurrence(rule, now),
    }
}

/// How many whole intervals have elapsed between two instants.
///
/// Zero when `now <= since`. Uses the approximate millisecond table, so
/// monthly/yearly counts are 30/365-day estimates.
pub fn elapsed_intervals(rule: &Recurrence, since: DateTime<Local>, now: DateTime<Local>) -> u64 {
    let elapsed = (now - since).num_milliseconds();
    if elapsed <= 0 {
        return 0;
    }
    let step = rule.interval_ms();
    if step == 0 {
        return 0;
    }
    elapsed as u64 / step
}

/// Compact countdown string for list output: `"3 days"`, `"2h 5m"`,
/// `"12m"`, `"45s"`, or `"now"` once the instant has passed.
pub fn format_countdown(next: DateTime<Local>, now: DateTime<Local>) -> String {
    let remaining = next - now;
    if remaining <= Duration::zero() {
        return "now".to_string();
    }
    let days = remaining.num_days();
    if days > 0 {
        return if days == 1 {
            "1 day".to_string()
        } else {
            format!("{days} days")
        };
    }
    let hours = remaining.num_hours();
    let minutes = remaining.num_minutes() % 60;
    if hours > 0 {
        return format!("{hours}h {minutes}m");
    }
    if minutes > 0 {
        return format!("{minutes}m");
    }
    format!("{}s", remaining.num_seconds().max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(y, mo, d, h, mi, s)
            .single()
            .expect("unambiguous local time")
    }

    fn daily_at_8() -> Recurrence {
        Recurrence::new(RepeatUnit::Daily, 1, "08:00").unwrap()
    }

    #[test]
    fn interval_ms_table() {
        assert_eq!(interval_ms(1, RepeatUnit::Minutes), 60_000);
        assert_eq!(interval_ms(2, RepeatUnit::Hourly), 7_200_000);
        assert_eq!(interval_ms(1, RepeatUnit::Daily), 86_400_000);
        assert_eq!(interval_ms(1, RepeatUnit::Weekly), 604_800_000);
        assert_eq!(interval_ms(1, RepeatUnit::Monthly), 2_592_000_000);
        assert_eq!(interval_ms(1, RepeatUnit::Yearly), 31_536_000_000);
    }

    #[test]
    fn interval_ms_saturates_instead_of_overflowing() {
        assert_eq!(interval_ms(600_000_000, RepeatUnit::Yearly), u64::MAX);
        assert_eq!(interval_ms(u32::MAX, RepeatUnit::Yearly), u64::MAX);
    }

    #[test]
    fn rejects_zero_interval() {
        let err = Recurrence::new(RepeatUnit::Minutes, 0, "08:00").unwrap_err();
        assert_eq!(err, ScheduleError::InvalidInterval { interval: 0 });
    }

    #[test]
    fn rejects_oversized_interval() {
        let err = Recurrence::new(RepeatUnit::Monthly, 4_000_000, "08:00").unwrap_err();
        assert_eq!(err, ScheduleError::InvalidInterval { interval: 4_000_000 });
        assert!(Recurrence::new(RepeatUnit::Monthly, MAX_INTERVAL, "08:00").is_ok());
    }

    #[test]
    fn rejects_malformed_start_time() {
        for bad in ["8am", "25:00", "12:60", "", "12-30"] {
            let err = Recurrence::new(RepeatUnit::Daily, 1, bad).unwrap_err();
            assert!(matches!(err, ScheduleError::InvalidStartTime { .. }), "{bad}");
        }
    }

    #[test]
    fn accepts_valid_start_times() {
        for good in ["00:00", "08:00", "23:59", "9:05"] {
            assert!(Recurrence::new(RepeatUnit::Daily, 1, good).is_ok(), "{good}");
        }
    }

    #[test]
    fn unit_parse_roundtrip() {
        for unit in RepeatUnit::ALL {
            assert_eq!(unit.as_str().parse::<RepeatUnit>().unwrap(), unit);
        }
        assert!(matches!(
            "fortnightly".parse::<RepeatUnit>(),
            Err(ScheduleError::UnknownUnit(_))
        ));
    }

    #[test]
    fn next_occurrence_before_anchor_fires_same_day() {
        // Created 07:00, anchored 08:00: first occurrence is 08:00 today.
        let now = local(2024, 1, 1, 7, 0, 0);
        let next = next_occurrence(&daily_at_8(), now).unwrap();
        assert_eq!(next, local(2024, 1, 1, 8, 0, 0));
    }

    #[test]
    fn next_fire_after_anchor_rolls_to_tomorrow() {
        let now = local(2024, 1, 1, 9, 0, 0);
        let next = next_fire_date(&daily_at_8(), None, now).unwrap();
        assert_eq!(next, local(2024, 1, 2, 8, 0, 0));
    }

    #[test]
    fn next_fire_from_instant_adds_one_interval() {
        let last = local(2024, 1, 1, 8, 0, 0);
        let now = local(2024, 1, 1, 8, 30, 0);
        let next = next_fire_date(&daily_at_8(), Some(last), now).unwrap();
        assert_eq!(next, local(2024, 1, 2, 8, 0, 0));
    }

    #[test]
    fn next_fire_from_stale_instant_catches_up_past_now() {
        // Last fired ten days ago; a single step would land in the past.
        let last = local(2024, 3, 10, 9, 0, 0);
        let now = local(2024, 3, 20, 9, 0, 0);
        let next = next_fire_date(&daily_at_8(), Some(last), now).unwrap();
        assert_eq!(next, local(2024, 3, 21, 9, 0, 0));
    }

    #[test]
    fn next_fire_is_strictly_future_for_every_unit() {
        let now = local(2024, 3, 15, 12, 34, 56);
        for unit in RepeatUnit::ALL {
            for interval in [1, 2, 7] {
                let rule = Recurrence::new(unit, interval, "12:34").unwrap();
                let next = next_fire_date(&rule, None, now).unwrap();
                assert!(next > now, "{unit} x{interval} gave {next}");
            }
        }
    }

    #[test]
    fn hourly_anchor_catches_up_in_whole_steps() {
        // Anchor 06:00, every 2 hours: 06, 08, 10... now 09:30 -> 10:00.
        let rule = Recurrence::new(RepeatUnit::Hourly, 2, "06:00").unwrap();
        let now = local(2024, 1, 1, 9, 30, 0);
        let next = next_occurrence(&rule, now).unwrap();
        assert_eq!(next, local(2024, 1, 1, 10, 0, 0));
    }

    #[test]
    fn monthly_advance_clamps_short_months() {
        let jan31 = local(2024, 1, 31, 8, 0, 0);
        let next = advance(jan31, 1, RepeatUnit::Monthly);
        // 2024 is a leap year.
        assert_eq!(next, local(2024, 2, 29, 8, 0, 0));
    }

    #[test]
    fn yearly_advance_keeps_calendar_date() {
        let d = local(2024, 3, 10, 9, 15, 0);
        assert_eq!(advance(d, 1, RepeatUnit::Yearly), local(2025, 3, 10, 9, 15, 0));
    }

    #[test]
    fn advance_clamps_at_the_date_range_end() {
        // Both the calendar step and the approximate fallback would leave
        // the representable range; the date comes back unchanged.
        let far = local(262_000, 1, 1, 8, 0, 0);
        assert_eq!(advance(far, 10_000, RepeatUnit::Yearly), far);
    }

    #[test]
    fn minutes_anchor_preserves_minute_of_hour() {
        let rule = Recurrence::new(RepeatUnit::Minutes, 45, "10:00").unwrap();
        let now = local(2024, 1, 1, 11, 0, 0);
        let next = next_occurrence(&rule, now).unwrap();
        // 10:00, 10:45, 11:30...
        assert_eq!(next.minute(), 30);
        assert!(next > now);
    }

    #[test]
    fn elapsed_intervals_counts_whole_steps() {
        let rule = daily_at_8();
        let since = local(2024, 1, 1, 8, 0, 0);
        assert_eq!(elapsed_intervals(&rule, since, local(2024, 1, 1, 9, 0, 0)), 0);
        assert_eq!(elapsed_intervals(&rule, since, local(2024, 1, 4, 7, 59, 0)), 2);
        assert_eq!(elapsed_intervals(&rule, since, local(2024, 1, 4, 8, 0, 1)), 3);
        // Clock earlier than the reference point.
        assert_eq!(elapsed_intervals(&rule, since, local(2023, 12, 31, 8, 0, 0)), 0);
    }

    #[test]
    fn countdown_formats() {
        let now = local(2024, 1, 1, 8, 0, 0);
        assert_eq!(format_countdown(local(2024, 1, 4, 8, 0, 0), now), "3 days");
        assert_eq!(format_countdown(local(2024, 1, 2, 8, 0, 0), now), "1 day");
        assert_eq!(format_countdown(local(2024, 1, 1, 10, 5, 0), now), "2h 5m");
        assert_eq!(format_countdown(local(2024, 1, 1, 8, 12, 0), now), "12m");
        assert_eq!(format_countdown(local(2024, 1, 1, 8, 0, 45), now), "45s");
        assert_eq!(format_countdown(now, now), "now");
        assert_eq!(format_countdown(local(2023, 12, 31, 8, 0, 0), now), "now");
    }

    #[test]
    fn schedule_labels() {
        assert_eq!(daily_at_8().label(), "daily @ 08:00");
        let rule = Recurrence::new(RepeatUnit::Hourly, 3, "09:30").unwrap();
        assert_eq!(rule.label(), "every 3 hourly @ 09:30");
    }

    #[test]
    fn serde_shape_matches_persisted_form() {
        let rule = daily_at_8();
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"unit": "daily", "interval": 1, "startTime": "08:00"})
        );
        let back: Recurrence = serde_json::from_value(json).unwrap();
        assert_eq!(back, rule);
    }
}
