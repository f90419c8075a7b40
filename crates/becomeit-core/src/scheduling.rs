//! Trigger descriptors and the scheduling gateway contract.
//!
//! The core never talks to an OS notification layer directly. It
//! produces [`FireDescriptor`] values, hands them to a
//! [`SchedulingGateway`], and consumes the resulting fired callbacks
//! through the ledger. Cancellation is best-effort: a fire racing a
//! cancellation is made safe by the ledger's inactive-habit check, not
//! by the gateway.

use chrono::{DateTime, Datelike, Local, Timelike};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{CoreError, ScheduleError};
use crate::habit::Habit;
use crate::recurrence::{self, parse_hhmm, RepeatUnit};

/// Opaque handle to a scheduled trigger, as issued by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TriggerRef(pub String);

impl TriggerRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TriggerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What to ask the platform scheduler for.
///
/// Interval triggers serve the sub-daily units; calendar triggers serve
/// daily and up. For calendar units with `interval > 1` the descriptor
/// carries the anchor cadence and the service re-schedules after each
/// completion to keep the multi-interval spacing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FireDescriptor {
    Interval {
        seconds: u64,
        repeats: bool,
    },
    Calendar {
        hour: u32,
        minute: u32,
        /// ISO weekday, Monday = 1. Present for weekly schedules.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        weekday: Option<u32>,
        /// Day of month. Present for monthly and yearly schedules.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        day: Option<u32>,
        /// Month of year. Present for yearly schedules.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        month: Option<u32>,
        repeats: bool,
    },
}

/// Derive the trigger descriptor for a habit's schedule.
///
/// Minutes/hourly map to interval triggers; daily and up map to
/// calendar triggers anchored on the habit's next occurrence.
///
/// # Errors
///
/// Returns [`ScheduleError::InvalidStartTime`] when the stored anchor
/// does not parse.
pub fn build_trigger(habit: &Habit, now: DateTime<Local>) -> Result<FireDescriptor, ScheduleError> {
    let rule = &habit.schedule;
    match rule.unit {
        RepeatUnit::Minutes => Ok(FireDescriptor::Interval {
            seconds: 60 * u64::from(rule.interval),
            repeats: true,
        }),
        RepeatUnit::Hourly => Ok(FireDescriptor::Interval {
            seconds: 3_600 * u64::from(rule.interval),
            repeats: true,
        }),
        RepeatUnit::Daily | RepeatUnit::Weekly | RepeatUnit::Monthly | RepeatUnit::Yearly => {
            let anchor = recurrence::next_occurrence(rule, now)?;
            Ok(FireDescriptor::Calendar {
                hour: anchor.hour(),
                minute: anchor.minute(),
                weekday: (rule.unit == RepeatUnit::Weekly)
                    .then(|| anchor.weekday().number_from_monday()),
                day: matches!(rule.unit, RepeatUnit::Monthly | RepeatUnit::Yearly)
                    .then(|| anchor.day()),
                month: (rule.unit == RepeatUnit::Yearly).then(|| anchor.month()),
                repeats: true,
            })
        }
    }
}

/// Platform notification scheduling, behind a trait so the core stays
/// transport-free and tests can substitute a recorder.
pub trait SchedulingGateway {
    /// Register a trigger; returns the handle needed to cancel it.
    ///
    /// # Errors
    ///
    /// Implementation-defined. The service treats failures as
    /// warnings, not rollbacks.
    fn schedule_trigger(
        &mut self,
        habit_id: Uuid,
        descriptor: &FireDescriptor,
    ) -> Result<TriggerRef, CoreError>;

    /// Cancel a previously scheduled trigger. Best-effort.
    ///
    /// # Errors
    ///
    /// Implementation-defined; safe to ignore for already-fired refs.
    fn cancel_trigger(&mut self, trigger_ref: &TriggerRef) -> Result<(), CoreError>;
}

/// Do-not-disturb range from the user settings, "HH:mm" bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SilentHours {
    pub enabled: bool,
    pub start: String,
    pub end: String,
}

impl Default for SilentHours {
    fn default() -> Self {
        Self {
            enabled: false,
            start: "22:00".to_string(),
            end: "07:00".to_string(),
        }
    }
}

impl SilentHours {
    /// Whether `now` falls inside the configured range.
    ///
    /// Overnight ranges wrap midnight: 22:00-07:00 contains 23:00 and
    /// 06:00 but not 12:00. Both bounds are inclusive, so the end
    /// minute itself still silences. Malformed bounds disable the
    /// range rather than silencing everything.
    pub fn contains(&self, now: DateTime<Local>) -> bool {
        if !self.enabled {
            return false;
        }
        let (start, end) = match (parse_hhmm(&self.start), parse_hhmm(&self.end)) {
            (Ok(start), Ok(end)) => (start, end),
            _ => {
                debug!(start = %self.start, end = %self.end, "unparseable silent hours ignored");
                return false;
            }
        };
        let t = now.time();

        // Overnight window (e.g. 22:00 - 07:00).
        if start > end {
            return t >= start || t <= end;
        }
        t >= start && t <= end
    }
}

/// Descriptor for the recurring affirmation notification, if one should
/// exist right now. `None` when the feature is off (zero interval) or
/// `now` is inside silent hours.
pub fn affirmation_trigger(
    interval_hours: u32,
    silent: Option<&SilentHours>,
    now: DateTime<Local>,
) -> Option<FireDescriptor> {
    if interval_hours == 0 {
        return None;
    }
    if silent.is_some_and(|s| s.contains(now)) {
        return None;
    }
    Some(FireDescriptor::Interval {
        seconds: 3_600 * u64::from(interval_hours),
        repeats: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::HabitDraft;
    use crate::recurrence::Recurrence;
    use chrono::TimeZone;

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(y, mo, d, h, mi, s)
            .single()
            .expect("unambiguous local time")
    }

    fn habit(unit: RepeatUnit, interval: u32, at: &str) -> Habit {
        Habit::create(
            HabitDraft::new("Test", Recurrence::new(unit, interval, at).unwrap()),
            local(2024, 1, 1, 7, 0, 0),
        )
        .unwrap()
    }

    #[test]
    fn sub_daily_units_build_interval_triggers() {
        let now = local(2024, 1, 1, 7, 0, 0);
        assert_eq!(
            build_trigger(&habit(RepeatUnit::Minutes, 30, "08:00"), now).unwrap(),
            FireDescriptor::Interval { seconds: 1_800, repeats: true }
        );
        assert_eq!(
            build_trigger(&habit(RepeatUnit::Hourly, 2, "08:00"), now).unwrap(),
            FireDescriptor::Interval { seconds: 7_200, repeats: true }
        );
    }

    #[test]
    fn daily_builds_plain_calendar_trigger() {
        let now = local(2024, 1, 1, 7, 0, 0);
        let descriptor = build_trigger(&habit(RepeatUnit::Daily, 1, "08:30"), now).unwrap();
        assert_eq!(
            descriptor,
            FireDescriptor::Calendar {
                hour: 8,
                minute: 30,
                weekday: None,
                day: None,
                month: None,
                repeats: true,
            }
        );
    }

    #[test]
    fn weekly_carries_iso_weekday() {
        // Next occurrence of 08:00 from Mon 2024-01-01 07:00 is Monday.
        let now = local(2024, 1, 1, 7, 0, 0);
        let descriptor = build_trigger(&habit(RepeatUnit::Weekly, 1, "08:00"), now).unwrap();
        match descriptor {
            FireDescriptor::Calendar { weekday, day, month, .. } => {
                assert_eq!(weekday, Some(1));
                assert_eq!(day, None);
                assert_eq!(month, None);
            }
            other => panic!("unexpected descriptor {other:?}"),
        }
    }

    #[test]
    fn monthly_and_yearly_carry_calendar_fields() {
        let now = local(2024, 3, 15, 7, 0, 0);
        match build_trigger(&habit(RepeatUnit::Monthly, 1, "09:00"), now).unwrap() {
            FireDescriptor::Calendar { day, month, .. } => {
                assert_eq!(day, Some(15));
                assert_eq!(month, None);
            }
            other => panic!("unexpected descriptor {other:?}"),
        }
        match build_trigger(&habit(RepeatUnit::Yearly, 1, "09:00"), now).unwrap() {
            FireDescriptor::Calendar { day, month, .. } => {
                assert_eq!(day, Some(15));
                assert_eq!(month, Some(3));
            }
            other => panic!("unexpected descriptor {other:?}"),
        }
    }

    #[test]
    fn descriptor_serializes_with_kind_tag() {
        let json = serde_json::to_value(FireDescriptor::Interval {
            seconds: 1_800,
            repeats: true,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"kind": "interval", "seconds": 1800, "repeats": true}));

        let json = serde_json::to_value(FireDescriptor::Calendar {
            hour: 8,
            minute: 0,
            weekday: Some(1),
            day: None,
            month: None,
            repeats: true,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "calendar", "hour": 8, "minute": 0, "weekday": 1, "repeats": true})
        );
    }

    #[test]
    fn silent_hours_daytime_range() {
        let silent = SilentHours {
            enabled: true,
            start: "12:00".to_string(),
            end: "17:00".to_string(),
        };
        assert!(silent.contains(local(2024, 1, 1, 12, 0, 0)));
        assert!(silent.contains(local(2024, 1, 1, 16, 59, 0)));
        // The end minute is still inside the range.
        assert!(silent.contains(local(2024, 1, 1, 17, 0, 0)));
        assert!(!silent.contains(local(2024, 1, 1, 17, 1, 0)));
        assert!(!silent.contains(local(2024, 1, 1, 9, 0, 0)));
    }

    #[test]
    fn silent_hours_overnight_range_wraps_midnight() {
        let silent = SilentHours {
            enabled: true,
            start: "22:00".to_string(),
            end: "07:00".to_string(),
        };
        assert!(silent.contains(local(2024, 1, 1, 23, 0, 0)));
        assert!(silent.contains(local(2024, 1, 1, 3, 0, 0)));
        assert!(silent.contains(local(2024, 1, 1, 7, 0, 0)));
        assert!(!silent.contains(local(2024, 1, 1, 7, 1, 0)));
        assert!(!silent.contains(local(2024, 1, 1, 12, 0, 0)));
    }

    #[test]
    fn disabled_or_malformed_silent_hours_never_match() {
        let disabled = SilentHours {
            enabled: false,
            ..SilentHours::default()
        };
        assert!(!disabled.contains(local(2024, 1, 1, 23, 0, 0)));

        let malformed = SilentHours {
            enabled: true,
            start: "late".to_string(),
            end: "07:00".to_string(),
        };
        assert!(!malformed.contains(local(2024, 1, 1, 23, 0, 0)));
    }

    #[test]
    fn affirmations_respect_silent_hours() {
        let silent = SilentHours {
            enabled: true,
            start: "22:00".to_string(),
            end: "07:00".to_string(),
        };
        assert_eq!(affirmation_trigger(1, Some(&silent), local(2024, 1, 1, 23, 0, 0)), None);
        // Still suppressed at the end minute itself.
        assert_eq!(affirmation_trigger(1, Some(&silent), local(2024, 1, 1, 7, 0, 0)), None);
        assert_eq!(
            affirmation_trigger(2, Some(&silent), local(2024, 1, 1, 12, 0, 0)),
            Some(FireDescriptor::Interval { seconds: 7_200, repeats: true })
        );
        assert_eq!(affirmation_trigger(0, None, local(2024, 1, 1, 12, 0, 0)), None);
    }
}
