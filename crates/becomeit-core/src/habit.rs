//! The tracked habit entity.
//!
//! `Habit` is plain data plus read-only queries. All mutation goes
//! through [`crate::ledger::HabitLedger`], the single writer, so the
//! counter invariants live in one place.

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, LedgerError, ScheduleError};
use crate::recurrence::{self, Recurrence};

/// Broad grouping carried from habit templates. Inert metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Health,
    Productivity,
    Learning,
    Mindfulness,
    Social,
    Other,
}

impl std::str::FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "health" => Ok(Category::Health),
            "productivity" => Ok(Category::Productivity),
            "learning" => Ok(Category::Learning),
            "mindfulness" => Ok(Category::Mindfulness),
            "social" => Ok(Category::Social),
            "other" => Ok(Category::Other),
            other => Err(CoreError::Custom(format!("unknown category '{other}'"))),
        }
    }
}

/// Per-habit position in the completion state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitState {
    /// No pending opportunity; completion disabled.
    Idle,
    /// At least one fired, unconfirmed opportunity; completion enabled.
    Due,
    /// Terminal. Out of active rotation, history retained.
    Mastered,
}

/// Creation input for a habit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitDraft {
    pub title: String,
    pub schedule: Recurrence,
    pub category: Option<Category>,
    pub icon: Option<String>,
}

impl HabitDraft {
    pub fn new(title: impl Into<String>, schedule: Recurrence) -> Self {
        Self {
            title: title.into(),
            schedule,
            category: None,
            icon: None,
        }
    }
}

/// A tracked recurring habit.
///
/// `id`, `title`, `created_at` and `schedule` are immutable after
/// creation. Counters are mutated only by the ledger: all of them are
/// monotone non-decreasing except `pending_completions`, which
/// oscillates but never goes negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Local>,
    pub schedule: Recurrence,
    /// Total opportunities ever fired.
    #[serde(default)]
    pub notification_count: u64,
    /// Total confirmed completions.
    #[serde(default)]
    pub completed_count: u64,
    /// Fired-but-unconfirmed opportunities. Always >= 0.
    #[serde(default)]
    pub pending_completions: u32,
    #[serde(default)]
    pub last_notified_at: Option<DateTime<Local>>,
    #[serde(default)]
    pub last_completed_at: Option<DateTime<Local>>,
    /// Reference of the most recent fire, for duplicate-delivery dedup.
    #[serde(default)]
    pub last_notification_ref: Option<String>,
    /// Completion instants, append-ordered.
    #[serde(default)]
    pub completed_dates: Vec<DateTime<Local>>,
    /// Consecutive-period completion counter.
    #[serde(default)]
    pub streak: u32,
    /// Local day that last contributed to the streak. Guards against
    /// double-incrementing from two completions on one day.
    #[serde(default)]
    pub last_streak_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_mastered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Habit {
    /// Build a habit from a draft, validating title and schedule.
    ///
    /// # Errors
    ///
    /// [`LedgerError::EmptyTitle`] for an empty or whitespace title;
    /// [`ScheduleError`] variants for an invalid recurrence rule.
    pub fn create(draft: HabitDraft, now: DateTime<Local>) -> Result<Self, CoreError> {
        if draft.title.trim().is_empty() {
            return Err(LedgerError::EmptyTitle.into());
        }
        draft.schedule.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            title: draft.title.trim().to_string(),
            created_at: now,
            schedule: draft.schedule,
            notification_count: 0,
            completed_count: 0,
            pending_completions: 0,
            last_notified_at: None,
            last_completed_at: None,
            last_notification_ref: None,
            completed_dates: Vec::new(),
            streak: 0,
            last_streak_date: None,
            is_mastered: false,
            category: draft.category,
            icon: draft.icon,
        })
    }

    /// Whether the completion action is currently enabled.
    pub fn is_due(&self) -> bool {
        !self.is_mastered && self.pending_completions > 0
    }

    pub fn state(&self) -> HabitState {
        if self.is_mastered {
            HabitState::Mastered
        } else if self.pending_completions > 0 {
            HabitState::Due
        } else {
            HabitState::Idle
        }
    }

    /// Next fire instant: one interval past the last fire, or the
    /// anchored first occurrence if nothing has fired yet.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidStartTime`] if the stored anchor
    /// does not parse.
    pub fn next_fire(&self, now: DateTime<Local>) -> Result<DateTime<Local>, ScheduleError> {
        recurrence::next_fire_date(&self.schedule, self.last_notified_at, now)
    }
}
