//! Per-firing occurrences: the simple day-scoped completion model.
//!
//! This is the deliberately separate "toggle within the window" variant.
//! It never touches the gated ledger counters, so the two completion
//! paths cannot desynchronize the opportunity/completion accounting:
//! anything that should count toward accuracy flows through
//! [`crate::ledger::HabitLedger::record_completion`] instead.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::OccurrenceError;
use crate::habit::Habit;
use crate::recurrence::{self, resolve_local};
use crate::window::occurrence_window;

/// One scheduled firing of a habit with its completion window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitOccurrence {
    pub id: Uuid,
    pub habit_id: Uuid,
    pub scheduled_at: DateTime<Local>,
    pub window_start: DateTime<Local>,
    pub window_end: DateTime<Local>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Local>>,
}

impl HabitOccurrence {
    /// Build the occurrence for a habit's firing at `scheduled_at`.
    pub fn new(habit_id: Uuid, scheduled_at: DateTime<Local>) -> Self {
        let window = occurrence_window(scheduled_at);
        Self {
            id: Uuid::new_v4(),
            habit_id,
            scheduled_at,
            window_start: window.start,
            window_end: window.end,
            completed_at: None,
        }
    }

    /// Uncompleted and currently inside its window.
    pub fn is_open(&self, now: DateTime<Local>) -> bool {
        self.completed_at.is_none() && self.window_start <= now && now <= self.window_end
    }

    /// Uncompleted and past its window end.
    pub fn is_expired(&self, now: DateTime<Local>) -> bool {
        self.completed_at.is_none() && now > self.window_end
    }

    /// Toggle the occurrence complete.
    ///
    /// # Errors
    ///
    /// [`OccurrenceError::AlreadyCompleted`] on a second toggle;
    /// [`OccurrenceError::WindowClosed`] outside the window.
    pub fn complete(&mut self, now: DateTime<Local>) -> Result<(), OccurrenceError> {
        if self.completed_at.is_some() {
            return Err(OccurrenceError::AlreadyCompleted);
        }
        if now < self.window_start || now > self.window_end {
            return Err(OccurrenceError::WindowClosed {
                closed_at: self.window_end,
            });
        }
        self.completed_at = Some(now);
        Ok(())
    }
}

/// Occurrence tracker keeping the at-most-one-open-per-habit rule.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct OccurrenceLog {
    occurrences: Vec<HabitOccurrence>,
}

impl OccurrenceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn occurrences(&self) -> &[HabitOccurrence] {
        &self.occurrences
    }

    /// The habit's open occurrence, if any.
    pub fn open_for(&self, habit_id: Uuid, now: DateTime<Local>) -> Option<&HabitOccurrence> {
        self.occurrences
            .iter()
            .find(|o| o.habit_id == habit_id && o.is_open(now))
    }

    /// Ensure the habit has an open occurrence for `now`'s day.
    ///
    /// Returns the existing open occurrence when there is one; otherwise
    /// anchors the habit's start time on `now`'s day (falling back to
    /// `now` itself when the anchor does not parse) and opens a new one.
    pub fn generate(&mut self, habit: &Habit, now: DateTime<Local>) -> &HabitOccurrence {
        if let Some(idx) = self
            .occurrences
            .iter()
            .position(|o| o.habit_id == habit.id && o.is_open(now))
        {
            return &self.occurrences[idx];
        }
        let scheduled_at = match habit.schedule.anchor_time() {
            Ok(at) => resolve_local(now.date_naive().and_time(at)).min(now),
            Err(_) => now,
        };
        self.occurrences.push(HabitOccurrence::new(habit.id, scheduled_at));
        // Just pushed, so last() is the new occurrence.
        &self.occurrences[self.occurrences.len() - 1]
    }

    /// Toggle the habit's open occurrence complete.
    ///
    /// # Errors
    ///
    /// [`OccurrenceError::WindowClosed`] when no occurrence is open for
    /// the habit at `now`.
    pub fn complete_open(
        &mut self,
        habit_id: Uuid,
        now: DateTime<Local>,
    ) -> Result<&HabitOccurrence, OccurrenceError> {
        let idx = self
            .occurrences
            .iter()
            .position(|o| o.habit_id == habit_id && o.is_open(now))
            .ok_or(OccurrenceError::WindowClosed { closed_at: now })?;
        self.occurrences[idx].complete(now)?;
        Ok(&self.occurrences[idx])
    }

    /// Drop occurrences whose window passed without completion.
    pub fn prune_expired(&mut self, now: DateTime<Local>) -> usize {
        let before = self.occurrences.len();
        self.occurrences.retain(|o| !o.is_expired(now));
        before - self.occurrences.len()
    }
}

/// Upcoming occurrence instants for a habit, for preview output.
pub fn preview(habit: &Habit, now: DateTime<Local>, count: usize) -> Vec<DateTime<Local>> {
    let mut out = Vec::with_capacity(count);
    let mut cursor = now;
    for _ in 0..count {
        match recurrence::next_fire_date(&habit.schedule, None, cursor) {
            Ok(next) => {
                cursor = next;
                out.push(next);
            }
            Err(_) => break,
        }
    }
    out
}
