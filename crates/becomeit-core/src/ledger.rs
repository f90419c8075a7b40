//! The habit ledger: single writer over the habit list and the stats
//! aggregate.
//!
//! Per-habit state machine: `Idle` -> (notification fired) -> `Due` ->
//! (completion drains pending) -> `Idle`, with `Mastered` terminal.
//! Counters are monotone non-decreasing except `pending_completions`,
//! which oscillates but never goes negative; any operation that would
//! drive it negative is a rejected no-op instead.
//!
//! Fire callbacks arrive from the outside world and may be replayed or
//! race a cancellation, so they return a [`FireOutcome`] rather than an
//! error: duplicates and late fires are absorbed, logged, and mutate
//! nothing.

use chrono::{DateTime, Local};
use tracing::debug;
use uuid::Uuid;

use crate::error::{CoreError, LedgerError};
use crate::events::Event;
use crate::habit::{Habit, HabitDraft};
use crate::stats::HabitStats;

/// Outcome of a notification-fired callback.
#[derive(Debug, Clone, PartialEq)]
pub enum FireOutcome {
    /// Opportunity recorded: counts bumped, pending +1, ref stored.
    Recorded(Event),
    /// Replayed delivery of an already-processed notification
    /// reference. Absorbed without mutation.
    Duplicate,
    /// Unknown or mastered habit, e.g. a fire that raced a
    /// cancellation. Absorbed without mutation.
    Inactive,
}

impl FireOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, FireOutcome::Recorded(_))
    }
}

/// Owns the habit list and the accumulated stats.
///
/// One instance belongs to the application's composition root and is
/// passed by reference to whichever layer needs it. All mutation flows
/// through the commands below; the stats counters move only here, so
/// `total_completions <= total_opportunities` holds by construction.
#[derive(Debug, Default, Clone)]
pub struct HabitLedger {
    habits: Vec<Habit>,
    stats: HabitStats,
}

impl HabitLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from persisted parts.
    pub fn from_parts(habits: Vec<Habit>, stats: HabitStats) -> Self {
        Self { habits, stats }
    }

    pub fn into_parts(self) -> (Vec<Habit>, HabitStats) {
        (self.habits, self.stats)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    /// Habits still in active rotation (not mastered).
    pub fn active(&self) -> impl Iterator<Item = &Habit> {
        self.habits.iter().filter(|h| !h.is_mastered)
    }

    pub fn habit(&self, habit_id: Uuid) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == habit_id)
    }

    pub fn stats(&self) -> &HabitStats {
        &self.stats
    }

    /// Whether the completion action is enabled for this habit right
    /// now. False for unknown ids.
    pub fn is_due(&self, habit_id: Uuid) -> bool {
        self.habit(habit_id).is_some_and(Habit::is_due)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Add a habit from a draft.
    ///
    /// # Errors
    ///
    /// [`LedgerError::EmptyTitle`] or a [`crate::error::ScheduleError`]
    /// when the draft fails validation. Nothing is added on error.
    pub fn add_habit(&mut self, draft: HabitDraft, now: DateTime<Local>) -> Result<Event, CoreError> {
        let habit = Habit::create(draft, now)?;
        let next_fire = habit.next_fire(now)?;
        let event = Event::HabitAdded {
            habit_id: habit.id,
            title: habit.title.clone(),
            next_fire,
            at: now,
        };
        self.habits.push(habit);
        Ok(event)
    }

    /// Consume a notification-fired callback from the scheduling layer.
    ///
    /// At most one pending-opportunity increment happens per distinct
    /// notification reference; replays and fires for inactive habits
    /// are absorbed.
    pub fn record_notification_fired(
        &mut self,
        habit_id: Uuid,
        notification_ref: &str,
        now: DateTime<Local>,
    ) -> FireOutcome {
        let Some(habit) = self.habits.iter_mut().find(|h| h.id == habit_id) else {
            debug!(%habit_id, "fire for unknown habit ignored");
            return FireOutcome::Inactive;
        };
        if habit.is_mastered {
            debug!(%habit_id, "fire for mastered habit ignored");
            return FireOutcome::Inactive;
        }
        if habit.last_notification_ref.as_deref() == Some(notification_ref) {
            debug!(%habit_id, notification_ref, "duplicate notification delivery absorbed");
            return FireOutcome::Duplicate;
        }

        habit.notification_count += 1;
        habit.pending_completions += 1;
        habit.last_notified_at = Some(now);
        habit.last_notification_ref = Some(notification_ref.to_string());
        self.stats.total_opportunities += 1;

        FireOutcome::Recorded(Event::NotificationFired {
            habit_id,
            notification_ref: notification_ref.to_string(),
            pending: habit.pending_completions,
            at: now,
        })
    }

    /// Confirm one completion against a previously fired opportunity.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NoPendingOpportunity`] when nothing is pending;
    /// [`LedgerError::UnknownHabit`] for ids outside the active set
    /// (mastered habits are no longer addressable). No counter moves on
    /// either rejection.
    pub fn record_completion(
        &mut self,
        habit_id: Uuid,
        now: DateTime<Local>,
    ) -> Result<Event, LedgerError> {
        let habit = self
            .habits
            .iter_mut()
            .find(|h| h.id == habit_id && !h.is_mastered)
            .ok_or(LedgerError::UnknownHabit { habit_id })?;
        if habit.pending_completions == 0 {
            return Err(LedgerError::NoPendingOpportunity { habit_id });
        }

        habit.pending_completions -= 1;
        habit.completed_count += 1;
        habit.completed_dates.push(now);
        habit.last_completed_at = Some(now);
        // One streak increment per local day, however many completions.
        let today = now.date_naive();
        if habit.last_streak_date != Some(today) {
            habit.streak += 1;
            habit.last_streak_date = Some(today);
        }
        self.stats.total_completions += 1;
        self.stats.completion_dates.push(now);

        Ok(Event::CompletionRecorded {
            habit_id,
            completed_count: habit.completed_count,
            pending: habit.pending_completions,
            streak: habit.streak,
            at: now,
        })
    }

    /// Mark a habit mastered: terminal, out of active rotation.
    ///
    /// Completion history and the aggregate stats are retained; only
    /// the flag moves, so historical metrics keep counting the habit.
    ///
    /// # Errors
    ///
    /// [`LedgerError::UnknownHabit`] for ids outside the active set,
    /// including habits already mastered.
    pub fn mark_mastered(
        &mut self,
        habit_id: Uuid,
        now: DateTime<Local>,
    ) -> Result<Event, LedgerError> {
        let habit = self
            .habits
            .iter_mut()
            .find(|h| h.id == habit_id && !h.is_mastered)
            .ok_or(LedgerError::UnknownHabit { habit_id })?;
        habit.is_mastered = true;
        Ok(Event::HabitMastered { habit_id, at: now })
    }

    /// Hard-remove a habit.
    ///
    /// The aggregate stats are deliberately untouched, so historical
    /// totals survive deletion. Works on mastered habits too.
    ///
    /// # Errors
    ///
    /// [`LedgerError::UnknownHabit`] when the id does not exist.
    pub fn delete_habit(
        &mut self,
        habit_id: Uuid,
        now: DateTime<Local>,
    ) -> Result<Event, LedgerError> {
        let idx = self
            .habits
            .iter()
            .position(|h| h.id == habit_id)
            .ok_or(LedgerError::UnknownHabit { habit_id })?;
        let habit = self.habits.remove(idx);
        Ok(Event::HabitDeleted {
            habit_id,
            title: habit.title,
            at: now,
        })
    }
}
