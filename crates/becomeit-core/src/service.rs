//! Composition-root orchestration over the ledger and the gateways.
//!
//! Every handler follows the same check-then-act order: validate the
//! precondition, mutate the in-memory ledger, persist, then touch the
//! scheduling gateway. Memory is authoritative; a failed save or
//! trigger call logs a warning and the in-memory transition stands.

use chrono::{DateTime, Local};
use tracing::warn;
use uuid::Uuid;

use crate::error::{LedgerError, Result};
use crate::events::Event;
use crate::habit::HabitDraft;
use crate::ledger::{FireOutcome, HabitLedger};
use crate::scheduling::{build_trigger, SchedulingGateway};
use crate::storage::PersistenceGateway;

/// Owns the ledger plus the persistence and scheduling gateways.
pub struct HabitService {
    ledger: HabitLedger,
    store: Box<dyn PersistenceGateway>,
    scheduler: Box<dyn SchedulingGateway>,
}

impl HabitService {
    /// Load the persisted ledger and wire up the gateways.
    ///
    /// # Errors
    ///
    /// Fails when the persisted habits or stats cannot be loaded;
    /// an empty store is not an error.
    pub fn open(
        store: Box<dyn PersistenceGateway>,
        scheduler: Box<dyn SchedulingGateway>,
    ) -> Result<Self> {
        let habits = store.load_habits()?;
        let stats = store.load_stats()?;
        Ok(Self {
            ledger: HabitLedger::from_parts(habits, stats),
            store,
            scheduler,
        })
    }

    pub fn ledger(&self) -> &HabitLedger {
        &self.ledger
    }

    pub fn is_due(&self, habit_id: Uuid) -> bool {
        self.ledger.is_due(habit_id)
    }

    /// Add a habit, persist, and schedule its first trigger.
    ///
    /// # Errors
    ///
    /// Draft validation failures; the habit is not added on error.
    pub fn add_habit(&mut self, draft: HabitDraft, now: DateTime<Local>) -> Result<Event> {
        let event = self.ledger.add_habit(draft, now)?;
        let habit_id = event.habit_id();
        self.persist_habits();
        self.schedule_for(habit_id, now);
        Ok(event)
    }

    /// Consume a notification-fired callback and persist on success.
    ///
    /// Duplicates and fires for inactive habits are absorbed without
    /// touching storage.
    pub fn notification_fired(
        &mut self,
        habit_id: Uuid,
        notification_ref: &str,
        now: DateTime<Local>,
    ) -> FireOutcome {
        let outcome = self
            .ledger
            .record_notification_fired(habit_id, notification_ref, now);
        if outcome.is_recorded() {
            self.persist_habits();
            self.persist_stats();
        }
        outcome
    }

    /// Confirm a completion, persist, and replace the habit's trigger
    /// so the next fire lands one interval out.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NoPendingOpportunity`] or
    /// [`LedgerError::UnknownHabit`]; nothing is persisted or
    /// rescheduled on rejection.
    pub fn record_completion(
        &mut self,
        habit_id: Uuid,
        now: DateTime<Local>,
    ) -> Result<Event, LedgerError> {
        let event = self.ledger.record_completion(habit_id, now)?;
        self.persist_habits();
        self.persist_stats();
        self.cancel_for(habit_id);
        self.schedule_for(habit_id, now);
        Ok(event)
    }

    /// Master a habit, persist, and cancel its pending trigger.
    ///
    /// # Errors
    ///
    /// [`LedgerError::UnknownHabit`] for ids outside the active set.
    pub fn mark_mastered(
        &mut self,
        habit_id: Uuid,
        now: DateTime<Local>,
    ) -> Result<Event, LedgerError> {
        let event = self.ledger.mark_mastered(habit_id, now)?;
        self.persist_habits();
        self.cancel_for(habit_id);
        Ok(event)
    }

    /// Delete a habit, persist, and cancel its pending trigger.
    ///
    /// # Errors
    ///
    /// [`LedgerError::UnknownHabit`] when the id does not exist.
    pub fn delete_habit(
        &mut self,
        habit_id: Uuid,
        now: DateTime<Local>,
    ) -> Result<Event, LedgerError> {
        let event = self.ledger.delete_habit(habit_id, now)?;
        self.persist_habits();
        self.cancel_for(habit_id);
        Ok(event)
    }

    /// Cancel and re-create the triggers of every active habit.
    ///
    /// Run at process start so OS-side state catches up with the
    /// ledger after reboots or schedule drift.
    pub fn resync_triggers(&mut self, now: DateTime<Local>) -> usize {
        let ids: Vec<Uuid> = self.ledger.active().map(|h| h.id).collect();
        for &habit_id in &ids {
            self.cancel_for(habit_id);
            self.schedule_for(habit_id, now);
        }
        ids.len()
    }

    // Durability and trigger plumbing never roll back the in-memory
    // transition; failures are logged and the ledger stays authoritative.

    fn persist_habits(&self) {
        if let Err(e) = self.store.save_habits(self.ledger.habits()) {
            warn!(error = %e, "failed to persist habits; memory remains authoritative");
        }
    }

    fn persist_stats(&self) {
        if let Err(e) = self.store.save_stats(self.ledger.stats()) {
            warn!(error = %e, "failed to persist stats; memory remains authoritative");
        }
    }

    fn schedule_for(&mut self, habit_id: Uuid, now: DateTime<Local>) {
        let Some(habit) = self.ledger.habit(habit_id) else {
            return;
        };
        let descriptor = match build_trigger(habit, now) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                warn!(%habit_id, error = %e, "cannot derive trigger descriptor");
                return;
            }
        };
        match self.scheduler.schedule_trigger(habit_id, &descriptor) {
            Ok(trigger_ref) => {
                if let Err(e) = self.store.set_trigger_ref(habit_id, Some(&trigger_ref)) {
                    warn!(%habit_id, error = %e, "failed to record trigger ref");
                }
            }
            Err(e) => warn!(%habit_id, error = %e, "failed to schedule trigger"),
        }
    }

    fn cancel_for(&mut self, habit_id: Uuid) {
        let trigger_ref = match self.store.trigger_ref(habit_id) {
            Ok(Some(trigger_ref)) => trigger_ref,
            Ok(None) => return,
            Err(e) => {
                warn!(%habit_id, error = %e, "failed to look up trigger ref");
                return;
            }
        };
        if let Err(e) = self.scheduler.cancel_trigger(&trigger_ref) {
            warn!(%habit_id, error = %e, "failed to cancel trigger");
        }
        if let Err(e) = self.store.set_trigger_ref(habit_id, None) {
            warn!(%habit_id, error = %e, "failed to clear trigger ref");
        }
    }
}
