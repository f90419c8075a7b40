//! Integration tests for the ledger lifecycle.
//!
//! These walk complete fire/complete/master/delete sequences across the
//! ledger and the stats aggregate, the way the notification pipeline
//! drives them in production.

use becomeit_core::ledger::{FireOutcome, HabitLedger};
use becomeit_core::{HabitDraft, LedgerError, Recurrence, RepeatUnit};
use chrono::{DateTime, Local, TimeZone};

fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(y, mo, d, h, mi, s)
        .single()
        .expect("unambiguous local time")
}

fn add_daily(ledger: &mut HabitLedger, title: &str) -> uuid::Uuid {
    let draft = HabitDraft::new(title, Recurrence::new(RepeatUnit::Daily, 1, "08:00").unwrap());
    ledger
        .add_habit(draft, local(2024, 1, 1, 7, 0, 0))
        .unwrap()
        .habit_id()
}

#[test]
fn test_fire_complete_reject_cycle() {
    let mut ledger = HabitLedger::new();
    let id = add_daily(&mut ledger, "Drink water");

    // Fire: 0 -> 1 on both counters.
    assert!(ledger
        .record_notification_fired(id, "n-1", local(2024, 1, 1, 8, 0, 0))
        .is_recorded());
    let habit = ledger.habit(id).unwrap();
    assert_eq!((habit.notification_count, habit.pending_completions), (1, 1));

    // Completion drains the pending balance and appends history.
    ledger.record_completion(id, local(2024, 1, 1, 8, 5, 0)).unwrap();
    let habit = ledger.habit(id).unwrap();
    assert_eq!((habit.completed_count, habit.pending_completions), (1, 0));
    assert_eq!(habit.completed_dates.len(), 1);

    // A second immediate completion is rejected without mutation.
    let err = ledger.record_completion(id, local(2024, 1, 1, 8, 6, 0)).unwrap_err();
    assert_eq!(err, LedgerError::NoPendingOpportunity { habit_id: id });
    let habit = ledger.habit(id).unwrap();
    assert_eq!((habit.completed_count, habit.pending_completions), (1, 0));
    assert_eq!(habit.completed_dates.len(), 1);
}

#[test]
fn test_pending_balance_drains_one_per_completion() {
    let mut ledger = HabitLedger::new();
    let id = add_daily(&mut ledger, "Stretch");

    for day in 1..=3u32 {
        ledger.record_notification_fired(id, &format!("n-{day}"), local(2024, 1, day, 8, 0, 0));
    }
    assert_eq!(ledger.habit(id).unwrap().pending_completions, 3);

    for day in 1..=3u32 {
        ledger.record_completion(id, local(2024, 1, 3, 9, 0, day)).unwrap();
    }
    assert_eq!(ledger.habit(id).unwrap().pending_completions, 0);
    assert!(ledger.record_completion(id, local(2024, 1, 3, 10, 0, 0)).is_err());
}

#[test]
fn test_accuracy_follows_ledger_history() {
    let mut ledger = HabitLedger::new();
    let id = add_daily(&mut ledger, "Read");

    assert_eq!(ledger.stats().accuracy(), 0);

    // Three opportunities, two confirmed.
    for day in 1..=3u32 {
        ledger.record_notification_fired(id, &format!("n-{day}"), local(2024, 1, day, 8, 0, 0));
    }
    ledger.record_completion(id, local(2024, 1, 3, 8, 5, 0)).unwrap();
    ledger.record_completion(id, local(2024, 1, 3, 8, 6, 0)).unwrap();

    assert_eq!(ledger.stats().total_opportunities, 3);
    assert_eq!(ledger.stats().total_completions, 2);
    assert_eq!(ledger.stats().accuracy(), 67);
}

#[test]
fn test_duplicate_delivery_leaves_stats_untouched() {
    let mut ledger = HabitLedger::new();
    let id = add_daily(&mut ledger, "Walk");

    ledger.record_notification_fired(id, "n-1", local(2024, 1, 1, 8, 0, 0));
    let replay = ledger.record_notification_fired(id, "n-1", local(2024, 1, 1, 8, 0, 2));
    assert_eq!(replay, FireOutcome::Duplicate);
    assert_eq!(ledger.stats().total_opportunities, 1);
}

#[test]
fn test_weekly_row_reflects_completion_weekday() {
    let mut ledger = HabitLedger::new();
    let id = add_daily(&mut ledger, "Meditate");

    // Complete on Tuesday 2024-01-02.
    ledger.record_notification_fired(id, "n-1", local(2024, 1, 2, 8, 0, 0));
    ledger.record_completion(id, local(2024, 1, 2, 10, 0, 0)).unwrap();

    let row = ledger.stats().weekly_completion(local(2024, 1, 4, 12, 0, 0));
    assert_eq!(row, [false, true, false, false, false, false, false]);
}

#[test]
fn test_mastery_keeps_history_deletion_keeps_totals() {
    let mut ledger = HabitLedger::new();
    let mastered = add_daily(&mut ledger, "Journal");
    let deleted = add_daily(&mut ledger, "Run");

    for (id, r) in [(mastered, "m-1"), (deleted, "d-1")] {
        ledger.record_notification_fired(id, r, local(2024, 1, 1, 8, 0, 0));
        ledger.record_completion(id, local(2024, 1, 1, 8, 30, 0)).unwrap();
    }

    ledger.mark_mastered(mastered, local(2024, 1, 2, 9, 0, 0)).unwrap();
    ledger.delete_habit(deleted, local(2024, 1, 2, 9, 1, 0)).unwrap();

    // Mastered habit remains readable with its history; deleted is gone.
    assert_eq!(ledger.habit(mastered).unwrap().completed_count, 1);
    assert!(ledger.habit(deleted).is_none());
    assert_eq!(ledger.active().count(), 0);

    // Aggregate totals survive both exits.
    assert_eq!(ledger.stats().total_opportunities, 2);
    assert_eq!(ledger.stats().total_completions, 2);
    assert_eq!(ledger.stats().completion_dates.len(), 2);
}

#[test]
fn test_streak_counts_days_not_completions() {
    let mut ledger = HabitLedger::new();
    let id = add_daily(&mut ledger, "Hydrate");

    // Two completions on day one, one on day two.
    ledger.record_notification_fired(id, "n-1", local(2024, 1, 1, 8, 0, 0));
    ledger.record_notification_fired(id, "n-2", local(2024, 1, 1, 14, 0, 0));
    ledger.record_completion(id, local(2024, 1, 1, 14, 5, 0)).unwrap();
    ledger.record_completion(id, local(2024, 1, 1, 20, 0, 0)).unwrap();
    ledger.record_notification_fired(id, "n-3", local(2024, 1, 2, 8, 0, 0));
    ledger.record_completion(id, local(2024, 1, 2, 8, 5, 0)).unwrap();

    let habit = ledger.habit(id).unwrap();
    assert_eq!(habit.completed_count, 3);
    assert_eq!(habit.streak, 2);
}
