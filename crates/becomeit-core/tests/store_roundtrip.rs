//! On-disk persistence round-trips.
//!
//! The save-then-load law: loading returns a value deep-equal to what
//! was saved, across process-style reopen boundaries.

use becomeit_core::storage::{HabitStore, PersistenceGateway};
use becomeit_core::{Habit, HabitDraft, HabitStats, Recurrence, RepeatUnit, TriggerRef};
use chrono::{DateTime, Local, TimeZone};
use uuid::Uuid;

fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(y, mo, d, h, mi, s)
        .single()
        .expect("unambiguous local time")
}

fn populated_habit() -> Habit {
    let mut habit = Habit::create(
        HabitDraft::new(
            "Drink water",
            Recurrence::new(RepeatUnit::Hourly, 2, "09:00").unwrap(),
        ),
        local(2024, 1, 1, 7, 0, 0),
    )
    .unwrap();
    habit.notification_count = 5;
    habit.completed_count = 4;
    habit.pending_completions = 1;
    habit.last_notified_at = Some(local(2024, 1, 2, 9, 0, 0));
    habit.last_completed_at = Some(local(2024, 1, 2, 9, 10, 0));
    habit.last_notification_ref = Some("os-notif-42".into());
    habit.completed_dates = vec![local(2024, 1, 1, 9, 5, 0), local(2024, 1, 2, 9, 10, 0)];
    habit.streak = 2;
    habit
}

#[test]
fn test_habits_roundtrip_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("becomeit.db");
    let habits = vec![populated_habit()];

    {
        let store = HabitStore::open_at(&path).unwrap();
        store.save_habits(&habits).unwrap();
    }

    let store = HabitStore::open_at(&path).unwrap();
    let loaded = store.load_habits().unwrap();
    assert_eq!(
        serde_json::to_value(&loaded).unwrap(),
        serde_json::to_value(&habits).unwrap()
    );
}

#[test]
fn test_stats_and_triggers_roundtrip_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("becomeit.db");
    let habit_id = Uuid::new_v4();
    let stats = HabitStats {
        total_opportunities: 9,
        total_completions: 6,
        completion_dates: vec![local(2024, 1, 2, 10, 0, 0), local(2024, 1, 3, 10, 0, 0)],
    };

    {
        let store = HabitStore::open_at(&path).unwrap();
        store.save_stats(&stats).unwrap();
        store
            .set_trigger_ref(habit_id, Some(&TriggerRef::new("trig-9")))
            .unwrap();
    }

    let store = HabitStore::open_at(&path).unwrap();
    assert_eq!(store.load_stats().unwrap(), stats);
    assert_eq!(store.trigger_ref(habit_id).unwrap(), Some(TriggerRef::new("trig-9")));
}

#[test]
fn test_repeated_saves_keep_latest() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("becomeit.db");
    let store = HabitStore::open_at(&path).unwrap();

    store.save_habits(&[populated_habit()]).unwrap();
    let mut second = populated_habit();
    second.title = "Read 10 pages".into();
    store.save_habits(&[second.clone()]).unwrap();

    let loaded = store.load_habits().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].title, "Read 10 pages");
}

#[test]
fn test_clear_all_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("becomeit.db");

    {
        let store = HabitStore::open_at(&path).unwrap();
        store.save_habits(&[populated_habit()]).unwrap();
        store.save_stats(&HabitStats::default()).unwrap();
        store.clear_all().unwrap();
    }

    let store = HabitStore::open_at(&path).unwrap();
    assert!(store.load_habits().unwrap().is_empty());
    assert_eq!(store.load_stats().unwrap(), HabitStats::default());
}
