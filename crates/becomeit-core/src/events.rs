//! Events emitted by ledger state transitions.
//!
//! Every mutating ledger operation returns the event it produced, so
//! callers (the CLI, a notification listener) can render or forward the
//! transition without re-deriving it.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A ledger state transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    HabitAdded {
        habit_id: Uuid,
        title: String,
        next_fire: DateTime<Local>,
        at: DateTime<Local>,
    },
    NotificationFired {
        habit_id: Uuid,
        notification_ref: String,
        pending: u32,
        at: DateTime<Local>,
    },
    CompletionRecorded {
        habit_id: Uuid,
        completed_count: u64,
        pending: u32,
        streak: u32,
        at: DateTime<Local>,
    },
    HabitMastered {
        habit_id: Uuid,
        at: DateTime<Local>,
    },
    HabitDeleted {
        habit_id: Uuid,
        title: String,
        at: DateTime<Local>,
    },
}

impl Event {
    pub fn habit_id(&self) -> Uuid {
        match self {
            Event::HabitAdded { habit_id, .. }
            | Event::NotificationFired { habit_id, .. }
            | Event::CompletionRecorded { habit_id, .. }
            | Event::HabitMastered { habit_id, .. }
            | Event::HabitDeleted { habit_id, .. } => *habit_id,
        }
    }

    pub fn at(&self) -> DateTime<Local> {
        match self {
            Event::HabitAdded { at, .. }
            | Event::NotificationFired { at, .. }
            | Event::CompletionRecorded { at, .. }
            | Event::HabitMastered { at, .. }
            | Event::HabitDeleted { at, .. } => *at,
        }
    }
}
