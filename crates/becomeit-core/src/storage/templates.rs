//! Built-in habit templates.
//!
//! Small starter set the CLI can instantiate by id. Instantiation goes
//! through the normal draft validation; templates get no special path
//! into the ledger.

use serde::Serialize;

use crate::habit::{Category, HabitDraft};
use crate::recurrence::{Recurrence, RepeatUnit};

/// A predefined habit the user can add by id.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct HabitTemplate {
    pub id: &'static str,
    pub title: &'static str,
    pub icon: &'static str,
    pub unit: RepeatUnit,
    pub interval: u32,
    pub category: Category,
}

pub const HABIT_TEMPLATES: &[HabitTemplate] = &[
    HabitTemplate {
        id: "water",
        title: "Drink water",
        icon: "💧",
        unit: RepeatUnit::Hourly,
        interval: 1,
        category: Category::Health,
    },
    HabitTemplate {
        id: "read",
        title: "Read 10 pages",
        icon: "📖",
        unit: RepeatUnit::Daily,
        interval: 1,
        category: Category::Learning,
    },
    HabitTemplate {
        id: "walk",
        title: "Go for a walk",
        icon: "🚶",
        unit: RepeatUnit::Daily,
        interval: 1,
        category: Category::Health,
    },
    HabitTemplate {
        id: "meditate",
        title: "Meditate",
        icon: "🧘",
        unit: RepeatUnit::Daily,
        interval: 1,
        category: Category::Mindfulness,
    },
    HabitTemplate {
        id: "journal",
        title: "Write in journal",
        icon: "📓",
        unit: RepeatUnit::Daily,
        interval: 1,
        category: Category::Mindfulness,
    },
];

/// Look up a template by id.
pub fn template(id: &str) -> Option<&'static HabitTemplate> {
    HABIT_TEMPLATES.iter().find(|t| t.id.eq_ignore_ascii_case(id))
}

impl HabitTemplate {
    /// Turn the template into a creation draft anchored at `start_time`.
    pub fn draft(&self, start_time: impl Into<String>) -> HabitDraft {
        let mut draft = HabitDraft::new(
            self.title,
            Recurrence {
                unit: self.unit,
                interval: self.interval,
                start_time: start_time.into(),
            },
        );
        draft.category = Some(self.category);
        draft.icon = Some(self.icon.to_string());
        draft
    }
}
