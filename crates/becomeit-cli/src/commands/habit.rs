//! Habit management commands for CLI.

use becomeit_core::occurrence;
use becomeit_core::recurrence::{elapsed_intervals, format_countdown};
use becomeit_core::stats::completed_today;
use becomeit_core::storage::{template, Config};
use becomeit_core::{Category, Habit, HabitDraft, HabitState, Recurrence, RepeatUnit};
use chrono::{DateTime, Local};
use clap::Subcommand;
use serde::Serialize;
use uuid::Uuid;

use crate::gateway;

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit
    Add {
        /// Habit title (optional with --template)
        #[arg(required_unless_present = "template")]
        title: Option<String>,
        /// Built-in template id to instantiate (see `becomeit templates`)
        #[arg(long)]
        template: Option<String>,
        /// Repeat every N units
        #[arg(long)]
        every: Option<u32>,
        /// Repeat unit: minutes, hourly, daily, weekly, monthly or yearly
        #[arg(long)]
        unit: Option<String>,
        /// Anchor time, HH:mm
        #[arg(long)]
        at: Option<String>,
        /// Category: health, productivity, learning, mindfulness, social or other
        #[arg(long)]
        category: Option<String>,
        /// Icon shown next to the title
        #[arg(long)]
        icon: Option<String>,
    },
    /// List habits
    List {
        /// Include mastered habits
        #[arg(long)]
        all: bool,
    },
    /// Habit details plus derived status
    Show {
        /// Habit ID
        id: String,
    },
    /// Upcoming fire instants
    Preview {
        /// Habit ID
        id: String,
        /// Number of occurrences to list
        #[arg(long, default_value_t = 5)]
        count: usize,
    },
    /// Confirm one pending completion
    Complete {
        /// Habit ID
        id: String,
    },
    /// Mark a habit mastered (terminal; history is retained)
    Master {
        /// Habit ID
        id: String,
    },
    /// Delete a habit
    Delete {
        /// Habit ID
        id: String,
    },
}

/// One line of `habit list` output.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HabitRow {
    id: Uuid,
    title: String,
    schedule: String,
    state: HabitState,
    due: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_fire: Option<DateTime<Local>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    countdown: Option<String>,
    streak: u32,
}

impl HabitRow {
    fn new(habit: &Habit, now: DateTime<Local>) -> Self {
        let next_fire = (!habit.is_mastered)
            .then(|| habit.next_fire(now).ok())
            .flatten();
        Self {
            id: habit.id,
            title: habit.title.clone(),
            schedule: habit.schedule.label(),
            state: habit.state(),
            due: habit.is_due(),
            next_fire,
            countdown: next_fire.map(|n| format_countdown(n, now)),
            streak: habit.streak,
        }
    }
}

/// Full habit plus derived status for `habit show`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HabitDetail<'a> {
    #[serde(flatten)]
    habit: &'a Habit,
    state: HabitState,
    due: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_fire: Option<DateTime<Local>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    countdown: Option<String>,
    /// Whole intervals elapsed since creation, i.e. how many
    /// opportunities the schedule has produced so far.
    scheduled_occurrences: u64,
    completed_today: bool,
}

impl<'a> HabitDetail<'a> {
    fn new(habit: &'a Habit, now: DateTime<Local>) -> Self {
        let next_fire = (!habit.is_mastered)
            .then(|| habit.next_fire(now).ok())
            .flatten();
        Self {
            habit,
            state: habit.state(),
            due: habit.is_due(),
            next_fire,
            countdown: next_fire.map(|n| format_countdown(n, now)),
            scheduled_occurrences: elapsed_intervals(&habit.schedule, habit.created_at, now),
            completed_today: completed_today(&habit.completed_dates, now),
        }
    }
}

pub fn run(action: HabitAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut service = gateway::open_service()?;
    let now = Local::now();

    match action {
        HabitAction::Add {
            title,
            template: template_id,
            every,
            unit,
            at,
            category,
            icon,
        } => {
            let config = Config::load_or_default();
            let unit = unit.as_deref().map(str::parse::<RepeatUnit>).transpose()?;
            let at = at.unwrap_or_else(|| config.defaults.start_time.clone());

            let mut draft = match template_id {
                Some(template_id) => {
                    let tpl = template(&template_id)
                        .ok_or(format!("unknown template: {template_id}"))?;
                    let mut draft = tpl.draft(at);
                    if let Some(title) = title {
                        draft.title = title;
                    }
                    if let Some(unit) = unit {
                        draft.schedule.unit = unit;
                    }
                    if let Some(every) = every {
                        draft.schedule.interval = every;
                    }
                    draft
                }
                None => {
                    let title = title.ok_or("a title or --template is required")?;
                    HabitDraft::new(
                        title,
                        Recurrence::new(
                            unit.unwrap_or(config.defaults.unit),
                            every.unwrap_or(config.defaults.interval),
                            at,
                        )?,
                    )
                }
            };
            if let Some(category) = category {
                draft.category = Some(category.parse::<Category>()?);
            }
            if let Some(icon) = icon {
                draft.icon = Some(icon);
            }

            let event = service.add_habit(draft, now)?;
            println!("Habit created: {}", event.habit_id());
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        HabitAction::List { all } => {
            let rows: Vec<HabitRow> = service
                .ledger()
                .habits()
                .iter()
                .filter(|h| all || !h.is_mastered)
                .map(|h| HabitRow::new(h, now))
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        HabitAction::Show { id } => {
            let id: Uuid = id.parse()?;
            match service.ledger().habit(id) {
                Some(habit) => {
                    println!("{}", serde_json::to_string_pretty(&HabitDetail::new(habit, now))?);
                }
                None => println!("Habit not found: {id}"),
            }
        }
        HabitAction::Preview { id, count } => {
            let id: Uuid = id.parse()?;
            match service.ledger().habit(id) {
                Some(habit) => {
                    let fires = occurrence::preview(habit, now, count);
                    println!("{}", serde_json::to_string_pretty(&fires)?);
                }
                None => println!("Habit not found: {id}"),
            }
        }
        HabitAction::Complete { id } => {
            let id: Uuid = id.parse()?;
            let event = service.record_completion(id, now)?;
            println!("Completion recorded:");
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        HabitAction::Master { id } => {
            let id: Uuid = id.parse()?;
            let event = service.mark_mastered(id, now)?;
            println!("Habit mastered: {id}");
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        HabitAction::Delete { id } => {
            let id: Uuid = id.parse()?;
            service.delete_habit(id, now)?;
            println!("Habit deleted: {id}");
        }
    }
    Ok(())
}
