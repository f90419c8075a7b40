//! Durable storage: the persistence contract, its SQLite-backed
//! implementation, the TOML config and the built-in habit templates.

mod config;
pub mod store;
mod templates;

pub use config::{AffirmationsConfig, Config, DefaultsConfig, NotificationsConfig, Tone};
pub use store::HabitStore;
pub use templates::{template, HabitTemplate, HABIT_TEMPLATES};

use std::path::PathBuf;

use uuid::Uuid;

use crate::error::Result;
use crate::habit::Habit;
use crate::scheduling::TriggerRef;
use crate::stats::HabitStats;

/// Returns `~/.config/becomeit[-dev]/` based on BECOMEIT_ENV.
///
/// Set BECOMEIT_ENV=dev to use the development data directory, or
/// BECOMEIT_DATA_DIR to pin an explicit directory (tests use this).
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("BECOMEIT_DATA_DIR") {
        let dir = PathBuf::from(dir);
        std::fs::create_dir_all(&dir)?;
        return Ok(dir);
    }

    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("BECOMEIT_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("becomeit-dev")
    } else {
        base_dir.join("becomeit")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Durable storage of the ledger's parts.
///
/// The core calls these after every mutating operation; the gateway
/// owns durability and format. Failures are surfaced but never roll
/// back the in-memory transition that preceded the save.
pub trait PersistenceGateway {
    /// Load all persisted habits; empty when nothing was saved yet.
    ///
    /// # Errors
    /// Fails on unreadable or undecodable storage.
    fn load_habits(&self) -> Result<Vec<Habit>>;

    /// Replace the persisted habit list.
    ///
    /// # Errors
    /// Fails when the write does not reach storage.
    fn save_habits(&self, habits: &[Habit]) -> Result<()>;

    /// Load the stats aggregate; default (all-zero) when absent.
    ///
    /// # Errors
    /// Fails on unreadable or undecodable storage.
    fn load_stats(&self) -> Result<HabitStats>;

    /// Replace the persisted stats aggregate.
    ///
    /// # Errors
    /// Fails when the write does not reach storage.
    fn save_stats(&self, stats: &HabitStats) -> Result<()>;

    /// The stored trigger ref for a habit, if one is scheduled.
    ///
    /// # Errors
    /// Fails on unreadable storage.
    fn trigger_ref(&self, habit_id: Uuid) -> Result<Option<TriggerRef>>;

    /// Store or clear (with `None`) a habit's trigger ref.
    ///
    /// # Errors
    /// Fails when the write does not reach storage.
    fn set_trigger_ref(&self, habit_id: Uuid, trigger_ref: Option<&TriggerRef>) -> Result<()>;

    /// Wipe everything this gateway persisted.
    ///
    /// # Errors
    /// Fails when the wipe does not reach storage.
    fn clear_all(&self) -> Result<()>;
}
