//! Core error types for becomeit-core.
//!
//! This module defines the error hierarchy using thiserror. Recoverable
//! no-op outcomes (duplicate notification events, fires for inactive
//! habits) are not errors; see [`crate::ledger::FireOutcome`].

use std::path::PathBuf;

use chrono::{DateTime, Local};
use thiserror::Error;
use uuid::Uuid;

/// Core error type for becomeit-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Recurrence rule errors
    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    /// Ledger command errors
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Occurrence log errors
    #[error("Occurrence error: {0}")]
    Occurrence(#[from] OccurrenceError),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Recurrence rule validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// Repeat interval outside the accepted range
    #[error("invalid repeat interval {interval}: must be between 1 and {}", crate::recurrence::MAX_INTERVAL)]
    InvalidInterval { interval: u32 },

    /// Start time string that does not parse as HH:mm
    #[error("invalid start time '{value}': expected HH:mm")]
    InvalidStartTime { value: String },

    /// Repeat unit string outside the supported set
    #[error("unknown repeat unit '{0}'")]
    UnknownUnit(String),
}

/// Errors raised by ledger commands.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Completion attempted with no notification opportunity outstanding
    #[error("habit {habit_id} has no pending opportunity to complete")]
    NoPendingOpportunity { habit_id: Uuid },

    /// Habit id not present in the active set
    #[error("unknown habit: {habit_id}")]
    UnknownHabit { habit_id: Uuid },

    /// Habit title was empty or whitespace
    #[error("habit title must not be empty")]
    EmptyTitle,
}

/// Errors raised by occurrence toggling.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OccurrenceError {
    /// Completion attempted after the day-scoped window closed
    #[error("completion window closed at {closed_at}")]
    WindowClosed { closed_at: DateTime<Local> },

    /// Occurrence was already marked complete
    #[error("occurrence already completed")]
    AlreadyCompleted,
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the store
    #[error("failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Store is locked by another process
    #[error("store is locked")]
    Locked,

    /// Failed to load configuration
    #[error("failed to load configuration from {path}: {message}")]
    ConfigLoad { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("failed to save configuration to {path}: {message}")]
    ConfigSave { path: PathBuf, message: String },
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Storage(StorageError::from(err))
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CoreError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        CoreError::Custom(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
