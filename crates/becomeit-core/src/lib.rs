//! # BecomeIt Core Library
//!
//! This library provides the habit scheduling and completion-reconciliation
//! engine behind BecomeIt. It implements a CLI-first philosophy where all
//! operations are available via a standalone CLI binary; any GUI is a thin
//! layer over the same core library.
//!
//! ## Architecture
//!
//! - **Recurrence**: pure wall-clock schedule math deriving each habit's
//!   next fire instant from its repeat rule
//! - **Ledger**: a single-writer state machine reconciling notification
//!   opportunities against user completions, with a strict
//!   one-opportunity-one-completion ordering invariant
//! - **Stats**: accuracy, weekly progress and chart bucketing derived
//!   from the ledger's history
//! - **Gateways**: scheduling and persistence live behind traits; the
//!   core produces trigger descriptors and consumes fired callbacks
//!   without ever touching an OS notification layer
//!
//! ## Key Components
//!
//! - [`HabitLedger`]: the aggregate owning habits and stats
//! - [`HabitService`]: composition-root orchestration over the gateways
//! - [`Recurrence`]: a habit's repeat rule
//! - [`HabitStore`]: SQLite-backed persistence
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod habit;
pub mod ledger;
pub mod occurrence;
pub mod recurrence;
pub mod scheduling;
pub mod service;
pub mod stats;
pub mod storage;
pub mod window;

pub use error::{CoreError, LedgerError, OccurrenceError, Result, ScheduleError, StorageError};
pub use events::Event;
pub use habit::{Category, Habit, HabitDraft, HabitState};
pub use ledger::{FireOutcome, HabitLedger};
pub use occurrence::{HabitOccurrence, OccurrenceLog};
pub use recurrence::{Recurrence, RepeatUnit};
pub use scheduling::{FireDescriptor, SchedulingGateway, SilentHours, TriggerRef};
pub use service::HabitService;
pub use stats::{ChartBucket, Granularity, HabitStats};
pub use storage::{Config, HabitStore, PersistenceGateway, Tone};
pub use window::{occurrence_window, OccurrenceWindow};
