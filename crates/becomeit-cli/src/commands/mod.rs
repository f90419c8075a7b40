pub mod config;
pub mod habit;
pub mod notify;
pub mod stats;
pub mod templates;
