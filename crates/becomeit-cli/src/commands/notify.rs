//! Notification callback commands for CLI.
//!
//! `fire` plays the gateway's fired callback into the ledger, which is
//! where a platform notification layer would deliver it. Repeating the
//! same `--ref` exercises the duplicate-delivery absorption.

use becomeit_core::FireOutcome;
use chrono::Local;
use clap::Subcommand;
use uuid::Uuid;

use crate::gateway;

#[derive(Subcommand)]
pub enum NotifyAction {
    /// Deliver a fired-trigger callback for a habit
    Fire {
        /// Habit ID
        id: String,
        /// Physical notification reference (defaults to a fresh UUID)
        #[arg(long = "ref")]
        notification_ref: Option<String>,
    },
    /// Cancel and re-create the triggers of every active habit
    Sync,
}

pub fn run(action: NotifyAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut service = gateway::open_service()?;
    let now = Local::now();

    match action {
        NotifyAction::Fire {
            id,
            notification_ref,
        } => {
            let id: Uuid = id.parse()?;
            let notification_ref =
                notification_ref.unwrap_or_else(|| Uuid::new_v4().to_string());
            match service.notification_fired(id, &notification_ref, now) {
                FireOutcome::Recorded(event) => {
                    println!("Notification recorded:");
                    println!("{}", serde_json::to_string_pretty(&event)?);
                }
                FireOutcome::Duplicate => {
                    println!("Duplicate delivery absorbed: {notification_ref}");
                }
                FireOutcome::Inactive => {
                    println!("No active habit for fire: {id}");
                }
            }
        }
        NotifyAction::Sync => {
            let count = service.resync_triggers(now);
            println!("Triggers resynced for {count} habit(s)");
        }
    }
    Ok(())
}
