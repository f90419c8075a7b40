//! Process-local gateway wiring shared by the CLI commands.

use becomeit_core::scheduling::{FireDescriptor, SchedulingGateway, TriggerRef};
use becomeit_core::storage::HabitStore;
use becomeit_core::{CoreError, HabitService};
use tracing::debug;
use uuid::Uuid;

/// Stand-in scheduler for a process without an OS notification pipe.
///
/// Handing out a ref satisfies the gateway contract; the fired side of
/// the loop is played back explicitly through `notify fire`.
pub struct LocalScheduler;

impl SchedulingGateway for LocalScheduler {
    fn schedule_trigger(
        &mut self,
        habit_id: Uuid,
        descriptor: &FireDescriptor,
    ) -> Result<TriggerRef, CoreError> {
        let trigger_ref = TriggerRef::new(format!("local-{}", Uuid::new_v4()));
        debug!(%habit_id, ?descriptor, %trigger_ref, "trigger scheduled");
        Ok(trigger_ref)
    }

    fn cancel_trigger(&mut self, trigger_ref: &TriggerRef) -> Result<(), CoreError> {
        debug!(%trigger_ref, "trigger cancelled");
        Ok(())
    }
}

/// Open the on-disk store and load the full service.
pub fn open_service() -> Result<HabitService, Box<dyn std::error::Error>> {
    let store = HabitStore::open()?;
    Ok(HabitService::open(Box::new(store), Box::new(LocalScheduler))?)
}
