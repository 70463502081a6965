//! The injected light-control capability

use crate::command::LightCommand;
use deltalux_model::LightId;
use thiserror::Error;

/// A per-light command failure
///
/// Reported per entity; a failed member leaves its contribution stale
/// but never blocks or rolls back commands to its siblings, and is not
/// retried here. Retry policy, if any, belongs to the implementation
/// behind [`LightController`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("command to {id} failed: {reason}")]
pub struct DeviceCommandFailure {
    pub id: LightId,
    pub reason: String,
}

impl DeviceCommandFailure {
    pub fn new(id: LightId, reason: impl Into<String>) -> Self {
        Self {
            id,
            reason: reason.into(),
        }
    }
}

/// Downstream interface for issuing commands to member lights
///
/// Injected into the coordinator so the core stays testable with a
/// fake implementation. Dispatch is fire-and-forget: an `Ok` means the
/// command was accepted for delivery, and the resulting state change
/// arrives later as a notification.
pub trait LightController {
    /// Issue a state command to one light
    fn set_light_state(&mut self, command: &LightCommand) -> Result<(), DeviceCommandFailure>;
}

impl<C: LightController + ?Sized> LightController for &mut C {
    fn set_light_state(&mut self, command: &LightCommand) -> Result<(), DeviceCommandFailure> {
        (**self).set_light_state(command)
    }
}

impl<C: LightController + ?Sized> LightController for Box<C> {
    fn set_light_state(&mut self, command: &LightCommand) -> Result<(), DeviceCommandFailure> {
        (**self).set_light_state(command)
    }
}
