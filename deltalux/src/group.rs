//! LightGroup handle
//!
//! The host-facing surface for one offset-coordinated group: commands
//! in, member state-change notifications in, representative group
//! state and reconciliation reports out. All methods are sync; the
//! actual work happens on the group's serial worker thread.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use deltalux_model::{GroupConfig, GroupState, LightId, LightState};
use deltalux_sync::{
    GroupCommand, GroupDispatcher, LightController, ReportIterator, SyncCoordinator,
};

use crate::error::GroupError;

/// Handle for one offset-coordinated light group
///
/// Owns the group's worker thread. Dropping the handle shuts the
/// worker down; `shutdown()` does the same but waits for it.
///
/// # Example
///
/// ```rust,ignore
/// use deltalux::{GroupCommand, LightGroup};
///
/// let config = deltalux::config::from_json_str(entry_json)?;
/// let group = LightGroup::new(config, controller);
///
/// group.set_brightness(50)?;
/// group.notify_state_changed(changed_id, new_state)?;
///
/// let state = group.state();
/// println!("{}: on={} brightness={:?}", group.name(), state.on, state.brightness);
/// ```
pub struct LightGroup {
    name: String,

    /// Current configuration, swapped atomically on reload
    config: RwLock<GroupConfig>,

    /// Serial worker for this group
    dispatcher: GroupDispatcher,
}

impl LightGroup {
    /// Create a group and spawn its worker
    ///
    /// The controller is the injected light-control interface; it is
    /// moved onto the worker thread and invoked serially.
    pub fn new<C>(config: GroupConfig, controller: C) -> Self
    where
        C: LightController + Send + 'static,
    {
        let name = config.name().to_string();
        debug!(group = %name, members = config.member_count(), "creating light group");

        let dispatcher = GroupDispatcher::spawn(SyncCoordinator::new(config.clone(), controller));

        Self {
            name,
            config: RwLock::new(config),
            dispatcher,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Turn the group on, restoring the last commanded brightness
    pub fn turn_on(&self) -> Result<(), GroupError> {
        self.send(GroupCommand::turn_on())
    }

    /// Turn the group off
    ///
    /// The brightness memory survives, so a later bare `turn_on`
    /// restores the previous level.
    pub fn turn_off(&self) -> Result<(), GroupError> {
        self.send(GroupCommand::turn_off())
    }

    /// Set the group-level brightness (0-100; 0 behaves like off)
    pub fn set_brightness(&self, level: u8) -> Result<(), GroupError> {
        self.send(GroupCommand::turn_on().with_brightness(level))
    }

    /// Issue an arbitrary group command (color, transition, ...)
    pub fn send(&self, cmd: GroupCommand) -> Result<(), GroupError> {
        self.dispatcher.command(cmd)?;
        Ok(())
    }

    /// Deliver a member state-change notification from the host
    pub fn notify_state_changed(&self, id: LightId, state: LightState) -> Result<(), GroupError> {
        self.dispatcher.notify_state_changed(id, state)?;
        Ok(())
    }

    /// Hot-reload the group configuration
    ///
    /// The swap happens between events on the worker, never
    /// mid-computation, and drops any in-flight expectation state.
    pub fn reload(&self, config: GroupConfig) -> Result<(), GroupError> {
        self.dispatcher.reload(config.clone())?;
        *self.config.write() = config;
        Ok(())
    }

    /// Representative state for the group (reference-member rule)
    pub fn state(&self) -> GroupState {
        self.dispatcher.snapshot().group_state
    }

    /// The brightness a bare turn-on would restore
    pub fn master_brightness(&self) -> u8 {
        self.dispatcher.snapshot().master_brightness
    }

    /// Member light ids, in command-issue order
    pub fn member_ids(&self) -> Vec<LightId> {
        self.config
            .read()
            .members()
            .iter()
            .map(|m| m.id().clone())
            .collect()
    }

    /// Per-member offsets, for host-side display
    pub fn offsets(&self) -> HashMap<LightId, i16> {
        self.config
            .read()
            .members()
            .iter()
            .map(|m| (m.id().clone(), m.offset()))
            .collect()
    }

    /// Blocking iterator over reconciliation and failure reports
    pub fn reports(&self) -> ReportIterator {
        self.dispatcher.reports()
    }

    /// Stop the worker and wait for it to finish
    pub fn shutdown(self) {
        self.dispatcher.shutdown();
    }
}
