//! Group synchronization state machine
//!
//! Listens for group-level commands and member state-change
//! notifications, decides what downstream light commands to issue, and
//! suppresses self-triggered feedback loops. The host guarantee that
//! no two events for the same group are processed concurrently makes
//! this an ordinary single-threaded state machine; the serial
//! dispatcher in [`crate::dispatcher`] provides that guarantee when a
//! host does not.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use deltalux_model::{
    aggregate, mapping, GroupConfig, GroupState, LightId, LightState, MappingError,
};

use crate::command::{GroupCommand, LightCommand, Power};
use crate::controller::{DeviceCommandFailure, LightController};
use crate::pending::PendingCommand;

/// Default bounded wait for per-light confirmations
pub const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(5);

/// Coordinator phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Nothing in flight
    Idle,
    /// A group command was issued; waiting for confirmations or timeout
    Commanding,
    /// An external member change is being folded back into the group level
    Reconciling,
}

/// Result of issuing one group command
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutcome {
    /// Sequence number of the recorded expectation set
    pub seq: u64,
    /// Members a command was accepted for, in issue order
    pub issued: Vec<LightId>,
    /// Per-member dispatch failures; siblings are unaffected
    pub failures: Vec<DeviceCommandFailure>,
}

/// Result of processing one member state-change notification
#[derive(Debug, Clone, PartialEq)]
pub enum StateChangeOutcome {
    /// Self-caused echo of the in-flight command, consumed silently
    EchoConsumed { seq: u64, remaining: usize },
    /// Late confirmation of a superseded command; recorded, no action
    StaleCommandIgnored { seq: u64 },
    /// External change folded into a fresh group-level estimate
    Reconciled {
        /// Level inferred from the changed member, when it was on with
        /// a known brightness
        inferred_level: Option<u8>,
        /// Representative state to report for the group
        group_state: GroupState,
    },
    /// Not a member of this group
    Ignored,
}

/// The stateful synchronization engine for one light group
///
/// Owns the group configuration, the injected [`LightController`], the
/// in-flight expectation state and the last observed member states.
/// All methods take `now` explicitly so timeout behavior is testable
/// without real clocks.
///
/// # Example
///
/// ```rust,ignore
/// let mut coordinator = SyncCoordinator::new(config, controller);
/// coordinator.handle_group_command(&GroupCommand::turn_on().with_brightness(50), Instant::now());
///
/// // Later, the host delivers the resulting state changes back:
/// let outcome = coordinator.handle_state_change(&id, new_state, Instant::now());
/// ```
pub struct SyncCoordinator<C: LightController> {
    config: GroupConfig,
    controller: C,
    state: SyncState,
    /// Expectation set for the in-flight command, if any
    pending: Option<PendingCommand>,
    /// Superseded expectation sets, kept so their late confirmations
    /// can be recognized instead of triggering reconciliation
    abandoned: Vec<PendingCommand>,
    next_seq: u64,
    /// Brightness memory; retained across off so a bare turn-on
    /// restores the previous level. Never 0.
    last_commanded_level: u8,
    member_states: HashMap<LightId, LightState>,
    confirm_timeout: Duration,
}

impl<C: LightController> SyncCoordinator<C> {
    /// Create a coordinator with the default confirmation timeout
    pub fn new(config: GroupConfig, controller: C) -> Self {
        Self {
            config,
            controller,
            state: SyncState::Idle,
            pending: None,
            abandoned: Vec::new(),
            next_seq: 1,
            last_commanded_level: 50,
            member_states: HashMap::new(),
            confirm_timeout: DEFAULT_CONFIRM_TIMEOUT,
        }
    }

    /// Override the bounded wait for confirmations
    pub fn with_confirm_timeout(mut self, timeout: Duration) -> Self {
        self.confirm_timeout = timeout;
        self
    }

    /// Process a group-level command
    ///
    /// Computes per-light targets via the offset mapping, issues the
    /// downstream commands in members-list order and records the
    /// expectation set. A command already in flight is superseded: its
    /// expectation set is abandoned silently and only its late
    /// confirmations are still recognized.
    pub fn handle_group_command(&mut self, cmd: &GroupCommand, now: Instant) -> CommandOutcome {
        self.expire_pending(now);

        let seq = self.next_seq;
        self.next_seq += 1;

        let level = match cmd.power {
            Power::Off => 0,
            Power::On => cmd.brightness.unwrap_or(self.last_commanded_level),
        };
        if level > 0 {
            self.last_commanded_level = level;
        }

        debug!(
            group = self.config.name(),
            seq, level, "processing group command"
        );

        let mut expected = HashMap::new();
        let mut issued = Vec::new();
        let mut failures = Vec::new();

        for member in self.config.members() {
            let target = mapping::target(level, member, self.config.offset_type());
            let light_cmd = LightCommand {
                id: member.id().clone(),
                target,
                color: cmd.color.clone(),
                color_temp: cmd.color_temp,
                transition: cmd.transition,
            };
            match self.controller.set_light_state(&light_cmd) {
                Ok(()) => {
                    expected.insert(member.id().clone(), target);
                    issued.push(member.id().clone());
                }
                Err(failure) => {
                    warn!(id = %failure.id, reason = %failure.reason, "light command failed");
                    failures.push(failure);
                }
            }
        }

        if let Some(old) = self.pending.take() {
            debug!(
                old_seq = old.seq(),
                new_seq = seq,
                "in-flight command superseded"
            );
            self.abandoned.push(old);
        }

        if expected.is_empty() {
            // Nothing to wait for (every dispatch failed)
            self.state = SyncState::Idle;
        } else {
            self.pending = Some(PendingCommand::new(seq, expected, now));
            self.state = SyncState::Commanding;
        }

        CommandOutcome {
            seq,
            issued,
            failures,
        }
    }

    /// Process a member state-change notification
    ///
    /// Echoes of the in-flight command are consumed without side
    /// effects; late confirmations of superseded commands are recorded
    /// but trigger nothing; anything else is an external change and is
    /// reconciled: the inverse mapping estimates a fresh group level
    /// and the aggregated state is returned for reporting. No commands
    /// are re-issued to sibling lights.
    pub fn handle_state_change(
        &mut self,
        id: &LightId,
        new_state: LightState,
        now: Instant,
    ) -> StateChangeOutcome {
        self.expire_pending(now);
        self.prune_abandoned(now);

        if let Some(pending) = self.pending.as_mut() {
            if pending.matches(id, &new_state) {
                pending.confirm(id);
                let seq = pending.seq();
                let remaining = pending.remaining();
                self.member_states.insert(id.clone(), new_state);
                if remaining == 0 {
                    debug!(seq, "all confirmations received");
                    self.pending = None;
                    self.state = SyncState::Idle;
                }
                return StateChangeOutcome::EchoConsumed { seq, remaining };
            }
        }

        if let Some(idx) = self
            .abandoned
            .iter()
            .position(|p| p.matches(id, &new_state))
        {
            self.abandoned[idx].confirm(id);
            let seq = self.abandoned[idx].seq();
            if self.abandoned[idx].is_complete() {
                self.abandoned.remove(idx);
            }
            self.member_states.insert(id.clone(), new_state);
            debug!(%id, seq, "late confirmation for superseded command");
            return StateChangeOutcome::StaleCommandIgnored { seq };
        }

        if !self.config.contains_member(id) {
            debug!(%id, "state change for non-member ignored");
            return StateChangeOutcome::Ignored;
        }

        self.state = SyncState::Reconciling;
        self.member_states.insert(id.clone(), new_state.clone());

        let inferred_level = match (self.config.member(id), new_state.on, new_state.brightness) {
            (Some(member), true, Some(actual)) => {
                match mapping::infer_level(actual, member, self.config.offset_type()) {
                    Ok(level) => Some(level),
                    Err(MappingError::UndefinedInverse { .. }) => {
                        warn!(
                            %id,
                            fallback = self.last_commanded_level,
                            "inverse mapping undefined, using last commanded level"
                        );
                        Some(self.last_commanded_level)
                    }
                }
            }
            _ => None,
        };

        if let Some(level) = inferred_level {
            if level > 0 {
                self.last_commanded_level = level;
            }
        }

        let group_state = aggregate(&self.config, &self.member_states);
        debug!(%id, ?inferred_level, "reconciled external change");
        self.state = SyncState::Idle;

        StateChangeOutcome::Reconciled {
            inferred_level,
            group_state,
        }
    }

    /// Expire the in-flight command and prune abandoned expectations
    ///
    /// Called from every event handler; hosts without a steady event
    /// stream should call it periodically so a lost confirmation does
    /// not pin the coordinator in `Commanding`.
    pub fn poll_timeouts(&mut self, now: Instant) {
        self.expire_pending(now);
        self.prune_abandoned(now);
    }

    /// Replace the group configuration
    ///
    /// Applied atomically between events. Drops all expectation state
    /// (the old mapping no longer describes the new members) and
    /// forgets observed states for removed members.
    pub fn reload_config(&mut self, config: GroupConfig) {
        debug!(group = config.name(), "configuration reloaded");
        self.member_states.retain(|id, _| config.contains_member(id));
        self.config = config;
        self.pending = None;
        self.abandoned.clear();
        self.state = SyncState::Idle;
    }

    /// Representative state for the group, from current knowledge
    pub fn group_state(&self) -> GroupState {
        aggregate(&self.config, &self.member_states)
    }

    /// The brightness a bare turn-on would restore
    pub fn master_brightness(&self) -> u8 {
        self.last_commanded_level
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn config(&self) -> &GroupConfig {
        &self.config
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.controller
    }

    fn expire_pending(&mut self, now: Instant) {
        if let Some(pending) = &self.pending {
            if pending.is_expired(now, self.confirm_timeout) {
                debug!(
                    seq = pending.seq(),
                    unconfirmed = pending.remaining(),
                    "confirmation timeout, discarding pending command"
                );
                self.pending = None;
                self.state = SyncState::Idle;
            }
        }
    }

    fn prune_abandoned(&mut self, now: Instant) {
        let timeout = self.confirm_timeout;
        self.abandoned.retain(|p| !p.is_expired(now, timeout));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deltalux_model::{LightMember, LightTarget, OffsetType};
    use std::collections::HashSet;

    /// Records issued commands; optionally fails specific lights
    struct RecordingController {
        commands: Vec<LightCommand>,
        failing: HashSet<LightId>,
    }

    impl RecordingController {
        fn new() -> Self {
            Self {
                commands: Vec::new(),
                failing: HashSet::new(),
            }
        }

        fn failing(ids: &[&str]) -> Self {
            Self {
                commands: Vec::new(),
                failing: ids.iter().map(|s| LightId::new(*s)).collect(),
            }
        }
    }

    impl LightController for RecordingController {
        fn set_light_state(&mut self, command: &LightCommand) -> Result<(), DeviceCommandFailure> {
            if self.failing.contains(&command.id) {
                return Err(DeviceCommandFailure::new(
                    command.id.clone(),
                    "device unreachable",
                ));
            }
            self.commands.push(command.clone());
            Ok(())
        }
    }

    fn test_config(offset_type: OffsetType) -> GroupConfig {
        GroupConfig::new(
            "Test",
            offset_type,
            vec![
                LightMember::new(LightId::new("light.a"), 0, 1, 100).unwrap(),
                LightMember::new(LightId::new("light.b"), -20, 5, 100).unwrap(),
                LightMember::new(LightId::new("light.c"), -40, 2, 80).unwrap(),
            ],
        )
        .unwrap()
    }

    fn coordinator(offset_type: OffsetType) -> SyncCoordinator<RecordingController> {
        SyncCoordinator::new(test_config(offset_type), RecordingController::new())
    }

    fn id(s: &str) -> LightId {
        LightId::new(s)
    }

    #[test]
    fn test_command_targets_absolute() {
        let mut c = coordinator(OffsetType::Absolute);
        let now = Instant::now();

        let outcome =
            c.handle_group_command(&GroupCommand::turn_on().with_brightness(50), now);
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.issued, vec![id("light.a"), id("light.b"), id("light.c")]);

        let targets: Vec<_> = c.controller().commands.iter().map(|cmd| cmd.target).collect();
        assert_eq!(
            targets,
            vec![
                LightTarget::On { brightness: 50 },
                LightTarget::On { brightness: 30 },
                LightTarget::On { brightness: 10 },
            ]
        );
        assert_eq!(c.state(), SyncState::Commanding);
    }

    #[test]
    fn test_command_targets_relative() {
        let mut c = coordinator(OffsetType::Relative);
        let now = Instant::now();

        c.handle_group_command(&GroupCommand::turn_on().with_brightness(80), now);
        let targets: Vec<_> = c.controller().commands.iter().map(|cmd| cmd.target).collect();
        assert_eq!(
            targets,
            vec![
                LightTarget::On { brightness: 80 },
                LightTarget::On { brightness: 64 },
                LightTarget::On { brightness: 48 },
            ]
        );
    }

    #[test]
    fn test_turn_off_targets_everything_off() {
        let mut c = coordinator(OffsetType::Absolute);
        let now = Instant::now();

        c.handle_group_command(&GroupCommand::turn_off(), now);
        assert!(c
            .controller()
            .commands
            .iter()
            .all(|cmd| cmd.target == LightTarget::Off));
    }

    #[test]
    fn test_bare_turn_on_restores_last_level() {
        let mut c = coordinator(OffsetType::Absolute);
        let now = Instant::now();

        c.handle_group_command(&GroupCommand::turn_on().with_brightness(70), now);
        c.handle_group_command(&GroupCommand::turn_off(), now);
        c.controller_mut().commands.clear();

        c.handle_group_command(&GroupCommand::turn_on(), now);
        assert_eq!(
            c.controller().commands[0].target,
            LightTarget::On { brightness: 70 }
        );
    }

    #[test]
    fn test_echo_suppression_exactly_n() {
        let mut c = coordinator(OffsetType::Absolute);
        let now = Instant::now();

        c.handle_group_command(&GroupCommand::turn_on().with_brightness(50), now);

        // All three commanded values echo back: consumed, no reconciliation
        for (light, brightness) in [("light.a", 50), ("light.b", 30), ("light.c", 10)] {
            let outcome = c.handle_state_change(&id(light), LightState::on(brightness), now);
            assert!(matches!(outcome, StateChangeOutcome::EchoConsumed { .. }));
        }
        assert_eq!(c.state(), SyncState::Idle);

        // A fourth, unrelated notification does reconcile
        let outcome = c.handle_state_change(&id("light.a"), LightState::on(80), now);
        assert!(matches!(outcome, StateChangeOutcome::Reconciled { .. }));
    }

    #[test]
    fn test_unexpected_value_during_commanding_reconciles() {
        let mut c = coordinator(OffsetType::Absolute);
        let now = Instant::now();

        c.handle_group_command(&GroupCommand::turn_on().with_brightness(50), now);

        // light.b was commanded to 30 but reports 55: someone intervened
        let outcome = c.handle_state_change(&id("light.b"), LightState::on(55), now);
        match outcome {
            StateChangeOutcome::Reconciled { inferred_level, .. } => {
                // 55 - (-20) = 75
                assert_eq!(inferred_level, Some(75));
            }
            other => panic!("expected reconciliation, got {:?}", other),
        }
        assert_eq!(c.master_brightness(), 75);
    }

    #[test]
    fn test_debounce_supersedes_pending() {
        let mut c = coordinator(OffsetType::Absolute);
        let now = Instant::now();

        c.handle_group_command(&GroupCommand::turn_on().with_brightness(10), now);
        c.handle_group_command(&GroupCommand::turn_on().with_brightness(20), now);
        let last = c.handle_group_command(&GroupCommand::turn_on().with_brightness(30), now);

        // Late confirmations of the superseded commands are recognized
        // and dropped without reconciliation
        let outcome = c.handle_state_change(&id("light.a"), LightState::on(10), now);
        assert_eq!(outcome, StateChangeOutcome::StaleCommandIgnored { seq: 1 });
        let outcome = c.handle_state_change(&id("light.a"), LightState::on(20), now);
        assert_eq!(outcome, StateChangeOutcome::StaleCommandIgnored { seq: 2 });

        // Confirmations of the latest command are normal echoes
        let outcome = c.handle_state_change(&id("light.a"), LightState::on(30), now);
        assert_eq!(
            outcome,
            StateChangeOutcome::EchoConsumed {
                seq: last.seq,
                remaining: 2
            }
        );
        assert_eq!(c.master_brightness(), 30);
    }

    #[test]
    fn test_confirmation_timeout_returns_to_idle() {
        let mut c = coordinator(OffsetType::Absolute)
            .with_confirm_timeout(Duration::from_secs(5));
        let now = Instant::now();

        c.handle_group_command(&GroupCommand::turn_on().with_brightness(50), now);
        assert_eq!(c.state(), SyncState::Commanding);

        c.poll_timeouts(now + Duration::from_secs(6));
        assert_eq!(c.state(), SyncState::Idle);
    }

    #[test]
    fn test_partial_failure_does_not_block_siblings() {
        let config = test_config(OffsetType::Absolute);
        let mut c = SyncCoordinator::new(config, RecordingController::failing(&["light.b"]));
        let now = Instant::now();

        let outcome =
            c.handle_group_command(&GroupCommand::turn_on().with_brightness(50), now);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].id, id("light.b"));
        assert_eq!(outcome.issued, vec![id("light.a"), id("light.c")]);

        // Only the successfully issued members are expected to echo
        let o1 = c.handle_state_change(&id("light.a"), LightState::on(50), now);
        assert!(matches!(o1, StateChangeOutcome::EchoConsumed { .. }));
        let o2 = c.handle_state_change(&id("light.c"), LightState::on(10), now);
        assert!(matches!(o2, StateChangeOutcome::EchoConsumed { remaining: 0, .. }));
        assert_eq!(c.state(), SyncState::Idle);
    }

    #[test]
    fn test_all_failures_leave_idle() {
        let config = test_config(OffsetType::Absolute);
        let mut c = SyncCoordinator::new(
            config,
            RecordingController::failing(&["light.a", "light.b", "light.c"]),
        );
        let now = Instant::now();

        let outcome =
            c.handle_group_command(&GroupCommand::turn_on().with_brightness(50), now);
        assert_eq!(outcome.failures.len(), 3);
        assert!(outcome.issued.is_empty());
        assert_eq!(c.state(), SyncState::Idle);
    }

    #[test]
    fn test_reconcile_does_not_command_siblings() {
        let mut c = coordinator(OffsetType::Absolute);
        let now = Instant::now();

        c.handle_state_change(&id("light.b"), LightState::on(40), now);
        // A manual change on one light never cascades into commands
        assert!(c.controller().commands.is_empty());
    }

    #[test]
    fn test_reconcile_undefined_inverse_falls_back() {
        let config = GroupConfig::new(
            "Test",
            OffsetType::Relative,
            vec![
                LightMember::new(LightId::new("light.a"), 0, 1, 100).unwrap(),
                LightMember::new(LightId::new("light.dead"), -100, 1, 100).unwrap(),
            ],
        )
        .unwrap();
        let mut c = SyncCoordinator::new(config, RecordingController::new());
        let now = Instant::now();

        c.handle_group_command(&GroupCommand::turn_on().with_brightness(60), now);

        // Manually forced on: its inverse is undefined, so the level
        // estimate falls back to the last commanded level
        let outcome = c.handle_state_change(&id("light.dead"), LightState::on(10), now);
        match outcome {
            StateChangeOutcome::Reconciled { inferred_level, .. } => {
                assert_eq!(inferred_level, Some(60));
            }
            other => panic!("expected reconciliation, got {:?}", other),
        }
    }

    #[test]
    fn test_non_member_ignored() {
        let mut c = coordinator(OffsetType::Absolute);
        let now = Instant::now();

        let outcome = c.handle_state_change(&id("light.elsewhere"), LightState::on(50), now);
        assert_eq!(outcome, StateChangeOutcome::Ignored);
    }

    #[test]
    fn test_reload_drops_expectations() {
        let mut c = coordinator(OffsetType::Absolute);
        let now = Instant::now();

        c.handle_group_command(&GroupCommand::turn_on().with_brightness(50), now);
        assert_eq!(c.state(), SyncState::Commanding);

        c.reload_config(test_config(OffsetType::Relative));
        assert_eq!(c.state(), SyncState::Idle);

        // The previously expected echo is now an external change
        let outcome = c.handle_state_change(&id("light.a"), LightState::on(50), now);
        assert!(matches!(outcome, StateChangeOutcome::Reconciled { .. }));
    }

    #[test]
    fn test_reload_forgets_removed_members() {
        let mut c = coordinator(OffsetType::Absolute);
        let now = Instant::now();

        c.handle_state_change(&id("light.c"), LightState::on(10), now);
        assert!(c.group_state().on);

        let smaller = GroupConfig::new(
            "Test",
            OffsetType::Absolute,
            vec![
                LightMember::new(LightId::new("light.a"), 0, 1, 100).unwrap(),
                LightMember::new(LightId::new("light.b"), -20, 5, 100).unwrap(),
            ],
        )
        .unwrap();
        c.reload_config(smaller);
        // light.c's state no longer contributes
        assert!(!c.group_state().on);
    }

    #[test]
    fn test_off_echo_consumed() {
        let mut c = coordinator(OffsetType::Absolute);
        let now = Instant::now();

        c.handle_group_command(&GroupCommand::turn_on().with_brightness(50), now);
        for (light, brightness) in [("light.a", 50), ("light.b", 30), ("light.c", 10)] {
            c.handle_state_change(&id(light), LightState::on(brightness), now);
        }

        c.handle_group_command(&GroupCommand::turn_off(), now);
        for light in ["light.a", "light.b", "light.c"] {
            let outcome = c.handle_state_change(&id(light), LightState::off(), now);
            assert!(matches!(outcome, StateChangeOutcome::EchoConsumed { .. }));
        }
        assert!(!c.group_state().on);
        // Brightness memory survives the off
        assert_eq!(c.master_brightness(), 50);
    }

    #[test]
    fn test_group_state_reports_reference_member() {
        let mut c = coordinator(OffsetType::Absolute);
        let now = Instant::now();

        c.handle_group_command(&GroupCommand::turn_on().with_brightness(50), now);
        for (light, brightness) in [("light.a", 50), ("light.b", 30), ("light.c", 10)] {
            c.handle_state_change(&id(light), LightState::on(brightness), now);
        }

        let state = c.group_state();
        assert!(state.on);
        assert_eq!(state.brightness, Some(50));
    }
}
