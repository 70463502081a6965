//! In-flight command bookkeeping

use deltalux_model::{LightId, LightState, LightTarget};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Expectation state for one issued group command
///
/// Records which member state-changes are self-caused and must be
/// consumed without triggering reconciliation, exactly once each per
/// sequence number. A confirmation counts only if the reported state
/// matches what was commanded; a different value means someone else
/// intervened and is handled as an external change.
#[derive(Debug)]
pub struct PendingCommand {
    seq: u64,
    expected: HashMap<LightId, LightTarget>,
    issued_at: Instant,
}

impl PendingCommand {
    pub fn new(seq: u64, expected: HashMap<LightId, LightTarget>, issued_at: Instant) -> Self {
        Self {
            seq,
            expected,
            issued_at,
        }
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Whether this state-change is the expected echo for `id`
    pub fn matches(&self, id: &LightId, state: &LightState) -> bool {
        self.expected
            .get(id)
            .is_some_and(|target| state.matches_target(target))
    }

    /// Consume the expectation for `id`
    ///
    /// Returns the matched target; each expectation is consumed at
    /// most once per sequence number.
    pub fn confirm(&mut self, id: &LightId) -> Option<LightTarget> {
        self.expected.remove(id)
    }

    /// All expectations confirmed
    pub fn is_complete(&self) -> bool {
        self.expected.is_empty()
    }

    /// Number of unconfirmed expectations
    pub fn remaining(&self) -> usize {
        self.expected.len()
    }

    /// Bounded wait exceeded
    pub fn is_expired(&self, now: Instant, timeout: Duration) -> bool {
        now.duration_since(self.issued_at) >= timeout
    }
}
