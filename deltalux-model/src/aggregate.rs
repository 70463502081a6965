//! Group state aggregation
//!
//! Produces the one representative state reported as "the group's
//! state" from the current member states, which may briefly diverge
//! from what was last commanded.

use crate::group::GroupConfig;
use crate::id::LightId;
use crate::state::{GroupState, LightState};
use std::collections::HashMap;

/// Aggregate member states into one representative group state
///
/// The group is on if any member is on, off only when every member is
/// off or unknown. Brightness and color come from the reference
/// member: the first member in config order whose observed state is
/// on. Reporting the reference member rather than an average keeps
/// the reported value round-trippable through the offset mapping;
/// an average would drift over repeated adjustments.
pub fn aggregate(config: &GroupConfig, states: &HashMap<LightId, LightState>) -> GroupState {
    let reference = config
        .members()
        .iter()
        .filter_map(|m| states.get(m.id()))
        .find(|s| s.on);

    match reference {
        Some(state) => GroupState {
            on: true,
            brightness: state.brightness,
            color: state.color.clone(),
            color_temp: state.color_temp,
        },
        None => GroupState::off(),
    }
}
