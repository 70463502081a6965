//! DeltaLux
//!
//! Offset-coordinated light groups: change the group's brightness and
//! every member light moves to a brightness derived from its own
//! offset, preserving relative differences (accent lights stay
//! consistently dimmer than primary lights). Color and color
//! temperature pass through unchanged; per-light min/max bounds clamp
//! the result.
//!
//! The engine is bidirectional: state changes made outside the group
//! (physical switches, other automations) are folded back into a
//! group-level estimate via the inverse offset mapping, while echoes
//! of the group's own commands are recognized and suppressed so no
//! feedback loop forms.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use deltalux::{LightGroup, GroupCommand};
//!
//! // Parse a host config entry and spawn the group worker
//! let config = deltalux::config::from_json_str(entry_json)?;
//! let group = LightGroup::new(config, controller);
//!
//! // Group commands fan out through the offset mapping
//! group.set_brightness(50)?;
//!
//! // Host state-change notifications flow back in
//! group.notify_state_changed(changed_id, new_state)?;
//!
//! // The group reports the reference member's state
//! let state = group.state();
//!
//! // Reconciliation reports for host-side display/automation
//! for report in group.reports() {
//!     println!("group update: {:?}", report);
//! }
//! ```
//!
//! # Crates
//!
//! - [`deltalux_model`]: pure offset mapping and aggregation
//! - [`deltalux_sync`]: the coordinator state machine and dispatcher
//! - this crate: config parsing, the [`LightGroup`] handle, logging

pub mod config;
pub mod group;
pub mod logging;

mod error;

// ============================================================================
// Re-exports - Public API
// ============================================================================

pub use error::GroupError;
pub use group::LightGroup;

// Model types
pub use deltalux_model::{
    Color, ConfigError, GroupConfig, GroupState, LightId, LightMember, LightState, LightTarget,
    OffsetType,
};

// Sync types
pub use deltalux_sync::{
    DeviceCommandFailure, GroupCommand, GroupReport, LightCommand, LightController, Power,
    ReportIterator,
};

// Logging
pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode};

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::config::{from_json_str, GroupConfigFile, LightEntry};
    pub use crate::error::GroupError;
    pub use crate::group::LightGroup;
    pub use deltalux_model::{
        Color, GroupConfig, GroupState, LightId, LightMember, LightState, OffsetType,
    };
    pub use deltalux_sync::{
        DeviceCommandFailure, GroupCommand, GroupReport, LightCommand, LightController,
    };
}
