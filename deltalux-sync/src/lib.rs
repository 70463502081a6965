//! DeltaLux Group Synchronization
//!
//! The stateful half of deltalux: turns group-level commands into
//! per-light commands through the offset mapping, and folds member
//! state changes back into a group-level estimate without feedback
//! loops.
//!
//! # Features
//!
//! - **Echo suppression**: state changes caused by this system's own
//!   just-issued commands are recognized and consumed, never recomputed
//! - **Debounce**: rapid repeated group commands supersede one another;
//!   only the latest expectation set stays live
//! - **Bounded waits**: per-light confirmations are waited on with a
//!   timeout and treated as best-effort
//! - **Injected dispatch**: downstream light control is a trait, so the
//!   engine is fully testable with a fake controller
//! - **Serial dispatch**: an optional per-group worker thread delivers
//!   events serially with a blocking report iterator
//!
//! # Architecture
//!
//! ```text
//! GroupCommand ──▶ SyncCoordinator ──▶ LightController (per light)
//!                        ▲ │
//!  state changes ────────┘ └──▶ reconciled GroupState reports
//! ```
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use deltalux_sync::{GroupCommand, GroupDispatcher, SyncCoordinator};
//!
//! let dispatcher = GroupDispatcher::spawn(SyncCoordinator::new(config, controller));
//! dispatcher.command(GroupCommand::turn_on().with_brightness(50))?;
//!
//! for report in dispatcher.reports() {
//!     println!("group update: {:?}", report);
//! }
//! ```

// Core modules
pub mod command;
pub mod controller;
pub mod coordinator;
pub mod dispatcher;
pub mod pending;

// Error types
pub mod error;

// ============================================================================
// Re-exports - Public API
// ============================================================================

pub use command::{GroupCommand, LightCommand, Power};
pub use controller::{DeviceCommandFailure, LightController};
pub use coordinator::{
    CommandOutcome, StateChangeOutcome, SyncCoordinator, SyncState, DEFAULT_CONFIRM_TIMEOUT,
};
pub use dispatcher::{GroupDispatcher, GroupEvent, GroupReport, GroupSnapshot, ReportIterator};
pub use error::{Result, SyncError};
pub use pending::PendingCommand;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::command::{GroupCommand, LightCommand, Power};
    pub use crate::controller::{DeviceCommandFailure, LightController};
    pub use crate::coordinator::{StateChangeOutcome, SyncCoordinator, SyncState};
    pub use crate::dispatcher::{GroupDispatcher, GroupEvent, GroupReport};
    pub use crate::error::SyncError;
}
