//! DeltaLux Offset Model
//!
//! Pure data and arithmetic for offset-coordinated light groups.
//!
//! # Features
//!
//! - **Offset mapping**: derive each member light's target brightness
//!   from one group-level brightness, under absolute (additive) or
//!   relative (multiplicative) offset semantics
//! - **Inverse mapping**: estimate the group level implied by a
//!   member's actual brightness, for catching up to external changes
//! - **Clamping**: per-member min/max bounds applied as the last step,
//!   with an off sentinel for raw results at or below zero
//! - **Aggregation**: one representative group state derived from the
//!   current member states via a reference-member rule
//!
//! # Architecture
//!
//! ```text
//! GroupConfig ──▶ mapping::target ──▶ LightTarget   (per member)
//!                 mapping::infer_level ◀── observed brightness
//! member states ─▶ aggregate::aggregate ──▶ GroupState
//! ```
//!
//! This crate does no I/O and holds no mutable state beyond the
//! configuration values themselves; the stateful coordination lives in
//! `deltalux-sync`.
//!
//! # Quick Start
//!
//! ```rust
//! use deltalux_model::{mapping, GroupConfig, LightId, LightMember, LightTarget, OffsetType};
//!
//! let group = GroupConfig::new(
//!     "Living Room",
//!     OffsetType::Absolute,
//!     vec![
//!         LightMember::new(LightId::new("light.main"), 0, 1, 100).unwrap(),
//!         LightMember::new(LightId::new("light.accent"), -20, 5, 100).unwrap(),
//!     ],
//! )
//! .unwrap();
//!
//! for member in group.members() {
//!     let target = mapping::target(50, member, group.offset_type());
//!     println!("{} -> {:?}", member.id(), target);
//! }
//! ```

// Core modules
pub mod aggregate;
pub mod error;
pub mod group;
pub mod id;
pub mod mapping;
pub mod member;
pub mod state;

// ============================================================================
// Re-exports - Public API
// ============================================================================

pub use aggregate::aggregate;
pub use error::{ConfigError, Result};
pub use group::GroupConfig;
pub use id::LightId;
pub use mapping::MappingError;
pub use member::{LightMember, OffsetType};
pub use state::{Color, GroupState, LightState, LightTarget};

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::aggregate::aggregate;
    pub use crate::error::ConfigError;
    pub use crate::group::GroupConfig;
    pub use crate::id::LightId;
    pub use crate::mapping::{self, MappingError};
    pub use crate::member::{LightMember, OffsetType};
    pub use crate::state::{Color, GroupState, LightState, LightTarget};
}
