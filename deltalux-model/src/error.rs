//! Error types for deltalux-model

use crate::id::LightId;
use thiserror::Error;

/// Result type for configuration validation
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised when validating group configuration
///
/// Validation happens at the configuration boundary; the mapping and
/// aggregation code assumes validated input and never sees these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Offset outside the supported range
    #[error("offset {offset} for {id} is outside [-100, 100]")]
    OffsetOutOfRange { id: LightId, offset: i16 },

    /// min/max brightness bounds are inconsistent or out of range
    #[error("brightness bounds {min}..{max} for {id} are invalid")]
    InvalidBrightnessBounds { id: LightId, min: u8, max: u8 },

    /// A group needs at least two member lights
    #[error("a group needs at least 2 member lights, got {0}")]
    TooFewMembers(usize),

    /// The same light appears twice in one group
    #[error("duplicate member light: {0}")]
    DuplicateMember(LightId),

    /// Group name must be non-empty
    #[error("group name must not be empty")]
    EmptyName,
}
