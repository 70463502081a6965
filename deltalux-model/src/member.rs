//! Member light configuration

use crate::error::{ConfigError, Result};
use crate::id::LightId;
use serde::{Deserialize, Serialize};

/// How a member's offset is applied to the group level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetType {
    /// Offset is additive percentage points (e.g. -25 means 25 points below the group level)
    #[default]
    Absolute,
    /// Offset is a multiplicative scale factor (e.g. -25 means 75% of the group level)
    Relative,
}

/// Validated configuration for one light in a group
///
/// Immutable during a recompute pass; hot reload replaces the whole
/// containing [`GroupConfig`](crate::GroupConfig).
///
/// # Example
///
/// ```rust
/// use deltalux_model::{LightId, LightMember, OffsetType};
///
/// let accent = LightMember::new(LightId::new("light.accent"), -20, 5, 100)
///     .unwrap()
///     .with_offset_type(OffsetType::Relative);
/// assert_eq!(accent.offset(), -20);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightMember {
    /// Entity being controlled
    id: LightId,
    /// Signed adjustment in [-100, 100]
    offset: i16,
    /// Per-member override of the group's offset type
    offset_type: Option<OffsetType>,
    /// Lower clamp bound, applied after offset mapping
    min_brightness: u8,
    /// Upper clamp bound, applied after offset mapping
    max_brightness: u8,
}

impl LightMember {
    /// Create a validated member
    ///
    /// Rejects offsets outside [-100, 100] and bounds where
    /// `min > max` or either exceeds 100.
    pub fn new(id: LightId, offset: i16, min_brightness: u8, max_brightness: u8) -> Result<Self> {
        if !(-100..=100).contains(&offset) {
            return Err(ConfigError::OffsetOutOfRange { id, offset });
        }
        if min_brightness > max_brightness || max_brightness > 100 {
            return Err(ConfigError::InvalidBrightnessBounds {
                id,
                min: min_brightness,
                max: max_brightness,
            });
        }
        Ok(Self {
            id,
            offset,
            offset_type: None,
            min_brightness,
            max_brightness,
        })
    }

    /// Override the group's offset type for this member
    pub fn with_offset_type(mut self, offset_type: OffsetType) -> Self {
        self.offset_type = Some(offset_type);
        self
    }

    pub fn id(&self) -> &LightId {
        &self.id
    }

    pub fn offset(&self) -> i16 {
        self.offset
    }

    pub fn min_brightness(&self) -> u8 {
        self.min_brightness
    }

    pub fn max_brightness(&self) -> u8 {
        self.max_brightness
    }

    /// The per-member override, if any
    pub fn offset_type_override(&self) -> Option<OffsetType> {
        self.offset_type
    }

    /// The offset type this member actually uses, given the group default
    pub fn effective_offset_type(&self, group_default: OffsetType) -> OffsetType {
        self.offset_type.unwrap_or(group_default)
    }
}
