//! Offset mapping between group level and per-light brightness
//!
//! The forward mapping derives one light's target from a group level;
//! the inverse mapping estimates the group level implied by a light's
//! actual brightness. Both assume validated [`LightMember`] input and
//! fail fast on anything else rather than silently correcting it.

use crate::id::LightId;
use crate::member::{LightMember, OffsetType};
use crate::state::LightTarget;
use thiserror::Error;

/// Errors from the inverse mapping
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    /// A relative offset of -100 scales everything to zero and cannot be inverted
    #[error("relative offset -100 on {id} has no inverse")]
    UndefinedInverse { id: LightId },
}

/// Compute a member's target for a group-level brightness
///
/// `level` is 0-100; 0 is the off sentinel and turns every member off
/// regardless of offset. Clamping to the member's min/max bounds is
/// the last step and only applies when the raw result is positive; a
/// raw result of zero or below turns the light off instead of being
/// clamped up to `min_brightness`.
///
/// Monotonic in `level` pre-clamp for both offset modes.
///
/// # Example
///
/// ```rust
/// use deltalux_model::{mapping, LightId, LightMember, LightTarget, OffsetType};
///
/// let accent = LightMember::new(LightId::new("light.accent"), -20, 5, 100).unwrap();
/// assert_eq!(
///     mapping::target(50, &accent, OffsetType::Absolute),
///     LightTarget::On { brightness: 30 }
/// );
/// ```
pub fn target(level: u8, member: &LightMember, group_default: OffsetType) -> LightTarget {
    debug_assert!(level <= 100, "group level {level} out of range");
    if level == 0 {
        return LightTarget::Off;
    }

    let raw = match member.effective_offset_type(group_default) {
        OffsetType::Absolute => i32::from(level) + i32::from(member.offset()),
        OffsetType::Relative => {
            let multiplier = f64::from(100 + i32::from(member.offset())) / 100.0;
            (f64::from(level) * multiplier).round() as i32
        }
    };

    if raw <= 0 {
        return LightTarget::Off;
    }

    let clamped = raw.clamp(
        i32::from(member.min_brightness()),
        i32::from(member.max_brightness()),
    );
    if clamped == 0 {
        // max_brightness of 0 pins the light off
        return LightTarget::Off;
    }
    LightTarget::On {
        brightness: clamped as u8,
    }
}

/// Estimate the group level implied by a member's actual brightness
///
/// Used when a member changed outside the group's own commands, to let
/// the group catch up to a plausible level. This is an estimate: it
/// round-trips with [`target`] only when the forward mapping did not
/// clamp, since clamping loses information.
///
/// A relative offset of -100 has a zero multiplier and no inverse; the
/// caller is expected to fall back to the last commanded level.
pub fn infer_level(
    actual: u8,
    member: &LightMember,
    group_default: OffsetType,
) -> Result<u8, MappingError> {
    debug_assert!(actual <= 100, "actual brightness {actual} out of range");

    match member.effective_offset_type(group_default) {
        OffsetType::Absolute => {
            let level = i32::from(actual) - i32::from(member.offset());
            Ok(level.clamp(0, 100) as u8)
        }
        OffsetType::Relative => {
            if member.offset() == -100 {
                return Err(MappingError::UndefinedInverse {
                    id: member.id().clone(),
                });
            }
            let multiplier = f64::from(100 + i32::from(member.offset())) / 100.0;
            let level = (f64::from(actual) / multiplier).round() as i32;
            Ok(level.clamp(0, 100) as u8)
        }
    }
}
