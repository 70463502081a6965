//! Config entry parsing and boundary validation
//!
//! The host supplies configuration as a serialized entry (one group,
//! its member lights and their offsets). Raw entries deserialize into
//! [`GroupConfigFile`] with per-field defaults, then validate into the
//! immutable [`GroupConfig`] the engine works with. Validation happens
//! here, at the boundary, never inside the mapping code.

use deltalux_model::{GroupConfig, LightId, LightMember, OffsetType};
use serde::{Deserialize, Serialize};

use crate::error::GroupError;

/// Default offset when an entry omits it
pub const DEFAULT_OFFSET: i16 = 0;
/// Default lower clamp bound
pub const DEFAULT_MIN_BRIGHTNESS: u8 = 1;
/// Default upper clamp bound
pub const DEFAULT_MAX_BRIGHTNESS: u8 = 100;

/// Raw, not-yet-validated group config entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupConfigFile {
    pub name: String,
    #[serde(default)]
    pub offset_type: OffsetType,
    pub lights: Vec<LightEntry>,
}

/// Raw per-light entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightEntry {
    pub entity_id: String,
    #[serde(default = "default_offset")]
    pub offset: i16,
    /// Optional per-light override of the group's offset type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_type: Option<OffsetType>,
    #[serde(default = "default_min_brightness")]
    pub min_brightness: u8,
    #[serde(default = "default_max_brightness")]
    pub max_brightness: u8,
}

fn default_offset() -> i16 {
    DEFAULT_OFFSET
}

fn default_min_brightness() -> u8 {
    DEFAULT_MIN_BRIGHTNESS
}

fn default_max_brightness() -> u8 {
    DEFAULT_MAX_BRIGHTNESS
}

impl TryFrom<GroupConfigFile> for GroupConfig {
    type Error = GroupError;

    fn try_from(file: GroupConfigFile) -> Result<Self, Self::Error> {
        let mut members = Vec::with_capacity(file.lights.len());
        for entry in file.lights {
            let mut member = LightMember::new(
                LightId::new(entry.entity_id),
                entry.offset,
                entry.min_brightness,
                entry.max_brightness,
            )?;
            if let Some(offset_type) = entry.offset_type {
                member = member.with_offset_type(offset_type);
            }
            members.push(member);
        }
        Ok(GroupConfig::new(file.name, file.offset_type, members)?)
    }
}

impl From<&GroupConfig> for GroupConfigFile {
    fn from(config: &GroupConfig) -> Self {
        Self {
            name: config.name().to_string(),
            offset_type: config.offset_type(),
            lights: config
                .members()
                .iter()
                .map(|m| LightEntry {
                    entity_id: m.id().as_str().to_string(),
                    offset: m.offset(),
                    offset_type: m.offset_type_override(),
                    min_brightness: m.min_brightness(),
                    max_brightness: m.max_brightness(),
                })
                .collect(),
        }
    }
}

/// Parse and validate a JSON config entry
///
/// # Example
///
/// ```rust
/// let config = deltalux::config::from_json_str(
///     r#"{
///         "name": "Living Room",
///         "offset_type": "absolute",
///         "lights": [
///             {"entity_id": "light.main"},
///             {"entity_id": "light.accent", "offset": -20, "min_brightness": 5}
///         ]
///     }"#,
/// )
/// .unwrap();
/// assert_eq!(config.member_count(), 2);
/// ```
pub fn from_json_str(json: &str) -> Result<GroupConfig, GroupError> {
    let file: GroupConfigFile = serde_json::from_str(json)?;
    GroupConfig::try_from(file)
}

/// Serialize a validated config back to a JSON entry
pub fn to_json_string(config: &GroupConfig) -> Result<String, GroupError> {
    Ok(serde_json::to_string_pretty(&GroupConfigFile::from(
        config,
    ))?)
}
