//! Group configuration

use crate::error::{ConfigError, Result};
use crate::id::LightId;
use crate::member::{LightMember, OffsetType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Validated, immutable configuration for one light group
///
/// Member order is significant: per-light commands are issued in this
/// order, and aggregation picks its reference member by it.
///
/// # Example
///
/// ```rust
/// use deltalux_model::{GroupConfig, LightId, LightMember, OffsetType};
///
/// let group = GroupConfig::new(
///     "Living Room",
///     OffsetType::Absolute,
///     vec![
///         LightMember::new(LightId::new("light.main"), 0, 1, 100).unwrap(),
///         LightMember::new(LightId::new("light.accent"), -20, 5, 100).unwrap(),
///     ],
/// )
/// .unwrap();
/// assert_eq!(group.member_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Display name
    name: String,
    /// Group default, used when a member does not override it
    offset_type: OffsetType,
    /// Member lights, in command-issue order
    members: Vec<LightMember>,
}

impl GroupConfig {
    /// Create a validated group
    ///
    /// Requires a non-empty name, at least two members and no
    /// duplicate light ids.
    pub fn new(
        name: impl Into<String>,
        offset_type: OffsetType,
        members: Vec<LightMember>,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if members.len() < 2 {
            return Err(ConfigError::TooFewMembers(members.len()));
        }
        let mut seen = HashSet::new();
        for member in &members {
            if !seen.insert(member.id()) {
                return Err(ConfigError::DuplicateMember(member.id().clone()));
            }
        }
        Ok(Self {
            name,
            offset_type,
            members,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn offset_type(&self) -> OffsetType {
        self.offset_type
    }

    /// All members, in command-issue order
    pub fn members(&self) -> &[LightMember] {
        &self.members
    }

    /// Look up a member by light id
    pub fn member(&self, id: &LightId) -> Option<&LightMember> {
        self.members.iter().find(|m| m.id() == id)
    }

    /// Check if a light is a member of this group
    pub fn contains_member(&self, id: &LightId) -> bool {
        self.members.iter().any(|m| m.id() == id)
    }

    /// Number of members in this group
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_group() -> GroupConfig {
        GroupConfig::new(
            "Living Room",
            OffsetType::Absolute,
            vec![
                LightMember::new(LightId::new("light.main"), 0, 1, 100).unwrap(),
                LightMember::new(LightId::new("light.accent"), -20, 5, 100).unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_group_creation() {
        let group = create_test_group();
        assert_eq!(group.name(), "Living Room");
        assert_eq!(group.member_count(), 2);
        assert_eq!(group.offset_type(), OffsetType::Absolute);
    }

    #[test]
    fn test_too_few_members() {
        let err = GroupConfig::new(
            "Solo",
            OffsetType::Absolute,
            vec![LightMember::new(LightId::new("light.only"), 0, 1, 100).unwrap()],
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::TooFewMembers(1));
    }

    #[test]
    fn test_duplicate_member() {
        let err = GroupConfig::new(
            "Dup",
            OffsetType::Absolute,
            vec![
                LightMember::new(LightId::new("light.a"), 0, 1, 100).unwrap(),
                LightMember::new(LightId::new("light.a"), -10, 1, 100).unwrap(),
            ],
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateMember(LightId::new("light.a")));
    }

    #[test]
    fn test_empty_name() {
        let err = GroupConfig::new(
            "  ",
            OffsetType::Absolute,
            vec![
                LightMember::new(LightId::new("light.a"), 0, 1, 100).unwrap(),
                LightMember::new(LightId::new("light.b"), 0, 1, 100).unwrap(),
            ],
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::EmptyName);
    }

    #[test]
    fn test_contains_member() {
        let group = create_test_group();
        assert!(group.contains_member(&LightId::new("light.main")));
        assert!(group.contains_member(&LightId::new("light.accent")));
        assert!(!group.contains_member(&LightId::new("light.other")));
    }

    #[test]
    fn test_member_lookup() {
        let group = create_test_group();
        let accent = group.member(&LightId::new("light.accent")).unwrap();
        assert_eq!(accent.offset(), -20);
        assert!(group.member(&LightId::new("light.other")).is_none());
    }
}
