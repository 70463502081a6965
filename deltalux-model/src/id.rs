//! Identity type for member lights

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a controllable light
///
/// Owned by the host platform's entity registry; this crate never
/// creates or destroys the underlying entity, it only refers to it.
/// Typically a dotted entity id such as `light.kitchen_accent`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LightId(String);

impl LightId {
    /// Creates a new LightId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LightId {
    fn from(s: &str) -> Self {
        LightId::new(s)
    }
}

impl From<String> for LightId {
    fn from(s: String) -> Self {
        LightId::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_id_basic() {
        let id = LightId::new("light.kitchen");
        assert_eq!(id.as_str(), "light.kitchen");
    }

    #[test]
    fn test_light_id_equality() {
        let id1 = LightId::new("light.kitchen");
        let id2 = LightId::from("light.kitchen");
        assert_eq!(id1, id2);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", LightId::new("light.hall")), "light.hall");
    }
}
