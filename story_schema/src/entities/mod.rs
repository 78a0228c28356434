//! Entity definitions for narrative states.

use serde::{Deserialize, Serialize};

/// A character or actor appearing in a state.
///
/// Entities have no identity beyond their name and are owned by the state
/// that lists them. Names are checked when the owning state is validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    /// Free-text descriptor, e.g. "judge".
    pub role: String,
    /// Free-text descriptor, e.g. "curious".
    pub mood: String,
}

impl Entity {
    /// Create a new entity.
    pub fn new(name: impl Into<String>, role: impl Into<String>, mood: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            mood: mood.into(),
        }
    }

    /// One-line description used when displaying a turn, e.g. "Lead Judge is curious".
    pub fn describe(&self) -> String {
        format!("{} is {}", self.name, self.mood)
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.role)
    }
}
