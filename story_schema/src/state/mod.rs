//! Simulation state - one turn's narrative snapshot.

use serde::{Deserialize, Serialize};

use crate::entities::Entity;
use crate::validation::{RawSimulationState, SchemaViolation};

/// Fewest choices a turn may offer.
pub const MIN_ACTIONS: usize = 2;

/// Most choices a turn may offer.
pub const MAX_ACTIONS: usize = 3;

/// A single turn of the narrative.
///
/// A `SimulationState` can only be obtained through validation (either
/// [`SimulationState::new`], [`crate::parse_generation`] or deserialization,
/// which is routed through the same checks), so holding one means:
///
/// - `narrative_segment` is non-empty
/// - every entity has a non-empty name
/// - `available_actions` holds 2 or 3 distinct, non-empty strings
///
/// States are immutable once built; there are no setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSimulationState")]
pub struct SimulationState {
    pub(crate) turn_id: u64,
    pub(crate) narrative_segment: String,
    pub(crate) entities: Vec<Entity>,
    pub(crate) available_actions: Vec<String>,
}

impl SimulationState {
    /// Build a state from its parts, validating every field.
    pub fn new(
        turn_id: u64,
        narrative_segment: impl Into<String>,
        entities: Vec<Entity>,
        available_actions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self, SchemaViolation> {
        RawSimulationState {
            turn_id: Some(turn_id.into()),
            narrative_segment: Some(narrative_segment.into()),
            entities: Some(entities.into_iter().map(Into::into).collect()),
            available_actions: Some(available_actions.into_iter().map(Into::into).collect()),
        }
        .try_into()
    }

    pub fn turn_id(&self) -> u64 {
        self.turn_id
    }

    pub fn narrative_segment(&self) -> &str {
        &self.narrative_segment
    }

    /// Entities in presentation order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Choices offered to the player, in presentation order.
    pub fn available_actions(&self) -> &[String] {
        &self.available_actions
    }

    /// Check whether `action` is exactly one of the offered choices.
    pub fn has_action(&self, action: &str) -> bool {
        self.available_actions.iter().any(|a| a == action)
    }

    /// Look up a choice by its zero-based position.
    pub fn action_at(&self, index: usize) -> Option<&str> {
        self.available_actions.get(index).map(String::as_str)
    }

    /// Find an entity by exact name.
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }
}
