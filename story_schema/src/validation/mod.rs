//! The boundary where generated payloads become [`SimulationState`]s.
//!
//! Generated output is parsed into a permissive raw shape first, in which
//! every field is optional, and only then checked. Checking collects every
//! problem it finds instead of stopping at the first one, so a rejected
//! payload reports all offending fields at once. Nothing is ever repaired.

mod violation;

pub use violation::*;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::entities::Entity;
use crate::state::{SimulationState, MAX_ACTIONS, MIN_ACTIONS};

/// An entity as it arrives on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEntity {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub mood: Option<String>,
}

impl From<Entity> for RawEntity {
    fn from(entity: Entity) -> Self {
        Self {
            name: Some(entity.name),
            role: Some(entity.role),
            mood: Some(entity.mood),
        }
    }
}

/// A simulation state as it arrives on the wire, before any checks.
///
/// Unknown fields are ignored. A missing `entities` list is read as empty.
/// `narrative_segment`, entity names and each available action must contain
/// at least one non-whitespace character; whitespace-only text is rejected
/// as empty. Entity `role` and `mood` only need to be present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSimulationState {
    #[serde(default)]
    pub turn_id: Option<serde_json::Number>,
    #[serde(default)]
    pub narrative_segment: Option<String>,
    #[serde(default)]
    pub entities: Option<Vec<RawEntity>>,
    #[serde(default)]
    pub available_actions: Option<Vec<String>>,
}

/// Parse and validate a raw generation payload (JSON text).
///
/// This is the only way generated output enters the system. Malformed JSON
/// and shape errors are reported as a [`SchemaViolation`] on the `$` field.
pub fn parse_generation(raw: &str) -> Result<SimulationState, SchemaViolation> {
    let payload: RawSimulationState = serde_json::from_str(raw)
        .map_err(|e| SchemaViolation::single(ROOT_FIELD, Problem::Malformed(e.to_string())))?;
    SimulationState::try_from(payload)
}

/// Validate an already-parsed JSON value.
pub fn validate_value(value: serde_json::Value) -> Result<SimulationState, SchemaViolation> {
    let payload: RawSimulationState = serde_json::from_value(value)
        .map_err(|e| SchemaViolation::single(ROOT_FIELD, Problem::Malformed(e.to_string())))?;
    SimulationState::try_from(payload)
}

/// Field name used for whole-payload problems.
pub const ROOT_FIELD: &str = "$";

impl TryFrom<RawSimulationState> for SimulationState {
    type Error = SchemaViolation;

    fn try_from(raw: RawSimulationState) -> Result<Self, Self::Error> {
        let mut issues = Vec::new();

        let turn_id = match raw.turn_id {
            None => {
                issues.push(FieldIssue::new("turn_id", Problem::Missing));
                None
            }
            Some(n) => match n.as_u64() {
                Some(id) => Some(id),
                None => {
                    issues.push(FieldIssue::new("turn_id", Problem::NotANonNegativeInteger(n.to_string())));
                    None
                }
            },
        };

        match &raw.narrative_segment {
            None => issues.push(FieldIssue::new("narrative_segment", Problem::Missing)),
            Some(text) if text.trim().is_empty() => {
                issues.push(FieldIssue::new("narrative_segment", Problem::Empty))
            }
            Some(_) => {}
        }

        let raw_entities = raw.entities.unwrap_or_default();
        let mut entities = Vec::with_capacity(raw_entities.len());
        for (i, entity) in raw_entities.into_iter().enumerate() {
            let name = required_text(&mut issues, format!("entities[{i}].name"), entity.name, true);
            let role = required_text(&mut issues, format!("entities[{i}].role"), entity.role, false);
            let mood = required_text(&mut issues, format!("entities[{i}].mood"), entity.mood, false);
            if let (Some(name), Some(role), Some(mood)) = (name, role, mood) {
                entities.push(Entity { name, role, mood });
            }
        }

        match &raw.available_actions {
            None => issues.push(FieldIssue::new("available_actions", Problem::Missing)),
            Some(actions) => check_actions(&mut issues, actions),
        }

        if !issues.is_empty() {
            return Err(SchemaViolation::new(issues));
        }

        // All fields were checked above.
        match (turn_id, raw.narrative_segment, raw.available_actions) {
            (Some(turn_id), Some(narrative_segment), Some(available_actions)) => Ok(SimulationState {
                turn_id,
                narrative_segment,
                entities,
                available_actions,
            }),
            _ => Err(SchemaViolation::single(ROOT_FIELD, Problem::Missing)),
        }
    }
}

fn required_text(
    issues: &mut Vec<FieldIssue>,
    field: String,
    value: Option<String>,
    non_empty: bool,
) -> Option<String> {
    match value {
        None => {
            issues.push(FieldIssue::new(field, Problem::Missing));
            None
        }
        Some(text) if non_empty && text.trim().is_empty() => {
            issues.push(FieldIssue::new(field, Problem::Empty));
            None
        }
        Some(text) => Some(text),
    }
}

fn check_actions(issues: &mut Vec<FieldIssue>, actions: &[String]) {
    if actions.len() < MIN_ACTIONS {
        issues.push(FieldIssue::new(
            "available_actions",
            Problem::TooFewActions { count: actions.len() },
        ));
    } else if actions.len() > MAX_ACTIONS {
        issues.push(FieldIssue::new(
            "available_actions",
            Problem::TooManyActions { count: actions.len() },
        ));
    }

    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (i, action) in actions.iter().enumerate() {
        let field = format!("available_actions[{i}]");
        if action.trim().is_empty() {
            issues.push(FieldIssue::new(field, Problem::Empty));
            continue;
        }
        if let Some(first) = seen.get(action.as_str()) {
            issues.push(FieldIssue::new(field, Problem::DuplicateAction { first_index: *first }));
        } else {
            seen.insert(action.as_str(), i);
        }
    }
}
