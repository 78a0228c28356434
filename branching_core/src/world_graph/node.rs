//! Node and edge definitions - the states and choices of the graph.

use serde::{Deserialize, Serialize};
use story_schema::SimulationState;

/// Unique identifier for graph nodes.
///
/// Opaque to callers. Ids are handed out by an [`super::IdSource`] and never
/// reused within a graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored turn. Immutable once inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    id: NodeId,
    state: SimulationState,
}

impl GraphNode {
    pub(crate) fn new(id: NodeId, state: SimulationState) -> Self {
        Self { id, state }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }
}

/// The choice that led from one node to another.
///
/// The root has no incoming edge, so every edge carries a real action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub parent_id: NodeId,
    pub child_id: NodeId,
    /// Exact text of the parent's available action that was selected.
    pub action: String,
}
