//! Snapshots - a serializable record of a whole graph.
//!
//! A snapshot lists every node in insertion order together with its parent
//! and the action on its incoming edge. Restoring replays those inserts
//! through the same checks as live inserts, so a damaged snapshot is
//! rejected instead of producing a malformed graph.

use serde::{Deserialize, Serialize};
use story_schema::SimulationState;
use thiserror::Error;
use tracing::debug;

use super::{GraphConfig, IdSource, NodeId, SequentialIds, WorldGraph};
use crate::error::GraphError;

/// One node of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub node_id: NodeId,
    pub state: SimulationState,
    /// `None` only for the root.
    pub parent_id: Option<NodeId>,
    /// `None` only for the root.
    pub action: Option<String>,
}

/// Root id plus every node in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub root_id: Option<NodeId>,
    pub nodes: Vec<SnapshotRecord>,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Also covers stored states that fail schema validation.
    #[error("Invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Snapshot node {node_id} has a parent but no action")]
    MissingAction { node_id: NodeId },

    #[error("Snapshot root node {node_id} carries an action")]
    RootWithAction { node_id: NodeId },

    #[error("Snapshot declares root {declared:?} but restored root is {restored:?}")]
    RootMismatch {
        declared: Option<NodeId>,
        restored: Option<NodeId>,
    },
}

impl GraphSnapshot {
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl WorldGraph {
    /// Capture the whole graph.
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            root_id: self.root_id().cloned(),
            nodes: self
                .nodes()
                .map(|node| {
                    let edge = self.incoming_edge(node.id());
                    SnapshotRecord {
                        node_id: node.id().clone(),
                        state: node.state().clone(),
                        parent_id: edge.map(|e| e.parent_id.clone()),
                        action: edge.map(|e| e.action.clone()),
                    }
                })
                .collect(),
        }
    }

    /// Rebuild a graph from a snapshot with sequential ids.
    ///
    /// The id source is told about every restored id, so new inserts never
    /// collide with them.
    pub fn restore(snapshot: GraphSnapshot, config: GraphConfig) -> Result<Self, SnapshotError> {
        let ids = SequentialIds::new(config.id_prefix.clone());
        Self::restore_with_id_source(snapshot, config, ids)
    }

    /// Rebuild a graph from a snapshot with an injected id source.
    pub fn restore_with_id_source(
        snapshot: GraphSnapshot,
        config: GraphConfig,
        ids: impl IdSource + 'static,
    ) -> Result<Self, SnapshotError> {
        let mut graph = Self::with_id_source(config, ids);

        for record in snapshot.nodes {
            match (record.parent_id, record.action) {
                (None, None) => graph.insert_root_with_id(record.node_id, record.state)?,
                (None, Some(_)) => {
                    return Err(SnapshotError::RootWithAction {
                        node_id: record.node_id,
                    })
                }
                (Some(_), None) => {
                    return Err(SnapshotError::MissingAction {
                        node_id: record.node_id,
                    })
                }
                (Some(parent), Some(action)) => {
                    graph.insert_child_with_id(record.node_id, &parent, record.state, &action)?
                }
            }
        }

        if graph.root_id() != snapshot.root_id.as_ref() {
            return Err(SnapshotError::RootMismatch {
                declared: snapshot.root_id,
                restored: graph.root_id().cloned(),
            });
        }

        debug!(nodes = graph.node_count(), "restored graph from snapshot");
        Ok(graph)
    }

    /// Rebuild a graph from snapshot JSON.
    pub fn restore_from_json(json: &str, config: GraphConfig) -> Result<Self, SnapshotError> {
        Self::restore(GraphSnapshot::from_json(json)?, config)
    }
}
