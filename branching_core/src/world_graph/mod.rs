//! World Graph module - every generated state, linked by the choice that produced it.
//!
//! The graph consists of:
//! - **Nodes**: Immutable turns, each wrapping one validated `SimulationState`
//! - **Edges**: The selected action leading from a parent turn to a child turn
//! - **Root**: The single opening turn, which has no incoming edge
//!
//! Inserts only ever add; a node reached by two different choices is two nodes.

mod graph;
mod id_source;
mod node;
mod shared;
mod snapshot;

pub use graph::*;
pub use id_source::*;
pub use node::*;
pub use shared::*;
pub use snapshot::*;

use serde::{Deserialize, Serialize};

/// How `turn_id` is treated when a child is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnOrderPolicy {
    /// Store turn ids exactly as generated.
    Advisory,
    /// A child's turn id must be greater than its parent's.
    #[default]
    Increasing,
}

/// Configuration for the graph store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub turn_order: TurnOrderPolicy,

    /// Prefix for ids produced by the default [`SequentialIds`] source.
    pub id_prefix: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            turn_order: TurnOrderPolicy::Increasing,
            id_prefix: "node".to_string(),
        }
    }
}
