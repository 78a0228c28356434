//! Graph store errors.
//!
//! Every variant signals misuse of the store's contract by the caller, or a
//! store bug. None of them leave the graph partially modified.

use thiserror::Error;

use crate::world_graph::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("Graph already has a root: {root}")]
    RootAlreadyExists { root: NodeId },

    #[error("Unknown node: {id}")]
    UnknownNode { id: NodeId },

    #[error("Action '{action}' is not offered by node {parent}")]
    InvalidAction { parent: NodeId, action: String },

    #[error("Node {id} is not reachable from the root")]
    UnreachableNode { id: NodeId },

    #[error("Graph has no root yet")]
    NoRoot,

    #[error("Turn {child_turn} does not follow turn {parent_turn} of node {parent}")]
    TurnOrderViolation {
        parent: NodeId,
        parent_turn: u64,
        child_turn: u64,
    },

    #[error("Node id {id} is already in use")]
    DuplicateNodeId { id: NodeId },

    #[error("Id source cannot produce another unused id")]
    IdsExhausted,

    #[error("Node {node} is at the last representable turn id")]
    TurnLimitReached { node: NodeId },

    #[error("Graph lock poisoned: {context}")]
    LockPoisoned { context: &'static str },
}
