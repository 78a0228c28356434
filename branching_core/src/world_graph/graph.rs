//! World Graph - the core data structure for branching narrative state.

use std::collections::HashMap;

use story_schema::SimulationState;
use tracing::{debug, warn};

use super::{GraphConfig, GraphEdge, GraphNode, IdSource, NodeId, SequentialIds, TurnOrderPolicy};
use crate::error::GraphError;
use crate::history::{HistoryReconstructor, Transcript};

/// The main branching graph structure.
///
/// Stores every generated turn and the choice that produced it. The graph is
/// always a tree: one root, and every other node has exactly one parent.
/// Inserts are all-or-nothing; every check runs before anything is stored.
///
/// The graph has no notion of a "current" node. That pointer belongs to
/// whoever drives the story (see [`crate::StorySession`]).
#[derive(Debug)]
pub struct WorldGraph {
    /// All nodes stored by ID.
    nodes: HashMap<NodeId, GraphNode>,

    /// Node IDs in the order they were inserted.
    insertion_order: Vec<NodeId>,

    /// Index: child -> its single incoming edge.
    incoming: HashMap<NodeId, GraphEdge>,

    /// Index: parent -> children, in insertion order.
    children: HashMap<NodeId, Vec<NodeId>>,

    root_id: Option<NodeId>,

    ids: Box<dyn IdSource>,

    config: GraphConfig,
}

impl Default for WorldGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldGraph {
    /// Create a new empty graph with default configuration and sequential ids.
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    /// Create a graph using sequential ids prefixed with `config.id_prefix`.
    pub fn with_config(config: GraphConfig) -> Self {
        let ids = SequentialIds::new(config.id_prefix.clone());
        Self::with_id_source(config, ids)
    }

    /// Create a graph with an injected id source.
    pub fn with_id_source(config: GraphConfig, ids: impl IdSource + 'static) -> Self {
        Self {
            nodes: HashMap::new(),
            insertion_order: Vec::new(),
            incoming: HashMap::new(),
            children: HashMap::new(),
            root_id: None,
            ids: Box::new(ids),
            config,
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Insert the opening turn.
    ///
    /// Fails with `RootAlreadyExists` if the graph has already been seeded.
    pub fn add_root(&mut self, state: SimulationState) -> Result<NodeId, GraphError> {
        self.check_root_free()?;
        let id = self.fresh_id()?;
        self.check_id_free(&id)?;
        self.commit(id.clone(), state, None);
        Ok(id)
    }

    /// Insert `state` as a child of `parent_id`, reached by choosing `action`.
    ///
    /// `action` must be exactly one of the parent's available actions. This
    /// guards against drift between the choice shown and the choice recorded.
    /// This is a hardening check beyond what keeping the tree shape needs;
    /// without it any choice string would be recorded as the edge label.
    pub fn add_child(
        &mut self,
        parent_id: &NodeId,
        state: SimulationState,
        action: &str,
    ) -> Result<NodeId, GraphError> {
        self.check_child(parent_id, &state, action)?;
        let id = self.fresh_id()?;
        self.check_id_free(&id)?;
        self.commit(id.clone(), state, Some((parent_id.clone(), action.to_string())));
        Ok(id)
    }

    /// Insert a root under a known id (used when restoring a snapshot).
    pub(crate) fn insert_root_with_id(
        &mut self,
        id: NodeId,
        state: SimulationState,
    ) -> Result<(), GraphError> {
        self.check_root_free()?;
        self.check_id_free(&id)?;
        self.ids.observe(&id);
        self.commit(id, state, None);
        Ok(())
    }

    /// Insert a child under a known id (used when restoring a snapshot).
    pub(crate) fn insert_child_with_id(
        &mut self,
        id: NodeId,
        parent_id: &NodeId,
        state: SimulationState,
        action: &str,
    ) -> Result<(), GraphError> {
        self.check_child(parent_id, &state, action)?;
        self.check_id_free(&id)?;
        self.ids.observe(&id);
        self.commit(id, state, Some((parent_id.clone(), action.to_string())));
        Ok(())
    }

    fn fresh_id(&mut self) -> Result<NodeId, GraphError> {
        self.ids.next_id().ok_or_else(|| {
            warn!("id source exhausted");
            GraphError::IdsExhausted
        })
    }

    fn check_root_free(&self) -> Result<(), GraphError> {
        match &self.root_id {
            Some(root) => {
                warn!(root = %root, "rejected second root");
                Err(GraphError::RootAlreadyExists { root: root.clone() })
            }
            None => Ok(()),
        }
    }

    fn check_id_free(&self, id: &NodeId) -> Result<(), GraphError> {
        if self.nodes.contains_key(id) {
            warn!(node_id = %id, "id source produced an id already in use");
            return Err(GraphError::DuplicateNodeId { id: id.clone() });
        }
        Ok(())
    }

    fn check_child(
        &self,
        parent_id: &NodeId,
        state: &SimulationState,
        action: &str,
    ) -> Result<(), GraphError> {
        let parent = self.node(parent_id)?.state();

        if !parent.has_action(action) {
            warn!(parent = %parent_id, action, "rejected child: action not offered by parent");
            return Err(GraphError::InvalidAction {
                parent: parent_id.clone(),
                action: action.to_string(),
            });
        }

        if self.config.turn_order == TurnOrderPolicy::Increasing
            && state.turn_id() <= parent.turn_id()
        {
            warn!(
                parent = %parent_id,
                parent_turn = parent.turn_id(),
                child_turn = state.turn_id(),
                "rejected child: turn id does not increase"
            );
            return Err(GraphError::TurnOrderViolation {
                parent: parent_id.clone(),
                parent_turn: parent.turn_id(),
                child_turn: state.turn_id(),
            });
        }

        Ok(())
    }

    /// Store a node and its incoming edge. All checks have already passed.
    fn commit(&mut self, id: NodeId, state: SimulationState, parent: Option<(NodeId, String)>) {
        debug!(
            node_id = %id,
            parent_id = ?parent.as_ref().map(|(p, _)| p.as_str()),
            action = ?parent.as_ref().map(|(_, a)| a.as_str()),
            turn_id = state.turn_id(),
            "inserted node"
        );

        match parent {
            Some((parent_id, action)) => {
                self.children
                    .entry(parent_id.clone())
                    .or_default()
                    .push(id.clone());
                self.incoming.insert(
                    id.clone(),
                    GraphEdge {
                        parent_id,
                        child_id: id.clone(),
                        action,
                    },
                );
            }
            None => self.root_id = Some(id.clone()),
        }

        self.insertion_order.push(id.clone());
        self.nodes.insert(id.clone(), GraphNode::new(id, state));
    }

    /// Get a node by ID.
    pub fn node(&self, node_id: &NodeId) -> Result<&GraphNode, GraphError> {
        self.nodes
            .get(node_id)
            .ok_or_else(|| GraphError::UnknownNode { id: node_id.clone() })
    }

    /// Get the state stored at a node.
    pub fn get_state(&self, node_id: &NodeId) -> Result<&SimulationState, GraphError> {
        self.node(node_id).map(GraphNode::state)
    }

    /// Outgoing choices of a node as `(child, action)`, in insertion order.
    ///
    /// Empty for a leaf.
    pub fn children_of(&self, node_id: &NodeId) -> Result<Vec<(NodeId, String)>, GraphError> {
        Ok(self
            .outgoing_edges(node_id)?
            .into_iter()
            .map(|edge| (edge.child_id.clone(), edge.action.clone()))
            .collect())
    }

    /// Outgoing edges of a node, in insertion order.
    pub fn outgoing_edges(&self, node_id: &NodeId) -> Result<Vec<&GraphEdge>, GraphError> {
        self.node(node_id)?;
        Ok(self
            .children
            .get(node_id)
            .map(|kids| kids.iter().filter_map(|c| self.incoming.get(c)).collect())
            .unwrap_or_default())
    }

    /// The edge leading into a node. `None` for the root.
    pub fn incoming_edge(&self, node_id: &NodeId) -> Option<&GraphEdge> {
        self.incoming.get(node_id)
    }

    /// The action that produced a node. `None` for the root.
    pub fn incoming_action(&self, node_id: &NodeId) -> Option<&str> {
        self.incoming.get(node_id).map(|e| e.action.as_str())
    }

    pub fn parent_of(&self, node_id: &NodeId) -> Option<&NodeId> {
        self.incoming.get(node_id).map(|e| &e.parent_id)
    }

    pub fn root_id(&self) -> Option<&NodeId> {
        self.root_id.as_ref()
    }

    pub fn contains(&self, node_id: &NodeId) -> bool {
        self.nodes.contains_key(node_id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.incoming.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node IDs in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.insertion_order.iter()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.insertion_order
            .iter()
            .filter_map(|id| self.nodes.get(id))
    }

    /// Edges in the insertion order of their child nodes.
    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.insertion_order
            .iter()
            .filter_map(|id| self.incoming.get(id))
    }

    /// Leaf nodes, where no choice has been taken yet, in insertion order.
    pub fn frontier(&self) -> Vec<&NodeId> {
        self.insertion_order
            .iter()
            .filter(|id| self.children.get(*id).map_or(true, Vec::is_empty))
            .collect()
    }

    /// The unique path from the root to `node_id`, root first.
    ///
    /// Walks parent links upwards and reverses. Fails with `NoRoot` on an
    /// unseeded graph, `UnknownNode` for an absent id and `UnreachableNode` if
    /// the walk does not end at the root.
    pub fn path_to(&self, node_id: &NodeId) -> Result<Vec<NodeId>, GraphError> {
        let root = self.root_id.as_ref().ok_or(GraphError::NoRoot)?;
        self.node(node_id)?;

        let mut path = vec![node_id.clone()];
        let mut current = node_id;
        while let Some(edge) = self.incoming.get(current) {
            // A walk longer than the node count means a cycle.
            if path.len() > self.nodes.len() {
                return Err(GraphError::UnreachableNode { id: node_id.clone() });
            }
            path.push(edge.parent_id.clone());
            current = &edge.parent_id;
        }

        if current != root {
            return Err(GraphError::UnreachableNode { id: node_id.clone() });
        }

        path.reverse();
        Ok(path)
    }

    /// Number of choices between the root and `node_id`.
    pub fn depth(&self, node_id: &NodeId) -> Result<usize, GraphError> {
        Ok(self.path_to(node_id)?.len() - 1)
    }

    /// Reconstruct the branch history of `node_id` with the default transcript settings.
    pub fn history(&self, node_id: &NodeId) -> Result<Transcript, GraphError> {
        HistoryReconstructor::with_defaults().reconstruct(self, node_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(turn_id: u64, text: &str, actions: &[&str]) -> SimulationState {
        SimulationState::new(turn_id, text, vec![], actions.iter().copied()).unwrap()
    }

    fn seeded() -> (WorldGraph, NodeId) {
        let mut graph = WorldGraph::new();
        let root = graph
            .add_root(state(0, "The pitch begins.", &["A", "B"]))
            .unwrap();
        (graph, root)
    }

    #[derive(Debug)]
    struct FixedIds;

    impl IdSource for FixedIds {
        fn next_id(&mut self) -> Option<NodeId> {
            Some(NodeId::new("same"))
        }
    }

    #[test]
    fn test_add_root_and_get_state() {
        let (graph, root) = seeded();
        assert_eq!(root, NodeId::new("node-0"));
        assert_eq!(graph.root_id(), Some(&root));
        assert_eq!(graph.get_state(&root).unwrap().narrative_segment(), "The pitch begins.");
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_second_root_rejected() {
        let (mut graph, root) = seeded();
        let err = graph.add_root(state(0, "Another start.", &["A", "B"])).unwrap_err();
        assert_eq!(err, GraphError::RootAlreadyExists { root });
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_branching_from_root() {
        let (mut graph, root) = seeded();
        let c1 = graph.add_child(&root, state(1, "Went with A.", &["C", "D"]), "A").unwrap();
        let c2 = graph.add_child(&root, state(1, "Went with B.", &["E", "F"]), "B").unwrap();

        assert_eq!(
            graph.children_of(&root).unwrap(),
            vec![(c1.clone(), "A".to_string()), (c2.clone(), "B".to_string())]
        );
        assert!(graph.children_of(&c1).unwrap().is_empty());
        assert_eq!(graph.parent_of(&c2), Some(&root));
        assert_eq!(graph.incoming_action(&c1), Some("A"));
        assert_eq!(graph.incoming_action(&root), None);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_same_action_twice_creates_two_nodes() {
        let (mut graph, root) = seeded();
        let first = graph.add_child(&root, state(1, "Take one.", &["C", "D"]), "A").unwrap();
        let second = graph.add_child(&root, state(1, "Take two.", &["C", "D"]), "A").unwrap();
        assert_ne!(first, second);
        assert_eq!(graph.children_of(&root).unwrap().len(), 2);
    }

    #[test]
    fn test_unknown_parent() {
        let (mut graph, _) = seeded();
        let missing = NodeId::new("nowhere");
        let err = graph
            .add_child(&missing, state(1, "Lost.", &["C", "D"]), "A")
            .unwrap_err();
        assert_eq!(err, GraphError::UnknownNode { id: missing });
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_invalid_action_leaves_graph_unchanged() {
        let (mut graph, root) = seeded();
        let err = graph
            .add_child(&root, state(1, "Made up.", &["C", "D"]), "Z")
            .unwrap_err();
        assert!(matches!(err, GraphError::InvalidAction { ref action, .. } if action == "Z"));
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.children_of(&root).unwrap().is_empty());
    }

    #[test]
    fn test_turn_order_enforced_by_default() {
        let (mut graph, root) = seeded();
        let err = graph
            .add_child(&root, state(0, "Same turn.", &["C", "D"]), "A")
            .unwrap_err();
        assert_eq!(
            err,
            GraphError::TurnOrderViolation {
                parent: root.clone(),
                parent_turn: 0,
                child_turn: 0
            }
        );
        assert_eq!(graph.node_count(), 1);

        // Gaps are fine, only decreases and repeats are rejected.
        assert!(graph.add_child(&root, state(5, "Later.", &["C", "D"]), "A").is_ok());
    }

    #[test]
    fn test_turn_order_advisory() {
        let config = GraphConfig {
            turn_order: TurnOrderPolicy::Advisory,
            ..GraphConfig::default()
        };
        let mut graph = WorldGraph::with_config(config);
        let root = graph.add_root(state(4, "Start.", &["A", "B"])).unwrap();
        assert!(graph.add_child(&root, state(1, "Earlier?", &["C", "D"]), "A").is_ok());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut graph = WorldGraph::with_id_source(GraphConfig::default(), FixedIds);
        let root = graph.add_root(state(0, "Start.", &["A", "B"])).unwrap();
        let err = graph
            .add_child(&root, state(1, "Next.", &["C", "D"]), "A")
            .unwrap_err();
        assert_eq!(err, GraphError::DuplicateNodeId { id: NodeId::new("same") });
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_custom_prefix() {
        let config = GraphConfig {
            id_prefix: "turn".to_string(),
            ..GraphConfig::default()
        };
        let mut graph = WorldGraph::with_config(config);
        let root = graph.add_root(state(0, "Start.", &["A", "B"])).unwrap();
        assert_eq!(root.as_str(), "turn-0");
    }

    #[test]
    fn test_path_and_depth() {
        let (mut graph, root) = seeded();
        let a = graph.add_child(&root, state(1, "A.", &["C", "D"]), "A").unwrap();
        let b = graph.add_child(&root, state(1, "B.", &["C", "D"]), "B").unwrap();
        let ac = graph.add_child(&a, state(2, "AC.", &["E", "F"]), "C").unwrap();

        assert_eq!(graph.path_to(&ac).unwrap(), vec![root.clone(), a.clone(), ac.clone()]);
        assert_eq!(graph.path_to(&b).unwrap(), vec![root.clone(), b]);
        assert_eq!(graph.depth(&root).unwrap(), 0);
        assert_eq!(graph.depth(&ac).unwrap(), 2);
    }

    #[test]
    fn test_path_on_empty_graph() {
        let graph = WorldGraph::new();
        assert_eq!(graph.path_to(&NodeId::new("node-0")), Err(GraphError::NoRoot));
    }

    #[test]
    fn test_path_to_unknown_node() {
        let (graph, _) = seeded();
        let missing = NodeId::new("ghost");
        assert_eq!(
            graph.path_to(&missing),
            Err(GraphError::UnknownNode { id: missing })
        );
    }

    #[test]
    fn test_frontier() {
        let (mut graph, root) = seeded();
        assert_eq!(graph.frontier(), vec![&root]);

        let a = graph.add_child(&root, state(1, "A.", &["C", "D"]), "A").unwrap();
        let b = graph.add_child(&root, state(1, "B.", &["C", "D"]), "B").unwrap();
        let ac = graph.add_child(&a, state(2, "AC.", &["E", "F"]), "C").unwrap();

        assert_eq!(graph.frontier(), vec![&b, &ac]);
    }

    #[test]
    fn test_iteration_in_insertion_order() {
        let (mut graph, root) = seeded();
        let a = graph.add_child(&root, state(1, "A.", &["C", "D"]), "A").unwrap();
        let b = graph.add_child(&root, state(1, "B.", &["C", "D"]), "B").unwrap();

        let ids: Vec<_> = graph.node_ids().cloned().collect();
        assert_eq!(ids, vec![root.clone(), a.clone(), b.clone()]);

        let texts: Vec<_> = graph.nodes().map(|n| n.state().narrative_segment()).collect();
        assert_eq!(texts, vec!["The pitch begins.", "A.", "B."]);

        let edges: Vec<_> = graph.edges().map(|e| (&e.child_id, e.action.as_str())).collect();
        assert_eq!(edges, vec![(&a, "A"), (&b, "B")]);
    }

    #[test]
    fn test_history_shortcut() {
        let (mut graph, root) = seeded();
        let a = graph.add_child(&root, state(1, "A happened.", &["C", "D"]), "A").unwrap();
        let transcript = graph.history(&a).unwrap();
        assert_eq!(
            transcript.pairs(),
            vec![("START", "The pitch begins."), ("A", "A happened.")]
        );
    }
}
