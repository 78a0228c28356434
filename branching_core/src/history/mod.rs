//! History Reconstructor - replays a branch as generation context.
//!
//! Reconstruction works as follows:
//! 1. **Path**: Walk parent links from the requested node up to the root
//! 2. **Order**: Reverse the walk so the root comes first
//! 3. **Label**: Pair each node with the action on its incoming edge
//!    (the start label for the root, which has none)
//! 4. **Render**: Join the pairs into a linear "Action:/Outcome:" transcript
//!
//! The graph is a tree, so the path is unique and no tie-breaking is needed.
//! Sibling branches never appear in a transcript.

mod transcript;

pub use transcript::*;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::GraphError;
use crate::world_graph::{NodeId, WorldGraph};

/// Label used for the root's synthetic incoming transition.
pub const START_LABEL: &str = "START";

/// Separator placed between rendered transcript entries.
pub const ENTRY_SEPARATOR: &str = "\n\n";

/// Configuration for transcript reconstruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptConfig {
    /// Action label given to the root entry.
    pub start_label: String,

    /// Text placed between entries when rendering.
    pub entry_separator: String,
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            start_label: START_LABEL.to_string(),
            entry_separator: ENTRY_SEPARATOR.to_string(),
        }
    }
}

/// Builds branch transcripts from a graph.
#[derive(Debug, Clone, Default)]
pub struct HistoryReconstructor {
    config: TranscriptConfig,
}

impl HistoryReconstructor {
    /// Create a reconstructor with the given configuration.
    pub fn new(config: TranscriptConfig) -> Self {
        Self { config }
    }

    /// Create a reconstructor with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(TranscriptConfig::default())
    }

    pub fn config(&self) -> &TranscriptConfig {
        &self.config
    }

    /// Ordered `(action, outcome)` history from the root to `node_id`.
    ///
    /// A node at depth `k` yields `k + 1` entries. Fails with `NoRoot` on an
    /// unseeded graph, `UnknownNode` for an absent id and `UnreachableNode`
    /// if the node is not a descendant of the root.
    pub fn reconstruct(
        &self,
        graph: &WorldGraph,
        node_id: &NodeId,
    ) -> Result<Transcript, GraphError> {
        let path = graph.path_to(node_id)?;
        trace!(node_id = %node_id, depth = path.len() - 1, "reconstructing branch");

        let entries = path
            .iter()
            .map(|id| {
                let state = graph.get_state(id)?;
                let action = graph
                    .incoming_action(id)
                    .unwrap_or(self.config.start_label.as_str());
                Ok(TranscriptEntry::new(action, state.narrative_segment()))
            })
            .collect::<Result<Vec<_>, GraphError>>()?;

        Ok(Transcript::new(entries))
    }

    /// Reconstruct and render in one step, using the configured separator.
    pub fn render(&self, graph: &WorldGraph, node_id: &NodeId) -> Result<String, GraphError> {
        Ok(self
            .reconstruct(graph, node_id)?
            .render(&self.config.entry_separator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use story_schema::SimulationState;

    fn state(turn_id: u64, text: &str, actions: &[&str]) -> SimulationState {
        SimulationState::new(turn_id, text, vec![], actions.iter().copied()).unwrap()
    }

    /// Root offering A/B with one child per action.
    fn setup_test_graph() -> (WorldGraph, NodeId, NodeId, NodeId) {
        let mut graph = WorldGraph::new();
        let root = graph
            .add_root(state(0, "You finish your pitch.", &["A", "B"]))
            .unwrap();
        let c1 = graph
            .add_child(&root, state(1, "The judges nod.", &["C", "D"]), "A")
            .unwrap();
        let c2 = graph
            .add_child(&root, state(1, "The room goes quiet.", &["E", "F"]), "B")
            .unwrap();
        (graph, root, c1, c2)
    }

    #[test]
    fn test_root_reconstruction() {
        let (graph, root, _, _) = setup_test_graph();
        let transcript = HistoryReconstructor::with_defaults()
            .reconstruct(&graph, &root)
            .unwrap();
        assert_eq!(transcript.pairs(), vec![("START", "You finish your pitch.")]);
    }

    #[test]
    fn test_sibling_branches_are_isolated() {
        let (graph, _, c1, c2) = setup_test_graph();
        let reconstructor = HistoryReconstructor::with_defaults();

        let t1 = reconstructor.reconstruct(&graph, &c1).unwrap();
        let t2 = reconstructor.reconstruct(&graph, &c2).unwrap();

        assert_eq!(
            t1.pairs(),
            vec![("START", "You finish your pitch."), ("A", "The judges nod.")]
        );
        assert_eq!(
            t2.pairs(),
            vec![("START", "You finish your pitch."), ("B", "The room goes quiet.")]
        );
        assert_eq!(t1.entries()[0], t2.entries()[0]);
    }

    #[test]
    fn test_deep_branch_length() {
        let (mut graph, _, c1, _) = setup_test_graph();
        let d = graph.add_child(&c1, state(2, "Deeper.", &["G", "H"]), "D").unwrap();
        let g = graph.add_child(&d, state(3, "Deepest.", &["I", "J"]), "G").unwrap();
        // Noise on another branch.
        graph.add_child(&c1, state(2, "Sideways.", &["K", "L"]), "C").unwrap();

        let transcript = graph.history(&g).unwrap();
        assert_eq!(transcript.len(), 4);
        let actions: Vec<_> = transcript.entries().iter().map(|e| e.action.as_str()).collect();
        assert_eq!(actions, vec!["START", "A", "D", "G"]);
    }

    #[test]
    fn test_render_format() {
        let (graph, _, c1, _) = setup_test_graph();
        let rendered = HistoryReconstructor::with_defaults()
            .render(&graph, &c1)
            .unwrap();
        assert_eq!(
            rendered,
            "Action: START\nOutcome: You finish your pitch.\n\nAction: A\nOutcome: The judges nod."
        );
    }

    #[test]
    fn test_render_is_deterministic() {
        let (graph, _, _, c2) = setup_test_graph();
        let reconstructor = HistoryReconstructor::with_defaults();
        let first = reconstructor.render(&graph, &c2).unwrap();
        let second = reconstructor.render(&graph, &c2).unwrap();
        assert_eq!(first.as_bytes(), second.as_bytes());
    }

    #[test]
    fn test_custom_config() {
        let (graph, _, c1, _) = setup_test_graph();
        let reconstructor = HistoryReconstructor::new(TranscriptConfig {
            start_label: "BEGIN".to_string(),
            entry_separator: "\n---\n".to_string(),
        });
        let rendered = reconstructor.render(&graph, &c1).unwrap();
        assert!(rendered.starts_with("Action: BEGIN\n"));
        assert!(rendered.contains("\n---\nAction: A\n"));
    }

    #[test]
    fn test_no_root() {
        let graph = WorldGraph::new();
        let err = HistoryReconstructor::with_defaults()
            .reconstruct(&graph, &NodeId::new("node-0"))
            .unwrap_err();
        assert_eq!(err, GraphError::NoRoot);
    }

    #[test]
    fn test_unknown_node() {
        let (graph, _, _, _) = setup_test_graph();
        let err = graph.history(&NodeId::new("node-99")).unwrap_err();
        assert!(matches!(err, GraphError::UnknownNode { .. }));
    }
}
