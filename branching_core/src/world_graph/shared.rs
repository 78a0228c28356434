//! Thread-safe handle for exploring several branches at once.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use story_schema::SimulationState;

use super::{GraphSnapshot, NodeId, WorldGraph};
use crate::error::GraphError;
use crate::history::{HistoryReconstructor, Transcript};

/// A cloneable, lock-protected [`WorldGraph`].
///
/// Inserts take the write lock for the whole insert, so node and edge appear
/// together and id assignment never races. Reads share the read lock and
/// return owned data.
#[derive(Debug, Clone, Default)]
pub struct SharedWorldGraph {
    inner: Arc<RwLock<WorldGraph>>,
}

impl SharedWorldGraph {
    pub fn new(graph: WorldGraph) -> Self {
        Self {
            inner: Arc::new(RwLock::new(graph)),
        }
    }

    fn read(&self, context: &'static str) -> Result<RwLockReadGuard<'_, WorldGraph>, GraphError> {
        self.inner
            .read()
            .map_err(|_| GraphError::LockPoisoned { context })
    }

    fn write(&self, context: &'static str) -> Result<RwLockWriteGuard<'_, WorldGraph>, GraphError> {
        self.inner
            .write()
            .map_err(|_| GraphError::LockPoisoned { context })
    }

    pub fn add_root(&self, state: SimulationState) -> Result<NodeId, GraphError> {
        self.write("add_root")?.add_root(state)
    }

    pub fn add_child(
        &self,
        parent_id: &NodeId,
        state: SimulationState,
        action: &str,
    ) -> Result<NodeId, GraphError> {
        self.write("add_child")?.add_child(parent_id, state, action)
    }

    pub fn get_state(&self, node_id: &NodeId) -> Result<SimulationState, GraphError> {
        self.read("get_state")?.get_state(node_id).cloned()
    }

    pub fn children_of(&self, node_id: &NodeId) -> Result<Vec<(NodeId, String)>, GraphError> {
        self.read("children_of")?.children_of(node_id)
    }

    pub fn reconstruct(
        &self,
        reconstructor: &HistoryReconstructor,
        node_id: &NodeId,
    ) -> Result<Transcript, GraphError> {
        reconstructor.reconstruct(&*self.read("reconstruct")?, node_id)
    }

    pub fn node_count(&self) -> Result<usize, GraphError> {
        Ok(self.read("node_count")?.node_count())
    }

    pub fn edge_count(&self) -> Result<usize, GraphError> {
        Ok(self.read("edge_count")?.edge_count())
    }

    pub fn snapshot(&self) -> Result<GraphSnapshot, GraphError> {
        Ok(self.read("snapshot")?.snapshot())
    }

    /// Run a read-only closure against the graph.
    pub fn with_graph<R>(&self, f: impl FnOnce(&WorldGraph) -> R) -> Result<R, GraphError> {
        Ok(f(&*self.read("with_graph")?))
    }
}

impl From<WorldGraph> for SharedWorldGraph {
    fn from(graph: WorldGraph) -> Self {
        Self::new(graph)
    }
}
