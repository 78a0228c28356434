//! Identifier sources for graph nodes.

use uuid::Uuid;

use super::NodeId;

/// Hands out node identifiers.
///
/// Injected into [`super::WorldGraph`] so tests can predict ids exactly.
/// The graph still rejects an id that is already in use.
pub trait IdSource: Send + Sync + std::fmt::Debug {
    /// Produce the next identifier, or `None` once the source can no longer
    /// produce an id it has not already handed out or observed.
    fn next_id(&mut self) -> Option<NodeId>;

    /// Called for every id restored from a snapshot, so the source can avoid
    /// handing it out again.
    fn observe(&mut self, _id: &NodeId) {}
}

/// Monotonic ids of the form `{prefix}-{n}`, starting at 0.
///
/// Exhausted after `{prefix}-18446744073709551615` has been issued or observed.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    /// `None` once the counter cannot advance.
    next: Option<u64>,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: Some(0),
        }
    }

    /// The counter value the next id will carry. `None` when exhausted.
    pub fn peek(&self) -> Option<u64> {
        self.next
    }

    fn counter_of(&self, id: &NodeId) -> Option<u64> {
        id.as_str()
            .strip_prefix(self.prefix.as_str())?
            .strip_prefix('-')?
            .parse()
            .ok()
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("node")
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> Option<NodeId> {
        let n = self.next?;
        self.next = n.checked_add(1);
        Some(NodeId::new(format!("{}-{}", self.prefix, n)))
    }

    fn observe(&mut self, id: &NodeId) {
        if let (Some(n), Some(next)) = (self.counter_of(id), self.next) {
            if n >= next {
                self.next = n.checked_add(1);
            }
        }
    }
}

/// Random UUID v4 ids (32 hex characters, no hyphens).
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdSource for UuidIds {
    fn next_id(&mut self) -> Option<NodeId> {
        Some(NodeId::new(Uuid::new_v4().simple().to_string()))
    }
}
