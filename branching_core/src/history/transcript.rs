//! Transcript - the ordered rendering of one branch.

use serde::{Deserialize, Serialize};

use super::ENTRY_SEPARATOR;

/// One step of a branch: the action taken and what came of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub action: String,
    pub outcome: String,
}

impl TranscriptEntry {
    pub fn new(action: impl Into<String>, outcome: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            outcome: outcome.into(),
        }
    }

    /// Render as `Action: ...` / `Outcome: ...` lines.
    pub fn render(&self) -> String {
        format!("Action: {}\nOutcome: {}", self.action, self.outcome)
    }
}

/// Ordered history of a branch, root first.
///
/// Rendering depends only on the stored entries, so identical states always
/// produce byte-identical context.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new(entries: Vec<TranscriptEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Entries as borrowed `(action, outcome)` pairs.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.entries
            .iter()
            .map(|e| (e.action.as_str(), e.outcome.as_str()))
            .collect()
    }

    pub fn into_entries(self) -> Vec<TranscriptEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recent step.
    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    /// Join all entries with `separator`.
    pub fn render(&self, separator: &str) -> String {
        self.entries
            .iter()
            .map(TranscriptEntry::render)
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl std::fmt::Display for Transcript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render(ENTRY_SEPARATOR))
    }
}
