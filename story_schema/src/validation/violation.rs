//! Schema violation errors.

use thiserror::Error;

/// What is wrong with a single field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Problem {
    #[error("is missing")]
    Missing,

    #[error("must not be empty")]
    Empty,

    #[error("must be a non-negative integer, got {0}")]
    NotANonNegativeInteger(String),

    #[error("has {count} entries, expected {} to {}", crate::MIN_ACTIONS, crate::MAX_ACTIONS)]
    TooFewActions { count: usize },

    #[error("has {count} entries, expected {} to {}", crate::MIN_ACTIONS, crate::MAX_ACTIONS)]
    TooManyActions { count: usize },

    /// Same text as the action at `first_index`.
    #[error("duplicates available_actions[{first_index}]")]
    DuplicateAction { first_index: usize },

    /// The payload could not be read as the expected shape at all.
    #[error("is malformed: {0}")]
    Malformed(String),
}

/// A problem attached to the path of the field that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Path such as `available_actions[1]` or `entities[0].name`.
    pub field: String,
    pub problem: Problem,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, problem: Problem) -> Self {
        Self {
            field: field.into(),
            problem,
        }
    }
}

impl std::fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.problem)
    }
}

/// A generated payload was rejected. Lists every offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("schema violation: {}", join_issues(.issues))]
pub struct SchemaViolation {
    issues: Vec<FieldIssue>,
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl SchemaViolation {
    pub fn new(issues: Vec<FieldIssue>) -> Self {
        Self { issues }
    }

    pub fn single(field: impl Into<String>, problem: Problem) -> Self {
        Self::new(vec![FieldIssue::new(field, problem)])
    }

    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    /// Offending field paths, in the order they were found.
    pub fn fields(&self) -> Vec<&str> {
        self.issues.iter().map(|i| i.field.as_str()).collect()
    }

    /// Check whether a specific field path was flagged.
    pub fn involves(&self, field: &str) -> bool {
        self.issues.iter().any(|i| i.field == field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_display_lists_fields() {
        let err = SchemaViolation::new(vec![
            FieldIssue::new("narrative_segment", Problem::Empty),
            FieldIssue::new("available_actions", Problem::TooManyActions { count: 4 }),
        ]);
        assert_eq!(
            err.to_string(),
            "schema violation: narrative_segment must not be empty; \
             available_actions has 4 entries, expected 2 to 3"
        );
    }

    #[test]
    fn test_action_count_display() {
        assert_eq!(
            Problem::TooFewActions { count: 1 }.to_string(),
            "has 1 entries, expected 2 to 3"
        );
        assert_eq!(
            Problem::NotANonNegativeInteger("-1".to_string()).to_string(),
            "must be a non-negative integer, got -1"
        );
    }

    #[test]
    fn test_duplicate_display() {
        let issue = FieldIssue::new("available_actions[2]", Problem::DuplicateAction { first_index: 0 });
        assert_eq!(issue.to_string(), "available_actions[2] duplicates available_actions[0]");
    }
}
