//! The generation service boundary.
//!
//! The service itself lives outside this crate. It receives the rendered
//! branch history and the chosen action, and answers with JSON text that is
//! validated before anything is stored.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Everything the generation service needs for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Rendered transcript of the branch so far (or the opening setting).
    pub history: String,
    /// The action the player selected.
    pub choice: String,
    /// Turn id the new state is expected to carry.
    pub turn_id: u64,
}

impl GenerationRequest {
    pub fn new(history: impl Into<String>, choice: impl Into<String>, turn_id: u64) -> Self {
        Self {
            history: history.into(),
            choice: choice.into(),
            turn_id,
        }
    }

    /// Render the instruction prompt for a JSON-only text model.
    pub fn to_prompt(&self) -> String {
        let example = serde_json::json!({
            "turn_id": self.turn_id,
            "narrative_segment": "The judges exchange glances as the room falls silent.",
            "entities": [
                { "name": "Lead Judge", "role": "judge", "mood": "curious" },
                { "name": "Angel Investor", "role": "investor", "mood": "impressed" }
            ],
            "available_actions": ["Answer confidently", "Wait silently"]
        });
        let example = serde_json::to_string_pretty(&example).unwrap_or_default();

        let mut prompt = String::new();

        prompt.push_str("You are a simulation engine.\n\n");
        prompt.push_str("Return ONLY valid JSON.\n");
        prompt.push_str("Do NOT include explanations.\n");
        prompt.push_str("Do NOT include markdown.\n");
        prompt.push_str("Do NOT add or remove fields.\n\n");

        prompt.push_str("The JSON MUST match this schema EXACTLY:\n\n");
        prompt.push_str(STATE_SCHEMA);
        prompt.push_str("\n\n");

        prompt.push_str("Example output:\n");
        prompt.push_str(&example);
        prompt.push_str("\n\n");

        prompt.push_str("Current History:\n");
        prompt.push_str(&self.history);
        prompt.push_str("\n\n");

        prompt.push_str("User Choice:\n");
        prompt.push_str(&self.choice);
        prompt.push_str("\n\n");

        prompt.push_str("Generate the next state now.\n");
        prompt
    }
}

const STATE_SCHEMA: &str = r#"{
  "turn_id": number,
  "narrative_segment": string,
  "entities": [
    {
      "name": string,
      "role": string,
      "mood": string
    }
  ],
  "available_actions": [string, string]
}"#;

/// Failure reported by the generation service itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    #[error("Generation service unavailable: {0}")]
    Unavailable(String),

    #[error("Generation failed: {0}")]
    Failed(String),
}

/// Turns a request into raw state JSON.
///
/// Output is untrusted; the session validates it before inserting.
pub trait StoryGenerator {
    fn generate(&mut self, request: &GenerationRequest) -> Result<String, GeneratorError>;
}

impl<F> StoryGenerator for F
where
    F: FnMut(&GenerationRequest) -> Result<String, GeneratorError>,
{
    fn generate(&mut self, request: &GenerationRequest) -> Result<String, GeneratorError> {
        self(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_context() {
        let request = GenerationRequest::new(
            "Action: START\nOutcome: You finish your pitch.",
            "Wait for the judges to speak.",
            3,
        );
        let prompt = request.to_prompt();

        assert!(prompt.starts_with("You are a simulation engine."));
        assert!(prompt.contains("Current History:\nAction: START\nOutcome: You finish your pitch."));
        assert!(prompt.contains("User Choice:\nWait for the judges to speak."));
        assert!(prompt.contains("\"turn_id\": 3"));
        assert!(prompt.contains("\"available_actions\": [string, string]"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let request = GenerationRequest::new("history", "choice", 1);
        assert_eq!(request.to_prompt(), request.to_prompt());
    }

    #[test]
    fn test_closure_generator() {
        let mut calls = 0;
        let mut generator = |request: &GenerationRequest| -> Result<String, GeneratorError> {
            calls += 1;
            Ok(format!("turn {}", request.turn_id))
        };
        let out = generator.generate(&GenerationRequest::new("", "go", 7)).unwrap();
        assert_eq!(out, "turn 7");
        assert_eq!(calls, 1);
    }
}
