//! Story sessions - the play loop around the graph.
//!
//! A session owns one graph, the generation service and the "current node"
//! pointer. Each step:
//! 1. Reads the current state and its choices
//! 2. Reconstructs the branch transcript
//! 3. Asks the generator for the next state
//! 4. Validates the payload at the schema boundary
//! 5. Inserts it as a child and advances the pointer
//!
//! A rejected payload leaves both the graph and the pointer untouched.

mod generator;

pub use generator::*;

use story_schema::{parse_generation, SchemaViolation, SimulationState};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::CoreConfig;
use crate::error::GraphError;
use crate::history::{HistoryReconstructor, Transcript};
use crate::world_graph::{NodeId, WorldGraph};

#[derive(Debug, Error)]
pub enum SessionError {
    /// The generator answered with a payload that failed validation.
    #[error("Generation rejected: {0}")]
    RejectedGeneration(#[from] SchemaViolation),

    #[error(transparent)]
    Generator(#[from] GeneratorError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Session has not begun")]
    NotStarted,

    #[error("Choice {index} is out of range, {available} choices available")]
    ChoiceOutOfRange { index: usize, available: usize },
}

impl SessionError {
    /// Whether the turn can simply be generated again.
    ///
    /// True when the generation service failed or misbehaved. A turn id that
    /// does not advance also comes from generated content, so it counts too.
    /// Everything else points at a driver bug.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SessionError::RejectedGeneration(_)
                | SessionError::Generator(_)
                | SessionError::Graph(GraphError::TurnOrderViolation { .. })
        )
    }
}

/// One playthrough: a graph, a generator and the current position.
#[derive(Debug)]
pub struct StorySession<G> {
    graph: WorldGraph,
    history: HistoryReconstructor,
    generator: G,
    current: Option<NodeId>,
}

impl<G: StoryGenerator> StorySession<G> {
    /// Create a session with default configuration.
    pub fn new(generator: G) -> Self {
        Self::with_config(generator, CoreConfig::default())
    }

    pub fn with_config(generator: G, config: CoreConfig) -> Self {
        Self::from_parts(
            WorldGraph::with_config(config.graph),
            HistoryReconstructor::new(config.transcript),
            generator,
        )
    }

    /// Resume from an existing graph. The pointer starts at the root, if any.
    pub fn from_parts(graph: WorldGraph, history: HistoryReconstructor, generator: G) -> Self {
        let current = graph.root_id().cloned();
        Self {
            graph,
            history,
            generator,
            current,
        }
    }

    /// Generate the opening turn (turn 0) and make it the root.
    pub fn begin(&mut self, setting: &str, opening_choice: &str) -> Result<NodeId, SessionError> {
        if let Some(root) = self.graph.root_id() {
            return Err(GraphError::RootAlreadyExists { root: root.clone() }.into());
        }

        let request = GenerationRequest::new(setting, opening_choice, 0);
        let state = self.generate(&request)?;
        let root = self.graph.add_root(state)?;

        info!(root = %root, "session seeded");
        self.current = Some(root.clone());
        Ok(root)
    }

    pub fn current_id(&self) -> Option<&NodeId> {
        self.current.as_ref()
    }

    pub fn current_state(&self) -> Result<&SimulationState, SessionError> {
        let current = self.current.as_ref().ok_or(SessionError::NotStarted)?;
        Ok(self.graph.get_state(current)?)
    }

    /// Choices offered at the current node.
    pub fn choices(&self) -> Result<&[String], SessionError> {
        Ok(self.current_state()?.available_actions())
    }

    /// Take the choice at zero-based `index`.
    pub fn choose(&mut self, index: usize) -> Result<NodeId, SessionError> {
        let action = {
            let choices = self.choices()?;
            choices
                .get(index)
                .cloned()
                .ok_or(SessionError::ChoiceOutOfRange {
                    index,
                    available: choices.len(),
                })?
        };
        self.choose_action(&action)
    }

    /// Take the choice with exactly this text.
    pub fn choose_action(&mut self, action: &str) -> Result<NodeId, SessionError> {
        let current = self.current.clone().ok_or(SessionError::NotStarted)?;
        let state = self.graph.get_state(&current)?;

        // Checked here as well so an invalid choice never costs a generation call.
        if !state.has_action(action) {
            return Err(GraphError::InvalidAction {
                parent: current,
                action: action.to_string(),
            }
            .into());
        }

        let next_turn = state
            .turn_id()
            .checked_add(1)
            .ok_or_else(|| GraphError::TurnLimitReached {
                node: current.clone(),
            })?;
        let history = self.history.render(&self.graph, &current)?;
        let request = GenerationRequest::new(history, action, next_turn);

        let next = self.generate(&request)?;
        let child = self.graph.add_child(&current, next, action)?;

        self.current = Some(child.clone());
        Ok(child)
    }

    /// Move the pointer to any stored node, e.g. to explore another choice
    /// from an earlier turn.
    pub fn jump_to(&mut self, node_id: &NodeId) -> Result<(), SessionError> {
        self.graph.node(node_id)?;
        self.current = Some(node_id.clone());
        Ok(())
    }

    /// Transcript of the branch ending at the current node.
    pub fn transcript(&self) -> Result<Transcript, SessionError> {
        let current = self.current.as_ref().ok_or(SessionError::NotStarted)?;
        Ok(self.history.reconstruct(&self.graph, current)?)
    }

    pub fn graph(&self) -> &WorldGraph {
        &self.graph
    }

    pub fn generator_mut(&mut self) -> &mut G {
        &mut self.generator
    }

    pub fn into_graph(self) -> WorldGraph {
        self.graph
    }

    fn generate(&mut self, request: &GenerationRequest) -> Result<SimulationState, SessionError> {
        let raw = self.generator.generate(request)?;
        parse_generation(&raw).map_err(|violation| {
            warn!(
                turn_id = request.turn_id,
                fields = ?violation.fields(),
                raw = %raw,
                "generator returned an invalid state"
            );
            SessionError::RejectedGeneration(violation)
        })
    }
}
