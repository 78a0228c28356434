//! # Story Schema
//!
//! The state contract for the branching narrative. Every turn the generation
//! service produces is described here, and every payload crossing into the
//! system is checked here before anything else sees it.
//!
//! ## Core Components
//!
//! - **entities**: Characters and actors listed in a turn
//! - **state**: The validated per-turn snapshot (`SimulationState`)
//! - **validation**: The permissive wire payload and the parse-then-validate boundary
//!
//! This crate holds data only. It has no notion of graphs, branches or sessions.

pub mod entities;
pub mod state;
pub mod validation;

pub use entities::*;
pub use state::*;
pub use validation::*;
