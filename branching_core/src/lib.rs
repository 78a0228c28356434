//! # Branching Core
//!
//! The state graph behind an interactive branching narrative. Every turn a
//! generation service produces is stored here, linked to the turn it came
//! from by the choice the player made, and any branch can be replayed as a
//! linear transcript to serve as context for the next turn.
//!
//! ## Core Components
//!
//! - **world_graph**: Append-only tree of turns, identity, snapshots, and a shared handle
//! - **history**: Reconstructs the root-to-node transcript of a branch
//! - **session**: The play loop around a graph and an external generation service
//! - **config**: TOML-loadable settings
//!
//! ## Design Philosophy
//!
//! - **Append-Only**: Nodes and edges are never edited or removed
//! - **Validated Boundary**: Generated output is checked by `story_schema` before it is stored
//! - **No Globals**: Graphs, id sources and generators are explicit values passed by the caller

pub mod config;
pub mod error;
pub mod history;
pub mod session;
pub mod world_graph;

pub use config::*;
pub use error::*;
pub use history::*;
pub use session::*;
pub use world_graph::*;
