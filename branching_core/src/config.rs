//! Top-level configuration, loadable from TOML.
//!
//! ```toml
//! [graph]
//! turn_order = "increasing"
//! id_prefix = "turn"
//!
//! [transcript]
//! start_label = "START"
//! ```
//!
//! Every section and field is optional and falls back to its default.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::history::TranscriptConfig;
use crate::world_graph::GraphConfig;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub graph: GraphConfig,
    pub transcript: TranscriptConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Could not serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl CoreConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }
}
