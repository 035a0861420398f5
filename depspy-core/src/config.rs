//! Session Configuration
//!
//! Defaults for tree rendering. A config can be built in code or parsed
//! from the JSON the visualization layer sends when a session starts.

use serde::{Deserialize, Serialize};

use crate::error::{DepSpyError, Result};

/// Default depth of a freshly built tree.
pub const DEFAULT_MAX_LEVEL: usize = 3;

/// Which way impact is followed through the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// From a module to the imports that explain its changed exports.
    #[default]
    Forward,
    /// From a module to the importers whose exports it changed.
    Reverse,
}

impl Direction {
    /// Bridge from the boolean `reverse` flag used by the UI.
    pub fn from_reverse(reverse: bool) -> Self {
        if reverse {
            Self::Reverse
        } else {
            Self::Forward
        }
    }

    pub fn is_reverse(self) -> bool {
        self == Self::Reverse
    }
}

/// Rendering defaults for a [`Session`](crate::Session).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Depth bound for [`Session::build_default_tree`](crate::Session::build_default_tree).
    #[serde(default = "default_max_level")]
    pub max_level: usize,

    #[serde(default)]
    pub direction: Direction,
}

fn default_max_level() -> usize {
    DEFAULT_MAX_LEVEL
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_level: DEFAULT_MAX_LEVEL,
            direction: Direction::Forward,
        }
    }
}

impl SessionConfig {
    /// Parse and validate a config from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_level == 0 {
            return Err(DepSpyError::Config(
                "maxLevel must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
