//! Error types shared by every part of the engine.

use thiserror::Error;

/// Errors produced while ingesting payloads or querying the impact graph.
#[derive(Debug, Error)]
pub enum DepSpyError {
    /// A query referenced a graph id that has no node.
    #[error("module `{0}` is not in the impact graph")]
    UnknownModule(String),

    /// Trees need at least the root level.
    #[error("max level must be at least 1, got {0}")]
    InvalidMaxLevel(usize),

    /// An adapter could not resolve a module id to a parsed module.
    #[error("please check if {0} is correctly parsed")]
    ModuleNotParsed(String),

    #[error("invalid session config: {0}")]
    Config(String),

    #[error("failed to decode JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to decode MessagePack payload: {0}")]
    MessagePack(#[from] rmp_serde::decode::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = DepSpyError> = std::result::Result<T, E>;
