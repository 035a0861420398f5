//! Impact Graph
//!
//! This module implements the module graph of one build, annotated with
//! reverse edges, change flags and per-export change reasons.
//!
//! # Overview
//!
//! - Nodes are modules keyed by their relative id.
//! - Forward edges are the static and dynamic imports reported by the build.
//! - Reverse edges (importers) are derived at ingestion so every edge can be
//!   walked in both directions.
//! - Each node may record, per export, which names imported from which
//!   upstream modules caused that export to change.
//!
//! Unlike a plain dependency graph, the graph may contain cycles: ES modules
//! import each other freely. Cycles are handled by the tree builder, not
//! rejected here.

mod expand;
mod impact;
mod ingest;
mod node;

pub use expand::NextLevel;
pub use impact::ImpactGraph;
pub use node::{ChangeRecord, ExportReason, GraphNode, ImportedName, ImportedNames};

/// Pseudo export standing for "this module is evaluated at all".
pub const SIDE_EFFECT_NAME: &str = "__SIDE_EFFECT__";

/// Imported name meaning any change to the import affects the export.
pub const WILDCARD: &str = "*";
