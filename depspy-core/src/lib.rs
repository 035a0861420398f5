//! DepSpy Core
//!
//! This crate turns the per-module facts a bundler reports for one build
//! into an impact graph and lets a user explore it as a tree:
//!
//! - which imports explain why an export of a module changed (forward)
//! - which importers changed because of a module (reverse)
//!
//! Trees are built a few levels deep and then grown lazily as the user
//! expands nodes. Every change bumps a version signal the renderer watches.
//!
//! # Architecture
//!
//! - `graph`: records, ingestion, the impact graph and level expansion
//! - `tree`: tree nodes, the depth-bounded builder and the lazy expander
//! - `session`: the state one visualization keeps between interactions
//! - `reactive`: the signal carrying the tree version
//! - `collect`: the async collector receiving chunked builds
//! - `adapter`: the contract bundler adapters implement
//!
//! The crate is usable both as a native Rust library and, with the `python`
//! feature, as a Python extension module via PyO3.
//!
//! # Example
//!
//! ```rust
//! use depspy_core::{ChangeRecord, Direction, ExportReason, Session};
//!
//! let mut app = ChangeRecord::new("src/app.ts");
//! app.imported_ids = vec!["src/util.ts".into()];
//! app.rendered_exports = vec!["render".into()];
//! app.export_effected_names_to_reasons.insert(
//!     "render".into(),
//!     ExportReason::from_imports([("src/util.ts", ["format"])]),
//! );
//! let mut util = ChangeRecord::new("src/util.ts");
//! util.rendered_exports = vec!["format".into()];
//! util.is_git_change = true;
//!
//! let mut session = Session::new();
//! session.ingest(vec![app, util]);
//!
//! let tree = session.build_tree("src/app.ts", Direction::Forward, 3).unwrap();
//! assert_eq!(tree.children[0].graph_id(), "src/util.ts");
//! ```

pub mod adapter;
pub mod collect;
pub mod config;
pub mod error;
pub mod graph;
pub mod paths;
pub mod reactive;
pub mod session;
pub mod tree;
pub mod wire;

#[cfg(feature = "python")]
mod python;

pub use config::{Direction, SessionConfig, DEFAULT_MAX_LEVEL};
pub use error::{DepSpyError, Result};
pub use graph::{
    ChangeRecord, ExportReason, GraphNode, ImpactGraph, ImportedName, NextLevel, SIDE_EFFECT_NAME,
    WILDCARD,
};
pub use session::{Session, SharedSession};
pub use tree::TreeNode;
pub use wire::WireFormat;

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Python module definition.
///
/// This function is called by Python when importing the module.
#[cfg(feature = "python")]
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<python::PySession>()?;
    m.add_function(wrap_pyfunction!(python::py_display_name, m)?)?;
    m.add("SIDE_EFFECT_NAME", SIDE_EFFECT_NAME)?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
