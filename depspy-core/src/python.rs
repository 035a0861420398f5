//! Python Bindings
//!
//! Exposes a [`Session`] to Python so the visualization server can drive it.
//! Trees cross the boundary as JSON in the renderer's shape.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::config::{Direction, SessionConfig};
use crate::error::DepSpyError;
use crate::paths;
use crate::session::Session;

fn to_py_err(err: DepSpyError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Python-exposed session.
#[pyclass(name = "Session")]
pub struct PySession {
    inner: Session,
}

#[pymethods]
impl PySession {
    #[new]
    #[pyo3(signature = (max_level = 3, reverse = false))]
    fn new(max_level: usize, reverse: bool) -> PyResult<Self> {
        let config = SessionConfig {
            max_level,
            direction: Direction::from_reverse(reverse),
        };
        let inner = Session::with_config(config).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Replace the graph with a JSON batch of records. Returns the module count.
    fn ingest_json(&mut self, payload: &str) -> PyResult<usize> {
        self.inner.ingest_json(payload).map_err(to_py_err)
    }

    /// Build a tree and return it as JSON.
    #[pyo3(signature = (root_id, reverse = false, max_level = 3))]
    fn build_tree(&mut self, root_id: &str, reverse: bool, max_level: usize) -> PyResult<String> {
        let tree = self
            .inner
            .build_tree(root_id, Direction::from_reverse(reverse), max_level)
            .map_err(to_py_err)?;
        serde_json::to_string(tree).map_err(|err| to_py_err(err.into()))
    }

    #[pyo3(signature = (tree_id, reverse = false))]
    fn expand_node(&mut self, tree_id: &str, reverse: bool) -> PyResult<bool> {
        self.inner
            .expand_node(tree_id, Direction::from_reverse(reverse))
            .map_err(to_py_err)
    }

    #[pyo3(signature = (tree_id, reverse = false))]
    fn can_expand(&self, tree_id: &str, reverse: bool) -> bool {
        self.inner.can_expand(tree_id, Direction::from_reverse(reverse))
    }

    /// The current tree as JSON, or None before a root was selected.
    fn root_json(&self) -> PyResult<Option<String>> {
        self.inner
            .root()
            .map(|root| serde_json::to_string(root).map_err(|err| to_py_err(err.into())))
            .transpose()
    }

    #[getter]
    fn version(&self) -> u64 {
        self.inner.version()
    }

    fn __repr__(&self) -> String {
        format!(
            "Session(modules={}, version={})",
            self.inner.graph().len(),
            self.inner.version()
        )
    }
}

/// Short label for a module path, as drawn on tree nodes.
#[pyfunction]
#[pyo3(name = "display_name")]
pub fn py_display_name(path: &str) -> String {
    paths::display_name(path)
}
