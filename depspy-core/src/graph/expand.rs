//! Level Expansion
//!
//! Computes the next hop of an impact tree: which neighbours of a module are
//! relevant to its selected exports, and which of their exports carry the
//! impact further.
//!
//! # Selection
//!
//! The selection of a module is its rendered exports plus the side-effect
//! sentinel, so modules whose evaluation matters are always tracked.
//!
//! # Forward
//!
//! 1. For every selected export, look up its reason and collect, per
//!    upstream module, the imported names that explain the change.
//! 2. Walk the module's actual imports. An import collected in step 1
//!    becomes a child selecting those names. An import that was not
//!    collected still becomes a child selecting only the sentinel when its
//!    evaluation changed.
//!
//! Imports that exist but did not cause the change are left out.
//!
//! # Reverse
//!
//! For every importer of the module, inspect the importer's reasons. If a
//! reason names one of the selected exports (or the wildcard) as imported
//! from this module, the importer becomes a child selecting that export.

use indexmap::{IndexMap, IndexSet};
use tracing::trace;

use super::impact::ImpactGraph;
use super::SIDE_EFFECT_NAME;
use crate::config::Direction;
use crate::error::Result;

/// The children of one module in an impact tree, with the exports each
/// child is selected for. Children keep the order they were found in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NextLevel {
    entries: IndexMap<String, IndexSet<String>>,
}

impl NextLevel {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Child graph ids in discovery order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// The exports a child was selected for.
    pub fn select_exports(&self, id: &str) -> Option<&IndexSet<String>> {
        self.entries.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexSet<String>)> {
        self.entries.iter().map(|(id, names)| (id.as_str(), names))
    }

    /// Add `names` to the selection of `id`, creating the child if needed.
    fn select<I>(&mut self, id: &str, names: I)
    where
        I: IntoIterator<Item = String>,
    {
        match self.entries.get_mut(id) {
            Some(selected) => selected.extend(names),
            None => {
                self.entries.insert(id.to_string(), names.into_iter().collect());
            }
        }
    }
}

impl ImpactGraph {
    /// Compute the children of `entry_id` in the given direction.
    ///
    /// Fails with [`UnknownModule`](crate::DepSpyError::UnknownModule) when
    /// the entry has no node. Neighbours without a node are skipped.
    pub fn next_level(&self, entry_id: &str, direction: Direction) -> Result<NextLevel> {
        let entry = self.require(entry_id)?;

        let mut selected: IndexSet<&str> = entry
            .rendered_exports()
            .iter()
            .map(String::as_str)
            .collect();
        selected.insert(SIDE_EFFECT_NAME);

        let mut level = NextLevel::default();

        match direction {
            Direction::Forward => {
                let mut upstream: IndexMap<&str, IndexSet<String>> = IndexMap::new();
                for export in &selected {
                    let Some(reason) = entry.reason(export) else {
                        continue;
                    };
                    for (import_id, names) in &reason.import_effected_names {
                        upstream
                            .entry(import_id.as_str())
                            .or_default()
                            .extend(names.iter().map(|name| name.as_str().to_string()));
                    }
                }

                for child_id in entry.imports() {
                    let Some(child) = self.get(child_id) else {
                        trace!(module = entry_id, child = child_id, "import has no node");
                        continue;
                    };
                    if let Some(names) = upstream.swap_remove(child_id) {
                        level.select(child_id, names);
                        level.select(child_id, [SIDE_EFFECT_NAME.to_string()]);
                    } else if child.is_side_effect_change() {
                        level.select(child_id, [SIDE_EFFECT_NAME.to_string()]);
                    }
                }
            }
            Direction::Reverse => {
                for consumer_id in entry.consumers() {
                    let Some(consumer) = self.get(consumer_id) else {
                        trace!(module = entry_id, consumer = consumer_id, "importer has no node");
                        continue;
                    };
                    for (export, reason) in consumer.reasons() {
                        let affected = reason
                            .names_from(entry_id)
                            .iter()
                            .any(|name| selected.iter().any(|sel| name.matches(sel)));
                        if affected {
                            level.select(
                                consumer_id,
                                [export.to_string(), SIDE_EFFECT_NAME.to_string()],
                            );
                        }
                    }
                }
            }
        }

        trace!(module = entry_id, ?direction, children = level.len(), "expanded level");
        Ok(level)
    }
}
