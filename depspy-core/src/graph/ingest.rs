//! Ingestion
//!
//! Turns the flat batch of records sent by a build into an [`ImpactGraph`].
//!
//! # Algorithm
//!
//! 1. Index the records by id. A later record with the same id replaces the
//!    earlier one.
//! 2. Walk every record's static and dynamic imports once, adding the record
//!    id to the importer accumulator of each imported id.
//! 3. Merge each record with its accumulated importers (empty when nothing
//!    imports it) and classify it by its change flags.
//!
//! Accumulation only ever inserts into sets, so the resulting graph does not
//! depend on the order of the batch.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, warn};

use super::impact::ImpactGraph;
use super::node::{ChangeRecord, GraphNode};

/// Reverse edges collected for one imported id.
#[derive(Debug, Default)]
struct Importers {
    importers: IndexSet<String>,
    dynamic_importers: IndexSet<String>,
}

impl ImpactGraph {
    /// Build a graph from one batch of records.
    ///
    /// For a batch with unique ids the graph is the same in any order. When
    /// two records share an id the later one replaces the earlier one, so
    /// such a batch does depend on its order.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = ChangeRecord>,
    {
        let mut by_id: IndexMap<String, ChangeRecord> = IndexMap::new();
        for record in records {
            let overlap = record
                .rendered_exports
                .iter()
                .filter(|name| record.removed_exports.contains(name))
                .count();
            if overlap > 0 {
                warn!(
                    module = %record.relative_id,
                    overlap,
                    "exports reported as both rendered and removed, keeping them as rendered"
                );
            }
            if let Some(previous) = by_id.insert(record.relative_id.clone(), record) {
                warn!(module = %previous.relative_id, "duplicate record replaced by a later one");
            }
        }

        let mut reverse: IndexMap<String, Importers> = IndexMap::new();
        for (id, record) in &by_id {
            for child in &record.imported_ids {
                reverse
                    .entry(child.clone())
                    .or_default()
                    .importers
                    .insert(id.clone());
            }
            for child in &record.dynamically_imported_ids {
                reverse
                    .entry(child.clone())
                    .or_default()
                    .dynamic_importers
                    .insert(id.clone());
            }
        }

        let mut graph = ImpactGraph::new();
        for (id, record) in by_id {
            let Importers {
                importers,
                dynamic_importers,
            } = reverse.swap_remove(&id).unwrap_or_default();

            if record.is_git_change {
                graph.git_changes.insert(id.clone());
            }
            if record.is_import_change {
                graph.import_changes.insert(id.clone());
            }
            if record.is_side_effect_change {
                graph.side_effect_changes.insert(id.clone());
            }

            let node = GraphNode::from_record(record, importers, dynamic_importers);
            graph.nodes.insert(id, Arc::new(node));
        }

        debug!(
            nodes = graph.len(),
            edges = graph.edge_count(),
            git_changes = graph.git_changes.len(),
            import_changes = graph.import_changes.len(),
            dangling = reverse.len(),
            "ingested impact graph"
        );

        graph
    }
}
