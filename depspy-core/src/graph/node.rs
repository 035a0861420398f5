//! Graph Nodes
//!
//! This module defines the raw per-module records a build sends over and the
//! normalized node type that lives in the impact graph.

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::WILDCARD;

/// A name imported from an upstream module, as recorded in a reason.
///
/// On the wire this is a plain string; `"*"` means any change to the import
/// affects the export.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ImportedName {
    Named(String),
    Any,
}

impl ImportedName {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::Any => WILDCARD,
        }
    }

    /// Whether this import would carry a change of `export` across the edge.
    pub fn matches(&self, export: &str) -> bool {
        match self {
            Self::Named(name) => name == export,
            Self::Any => true,
        }
    }
}

impl From<String> for ImportedName {
    fn from(name: String) -> Self {
        if name == WILDCARD {
            Self::Any
        } else {
            Self::Named(name)
        }
    }
}

impl From<&str> for ImportedName {
    fn from(name: &str) -> Self {
        Self::from(name.to_string())
    }
}

impl From<ImportedName> for String {
    fn from(name: ImportedName) -> Self {
        match name {
            ImportedName::Named(name) => name,
            ImportedName::Any => WILDCARD.to_string(),
        }
    }
}

impl fmt::Display for ImportedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names imported from one upstream module. Usually one or two.
pub type ImportedNames = SmallVec<[ImportedName; 4]>;

/// Why one export of a module changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReason {
    /// Upstream module id to the names imported from it that changed the export.
    #[serde(default)]
    pub import_effected_names: IndexMap<String, ImportedNames>,
}

impl ExportReason {
    /// Build a reason from `(upstream id, names)` pairs.
    pub fn from_imports<I, S, N>(imports: I) -> Self
    where
        I: IntoIterator<Item = (S, N)>,
        S: Into<String>,
        N: IntoIterator,
        N::Item: Into<ImportedName>,
    {
        Self {
            import_effected_names: imports
                .into_iter()
                .map(|(id, names)| (id.into(), names.into_iter().map(Into::into).collect()))
                .collect(),
        }
    }

    /// Names imported from `upstream_id` that this export depends on.
    pub fn names_from(&self, upstream_id: &str) -> &[ImportedName] {
        self.import_effected_names
            .get(upstream_id)
            .map(|names| names.as_slice())
            .unwrap_or(&[])
    }
}

/// One module as reported by a build.
///
/// Every collection defaults to empty when absent from the payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    pub relative_id: String,
    #[serde(default)]
    pub imported_ids: Vec<String>,
    #[serde(default)]
    pub dynamically_imported_ids: Vec<String>,
    #[serde(default)]
    pub removed_exports: Vec<String>,
    #[serde(default)]
    pub rendered_exports: Vec<String>,
    #[serde(default)]
    pub is_git_change: bool,
    #[serde(default)]
    pub is_import_change: bool,
    #[serde(default)]
    pub is_side_effect_change: bool,
    #[serde(default)]
    pub export_effected_names_to_reasons: IndexMap<String, ExportReason>,
}

impl ChangeRecord {
    /// A record with no edges, exports or change flags.
    pub fn new(relative_id: impl Into<String>) -> Self {
        Self {
            relative_id: relative_id.into(),
            ..Self::default()
        }
    }
}

/// A module in the impact graph.
///
/// Reverse edges (`importers`, `dynamic_importers`) are derived during
/// ingestion and can not be supplied by a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    relative_id: String,
    imported_ids: Vec<String>,
    dynamically_imported_ids: Vec<String>,
    importers: IndexSet<String>,
    dynamic_importers: IndexSet<String>,
    rendered_exports: IndexSet<String>,
    removed_exports: IndexSet<String>,
    is_git_change: bool,
    is_import_change: bool,
    is_side_effect_change: bool,
    export_effected_names_to_reasons: IndexMap<String, ExportReason>,
}

impl GraphNode {
    /// Normalize a record and attach the reverse edges collected for it.
    ///
    /// Import lists are de-duplicated keeping the first occurrence. A name
    /// reported as both rendered and removed survived the build, so it is
    /// kept as rendered only.
    pub(crate) fn from_record(
        record: ChangeRecord,
        importers: IndexSet<String>,
        dynamic_importers: IndexSet<String>,
    ) -> Self {
        let rendered_exports: IndexSet<String> = record.rendered_exports.into_iter().collect();
        let removed_exports: IndexSet<String> = record
            .removed_exports
            .into_iter()
            .filter(|name| !rendered_exports.contains(name))
            .collect();

        Self {
            relative_id: record.relative_id,
            imported_ids: dedup(record.imported_ids),
            dynamically_imported_ids: dedup(record.dynamically_imported_ids),
            importers,
            dynamic_importers,
            rendered_exports,
            removed_exports,
            is_git_change: record.is_git_change,
            is_import_change: record.is_import_change,
            is_side_effect_change: record.is_side_effect_change,
            export_effected_names_to_reasons: record.export_effected_names_to_reasons,
        }
    }

    pub fn id(&self) -> &str {
        &self.relative_id
    }

    pub fn imported_ids(&self) -> &[String] {
        &self.imported_ids
    }

    pub fn dynamically_imported_ids(&self) -> &[String] {
        &self.dynamically_imported_ids
    }

    pub fn importers(&self) -> &IndexSet<String> {
        &self.importers
    }

    pub fn dynamic_importers(&self) -> &IndexSet<String> {
        &self.dynamic_importers
    }

    pub fn rendered_exports(&self) -> &IndexSet<String> {
        &self.rendered_exports
    }

    pub fn removed_exports(&self) -> &IndexSet<String> {
        &self.removed_exports
    }

    pub fn is_git_change(&self) -> bool {
        self.is_git_change
    }

    pub fn is_import_change(&self) -> bool {
        self.is_import_change
    }

    pub fn is_side_effect_change(&self) -> bool {
        self.is_side_effect_change
    }

    /// The recorded reason for a changed export, if any.
    pub fn reason(&self, export: &str) -> Option<&ExportReason> {
        self.export_effected_names_to_reasons.get(export)
    }

    pub fn reasons(&self) -> impl Iterator<Item = (&str, &ExportReason)> {
        self.export_effected_names_to_reasons
            .iter()
            .map(|(name, reason)| (name.as_str(), reason))
    }

    /// Static then dynamic imports, each id once.
    pub fn imports(&self) -> IndexSet<&str> {
        self.imported_ids
            .iter()
            .chain(&self.dynamically_imported_ids)
            .map(String::as_str)
            .collect()
    }

    /// Static then dynamic importers, each id once.
    pub fn consumers(&self) -> IndexSet<&str> {
        self.importers
            .iter()
            .chain(&self.dynamic_importers)
            .map(String::as_str)
            .collect()
    }

    /// Number of distinct forward edges leaving this node.
    pub fn out_degree(&self) -> usize {
        self.imported_ids.len() + self.dynamically_imported_ids.len()
    }
}

fn dedup(ids: Vec<String>) -> Vec<String> {
    ids.into_iter().collect::<IndexSet<_>>().into_iter().collect()
}
