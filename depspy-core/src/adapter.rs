//! Adapter Contract
//!
//! Bundler adapters feed the engine. This module holds the small pieces
//! every adapter shares: the per-module facts it must provide, the trait to
//! look them up, and the two derivations adapters do before handing data
//! over (splitting provided exports by usage and folding re-exported
//! modules into their re-exporter).

use std::collections::HashMap;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{DepSpyError, Result};
use crate::graph::ChangeRecord;

/// What a bundler knows about one parsed module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleInfo {
    #[serde(default)]
    pub imported_ids: Vec<String>,
    #[serde(default)]
    pub dynamically_imported_ids: Vec<String>,
    #[serde(default)]
    pub removed_exports: Vec<String>,
    #[serde(default)]
    pub rendered_exports: Vec<String>,
}

impl ModuleInfo {
    /// Start a record for `relative_id` from these facts. Change flags and
    /// reasons are left for the caller.
    pub fn into_record(self, relative_id: impl Into<String>) -> ChangeRecord {
        ChangeRecord {
            imported_ids: self.imported_ids,
            dynamically_imported_ids: self.dynamically_imported_ids,
            removed_exports: self.removed_exports,
            rendered_exports: self.rendered_exports,
            ..ChangeRecord::new(relative_id)
        }
    }
}

/// Lookup of module facts by resolved module id.
pub trait ModuleInfoSource {
    /// Fails with [`DepSpyError::ModuleNotParsed`] when the id does not
    /// resolve to a parsed module.
    fn module_info(&self, module_id: &str) -> Result<ModuleInfo>;
}

impl ModuleInfoSource for HashMap<String, ModuleInfo> {
    fn module_info(&self, module_id: &str) -> Result<ModuleInfo> {
        self.get(module_id)
            .cloned()
            .ok_or_else(|| DepSpyError::ModuleNotParsed(module_id.to_string()))
    }
}

/// Which exports of a module the bundler kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsedExports {
    All,
    Nothing,
    Names(IndexSet<String>),
}

impl UsedExports {
    pub fn is_used(&self, export: &str) -> bool {
        match self {
            Self::All => true,
            Self::Nothing => false,
            Self::Names(names) => names.contains(export),
        }
    }
}

/// Split provided exports into `(rendered, removed)` by usage.
pub fn partition_exports(provided: &[String], used: &UsedExports) -> (Vec<String>, Vec<String>) {
    provided
        .iter()
        .cloned()
        .partition(|export| used.is_used(export))
}

/// Facts for `module_id` with the exports of the modules it re-exports
/// folded in.
///
/// A re-exported module that did not parse contributes nothing; the
/// re-exporting module itself must resolve.
pub fn resolve_reexports<S>(source: &S, module_id: &str, reexported_ids: &[String]) -> Result<ModuleInfo>
where
    S: ModuleInfoSource + ?Sized,
{
    let mut info = source.module_info(module_id)?;
    let mut rendered: IndexSet<String> = info.rendered_exports.drain(..).collect();
    let mut removed: IndexSet<String> = info.removed_exports.drain(..).collect();

    for reexported in reexported_ids {
        match source.module_info(reexported) {
            Ok(child) => {
                rendered.extend(child.rendered_exports);
                removed.extend(child.removed_exports);
            }
            Err(DepSpyError::ModuleNotParsed(id)) => {
                trace!(module = module_id, reexported = %id, "re-exported module not parsed");
            }
            Err(err) => return Err(err),
        }
    }

    info.rendered_exports = rendered.into_iter().collect();
    info.removed_exports = removed.into_iter().collect();
    Ok(info)
}
