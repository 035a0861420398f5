//! Session
//!
//! A session holds everything one visualization needs between user
//! interactions: the impact graph of the latest build, the tree currently
//! shown, the occurrence counter that keeps its ids unique and the version
//! signal the renderer watches.
//!
//! All mutation goes through `&mut self`, so a build or an expansion always
//! runs to completion before anyone can read the tree again. Share a session
//! across tasks as a [`SharedSession`]; its subscribers are notified only
//! once the write lock is released, so a redraw may read the session.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};
use tracing::debug;

use crate::config::{Direction, SessionConfig};
use crate::error::Result;
use crate::graph::{ChangeRecord, ImpactGraph, NextLevel};
use crate::paths;
use crate::reactive::{Signal, SubscriberId};
use crate::tree::{self, OccurrenceCounter, TreeBuilder, TreeNode};
use crate::wire::{self, WireFormat};

/// A session behind a lock, for use from several tasks.
///
/// Clones share one session.
#[derive(Debug, Clone, Default)]
pub struct SharedSession {
    inner: Arc<RwLock<Session>>,
}

impl SharedSession {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Arc::new(RwLock::new(session)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.inner.read()
    }

    pub fn try_read(&self) -> Option<RwLockReadGuard<'_, Session>> {
        self.inner.try_read()
    }

    /// Run `f` with exclusive access to the session.
    ///
    /// Version bumps made by `f` are announced once, after the write lock
    /// is released.
    pub fn update<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Session) -> R,
    {
        let (result, pending) = {
            let mut session = self.inner.write();
            session.defer_notify = true;
            let result = f(&mut session);
            session.defer_notify = false;
            let pending = std::mem::take(&mut session.notify_pending)
                .then(|| session.version.clone());
            (result, pending)
        };
        if let Some(version) = pending {
            version.notify();
        }
        result
    }
}

/// State of one visualization session.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    graph: ImpactGraph,
    root: Option<TreeNode>,
    occurrences: OccurrenceCounter,
    version: Signal<u64>,
    /// Set while a [`SharedSession`] holds the write lock.
    defer_notify: bool,
    notify_pending: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            config: SessionConfig::default(),
            graph: ImpactGraph::new(),
            root: None,
            occurrences: OccurrenceCounter::new(),
            version: Signal::new(0),
            defer_notify: false,
            notify_pending: false,
        }
    }
}

impl Session {
    /// Create an empty session with default config.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SessionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    pub fn into_shared(self) -> SharedSession {
        SharedSession::new(self)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn graph(&self) -> &ImpactGraph {
        &self.graph
    }

    /// The tree currently shown, if a root was selected.
    pub fn root(&self) -> Option<&TreeNode> {
        self.root.as_ref()
    }

    /// Replace the graph with one built from a fresh batch of records.
    ///
    /// The previous graph and the tree built from it are discarded.
    pub fn ingest<I>(&mut self, records: I) -> &ImpactGraph
    where
        I: IntoIterator<Item = ChangeRecord>,
    {
        self.graph = ImpactGraph::from_records(records);
        self.root = None;
        self.occurrences.reset();
        self.bump_version();
        &self.graph
    }

    /// Decode a payload and ingest it. Returns the number of modules.
    ///
    /// A payload that fails to decode leaves the session untouched.
    pub fn ingest_bytes(&mut self, bytes: &[u8], format: WireFormat) -> Result<usize> {
        let records = wire::decode_records(bytes, format)?;
        Ok(self.ingest(records).len())
    }

    pub fn ingest_json(&mut self, json: &str) -> Result<usize> {
        self.ingest_bytes(json.as_bytes(), WireFormat::Json)
    }

    /// Children of a graph node, see [`ImpactGraph::next_level`].
    pub fn next_level(&self, graph_id: &str, direction: Direction) -> Result<NextLevel> {
        self.graph.next_level(graph_id, direction)
    }

    /// Build a new tree rooted at `root_id` and make it the current one.
    ///
    /// On error the current tree and version are kept.
    pub fn build_tree(
        &mut self,
        root_id: &str,
        direction: Direction,
        max_level: usize,
    ) -> Result<&TreeNode> {
        let tree = TreeBuilder::new(&self.graph, &mut self.occurrences, direction, max_level)?
            .build(root_id)?;
        self.bump_version();
        let root: &TreeNode = self.root.insert(tree);
        Ok(root)
    }

    /// Build a tree with the configured direction and depth.
    pub fn build_default_tree(&mut self, root_id: &str) -> Result<&TreeNode> {
        let SessionConfig {
            max_level,
            direction,
        } = self.config.clone();
        self.build_tree(root_id, direction, max_level)
    }

    /// Grow the current tree below the node `tree_id` by one level.
    ///
    /// Returns `Ok(false)` when there is no tree, the node is not in it, or
    /// the node already has children. The version is bumped only when the
    /// tree changed.
    pub fn expand_node(&mut self, tree_id: &str, direction: Direction) -> Result<bool> {
        let Some(root) = self.root.as_mut() else {
            return Ok(false);
        };
        let expanded =
            tree::expand_in_place(root, tree_id, &self.graph, &mut self.occurrences, direction)?;
        if expanded {
            self.bump_version();
        }
        Ok(expanded)
    }

    /// Whether the node `tree_id` would get any children when expanded.
    ///
    /// The renderer uses this to decide whether to draw an expand marker.
    pub fn can_expand(&self, tree_id: &str, direction: Direction) -> bool {
        let graph_id = paths::graph_id_from_tree_id(tree_id);
        self.graph
            .next_level(graph_id, direction)
            .map(|level| !level.is_empty())
            .unwrap_or(false)
    }

    /// Current tree version. Starts at 0 and grows with every change.
    pub fn version(&self) -> u64 {
        self.version.get()
    }

    /// A handle on the version signal, sharing state with the session.
    pub fn version_signal(&self) -> Signal<u64> {
        self.version.clone()
    }

    /// Run `notify` after every version bump.
    pub fn subscribe<F>(&self, notify: F) -> SubscriberId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.version.subscribe(notify)
    }

    pub fn unsubscribe(&self, subscriber_id: SubscriberId) -> bool {
        self.version.unsubscribe(subscriber_id)
    }

    fn bump_version(&mut self) {
        self.version.update_silently(|version| version + 1);
        debug!(version = self.version.get(), "session version bumped");
        if self.defer_notify {
            self.notify_pending = true;
        } else {
            self.version.notify();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ExportReason;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn records() -> Vec<ChangeRecord> {
        let mut a = ChangeRecord::new("a");
        a.imported_ids = vec!["b".into()];
        a.rendered_exports = vec!["x".into()];
        a.export_effected_names_to_reasons
            .insert("x".into(), ExportReason::from_imports([("b", ["y"])]));
        let mut b = ChangeRecord::new("b");
        b.rendered_exports = vec!["y".into()];
        b.is_git_change = true;
        vec![a, b]
    }

    #[test]
    fn ingest_replaces_graph_and_tree() {
        let mut session = Session::new();
        session.ingest(records());
        session.build_tree("a", Direction::Forward, 3).unwrap();
        assert!(session.root().is_some());

        session.ingest(vec![ChangeRecord::new("z")]);
        assert!(session.root().is_none());
        assert_eq!(session.graph().len(), 1);
        assert!(!session.graph().contains("a"));
    }

    #[test]
    fn every_change_bumps_version() {
        let mut session = Session::new();
        assert_eq!(session.version(), 0);
        session.ingest(records());
        assert_eq!(session.version(), 1);
        session.build_tree("a", Direction::Forward, 2).unwrap();
        assert_eq!(session.version(), 2);
        assert!(session.expand_node("b-1", Direction::Forward).unwrap());
        assert_eq!(session.version(), 3);
    }

    #[test]
    fn no_op_expand_keeps_version() {
        let mut session = Session::new();
        session.ingest(records());
        assert!(!session.expand_node("a-1", Direction::Forward).unwrap());

        session.build_tree("a", Direction::Forward, 3).unwrap();
        let version = session.version();
        assert!(!session.expand_node("missing-1", Direction::Forward).unwrap());
        assert!(!session.expand_node("a-1", Direction::Forward).unwrap());
        assert_eq!(session.version(), version);
    }

    #[test]
    fn failed_build_keeps_current_tree() {
        let mut session = Session::new();
        session.ingest(records());
        session.build_tree("a", Direction::Forward, 3).unwrap();
        let version = session.version();

        assert!(session.build_tree("nope", Direction::Forward, 3).is_err());
        assert!(session.build_tree("a", Direction::Forward, 0).is_err());
        assert_eq!(session.root().unwrap().id, "a-1");
        assert_eq!(session.version(), version);
    }

    #[test]
    fn subscribers_hear_about_changes() {
        let mut session = Session::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let id = session.subscribe(move || {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        session.ingest(records());
        session.build_tree("a", Direction::Forward, 3).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        assert!(session.unsubscribe(id));
        session.ingest(records());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(session.version_signal().get(), 3);
    }

    #[test]
    fn shared_subscribers_can_read_the_session() {
        let shared = Session::new().into_shared();
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let reader = shared.clone();
        let seen_clone = seen.clone();
        shared.read().subscribe(move || {
            let session = reader.try_read();
            seen_clone
                .lock()
                .push(session.map(|s| (s.version(), s.graph().len())));
        });

        let nodes = shared.update(|session| {
            session.ingest(records());
            session.build_tree("a", Direction::Forward, 2).unwrap();
            session.expand_node("b-1", Direction::Forward).unwrap();
            session.graph().len()
        });

        assert_eq!(nodes, 2);
        assert_eq!(*seen.lock(), vec![Some((3, 2))]);
    }

    #[test]
    fn shared_update_without_changes_is_silent() {
        let shared = Session::new().into_shared();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        shared.read().subscribe(move || {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        let expanded = shared.update(|session| session.expand_node("a-1", Direction::Forward));
        assert!(!expanded.unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        shared.update(|session| session.ingest(records()).len());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn default_tree_uses_config() {
        let config = SessionConfig {
            max_level: 1,
            direction: Direction::Reverse,
        };
        let mut session = Session::with_config(config).unwrap();
        session.ingest(records());
        let root = session.build_default_tree("b").unwrap();
        assert!(root.collapsed);
        assert!(session.can_expand("b-1", Direction::Reverse));
    }

    #[test]
    fn can_expand_checks_next_level() {
        let mut session = Session::new();
        session.ingest(records());
        assert!(session.can_expand("a-1", Direction::Forward));
        assert!(!session.can_expand("b-1", Direction::Forward));
        assert!(session.can_expand("b-4", Direction::Reverse));
        assert!(!session.can_expand("ghost-1", Direction::Forward));
    }

    #[test]
    fn ingest_json_rejects_bad_payload_without_clearing() {
        let mut session = Session::new();
        session.ingest(records());
        assert!(session.ingest_json("[{").is_err());
        assert_eq!(session.graph().len(), 2);
        assert_eq!(
            session.ingest_json(r#"[{"relativeId": "only"}]"#).unwrap(),
            1
        );
    }
}
