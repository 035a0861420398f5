//! Bundle Collector
//!
//! Build plugins send their module records in chunks. The collector buffers
//! chunks until the build says it is done and then replaces the session's
//! graph in one step, so readers never see a partially ingested build.
//!
//! # Protocol
//!
//! - `Chunk` / `Payload` append records to the pending build.
//! - `Finish` ingests the pending build and starts a new one.
//! - A payload that fails to decode poisons the pending build: it is dropped
//!   at the next `Finish` instead of being ingested with holes.
//! - Closing the channel drops any pending build.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::graph::ChangeRecord;
use crate::session::SharedSession;
use crate::wire::{self, WireFormat};

/// A message from a build plugin.
#[derive(Debug, Clone)]
pub enum CollectMessage {
    /// Records already decoded by the transport.
    Chunk(Vec<ChangeRecord>),
    /// An encoded chunk of records.
    Payload { bytes: Vec<u8>, format: WireFormat },
    /// The build sent everything.
    Finish,
}

/// Accumulates chunks of one build before handing them to a session.
pub struct BundleCollector {
    session: SharedSession,
    pending: Vec<ChangeRecord>,
    poisoned: bool,
}

impl BundleCollector {
    pub fn new(session: SharedSession) -> Self {
        Self {
            session,
            pending: Vec::new(),
            poisoned: false,
        }
    }

    /// Records buffered for the build in progress.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Apply one message. Returns `true` when a build was ingested.
    pub fn handle(&mut self, message: CollectMessage) -> bool {
        match message {
            CollectMessage::Chunk(records) => {
                debug!(records = records.len(), "received chunk");
                self.pending.extend(records);
                false
            }
            CollectMessage::Payload { bytes, format } => {
                match wire::decode_records(&bytes, format) {
                    Ok(records) => {
                        debug!(records = records.len(), ?format, "decoded chunk");
                        self.pending.extend(records);
                    }
                    Err(err) => {
                        warn!(error = %err, "dropping build with undecodable chunk");
                        self.poisoned = true;
                    }
                }
                false
            }
            CollectMessage::Finish => self.finish(),
        }
    }

    /// Ingest the pending build unless it was poisoned.
    pub fn finish(&mut self) -> bool {
        let records = std::mem::take(&mut self.pending);
        if std::mem::take(&mut self.poisoned) {
            warn!(records = records.len(), "discarded poisoned build");
            return false;
        }

        let (nodes, version) = self.session.update(|session| {
            let nodes = session.ingest(records).len();
            (nodes, session.version())
        });
        debug!(nodes, version, "collected build ingested");
        true
    }

    /// Drain `rx` until it closes. Returns the number of builds ingested.
    pub async fn run(mut self, mut rx: mpsc::Receiver<CollectMessage>) -> usize {
        let mut builds = 0;
        while let Some(message) = rx.recv().await {
            if self.handle(message) {
                builds += 1;
            }
        }
        if !self.pending.is_empty() {
            warn!(records = self.pending.len(), "channel closed mid-build, discarding");
        }
        builds
    }
}

/// Spawn a collector task feeding `session`.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_collector(
    session: SharedSession,
    capacity: usize,
) -> (mpsc::Sender<CollectMessage>, JoinHandle<usize>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let handle = tokio::spawn(BundleCollector::new(session).run(rx));
    (tx, handle)
}
