//! Host bridge over stdio
//!
//! Requests are written out and forgotten. Icon and title pulls get a
//! sequence number and wait for the matching `reply` line.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use tabdock_core::{Fetch, HostBridge, HostRequest, TabId, ViewChange, ViewSink};

use crate::protocol::Outbound;

/// Pulls waiting for a reply, keyed by sequence number. `None` once the
/// bridge is shutting down; no new pulls are opened after that.
pub struct PendingPulls {
    next_seq: AtomicU64,
    waiting: Mutex<Option<HashMap<u64, oneshot::Sender<Option<String>>>>>,
}

impl Default for PendingPulls {
    fn default() -> Self {
        Self {
            next_seq: AtomicU64::new(0),
            waiting: Mutex::new(Some(HashMap::new())),
        }
    }
}

impl PendingPulls {
    fn open(&self) -> Option<(u64, oneshot::Receiver<Option<String>>)> {
        let mut waiting = self.waiting.lock();
        let waiting = waiting.as_mut()?;

        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed) + 1;
        let (tx, rx) = oneshot::channel();
        waiting.insert(seq, tx);
        Some((seq, rx))
    }

    fn forget(&self, seq: u64) {
        if let Some(waiting) = self.waiting.lock().as_mut() {
            waiting.remove(&seq);
        }
    }

    /// Hand a reply to its waiting pull. Returns false for an unknown seq.
    pub fn resolve(&self, seq: u64, value: Option<String>) -> bool {
        let pending = self
            .waiting
            .lock()
            .as_mut()
            .and_then(|waiting| waiting.remove(&seq));

        match pending {
            Some(tx) => {
                let _ = tx.send(value);
                true
            }
            None => false,
        }
    }

    /// Fail every outstanding pull with "no update" and refuse new ones.
    pub fn cancel_all(&self) {
        self.waiting.lock().take();
    }
}

#[derive(Clone)]
pub struct StdioHost {
    out: mpsc::UnboundedSender<Outbound>,
    pulls: Arc<PendingPulls>,
}

impl StdioHost {
    pub fn new(out: mpsc::UnboundedSender<Outbound>) -> Self {
        Self {
            out,
            pulls: Arc::new(PendingPulls::default()),
        }
    }

    pub fn pulls(&self) -> Arc<PendingPulls> {
        Arc::clone(&self.pulls)
    }

    async fn pull(&self, fetch: Fetch) -> Option<String> {
        let Some((seq, reply)) = self.pulls.open() else {
            tracing::debug!(?fetch, "Bridge closing, skipping pull");
            return None;
        };

        if self.out.send(Outbound::Pull { seq, fetch }).is_err() {
            self.pulls.forget(seq);
            return None;
        }

        // a dropped sender means the bridge is shutting down
        reply.await.ok().flatten()
    }
}

impl HostBridge for StdioHost {
    async fn get_icon(&self, id: TabId) -> Option<String> {
        self.pull(Fetch::GetIcon { id }).await
    }

    async fn get_title(&self, id: TabId) -> Option<String> {
        self.pull(Fetch::GetTitle { id }).await
    }

    fn send(&self, request: HostRequest) {
        if self.out.send(Outbound::Request(request)).is_err() {
            tracing::warn!(?request, "Output closed, dropping host request");
        }
    }
}

/// View changes share the output stream with requests, so the host sees
/// them in the order the strip produced them.
impl ViewSink for StdioHost {
    fn publish(&self, change: ViewChange) {
        let _ = self.out.send(Outbound::View(change));
    }
}
