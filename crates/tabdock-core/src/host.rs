//! Host bridge
//!
//! The host process owns the real views. The strip asks it for icons and
//! titles and sends it activate/close/resize intents. Nothing here waits
//! for the host to act on an intent.

use std::future::Future;

use tokio::sync::mpsc;

use tabdock_tabs::{HostRequest, TabId, ViewChange};

pub trait HostBridge: Send + Sync + 'static {
    /// Icon reference for a tab, usually a `data:` URL. `None` or an empty
    /// string means "no update".
    fn get_icon(&self, id: TabId) -> impl Future<Output = Option<String>> + Send;

    /// Current title of a tab. `None` or empty means "no update".
    fn get_title(&self, id: TabId) -> impl Future<Output = Option<String>> + Send;

    /// Fire-and-forget request.
    fn send(&self, request: HostRequest);
}

/// Render surface that receives view changes in the order state changed.
pub trait ViewSink: Send + 'static {
    fn publish(&self, change: ViewChange);
}

impl ViewSink for mpsc::UnboundedSender<ViewChange> {
    fn publish(&self, change: ViewChange) {
        let _ = self.send(change);
    }
}
