//! tabdock Core
//!
//! Runtime coordination for one tab strip: configuration, the host bridge
//! seam, the command vocabulary and the event loop that executes the
//! controller's effects.

mod command;
mod config;
mod error;
mod host;
mod resize;
mod strip;

pub use command::{CommandOutput, CommandResult, HostCommand, InputEvent};
pub use config::{Config, MenuConfig};
pub use error::CoreError;
pub use host::{HostBridge, ViewSink};
pub use resize::ResizeDrag;
pub use strip::{StripEvent, StripHandle, TabSnapshot, TabStrip};

// Re-export the tab list
pub use tabdock_tabs::{
    Bounds, DragPayload, Effect, Fetch, HostRequest, Icon, MenuAction, MenuItem, Tab, TabError,
    TabId, TabListController, ViewChange,
};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging. `RUST_LOG` overrides `filter`. Output goes to stderr
/// so stdout stays free for the host protocol.
pub fn init_logging(filter: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
