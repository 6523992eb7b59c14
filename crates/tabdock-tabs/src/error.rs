//! Tab error types

use thiserror::Error;

use crate::tab::TabId;

/// Contract violations by the host. Both mean the host and the tab list
/// have desynchronized, so they are surfaced instead of ignored.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TabError {
    #[error("Tab id {0} already exists")]
    DuplicateId(TabId),

    #[error("Invalid tab id {0}")]
    UnknownId(TabId),
}
