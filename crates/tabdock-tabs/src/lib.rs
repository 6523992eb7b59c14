//! tabdock Tab List
//!
//! The ordered set of tabs mirrored from the host, plus the UI-only state
//! layered on top of it: hover, drag sessions and the pending menu target.
//! The host owns which views exist. This crate only reflects its push
//! commands and turns user input into requests.

mod controller;
mod drag;
mod effect;
mod error;
mod menu;
mod state;
mod tab;

pub use controller::TabListController;
pub use drag::{Bounds, DragPayload, DragSession, Placement};
pub use effect::{Effect, Fetch, HostRequest, TimerEffect, TimerToken, ViewChange};
pub use error::TabError;
pub use menu::{MenuAction, MenuItem};
pub use state::DragPhase;
pub use tab::{Icon, Tab, TabId};

pub type Result<T> = std::result::Result<T, TabError>;
