//! Effects emitted by the controller
//!
//! The controller never talks to the host, clocks or the render surface
//! directly. Each handler queues effects, and the runtime drains and executes
//! them in order after the handler returns.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::tab::{Icon, TabId};

/// Fire-and-forget intent sent to the host. State only changes when the host
/// pushes the matching command back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "request", rename_all = "snake_case")]
pub enum HostRequest {
    ActivateTab { id: TabId },
    CloseTab { id: TabId },
    HorizontalResize { delta: i32 },
}

/// Asynchronous pull from the host whose result is applied later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "request", rename_all = "snake_case")]
pub enum Fetch {
    GetIcon { id: TabId },
    GetTitle { id: TabId },
}

impl Fetch {
    pub fn tab(&self) -> TabId {
        match self {
            Fetch::GetIcon { id } | Fetch::GetTitle { id } => *id,
        }
    }
}

/// Identifies one armed hover-activation timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

impl TimerToken {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TimerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEffect {
    /// Start the hover delay for `tab`; report expiry with `token`
    Arm { tab: TabId, token: TimerToken },
    Cancel { token: TimerToken },
}

/// Render-surface notification, published in the order state changed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewChange {
    Inserted {
        id: TabId,
        index: usize,
        title: String,
        icon: Icon,
    },
    Removed {
        id: TabId,
    },
    Activated {
        id: TabId,
    },
    Deactivated {
        id: TabId,
    },
    Moved {
        id: TabId,
        index: usize,
    },
    IconChanged {
        id: TabId,
        icon: Icon,
    },
    TitleChanged {
        id: TabId,
        title: String,
    },
    DragStyle {
        id: TabId,
        in_motion: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Request(HostRequest),
    Fetch(Fetch),
    Timer(TimerEffect),
    /// Advance the drag to `InMotion` on the next tick
    SettleDrag,
    View(ViewChange),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let json = serde_json::to_value(HostRequest::CloseTab { id: TabId::new(42) }).unwrap();
        assert_eq!(json, serde_json::json!({"request": "close_tab", "id": 42}));

        let json = serde_json::to_value(Fetch::GetIcon { id: TabId::new(5) }).unwrap();
        assert_eq!(json, serde_json::json!({"request": "get_icon", "id": 5}));
    }

    #[test]
    fn test_view_wire_shape() {
        let json = serde_json::to_value(ViewChange::DragStyle {
            id: TabId::new(1),
            in_motion: true,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"view": "drag_style", "id": 1, "in_motion": true})
        );
    }
}
