//! Tab data structure
//!
//! One entry in the strip: icon, title, active flag, hover flag and the
//! drag reentrancy counter used to debounce nested enter/leave events.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use url::Url;

use crate::effect::TimerToken;

/// Host-assigned tab identifier. Unique among open tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(u64);

impl TabId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for TabId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Image shown next to the title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Icon {
    /// Generated badge used until the host supplies a real image
    Placeholder { initial: char },
    /// Host-supplied image reference (usually a `data:` URL)
    Image(Url),
}

impl Icon {
    pub fn placeholder(title: &str) -> Self {
        let initial = title
            .chars()
            .find(|c| c.is_alphanumeric())
            .and_then(|c| c.to_uppercase().next())
            .unwrap_or('T');
        Icon::Placeholder { initial }
    }

    /// Parse an icon reference returned by the host. Empty means "no update".
    pub fn from_host(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }

        match Url::parse(value) {
            Ok(url) => Some(Icon::Image(url)),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unparseable icon reference");
                None
            }
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Icon::Placeholder { .. })
    }

    /// Image source for the render surface
    pub fn src(&self) -> String {
        match self {
            Icon::Placeholder { initial } => {
                let mut buf = [0u8; 4];
                let text: String =
                    url::form_urlencoded::byte_serialize(initial.encode_utf8(&mut buf).as_bytes())
                        .collect();
                format!(
                    "data:image/svg+xml;charset=utf8,\
                     %3Csvg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 50 50'%3E\
                     %3Ccircle cx='25' cy='25' r='25' fill='%23357a8c'/%3E\
                     %3Ctext x='25' y='25' text-anchor='middle' dominant-baseline='middle' \
                     font-size='24' fill='%23eee'%3E{text}%3C/text%3E%3C/svg%3E"
                )
            }
            Icon::Image(url) => url.as_str().to_string(),
        }
    }
}

impl Serialize for Icon {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.src())
    }
}

#[derive(Debug, Clone)]
pub struct Tab {
    id: TabId,
    /// Display name
    title: String,
    icon: Icon,
    /// At most one tab in a list is active; the controller enforces it
    active: bool,
    /// Pointer is currently over this tab
    hovering: bool,
    /// Nested drag-enter events not yet matched by a drag-leave
    drag_depth: u32,
    /// Pending hover-to-activate timer, if armed
    hover_timer: Option<TimerToken>,
}

impl Tab {
    pub(crate) fn new(id: TabId, title: String) -> Self {
        Self {
            id,
            icon: Icon::placeholder(&title),
            title,
            active: false,
            hovering: false,
            drag_depth: 0,
            hover_timer: None,
        }
    }

    pub fn id(&self) -> TabId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn icon(&self) -> &Icon {
        &self.icon
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    pub fn drag_depth(&self) -> u32 {
        self.drag_depth
    }

    pub fn hover_timer(&self) -> Option<TimerToken> {
        self.hover_timer
    }

    pub(crate) fn activate(&mut self) {
        tracing::debug!(tab_id = %self.id, "Tab activated");
        self.active = true;
    }

    pub(crate) fn deactivate(&mut self) {
        tracing::debug!(tab_id = %self.id, "Tab deactivated");
        self.active = false;
    }

    pub(crate) fn set_hovering(&mut self, hovering: bool) {
        self.hovering = hovering;
    }

    pub(crate) fn set_title(&mut self, title: String) {
        self.title = title;
    }

    pub(crate) fn set_icon(&mut self, icon: Icon) {
        self.icon = icon;
    }

    /// Count a drag-enter. Returns true on the 0 -> 1 transition.
    pub(crate) fn drag_entered(&mut self) -> bool {
        self.drag_depth += 1;
        self.drag_depth == 1
    }

    /// Count a drag-leave. Returns true when the counter reaches exactly 0.
    /// An unmatched leave at 0 is absorbed and is not a transition.
    pub(crate) fn drag_left(&mut self) -> bool {
        if self.drag_depth == 0 {
            return false;
        }
        self.drag_depth -= 1;
        self.drag_depth == 0
    }

    pub(crate) fn reset_drag_depth(&mut self) {
        self.drag_depth = 0;
    }

    pub(crate) fn arm_hover_timer(&mut self, token: TimerToken) -> Option<TimerToken> {
        self.hover_timer.replace(token)
    }

    pub(crate) fn take_hover_timer(&mut self) -> Option<TimerToken> {
        self.hover_timer.take()
    }
}
