//! Drag session and drop geometry

use serde::{Deserialize, Serialize};

use crate::state::DragPhase;
use crate::tab::TabId;

/// What a drag carries, as far as the tab list is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragPayload {
    /// A tab from this strip
    Tab,
    /// Anything else: files, text, tabs of another application
    External,
}

impl DragPayload {
    /// Classify a drag by the data types it advertises.
    pub fn classify<S: AsRef<str>>(types: &[S], tab_drag_type: &str) -> Self {
        if types.iter().any(|t| t.as_ref() == tab_drag_type) {
            DragPayload::Tab
        } else {
            DragPayload::External
        }
    }

    pub fn is_tab(&self) -> bool {
        matches!(self, DragPayload::Tab)
    }
}

/// Bounding box of a tab on the render surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn mid_y(&self) -> f32 {
        self.y + self.height / 2.0
    }
}

/// Where the dragged tab lands relative to the hovered one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Before,
    After,
}

impl Placement {
    /// Below the vertical midpoint means after; at or above means before.
    pub fn for_pointer(bounds: &Bounds, pointer_y: f32) -> Self {
        if pointer_y > bounds.mid_y() {
            Placement::After
        } else {
            Placement::Before
        }
    }
}

/// Ephemeral state between drag start and drag end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragSession {
    tab: TabId,
    phase: DragPhase,
}

impl DragSession {
    pub(crate) fn new(tab: TabId) -> Self {
        Self {
            tab,
            phase: DragPhase::Lifting,
        }
    }

    pub fn tab(&self) -> TabId {
        self.tab
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    /// Returns true if the phase actually changed.
    pub(crate) fn advance(&mut self, phase: DragPhase) -> bool {
        if self.phase == phase || !self.phase.can_transition_to(phase) {
            return false;
        }
        tracing::debug!(tab_id = %self.tab, from = %self.phase, to = %phase, "Drag phase transition");
        self.phase = phase;
        true
    }
}
