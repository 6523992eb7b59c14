//! Drag phase
//!
//! ```text
//! drag start
//!   ↓
//! Lifting      (glued to the pointer, not yet styled as moving)
//!   ↓ next tick
//! InMotion
//!   ↓ drag end
//! (session cleared)
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragPhase {
    /// Drag just started; the tab is still rendered as settled
    Lifting,
    /// Drag is under way; the tab is rendered as moving
    InMotion,
}

impl DragPhase {
    pub fn can_transition_to(&self, target: DragPhase) -> bool {
        match (self, target) {
            (DragPhase::Lifting, DragPhase::InMotion) => true,
            (a, b) if *a == b => true,
            _ => false,
        }
    }

    pub fn is_in_motion(&self) -> bool {
        matches!(self, DragPhase::InMotion)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DragPhase::Lifting => "lifting",
            DragPhase::InMotion => "in_motion",
        }
    }
}

impl std::fmt::Display for DragPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
