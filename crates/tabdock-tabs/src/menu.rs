//! Context menu actions
//!
//! The host surfaces the native popup. It asks the tab list for the items
//! when the menu opens and feeds the chosen key back afterwards.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuAction {
    /// Close the targeted tab
    Close,
    /// Close every tab except the targeted one
    CloseOthers,
    /// Close every tab
    CloseAll,
    /// Re-fetch icon and title of the targeted tab
    ReloadIconTitle,
}

impl MenuAction {
    /// Actions offered on every tab, in menu order
    pub const STANDARD: [MenuAction; 3] = [
        MenuAction::Close,
        MenuAction::CloseOthers,
        MenuAction::CloseAll,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            MenuAction::Close => "close",
            MenuAction::CloseOthers => "close_others",
            MenuAction::CloseAll => "close_all",
            MenuAction::ReloadIconTitle => "reload_icon_title",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::Close => "Close Tab",
            MenuAction::CloseOthers => "Close Others",
            MenuAction::CloseAll => "Close All",
            MenuAction::ReloadIconTitle => "Reload Icon & Title",
        }
    }

    /// Look up an action by key. Unknown keys are not an error.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "close" => Some(MenuAction::Close),
            "close_others" => Some(MenuAction::CloseOthers),
            "close_all" => Some(MenuAction::CloseAll),
            "reload_icon_title" => Some(MenuAction::ReloadIconTitle),
            _ => None,
        }
    }

    pub fn item(&self) -> MenuItem {
        MenuItem {
            key: *self,
            label: self.label().to_string(),
        }
    }
}

impl std::fmt::Display for MenuAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// One entry of the popup as handed to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub key: MenuAction,
    pub label: String,
}
