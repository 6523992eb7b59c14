//! Host commands and UI input events
//!
//! Host commands are authoritative and answered with a [`CommandResult`].
//! Input events come from the render surface and are never answered.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

use tabdock_tabs::{Bounds, MenuItem, TabId};

/// Commands the host pushes into the strip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum HostCommand {
    CreateTab { title: String, id: TabId },
    RemoveTab { id: TabId },
    ActivateTab { id: TabId },
    GetContextMenu,
    ExecuteMenuItem { key: String },
}

impl HostCommand {
    pub fn name(&self) -> &'static str {
        match self {
            HostCommand::CreateTab { .. } => "create_tab",
            HostCommand::RemoveTab { .. } => "remove_tab",
            HostCommand::ActivateTab { .. } => "activate_tab",
            HostCommand::GetContextMenu => "get_context_menu",
            HostCommand::ExecuteMenuItem { .. } => "execute_menu_item",
        }
    }
}

/// Pointer, drag and resize input from the render surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InputEvent {
    Click {
        id: TabId,
    },
    CloseClicked {
        id: TabId,
    },
    PointerEnter {
        id: TabId,
    },
    PointerLeave {
        id: TabId,
    },
    DragStart {
        id: TabId,
    },
    DragEnter {
        id: TabId,
        /// Data types advertised by the drag
        #[serde(default)]
        types: Vec<String>,
    },
    DragOver {
        id: TabId,
        #[serde(default)]
        types: Vec<String>,
        pointer_y: f32,
        bounds: Bounds,
    },
    DragLeave {
        id: TabId,
    },
    Drop {
        id: TabId,
    },
    DragEnd,
    ResizeStart {
        client_x: i32,
    },
    ResizeMove {
        screen_x: i32,
    },
    ResizeEnd,
}

/// What a successful command returns
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CommandOutput {
    Done,
    /// `None` tells the host to suppress the menu
    Menu(Option<Vec<MenuItem>>),
}

#[derive(Debug, Serialize)]
pub struct CommandResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

impl<T, E: Display> From<Result<T, E>> for CommandResult<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => CommandResult::ok(data),
            Err(e) => CommandResult::err(e.to_string()),
        }
    }
}
