//! Line protocol between the host process and the bridge
//!
//! One JSON object per line, tagged by `"type"`.

use serde::{Deserialize, Serialize};

use tabdock_core::{
    CommandOutput, CommandResult, Fetch, HostCommand, HostRequest, InputEvent, ViewChange,
};

/// Lines read from stdin
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inbound {
    Command {
        seq: u64,
        #[serde(flatten)]
        command: HostCommand,
    },
    Input {
        #[serde(flatten)]
        event: InputEvent,
    },
    /// Answer to a `pull` we sent earlier
    Reply {
        seq: u64,
        #[serde(default)]
        value: Option<String>,
    },
}

impl Inbound {
    pub fn parse(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}

/// Lines written to stdout
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outbound {
    Request(HostRequest),
    Pull {
        seq: u64,
        #[serde(flatten)]
        fetch: Fetch,
    },
    Response {
        seq: u64,
        result: CommandResult<CommandOutput>,
    },
    View(ViewChange),
}

impl Outbound {
    pub fn to_line(&self) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}
