//! Newline-delimited JSON messages exchanged with the node directory and the
//! broker.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Service channel a node supplies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ChannelType {
    Storage,
    Media,
}

impl ChannelType {
    pub fn label(self) -> &'static str {
        match self {
            ChannelType::Storage => "storage",
            ChannelType::Media => "media",
        }
    }
}

/// Messages sent by this node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum NodeCommand {
    Register {
        node: String,
        channels: Vec<ChannelType>,
        arg_json: String,
    },
    Unregister {
        node_id: u64,
    },
    NotifySupply {
        node_id: u64,
        channel: ChannelType,
        name: String,
        payload: Option<Vec<u8>>,
    },
}

/// Replies from the node directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DirectoryEvent {
    Registered { node_id: u64, server: String },
    Error { message: String },
}

/// Encode a message as one JSON line.
pub(crate) fn to_line<T: Serialize>(message: &T) -> serde_json::Result<String> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    Ok(line)
}
