//! Delivery of gated loudness readings to the event bus.
//!
//! A node registers once with the node directory, learns which broker to use,
//! and then sends one supply notification per published block. Delivery is
//! fire-and-forget: failures are returned to the caller, never retried.

mod client;
mod protocol;
mod stdout;

use crate::meter::PublicationRequest;
use anyhow::Result;
use clap::ValueEnum;

pub use client::{register_node, BrokerClient, NodeRegistration, NodeSession, RegistrationRequest};
pub use protocol::{ChannelType, DirectoryEvent, NodeCommand};
pub use stdout::StdoutSink;

/// Default node directory address.
pub const DEFAULT_NODESRV: &str = "127.0.0.1:9990";

/// Default node name announced to the directory.
pub const DEFAULT_NODE_NAME: &str = "PulseAudio";

/// Where publication requests end up.
pub trait PublishSink {
    fn notify(&mut self, request: &PublicationRequest) -> Result<()>;

    fn label(&self) -> &'static str;
}

/// Runtime-selectable sink implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SinkKind {
    Broker,
    Stdout,
}

impl SinkKind {
    pub fn label(self) -> &'static str {
        match self {
            SinkKind::Broker => "broker",
            SinkKind::Stdout => "stdout",
        }
    }
}

/// Argument description sent at registration.
pub fn capture_arg_json(sample_rate: u32, fragment: usize) -> String {
    format!("{{PulseAudio:Rate({sample_rate}),Frag({fragment})}}")
}
