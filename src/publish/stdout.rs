use super::protocol::{to_line, ChannelType, NodeCommand};
use super::PublishSink;
use crate::meter::PublicationRequest;
use anyhow::{Context, Result};
use std::io::{self, Write};

/// Writes notifications as JSON lines instead of sending them to a broker.
pub struct StdoutSink<W: Write = io::Stdout> {
    writer: W,
    channel: ChannelType,
}

impl StdoutSink {
    pub fn new(channel: ChannelType) -> Self {
        Self::with_writer(io::stdout(), channel)
    }
}

impl<W: Write> StdoutSink<W> {
    pub fn with_writer(writer: W, channel: ChannelType) -> Self {
        Self { writer, channel }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> PublishSink for StdoutSink<W> {
    fn notify(&mut self, request: &PublicationRequest) -> Result<()> {
        let line = to_line(&NodeCommand::NotifySupply {
            node_id: 0,
            channel: self.channel,
            name: request.name.clone(),
            payload: request.payload.clone(),
        })
        .context("failed to encode notification")?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }

    fn label(&self) -> &'static str {
        "stdout"
    }
}
