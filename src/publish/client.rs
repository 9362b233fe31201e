use super::protocol::{to_line, ChannelType, DirectoryEvent, NodeCommand};
use super::PublishSink;
use crate::meter::PublicationRequest;
use anyhow::{anyhow, bail, Context, Result};
use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::{debug, info, warn};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const IO_TIMEOUT: Duration = Duration::from_secs(2);

/// What this node announces to the directory at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    pub node: String,
    pub channels: Vec<ChannelType>,
    pub arg_json: String,
}

/// Directory reply: our node id and the broker to publish through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRegistration {
    pub node_id: u64,
    pub server: String,
}

fn open(addr: &str) -> Result<TcpStream> {
    let resolved = addr
        .to_socket_addrs()
        .with_context(|| format!("cannot resolve '{addr}'"))?
        .next()
        .ok_or_else(|| anyhow!("'{addr}' resolved to no addresses"))?;
    let stream = TcpStream::connect_timeout(&resolved, CONNECT_TIMEOUT)
        .with_context(|| format!("cannot connect to {addr}"))?;
    stream.set_read_timeout(Some(IO_TIMEOUT))?;
    stream.set_write_timeout(Some(IO_TIMEOUT))?;
    stream.set_nodelay(true)?;
    Ok(stream)
}

fn send(stream: &mut TcpStream, command: &NodeCommand) -> Result<()> {
    let line = to_line(command).context("failed to encode node command")?;
    stream.write_all(line.as_bytes())?;
    stream.flush()?;
    Ok(())
}

/// Register with the node directory at `nodesrv`.
pub fn register_node(nodesrv: &str, request: &RegistrationRequest) -> Result<NodeRegistration> {
    let mut stream = open(nodesrv).context("node directory unreachable")?;
    send(
        &mut stream,
        &NodeCommand::Register {
            node: request.node.clone(),
            channels: request.channels.clone(),
            arg_json: request.arg_json.clone(),
        },
    )
    .context("failed to send registration")?;

    let mut reply = String::new();
    BufReader::new(&stream)
        .read_line(&mut reply)
        .context("no registration reply from node directory")?;
    if reply.trim().is_empty() {
        bail!("node directory closed the connection without replying");
    }
    match serde_json::from_str::<DirectoryEvent>(reply.trim())
        .context("malformed registration reply")?
    {
        DirectoryEvent::Registered { node_id, server } => {
            info!(node_id, %server, node = %request.node, "registered with node directory");
            Ok(NodeRegistration { node_id, server })
        }
        DirectoryEvent::Error { message } => bail!("node directory refused registration: {message}"),
    }
}

/// Keeps a directory registration alive and withdraws it on drop.
pub struct NodeSession {
    nodesrv: String,
    node_id: u64,
}

impl NodeSession {
    pub fn new(nodesrv: &str, node_id: u64) -> Self {
        Self {
            nodesrv: nodesrv.to_string(),
            node_id,
        }
    }

    pub fn node_id(&self) -> u64 {
        self.node_id
    }

    fn unregister(&self) -> Result<()> {
        let mut stream = open(&self.nodesrv)?;
        send(
            &mut stream,
            &NodeCommand::Unregister {
                node_id: self.node_id,
            },
        )
    }
}

impl Drop for NodeSession {
    fn drop(&mut self) {
        match self.unregister() {
            Ok(()) => info!(node_id = self.node_id, "unregistered from node directory"),
            Err(err) => warn!(node_id = self.node_id, "failed to unregister node: {err:#}"),
        }
    }
}

/// Publishes supply notifications to a broker over a persistent connection.
///
/// A failed write drops the connection; the next notify reconnects. The
/// failed notification itself is not resent.
///
/// A peer close is only seen once its FIN has arrived. Until then the kernel
/// still buffers writes, so a notify sent just after the broker hung up can
/// report success and be lost.
pub struct BrokerClient {
    server: String,
    node_id: u64,
    channel: ChannelType,
    conn: Option<TcpStream>,
}

impl BrokerClient {
    pub fn connect(server: &str, node_id: u64, channel: ChannelType) -> Result<Self> {
        let conn = open(server).context("broker unreachable")?;
        info!(%server, channel = channel.label(), "connected to broker");
        Ok(Self {
            server: server.to_string(),
            node_id,
            channel,
            conn: Some(conn),
        })
    }

    fn connection(&mut self) -> Result<&mut TcpStream> {
        if self.conn.as_ref().is_some_and(peer_closed) {
            debug!(server = %self.server, "broker closed the connection");
            self.conn = None;
        }
        if self.conn.is_none() {
            debug!(server = %self.server, "reconnecting to broker");
            self.conn = Some(open(&self.server)?);
        }
        self.conn
            .as_mut()
            .ok_or_else(|| anyhow!("broker connection unavailable"))
    }
}

/// True when the broker has shut its end. The broker never writes to us, so
/// any readable state other than "would block" means the stream is done.
fn peer_closed(stream: &TcpStream) -> bool {
    if stream.set_nonblocking(true).is_err() {
        return true;
    }
    let mut byte = [0u8; 1];
    let closed = match stream.peek(&mut byte) {
        Ok(0) => true,
        Ok(_) => false,
        Err(err) => err.kind() != io::ErrorKind::WouldBlock,
    };
    stream.set_nonblocking(false).is_err() || closed
}

impl PublishSink for BrokerClient {
    fn notify(&mut self, request: &PublicationRequest) -> Result<()> {
        let command = NodeCommand::NotifySupply {
            node_id: self.node_id,
            channel: self.channel,
            name: request.name.clone(),
            payload: request.payload.clone(),
        };
        let result = self.connection().and_then(|conn| send(conn, &command));
        if result.is_err() {
            self.conn = None;
        }
        result.with_context(|| format!("notify to {} failed", self.server))
    }

    fn label(&self) -> &'static str {
        "broker"
    }
}
