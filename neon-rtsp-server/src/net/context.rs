use std::fmt;
use std::net::SocketAddr;

use bytes::Bytes;
use tokio::sync::mpsc;

use neon_rtsp_protocol as rtsp;

pub type WriterTx = mpsc::UnboundedSender<Bytes>;
pub type WriterRx = mpsc::UnboundedReceiver<Bytes>;

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("connection is not attached")]
    NotAttached,
    #[error("connection writer is gone")]
    WriterClosed,
    #[error(transparent)]
    Protocol(#[from] rtsp::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Tcp,
    Udp,
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Network::Tcp => write!(f, "tcp"),
            Network::Udp => write!(f, "udp"),
        }
    }
}

/// What a context holds while it is attached to a live connection: the
/// sending side of the connection's writer and the endpoint identities.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    writer_tx: WriterTx,
    network: Network,
    local_addr: Option<SocketAddr>,
    remote_addr: Option<SocketAddr>,
}

impl ConnectionHandle {
    pub fn new(writer_tx: WriterTx, network: Network) -> Self {
        Self {
            writer_tx,
            network,
            local_addr: None,
            remote_addr: None,
        }
    }

    #[must_use]
    pub fn with_local_addr(mut self, local_addr: Option<SocketAddr>) -> Self {
        self.local_addr = local_addr;
        self
    }

    #[must_use]
    pub fn with_remote_addr(mut self, remote_addr: Option<SocketAddr>) -> Self {
        self.remote_addr = remote_addr;
        self
    }
}

/// One network connection as seen by the layer above the transport.
///
/// Implementors only provide storage for the optional [`ConnectionHandle`].
/// Everything else has a default: address queries return an empty string
/// when nothing is attached, writes fail with [`ContextError::NotAttached`],
/// and the read and close notifications do nothing. Sessions override
/// [`Context::on_read`] and [`Context::on_close`].
pub trait Context: Send {
    fn handle(&self) -> Option<&ConnectionHandle>;

    fn set_handle(&mut self, handle: Option<ConnectionHandle>);

    fn attach(&mut self, handle: ConnectionHandle) {
        self.set_handle(Some(handle));
    }

    fn detach(&mut self) {
        self.set_handle(None);
    }

    fn is_attached(&self) -> bool {
        self.handle().is_some()
    }

    /// Queue `data` for the connection's writer. Returns as soon as the data
    /// is queued; there is no confirmation that it reached the peer.
    fn write(&self, data: Bytes) -> Result<(), ContextError> {
        let handle = self.handle().ok_or(ContextError::NotAttached)?;
        handle
            .writer_tx
            .send(data)
            .map_err(|_| ContextError::WriterClosed)
    }

    fn remote_addr(&self) -> String {
        self.handle()
            .and_then(|handle| handle.remote_addr)
            .map(|addr| addr.to_string())
            .unwrap_or_default()
    }

    fn local_addr(&self) -> String {
        self.handle()
            .and_then(|handle| handle.local_addr)
            .map(|addr| addr.to_string())
            .unwrap_or_default()
    }

    fn network(&self) -> String {
        self.handle()
            .map(|handle| handle.network.to_string())
            .unwrap_or_default()
    }

    /// Called with everything buffered for this connection so far. Returns
    /// how many bytes from the front of `buf` were used up.
    fn on_read(&mut self, _buf: &[u8]) -> Result<usize, ContextError> {
        Ok(0)
    }

    fn on_close(&mut self) -> Result<(), ContextError> {
        Ok(())
    }

    /// Run the close notification and detach. Calling this on a context that
    /// is not attached does nothing.
    fn close(&mut self) -> Result<(), ContextError> {
        if !self.is_attached() {
            return Ok(());
        }
        let result = self.on_close();
        self.detach();
        result
    }
}

/// A context with no behavior of its own.
#[derive(Debug, Default)]
pub struct BasicContext {
    handle: Option<ConnectionHandle>,
}

impl BasicContext {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Context for BasicContext {
    fn handle(&self) -> Option<&ConnectionHandle> {
        self.handle.as_ref()
    }

    fn set_handle(&mut self, handle: Option<ConnectionHandle>) {
        self.handle = handle;
    }
}
