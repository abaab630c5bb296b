//! # Transport Port
//!
//! Byte-level channel between the two sides of one connection. A transport
//! delivers whole frames in order; it knows nothing about their content.

use crate::in_memory::InMemoryHub;
use crate::socket::SocketTransport;
use async_trait::async_trait;
use cosim_types::CoSimError;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors from transport operations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// `communication_format` names no known transport.
    #[error("Unsupported communication format \"{0}\"")]
    UnsupportedFormat(String),

    /// Send/recv before `open()` or after `close()`.
    #[error("Transport is not open")]
    NotOpen,

    /// The peer went away.
    #[error("Channel closed by peer")]
    Closed,

    /// No peer activity within the configured time.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Frame of {size} bytes exceeds the maximum of {max} bytes")]
    FrameTooLarge { size: usize, max: usize },

    #[error("Protocol version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: u16, actual: u16 },

    /// Malformed frame bytes.
    #[error("Codec error: {0}")]
    Codec(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<TransportError> for CoSimError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Io(io) => CoSimError::Io(io.to_string()),
            other => CoSimError::Transport(other.to_string()),
        }
    }
}

/// What a transport needs to know to reach its peer.
#[derive(Debug, Clone)]
pub struct ChannelContext {
    pub connection_name: String,
    /// The primary side listens, the other side dials.
    pub is_primary: bool,
    /// Directory for rendezvous files.
    pub working_directory: PathBuf,
    /// Upper bound for reaching the peer during `open()`.
    pub open_timeout: Duration,
}

impl ChannelContext {
    pub fn new(connection_name: impl Into<String>, is_primary: bool) -> Self {
        Self {
            connection_name: connection_name.into(),
            is_primary,
            working_directory: PathBuf::from("."),
            open_timeout: Duration::from_secs(60),
        }
    }

    #[must_use]
    pub fn with_working_directory(mut self, working_directory: impl Into<PathBuf>) -> Self {
        self.working_directory = working_directory.into();
        self
    }

    #[must_use]
    pub fn with_open_timeout(mut self, open_timeout: Duration) -> Self {
        self.open_timeout = open_timeout;
        self
    }
}

/// A bidirectional, ordered frame channel.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Establish the channel to the peer named by `context`.
    async fn open(&mut self, context: &ChannelContext) -> Result<(), TransportError>;

    /// Send one encoded frame.
    async fn send(&mut self, bytes: Vec<u8>) -> Result<(), TransportError>;

    /// Wait for the next encoded frame.
    async fn recv(&mut self) -> Result<Vec<u8>, TransportError>;

    /// Release the channel. Closing twice is a no-op.
    async fn close(&mut self) -> Result<(), TransportError>;

    /// Communication format name, for logs.
    fn kind(&self) -> &'static str;
}

/// Available transports, selected by the `communication_format` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommunicationFormat {
    #[default]
    InMemory,
    Socket,
}

impl CommunicationFormat {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CommunicationFormat::InMemory => "in_memory",
            CommunicationFormat::Socket => "socket",
        }
    }
}

impl fmt::Display for CommunicationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommunicationFormat {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_memory" => Ok(CommunicationFormat::InMemory),
            "socket" => Ok(CommunicationFormat::Socket),
            other => Err(TransportError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Build an unopened transport for `format`.
///
/// In-memory transports rendezvous through `hub`; both sides of a
/// connection must use the same hub.
#[must_use]
pub fn create_transport(format: CommunicationFormat, hub: &InMemoryHub) -> Box<dyn Transport> {
    match format {
        CommunicationFormat::InMemory => Box::new(hub.transport()),
        CommunicationFormat::Socket => Box::new(SocketTransport::new()),
    }
}
