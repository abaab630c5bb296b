//! # Socket Transport
//!
//! TCP on the loopback interface, for solvers running as separate
//! processes.
//!
//! ## Rendezvous
//!
//! The primary side binds an ephemeral port and publishes it in a port
//! file inside the shared working directory (written to a temporary name,
//! then renamed, so the reader never sees a partial file). The secondary
//! side polls for that file and dials the port. The primary removes the
//! file once the peer is accepted.
//!
//! ## Framing
//!
//! ```text
//! [u32 BE: len][len bytes]
//! ```

use crate::transport::{ChannelContext, Transport, TransportError};
use crate::MAX_FRAME_SIZE;
use async_trait::async_trait;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::Instant;
use tracing::{debug, trace};

/// Poll period of the secondary side while waiting for the port file.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Location of the port file for a connection.
#[must_use]
pub fn port_file_path(working_directory: &Path, connection_name: &str) -> PathBuf {
    working_directory.join(format!(".cosim_{connection_name}.port"))
}

/// One side of a TCP channel.
#[derive(Debug, Default)]
pub struct SocketTransport {
    stream: Option<TcpStream>,
}

impl SocketTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn listen(context: &ChannelContext) -> Result<TcpStream, TransportError> {
        let port_file = port_file_path(&context.working_directory, &context.connection_name);
        // a leftover from an earlier run would send the peer to a dead port
        remove_if_exists(&port_file).await?;

        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await?;
        let port = listener.local_addr()?.port();

        let tmp_file = port_file.with_extension("port.tmp");
        tokio::fs::write(&tmp_file, port.to_string()).await?;
        tokio::fs::rename(&tmp_file, &port_file).await?;
        debug!(
            connection_name = %context.connection_name,
            port,
            port_file = %port_file.display(),
            "Waiting for peer"
        );

        let accepted = tokio::time::timeout(context.open_timeout, listener.accept()).await;
        remove_if_exists(&port_file).await?;

        let (stream, peer) = accepted.map_err(|_| TransportError::Timeout(context.open_timeout))??;
        debug!(connection_name = %context.connection_name, %peer, "Peer connected");
        Ok(stream)
    }

    async fn dial(context: &ChannelContext) -> Result<TcpStream, TransportError> {
        let port_file = port_file_path(&context.working_directory, &context.connection_name);
        let deadline = Instant::now() + context.open_timeout;

        loop {
            if let Some(port) = read_port(&port_file).await {
                let address = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
                match TcpStream::connect(address).await {
                    Ok(stream) => {
                        debug!(connection_name = %context.connection_name, %address, "Connected to peer");
                        return Ok(stream);
                    }
                    // stale file or listener not ready yet
                    Err(e) => trace!(%address, error = %e, "Connect attempt failed"),
                }
            }
            if Instant::now() >= deadline {
                return Err(TransportError::Timeout(context.open_timeout));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

async fn read_port(port_file: &Path) -> Option<u16> {
    let content = tokio::fs::read_to_string(port_file).await.ok()?;
    content.trim().parse().ok()
}

async fn remove_if_exists(path: &Path) -> Result<(), TransportError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Write one length-prefixed frame.
pub async fn write_frame<W: AsyncWriteExt + Unpin>(
    writer: &mut W,
    payload: &[u8],
) -> Result<(), TransportError> {
    let len = u32::try_from(payload.len())
        .ok()
        .filter(|_| payload.len() <= MAX_FRAME_SIZE)
        .ok_or(TransportError::FrameTooLarge {
            size: payload.len(),
            max: MAX_FRAME_SIZE,
        })?;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one length-prefixed frame. A clean EOF before the length prefix
/// yields `Closed`.
pub async fn read_frame<R: AsyncReadExt + Unpin>(reader: &mut R) -> Result<Vec<u8>, TransportError> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(TransportError::Closed)
        }
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_FRAME_SIZE {
        return Err(TransportError::FrameTooLarge {
            size: len,
            max: MAX_FRAME_SIZE,
        });
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    Ok(payload)
}

#[async_trait]
impl Transport for SocketTransport {
    async fn open(&mut self, context: &ChannelContext) -> Result<(), TransportError> {
        let stream = if context.is_primary {
            Self::listen(context).await?
        } else {
            Self::dial(context).await?
        };
        stream.set_nodelay(true)?;
        self.stream = Some(stream);
        Ok(())
    }

    async fn send(&mut self, bytes: Vec<u8>) -> Result<(), TransportError> {
        let stream = self.stream.as_mut().ok_or(TransportError::NotOpen)?;
        write_frame(stream, &bytes).await
    }

    async fn recv(&mut self) -> Result<Vec<u8>, TransportError> {
        let stream = self.stream.as_mut().ok_or(TransportError::NotOpen)?;
        read_frame(stream).await
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if let Some(mut stream) = self.stream.take() {
            // peer may already be gone
            let _ = stream.shutdown().await;
        }
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "socket"
    }
}
