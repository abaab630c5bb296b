//! # Framed Channel
//!
//! Typed frames over any [`Transport`], with an optional per-operation
//! timeout.

use crate::frame::{decode, encode, Frame};
use crate::transport::{ChannelContext, Transport, TransportError};
use std::future::Future;
use std::time::Duration;
use tracing::trace;

/// Frame-level view of an open transport.
pub struct FramedChannel {
    transport: Box<dyn Transport>,
    /// `None` waits indefinitely.
    timeout: Option<Duration>,
    frames_sent: u64,
    frames_received: u64,
}

impl FramedChannel {
    /// Wrap an unopened transport.
    #[must_use]
    pub fn new(transport: Box<dyn Transport>, timeout: Option<Duration>) -> Self {
        Self {
            transport,
            timeout,
            frames_sent: 0,
            frames_received: 0,
        }
    }

    /// Open the transport, bounded by `context.open_timeout`.
    ///
    /// # Errors
    ///
    /// `Timeout` or the transport's own error.
    pub async fn open(&mut self, context: &ChannelContext) -> Result<(), TransportError> {
        let open_timeout = context.open_timeout;
        tokio::time::timeout(open_timeout, self.transport.open(context))
            .await
            .map_err(|_| TransportError::Timeout(open_timeout))?
    }

    /// # Errors
    ///
    /// Encoding, transport or timeout errors.
    pub async fn send(&mut self, frame: &Frame) -> Result<(), TransportError> {
        let bytes = encode(frame)?;
        let size = bytes.len();
        let limit = self.timeout;
        bounded(limit, self.transport.send(bytes)).await?;
        self.frames_sent += 1;
        trace!(
            identifier = %frame.identifier,
            payload = frame.payload.kind(),
            size,
            "Frame sent"
        );
        Ok(())
    }

    /// Wait for the next frame.
    ///
    /// # Errors
    ///
    /// Decoding, transport or timeout errors.
    pub async fn recv(&mut self) -> Result<Frame, TransportError> {
        let limit = self.timeout;
        let bytes = bounded(limit, self.transport.recv()).await?;
        let frame = decode(&bytes)?;
        self.frames_received += 1;
        trace!(
            identifier = %frame.identifier,
            payload = frame.payload.kind(),
            size = bytes.len(),
            "Frame received"
        );
        Ok(frame)
    }

    /// # Errors
    ///
    /// The transport's close error.
    pub async fn close(&mut self) -> Result<(), TransportError> {
        self.transport.close().await
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.transport.kind()
    }

    #[must_use]
    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    #[must_use]
    pub fn frames_received(&self) -> u64 {
        self.frames_received
    }
}

async fn bounded<T, F>(limit: Option<Duration>, operation: F) -> Result<T, TransportError>
where
    F: Future<Output = Result<T, TransportError>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, operation)
            .await
            .map_err(|_| TransportError::Timeout(limit))?,
        None => operation.await,
    }
}
