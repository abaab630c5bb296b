//! # In-Memory Transport
//!
//! Process-local transport for two coupled solvers running as tasks of one
//! process (and for tests).
//!
//! The first side to open a connection name creates a duplex pair, keeps
//! one half and parks the other in the hub; the second side takes the
//! parked half. Closing a half drops its sender, which the peer observes as
//! [`TransportError::Closed`].

use crate::transport::{ChannelContext, Transport, TransportError};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::mpsc;
use tracing::debug;

type Half = (mpsc::Sender<Vec<u8>>, mpsc::Receiver<Vec<u8>>);

struct Parked {
    token: u64,
    half: Half,
}

struct HubInner {
    waiting: Mutex<HashMap<String, Parked>>,
    next_token: AtomicU64,
}

/// Rendezvous point for in-memory transports.
///
/// Cloning yields a handle to the same hub.
#[derive(Clone)]
pub struct InMemoryHub {
    inner: Arc<HubInner>,
}

impl InMemoryHub {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(HubInner {
                waiting: Mutex::new(HashMap::new()),
                next_token: AtomicU64::new(1),
            }),
        }
    }

    /// Process-wide hub.
    #[must_use]
    pub fn global() -> &'static InMemoryHub {
        static GLOBAL: OnceLock<InMemoryHub> = OnceLock::new();
        GLOBAL.get_or_init(InMemoryHub::new)
    }

    /// A fresh, unopened transport bound to this hub.
    #[must_use]
    pub fn transport(&self) -> InMemoryTransport {
        InMemoryTransport {
            hub: self.clone(),
            half: None,
            parked: None,
        }
    }

    /// Number of connection names waiting for their second side.
    #[must_use]
    pub fn waiting_count(&self) -> usize {
        self.inner.waiting.lock().len()
    }

    /// Take the parked half for `name`, or park a new one and return the
    /// other half together with the parking token.
    fn pair(&self, name: &str) -> (Half, Option<u64>) {
        let mut waiting = self.inner.waiting.lock();
        if let Some(parked) = waiting.remove(name) {
            debug!(connection_name = name, "In-memory channel paired");
            return (parked.half, None);
        }

        let (a_tx, b_rx) = mpsc::channel(DEFAULT_CHANNEL_CAPACITY);
        let (b_tx, a_rx) = mpsc::channel(DEFAULT_CHANNEL_CAPACITY);
        let token = self.inner.next_token.fetch_add(1, Ordering::Relaxed);
        waiting.insert(
            name.to_string(),
            Parked {
                token,
                half: (b_tx, b_rx),
            },
        );
        debug!(connection_name = name, "In-memory channel waiting for peer");
        ((a_tx, a_rx), Some(token))
    }

    /// Drop a parked half that nobody picked up.
    fn unpark(&self, name: &str, token: u64) {
        let mut waiting = self.inner.waiting.lock();
        if waiting.get(name).is_some_and(|p| p.token == token) {
            waiting.remove(name);
        }
    }
}

impl Default for InMemoryHub {
    fn default() -> Self {
        Self::new()
    }
}

/// One side of an in-memory channel.
pub struct InMemoryTransport {
    hub: InMemoryHub,
    half: Option<Half>,
    /// Connection name and token while our peer half is still parked.
    parked: Option<(String, u64)>,
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn open(&mut self, context: &ChannelContext) -> Result<(), TransportError> {
        let (half, token) = self.hub.pair(&context.connection_name);
        self.half = Some(half);
        self.parked = token.map(|t| (context.connection_name.clone(), t));
        Ok(())
    }

    async fn send(&mut self, bytes: Vec<u8>) -> Result<(), TransportError> {
        let (tx, _) = self.half.as_ref().ok_or(TransportError::NotOpen)?;
        tx.send(bytes).await.map_err(|_| TransportError::Closed)
    }

    async fn recv(&mut self) -> Result<Vec<u8>, TransportError> {
        let (_, rx) = self.half.as_mut().ok_or(TransportError::NotOpen)?;
        rx.recv().await.ok_or(TransportError::Closed)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if let Some((name, token)) = self.parked.take() {
            self.hub.unpark(&name, token);
        }
        self.half = None;
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "in_memory"
    }
}
