//! # CoSim Bus - Framed Channels Between Coupled Solvers
//!
//! Moves opaque, length-bounded frames between the two sides of one
//! connection. The coupling runtime in `cosim-io` builds its rendezvous
//! protocol on top of [`FramedChannel`].
//!
//! ## Layers
//!
//! ```text
//! ┌───────────────────────┐         ┌───────────────────────┐
//! │ cosim-io (side A)     │         │ cosim-io (side B)     │
//! │   FramedChannel       │         │   FramedChannel       │
//! │   encode / decode     │         │   encode / decode     │
//! ├───────────────────────┤  bytes  ├───────────────────────┤
//! │ dyn Transport         │ ◄─────► │ dyn Transport         │
//! └───────────────────────┘         └───────────────────────┘
//! ```
//!
//! ## Transports
//!
//! | Format | Type | Rendezvous |
//! |--------|------|------------|
//! | `in_memory` | [`InMemoryTransport`] | named slot in an [`InMemoryHub`] |
//! | `socket` | [`SocketTransport`] | port file in the working directory |

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod channel;
pub mod frame;
pub mod in_memory;
pub mod socket;
pub mod transport;

// Re-export main types
pub use channel::FramedChannel;
pub use frame::{decode, encode, Frame, Payload};
pub use in_memory::{InMemoryHub, InMemoryTransport};
pub use socket::SocketTransport;
pub use transport::{
    create_transport, ChannelContext, CommunicationFormat, Transport, TransportError,
};

/// Current wire protocol version, written in front of every frame.
pub const PROTOCOL_VERSION: u16 = 1;

/// Largest encoded frame accepted by any transport (256 MiB).
pub const MAX_FRAME_SIZE: usize = 256 * 1024 * 1024;

/// Frames buffered per direction of an in-memory channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;
