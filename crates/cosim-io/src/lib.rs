//! # CoSim IO - Coupling Runtime
//!
//! Connects two solvers of a partitioned co-simulation and moves metadata,
//! field data and meshes between them.
//!
//! ## Connection State Machine
//!
//! ```text
//! [NotConnected] ──connect──→ [Connecting] ──handshake ok──→ [Connected]
//!       ↑                          │                              │
//!       │                          └──failure──→ [ConnectionError]│
//!       │                                                    disconnect
//!       │                                                         ↓
//!  [Disconnected] ←──goodbye ok── [Disconnecting] ──failure──→ [DisconnectionError]
//! ```
//!
//! ## Rendezvous Exchange
//!
//! | Export | Import | Payload |
//! |--------|--------|---------|
//! | `export_info` | `import_info` | whole `Info` |
//! | `export_data` | `import_data` | `Vector` of doubles |
//! | `export_mesh` | `import_mesh` | `ModelPart` nodes + elements (additive) |
//! | `export_mesh_data` | `import_mesh_data` | raw coordinate / connectivity arrays |
//!
//! Both sides must issue matching calls (same `identifier`, same payload
//! kind) in the same order; a mismatch fails both calls.
//!
//! ## Remote Control
//!
//! ```text
//! controller                          controlled
//!   send_control_signal("A") ───────→ run(): calls registered "A"
//!   send_control_signal("exit") ────→ run() returns
//! ```
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  service/  - CoSimIo facade, lifecycle, exchange, run loop  │
//! └─────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────┐
//! │  ports/inbound.rs  - CoSimApi trait                         │
//! │  ports/outbound.rs - RemoteFunction trait                   │
//! └─────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────┐
//! │  domain/  - ConnectionStatus, Connection, naming rules      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod config;
pub mod domain;
pub mod ports;
pub mod service;
pub mod version;

// Re-export main types
pub use config::{settings_from_json_file, ConnectionSettings, RuntimeConfig};
pub use domain::{Connection, ConnectionStatus, EXIT_SIGNAL};
pub use ports::{AsyncFunction, CoSimApi, RemoteFunction};
pub use service::{CoSimIo, RUN_CONTROL_IDENTIFIER};
pub use version::{version_major, version_minor, version_string};

// The data model travels with the runtime.
pub use cosim_types::{
    CoSimError, Element, ElementType, IdType, Info, MeshData, ModelPart, Node, Result, Vector,
};
