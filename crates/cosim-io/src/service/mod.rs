//! # Service Layer
//!
//! Drives the domain over `cosim-bus` channels.
//!
//! - `registry`: connection table with name reservation
//! - `active`: runtime state of one connection
//! - `lifecycle`: connect / disconnect handshakes
//! - `exchange`: rendezvous export / import
//! - `orchestrator`: register / run / control signals
//! - `cosim_io`: the `CoSimApi` facade

pub mod active;
pub mod cosim_io;
pub mod exchange;
pub mod lifecycle;
pub mod orchestrator;
pub mod registry;

pub use active::ActiveConnection;
pub use cosim_io::CoSimIo;
pub use orchestrator::RUN_CONTROL_IDENTIFIER;
pub use registry::ConnectionRegistry;
