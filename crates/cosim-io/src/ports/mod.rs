//! # Ports (Hexagonal Architecture)
//!
//! - `inbound`: `CoSimApi`, the operations a solver drives
//! - `outbound`: `RemoteFunction`, callbacks the partner drives through `run`

pub mod inbound;
pub mod outbound;

pub use inbound::CoSimApi;
pub use outbound::{AsyncFunction, RemoteFunction};
