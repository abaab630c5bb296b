//! # Domain Layer
//!
//! Pure connection logic, free of I/O.
//!
//! - `connection`: `ConnectionStatus` state machine and the `Connection` entity
//! - `naming`: name policy and connection-name derivation

pub mod connection;
pub mod naming;

pub use connection::{Connection, ConnectionStatus};
pub use naming::{
    check_entry, connection_name_from, create_connection_name, is_primary_by_name,
    DISALLOWED_CHARACTERS, EXIT_SIGNAL, MAX_NAME_LENGTH,
};
