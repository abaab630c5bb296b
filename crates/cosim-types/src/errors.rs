//! # Error Types
//!
//! Defines the error taxonomy shared by every CoSim crate. All failures are
//! local and synchronous: they are returned to the immediate caller, never
//! recovered from silently.

use std::fmt;
use thiserror::Error;

/// Result alias used across the workspace.
pub type Result<T, E = CoSimError> = std::result::Result<T, E>;

/// The kind of mesh entity an id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Node,
    Element,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Node => f.write_str("Node"),
            EntityKind::Element => f.write_str("Element"),
        }
    }
}

/// Errors surfaced by the coupling library.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CoSimError {
    /// Info read of an absent key without a default.
    #[error("Trying to get \"{key}\" which does not exist! Currently available: [{available}]")]
    KeyNotFound { key: String, available: String },

    /// Info read with a type different from the stored one.
    #[error("Wrong DataType! Trying to get \"{key}\" which is of type \"{found}\" with \"{expected}\"")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Node or Element id already present in the container.
    #[error("The {kind} with Id {id} exists already!")]
    DuplicateId { kind: EntityKind, id: i64 },

    /// Node or Element id absent from the container.
    #[error("{kind} with Id {id} does not exist!")]
    NotFound { kind: EntityKind, id: i64 },

    /// Entity ids must be >= 1.
    #[error("{kind} Id must be >= 1, got {id}")]
    InvalidId { kind: EntityKind, id: i64 },

    /// Empty or reserved-character name.
    #[error("Invalid name \"{name}\": {reason}")]
    InvalidName { name: String, reason: String },

    /// Parallel input sequences of different lengths.
    #[error("Length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Index-based access past the end of a sequence.
    #[error("Index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Element type tag without a known representation.
    #[error("Unsupported element type: {0}")]
    UnsupportedElementType(String),

    /// Raw mesh arrays that do not describe a consistent mesh.
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// A connection with this name is already active.
    #[error("A connection named \"{connection_name}\" already exists!")]
    ConnectionConflict { connection_name: String },

    /// Operation on a connection that is not (or no longer) connected.
    #[error("No active connection \"{connection_name}\" exists!")]
    NotConnected { connection_name: String },

    /// No matching peer operation was observed.
    #[error("Rendezvous failed on \"{connection_name}\" for identifier \"{identifier}\": {reason}")]
    RendezvousFailure {
        connection_name: String,
        identifier: String,
        reason: String,
    },

    /// Unexpected control signal or unregistered function.
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// A function was already registered under this name.
    #[error("A function was already registered for \"{0}\"!")]
    DuplicateFunction(String),

    /// Peer runs an incompatible protocol version.
    #[error("Version mismatch! My version: {mine}; partner version: {partner}")]
    IncompatibleVersion { mine: String, partner: String },

    /// Underlying channel failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Filesystem or stream failure.
    #[error("I/O error: {0}")]
    Io(String),
}

impl CoSimError {
    /// Shorthand for an invalid-name error.
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        CoSimError::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Returns true for failures caused by the peer not matching an operation.
    #[must_use]
    pub fn is_rendezvous_failure(&self) -> bool {
        matches!(self, CoSimError::RendezvousFailure { .. })
    }
}

impl From<std::io::Error> for CoSimError {
    fn from(e: std::io::Error) -> Self {
        CoSimError::Io(e.to_string())
    }
}
