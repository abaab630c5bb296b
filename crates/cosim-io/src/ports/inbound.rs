//! # Inbound Port - CoSimApi
//!
//! The coupling operations a solver calls. Every operation takes a settings
//! `Info` and returns a result `Info`; data travels through the typed
//! arguments.
//!
//! | Method | Required settings | Result keys |
//! |--------|-------------------|-------------|
//! | `connect` | `my_name` + `connect_to`, or `connection_name` | `connection_name`, `connection_status`, `is_connected` |
//! | `disconnect` | `connection_name` | `connection_status`, `is_connected` |
//! | `export_*` / `import_*` | `connection_name`, `identifier` | `elapsed_time`, sizes |
//! | `register` | `connection_name`, `function_name` | `function_name` |
//! | `run` | `connection_name` | `number_of_calls` |
//! | `send_control_signal` | `connection_name`, `control_signal` | `elapsed_time` |
//!
//! `connection_name` may be replaced by `my_name` + `connect_to` anywhere.

use crate::ports::RemoteFunction;
use async_trait::async_trait;
use cosim_types::{Info, MeshData, ModelPart, Result, Vector};
use std::sync::Arc;

/// Primary API of the coupling runtime.
///
/// Exports and imports are rendezvous operations: each call completes only
/// together with the matching call of the partner (same `identifier`, same
/// kind of data), in the order both sides issue them.
///
/// # Example
///
/// ```rust,ignore
/// let io = CoSimIo::new();
/// let result = io.connect(&Info::new().with("my_name", "fluid").with("connect_to", "structure")).await?;
/// let connection_name = result.get_string("connection_name")?;
///
/// let settings = Info::new()
///     .with("connection_name", connection_name.as_str())
///     .with("identifier", "pressure");
/// io.export_data(&settings, &pressure).await?;
/// ```
#[async_trait]
pub trait CoSimApi: Send + Sync {
    /// Establish a connection with the partner.
    ///
    /// # Errors
    /// - `InvalidName`: missing or malformed names
    /// - `ConnectionConflict`: the connection name is already in use
    /// - `IncompatibleVersion`: partner has a different major version
    /// - `Transport`: the partner could not be reached in time
    async fn connect(&self, settings: &Info) -> Result<Info>;

    /// Close a connection. An unknown name is reported in the result as
    /// `DisconnectionError`, not as an error.
    async fn disconnect(&self, settings: &Info) -> Result<Info>;

    /// Send the whole `info` to the partner's `import_info`.
    async fn export_info(&self, info: &Info) -> Result<Info>;

    /// Receive an `Info` exported by the partner.
    async fn import_info(&self, settings: &Info) -> Result<Info>;

    async fn export_data(&self, settings: &Info, values: &[f64]) -> Result<Info>;

    /// `values` is resized to the received length.
    async fn import_data(&self, settings: &Info, values: &mut Vector) -> Result<Info>;

    async fn export_mesh(&self, settings: &Info, model_part: &ModelPart) -> Result<Info>;

    /// Adds the received nodes and elements to `model_part`.
    ///
    /// # Errors
    /// - `DuplicateId`: an id exists already; `model_part` is unchanged
    async fn import_mesh(&self, settings: &Info, model_part: &mut ModelPart) -> Result<Info>;

    async fn export_mesh_data(&self, settings: &Info, mesh: &MeshData) -> Result<Info>;

    /// Replaces `mesh` with the received arrays.
    async fn import_mesh_data(&self, settings: &Info, mesh: &mut MeshData) -> Result<Info>;

    /// Make `function` callable by the partner under `function_name`.
    ///
    /// # Errors
    /// - `InvalidName`: malformed or reserved (`exit`) name
    /// - `DuplicateFunction`: name already registered on this connection
    fn register(&self, settings: &Info, function: Arc<dyn RemoteFunction>) -> Result<Info>;

    /// Serve control signals from the partner until it sends `exit`.
    ///
    /// # Errors
    /// - `ProtocolViolation`: the partner asked for an unregistered function
    async fn run(&self, settings: &Info) -> Result<Info>;

    /// Make the partner's `run` loop call `control_signal`, or stop it with
    /// `exit`. A nested `settings` entry is passed on to the function.
    async fn send_control_signal(&self, settings: &Info) -> Result<Info>;
}
