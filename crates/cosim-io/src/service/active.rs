//! Runtime side of an established connection: domain state, the framed
//! channel and the registered remote functions.

use crate::domain::{Connection, ConnectionStatus};
use crate::ports::RemoteFunction;
use cosim_bus::FramedChannel;
use cosim_types::{CoSimError, Result};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

/// A connection in the registry.
pub struct ActiveConnection {
    name: String,
    echo_level: i64,
    print_timing: bool,
    state: Mutex<Connection>,
    /// One exchange at a time per connection.
    channel: tokio::sync::Mutex<FramedChannel>,
    functions: RwLock<HashMap<String, Arc<dyn RemoteFunction>>>,
}

impl ActiveConnection {
    pub fn new(connection: Connection, channel: FramedChannel, print_timing: bool) -> Self {
        Self {
            name: connection.name().to_string(),
            echo_level: connection.echo_level(),
            print_timing,
            state: Mutex::new(connection),
            channel: tokio::sync::Mutex::new(channel),
            functions: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn echo_level(&self) -> i64 {
        self.echo_level
    }

    #[must_use]
    pub fn print_timing(&self) -> bool {
        self.print_timing
    }

    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.state.lock().status()
    }

    /// Copy of the current domain state.
    #[must_use]
    pub fn snapshot(&self) -> Connection {
        self.state.lock().clone()
    }

    /// # Errors
    ///
    /// `ProtocolViolation` for an illegal step.
    pub fn transition(&self, next: ConnectionStatus) -> Result<()> {
        self.state.lock().transition(next)
    }

    /// # Errors
    ///
    /// `NotConnected` unless the connection is `Connected`.
    pub fn ensure_connected(&self) -> Result<()> {
        self.state.lock().ensure_connected()
    }

    pub(crate) fn channel(&self) -> &tokio::sync::Mutex<FramedChannel> {
        &self.channel
    }

    /// # Errors
    ///
    /// `DuplicateFunction` if `name` is already registered.
    pub fn register_function(&self, name: &str, function: Arc<dyn RemoteFunction>) -> Result<()> {
        let mut functions = self.functions.write();
        if functions.contains_key(name) {
            return Err(CoSimError::DuplicateFunction(name.to_string()));
        }
        functions.insert(name.to_string(), function);
        Ok(())
    }

    #[must_use]
    pub fn function(&self, name: &str) -> Option<Arc<dyn RemoteFunction>> {
        self.functions.read().get(name).cloned()
    }

    /// Registered function names, sorted.
    #[must_use]
    pub fn function_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.read().keys().cloned().collect();
        names.sort();
        names
    }
}
