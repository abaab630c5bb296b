//! # Connection Registry
//!
//! Active connections keyed by name. A name is reserved before the
//! handshake starts, so two concurrent `connect` calls for one name cannot
//! both proceed; reserve and remove are each a single write-locked step.

use super::active::ActiveConnection;
use cosim_types::{CoSimError, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

enum Slot {
    /// Handshake in progress.
    Reserved,
    Active(Arc<ActiveConnection>),
}

/// Name → connection table of one `CoSimIo` instance.
#[derive(Default)]
pub struct ConnectionRegistry {
    slots: RwLock<HashMap<String, Slot>>,
}

impl ConnectionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `name` for a connection about to be established.
    ///
    /// # Errors
    ///
    /// `ConnectionConflict` if `name` is reserved or active.
    pub fn reserve(&self, name: &str) -> Result<()> {
        let mut slots = self.slots.write();
        if slots.contains_key(name) {
            return Err(CoSimError::ConnectionConflict {
                connection_name: name.to_string(),
            });
        }
        slots.insert(name.to_string(), Slot::Reserved);
        debug!(connection_name = name, "Connection name reserved");
        Ok(())
    }

    /// Turn a reservation into an active entry.
    pub fn activate(&self, connection: Arc<ActiveConnection>) {
        let name = connection.name().to_string();
        self.slots.write().insert(name, Slot::Active(connection));
    }

    /// Drop a reservation or an active entry. Returns the active
    /// connection, if there was one.
    pub fn remove(&self, name: &str) -> Option<Arc<ActiveConnection>> {
        match self.slots.write().remove(name) {
            Some(Slot::Active(connection)) => Some(connection),
            Some(Slot::Reserved) | None => None,
        }
    }

    /// # Errors
    ///
    /// `NotConnected` unless `name` is active.
    pub fn get(&self, name: &str) -> Result<Arc<ActiveConnection>> {
        match self.slots.read().get(name) {
            Some(Slot::Active(connection)) => Ok(connection.clone()),
            Some(Slot::Reserved) | None => Err(CoSimError::NotConnected {
                connection_name: name.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn is_active(&self, name: &str) -> bool {
        matches!(self.slots.read().get(name), Some(Slot::Active(_)))
    }

    /// Names of active connections, sorted.
    #[must_use]
    pub fn active_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .slots
            .read()
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::Active(_)))
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Reserved plus active entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }
}
