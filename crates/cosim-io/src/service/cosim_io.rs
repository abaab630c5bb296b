//! `CoSimIo`: the [`CoSimApi`] implementation.
//!
//! Each instance owns one connection registry. Instances are cheap to
//! clone and share it; [`CoSimIo::global`] is the process-wide instance.

use super::registry::ConnectionRegistry;
use super::{exchange, lifecycle, orchestrator};
use crate::config::RuntimeConfig;
use crate::domain::{check_entry, connection_name_from, ConnectionStatus};
use crate::ports::{CoSimApi, RemoteFunction};
use async_trait::async_trait;
use cosim_bus::InMemoryHub;
use cosim_types::{Info, MeshData, ModelPart, Result, Vector};
use std::sync::{Arc, OnceLock};

struct Inner {
    registry: ConnectionRegistry,
    hub: InMemoryHub,
    config: RuntimeConfig,
}

/// Coupling runtime of one solver.
#[derive(Clone)]
pub struct CoSimIo {
    inner: Arc<Inner>,
}

impl CoSimIo {
    /// Runtime configured from the environment, pairing in-memory
    /// connections through the process-wide hub.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::from_env())
    }

    #[must_use]
    pub fn with_config(config: RuntimeConfig) -> Self {
        Self::with_hub(config, InMemoryHub::global().clone())
    }

    /// Runtime whose in-memory connections pair only through `hub`.
    #[must_use]
    pub fn with_hub(config: RuntimeConfig, hub: InMemoryHub) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: ConnectionRegistry::new(),
                hub,
                config,
            }),
        }
    }

    /// Process-wide instance.
    #[must_use]
    pub fn global() -> &'static CoSimIo {
        static GLOBAL: OnceLock<CoSimIo> = OnceLock::new();
        GLOBAL.get_or_init(CoSimIo::new)
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    /// Status of `connection_name`; `NotConnected` if unknown.
    #[must_use]
    pub fn connection_status(&self, connection_name: &str) -> ConnectionStatus {
        self.inner
            .registry
            .get(connection_name)
            .map_or(ConnectionStatus::NotConnected, |c| c.status())
    }

    /// Names of all connected connections, sorted.
    #[must_use]
    pub fn active_connections(&self) -> Vec<String> {
        self.inner.registry.active_names()
    }

    fn connection(&self, settings: &Info) -> Result<Arc<super::active::ActiveConnection>> {
        self.inner.registry.get(&connection_name_from(settings)?)
    }
}

impl Default for CoSimIo {
    fn default() -> Self {
        Self::new()
    }
}

fn identifier_of(settings: &Info) -> Result<String> {
    let identifier = settings.get_string("identifier")?;
    check_entry(&identifier, "identifier")?;
    Ok(identifier)
}

#[async_trait]
impl CoSimApi for CoSimIo {
    async fn connect(&self, settings: &Info) -> Result<Info> {
        lifecycle::connect(
            &self.inner.registry,
            &self.inner.hub,
            &self.inner.config,
            settings,
        )
        .await
    }

    async fn disconnect(&self, settings: &Info) -> Result<Info> {
        lifecycle::disconnect(&self.inner.registry, settings).await
    }

    async fn export_info(&self, info: &Info) -> Result<Info> {
        let connection = self.connection(info)?;
        exchange::export_info(&connection, &identifier_of(info)?, info).await
    }

    async fn import_info(&self, settings: &Info) -> Result<Info> {
        let connection = self.connection(settings)?;
        exchange::import_info(&connection, &identifier_of(settings)?).await
    }

    async fn export_data(&self, settings: &Info, values: &[f64]) -> Result<Info> {
        let connection = self.connection(settings)?;
        exchange::export_data(&connection, &identifier_of(settings)?, values).await
    }

    async fn import_data(&self, settings: &Info, values: &mut Vector) -> Result<Info> {
        let connection = self.connection(settings)?;
        exchange::import_data(&connection, &identifier_of(settings)?, values).await
    }

    async fn export_mesh(&self, settings: &Info, model_part: &ModelPart) -> Result<Info> {
        let connection = self.connection(settings)?;
        exchange::export_mesh(&connection, &identifier_of(settings)?, model_part).await
    }

    async fn import_mesh(&self, settings: &Info, model_part: &mut ModelPart) -> Result<Info> {
        let connection = self.connection(settings)?;
        exchange::import_mesh(&connection, &identifier_of(settings)?, model_part).await
    }

    async fn export_mesh_data(&self, settings: &Info, mesh: &MeshData) -> Result<Info> {
        let connection = self.connection(settings)?;
        exchange::export_mesh_data(&connection, &identifier_of(settings)?, mesh).await
    }

    async fn import_mesh_data(&self, settings: &Info, mesh: &mut MeshData) -> Result<Info> {
        let connection = self.connection(settings)?;
        exchange::import_mesh_data(&connection, &identifier_of(settings)?, mesh).await
    }

    fn register(&self, settings: &Info, function: Arc<dyn RemoteFunction>) -> Result<Info> {
        let connection = self.connection(settings)?;
        let function_name = settings.get_string("function_name")?;
        orchestrator::register(&connection, &function_name, function)?;
        Ok(Info::new()
            .with("connection_name", connection.name())
            .with("function_name", function_name))
    }

    async fn run(&self, settings: &Info) -> Result<Info> {
        let connection = self.connection(settings)?;
        orchestrator::run(&connection).await
    }

    async fn send_control_signal(&self, settings: &Info) -> Result<Info> {
        let connection = self.connection(settings)?;
        let control_signal = settings.get_string("control_signal")?;
        let nested = if settings.has("settings") {
            Some(settings.get_info("settings")?)
        } else {
            None
        };
        orchestrator::send_control_signal(&connection, &control_signal, nested.as_ref()).await
    }
}
