//! # Integration Fixtures
//!
//! A "solver" here is one `CoSimIo` instance. Pairs share a private
//! `InMemoryHub`, or a temporary working directory for sockets, so tests
//! can run in parallel.

pub mod connection;
pub mod exchange;
pub mod orchestration;
pub mod socket;

use cosim_bus::{CommunicationFormat, InMemoryHub};
use cosim_io::{CoSimApi, CoSimIo, Info, RuntimeConfig};
use std::future::Future;
use std::path::Path;
use std::time::Duration;

/// Upper bound for any single scenario step.
pub const STEP_DEADLINE: Duration = Duration::from_secs(10);

/// Fail the test instead of hanging when a rendezvous never completes.
pub async fn within_deadline<F: Future>(future: F) -> F::Output {
    match tokio::time::timeout(STEP_DEADLINE, future).await {
        Ok(output) => output,
        Err(_) => panic!("scenario step did not finish within {STEP_DEADLINE:?}"),
    }
}

pub fn in_memory_config() -> RuntimeConfig {
    RuntimeConfig {
        connect_timeout: Duration::from_secs(5),
        ..RuntimeConfig::default()
    }
}

pub fn socket_config(working_directory: &Path) -> RuntimeConfig {
    RuntimeConfig {
        communication_format: CommunicationFormat::Socket,
        working_directory: working_directory.to_path_buf(),
        connect_timeout: Duration::from_secs(5),
        ..RuntimeConfig::default()
    }
}

/// Two unconnected solvers sharing a private hub.
pub fn solver_pair(config: RuntimeConfig) -> (CoSimIo, CoSimIo) {
    let hub = InMemoryHub::new();
    (
        CoSimIo::with_hub(config.clone(), hub.clone()),
        CoSimIo::with_hub(config, hub),
    )
}

pub fn peer_settings(my_name: &str, connect_to: &str) -> Info {
    Info::new()
        .with("my_name", my_name)
        .with("connect_to", connect_to)
}

/// Connect `a` (as `a_name`) with `b` (as `b_name`); returns the shared
/// connection name.
pub async fn connect_pair(a: &CoSimIo, a_name: &str, b: &CoSimIo, b_name: &str) -> String {
    let settings_a = peer_settings(a_name, b_name);
    let settings_b = peer_settings(b_name, a_name);
    let (ra, rb) = within_deadline(async {
        tokio::join!(
            a.connect(&settings_a),
            b.connect(&settings_b),
        )
    })
    .await;
    let (ra, rb) = (ra.unwrap(), rb.unwrap());
    let name = ra.get_string("connection_name").unwrap();
    assert_eq!(rb.get_string("connection_name").unwrap(), name);
    name
}

pub async fn disconnect_pair(a: &CoSimIo, b: &CoSimIo, connection_name: &str) {
    let settings = Info::new().with("connection_name", connection_name);
    let (ra, rb) = within_deadline(async {
        tokio::join!(a.disconnect(&settings), b.disconnect(&settings))
    })
    .await;
    assert!(!ra.unwrap().get_bool("is_connected").unwrap());
    assert!(!rb.unwrap().get_bool("is_connected").unwrap());
}

/// Settings addressing `identifier` on `connection_name`.
pub fn on(connection_name: &str, identifier: &str) -> Info {
    Info::new()
        .with("connection_name", connection_name)
        .with("identifier", identifier)
}
