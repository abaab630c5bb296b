//! # CoSim Telemetry
//!
//! Log output for coupled solvers. The library crates only emit `tracing`
//! events; a participant binary (or a test) calls [`init_logging`] once to
//! decide how they are rendered.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cosim_telemetry::{init_logging, TelemetryConfig};
//!
//! let config = TelemetryConfig::for_solver("fluid");
//! init_logging(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `COSIM_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `COSIM_JSON_LOGS` | `false` | JSON lines instead of pretty output |
//! | `COSIM_CONSOLE_OUTPUT` | `true` | Write logs to stdout at all |
//! | `COSIM_SERVICE_NAME` | `cosim` | Service name in the startup record |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{build_filter, init_logging, level_for_echo_level};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}
