//! Structured logging setup.
//!
//! Every CoSim crate logs through `tracing`; this module installs the
//! subscriber that renders those events. Connection-scoped events carry a
//! consistent set of fields:
//! - `connection_name`: the resolved connection name
//! - `identifier`: the exchange identifier, where there is one
//! - `elapsed_time`: seconds spent in the operation

use crate::{TelemetryConfig, TelemetryError};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber described by `config`.
///
/// # Errors
///
/// `Config` for an unparsable log level, `AlreadyInitialized` if a global
/// subscriber is already set.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = build_filter(config)?;

    if !config.console_output {
        return tracing_subscriber::registry()
            .with(env_filter)
            .try_init()
            .map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()));
    }

    if config.json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
            .map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_ansi(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;
    }

    tracing::info!(
        service = %config.service_name,
        log_level = %config.log_level,
        json = config.json_logs,
        "Logging initialized"
    );
    Ok(())
}

/// Parse the configured level into an `EnvFilter`.
///
/// # Errors
///
/// `Config` if the directive is malformed.
pub fn build_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(&config.log_level).map_err(|e| {
        TelemetryError::Config(format!("invalid log level \"{}\": {e}", config.log_level))
    })
}

/// Level at which per-connection events are emitted for an `echo_level`.
///
/// | echo_level | connect / disconnect | each exchange |
/// |------------|----------------------|---------------|
/// | 0 | debug | trace |
/// | 1 | info | debug |
/// | >= 2 | info | info |
#[must_use]
pub fn level_for_echo_level(echo_level: i64, per_exchange: bool) -> Level {
    match (echo_level, per_exchange) {
        (e, false) if e > 0 => Level::INFO,
        (_, false) => Level::DEBUG,
        (e, true) if e > 1 => Level::INFO,
        (1, true) => Level::DEBUG,
        (_, true) => Level::TRACE,
    }
}

/// Emit an event at a level chosen at runtime.
///
/// `tracing` macros need a constant level, so this dispatches over the five.
#[macro_export]
macro_rules! event_at {
    ($level:expr, $($arg:tt)+) => {{
        let level: tracing::Level = $level;
        if level == tracing::Level::ERROR {
            tracing::error!($($arg)+)
        } else if level == tracing::Level::WARN {
            tracing::warn!($($arg)+)
        } else if level == tracing::Level::INFO {
            tracing::info!($($arg)+)
        } else if level == tracing::Level::DEBUG {
            tracing::debug!($($arg)+)
        } else {
            tracing::trace!($($arg)+)
        }
    }};
}

/// Span covering one connection-scoped operation.
#[macro_export]
macro_rules! connection_span {
    ($operation:expr, $connection_name:expr) => {
        tracing::info_span!(
            "cosim",
            operation = $operation,
            connection_name = %$connection_name,
        )
    };
    ($operation:expr, $connection_name:expr, $identifier:expr) => {
        tracing::info_span!(
            "cosim",
            operation = $operation,
            connection_name = %$connection_name,
            identifier = %$identifier,
        )
    };
}
