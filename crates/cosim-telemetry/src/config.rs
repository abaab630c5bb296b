//! Telemetry configuration from environment variables.

use std::env;

/// Configuration of the log output of one participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error, or an EnvFilter
    /// directive such as `cosim_io=debug`)
    pub log_level: String,

    /// Whether to enable console output
    pub console_output: bool,

    /// Whether to format logs as JSON lines
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "cosim".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `COSIM_SERVICE_NAME`: Service name (default: cosim)
    /// - `COSIM_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `COSIM_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `COSIM_JSON_LOGS`: Enable JSON logs (default: false)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`TelemetryConfig::from_env`], reading variables through
    /// `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            service_name: lookup("COSIM_SERVICE_NAME").unwrap_or(defaults.service_name),

            log_level: lookup("COSIM_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            console_output: lookup("COSIM_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.console_output),

            json_logs: lookup("COSIM_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.json_logs),
        }
    }

    /// Configuration for a named solver, e.g. `"fluid"`.
    #[must_use]
    pub fn for_solver(solver_name: &str) -> Self {
        let mut config = Self::from_env();
        config.service_name = format!("cosim-{solver_name}");
        config
    }
}
