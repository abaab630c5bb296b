//! # Runtime Configuration
//!
//! Process defaults come from the environment ([`RuntimeConfig::from_env`]);
//! the settings `Info` passed to `connect` overrides them per connection
//! ([`RuntimeConfig::resolve`]).
//!
//! | Variable | Setting key | Default |
//! |----------|-------------|---------|
//! | `COSIM_COMMUNICATION_FORMAT` | `communication_format` | `in_memory` |
//! | `COSIM_WORKING_DIRECTORY` | `working_directory` | `.` |
//! | `COSIM_ECHO_LEVEL` | `echo_level` | `0` |
//! | `COSIM_RENDEZVOUS_TIMEOUT` | `rendezvous_timeout` | none (wait forever) |
//! | `COSIM_CONNECT_TIMEOUT` | `connect_timeout` | `60` seconds |

use crate::domain::{connection_name_from, is_primary_by_name};
use cosim_bus::CommunicationFormat;
use cosim_types::{CoSimError, Info, InfoValue, Result};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Process-wide defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub communication_format: CommunicationFormat,
    pub working_directory: PathBuf,
    pub echo_level: i64,
    /// Upper bound for a single rendezvous; `None` waits indefinitely.
    pub rendezvous_timeout: Option<Duration>,
    /// Upper bound for reaching the peer in `connect`.
    pub connect_timeout: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            communication_format: CommunicationFormat::InMemory,
            working_directory: PathBuf::from("."),
            echo_level: 0,
            rendezvous_timeout: None,
            connect_timeout: Duration::from_secs(60),
        }
    }
}

impl RuntimeConfig {
    /// Create configuration from `COSIM_*` environment variables.
    ///
    /// Unparsable values fall back to the default with a warning.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`RuntimeConfig::from_env`], reading variables through
    /// `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let communication_format = lookup("COSIM_COMMUNICATION_FORMAT")
            .and_then(|v| match v.parse() {
                Ok(format) => Some(format),
                Err(e) => {
                    warn!(value = %v, error = %e, "Ignoring COSIM_COMMUNICATION_FORMAT");
                    None
                }
            })
            .unwrap_or(defaults.communication_format);

        Self {
            communication_format,
            working_directory: lookup("COSIM_WORKING_DIRECTORY")
                .map(PathBuf::from)
                .unwrap_or(defaults.working_directory),
            echo_level: lookup("COSIM_ECHO_LEVEL")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.echo_level),
            rendezvous_timeout: lookup("COSIM_RENDEZVOUS_TIMEOUT")
                .and_then(|v| v.parse::<f64>().ok())
                .and_then(seconds)
                .or(defaults.rendezvous_timeout),
            connect_timeout: lookup("COSIM_CONNECT_TIMEOUT")
                .and_then(|v| v.parse::<f64>().ok())
                .and_then(seconds)
                .unwrap_or(defaults.connect_timeout),
        }
    }

    /// Combine these defaults with the settings of one `connect` call.
    ///
    /// # Errors
    ///
    /// - `InvalidName` for bad or missing names
    /// - `TypeMismatch` for settings of the wrong type
    /// - `Transport` for an unknown `communication_format`
    pub fn resolve(&self, settings: &Info) -> Result<ConnectionSettings> {
        let my_name = settings.get_string_or("my_name", "")?;
        let connect_to = settings.get_string_or("connect_to", "")?;

        let connection_name = connection_name_from(settings)?;

        let primary_was_explicitly_specified = settings.has("is_primary_connection");
        let is_primary = if primary_was_explicitly_specified {
            settings.get_bool("is_primary_connection")?
        } else {
            !my_name.is_empty() && is_primary_by_name(&my_name, &connect_to)
        };

        let communication_format = if settings.has("communication_format") {
            settings
                .get_string("communication_format")?
                .parse()
                .map_err(CoSimError::from)?
        } else {
            self.communication_format
        };

        let working_directory = if settings.has("working_directory") {
            PathBuf::from(settings.get_string("working_directory")?)
        } else {
            self.working_directory.clone()
        };

        Ok(ConnectionSettings {
            connection_name,
            my_name,
            connect_to,
            is_primary,
            primary_was_explicitly_specified,
            echo_level: settings.get_int_or("echo_level", self.echo_level)?,
            communication_format,
            working_directory,
            rendezvous_timeout: match get_seconds(settings, "rendezvous_timeout")? {
                Some(timeout) => Some(timeout),
                None => self.rendezvous_timeout,
            },
            connect_timeout: get_seconds(settings, "connect_timeout")?
                .unwrap_or(self.connect_timeout),
            print_timing: settings.get_bool_or("print_timing", false)?,
        })
    }
}

/// Everything `connect` needs, after defaults are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionSettings {
    pub connection_name: String,
    pub my_name: String,
    pub connect_to: String,
    pub is_primary: bool,
    pub primary_was_explicitly_specified: bool,
    pub echo_level: i64,
    pub communication_format: CommunicationFormat,
    pub working_directory: PathBuf,
    pub rendezvous_timeout: Option<Duration>,
    pub connect_timeout: Duration,
    /// Log the duration of every exchange at info level.
    pub print_timing: bool,
}

/// Load connection settings from a JSON object file.
///
/// # Errors
///
/// `Io` if the file cannot be read or parsed, `TypeMismatch` for values
/// with no `Info` representation.
pub fn settings_from_json_file(path: &Path) -> Result<Info> {
    let text = std::fs::read_to_string(path)?;
    Info::from_json_str(&text)
}

fn seconds(value: f64) -> Option<Duration> {
    (value.is_finite() && value > 0.0).then(|| Duration::from_secs_f64(value))
}

/// Read a positive number of seconds given as int or double.
fn get_seconds(settings: &Info, key: &str) -> Result<Option<Duration>> {
    match settings.get_value(key) {
        None => Ok(None),
        Some(InfoValue::Int(i)) => Ok(seconds(*i as f64)),
        Some(InfoValue::Double(d)) => Ok(seconds(*d)),
        Some(other) => Err(CoSimError::TypeMismatch {
            key: key.to_string(),
            expected: "double",
            found: other.type_name(),
        }),
    }
}
