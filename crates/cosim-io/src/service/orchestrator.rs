//! # Remote Solver Control
//!
//! The controlled side registers functions and enters [`run`]; the
//! controlling side calls [`send_control_signal`] with a function name for
//! every step it wants executed, and `exit` to end the loop.
//!
//! A control signal is an `Info` exchanged under the `run_control`
//! identifier. A name with no registered function is refused during the
//! rendezvous, so the controller sees the failure as well.

use super::active::ActiveConnection;
use super::exchange;
use crate::domain::{check_entry, EXIT_SIGNAL};
use crate::ports::RemoteFunction;
use cosim_types::{CoSimError, Info, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Identifier of control-signal exchanges.
pub const RUN_CONTROL_IDENTIFIER: &str = "run_control";

/// Make `function` callable by the partner under `function_name`.
///
/// # Errors
///
/// - `InvalidName` for a malformed name or the reserved `exit`
/// - `DuplicateFunction` if the name is taken on this connection
pub fn register(
    connection: &ActiveConnection,
    function_name: &str,
    function: Arc<dyn RemoteFunction>,
) -> Result<()> {
    check_entry(function_name, "function_name")?;
    if function_name == EXIT_SIGNAL {
        return Err(CoSimError::invalid_name(
            function_name,
            format!("\"{EXIT_SIGNAL}\" is reserved for ending the run loop"),
        ));
    }
    connection.register_function(function_name, function)?;
    debug!(
        connection_name = connection.name(),
        function_name,
        "Function registered"
    );
    Ok(())
}

/// Execute control signals from the partner until it sends `exit`.
///
/// Each registered function receives the signal's nested `settings` with
/// `connection_name` added.
///
/// # Errors
///
/// - `ProtocolViolation` for a signal naming no registered function or a
///   control message without a string `control_signal`
/// - any error returned by a registered function
/// - rendezvous failures of the control exchange
pub async fn run(connection: &ActiveConnection) -> Result<Info> {
    let start = Instant::now();
    let mut number_of_calls: i64 = 0;

    loop {
        let control =
            exchange::import_info_with(connection, RUN_CONTROL_IDENTIFIER, |control| {
                let signal = control.get_string("control_signal").map_err(|e| {
                    CoSimError::ProtocolViolation(format!(
                        "malformed control message on connection \"{}\": {e}",
                        connection.name()
                    ))
                })?;
                if signal != EXIT_SIGNAL && connection.function(&signal).is_none() {
                    return Err(CoSimError::ProtocolViolation(format!(
                        "\"{signal}\" is not a registered function of connection \"{}\"; registered: [{}]",
                        connection.name(),
                        connection.function_names().join(", ")
                    )));
                }
                Ok(control)
            })
            .await?;

        let signal = control.get_string("control_signal")?;
        if signal == EXIT_SIGNAL {
            break;
        }

        let Some(function) = connection.function(&signal) else {
            return Err(CoSimError::ProtocolViolation(format!(
                "function \"{signal}\" disappeared from connection \"{}\"",
                connection.name()
            )));
        };

        let mut input = control.get_info_or("settings", Info::new())?;
        input.set_string("connection_name", connection.name());

        let output = function.invoke(input).await?;
        number_of_calls += 1;
        debug!(
            connection_name = connection.name(),
            function_name = %signal,
            output = %output,
            "Function executed"
        );
    }

    let elapsed_time = start.elapsed().as_secs_f64();
    info!(
        connection_name = connection.name(),
        number_of_calls,
        elapsed_time,
        "Run loop finished"
    );
    Ok(Info::new()
        .with("connection_name", connection.name())
        .with("number_of_calls", number_of_calls)
        .with("elapsed_time", elapsed_time))
}

/// Ask the partner's `run` loop to execute `control_signal`.
///
/// # Errors
///
/// `InvalidName` for a malformed signal; `RendezvousFailure` if the partner
/// refused it.
pub async fn send_control_signal(
    connection: &ActiveConnection,
    control_signal: &str,
    settings: Option<&Info>,
) -> Result<Info> {
    check_entry(control_signal, "control_signal")?;

    let mut control = Info::new().with("control_signal", control_signal);
    if let Some(settings) = settings {
        control.set_info("settings", settings);
    }
    let result = exchange::export_info(connection, RUN_CONTROL_IDENTIFIER, &control).await?;
    Ok(result.with("control_signal", control_signal))
}
