//! # Rendezvous Data Exchange
//!
//! Every export is matched by exactly one import on the partner:
//!
//! ```text
//! exporter                          importer
//!    │ ── Frame(identifier, data) ──→ │  check identifier + payload kind
//!    │                                │  stage the result
//!    │ ←──────── Ack / Reject ─────── │
//! ```
//!
//! The exporter returns only after the importer has accepted the payload,
//! so each side observes the operations of a connection in program order
//! and at most one payload is in flight. A mismatch (identifier, payload
//! kind, or a payload the importer cannot apply) fails both sides with
//! `RendezvousFailure` / the importer's error, and the importer's target
//! is left untouched.
//!
//! After a timeout the channel may still hold a late frame; such a
//! connection should be disconnected.

use super::active::ActiveConnection;
use cosim_bus::{Frame, Payload, TransportError};
use cosim_telemetry::{event_at, level_for_echo_level};
use cosim_types::{CoSimError, Info, MeshData, ModelPart, ModelPartPayload, Result, Vector};
use std::time::Instant;
use tracing::{debug, info};

// =============================================================================
// CORE
// =============================================================================

/// Map a transport failure during a rendezvous.
fn rendezvous_error(connection: &ActiveConnection, identifier: &str, e: TransportError) -> CoSimError {
    let reason = match e {
        TransportError::Timeout(limit) => {
            format!("no matching operation from the partner within {limit:?}")
        }
        TransportError::Closed => "the partner closed the connection".to_string(),
        other => return other.into(),
    };
    CoSimError::RendezvousFailure {
        connection_name: connection.name().to_string(),
        identifier: identifier.to_string(),
        reason,
    }
}

fn mismatch(connection: &ActiveConnection, identifier: &str, reason: String) -> CoSimError {
    CoSimError::RendezvousFailure {
        connection_name: connection.name().to_string(),
        identifier: identifier.to_string(),
        reason,
    }
}

/// Send `payload` and wait until the partner accepted it.
pub(crate) async fn export_payload(
    connection: &ActiveConnection,
    identifier: &str,
    payload: Payload,
) -> Result<()> {
    connection.ensure_connected()?;
    let mut channel = connection.channel().lock().await;

    channel
        .send(&Frame::new(identifier, payload))
        .await
        .map_err(|e| rendezvous_error(connection, identifier, e))?;

    let reply = channel
        .recv()
        .await
        .map_err(|e| rendezvous_error(connection, identifier, e))?;

    match reply.payload {
        Payload::Ack if reply.identifier == identifier => Ok(()),
        Payload::Reject(reason) => Err(mismatch(connection, identifier, reason)),
        other => Err(mismatch(
            connection,
            identifier,
            format!(
                "expected an acknowledgement, the partner sent {} \"{}\"",
                other.kind(),
                reply.identifier
            ),
        )),
    }
}

/// Wait for the partner's payload under `identifier`, of kind `expected`.
///
/// `accept` turns the payload into the caller's result; the partner gets
/// an Ack only if it succeeds, a Reject carrying the error otherwise.
pub(crate) async fn import_payload<T>(
    connection: &ActiveConnection,
    identifier: &str,
    expected: &'static str,
    accept: impl FnOnce(Payload) -> Result<T>,
) -> Result<T> {
    connection.ensure_connected()?;
    let mut channel = connection.channel().lock().await;

    let frame = channel
        .recv()
        .await
        .map_err(|e| rendezvous_error(connection, identifier, e))?;

    let refusal = if frame.identifier != identifier {
        Some(format!(
            "expected identifier \"{identifier}\", the partner exported \"{}\"",
            frame.identifier
        ))
    } else if frame.payload.kind() != expected {
        Some(format!(
            "expected {expected} for \"{identifier}\", the partner sent {}",
            frame.payload.kind()
        ))
    } else {
        None
    };

    let outcome = match refusal {
        Some(reason) => Err(mismatch(connection, identifier, reason)),
        None => accept(frame.payload),
    };

    let reply = match &outcome {
        Ok(_) => Payload::Ack,
        Err(e) => Payload::Reject(e.to_string()),
    };
    if let Err(e) = channel.send(&Frame::new(frame.identifier, reply)).await {
        if outcome.is_ok() {
            return Err(rendezvous_error(connection, identifier, e));
        }
        debug!(connection_name = connection.name(), error = %e, "Could not deliver rejection");
    }
    outcome
}

fn unexpected(payload: &Payload) -> CoSimError {
    CoSimError::ProtocolViolation(format!("unexpected {} payload", payload.kind()))
}

fn finish(connection: &ActiveConnection, operation: &str, identifier: &str, start: Instant) -> Info {
    let elapsed_time = start.elapsed().as_secs_f64();
    event_at!(
        level_for_echo_level(connection.echo_level(), true),
        connection_name = connection.name(),
        identifier,
        elapsed_time,
        "{operation} done"
    );
    if connection.print_timing() {
        info!(
            connection_name = connection.name(),
            identifier,
            elapsed_time,
            "{operation} took {elapsed_time:.6} s"
        );
    }
    Info::new()
        .with("connection_name", connection.name())
        .with("identifier", identifier)
        .with("elapsed_time", elapsed_time)
}

fn count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Transfer a whole `Info`.
pub async fn export_info(connection: &ActiveConnection, identifier: &str, info: &Info) -> Result<Info> {
    let start = Instant::now();
    export_payload(connection, identifier, Payload::Info(info.clone())).await?;
    Ok(finish(connection, "export_info", identifier, start))
}

/// Receive an `Info`; returns it as sent by the partner.
pub async fn import_info(connection: &ActiveConnection, identifier: &str) -> Result<Info> {
    import_info_with(connection, identifier, Ok).await
}

/// As [`import_info`], with a check the `Info` must pass before it is
/// acknowledged.
pub(crate) async fn import_info_with(
    connection: &ActiveConnection,
    identifier: &str,
    check: impl FnOnce(Info) -> Result<Info>,
) -> Result<Info> {
    let start = Instant::now();
    let imported = import_payload(connection, identifier, "info", |payload| match payload {
        Payload::Info(info) => check(info),
        other => Err(unexpected(&other)),
    })
    .await?;
    finish(connection, "import_info", identifier, start);
    Ok(imported)
}

pub async fn export_data(connection: &ActiveConnection, identifier: &str, values: &[f64]) -> Result<Info> {
    let start = Instant::now();
    export_payload(connection, identifier, Payload::Data(values.to_vec())).await?;
    Ok(finish(connection, "export_data", identifier, start).with("size", count(values.len())))
}

/// Receive field data; `values` is resized to the transferred length.
pub async fn import_data(
    connection: &ActiveConnection,
    identifier: &str,
    values: &mut Vector,
) -> Result<Info> {
    let start = Instant::now();
    let received = import_payload(connection, identifier, "data", |payload| match payload {
        Payload::Data(data) => Ok(data),
        other => Err(unexpected(&other)),
    })
    .await?;

    let size = count(received.len());
    *values = Vector::from(received);
    Ok(finish(connection, "import_data", identifier, start).with("size", size))
}

/// Transfer the nodes and elements of `model_part` with their ids.
pub async fn export_mesh(
    connection: &ActiveConnection,
    identifier: &str,
    model_part: &ModelPart,
) -> Result<Info> {
    let start = Instant::now();
    let payload = ModelPartPayload::from_model_part(model_part);
    let (nodes, elements) = (payload.number_of_nodes(), payload.number_of_elements());
    export_payload(connection, identifier, Payload::ModelPart(payload)).await?;
    Ok(finish(connection, "export_mesh", identifier, start)
        .with("number_of_nodes", count(nodes))
        .with("number_of_elements", count(elements)))
}

/// Add the partner's nodes and elements to `model_part`. Existing content
/// is kept; on any error `model_part` is unchanged.
pub async fn import_mesh(
    connection: &ActiveConnection,
    identifier: &str,
    model_part: &mut ModelPart,
) -> Result<Info> {
    let start = Instant::now();
    let current: &ModelPart = model_part;
    let (staged, nodes, elements) =
        import_payload(connection, identifier, "model_part", |payload| match payload {
            Payload::ModelPart(payload) => {
                let mut staged = current.clone();
                payload.apply_to(&mut staged)?;
                Ok((staged, payload.number_of_nodes(), payload.number_of_elements()))
            }
            other => Err(unexpected(&other)),
        })
        .await?;

    *model_part = staged;
    Ok(finish(connection, "import_mesh", identifier, start)
        .with("number_of_nodes", count(nodes))
        .with("number_of_elements", count(elements)))
}

/// Transfer raw mesh arrays.
pub async fn export_mesh_data(
    connection: &ActiveConnection,
    identifier: &str,
    mesh: &MeshData,
) -> Result<Info> {
    let start = Instant::now();
    mesh.validate()?;
    export_payload(connection, identifier, Payload::Mesh(mesh.clone())).await?;
    Ok(finish(connection, "export_mesh_data", identifier, start)
        .with("number_of_nodes", count(mesh.number_of_nodes()))
        .with("number_of_elements", count(mesh.number_of_elements())))
}

/// Receive raw mesh arrays into `mesh`, replacing its content. The arrays
/// are validated before they are acknowledged.
pub async fn import_mesh_data(
    connection: &ActiveConnection,
    identifier: &str,
    mesh: &mut MeshData,
) -> Result<Info> {
    let start = Instant::now();
    let received = import_payload(connection, identifier, "mesh", |payload| match payload {
        Payload::Mesh(received) => {
            received.validate()?;
            Ok(received)
        }
        other => Err(unexpected(&other)),
    })
    .await?;

    *mesh = received;
    Ok(finish(connection, "import_mesh_data", identifier, start)
        .with("number_of_nodes", count(mesh.number_of_nodes()))
        .with("number_of_elements", count(mesh.number_of_elements())))
}
