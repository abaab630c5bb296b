//! # Connection Lifecycle
//!
//! ```text
//! connect:     reserve name → open channel → Hello ⇄ Hello → activate
//! disconnect:  remove name  → Goodbye ⇄ Goodbye → close channel
//! ```
//!
//! The handshake is bounded by `connect_timeout`; afterwards the channel
//! uses `rendezvous_timeout` for every exchange. A failed `connect` releases
//! the name so it can be retried.

use super::active::ActiveConnection;
use super::registry::ConnectionRegistry;
use crate::config::{ConnectionSettings, RuntimeConfig};
use crate::domain::{connection_name_from, Connection, ConnectionStatus};
use crate::version::{version_major, version_minor, version_string};
use cosim_bus::{
    create_transport, ChannelContext, Frame, FramedChannel, InMemoryHub, Payload, TransportError,
};
use cosim_telemetry::{connection_span, event_at, level_for_echo_level};
use cosim_types::{CoSimError, Info, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn, Instrument};

const CONNECT_IDENTIFIER: &str = "connect";
const DISCONNECT_IDENTIFIER: &str = "disconnect";

// =============================================================================
// CONNECT
// =============================================================================

/// Establish the connection described by `settings` and register it.
pub async fn connect(
    registry: &ConnectionRegistry,
    hub: &InMemoryHub,
    config: &RuntimeConfig,
    settings: &Info,
) -> Result<Info> {
    let start = Instant::now();
    let resolved = config.resolve(settings)?;
    let name = resolved.connection_name.clone();

    registry.reserve(&name)?;

    let established = establish(hub, &resolved)
        .instrument(connection_span!("connect", name))
        .await;

    match established {
        Ok(active) => {
            let active = Arc::new(active);
            registry.activate(active.clone());

            let snapshot = active.snapshot();
            let elapsed_time = start.elapsed().as_secs_f64();
            event_at!(
                level_for_echo_level(resolved.echo_level, false),
                connection_name = %name,
                is_primary = snapshot.is_primary(),
                communication_format = %resolved.communication_format,
                partner_version = snapshot.partner_version().unwrap_or("unknown"),
                elapsed_time,
                "Connection established"
            );

            Ok(Info::new()
                .with("connection_name", name.as_str())
                .with("connection_status", snapshot.status().as_int())
                .with("is_connected", snapshot.is_connected())
                .with("is_primary_connection", snapshot.is_primary())
                .with("my_name", snapshot.my_name())
                .with("connect_to", snapshot.connect_to())
                .with("partner_version", snapshot.partner_version().unwrap_or(""))
                .with("elapsed_time", elapsed_time))
        }
        Err(e) => {
            registry.remove(&name);
            warn!(connection_name = %name, error = %e, "Connection failed");
            Err(e)
        }
    }
}

async fn establish(hub: &InMemoryHub, settings: &ConnectionSettings) -> Result<ActiveConnection> {
    let mut connection = Connection::new(
        settings.connection_name.as_str(),
        settings.my_name.as_str(),
        settings.connect_to.as_str(),
        settings.is_primary,
        settings.echo_level,
    );
    connection.transition(ConnectionStatus::Connecting)?;

    let context = ChannelContext::new(settings.connection_name.as_str(), settings.is_primary)
        .with_working_directory(settings.working_directory.as_path())
        .with_open_timeout(settings.connect_timeout);

    let transport = create_transport(settings.communication_format, hub);
    let mut channel = FramedChannel::new(transport, Some(settings.connect_timeout));
    debug!(transport = channel.kind(), is_primary = settings.is_primary, "Opening channel");

    channel
        .open(&context)
        .await
        .map_err(|e| connect_error(&settings.connection_name, e))?;

    if let Err(e) = handshake(&mut channel, &mut connection, settings).await {
        if let Err(close_error) = channel.close().await {
            debug!(error = %close_error, "Closing channel after failed handshake");
        }
        return Err(e);
    }

    channel.set_timeout(settings.rendezvous_timeout);
    connection.transition(ConnectionStatus::Connected)?;
    Ok(ActiveConnection::new(connection, channel, settings.print_timing))
}

fn connect_error(connection_name: &str, e: TransportError) -> CoSimError {
    match e {
        TransportError::Timeout(limit) => CoSimError::Transport(format!(
            "partner of connection \"{connection_name}\" did not connect within {limit:?}"
        )),
        other => other.into(),
    }
}

fn hello(connection: &Connection, settings: &ConnectionSettings) -> Info {
    Info::new()
        .with("connection_name", connection.name())
        .with("my_name", connection.my_name())
        .with("connect_to", connection.connect_to())
        .with("version_major", version_major())
        .with("version_minor", version_minor())
        .with("is_primary_connection", connection.is_primary())
        .with(
            "primary_was_explicitly_specified",
            settings.primary_was_explicitly_specified,
        )
        .with("session_id", connection.session_id().to_string())
}

/// Exchange `Hello` with the partner and check it describes the same
/// connection seen from the other side.
async fn handshake(
    channel: &mut FramedChannel,
    connection: &mut Connection,
    settings: &ConnectionSettings,
) -> Result<()> {
    let name = connection.name().to_string();

    channel
        .send(&Frame::new(CONNECT_IDENTIFIER, Payload::Hello(hello(connection, settings))))
        .await
        .map_err(|e| connect_error(&name, e))?;
    let frame = channel.recv().await.map_err(|e| connect_error(&name, e))?;

    let partner = match frame.payload {
        Payload::Hello(partner) => partner,
        other => {
            return Err(CoSimError::ProtocolViolation(format!(
                "expected a handshake on connection \"{name}\", received {}",
                other.kind()
            )))
        }
    };

    let partner_major = partner.get_int("version_major")?;
    let partner_minor = partner.get_int("version_minor")?;
    let partner_version = format!("{partner_major}.{partner_minor}");
    if partner_major != version_major() {
        return Err(CoSimError::IncompatibleVersion {
            mine: version_string(),
            partner: partner_version,
        });
    }
    if partner_minor != version_minor() {
        warn!(
            connection_name = %name,
            mine = %version_string(),
            partner = %partner_version,
            "Partner uses a different minor version"
        );
    }

    let partner_name = partner.get_string("connection_name")?;
    if partner_name != name {
        return Err(CoSimError::ProtocolViolation(format!(
            "partner joined connection \"{partner_name}\" instead of \"{name}\""
        )));
    }

    let partner_my_name = partner.get_string_or("my_name", "")?;
    let partner_connect_to = partner.get_string_or("connect_to", "")?;
    let named_on_both_sides = !connection.my_name().is_empty() && !partner_my_name.is_empty();
    if named_on_both_sides
        && (partner_connect_to != connection.my_name() || partner_my_name != connection.connect_to())
    {
        return Err(CoSimError::ProtocolViolation(format!(
            "\"{}\" expected to connect to \"{}\" but the partner is \"{partner_my_name}\" connecting to \"{partner_connect_to}\"",
            connection.my_name(),
            connection.connect_to()
        )));
    }

    let partner_primary = partner.get_bool_or("is_primary_connection", false)?;
    let partner_explicit = partner.get_bool_or("primary_was_explicitly_specified", false)?;
    if settings.primary_was_explicitly_specified
        && partner_explicit
        && partner_primary == connection.is_primary()
    {
        return Err(CoSimError::ProtocolViolation(format!(
            "both sides of connection \"{name}\" declared is_primary_connection = {partner_primary}"
        )));
    }

    connection.set_partner(partner_version, partner.get_string_or("session_id", "")?);
    Ok(())
}

// =============================================================================
// DISCONNECT
// =============================================================================

/// Close the connection addressed by `settings` and drop it from `registry`.
///
/// An unknown name is not an error: the result carries
/// `DisconnectionError` and an `error` message.
pub async fn disconnect(registry: &ConnectionRegistry, settings: &Info) -> Result<Info> {
    let start = Instant::now();
    let name = connection_name_from(settings)?;

    let Some(active) = registry.remove(&name) else {
        warn!(connection_name = %name, "Disconnect requested for a connection that is not connected");
        return Ok(Info::new()
            .with("connection_name", name.as_str())
            .with("connection_status", ConnectionStatus::DisconnectionError.as_int())
            .with("is_connected", false)
            .with(
                "error",
                format!("connection \"{name}\" does not exist or was already disconnected"),
            ));
    };

    active.transition(ConnectionStatus::Disconnecting)?;
    let outcome = goodbye(&active)
        .instrument(connection_span!("disconnect", name))
        .await;

    let status = match &outcome {
        Ok(()) => ConnectionStatus::Disconnected,
        Err(e) => {
            warn!(connection_name = %name, error = %e, "Disconnect handshake failed");
            ConnectionStatus::DisconnectionError
        }
    };
    active.transition(status)?;

    let elapsed_time = start.elapsed().as_secs_f64();
    event_at!(
        level_for_echo_level(active.echo_level(), false),
        connection_name = %name,
        status = %status,
        elapsed_time,
        "Connection closed"
    );

    let mut result = Info::new()
        .with("connection_name", name.as_str())
        .with("connection_status", status.as_int())
        .with("is_connected", false)
        .with("elapsed_time", elapsed_time);
    if let Err(e) = outcome {
        result.set_string("error", e.to_string());
    }
    Ok(result)
}

/// Exchange `Goodbye` and close the channel. The channel is closed even if
/// the exchange fails.
async fn goodbye(active: &ActiveConnection) -> Result<()> {
    let snapshot = active.snapshot();
    let mut channel = active.channel().lock().await;

    let farewell = Info::new()
        .with("connection_name", snapshot.name())
        .with("my_name", snapshot.my_name());

    let exchanged = async {
        channel
            .send(&Frame::new(DISCONNECT_IDENTIFIER, Payload::Goodbye(farewell)))
            .await?;
        let frame = channel.recv().await?;
        Ok::<_, TransportError>(frame)
    }
    .await;

    let closed = channel.close().await;

    let frame = exchanged.map_err(CoSimError::from)?;
    closed.map_err(CoSimError::from)?;
    match frame.payload {
        Payload::Goodbye(_) => Ok(()),
        other => Err(CoSimError::ProtocolViolation(format!(
            "expected the partner to disconnect, received {} \"{}\"",
            other.kind(),
            frame.identifier
        ))),
    }
}
