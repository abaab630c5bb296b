//! # Connection State Machine
//!
//! ```text
//! [NotConnected|Disconnected] ──connect──→ [Connecting] ──hello──→ [Connected]
//!                                               │                      │
//!                                               └─→ [ConnectionError]  disconnect
//!                                                                      ↓
//!            [Disconnected] ←──goodbye── [Disconnecting] ──→ [DisconnectionError]
//! ```
//!
//! The integer values of [`ConnectionStatus`] are reported under
//! `connection_status` and are stable.

use cosim_types::{CoSimError, Result};
use std::fmt;
use uuid::Uuid;

/// Life-cycle state of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionStatus {
    #[default]
    NotConnected,
    Connected,
    Disconnected,
    ConnectionError,
    DisconnectionError,
    Connecting,
    Disconnecting,
}

impl ConnectionStatus {
    /// Value reported under `connection_status`.
    #[must_use]
    pub fn as_int(self) -> i64 {
        match self {
            ConnectionStatus::NotConnected => 0,
            ConnectionStatus::Connected => 1,
            ConnectionStatus::Disconnected => 2,
            ConnectionStatus::ConnectionError => 3,
            ConnectionStatus::DisconnectionError => 4,
            ConnectionStatus::Connecting => 5,
            ConnectionStatus::Disconnecting => 6,
        }
    }

    #[must_use]
    pub fn from_int(value: i64) -> Option<Self> {
        Some(match value {
            0 => ConnectionStatus::NotConnected,
            1 => ConnectionStatus::Connected,
            2 => ConnectionStatus::Disconnected,
            3 => ConnectionStatus::ConnectionError,
            4 => ConnectionStatus::DisconnectionError,
            5 => ConnectionStatus::Connecting,
            6 => ConnectionStatus::Disconnecting,
            _ => return None,
        })
    }

    /// Whether moving from `self` to `next` is a legal step.
    #[must_use]
    pub fn can_transition_to(self, next: ConnectionStatus) -> bool {
        use ConnectionStatus::{
            ConnectionError, Connected, Connecting, Disconnected, DisconnectionError,
            Disconnecting, NotConnected,
        };
        matches!(
            (self, next),
            (NotConnected | Disconnected | ConnectionError, Connecting)
                | (Connecting, Connected | ConnectionError)
                | (Connected, Disconnecting)
                | (Disconnecting, Disconnected | DisconnectionError)
        )
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Identity and state of one side of a connection.
#[derive(Debug, Clone)]
pub struct Connection {
    name: String,
    my_name: String,
    connect_to: String,
    is_primary: bool,
    echo_level: i64,
    status: ConnectionStatus,
    /// Random id of this side's session, sent in the handshake.
    session_id: Uuid,
    partner_version: Option<String>,
    partner_session_id: Option<String>,
}

impl Connection {
    pub fn new(
        name: impl Into<String>,
        my_name: impl Into<String>,
        connect_to: impl Into<String>,
        is_primary: bool,
        echo_level: i64,
    ) -> Self {
        Self {
            name: name.into(),
            my_name: my_name.into(),
            connect_to: connect_to.into(),
            is_primary,
            echo_level,
            status: ConnectionStatus::NotConnected,
            session_id: Uuid::new_v4(),
            partner_version: None,
            partner_session_id: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn my_name(&self) -> &str {
        &self.my_name
    }

    #[must_use]
    pub fn connect_to(&self) -> &str {
        &self.connect_to
    }

    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    #[must_use]
    pub fn echo_level(&self) -> i64 {
        self.echo_level
    }

    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    #[must_use]
    pub fn partner_version(&self) -> Option<&str> {
        self.partner_version.as_deref()
    }

    #[must_use]
    pub fn partner_session_id(&self) -> Option<&str> {
        self.partner_session_id.as_deref()
    }

    /// Record what the peer announced in its handshake.
    pub fn set_partner(&mut self, version: impl Into<String>, session_id: impl Into<String>) {
        self.partner_version = Some(version.into());
        self.partner_session_id = Some(session_id.into());
    }

    /// Move to `next`.
    ///
    /// # Errors
    ///
    /// `ProtocolViolation` for an illegal step; the state is unchanged.
    pub fn transition(&mut self, next: ConnectionStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(CoSimError::ProtocolViolation(format!(
                "connection \"{}\" cannot go from {} to {}",
                self.name, self.status, next
            )));
        }
        self.status = next;
        Ok(())
    }

    /// Fail with `NotConnected` unless the connection is usable.
    ///
    /// # Errors
    ///
    /// `NotConnected` in any state but `Connected`.
    pub fn ensure_connected(&self) -> Result<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(CoSimError::NotConnected {
                connection_name: self.name.clone(),
            })
        }
    }
}
