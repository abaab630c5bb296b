//! # Wire Frames
//!
//! A frame is one message of the coupling protocol: the exchange
//! identifier plus a typed payload.
//!
//! ```text
//! [u16 BE: PROTOCOL_VERSION][bincode(Frame)]
//! ```

use crate::transport::TransportError;
use crate::{MAX_FRAME_SIZE, PROTOCOL_VERSION};
use cosim_types::{Info, MeshData, ModelPartPayload};
use serde::{Deserialize, Serialize};

/// One protocol message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Exchange identifier the payload belongs to.
    pub identifier: String,
    pub payload: Payload,
}

/// Frame content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    /// Connection handshake (names, versions).
    Hello(Info),
    /// Disconnection handshake.
    Goodbye(Info),
    Info(Info),
    Data(Vec<f64>),
    Mesh(MeshData),
    ModelPart(ModelPartPayload),
    /// Importer accepted the frame.
    Ack,
    /// Importer refused the frame, with the reason.
    Reject(String),
}

impl Payload {
    /// Short name used in logs and rejection messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Hello(_) => "hello",
            Payload::Goodbye(_) => "goodbye",
            Payload::Info(_) => "info",
            Payload::Data(_) => "data",
            Payload::Mesh(_) => "mesh",
            Payload::ModelPart(_) => "model_part",
            Payload::Ack => "ack",
            Payload::Reject(_) => "reject",
        }
    }
}

impl Frame {
    pub fn new(identifier: impl Into<String>, payload: Payload) -> Self {
        Self {
            identifier: identifier.into(),
            payload,
        }
    }
}

/// Serialize a frame behind the protocol version header.
///
/// # Errors
///
/// `Codec` if serialization fails, `FrameTooLarge` above [`MAX_FRAME_SIZE`].
pub fn encode(frame: &Frame) -> Result<Vec<u8>, TransportError> {
    let body = bincode::serialize(frame).map_err(|e| TransportError::Codec(e.to_string()))?;
    let size = body.len() + 2;
    if size > MAX_FRAME_SIZE {
        return Err(TransportError::FrameTooLarge {
            size,
            max: MAX_FRAME_SIZE,
        });
    }

    let mut bytes = Vec::with_capacity(size);
    bytes.extend_from_slice(&PROTOCOL_VERSION.to_be_bytes());
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Parse bytes produced by [`encode`].
///
/// # Errors
///
/// `VersionMismatch` for a foreign protocol version, `Codec` for malformed
/// bytes.
pub fn decode(bytes: &[u8]) -> Result<Frame, TransportError> {
    let Some((header, body)) = bytes.split_first_chunk::<2>() else {
        return Err(TransportError::Codec(format!(
            "frame of {} bytes has no version header",
            bytes.len()
        )));
    };
    let version = u16::from_be_bytes(*header);
    if version != PROTOCOL_VERSION {
        return Err(TransportError::VersionMismatch {
            expected: PROTOCOL_VERSION,
            actual: version,
        });
    }
    bincode::deserialize(body).map_err(|e| TransportError::Codec(e.to_string()))
}
