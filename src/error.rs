//! Error types for the Crisis Survival client.

use thiserror::Error;

/// Errors that can occur when using the Crisis Survival client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Failed to send a message through the transport.
    #[error("transport send error: {0}")]
    TransportSend(String),

    /// Failed to receive a message from the transport.
    #[error("transport receive error: {0}")]
    TransportReceive(String),

    /// The transport connection was closed.
    #[error("transport connection closed")]
    TransportClosed,

    /// Failed to serialize an outbound protocol message.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The client's background loop has exited; no further intents are accepted.
    #[error("client is not running")]
    NotConnected,

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors produced while decoding an inbound wire message.
///
/// A decode error is never fatal: the dispatcher logs it and drops the message.
/// Unknown `type` tags are *not* errors; see [`crate::codec::decode`].
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The message is not valid JSON, or not a JSON object.
    #[error("malformed message: {0}")]
    Malformed(String),

    /// The message has no string `type` field.
    #[error("message has no `type` tag")]
    MissingTag,

    /// The tag is known but the payload does not match its shape.
    #[error("invalid `{tag}` payload: {source}")]
    InvalidPayload {
        /// The `type` tag of the rejected message.
        tag: String,
        /// The underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },
}

/// A specialized [`Result`] type for Crisis Survival client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
