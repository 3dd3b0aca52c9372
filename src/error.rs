//! Crate-wide error types for the boundaries that can fail: decoding a
//! datagram, a socket operation, and stage startup.

use thiserror::Error;

/// Failure decoding a fixed-layout record from raw bytes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("datagram too short: expected at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },

    #[error("record contains a non-finite position or velocity component")]
    NonFinite,

    #[error("trackId must be >= 1")]
    InvalidTrackId,

    #[error("timestamp field is negative")]
    NegativeTimestamp,
}

/// Failure in the socket abstraction.
#[derive(Debug, Error)]
pub enum SocketError {
    #[error("failed to bind {endpoint}: {source}")]
    Bind {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to join multicast group at {endpoint}: {source}")]
    Join {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    #[error("send failed: {0}")]
    Send(std::io::Error),

    #[error("receive failed: {0}")]
    Receive(std::io::Error),

    #[error("endpoint is malformed: {0}")]
    InvalidEndpoint(String),
}

/// Failure bringing a stage's children up (`start()` returns false,
/// but the caller wants to know why, for the critical startup log line).
#[derive(Debug, Error)]
pub enum StartError {
    #[error("socket error on endpoint {endpoint}: {source}")]
    Socket {
        endpoint: String,
        #[source]
        source: SocketError,
    },

    #[error("component '{0}' is already running")]
    AlreadyRunning(&'static str),
}
