//! Error types for mysqlx-wire.
//!
//! All errors in this crate are represented by [`XWireError`], which covers:
//! - Transport errors (read/write failures on the underlying stream)
//! - Malformed frames (header below the protocol minimum or above the limit)
//! - Oversized outbound frames (local send-side guard)
//! - Decode errors (schema decode failure on a payload)
//! - Server errors (structured error frames reported by the peer)
//! - Authentication errors (handshake contract violations)
//! - Unexpected messages (wrong message type at a strict protocol step)
//!
//! Recoverability differs per variant and is documented on each. In short:
//! transport and framing errors are connection-fatal with no resynchronization,
//! [`XWireError::FrameTooLarge`] aborts only the one operation, and a server
//! error leaves the connection usable unless it terminated the handshake.

use std::fmt;

use thiserror::Error;

/// Error type for all mysqlx-wire operations.
#[derive(Debug, Error, Clone)]
pub enum XWireError {
    /// Read or write failure on the underlying stream.
    ///
    /// Always connection-fatal; the engine never retries. A read deadline
    /// expiring at the transport layer surfaces here and is treated the same.
    ///
    /// Note: `std::io::Error` is not `Clone`, so we store the message.
    #[error("transport error: {0}")]
    Transport(String),

    /// Frame header outside the allowed range.
    ///
    /// Connection-fatal: once trust in a header is lost there is no
    /// byte-level resynchronization, the caller must close the connection.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// Outbound frame would exceed the configured maximum frame size.
    ///
    /// Raised before any byte is written, so only the one operation is
    /// aborted and the connection stays usable.
    #[error("frame of {size} bytes exceeds maximum allowed {limit}")]
    FrameTooLarge { size: usize, limit: usize },

    /// Schema decode failure on a payload.
    ///
    /// Fatal for the in-flight operation. When the payload was an error or
    /// notice envelope this is connection-fatal, since the protocol's own
    /// diagnostic channel can no longer be trusted.
    #[error("decode error: {0}")]
    Decode(String),

    /// Structured error reported by the server.
    ///
    /// Surfaced to the caller; the connection remains usable unless the
    /// failing operation was the authentication handshake.
    #[error("server error: {0}")]
    Server(ServerError),

    /// Authentication failure on the client side of the handshake
    /// (for example a nonce of the wrong length).
    #[error("authentication error: {0}")]
    Auth(String),

    /// Message type outside what the current protocol step accepts.
    ///
    /// Only raised at strict steps of the handshake; tolerant wait loops log
    /// and skip unknown message types instead.
    #[error("unexpected message: {0}")]
    UnexpectedMessage(String),
}

impl XWireError {
    /// Returns `true` if this is a transport error.
    #[inline]
    pub fn is_transport(&self) -> bool {
        matches!(self, XWireError::Transport(_))
    }

    /// Returns `true` if this is a server-reported error.
    #[inline]
    pub fn is_server(&self) -> bool {
        matches!(self, XWireError::Server(_))
    }

    /// Returns `true` if this is an authentication error.
    #[inline]
    pub fn is_auth(&self) -> bool {
        matches!(self, XWireError::Auth(_))
    }

    /// Returns `true` if the connection must be discarded after this error.
    ///
    /// [`XWireError::FrameTooLarge`] is the local send-side guard and leaves
    /// the connection usable; a [`XWireError::Server`] error outside the
    /// handshake does too. Everything else compromises framing or the
    /// diagnostic channel and obligates the caller to reconnect.
    pub fn is_connection_fatal(&self) -> bool {
        !matches!(
            self,
            XWireError::FrameTooLarge { .. } | XWireError::Server(_)
        )
    }

    /// The server error carried by this error, if any.
    pub fn as_server_error(&self) -> Option<&ServerError> {
        match self {
            XWireError::Server(e) => Some(e),
            _ => None,
        }
    }
}

// Manual From impl since io::Error isn't Clone
impl From<std::io::Error> for XWireError {
    fn from(err: std::io::Error) -> Self {
        XWireError::Transport(err.to_string())
    }
}

/// Severity of a server-reported error.
///
/// `Fatal` means the server closes the session after sending the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Fatal,
}

impl Severity {
    /// Decode the wire enum value. An absent field defaults to `ERROR`.
    pub(crate) fn from_code(code: u64) -> Severity {
        match code {
            1 => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("ERROR"),
            Severity::Fatal => f.write_str("FATAL"),
        }
    }
}

/// Structured error payload reported by the server.
///
/// All fields are mandatory in the schema; a frame missing any of them is a
/// [`XWireError::Decode`], not a `ServerError`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerError {
    pub severity: Severity,
    /// Server error code, e.g. 1045 for "Access denied".
    pub code: u16,
    /// Five-character SQLSTATE, e.g. "HY000".
    pub sql_state: String,
    pub message: String,
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:04} [{}] {}",
            self.severity, self.code, self.sql_state, self.message
        )
    }
}

impl std::error::Error for ServerError {}

/// Result type alias for mysqlx-wire operations.
pub type Result<T> = std::result::Result<T, XWireError>;
