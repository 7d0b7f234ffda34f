use std::fmt;

/// Default maximum frame size: 64 MiB, the server's default
/// `mysqlx_max_allowed_packet`.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 64 * 1024 * 1024;

/// Configuration for one logical session.
///
/// Transport setup (TCP, TLS, read deadlines) is the caller's concern;
/// [`Session`](crate::Session) takes an already-open stream. A timeout must
/// be implemented as a read deadline on that stream and surfaces as a
/// connection-fatal transport error, like any other read failure.
#[derive(Clone)]
pub struct SessionConfig {
    pub user: String,
    pub password: String,
    /// Default schema for the session, may be empty.
    pub database: String,

    /// Maximum total frame size (type byte + payload) accepted in either
    /// direction. Outbound frames above it are rejected before any byte is
    /// written; inbound headers above it are treated as malformed.
    pub max_frame_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user: "root".into(),
            password: String::new(),
            database: String::new(),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

// Manual Debug to keep the password out of logs.
impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("max_frame_size", &self.max_frame_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_password() {
        let cfg = SessionConfig {
            password: "hunter2".into(),
            ..SessionConfig::default()
        };
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }
}
