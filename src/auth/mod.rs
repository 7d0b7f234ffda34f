//! Authentication mechanisms for X Protocol sessions.
//!
//! - **MYSQL41** (feature: `mysql41`): the SHA-1 challenge-response scheme
//!   shared with the classic protocol's `mysql_native_password`. The server
//!   supplies a 20-byte nonce; the client answers with a one-way scramble of
//!   the password, so the password itself never crosses the wire.
//!
//! # Feature Flags
//!
//! - `mysql41` (default): enables MYSQL41 support. Adds a dependency on
//!   `sha1`.
//!
//! # Unsupported Methods
//!
//! - PLAIN (requires TLS; cleartext credentials are out of scope here)
//! - SHA256_MEMORY / caching_sha2 variants

pub mod mysql41;

#[cfg(feature = "mysql41")]
pub use mysql41::Mysql41;
