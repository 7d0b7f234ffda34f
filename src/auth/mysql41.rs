//! MYSQL41 challenge-response authentication.
//!
//! The exchange takes exactly two client messages:
//!
//! 1. `AuthenticateStart` names the mechanism and carries the initial token
//!    `database \0 user \0`; the password cannot be combined yet because
//!    the transform requires the server's nonce.
//! 2. After the server's `AuthenticateContinue` delivers a 20-byte nonce,
//!    the client answers `database \0 user \0 * HEX(scramble)` where
//!    `scramble = SHA1(password) XOR SHA1(nonce || SHA1(SHA1(password)))`,
//!    hex uppercase. An empty password sends no scramble part.
//!
//! The transform is one-way; neither the password nor anything reversible
//! to it appears on the wire.

#[cfg(feature = "mysql41")]
use sha1::{Digest, Sha1};

use crate::error::{Result, XWireError};

/// Length of the server challenge, fixed by the mechanism.
pub const NONCE_LEN: usize = 20;

/// Mechanism name as sent in `AuthenticateStart`.
pub const MECH_NAME: &str = "MYSQL41";

/// MYSQL41 client state: the credentials to be combined with the server
/// nonce. Ephemeral, lives for the duration of one handshake.
#[cfg(feature = "mysql41")]
#[derive(Clone)]
pub struct Mysql41 {
    database: String,
    user: String,
    password: String,
}

#[cfg(feature = "mysql41")]
impl Mysql41 {
    pub fn new(database: &str, user: &str, password: &str) -> Mysql41 {
        Mysql41 {
            database: database.to_string(),
            user: user.to_string(),
            password: password.to_string(),
        }
    }

    /// Auth data for `AuthenticateStart`: `database \0 user \0`.
    pub fn initial_auth_data(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.database.len() + self.user.len() + 2);
        out.extend_from_slice(self.database.as_bytes());
        out.push(0);
        out.extend_from_slice(self.user.as_bytes());
        out.push(0);
        out
    }

    /// Auth data for the client's `AuthenticateContinue`, derived from the
    /// server nonce.
    ///
    /// # Errors
    /// The nonce must be exactly [`NONCE_LEN`] bytes; anything else fails
    /// before any credential transform is attempted.
    pub fn continue_auth_data(&self, nonce: &[u8]) -> Result<Vec<u8>> {
        let nonce: &[u8; NONCE_LEN] = nonce.try_into().map_err(|_| {
            XWireError::Auth(format!(
                "server nonce is {} bytes, expecting {NONCE_LEN}",
                nonce.len()
            ))
        })?;

        let mut out = self.initial_auth_data();
        if !self.password.is_empty() {
            out.push(b'*');
            for byte in scramble41(&self.password, nonce) {
                out.extend_from_slice(format!("{byte:02X}").as_bytes());
            }
        }
        Ok(out)
    }
}

// Keep the password out of debug output.
#[cfg(feature = "mysql41")]
impl std::fmt::Debug for Mysql41 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mysql41")
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The MYSQL41 scramble:
/// `SHA1(password) XOR SHA1(nonce || SHA1(SHA1(password)))`.
#[cfg(feature = "mysql41")]
fn scramble41(password: &str, nonce: &[u8; NONCE_LEN]) -> [u8; 20] {
    let stage1 = Sha1::digest(password.as_bytes());
    let stage2 = Sha1::digest(stage1);

    let mut mixer = Sha1::new();
    mixer.update(nonce);
    mixer.update(stage2);
    let mixed = mixer.finalize();

    let mut out = [0u8; 20];
    for (o, (a, b)) in out.iter_mut().zip(stage1.iter().zip(mixed.iter())) {
        *o = a ^ b;
    }
    out
}
