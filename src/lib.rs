//! Client-side engine for the MySQL X Protocol control plane.
//!
//! This crate drives the stateful, message-oriented wire protocol spoken on
//! the server's X port: length-prefixed frame framing, message-type
//! classification, capability negotiation, the MYSQL41 challenge-response
//! authentication handshake, asynchronous notice decoding, and structured
//! error decoding. Request/reply exchanges can be interleaved with
//! out-of-band notice frames at almost any point; the engine's wait loops
//! absorb them and surface them to an optional observer.
//!
//! Transport setup (TCP, TLS, deadlines) and result-set decoding are the
//! caller's concern: a [`Session`] is generic over any blocking
//! `Read + Write` stream, and statement bodies pass through as opaque
//! payloads.
//!
//! ```no_run
//! use std::net::TcpStream;
//! use mysqlx_wire::{Session, SessionConfig};
//!
//! # fn main() -> mysqlx_wire::Result<()> {
//! let stream = TcpStream::connect("127.0.0.1:33060").map_err(mysqlx_wire::XWireError::from)?;
//! let mut session = Session::new(
//!     stream,
//!     SessionConfig {
//!         user: "app".into(),
//!         password: "secret".into(),
//!         database: "test".into(),
//!         ..SessionConfig::default()
//!     },
//! );
//!
//! session.get_capabilities()?;
//! session.authenticate_mysql41()?;
//! session.close()?;
//! # Ok(())
//! # }
//! ```

#![warn(
    clippy::all,
    clippy::cargo,
    clippy::perf,
    clippy::style,
    clippy::correctness,
    clippy::suspicious
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::multiple_crate_versions
)]

pub mod auth;
pub mod capability;
pub mod config;
pub mod error;
pub mod protocol;
pub mod session;

pub use capability::{Capability, CapabilityTable};
pub use config::{SessionConfig, DEFAULT_MAX_FRAME_SIZE};
pub use error::{Result, ServerError, Severity, XWireError};
pub use protocol::{Notice, NoticeBody, NoticeObserver, NoticeScope, TypedValue};
pub use session::Session;
