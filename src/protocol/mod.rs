//! MySQL X Protocol wire-format implementation.
//!
//! This module provides the low-level primitives of the control plane:
//! - Reading and writing length-prefixed frames ([`framing`])
//! - The outbound/inbound message type registries ([`message`])
//! - Protobuf wire-format primitives ([`pb`])
//! - Typed connection values ([`datatypes`])
//! - Payload codecs for capabilities, authentication and errors
//!   ([`messages`])
//! - Asynchronous notice decoding ([`notice`])
//!
//! # Wire Format Overview
//!
//! Every frame on the wire is:
//! - 4 bytes: little-endian u32 length = payload length + 1
//! - 1 byte: message type (namespace depends on direction)
//! - N bytes: protobuf-encoded payload, possibly empty
//!
//! The minimum total frame is therefore 5 bytes, and a header value below 1
//! is malformed. The maximum frame size is configured per connection and
//! enforced in both directions.

pub mod datatypes;
pub mod framing;
pub mod message;
pub mod messages;
pub mod notice;
pub mod pb;

pub use datatypes::TypedValue;
pub use framing::{encode_frame, read_frame, write_frame, Frame};
pub use message::{client_message_name, server_message_name, ClientMessage, ServerMessage};
pub use notice::{Notice, NoticeBody, NoticeEnvelope, NoticeObserver, NoticeScope, WarningLevel};
