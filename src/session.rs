//! The per-connection protocol engine.
//!
//! A [`Session`] owns one blocking byte stream and drives the control-plane
//! exchanges over it: capability negotiation, the MYSQL41 authentication
//! handshake, session close, and opaque statement dispatch. One physical
//! connection serves exactly one logical session; the protocol has no
//! request identifiers, so issuing a second request before the first's
//! terminal reply resolves is a caller error, not a supported mode.
//!
//! Every request/reply exchange that can overlap the asynchronous-notice
//! window runs through the same tolerant wait loop ([`Session::wait_for`]):
//! notices are decoded and surfaced to the observer, unrecognized message
//! types are logged and skipped, a structured error terminates the exchange
//! with [`XWireError::Server`], and only the expected terminal class returns.
//! The handshake deviates twice: its nonce wait is strict about everything,
//! and its result wait treats an unrecognized message type as a protocol
//! violation instead of a skip. See [`Session::authenticate_mysql41`].
//!
//! The engine imposes no timeout of its own. Cancellation belongs to the
//! transport (a read deadline on the stream), and a deadline expiring there
//! is connection-fatal like any other transport failure.

use std::io::{Read, Write};

use tracing::{debug, warn};

#[cfg(feature = "mysql41")]
use crate::auth::mysql41::{self, Mysql41};
use crate::capability::CapabilityTable;
use crate::config::SessionConfig;
use crate::error::{Result, XWireError};
use crate::protocol::framing::{read_frame, write_frame, Frame};
use crate::protocol::message::{
    client_message_name, server_message_name, ClientMessage, ServerMessage,
};
use crate::protocol::messages;
use crate::protocol::notice::{Notice, NoticeBody, NoticeEnvelope, NoticeObserver};

/// One logical session over an already-open transport.
///
/// Exclusively owned per-connection state; nothing here is safe for
/// concurrent access, and none is needed because one connection is used by
/// one caller at a time.
pub struct Session<S> {
    stream: S,
    config: SessionConfig,
    capabilities: CapabilityTable,
    observer: Option<Box<dyn NoticeObserver + Send>>,
}

impl<S> Session<S> {
    pub fn new(stream: S, config: SessionConfig) -> Session<S> {
        Session {
            stream,
            config,
            capabilities: CapabilityTable::default(),
            observer: None,
        }
    }

    /// Capabilities from the last successful [`Session::get_capabilities`].
    pub fn capabilities(&self) -> &CapabilityTable {
        &self.capabilities
    }

    /// Install an observer for asynchronous notices. Purely informational;
    /// no control-flow decision depends on it.
    pub fn set_notice_observer(&mut self, observer: Box<dyn NoticeObserver + Send>) {
        self.observer = Some(observer);
    }

    /// Hand the transport back, discarding all session state.
    pub fn into_stream(self) -> S {
        self.stream
    }
}

impl<S: Read + Write> Session<S> {
    /// Send one frame. Exposed so an external statement executor can reuse
    /// the codec; the control-plane operations below are built on it.
    pub fn send(&mut self, msg: ClientMessage, payload: &[u8]) -> Result<()> {
        debug!(
            "C -> S: len {}, type {}",
            payload.len() + 1,
            client_message_name(msg.code()),
        );
        write_frame(&mut self.stream, msg.code(), payload, self.config.max_frame_size)
    }

    /// Read one frame. The counterpart of [`Session::send`] for external
    /// reply processing; notices read this way are the caller's to handle.
    pub fn recv(&mut self) -> Result<Frame> {
        let frame = read_frame(&mut self.stream, self.config.max_frame_size)?;
        debug!(
            "S -> C: len {}, type {}",
            frame.payload.len() + 1,
            server_message_name(frame.msg_type),
        );
        Ok(frame)
    }

    /// Request the server's capabilities and replace the local table.
    ///
    /// Value shapes the engine does not consume are logged and skipped,
    /// never fatal.
    pub fn get_capabilities(&mut self) -> Result<&CapabilityTable> {
        self.send(ClientMessage::CapabilitiesGet, &[])?;
        let frame = self.wait_for(ServerMessage::Capabilities, "get_capabilities")?;

        let mut decoded = messages::decode_capabilities(&frame.payload)?;
        decoded.retain(|cap| match &cap.value {
            crate::protocol::datatypes::TypedValue::Unsupported(shape) => {
                warn!(
                    "get_capabilities: skipping capability {:?} of unhandled shape: {shape}",
                    cap.name
                );
                false
            }
            _ => true,
        });
        debug!("get_capabilities: {} capabilities decoded", decoded.len());

        self.capabilities.replace(decoded);
        Ok(&self.capabilities)
    }

    /// Set a single bool scalar capability (`tls`, typically).
    pub fn set_capability_bool(&mut self, name: &str, value: bool) -> Result<()> {
        let payload = messages::encode_capabilities_set_bool(name, value);
        self.send(ClientMessage::CapabilitiesSet, &payload)?;
        self.wait_for(ServerMessage::Ok, "set_capability_bool")?;
        Ok(())
    }

    /// Run the MYSQL41 challenge-response handshake.
    ///
    /// Exactly two round trips. The nonce wait is strict: any message other
    /// than the expected `AuthenticateContinue`, an error or a notice
    /// included, is an immediate [`XWireError::UnexpectedMessage`]. The
    /// result wait admits notices and decodes errors, but an unrecognized
    /// message type there is a protocol violation, not a skip; recovery is
    /// undefined mid-handshake. On any failure the caller must discard the
    /// transport; credentials are never retried here.
    #[cfg(feature = "mysql41")]
    pub fn authenticate_mysql41(&mut self) -> Result<()> {
        let auth = Mysql41::new(&self.config.database, &self.config.user, &self.config.password);

        let start =
            messages::encode_authenticate_start(mysql41::MECH_NAME, &auth.initial_auth_data());
        self.send(ClientMessage::AuthenticateStart, &start)?;

        // Strict wait for the nonce. Servers are not known to emit notices
        // at this step; keep the narrow contract until one is confirmed to.
        let frame = self.recv()?;
        if ServerMessage::from_code(frame.msg_type) != Some(ServerMessage::AuthenticateContinue) {
            return Err(XWireError::UnexpectedMessage(format!(
                "got {} while waiting for {}",
                server_message_name(frame.msg_type),
                server_message_name(ServerMessage::AuthenticateContinue.code()),
            )));
        }
        let nonce = messages::decode_authenticate_continue(&frame.payload)?;

        let response = auth.continue_auth_data(&nonce)?;
        self.send(
            ClientMessage::AuthenticateContinue,
            &messages::encode_authenticate_continue(&response),
        )?;

        let frame = self.wait_for_exact(ServerMessage::AuthenticateOk, "authenticate_mysql41")?;
        let trailing = messages::decode_authenticate_ok(&frame.payload)?;
        if !trailing.is_empty() {
            // decoded and discarded; the mechanism defines no meaning for it
            debug!(
                "authenticate_mysql41: discarding {} trailing auth data bytes",
                trailing.len()
            );
        }
        Ok(())
    }

    /// Send a statement-execute frame with a caller-encoded, opaque body.
    ///
    /// Reply streaming is not part of the control plane; drive the replies
    /// with [`Session::recv`] and the payload codecs.
    pub fn execute_statement(&mut self, payload: &[u8]) -> Result<()> {
        self.send(ClientMessage::StmtExecute, payload)
    }

    /// Close the session and wait for the server's acknowledgement.
    pub fn close(&mut self) -> Result<()> {
        self.send(ClientMessage::SessionClose, &messages::encode_session_close())?;
        self.wait_for(ServerMessage::Ok, "close")?;
        Ok(())
    }

    /// The tolerant wait loop: read frames until the expected terminal class.
    ///
    /// - the expected type returns the frame;
    /// - a structured error decodes into `Err(Server)`;
    /// - a notice goes to the observer and the loop continues;
    /// - anything else is logged and skipped (forward compatibility).
    fn wait_for(&mut self, expected: ServerMessage, op: &str) -> Result<Frame> {
        self.wait(expected, op, true)
    }

    /// Like [`Session::wait_for`], except an unrecognized message type is a
    /// protocol violation instead of a skip. For steps whose mechanism pins
    /// down the full reply set, as the handshake result does.
    fn wait_for_exact(&mut self, expected: ServerMessage, op: &str) -> Result<Frame> {
        self.wait(expected, op, false)
    }

    fn wait(&mut self, expected: ServerMessage, op: &str, skip_unknown: bool) -> Result<Frame> {
        loop {
            let frame = self.recv()?;
            match ServerMessage::from_code(frame.msg_type) {
                Some(t) if t == expected => return Ok(frame),
                Some(ServerMessage::Error) => {
                    return Err(XWireError::Server(messages::decode_error(&frame.payload)?));
                }
                Some(ServerMessage::Notice) => self.dispatch_notice(&frame, op)?,
                _ if skip_unknown => {
                    debug!(
                        "{op}: ignoring message {} while waiting for {}",
                        server_message_name(frame.msg_type),
                        server_message_name(expected.code()),
                    );
                }
                _ => {
                    return Err(XWireError::UnexpectedMessage(format!(
                        "got {} while waiting for {}",
                        server_message_name(frame.msg_type),
                        server_message_name(expected.code()),
                    )));
                }
            }
        }
    }

    /// Decode a notice frame and surface it.
    ///
    /// An undecodable envelope is connection-fatal; the diagnostic channel
    /// itself is compromised. An undecodable inner payload is only dropped
    /// and logged; the surrounding operation keeps waiting.
    fn dispatch_notice(&mut self, frame: &Frame, op: &str) -> Result<()> {
        let envelope = NoticeEnvelope::decode(&frame.payload)?;
        match NoticeBody::decode(envelope.notice_type, &envelope.payload) {
            Ok(body) => {
                debug!(
                    "{op}: notice type {} [{}], scope {:?}: {body:?}",
                    envelope.notice_type,
                    NoticeBody::type_name(envelope.notice_type),
                    envelope.scope,
                );
                let notice = Notice {
                    scope: envelope.scope,
                    body,
                };
                if let Some(observer) = self.observer.as_mut() {
                    observer.notice(&notice);
                }
            }
            Err(err) => {
                warn!(
                    "{op}: dropping notice type {} [{}] with malformed payload: {err}",
                    envelope.notice_type,
                    NoticeBody::type_name(envelope.notice_type),
                );
            }
        }
        Ok(())
    }
}

impl<S> std::fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("capabilities", &self.capabilities)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}
