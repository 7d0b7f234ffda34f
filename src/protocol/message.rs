//! Message type registries.
//!
//! The protocol uses two disjoint numeric namespaces, one per direction.
//! Only the control-plane subset is enumerated here; document-store CRUD and
//! result-set streaming codes are out of scope. Name rendering never fails:
//! unknown codes render as `"{code} [unknown]"` so diagnostics can always
//! describe what was on the wire.

/// Client-to-server message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMessage {
    CapabilitiesGet,
    CapabilitiesSet,
    ConnClose,
    AuthenticateStart,
    AuthenticateContinue,
    SessionReset,
    SessionClose,
    StmtExecute,
}

impl ClientMessage {
    /// Wire code for this message type.
    pub fn code(self) -> u8 {
        match self {
            ClientMessage::CapabilitiesGet => 1,
            ClientMessage::CapabilitiesSet => 2,
            ClientMessage::ConnClose => 3,
            ClientMessage::AuthenticateStart => 4,
            ClientMessage::AuthenticateContinue => 5,
            ClientMessage::SessionReset => 6,
            ClientMessage::SessionClose => 7,
            ClientMessage::StmtExecute => 12,
        }
    }

    pub fn from_code(code: u8) -> Option<ClientMessage> {
        Some(match code {
            1 => ClientMessage::CapabilitiesGet,
            2 => ClientMessage::CapabilitiesSet,
            3 => ClientMessage::ConnClose,
            4 => ClientMessage::AuthenticateStart,
            5 => ClientMessage::AuthenticateContinue,
            6 => ClientMessage::SessionReset,
            7 => ClientMessage::SessionClose,
            12 => ClientMessage::StmtExecute,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            ClientMessage::CapabilitiesGet => "CON_CAPABILITIES_GET",
            ClientMessage::CapabilitiesSet => "CON_CAPABILITIES_SET",
            ClientMessage::ConnClose => "CON_CLOSE",
            ClientMessage::AuthenticateStart => "SESS_AUTHENTICATE_START",
            ClientMessage::AuthenticateContinue => "SESS_AUTHENTICATE_CONTINUE",
            ClientMessage::SessionReset => "SESS_RESET",
            ClientMessage::SessionClose => "SESS_CLOSE",
            ClientMessage::StmtExecute => "SQL_STMT_EXECUTE",
        }
    }
}

/// Server-to-client message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerMessage {
    Ok,
    Error,
    Capabilities,
    AuthenticateContinue,
    AuthenticateOk,
    Notice,
}

impl ServerMessage {
    /// Wire code for this message type.
    pub fn code(self) -> u8 {
        match self {
            ServerMessage::Ok => 0,
            ServerMessage::Error => 1,
            ServerMessage::Capabilities => 2,
            ServerMessage::AuthenticateContinue => 3,
            ServerMessage::AuthenticateOk => 4,
            ServerMessage::Notice => 11,
        }
    }

    pub fn from_code(code: u8) -> Option<ServerMessage> {
        Some(match code {
            0 => ServerMessage::Ok,
            1 => ServerMessage::Error,
            2 => ServerMessage::Capabilities,
            3 => ServerMessage::AuthenticateContinue,
            4 => ServerMessage::AuthenticateOk,
            11 => ServerMessage::Notice,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            ServerMessage::Ok => "OK",
            ServerMessage::Error => "ERROR",
            ServerMessage::Capabilities => "CONN_CAPABILITIES",
            ServerMessage::AuthenticateContinue => "SESS_AUTHENTICATE_CONTINUE",
            ServerMessage::AuthenticateOk => "SESS_AUTHENTICATE_OK",
            ServerMessage::Notice => "NOTICE",
        }
    }
}

/// Diagnostic rendering of a client-to-server message code.
pub fn client_message_name(code: u8) -> String {
    match ClientMessage::from_code(code) {
        Some(m) => format!("{code} [{}]", m.name()),
        None => format!("{code} [unknown]"),
    }
}

/// Diagnostic rendering of a server-to-client message code.
pub fn server_message_name(code: u8) -> String {
    match ServerMessage::from_code(code) {
        Some(m) => format!("{code} [{}]", m.name()),
        None => format!("{code} [unknown]"),
    }
}
