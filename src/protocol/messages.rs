//! Payload codecs for the control-plane message bodies.
//!
//! Free functions over payload slices, one per schema. Decoders never trust
//! the payload shape: mandatory fields are checked and any truncation is a
//! decode error. Encoders produce the exact field layout the server's
//! `.proto` definitions describe.

use bytes::BytesMut;

use super::datatypes::{decode_any, encode_bool_any};
use super::pb::{self, PbReader};
use crate::capability::Capability;
use crate::error::{Result, ServerError, Severity, XWireError};

/// Decode a `Mysqlx.Error` payload.
///
/// `code`, `sql_state` and `msg` are mandatory; a frame missing any of them
/// is a decode failure, escalated by callers to connection-fatal because it
/// compromises the one channel meant to explain failures. `severity`
/// defaults to ERROR on the wire.
pub fn decode_error(payload: &[u8]) -> Result<ServerError> {
    let mut severity = Severity::Error;
    let mut code = None;
    let mut sql_state = None;
    let mut message = None;

    let mut rd = PbReader::new(payload);
    while let Some((field, value)) = rd.next_field()? {
        match field {
            1 => severity = Severity::from_code(value.as_varint("Error.severity")?),
            2 => {
                let raw = value.as_varint("Error.code")?;
                code = Some(u16::try_from(raw).map_err(|_| {
                    XWireError::Decode(format!("Error.code {raw} out of u16 range"))
                })?);
            }
            3 => message = Some(value.as_str("Error.msg")?),
            4 => sql_state = Some(value.as_str("Error.sql_state")?),
            _ => {}
        }
    }

    Ok(ServerError {
        severity,
        code: code.ok_or_else(|| XWireError::Decode("Error without mandatory code".into()))?,
        sql_state: sql_state
            .ok_or_else(|| XWireError::Decode("Error without mandatory sql_state".into()))?,
        message: message
            .ok_or_else(|| XWireError::Decode("Error without mandatory msg".into()))?,
    })
}

/// Decode a `Capabilities` payload into name/value pairs.
///
/// Value shapes the engine does not consume come back as
/// [`TypedValue::Unsupported`]; the caller decides to log and skip them.
pub fn decode_capabilities(payload: &[u8]) -> Result<Vec<Capability>> {
    let mut out = Vec::new();
    let mut rd = PbReader::new(payload);
    while let Some((field, value)) = rd.next_field()? {
        if field != 1 {
            continue;
        }
        out.push(decode_capability(value.as_bytes("Capabilities.capabilities")?)?);
    }
    Ok(out)
}

// Capability { required string name = 1; required Any value = 2; }
fn decode_capability(raw: &[u8]) -> Result<Capability> {
    let mut name = None;
    let mut value = None;

    let mut rd = PbReader::new(raw);
    while let Some((field, v)) = rd.next_field()? {
        match field {
            1 => name = Some(v.as_str("Capability.name")?),
            2 => value = Some(decode_any(v.as_bytes("Capability.value")?)?),
            _ => {}
        }
    }

    Ok(Capability {
        name: name.ok_or_else(|| XWireError::Decode("Capability without name".into()))?,
        value: value.ok_or_else(|| XWireError::Decode("Capability without value".into()))?,
    })
}

/// Encode a `CapabilitiesSet` carrying a single bool scalar capability.
///
/// Nesting is `CapabilitiesSet.capabilities -> Capabilities.capabilities ->
/// Capability{name, Any}`.
pub fn encode_capabilities_set_bool(name: &str, value: bool) -> BytesMut {
    let mut capability = BytesMut::new();
    pb::put_str_field(&mut capability, 1, name);
    pb::put_bytes_field(&mut capability, 2, &encode_bool_any(value));

    let mut capabilities = BytesMut::new();
    pb::put_bytes_field(&mut capabilities, 1, &capability);

    let mut set = BytesMut::new();
    pb::put_bytes_field(&mut set, 1, &capabilities);
    set
}

/// Encode an `AuthenticateStart` naming the mechanism and carrying the
/// initial auth token.
pub fn encode_authenticate_start(mech_name: &str, auth_data: &[u8]) -> BytesMut {
    let mut buf = BytesMut::new();
    pb::put_str_field(&mut buf, 1, mech_name);
    pb::put_bytes_field(&mut buf, 2, auth_data);
    buf
}

/// Encode a client `AuthenticateContinue` carrying the scrambled credential.
pub fn encode_authenticate_continue(auth_data: &[u8]) -> BytesMut {
    let mut buf = BytesMut::new();
    pb::put_bytes_field(&mut buf, 1, auth_data);
    buf
}

/// Decode a server `AuthenticateContinue`, whose `auth_data` carries the
/// challenge nonce. The field is mandatory.
pub fn decode_authenticate_continue(payload: &[u8]) -> Result<Vec<u8>> {
    let mut auth_data = None;
    let mut rd = PbReader::new(payload);
    while let Some((field, value)) = rd.next_field()? {
        if field == 1 {
            auth_data = Some(value.as_bytes("AuthenticateContinue.auth_data")?.to_vec());
        }
    }
    auth_data
        .ok_or_else(|| XWireError::Decode("AuthenticateContinue without auth_data".into()))
}

/// Decode an `AuthenticateOk`, returning any trailing auth data.
///
/// The mechanism defines no meaning for it; it is decoded and discarded by
/// the handshake, surfaced here only for diagnostics.
pub fn decode_authenticate_ok(payload: &[u8]) -> Result<Vec<u8>> {
    let mut auth_data = Vec::new();
    let mut rd = PbReader::new(payload);
    while let Some((field, value)) = rd.next_field()? {
        if field == 1 {
            auth_data = value.as_bytes("AuthenticateOk.auth_data")?.to_vec();
        }
    }
    Ok(auth_data)
}

/// Encode a `Session.Close` body. The schema is an empty message.
pub fn encode_session_close() -> BytesMut {
    BytesMut::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::datatypes::TypedValue;

    fn error_payload(severity: Option<u64>, code: Option<u64>, state: Option<&str>, msg: Option<&str>) -> BytesMut {
        let mut buf = BytesMut::new();
        if let Some(s) = severity {
            pb::put_varint_field(&mut buf, 1, s);
        }
        if let Some(c) = code {
            pb::put_varint_field(&mut buf, 2, c);
        }
        if let Some(m) = msg {
            pb::put_str_field(&mut buf, 3, m);
        }
        if let Some(s) = state {
            pb::put_str_field(&mut buf, 4, s);
        }
        buf
    }

    #[test]
    fn decodes_full_error() {
        let payload = error_payload(Some(0), Some(1045), Some("HY000"), Some("Invalid user or password"));
        let e = decode_error(&payload).unwrap();
        assert_eq!(e.severity, Severity::Error);
        assert_eq!(e.code, 1045);
        assert_eq!(e.sql_state, "HY000");
        assert_eq!(e.message, "Invalid user or password");
        assert_eq!(e.to_string(), "ERROR: 1045 [HY000] Invalid user or password");
    }

    #[test]
    fn severity_defaults_to_error_when_absent() {
        let payload = error_payload(None, Some(1064), Some("42000"), Some("syntax"));
        assert_eq!(decode_error(&payload).unwrap().severity, Severity::Error);
    }

    #[test]
    fn fatal_severity_decodes() {
        let payload = error_payload(Some(1), Some(1053), Some("08S01"), Some("Server shutdown in progress"));
        assert_eq!(decode_error(&payload).unwrap().severity, Severity::Fatal);
    }

    #[test]
    fn missing_mandatory_error_fields_are_decode_errors() {
        let no_code = error_payload(Some(0), None, Some("HY000"), Some("m"));
        assert!(matches!(decode_error(&no_code), Err(XWireError::Decode(_))));

        let no_state = error_payload(Some(0), Some(1045), None, Some("m"));
        assert!(matches!(decode_error(&no_state), Err(XWireError::Decode(_))));

        let no_msg = error_payload(Some(0), Some(1045), Some("HY000"), None);
        assert!(matches!(decode_error(&no_msg), Err(XWireError::Decode(_))));
    }

    #[test]
    fn capabilities_set_bool_wire_bytes_are_exact() {
        // CapabilitiesSet{ Capabilities{ Capability{ name:"tls",
        // value: Any{SCALAR, Scalar{V_BOOL, true}} } } }
        let buf = encode_capabilities_set_bool("tls", true);
        assert_eq!(
            &buf[..],
            &[
                0x0a, 0x11, // CapabilitiesSet.capabilities, 17 bytes
                0x0a, 0x0f, // Capabilities.capabilities, 15 bytes
                0x0a, 0x03, b't', b'l', b's', // Capability.name
                0x12, 0x08, // Capability.value, 8 bytes
                0x08, 0x01, // Any.type = SCALAR
                0x12, 0x04, // Any.scalar, 4 bytes
                0x08, 0x07, // Scalar.type = V_BOOL
                0x40, 0x01, // Scalar.v_bool = true
            ]
        );
    }

    #[test]
    fn capabilities_set_roundtrips_through_capability_decoder() {
        let set = encode_capabilities_set_bool("tls", true);
        // peel CapabilitiesSet.capabilities to get a Capabilities body
        let mut rd = PbReader::new(&set);
        let (field, value) = rd.next_field().unwrap().unwrap();
        assert_eq!(field, 1);
        let caps = decode_capabilities(value.as_bytes("capabilities").unwrap()).unwrap();
        assert_eq!(caps.len(), 1);
        assert_eq!(caps[0].name, "tls");
        assert_eq!(caps[0].value, TypedValue::Bool(true));
    }

    #[test]
    fn authenticate_start_layout() {
        let buf = encode_authenticate_start("MYSQL41", b"db\0user\0");
        let mut rd = PbReader::new(&buf);
        let (f, v) = rd.next_field().unwrap().unwrap();
        assert_eq!((f, v.as_str("mech").unwrap().as_str()), (1, "MYSQL41"));
        let (f, v) = rd.next_field().unwrap().unwrap();
        assert_eq!(f, 2);
        assert_eq!(v.as_bytes("auth_data").unwrap(), b"db\0user\0");
    }

    #[test]
    fn authenticate_continue_roundtrip() {
        let nonce = [7u8; 20];
        let buf = encode_authenticate_continue(&nonce);
        assert_eq!(decode_authenticate_continue(&buf).unwrap(), nonce);
    }

    #[test]
    fn authenticate_continue_without_auth_data_is_decode_error() {
        assert!(matches!(
            decode_authenticate_continue(&[]),
            Err(XWireError::Decode(_))
        ));
    }

    #[test]
    fn authenticate_ok_auth_data_is_optional() {
        assert!(decode_authenticate_ok(&[]).unwrap().is_empty());
        let buf = encode_authenticate_continue(b"bye");
        assert_eq!(decode_authenticate_ok(&buf).unwrap(), b"bye");
    }

    #[test]
    fn session_close_body_is_empty() {
        assert!(encode_session_close().is_empty());
    }
}
