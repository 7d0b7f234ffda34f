//! Asynchronous notice decoding.
//!
//! The server may interleave notice frames with any request/reply exchange.
//! A notice is an outer envelope (`Mysqlx.Notice.Frame`: numeric type,
//! scope, opaque payload) whose payload is one of a small set of inner
//! schemas. Decoding is split in two stages on purpose:
//!
//! - [`NoticeEnvelope::decode`]: failure here means the diagnostic channel
//!   itself cannot be trusted and is treated as connection-fatal by the
//!   session loop.
//! - [`NoticeBody::decode`]: failure here is recoverable, a malformed
//!   warning must only be dropped and logged, never abort anything.
//!
//! Unknown notice types are kept as [`NoticeBody::Unknown`] with the raw
//! payload, a forward-compatibility policy rather than an error.

use bytes::Bytes;

use super::datatypes::{decode_any, TypedValue};
use super::pb::PbReader;
use crate::error::{Result, XWireError};

/// Scope of a notice as reported in the envelope. Defaults to global.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeScope {
    Global,
    Local,
}

impl NoticeScope {
    fn from_code(code: u64) -> NoticeScope {
        match code {
            2 => NoticeScope::Local,
            _ => NoticeScope::Global,
        }
    }
}

/// Severity level of a warning notice. Defaults to `Warning`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningLevel {
    Note,
    Warning,
    Error,
}

impl WarningLevel {
    fn from_code(code: u64) -> WarningLevel {
        match code {
            1 => WarningLevel::Note,
            3 => WarningLevel::Error,
            _ => WarningLevel::Warning,
        }
    }
}

/// Parameter named by a session-state-changed notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStateParam {
    CurrentSchema,
    AccountExpired,
    GeneratedInsertId,
    RowsAffected,
    RowsFound,
    RowsMatched,
    TrxCommitted,
    TrxRolledback,
    ProducedMessage,
    ClientIdAssigned,
    Other(u32),
}

impl SessionStateParam {
    fn from_code(code: u64) -> SessionStateParam {
        match code {
            1 => SessionStateParam::CurrentSchema,
            2 => SessionStateParam::AccountExpired,
            3 => SessionStateParam::GeneratedInsertId,
            4 => SessionStateParam::RowsAffected,
            5 => SessionStateParam::RowsFound,
            6 => SessionStateParam::RowsMatched,
            7 => SessionStateParam::TrxCommitted,
            9 => SessionStateParam::TrxRolledback,
            10 => SessionStateParam::ProducedMessage,
            11 => SessionStateParam::ClientIdAssigned,
            other => SessionStateParam::Other(other as u32),
        }
    }
}

/// Decoded outer envelope of a notice frame.
#[derive(Debug, Clone)]
pub struct NoticeEnvelope {
    pub notice_type: u32,
    pub scope: NoticeScope,
    pub payload: Bytes,
}

impl NoticeEnvelope {
    /// Decode the envelope. `type` is mandatory; scope defaults to global
    /// and the payload may be empty.
    pub fn decode(payload: &[u8]) -> Result<NoticeEnvelope> {
        let mut notice_type = None;
        let mut scope = NoticeScope::Global;
        let mut inner = Bytes::new();

        let mut rd = PbReader::new(payload);
        while let Some((field, value)) = rd.next_field()? {
            match field {
                1 => notice_type = Some(value.as_varint("Frame.type")? as u32),
                2 => scope = NoticeScope::from_code(value.as_varint("Frame.scope")?),
                3 => inner = Bytes::copy_from_slice(value.as_bytes("Frame.payload")?),
                _ => {}
            }
        }

        Ok(NoticeEnvelope {
            notice_type: notice_type
                .ok_or_else(|| XWireError::Decode("Notice frame without type".into()))?,
            scope,
            payload: inner,
        })
    }
}

/// Decoded inner payload of a notice.
#[derive(Debug, Clone, PartialEq)]
pub enum NoticeBody {
    Warning {
        level: WarningLevel,
        code: u32,
        message: String,
    },
    SessionVariableChanged {
        param: String,
        value: Option<TypedValue>,
    },
    SessionStateChanged {
        param: SessionStateParam,
        value: Option<TypedValue>,
    },
    /// Notice types this engine does not know; the raw payload is retained
    /// for diagnostics.
    Unknown { notice_type: u32, payload: Bytes },
}

impl NoticeBody {
    /// Decode the inner payload for the given envelope type.
    ///
    /// A failure is recoverable: the session loop logs and drops the notice
    /// and keeps waiting, it never tears anything down.
    pub fn decode(notice_type: u32, payload: &[u8]) -> Result<NoticeBody> {
        match notice_type {
            1 => Self::decode_warning(payload),
            2 => Self::decode_session_variable_changed(payload),
            3 => Self::decode_session_state_changed(payload),
            other => Ok(NoticeBody::Unknown {
                notice_type: other,
                payload: Bytes::copy_from_slice(payload),
            }),
        }
    }

    /// Human-readable name of a notice type, for diagnostics. Never fails.
    pub fn type_name(notice_type: u32) -> &'static str {
        match notice_type {
            1 => "Warning",
            2 => "SessionVariableChanged",
            3 => "SessionStateChanged",
            _ => "?",
        }
    }

    // Warning { optional Level level = 1; required uint32 code = 2;
    //           required string msg = 3; }
    fn decode_warning(payload: &[u8]) -> Result<NoticeBody> {
        let mut level = WarningLevel::Warning;
        let mut code = None;
        let mut message = None;

        let mut rd = PbReader::new(payload);
        while let Some((field, value)) = rd.next_field()? {
            match field {
                1 => level = WarningLevel::from_code(value.as_varint("Warning.level")?),
                2 => code = Some(value.as_varint("Warning.code")? as u32),
                3 => message = Some(value.as_str("Warning.msg")?),
                _ => {}
            }
        }

        Ok(NoticeBody::Warning {
            level,
            code: code.ok_or_else(|| XWireError::Decode("Warning without code".into()))?,
            message: message.ok_or_else(|| XWireError::Decode("Warning without msg".into()))?,
        })
    }

    // SessionVariableChanged { required string param = 1; optional Any value = 2; }
    fn decode_session_variable_changed(payload: &[u8]) -> Result<NoticeBody> {
        let mut param = None;
        let mut value = None;

        let mut rd = PbReader::new(payload);
        while let Some((field, v)) = rd.next_field()? {
            match field {
                1 => param = Some(v.as_str("SessionVariableChanged.param")?),
                2 => value = Some(decode_any(v.as_bytes("SessionVariableChanged.value")?)?),
                _ => {}
            }
        }

        Ok(NoticeBody::SessionVariableChanged {
            param: param.ok_or_else(|| {
                XWireError::Decode("SessionVariableChanged without param".into())
            })?,
            value,
        })
    }

    // SessionStateChanged { required Parameter param = 1; optional Any value = 2; }
    fn decode_session_state_changed(payload: &[u8]) -> Result<NoticeBody> {
        let mut param = None;
        let mut value = None;

        let mut rd = PbReader::new(payload);
        while let Some((field, v)) = rd.next_field()? {
            match field {
                1 => {
                    param = Some(SessionStateParam::from_code(
                        v.as_varint("SessionStateChanged.param")?,
                    ));
                }
                2 => value = Some(decode_any(v.as_bytes("SessionStateChanged.value")?)?),
                _ => {}
            }
        }

        Ok(NoticeBody::SessionStateChanged {
            param: param
                .ok_or_else(|| XWireError::Decode("SessionStateChanged without param".into()))?,
            value,
        })
    }
}

/// One fully decoded notice: envelope scope plus inner payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub scope: NoticeScope,
    pub body: NoticeBody,
}

/// Observer sink for notices surfaced during any wait loop.
///
/// Purely informational: no control-flow decision in the engine depends on
/// the observer, and notices are never queued; each one is handed over as
/// soon as the active wait loop decodes it.
pub trait NoticeObserver {
    fn notice(&mut self, notice: &Notice);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::pb;
    use bytes::BytesMut;

    fn warning_payload(level: Option<u64>, code: u64, msg: &str) -> BytesMut {
        let mut buf = BytesMut::new();
        if let Some(l) = level {
            pb::put_varint_field(&mut buf, 1, l);
        }
        pb::put_varint_field(&mut buf, 2, code);
        pb::put_str_field(&mut buf, 3, msg);
        buf
    }

    fn envelope(notice_type: u64, scope: Option<u64>, payload: &[u8]) -> BytesMut {
        let mut buf = BytesMut::new();
        pb::put_varint_field(&mut buf, 1, notice_type);
        if let Some(s) = scope {
            pb::put_varint_field(&mut buf, 2, s);
        }
        pb::put_bytes_field(&mut buf, 3, payload);
        buf
    }

    #[test]
    fn decodes_warning_notice() {
        let frame = envelope(1, Some(2), &warning_payload(None, 1287, "deprecated syntax"));
        let env = NoticeEnvelope::decode(&frame).unwrap();
        assert_eq!(env.notice_type, 1);
        assert_eq!(env.scope, NoticeScope::Local);

        let body = NoticeBody::decode(env.notice_type, &env.payload).unwrap();
        assert_eq!(
            body,
            NoticeBody::Warning {
                level: WarningLevel::Warning,
                code: 1287,
                message: "deprecated syntax".into(),
            }
        );
    }

    #[test]
    fn scope_defaults_to_global() {
        let frame = envelope(1, None, &warning_payload(Some(1), 1, "n"));
        assert_eq!(NoticeEnvelope::decode(&frame).unwrap().scope, NoticeScope::Global);
    }

    #[test]
    fn decodes_session_variable_changed() {
        let mut inner = BytesMut::new();
        pb::put_str_field(&mut inner, 1, "sql_mode");
        let frame = envelope(2, None, &inner);
        let env = NoticeEnvelope::decode(&frame).unwrap();
        let body = NoticeBody::decode(env.notice_type, &env.payload).unwrap();
        assert_eq!(
            body,
            NoticeBody::SessionVariableChanged {
                param: "sql_mode".into(),
                value: None,
            }
        );
    }

    #[test]
    fn decodes_session_state_changed() {
        let mut inner = BytesMut::new();
        pb::put_varint_field(&mut inner, 1, 11); // CLIENT_ID_ASSIGNED
        let frame = envelope(3, None, &inner);
        let env = NoticeEnvelope::decode(&frame).unwrap();
        let body = NoticeBody::decode(env.notice_type, &env.payload).unwrap();
        match body {
            NoticeBody::SessionStateChanged { param, value } => {
                assert_eq!(param, SessionStateParam::ClientIdAssigned);
                assert!(value.is_none());
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn unknown_notice_type_retains_raw_payload() {
        let frame = envelope(42, None, &[0xca, 0xfe]);
        let env = NoticeEnvelope::decode(&frame).unwrap();
        let body = NoticeBody::decode(env.notice_type, &env.payload).unwrap();
        assert_eq!(
            body,
            NoticeBody::Unknown {
                notice_type: 42,
                payload: Bytes::from_static(&[0xca, 0xfe]),
            }
        );
        assert_eq!(NoticeBody::type_name(42), "?");
    }

    #[test]
    fn envelope_without_type_is_decode_error() {
        let mut buf = BytesMut::new();
        pb::put_bytes_field(&mut buf, 3, &[1, 2, 3]);
        assert!(matches!(
            NoticeEnvelope::decode(&buf),
            Err(XWireError::Decode(_))
        ));
    }

    #[test]
    fn malformed_inner_payload_is_recoverable_error() {
        // warning body missing its mandatory code/msg fields
        let err = NoticeBody::decode(1, &[]).unwrap_err();
        assert!(matches!(err, XWireError::Decode(_)));
    }
}
