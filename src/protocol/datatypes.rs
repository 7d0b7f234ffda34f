//! `Mysqlx.Datatypes` decoding.
//!
//! Capability and notice values arrive as `Any`, a union over scalars,
//! objects and arrays. The engine only consumes string scalars, bool scalars
//! and arrays of string scalars; every other shape decodes to
//! [`TypedValue::Unsupported`] so an unrecognized value is a checked outcome
//! for the caller to log and skip, never a fallthrough.

use bytes::BytesMut;

use super::pb::{self, PbReader};
use crate::error::{Result, XWireError};

// Any.type
const ANY_SCALAR: u64 = 1;
const ANY_OBJECT: u64 = 2;
const ANY_ARRAY: u64 = 3;

// Scalar.type
const SCALAR_V_SINT: u64 = 1;
const SCALAR_V_UINT: u64 = 2;
const SCALAR_V_NULL: u64 = 3;
const SCALAR_V_OCTETS: u64 = 4;
const SCALAR_V_DOUBLE: u64 = 5;
const SCALAR_V_FLOAT: u64 = 6;
const SCALAR_V_BOOL: u64 = 7;
const SCALAR_V_STRING: u64 = 8;

/// A decoded connection-level value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    String(String),
    Bool(bool),
    StringArray(Vec<String>),
    /// Any shape this engine does not consume, with a human-readable
    /// description of what was found (for diagnostics only).
    Unsupported(String),
}

impl TypedValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

fn scalar_type_name(code: u64) -> &'static str {
    match code {
        SCALAR_V_SINT => "V_SINT",
        SCALAR_V_UINT => "V_UINT",
        SCALAR_V_NULL => "V_NULL",
        SCALAR_V_OCTETS => "V_OCTETS",
        SCALAR_V_DOUBLE => "V_DOUBLE",
        SCALAR_V_FLOAT => "V_FLOAT",
        SCALAR_V_BOOL => "V_BOOL",
        SCALAR_V_STRING => "V_STRING",
        _ => "unknown",
    }
}

/// Decode an `Any` message into a [`TypedValue`].
///
/// Truncated or contradictory encodings are decode errors; well-formed
/// values of a shape the engine does not consume are `Unsupported`.
pub fn decode_any(raw: &[u8]) -> Result<TypedValue> {
    let mut any_type = None;
    let mut scalar = None;
    let mut array = None;

    let mut rd = PbReader::new(raw);
    while let Some((field, value)) = rd.next_field()? {
        match field {
            1 => any_type = Some(value.as_varint("Any.type")?),
            2 => scalar = Some(value.as_bytes("Any.scalar")?),
            4 => array = Some(value.as_bytes("Any.array")?),
            // Any.obj and unknown extensions: shape is known unsupported,
            // the tag alone is enough
            _ => {}
        }
    }

    match any_type {
        Some(ANY_SCALAR) => {
            let raw = scalar
                .ok_or_else(|| XWireError::Decode("Any of type SCALAR without scalar".into()))?;
            decode_scalar(raw)
        }
        Some(ANY_ARRAY) => {
            let raw = array
                .ok_or_else(|| XWireError::Decode("Any of type ARRAY without array".into()))?;
            decode_string_array(raw)
        }
        Some(ANY_OBJECT) => Ok(TypedValue::Unsupported("object".into())),
        Some(other) => Ok(TypedValue::Unsupported(format!("Any type {other}"))),
        None => Err(XWireError::Decode("Any without mandatory type".into())),
    }
}

fn decode_scalar(raw: &[u8]) -> Result<TypedValue> {
    let mut scalar_type = None;
    let mut v_signed = None;
    let mut v_bool = None;
    let mut v_string = None;

    let mut rd = PbReader::new(raw);
    while let Some((field, value)) = rd.next_field()? {
        match field {
            1 => scalar_type = Some(value.as_varint("Scalar.type")?),
            2 => v_signed = Some(pb::decode_zigzag(value.as_varint("Scalar.v_signed_int")?)),
            8 => v_bool = Some(value.as_varint("Scalar.v_bool")? != 0),
            9 => v_string = Some(decode_scalar_string(value.as_bytes("Scalar.v_string")?)?),
            // v_unsigned_int, v_octets, v_double, v_float: classified by
            // type code below
            _ => {}
        }
    }

    let scalar_type =
        scalar_type.ok_or_else(|| XWireError::Decode("Scalar without mandatory type".into()))?;
    match scalar_type {
        SCALAR_V_STRING => {
            let s = v_string
                .ok_or_else(|| XWireError::Decode("Scalar V_STRING without v_string".into()))?;
            Ok(TypedValue::String(s))
        }
        SCALAR_V_BOOL => {
            let b = v_bool
                .ok_or_else(|| XWireError::Decode("Scalar V_BOOL without v_bool".into()))?;
            Ok(TypedValue::Bool(b))
        }
        // sint values still decode (zigzag) so the diagnostic can name what
        // was skipped
        SCALAR_V_SINT => Ok(TypedValue::Unsupported(match v_signed {
            Some(v) => format!("scalar V_SINT ({v})"),
            None => "scalar V_SINT".into(),
        })),
        other => Ok(TypedValue::Unsupported(format!(
            "scalar {}",
            scalar_type_name(other)
        ))),
    }
}

// Scalar.String { required bytes value = 1; optional uint64 collation = 2; }
fn decode_scalar_string(raw: &[u8]) -> Result<String> {
    let mut rd = PbReader::new(raw);
    let mut value = None;
    while let Some((field, v)) = rd.next_field()? {
        if field == 1 {
            value = Some(v.as_str("Scalar.String.value")?);
        }
    }
    value.ok_or_else(|| XWireError::Decode("Scalar.String without value".into()))
}

// Array { repeated Any value = 1; }, accepted only when every element is a
// string scalar, anything else makes the whole value Unsupported.
fn decode_string_array(raw: &[u8]) -> Result<TypedValue> {
    let mut items = Vec::new();
    let mut rd = PbReader::new(raw);
    while let Some((field, value)) = rd.next_field()? {
        if field != 1 {
            continue;
        }
        match decode_any(value.as_bytes("Array.value")?)? {
            TypedValue::String(s) => items.push(s),
            other => {
                return Ok(TypedValue::Unsupported(format!(
                    "array with non-string element ({other:?})"
                )));
            }
        }
    }
    Ok(TypedValue::StringArray(items))
}

/// Encode an `Any` carrying a bool scalar, the one value shape this engine
/// ever sends (capability-set).
pub fn encode_bool_any(value: bool) -> BytesMut {
    let mut scalar = BytesMut::new();
    pb::put_varint_field(&mut scalar, 1, SCALAR_V_BOOL);
    pb::put_varint_field(&mut scalar, 8, u64::from(value));

    let mut any = BytesMut::new();
    pb::put_varint_field(&mut any, 1, ANY_SCALAR);
    pb::put_bytes_field(&mut any, 2, &scalar);
    any
}
