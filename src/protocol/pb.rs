//! Protobuf wire-format primitives.
//!
//! The X Protocol encodes every payload as a protobuf message. This engine
//! only needs a handful of schemas, so instead of a code generator it walks
//! the wire format directly: varints, tags, and length-delimited fields,
//! with unknown fields skipped by wire type for forward compatibility.
//!
//! Wire types: 0 = varint, 1 = 64-bit, 2 = length-delimited, 5 = 32-bit.
//! Tag byte layout: `(field_number << 3) | wire_type`.

use bytes::{BufMut, BytesMut};

use crate::error::{Result, XWireError};

const WIRE_VARINT: u8 = 0;
const WIRE_FIXED64: u8 = 1;
const WIRE_LEN: u8 = 2;
const WIRE_FIXED32: u8 = 5;

/// One decoded field value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PbValue<'a> {
    Varint(u64),
    Fixed64(u64),
    Bytes(&'a [u8]),
    Fixed32(u32),
}

impl<'a> PbValue<'a> {
    /// The varint payload, or a decode error naming the field.
    pub fn as_varint(&self, field: &str) -> Result<u64> {
        match self {
            PbValue::Varint(v) => Ok(*v),
            _ => Err(XWireError::Decode(format!(
                "field {field}: expected varint, got {self:?}"
            ))),
        }
    }

    /// The length-delimited payload, or a decode error naming the field.
    pub fn as_bytes(&self, field: &str) -> Result<&'a [u8]> {
        match self {
            PbValue::Bytes(b) => Ok(b),
            _ => Err(XWireError::Decode(format!(
                "field {field}: expected length-delimited, got {self:?}"
            ))),
        }
    }

    /// The length-delimited payload as UTF-8, or a decode error.
    pub fn as_str(&self, field: &str) -> Result<String> {
        let raw = self.as_bytes(field)?;
        String::from_utf8(raw.to_vec())
            .map_err(|e| XWireError::Decode(format!("field {field}: invalid utf-8: {e}")))
    }
}

/// Iterator-style reader over an encoded message body.
///
/// `next_field` yields `(field_number, value)` pairs until the buffer is
/// exhausted; any truncated or unsupported construct is a decode error, not
/// a panic. The payload shape is never trusted.
#[derive(Debug)]
pub struct PbReader<'a> {
    buf: &'a [u8],
}

impl<'a> PbReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Decode the next `(field_number, value)` pair, or `None` at the end.
    pub fn next_field(&mut self) -> Result<Option<(u32, PbValue<'a>)>> {
        if self.buf.is_empty() {
            return Ok(None);
        }
        let tag = self.read_varint()?;
        let field = (tag >> 3) as u32;
        if field == 0 {
            return Err(XWireError::Decode("field number 0 is invalid".into()));
        }
        let value = match (tag & 0x07) as u8 {
            WIRE_VARINT => PbValue::Varint(self.read_varint()?),
            WIRE_FIXED64 => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(self.take(8)?);
                PbValue::Fixed64(u64::from_le_bytes(raw))
            }
            WIRE_LEN => {
                let len = self.read_varint()? as usize;
                PbValue::Bytes(self.take(len)?)
            }
            WIRE_FIXED32 => {
                let mut raw = [0u8; 4];
                raw.copy_from_slice(self.take(4)?);
                PbValue::Fixed32(u32::from_le_bytes(raw))
            }
            other => {
                return Err(XWireError::Decode(format!(
                    "unsupported wire type {other} for field {field}"
                )));
            }
        };
        Ok(Some((field, value)))
    }

    fn read_varint(&mut self) -> Result<u64> {
        let mut value: u64 = 0;
        for shift in 0..10 {
            let Some((&byte, rest)) = self.buf.split_first() else {
                return Err(XWireError::Decode("truncated varint".into()));
            };
            self.buf = rest;
            value |= u64::from(byte & 0x7f) << (shift * 7);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(XWireError::Decode("varint longer than 10 bytes".into()))
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.buf.len() < n {
            return Err(XWireError::Decode(format!(
                "truncated field: need {n} bytes, have {}",
                self.buf.len()
            )));
        }
        let (head, rest) = self.buf.split_at(n);
        self.buf = rest;
        Ok(head)
    }
}

/// Decode a zigzag-encoded signed integer (`sint64` fields).
pub fn decode_zigzag(v: u64) -> i64 {
    ((v >> 1) as i64) ^ -((v & 1) as i64)
}

/// Append a bare varint.
pub fn put_varint(buf: &mut BytesMut, mut v: u64) {
    while v >= 0x80 {
        buf.put_u8((v as u8 & 0x7f) | 0x80);
        v >>= 7;
    }
    buf.put_u8(v as u8);
}

/// Append a varint field: tag + value.
pub fn put_varint_field(buf: &mut BytesMut, field: u32, v: u64) {
    put_varint(buf, (u64::from(field) << 3) | u64::from(WIRE_VARINT));
    put_varint(buf, v);
}

/// Append a length-delimited field: tag + length + raw bytes.
pub fn put_bytes_field(buf: &mut BytesMut, field: u32, raw: &[u8]) {
    put_varint(buf, (u64::from(field) << 3) | u64::from(WIRE_LEN));
    put_varint(buf, raw.len() as u64);
    buf.put_slice(raw);
}

/// Append a string field (length-delimited UTF-8).
pub fn put_str_field(buf: &mut BytesMut, field: u32, s: &str) {
    put_bytes_field(buf, field, s.as_bytes());
}
