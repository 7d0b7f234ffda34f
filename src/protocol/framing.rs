use std::io::{Read, Write};

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Result, XWireError};

/// One length-prefixed unit of the wire protocol.
///
/// Transient: exists only for the duration of one read or write. The 4-byte
/// header and length bookkeeping never leave this module.
#[derive(Debug, Clone)]
pub struct Frame {
    pub msg_type: u8,
    pub payload: Bytes,
}

/// Read one frame from the stream.
///
/// The header is a little-endian u32 counting the type byte plus the
/// payload, so it must be at least 1. A header of 0 or one above
/// `max_frame_size` means trust in the framing is lost: the error is
/// connection-fatal and there is no byte-level resynchronization. Short
/// reads are transport failures, equally fatal.
pub fn read_frame<R: Read>(rd: &mut R, max_frame_size: usize) -> Result<Frame> {
    let mut hdr = [0u8; 4];
    rd.read_exact(&mut hdr)?;
    let frame_len = u32::from_le_bytes(hdr) as usize;

    if frame_len < 1 {
        return Err(XWireError::MalformedFrame(
            "header length 0, frame must at least carry the type byte".into(),
        ));
    }
    if frame_len > max_frame_size {
        return Err(XWireError::MalformedFrame(format!(
            "header length {frame_len} exceeds maximum allowed {max_frame_size}"
        )));
    }

    let mut body = vec![0u8; frame_len];
    rd.read_exact(&mut body)?;
    let msg_type = body[0];
    body.drain(..1);
    Ok(Frame {
        msg_type,
        payload: Bytes::from(body),
    })
}

/// Encode a frame into a single contiguous buffer.
///
/// Rejects payloads where the framed size (`payload + type byte`) exceeds
/// `max_frame_size` without producing any bytes; the connection stays
/// usable after this error.
pub fn encode_frame(msg_type: u8, payload: &[u8], max_frame_size: usize) -> Result<BytesMut> {
    let frame_len = payload.len() + 1;
    if frame_len > max_frame_size {
        return Err(XWireError::FrameTooLarge {
            size: frame_len,
            limit: max_frame_size,
        });
    }

    let mut buf = BytesMut::with_capacity(4 + frame_len);
    buf.put_u32_le(frame_len as u32);
    buf.put_u8(msg_type);
    buf.put_slice(payload);
    Ok(buf)
}

/// Encode and write a frame as one non-interleavable unit.
///
/// Header and payload go out in a single `write_all`; a partial write is a
/// fatal transport error, never retried here.
pub fn write_frame<W: Write>(
    wr: &mut W,
    msg_type: u8,
    payload: &[u8],
    max_frame_size: usize,
) -> Result<()> {
    let buf = encode_frame(msg_type, payload, max_frame_size)?;
    wr.write_all(&buf)?;
    wr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MAX_FRAME_SIZE;

    fn roundtrip(msg_type: u8, payload: &[u8], max: usize) -> Frame {
        let buf = encode_frame(msg_type, payload, max).unwrap();
        read_frame(&mut buf.as_ref(), max).unwrap()
    }

    #[test]
    fn roundtrip_empty_payload() {
        let f = roundtrip(1, b"", DEFAULT_MAX_FRAME_SIZE);
        assert_eq!(f.msg_type, 1);
        assert!(f.payload.is_empty());
    }

    #[test]
    fn roundtrip_one_byte_payload() {
        let f = roundtrip(4, b"\x42", DEFAULT_MAX_FRAME_SIZE);
        assert_eq!(f.msg_type, 4);
        assert_eq!(&f.payload[..], b"\x42");
    }

    #[test]
    fn roundtrip_at_configured_maximum() {
        let max = 64;
        let payload = vec![0xa5u8; max - 1];
        let f = roundtrip(12, &payload, max);
        assert_eq!(f.msg_type, 12);
        assert_eq!(f.payload.len(), max - 1);
    }

    #[test]
    fn zero_length_header_is_malformed_and_consumes_only_header() {
        let mut data: &[u8] = &[0, 0, 0, 0, 0xff, 0xff];
        let err = read_frame(&mut data, DEFAULT_MAX_FRAME_SIZE).unwrap_err();
        assert!(matches!(err, XWireError::MalformedFrame(_)));
        // only the 4 header bytes were consumed
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn oversized_header_is_malformed() {
        let mut buf = BytesMut::new();
        buf.put_u32_le(65);
        buf.put_u8(1);
        let err = read_frame(&mut buf.as_ref(), 64).unwrap_err();
        assert!(matches!(err, XWireError::MalformedFrame(_)));
    }

    #[test]
    fn short_body_is_transport_error() {
        let mut buf = BytesMut::new();
        buf.put_u32_le(10);
        buf.put_u8(1); // 9 payload bytes missing
        let err = read_frame(&mut buf.as_ref(), 64).unwrap_err();
        assert!(err.is_transport());
    }

    #[test]
    fn oversized_payload_rejected_before_write() {
        let payload = vec![0u8; 64]; // framed size 65 > 64
        let err = encode_frame(2, &payload, 64).unwrap_err();
        assert!(matches!(
            err,
            XWireError::FrameTooLarge { size: 65, limit: 64 }
        ));

        let mut sink = Vec::new();
        let err = write_frame(&mut sink, 2, &payload, 64).unwrap_err();
        assert!(matches!(err, XWireError::FrameTooLarge { .. }));
        assert!(sink.is_empty());
    }

    #[test]
    fn header_is_little_endian_and_counts_type_byte() {
        let buf = encode_frame(11, b"abc", DEFAULT_MAX_FRAME_SIZE).unwrap();
        assert_eq!(&buf[..], &[4, 0, 0, 0, 11, b'a', b'b', b'c']);
    }
}
