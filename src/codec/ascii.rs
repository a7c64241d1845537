//! # ASCII Frame Codec
//!
//! Delimited printable framing: `$payload*CChex CR LF`. Checksum is the XOR
//! of payload bytes, stored as two ASCII hex characters with the **low**
//! nibble first — the reverse of conventional NMEA ordering, preserved here
//! for wire compatibility with the original encoder.
//!
//! Ported from `IIPSProtocol::AsciiBufferDecode`'s "scan for `$`, keep the
//! last `*` before end of data" resync rule.

use crate::buffer::ReceiveBuffer;
use crate::constants::ASCII_HEADER_LEN;
use crate::error::IipsError;
use bytes::{BufMut, BytesMut};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsciiFrame {
    pub payload: Vec<u8>,
}

impl AsciiFrame {
    pub fn new(payload: Vec<u8>) -> Self {
        Self { payload }
    }
}

fn nibble_to_hex(nibble: u8) -> u8 {
    match nibble {
        0..=9 => b'0' + nibble,
        10..=15 => b'A' + (nibble - 10),
        _ => unreachable!("nibble is masked to 4 bits"),
    }
}

/// XOR checksum of `payload`, returned as (low-nibble-char, high-nibble-char).
fn checksum_hex(payload: &[u8]) -> (u8, u8) {
    let xor = payload.iter().fold(0u8, |acc, &b| acc ^ b);
    let low = nibble_to_hex(xor & 0x0F);
    let high = nibble_to_hex((xor >> 4) & 0x0F);
    (low, high)
}

/// Encodes `payload` as `$payload*<low><high>\r\n`.
///
/// Fails if `payload` contains `*`, which would be ambiguous with the frame
/// delimiter.
pub fn encode(payload: &[u8]) -> Result<BytesMut, IipsError> {
    if payload.contains(&b'*') {
        return Err(IipsError::Other(
            "ASCII payload must not contain '*'".to_string(),
        ));
    }
    let (low, high) = checksum_hex(payload);
    let mut buf = BytesMut::with_capacity(ASCII_HEADER_LEN + payload.len());
    buf.put_u8(b'$');
    buf.put_slice(payload);
    buf.put_u8(b'*');
    buf.put_u8(low);
    buf.put_u8(high);
    buf.put_u8(b'\r');
    buf.put_u8(b'\n');
    Ok(buf)
}

/// Attempts to decode a single frame from `buffer`.
///
/// Scans forward for `$`, then keeps the *last* `*` seen before the end of
/// buffered data as the delimiter (if payloads may themselves contain `*`,
/// only the final one counts — matching the reference implementation).
pub fn decode(buffer: &mut ReceiveBuffer) -> Option<AsciiFrame> {
    loop {
        if buffer.len() < ASCII_HEADER_LEN {
            return None;
        }
        if buffer.byte_at(0) != Some(b'$') {
            buffer.drop_one();
            continue;
        }

        let mut payload_len = None;
        for i in 1..buffer.len() {
            if buffer.byte_at(i) == Some(b'*') {
                payload_len = Some(i - 1);
            }
        }
        let Some(payload_len) = payload_len else {
            return None;
        };

        let frame_len = ASCII_HEADER_LEN + payload_len;
        if buffer.len() < frame_len {
            return None;
        }

        let payload = buffer.peek_range(1, payload_len);
        let (expected_low, expected_high) = checksum_hex(&payload);
        let actual_low = buffer.byte_at(payload_len + 2).unwrap();
        let actual_high = buffer.byte_at(payload_len + 3).unwrap();

        if actual_low != expected_low || actual_high != expected_high {
            buffer.drop_one();
            continue;
        }

        buffer.consume(frame_len);
        return Some(AsciiFrame::new(payload));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let payload = b"HELLO,1,2,3".to_vec();
        let bytes = encode(&payload).unwrap();
        let mut buf = ReceiveBuffer::new(1024);
        buf.append(&bytes);
        let frame = decode(&mut buf).unwrap();
        assert_eq!(frame.payload, payload);
        assert!(buf.is_empty());
    }

    #[test]
    fn checksum_uses_low_nibble_first() {
        // XOR of "AB" = 'A' ^ 'B' = 0x41 ^ 0x42 = 0x03 -> low nibble '3', high nibble '0'.
        let bytes = encode(b"AB").unwrap();
        assert_eq!(bytes[bytes.len() - 4], b'3');
        assert_eq!(bytes[bytes.len() - 3], b'0');
    }

    #[test]
    fn rejects_payload_containing_star() {
        assert!(encode(b"bad*payload").is_err());
    }

    #[test]
    fn resyncs_past_garbage_prefix() {
        let mut bytes = vec![b'x', b'y'];
        bytes.extend(encode(b"DATA").unwrap());
        let mut buf = ReceiveBuffer::new(1024);
        buf.append(&bytes);
        let frame = decode(&mut buf).unwrap();
        assert_eq!(frame.payload, b"DATA");
        assert_eq!(buf.error_count(), 2);
    }

    #[test]
    fn insufficient_without_delimiter() {
        let mut buf = ReceiveBuffer::new(1024);
        buf.append(b"$NODELIM");
        assert!(decode(&mut buf).is_none());
    }

    #[test]
    fn bad_checksum_resyncs() {
        let mut bytes = encode(b"DATA").unwrap().to_vec();
        let star = bytes.iter().position(|&b| b == b'*').unwrap();
        bytes[star + 1] = b'0'; // corrupt the low-nibble hex char
        bytes[star + 2] = b'0';
        let mut buf = ReceiveBuffer::new(1024);
        buf.append(&bytes);
        assert!(decode(&mut buf).is_none());
        assert!(buf.error_count() >= 1);
    }
}
