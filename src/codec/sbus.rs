//! # SBUS Frame Codec
//!
//! Packs/unpacks sixteen 11-bit radio channels plus a flags byte into a
//! fixed 25-byte frame: `0x0F | 22 packed channel bytes | flags | end`.
//! The end byte is `0x04` on encode but accepted as `0x04`/`0x14`/`0x24`/`0x34`
//! on decode.
//!
//! The bit layout below is transcribed directly from
//! `IIPSProtocol::SbusPacketEncode`/`SbusBufferDecode` — channel *k* occupies
//! bits `11k..11k+10` of the 176-bit payload, packed little-endian across
//! byte boundaries. There is no clean closed-form loop for this layout in the
//! reference implementation, so this port keeps it spelled out byte-by-byte
//! rather than inventing a differently-shaped packing loop.

use crate::buffer::ReceiveBuffer;
use crate::constants::{SBUS_CHANNEL_COUNT, SBUS_END_BYTES, SBUS_FRAME_LEN, SBUS_START_BYTE};
use crate::error::IipsError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SbusFrame {
    pub channels: [u16; SBUS_CHANNEL_COUNT],
    pub flags: u8,
}

impl SbusFrame {
    pub fn new(channels: [u16; SBUS_CHANNEL_COUNT], flags: u8) -> Self {
        Self { channels, flags }
    }
}

/// Packs `channels` (each must fit in 11 bits) and `flags` into a 25-byte frame.
pub fn encode(channels: &[u16; SBUS_CHANNEL_COUNT], flags: u8) -> Result<[u8; SBUS_FRAME_LEN], IipsError> {
    if let Some(&bad) = channels.iter().find(|&&c| c > 0x07FF) {
        return Err(IipsError::Other(format!(
            "SBUS channel value {bad} exceeds 11-bit range"
        )));
    }
    let c = channels;
    let mut out = [0u8; SBUS_FRAME_LEN];
    out[0] = SBUS_START_BYTE;
    out[1] = c[0] as u8;
    out[2] = (c[0] >> 8 | c[1] << 3) as u8;
    out[3] = (c[1] >> 5 | c[2] << 6) as u8;
    out[4] = (c[2] >> 2) as u8;
    out[5] = (c[2] >> 10 | c[3] << 1) as u8;
    out[6] = (c[3] >> 7 | c[4] << 4) as u8;
    out[7] = (c[4] >> 4 | c[5] << 7) as u8;
    out[8] = (c[5] >> 1) as u8;
    out[9] = (c[5] >> 9 | c[6] << 2) as u8;
    out[10] = (c[6] >> 6 | c[7] << 5) as u8;
    out[11] = (c[7] >> 3) as u8;
    out[12] = c[8] as u8;
    out[13] = (c[8] >> 8 | c[9] << 3) as u8;
    out[14] = (c[9] >> 5 | c[10] << 6) as u8;
    out[15] = (c[10] >> 2) as u8;
    out[16] = (c[10] >> 10 | c[11] << 1) as u8;
    out[17] = (c[11] >> 7 | c[12] << 4) as u8;
    out[18] = (c[12] >> 4 | c[13] << 7) as u8;
    out[19] = (c[13] >> 1) as u8;
    out[20] = (c[13] >> 9 | c[14] << 2) as u8;
    out[21] = (c[14] >> 6 | c[15] << 5) as u8;
    out[22] = (c[15] >> 3) as u8;
    out[23] = flags;
    out[24] = 0x04;
    Ok(out)
}

/// Attempts to decode a single SBUS frame from `buffer`.
///
/// Resyncs on a missing start byte or an unrecognized end byte.
pub fn decode(buffer: &mut ReceiveBuffer) -> Option<SbusFrame> {
    loop {
        if buffer.len() < SBUS_FRAME_LEN {
            return None;
        }
        if buffer.byte_at(0) != Some(SBUS_START_BYTE) {
            buffer.drop_one();
            continue;
        }
        let end = buffer.byte_at(24).unwrap();
        if !SBUS_END_BYTES.contains(&end) {
            buffer.drop_one();
            continue;
        }

        let b = buffer.peek_range(0, SBUS_FRAME_LEN);
        let w = |i: usize| b[i] as u16;
        let mut channels = [0u16; SBUS_CHANNEL_COUNT];
        channels[0] = (w(1) | w(2) << 8) & 0x07FF;
        channels[1] = (w(2) >> 3 | w(3) << 5) & 0x07FF;
        channels[2] = (w(3) >> 6 | w(4) << 2 | w(5) << 10) & 0x07FF;
        channels[3] = (w(5) >> 1 | w(6) << 7) & 0x07FF;
        channels[4] = (w(6) >> 4 | w(7) << 4) & 0x07FF;
        channels[5] = (w(7) >> 7 | w(8) << 1 | w(9) << 9) & 0x07FF;
        channels[6] = (w(9) >> 2 | w(10) << 6) & 0x07FF;
        channels[7] = (w(10) >> 5 | w(11) << 3) & 0x07FF;
        channels[8] = (w(12) | w(13) << 8) & 0x07FF;
        channels[9] = (w(13) >> 3 | w(14) << 5) & 0x07FF;
        channels[10] = (w(14) >> 6 | w(15) << 2 | w(16) << 10) & 0x07FF;
        channels[11] = (w(16) >> 1 | w(17) << 7) & 0x07FF;
        channels[12] = (w(17) >> 4 | w(18) << 4) & 0x07FF;
        channels[13] = (w(18) >> 7 | w(19) << 1 | w(20) << 9) & 0x07FF;
        channels[14] = (w(20) >> 2 | w(21) << 6) & 0x07FF;
        channels[15] = (w(21) >> 5 | w(22) << 3) & 0x07FF;
        let flags = b[23];

        buffer.consume(SBUS_FRAME_LEN);
        return Some(SbusFrame::new(channels, flags));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_max_channels() {
        let channels = [0x07FFu16; SBUS_CHANNEL_COUNT];
        let bytes = encode(&channels, 0xAB).unwrap();
        let mut buf = ReceiveBuffer::new(SBUS_FRAME_LEN * 2);
        buf.append(&bytes);
        let frame = decode(&mut buf).unwrap();
        assert_eq!(frame.channels, channels);
        assert_eq!(frame.flags, 0xAB);
    }

    #[test]
    fn round_trip_distinct_channels() {
        let mut channels = [0u16; SBUS_CHANNEL_COUNT];
        for (i, ch) in channels.iter_mut().enumerate() {
            *ch = (i as u16 * 101) & 0x07FF;
        }
        let bytes = encode(&channels, 0x01).unwrap();
        let mut buf = ReceiveBuffer::new(SBUS_FRAME_LEN * 2);
        buf.append(&bytes);
        let frame = decode(&mut buf).unwrap();
        assert_eq!(frame.channels, channels);
    }

    #[test]
    fn rejects_out_of_range_channel() {
        let mut channels = [0u16; SBUS_CHANNEL_COUNT];
        channels[3] = 0x0800;
        assert!(encode(&channels, 0).is_err());
    }

    #[test]
    fn accepts_alternate_end_bytes() {
        let channels = [100u16; SBUS_CHANNEL_COUNT];
        let mut bytes = encode(&channels, 0).unwrap();
        bytes[24] = 0x24;
        let mut buf = ReceiveBuffer::new(SBUS_FRAME_LEN * 2);
        buf.append(&bytes);
        assert!(decode(&mut buf).is_some());
    }

    #[test]
    fn bad_end_byte_resyncs() {
        let channels = [5u16; SBUS_CHANNEL_COUNT];
        let mut bytes = encode(&channels, 0).unwrap();
        bytes[24] = 0xFF;
        let mut buf = ReceiveBuffer::new(SBUS_FRAME_LEN * 2);
        buf.append(&bytes);
        assert!(decode(&mut buf).is_none());
        assert!(buf.error_count() >= 1);
    }
}
