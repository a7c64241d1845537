//! # Status Encoder
//!
//! Packs [`StatusRecord`] telemetry into its fixed 71-byte little-endian
//! layout and wraps it in a binary frame with id [`PACKET_ID_STATUS`].
//! Grounded in the payload layout of `IIPSComm.h`'s `QGCStatusData` struct
//! and `IIPSComm.cpp`'s `SlotSendData`, which is invoked by an external
//! telemetry clock and does not itself schedule.

use crate::codec::binary;
use crate::constants::{PACKET_ID_STATUS, STATUS_PAYLOAD_LEN};
use crate::error::IipsError;
use bytes::BytesMut;

/// Telemetry record mirroring `QGCStatusData`'s packed fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusRecord {
    pub id: u16,
    pub timestamp: f64,
    pub status: u8,
    pub lat_rad: f64,
    pub lon_rad: f64,
    pub alt_m: f64,
    pub roll_rad: f32,
    pub pitch_rad: f32,
    pub yaw_rad: f32,
    pub velocity_north: f32,
    pub velocity_east: f32,
    pub velocity_down: f32,
    pub gyro_x: f32,
    pub gyro_y: f32,
    pub gyro_z: f32,
}

impl StatusRecord {
    /// Serializes the record into its 71-byte little-endian wire layout.
    pub fn pack(&self) -> [u8; STATUS_PAYLOAD_LEN] {
        let mut out = [0u8; STATUS_PAYLOAD_LEN];
        let mut at = 0;
        macro_rules! put {
            ($bytes:expr) => {{
                let b = $bytes;
                out[at..at + b.len()].copy_from_slice(&b);
                at += b.len();
            }};
        }
        put!(self.id.to_le_bytes());
        put!(self.timestamp.to_le_bytes());
        put!([self.status]);
        put!(self.lat_rad.to_le_bytes());
        put!(self.lon_rad.to_le_bytes());
        put!(self.alt_m.to_le_bytes());
        put!(self.roll_rad.to_le_bytes());
        put!(self.pitch_rad.to_le_bytes());
        put!(self.yaw_rad.to_le_bytes());
        put!(self.velocity_north.to_le_bytes());
        put!(self.velocity_east.to_le_bytes());
        put!(self.velocity_down.to_le_bytes());
        put!(self.gyro_x.to_le_bytes());
        put!(self.gyro_y.to_le_bytes());
        put!(self.gyro_z.to_le_bytes());
        debug_assert_eq!(at, STATUS_PAYLOAD_LEN);
        out
    }
}

/// Packs `record` into a binary frame (id 128) ready to send over UDP.
pub fn encode_status_frame(record: &StatusRecord) -> Result<BytesMut, IipsError> {
    binary::encode(PACKET_ID_STATUS, &record.pack())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StatusRecord {
        StatusRecord {
            id: 1,
            timestamp: 2.0,
            status: 3,
            lat_rad: 4.0,
            lon_rad: 5.0,
            alt_m: 6.0,
            roll_rad: 7.0,
            pitch_rad: 8.0,
            yaw_rad: 9.0,
            velocity_north: 10.0,
            velocity_east: 11.0,
            velocity_down: 12.0,
            gyro_x: 13.0,
            gyro_y: 14.0,
            gyro_z: 15.0,
        }
    }

    #[test]
    fn pack_is_exactly_71_bytes() {
        assert_eq!(sample().pack().len(), STATUS_PAYLOAD_LEN);
    }

    #[test]
    fn pack_is_little_endian() {
        let packed = sample().pack();
        assert_eq!(&packed[0..2], &1u16.to_le_bytes());
        assert_eq!(&packed[2..10], &2.0f64.to_le_bytes());
        assert_eq!(packed[10], 3u8);
    }

    #[test]
    fn frame_wraps_status_id_and_length() {
        let frame_bytes = encode_status_frame(&sample()).unwrap();
        // header: lrc, id, len, crc_lo, crc_hi
        assert_eq!(frame_bytes[1], PACKET_ID_STATUS);
        assert_eq!(frame_bytes[2] as usize, STATUS_PAYLOAD_LEN);
    }
}
