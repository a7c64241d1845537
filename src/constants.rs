//! IIPS wire constants.
//!
//! Mirrors the packet ids and sub-phase bytes defined by the ground-station
//! protocol: see `IIPSComm.h`'s `PacketId`/`UploadType` enums.

/// Minimal periodic frame that refreshes the connection watchdog.
pub const PACKET_ID_HEARTBEAT: u8 = 0;
/// Standby notification; no waypoint side effect.
pub const PACKET_ID_STANDBY: u8 = 1;
/// Polygon survey mission upload.
pub const PACKET_ID_SURVEY: u8 = 2;
/// Waypoint-line mission upload.
pub const PACKET_ID_LINE: u8 = 3;
/// Polygon region mission upload (alias of survey handling).
pub const PACKET_ID_REGION: u8 = 4;
/// Target-follow command (stub only).
pub const PACKET_ID_FOLLOW: u8 = 5;
/// Outbound telemetry status frame.
pub const PACKET_ID_STATUS: u8 = 128;
/// Outbound mission-upload acknowledgement.
pub const PACKET_ID_ACK: u8 = 129;

/// Mission sub-phase byte occupying payload offset 10.
pub const SUBPHASE_START: u8 = 0;
pub const SUBPHASE_WAYPOINT: u8 = 1;
pub const SUBPHASE_END: u8 = 2;
pub const SUBPHASE_RESPONSE: u8 = 0xFF;

/// Byte length of a mission START/END/ack payload.
pub const MISSION_CONTROL_PAYLOAD_LEN: usize = 11;
/// Byte length of a mission WAYPOINT payload.
pub const MISSION_WAYPOINT_PAYLOAD_LEN: usize = 31;

/// Byte length of the packed `StatusRecord` payload.
pub const STATUS_PAYLOAD_LEN: usize = 71;

/// Minimum number of waypoints required to emit a REGION/SURVEY plan.
pub const MIN_SURVEY_WAYPOINTS: usize = 4;

/// Maximum payload length a binary frame can carry (header length1/length2 are u8).
pub const MAX_PAYLOAD_LEN: usize = 255;

/// Binary frame header length: lrc(1) + id(1) + len(1) + crc16(2).
pub const BINARY_HEADER_LEN: usize = 5;

/// SBUS frame length: start(1) + 22 packed channel bytes + flags(1) + end(1).
pub const SBUS_FRAME_LEN: usize = 25;
pub const SBUS_CHANNEL_COUNT: usize = 16;
pub const SBUS_START_BYTE: u8 = 0x0F;
pub const SBUS_END_BYTES: [u8; 4] = [0x04, 0x14, 0x24, 0x34];

/// ASCII frame overhead beyond the payload: `$` + `*` + 2 hex chars + CR + LF.
pub const ASCII_HEADER_LEN: usize = 6;

/// Default local bind port for receiving heartbeats, commands and mission uploads.
pub const DEFAULT_QGC_PORT: u16 = 8001;
/// Default remote peer port for telemetry and acks.
pub const DEFAULT_IIPS_PORT: u16 = 8000;
/// Default remote peer address.
pub const DEFAULT_IIPS_IP: &str = "127.0.0.1";
/// Default watchdog timeout, in seconds.
pub const DEFAULT_WATCHDOG_TIMEOUT_SECS: u64 = 3;
/// Default bound telemetry vehicle id, checked against WAYPOINT/END sender ids.
pub const DEFAULT_BOUND_VEHICLE_ID: u16 = 1;
