//! # IIPS Error Handling
//!
//! This module defines the [`IipsError`] enum covering the failures the core
//! surfaces to its caller. Per-byte framing errors (LRC/CRC/checksum
//! mismatches, bad SBUS end bytes) are *not* represented here: the codecs
//! resynchronize internally and never hand a framing failure up the stack
//! (see [`crate::codec`]).

use thiserror::Error;

/// Represents the different error types the IIPS core can return.
#[derive(Debug, Error)]
pub enum IipsError {
    /// A caller asked to encode a payload longer than the wire format allows.
    #[error("payload too long: {0} bytes exceeds max of {1}")]
    PayloadTooLong(usize, usize),

    /// Socket bind or I/O failure.
    #[error("UDP I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration persistence failed.
    #[error("configuration error: {0}")]
    Config(String),

    /// The plan emitter failed to serialize or persist a mission plan.
    #[error("plan emission failed: {0}")]
    PlanEmission(String),

    /// REGION/SURVEY END arrived with fewer than the minimum waypoint count.
    #[error("mission upload rejected: only {0} waypoints accumulated, need at least {1}")]
    InsufficientWaypoints(usize, usize),

    /// A catch-all for uncategorized cases.
    #[error("other error: {0}")]
    Other(String),
}
