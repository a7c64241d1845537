//! # Mission Upload Assembler
//!
//! Reassembles a three-phase mission upload (`START` → one or more
//! `WAYPOINT` → `END`) into a [`Waypoint`] list and hands the finished list
//! to a [`PlanEmitter`]. Ported from `IIPSComm::SlotReceiveData`'s
//! `switch` over sub-phase bytes; the per-type dispatch (`LINE` vs
//! `REGION`/`SURVEY` vs `STANDBY`) is handled one level up in
//! [`crate::reactor`], since it also governs which packet ids open a new
//! upload at all.
//!
//! Every mission frame shares an 11-byte header: sender vehicle id (u16
//! LE), a timestamp (f64 LE), and the sub-phase byte. `WAYPOINT` frames
//! append latitude/longitude (f64 LE, radians) and altitude (f32 LE,
//! meters) after that header.

use crate::constants::{
    MISSION_CONTROL_PAYLOAD_LEN, MISSION_WAYPOINT_PAYLOAD_LEN, MIN_SURVEY_WAYPOINTS,
    SUBPHASE_END, SUBPHASE_START, SUBPHASE_WAYPOINT,
};
use crate::error::IipsError;
use crate::logging::{log_debug, log_warn};
use crate::mission::plan::{PlanEmitter, PlanType, Waypoint};
use crate::observer::{IipsEvent, ObserverRegistry};

const HEADER_LEN: usize = MISSION_CONTROL_PAYLOAD_LEN;

/// Current state of an in-progress (or absent) mission upload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MissionPhase {
    Idle,
    Receiving { plan_type: PlanType },
}

/// Owns the in-progress waypoint list and phase for one mission upload.
///
/// `bound_vehicle_id` is set independently of any particular upload (it
/// identifies which vehicle this ground link is currently bound to) and is
/// compared against every `WAYPOINT`'s own sender id — a `START`'s sender
/// id does not itself bind the vehicle.
pub struct MissionAssembler {
    phase: MissionPhase,
    bound_vehicle_id: Option<u16>,
    waypoints: Vec<Waypoint>,
    last_timestamp: Option<f64>,
}

impl Default for MissionAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl MissionAssembler {
    pub fn new() -> Self {
        Self {
            phase: MissionPhase::Idle,
            bound_vehicle_id: None,
            waypoints: Vec::new(),
            last_timestamp: None,
        }
    }

    pub fn phase(&self) -> MissionPhase {
        self.phase
    }

    /// Sets the vehicle id that `WAYPOINT`/`END` sender ids are checked
    /// against.
    pub fn bind_vehicle(&mut self, vehicle_id: u16) {
        self.bound_vehicle_id = Some(vehicle_id);
    }

    fn read_header(payload: &[u8], expected_subphase: u8) -> Option<u16> {
        if payload.len() < HEADER_LEN || payload[HEADER_LEN - 1] != expected_subphase {
            return None;
        }
        Some(u16::from_le_bytes([payload[0], payload[1]]))
    }

    /// Begins a new upload of `plan_type`, clearing any previous list.
    ///
    /// Returns the frame's sender id (for the caller to ack) if the
    /// payload is well formed, or `None` if malformed.
    pub fn start(&mut self, plan_type: PlanType, payload: &[u8]) -> Option<u16> {
        if payload.len() != MISSION_CONTROL_PAYLOAD_LEN {
            log_warn("malformed mission START payload, ignoring");
            return None;
        }
        let sender_id = Self::read_header(payload, SUBPHASE_START)?;
        self.phase = MissionPhase::Receiving { plan_type };
        self.waypoints.clear();
        self.last_timestamp = None;
        log_debug(&format!("mission upload started: type={plan_type:?} sender={sender_id}"));
        Some(sender_id)
    }

    /// Appends one waypoint if the frame's sender id matches the bound
    /// vehicle id and its timestamp is strictly greater than the last
    /// accepted waypoint's. Returns the sender id (for acking) on
    /// acceptance, or `None` on any rejection — wrong phase, sender
    /// mismatch, or non-monotonic timestamp, none of which ack. A sender
    /// mismatch additionally publishes an `IipsEvent::Message` on
    /// `observers`, per the human-visible-warning requirement for that case.
    pub fn waypoint(&mut self, payload: &[u8], observers: &ObserverRegistry) -> Option<u16> {
        let MissionPhase::Receiving { .. } = self.phase else {
            log_warn("WAYPOINT received with no upload in progress, ignoring");
            return None;
        };
        if payload.len() != MISSION_WAYPOINT_PAYLOAD_LEN {
            log_warn("malformed mission WAYPOINT payload, ignoring");
            return None;
        }
        let sender_id = Self::read_header(payload, SUBPHASE_WAYPOINT)?;

        if Some(sender_id) != self.bound_vehicle_id {
            let message = format!(
                "WAYPOINT sender {sender_id} does not match bound vehicle {:?}, rejecting",
                self.bound_vehicle_id
            );
            log_warn(&message);
            observers.publish(IipsEvent::Message(message));
            return None;
        }

        let lat_rad = f64::from_le_bytes(payload[HEADER_LEN..HEADER_LEN + 8].try_into().unwrap());
        let lon_rad = f64::from_le_bytes(payload[HEADER_LEN + 8..HEADER_LEN + 16].try_into().unwrap());
        let alt_m = f32::from_le_bytes(payload[HEADER_LEN + 16..HEADER_LEN + 20].try_into().unwrap());
        let timestamp = f64::from_le_bytes(payload[2..10].try_into().unwrap());

        if let Some(last) = self.last_timestamp {
            if timestamp <= last {
                log_warn(&format!(
                    "non-monotonic waypoint timestamp {timestamp} <= {last}, dropping"
                ));
                return None;
            }
        }

        self.waypoints.push(Waypoint {
            latitude_deg: lat_rad.to_degrees(),
            longitude_deg: lon_rad.to_degrees(),
            altitude_m: alt_m as f64,
            timestamp,
        });
        self.last_timestamp = Some(timestamp);
        Some(sender_id)
    }

    /// Finishes the upload in progress, handing its waypoints to `emitter`.
    ///
    /// `REGION`/`SURVEY` uploads require at least [`MIN_SURVEY_WAYPOINTS`]
    /// waypoints; a short upload fails locally (no ack, no emission) and
    /// leaves the phase and list as they were, so a client that resends
    /// more `WAYPOINT` frames can still complete the same upload.
    pub async fn end(
        &mut self,
        payload: &[u8],
        emitter: &dyn PlanEmitter,
    ) -> Result<Option<u16>, IipsError> {
        let MissionPhase::Receiving { plan_type } = self.phase else {
            log_warn("END received with no upload in progress, ignoring");
            return Ok(None);
        };
        if payload.len() != MISSION_CONTROL_PAYLOAD_LEN {
            log_warn("malformed mission END payload, ignoring");
            return Ok(None);
        }
        let Some(sender_id) = Self::read_header(payload, SUBPHASE_END) else {
            log_warn("malformed mission END payload, ignoring");
            return Ok(None);
        };

        if plan_type.requires_minimum_waypoints() && self.waypoints.len() < MIN_SURVEY_WAYPOINTS {
            let err = IipsError::InsufficientWaypoints(self.waypoints.len(), MIN_SURVEY_WAYPOINTS);
            log_warn(&format!("mission upload END rejected: {err}"));
            return Ok(None);
        }

        emitter.emit(plan_type, &self.waypoints).await?;
        self.phase = MissionPhase::Idle;
        self.waypoints.clear();
        self.last_timestamp = None;
        Ok(Some(sender_id))
    }
}
