//! # Plan Emission
//!
//! Converts a completed mission upload into a QGroundControl `.plan` file.
//! The wire format only ever carries one of four upload kinds, mirrored
//! here as [`PlanType`]; [`PlanEmitter`] is the external boundary the
//! reactor calls through so the JSON-writing concern stays swappable (the
//! spec calls plan storage a collaborator outside this crate's core, so a
//! trait plus one reference implementation is all that lives here).

use crate::constants::{PACKET_ID_FOLLOW, PACKET_ID_LINE, PACKET_ID_REGION, PACKET_ID_SURVEY};
use crate::error::IipsError;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Mutex;

/// The kind of mission upload in progress, taken from the packet id that
/// opened it with a `SUBPHASE_START` frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanType {
    Line,
    Region,
    Survey,
    Follow,
}

impl PlanType {
    /// Maps the packet id that opened the upload to a [`PlanType`].
    ///
    /// Returns `None` for ids that never open a mission upload (heartbeat,
    /// standby, status, ack).
    pub fn from_packet_id(id: u8) -> Option<Self> {
        match id {
            PACKET_ID_LINE => Some(PlanType::Line),
            PACKET_ID_REGION => Some(PlanType::Region),
            PACKET_ID_SURVEY => Some(PlanType::Survey),
            PACKET_ID_FOLLOW => Some(PlanType::Follow),
            _ => None,
        }
    }

    /// Whether this upload kind requires at least
    /// [`crate::constants::MIN_SURVEY_WAYPOINTS`] waypoints before its END
    /// is accepted.
    pub fn requires_minimum_waypoints(self) -> bool {
        matches!(self, PlanType::Region | PlanType::Survey)
    }
}

/// One reassembled waypoint, already converted from radians to degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f64,
    pub timestamp: f64,
}

/// External boundary for turning a completed upload into a persisted plan.
///
/// Kept as a narrow async trait so the reactor never depends on
/// `serde_json` or the filesystem directly — only on "can this upload be
/// turned into a plan".
#[async_trait]
pub trait PlanEmitter: Send + Sync {
    async fn emit(&self, plan_type: PlanType, waypoints: &[Waypoint]) -> Result<PathBuf, IipsError>;
}

/// Test double recording every call it receives; emits no files.
#[derive(Default)]
pub struct StubPlanEmitter {
    pub calls: Mutex<Vec<(PlanType, Vec<Waypoint>)>>,
}

impl StubPlanEmitter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlanEmitter for StubPlanEmitter {
    async fn emit(&self, plan_type: PlanType, waypoints: &[Waypoint]) -> Result<PathBuf, IipsError> {
        self.calls
            .lock()
            .unwrap()
            .push((plan_type, waypoints.to_vec()));
        Ok(PathBuf::from("stub.plan"))
    }
}

/// Writes a QGroundControl `.plan` JSON file into `directory`.
///
/// `LINE` uploads become a sequence of `SimpleItem` waypoints; `REGION`/
/// `SURVEY` become a single `ComplexItem` survey polygon built from the
/// waypoints after the first (which serves as home). `FOLLOW` is not a
/// persisted plan kind and returns [`IipsError::PlanEmission`].
pub struct JsonPlanEmitter {
    directory: PathBuf,
}

impl JsonPlanEmitter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self { directory: directory.into() }
    }

    fn simple_item(wp: &Waypoint) -> Value {
        json!({
            "AMSLAltAbove": 0,
            "Altitude": wp.altitude_m,
            "AltitudeMode": 1,
            "autoContinue": true,
            "command": 16,
            "doJumpId": 1,
            "frame": 3,
            "params": [0, 0, 0, 0, wp.latitude_deg, wp.longitude_deg, wp.altitude_m],
            "type": "SimpleItem",
        })
    }

    fn complex_survey_item(polygon: &[Waypoint]) -> Value {
        json!({
            "type": "ComplexItem",
            "complexItemType": "survey",
            "polygon": polygon
                .iter()
                .map(|wp| vec![wp.latitude_deg, wp.longitude_deg])
                .collect::<Vec<_>>(),
        })
    }

    fn build_plan_json(plan_type: PlanType, waypoints: &[Waypoint]) -> Result<Value, IipsError> {
        let home = waypoints
            .first()
            .ok_or_else(|| IipsError::PlanEmission("no waypoints to emit".to_string()))?;

        let items = match plan_type {
            PlanType::Line => waypoints.iter().map(Self::simple_item).collect::<Vec<_>>(),
            PlanType::Region | PlanType::Survey => vec![Self::complex_survey_item(&waypoints[1..])],
            PlanType::Follow => {
                return Err(IipsError::PlanEmission(
                    "FOLLOW uploads are not persisted as a plan".to_string(),
                ))
            }
        };

        Ok(json!({
            "fileType": "Plan",
            "groundStation": "QGroundControl",
            "version": 1,
            "mission": {
                "cruiseSpeed": 15,
                "firmwareType": 12,
                "hoverSpeed": 5,
                "items": items,
                "plannedHomePosition": [home.latitude_deg, home.longitude_deg, home.altitude_m],
                "vehicleType": 2,
                "version": 2,
            },
        }))
    }
}

#[async_trait]
impl PlanEmitter for JsonPlanEmitter {
    async fn emit(&self, plan_type: PlanType, waypoints: &[Waypoint]) -> Result<PathBuf, IipsError> {
        let plan = Self::build_plan_json(plan_type, waypoints)?;
        tokio::fs::create_dir_all(&self.directory).await?;
        let path = self.directory.join("mission.plan");
        let rendered = serde_json::to_string_pretty(&plan)
            .map_err(|e| IipsError::PlanEmission(e.to_string()))?;
        tokio::fs::write(&path, rendered).await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_waypoints() -> Vec<Waypoint> {
        vec![
            Waypoint { latitude_deg: 1.0, longitude_deg: 2.0, altitude_m: 10.0, timestamp: 0.0 },
            Waypoint { latitude_deg: 1.1, longitude_deg: 2.1, altitude_m: 10.0, timestamp: 1.0 },
            Waypoint { latitude_deg: 1.2, longitude_deg: 2.2, altitude_m: 10.0, timestamp: 2.0 },
            Waypoint { latitude_deg: 1.3, longitude_deg: 2.3, altitude_m: 10.0, timestamp: 3.0 },
        ]
    }

    #[test]
    fn from_packet_id_maps_known_ids() {
        assert_eq!(PlanType::from_packet_id(PACKET_ID_LINE), Some(PlanType::Line));
        assert_eq!(PlanType::from_packet_id(PACKET_ID_SURVEY), Some(PlanType::Survey));
        assert_eq!(PlanType::from_packet_id(0), None);
    }

    #[test]
    fn line_plan_emits_simple_items_per_waypoint() {
        let plan = JsonPlanEmitter::build_plan_json(PlanType::Line, &sample_waypoints()).unwrap();
        let items = plan["mission"]["items"].as_array().unwrap();
        assert_eq!(items.len(), 4);
        assert_eq!(items[0]["type"], "SimpleItem");
    }

    #[test]
    fn survey_plan_emits_single_complex_item_with_remaining_polygon() {
        let plan = JsonPlanEmitter::build_plan_json(PlanType::Survey, &sample_waypoints()).unwrap();
        let items = plan["mission"]["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["type"], "ComplexItem");
        assert_eq!(items[0]["polygon"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn follow_plan_is_rejected() {
        assert!(JsonPlanEmitter::build_plan_json(PlanType::Follow, &sample_waypoints()).is_err());
    }

    #[tokio::test]
    async fn stub_emitter_records_calls() {
        let stub = StubPlanEmitter::new();
        let waypoints = sample_waypoints();
        stub.emit(PlanType::Line, &waypoints).await.unwrap();
        assert_eq!(stub.calls.lock().unwrap().len(), 1);
    }
}
