//! Mission upload reassembly and plan emission.

pub mod assembler;
pub mod plan;

pub use assembler::{MissionAssembler, MissionPhase};
pub use plan::{PlanEmitter, PlanType, Waypoint};
