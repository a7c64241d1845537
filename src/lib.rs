//! # iips-protocol-core — IIPS ground-link framing and mission reassembly
//!
//! This crate implements the wire-level core of the IIPS ground-link
//! protocol: three frame codecs (length-delimited binary, delimited ASCII,
//! and fixed-width SBUS), a resynchronizing receive buffer, a UDP
//! transport, mission upload reassembly into QGroundControl `.plan` files,
//! connection-liveness tracking and telemetry status encoding.
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! iips-protocol-core = "0.1.0"
//! ```
//!
//! ```rust,no_run
//! use iips_protocol_core::{init_logger, log_info, config::{ConfigStore, JsonFileConfigStore}, reactor::Reactor, mission::plan::JsonPlanEmitter};
//!
//! # async fn run() -> Result<(), iips_protocol_core::error::IipsError> {
//! init_logger();
//! let store = JsonFileConfigStore::new("iips.json");
//! let config = store.load()?;
//! let mut reactor = Reactor::new(&config, Box::new(JsonPlanEmitter::new("./missions"))).await;
//! log_info("reactor ready");
//! reactor.poll_once().await?;
//! # Ok(())
//! # }
//! ```

pub mod buffer;
pub mod codec;
pub mod config;
pub mod connection;
pub mod constants;
pub mod error;
pub mod logging;
pub mod mission;
pub mod observer;
pub mod reactor;
pub mod status;
pub mod transport;

pub use crate::error::IipsError;
pub use crate::logging::{init_logger, log_debug, log_error, log_info, log_warn};

pub use codec::{AsciiFrame, BinaryFrame, SbusFrame};
pub use config::{ConfigStore, IipsConfig, JsonFileConfigStore};
pub use connection::{ConnectionMonitor, ConnectionState};
pub use mission::{MissionAssembler, MissionPhase, PlanEmitter, PlanType, Waypoint};
pub use observer::{IipsEvent, Observer, ObserverRegistry};
pub use reactor::Reactor;
pub use status::StatusRecord;
pub use transport::UdpEndpoint;
