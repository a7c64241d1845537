//! # Configuration
//!
//! Persisted ground-link settings: local bind port, peer address/port and
//! watchdog timeout. Grounded in `IIPSComm`'s `QSettings`-backed
//! constructor, which reads each key if present and writes back the
//! compiled-in default the first time it's missing — reproduced here with
//! a [`ConfigStore`] trait plus a JSON-file reference implementation
//! (`serde`/`serde_json`, already part of this workspace's stack) in place
//! of `QSettings`.

use crate::constants::{
    DEFAULT_BOUND_VEHICLE_ID, DEFAULT_IIPS_IP, DEFAULT_IIPS_PORT, DEFAULT_QGC_PORT,
    DEFAULT_WATCHDOG_TIMEOUT_SECS,
};
use crate::error::IipsError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ground-link runtime configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IipsConfig {
    pub local_port: u16,
    pub peer_ip: String,
    pub peer_port: u16,
    pub watchdog_timeout_secs: u64,
    /// Vehicle id mission WAYPOINT/END sender ids are checked against.
    pub bound_vehicle_id: u16,
}

impl Default for IipsConfig {
    fn default() -> Self {
        Self {
            local_port: DEFAULT_QGC_PORT,
            peer_ip: DEFAULT_IIPS_IP.to_string(),
            peer_port: DEFAULT_IIPS_PORT,
            watchdog_timeout_secs: DEFAULT_WATCHDOG_TIMEOUT_SECS,
            bound_vehicle_id: DEFAULT_BOUND_VEHICLE_ID,
        }
    }
}

/// Loads and persists an [`IipsConfig`].
pub trait ConfigStore {
    fn load(&self) -> Result<IipsConfig, IipsError>;
    fn save(&self, config: &IipsConfig) -> Result<(), IipsError>;
}

/// JSON-file-backed [`ConfigStore`].
///
/// `load` returns [`IipsConfig::default`] and writes it out immediately if
/// the file doesn't exist yet, matching the original's missing-key
/// writeback behavior one level up (whole-file rather than per-key, since
/// `serde_json` has no notion of partial defaults).
pub struct JsonFileConfigStore {
    path: PathBuf,
}

impl JsonFileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigStore for JsonFileConfigStore {
    fn load(&self) -> Result<IipsConfig, IipsError> {
        if !self.path.exists() {
            let config = IipsConfig::default();
            self.save(&config)?;
            return Ok(config);
        }
        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| IipsError::Config(format!("reading {}: {e}", self.path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| IipsError::Config(format!("parsing {}: {e}", self.path.display())))
    }

    fn save(&self, config: &IipsConfig) -> Result<(), IipsError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| IipsError::Config(format!("creating {}: {e}", parent.display())))?;
        }
        let rendered = serde_json::to_string_pretty(config)
            .map_err(|e| IipsError::Config(e.to_string()))?;
        std::fs::write(&self.path, rendered)
            .map_err(|e| IipsError::Config(format!("writing {}: {e}", self.path.display())))
    }
}
