use std::path::Path;

use cluster::{ClusterConfig, ConfigError};
use serde::{Deserialize, Serialize};

use crate::expansion::ExpansionPolicy;
use crate::guard::GuardConfig;

pub const DEFAULT_DEBOUNCE_MS: u64 = 120;

/// Every tunable of the map pipeline, loadable from a JSON settings file.
///
/// Missing keys take their defaults, so `{}` is a valid file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapSettings {
    pub cluster: ClusterConfig,
    pub guard: GuardConfig,
    pub expansion: ExpansionPolicy,
    /// Quiet period before a region change triggers a query.
    pub debounce_ms: u64,
    /// Enables telemetry sampling and per-frame debug logs.
    pub diagnostics: bool,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            cluster: ClusterConfig::default(),
            guard: GuardConfig::default(),
            expansion: ExpansionPolicy::default(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            diagnostics: false,
        }
    }
}

#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Cluster(ConfigError),
    InvalidEpsilon(f64),
    InvalidMinDelta(f64),
    InvalidMaxLatitude(f64),
    InvalidNudge(f64),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "settings io error: {e}"),
            SettingsError::Parse(e) => write!(f, "settings parse error: {e}"),
            SettingsError::Cluster(e) => write!(f, "invalid cluster config: {e}"),
            SettingsError::InvalidEpsilon(v) => {
                write!(f, "guard epsilon must be positive, got {v}")
            }
            SettingsError::InvalidMinDelta(v) => {
                write!(f, "guard minDelta must be positive, got {v}")
            }
            SettingsError::InvalidMaxLatitude(v) => {
                write!(f, "guard maxLatitude must be in (0, 90], got {v}")
            }
            SettingsError::InvalidNudge(v) => {
                write!(f, "largeClusterNudge must be finite and >= 0, got {v}")
            }
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(e) => Some(e),
            SettingsError::Parse(e) => Some(e),
            SettingsError::Cluster(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::Io(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Parse(e)
    }
}

impl From<ConfigError> for SettingsError {
    fn from(e: ConfigError) -> Self {
        SettingsError::Cluster(e)
    }
}

impl MapSettings {
    /// Parse and validate.
    pub fn from_json_str(s: &str) -> Result<Self, SettingsError> {
        let settings: MapSettings = serde_json::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.cluster.validate()?;

        let g = &self.guard;
        if !(g.epsilon.is_finite() && g.epsilon > 0.0) {
            return Err(SettingsError::InvalidEpsilon(g.epsilon));
        }
        if !(g.min_delta.is_finite() && g.min_delta > 0.0) {
            return Err(SettingsError::InvalidMinDelta(g.min_delta));
        }
        if !(g.max_latitude > 0.0 && g.max_latitude <= 90.0) {
            return Err(SettingsError::InvalidMaxLatitude(g.max_latitude));
        }

        let nudge = self.expansion.large_cluster_nudge;
        if !(nudge.is_finite() && nudge >= 0.0) {
            return Err(SettingsError::InvalidNudge(nudge));
        }
        Ok(())
    }

    pub fn debounce_seconds(&self) -> f64 {
        self.debounce_ms as f64 / 1000.0
    }
}
