use serde::{Deserialize, Serialize};

/// Highest zoom the index can encode in a cluster id.
pub const MAX_SUPPORTED_ZOOM: u8 = 30;

/// Indexing parameters.
///
/// A process-wide constant: validate once at startup with
/// [`ClusterConfig::validate`]; an invalid configuration is a programming
/// error, not a runtime condition.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClusterConfig {
    /// Merge distance in pixels at `extent` resolution.
    pub radius: f64,
    pub min_zoom: u8,
    pub max_zoom: u8,
    /// Smallest group that forms a cluster.
    pub min_points: u32,
    /// Internal tile resolution the radius is expressed in.
    pub extent: f64,
    /// Leaf size of the per-zoom kd-trees.
    pub node_size: usize,
    pub tile_size: f64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            radius: 40.0,
            min_zoom: 1,
            max_zoom: 20,
            min_points: 2,
            extent: 512.0,
            node_size: 64,
            tile_size: 256.0,
        }
    }
}

impl ClusterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(ConfigError::NonPositiveRadius(self.radius));
        }
        if !(self.extent.is_finite() && self.extent > 0.0) {
            return Err(ConfigError::NonPositiveExtent(self.extent));
        }
        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            return Err(ConfigError::NonPositiveTileSize(self.tile_size));
        }
        if self.max_zoom < self.min_zoom {
            return Err(ConfigError::ZoomRangeInverted {
                min: self.min_zoom,
                max: self.max_zoom,
            });
        }
        if self.max_zoom > MAX_SUPPORTED_ZOOM {
            return Err(ConfigError::MaxZoomTooLarge(self.max_zoom));
        }
        if self.min_points < 2 {
            return Err(ConfigError::TooFewMinPoints(self.min_points));
        }
        if self.node_size == 0 {
            return Err(ConfigError::ZeroNodeSize);
        }
        Ok(())
    }

    /// Clustering radius in normalized world units at `zoom`.
    pub fn world_radius(&self, zoom: u8) -> f64 {
        self.radius / (self.extent * 2f64.powi(zoom as i32))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NonPositiveRadius(f64),
    NonPositiveExtent(f64),
    NonPositiveTileSize(f64),
    ZoomRangeInverted { min: u8, max: u8 },
    MaxZoomTooLarge(u8),
    TooFewMinPoints(u32),
    ZeroNodeSize,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NonPositiveRadius(v) => write!(f, "radius must be > 0 (got {v})"),
            ConfigError::NonPositiveExtent(v) => write!(f, "extent must be > 0 (got {v})"),
            ConfigError::NonPositiveTileSize(v) => write!(f, "tileSize must be > 0 (got {v})"),
            ConfigError::ZoomRangeInverted { min, max } => {
                write!(f, "maxZoom must be >= minZoom (min={min} max={max})")
            }
            ConfigError::MaxZoomTooLarge(z) => {
                write!(f, "maxZoom must be <= {MAX_SUPPORTED_ZOOM} (got {z})")
            }
            ConfigError::TooFewMinPoints(n) => write!(f, "minPoints must be >= 2 (got {n})"),
            ConfigError::ZeroNodeSize => write!(f, "nodeSize must be > 0"),
        }
    }
}

impl std::error::Error for ConfigError {}
