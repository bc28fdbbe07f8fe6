use foundation::bounds::{GeoBounds, wrap_longitude};
use foundation::math::{deltas_from_zoom, zoom_from_longitude_delta};
use serde::{Deserialize, Serialize};

/// The visible map region: a center, degree spans, and the pixel size of the
/// surface showing it.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
    pub width_px: f64,
    pub height_px: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewportError {
    NonFinite { field: &'static str, value: f64 },
    NonPositiveSize { field: &'static str, value: f64 },
}

impl std::fmt::Display for ViewportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewportError::NonFinite { field, value } => {
                write!(f, "viewport {field} is not finite ({value})")
            }
            ViewportError::NonPositiveSize { field, value } => {
                write!(f, "viewport {field} must be positive, got {value}")
            }
        }
    }
}

impl std::error::Error for ViewportError {}

impl Viewport {
    pub fn new(
        latitude: f64,
        longitude: f64,
        latitude_delta: f64,
        longitude_delta: f64,
        width_px: f64,
        height_px: f64,
    ) -> Self {
        Self {
            latitude,
            longitude,
            latitude_delta,
            longitude_delta,
            width_px,
            height_px,
        }
    }

    /// A viewport centered at `(latitude, longitude)` showing continuous
    /// `zoom` on a `width_px` x `height_px` surface.
    pub fn from_zoom(
        latitude: f64,
        longitude: f64,
        zoom: f64,
        width_px: f64,
        height_px: f64,
        tile_size_px: f64,
    ) -> Self {
        let d = deltas_from_zoom(zoom, latitude, width_px, height_px, tile_size_px);
        Self::new(
            latitude,
            longitude,
            d.latitude_delta,
            d.longitude_delta,
            width_px,
            height_px,
        )
    }

    /// Reject non-finite fields and empty surfaces.
    ///
    /// Degenerate but finite deltas are accepted here; the region guard
    /// clamps them before any zoom is derived.
    pub fn validate(&self) -> Result<(), ViewportError> {
        let fields = [
            ("latitude", self.latitude),
            ("longitude", self.longitude),
            ("latitudeDelta", self.latitude_delta),
            ("longitudeDelta", self.longitude_delta),
            ("widthPx", self.width_px),
            ("heightPx", self.height_px),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ViewportError::NonFinite { field, value });
            }
        }
        for (field, value) in [("widthPx", self.width_px), ("heightPx", self.height_px)] {
            if value <= 0.0 {
                return Err(ViewportError::NonPositiveSize { field, value });
            }
        }
        Ok(())
    }

    /// Continuous tile zoom. Requires a clamped, positive `longitude_delta`.
    pub fn zoom(&self, tile_size_px: f64) -> f64 {
        zoom_from_longitude_delta(self.longitude_delta, self.width_px, tile_size_px)
    }

    /// Visible bounds. Longitudes are wrapped into `[-180, 180]`, so a region
    /// over the antimeridian comes back with `east < west`.
    pub fn bounds(&self) -> GeoBounds {
        let half_lat = self.latitude_delta / 2.0;
        let south = (self.latitude - half_lat).max(-90.0);
        let north = (self.latitude + half_lat).min(90.0);
        if self.longitude_delta >= 360.0 {
            return GeoBounds::new(-180.0, south, 180.0, north);
        }
        let half_lon = self.longitude_delta / 2.0;
        GeoBounds::new(
            wrap_longitude(self.longitude - half_lon),
            south,
            wrap_longitude(self.longitude + half_lon),
            north,
        )
    }

    pub fn crosses_antimeridian(&self) -> bool {
        self.bounds().crosses_antimeridian()
    }

    /// Same spans and surface, new center.
    pub fn centered_on(&self, latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude: wrap_longitude(longitude),
            ..*self
        }
    }

    /// Both spans multiplied by `factor`, center kept.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            latitude_delta: self.latitude_delta * factor,
            longitude_delta: self.longitude_delta * factor,
            ..*self
        }
    }
}
