//! Region stability guard.
//!
//! Map widgets echo back the region they were asked to animate to, slightly
//! perturbed. Comparing regions with a tolerance keeps that echo from
//! starting another update cycle, and clamping keeps the zoom derived from a
//! region finite.

use foundation::math::MAX_LATITUDE;
use serde::{Deserialize, Serialize};

use crate::viewport::Viewport;

pub const DEFAULT_EPSILON: f64 = 1e-6;
pub const DEFAULT_MIN_DELTA: f64 = 5e-4;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GuardConfig {
    /// Degrees under which two region fields count as equal.
    pub epsilon: f64,
    /// Smallest allowed latitude/longitude span, in degrees.
    pub min_delta: f64,
    pub max_latitude: f64,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            min_delta: DEFAULT_MIN_DELTA,
            max_latitude: MAX_LATITUDE,
        }
    }
}

impl GuardConfig {
    pub fn is_same_region(&self, a: &Viewport, b: &Viewport) -> bool {
        is_same_region(a, b, self.epsilon)
    }

    pub fn clamp(&self, viewport: &Viewport) -> Viewport {
        clamp_region_deltas(viewport, self.min_delta, self.max_latitude)
    }
}

/// True iff center and spans all differ by less than `epsilon`.
///
/// Pixel size is not compared.
pub fn is_same_region(a: &Viewport, b: &Viewport, epsilon: f64) -> bool {
    (a.latitude - b.latitude).abs() < epsilon
        && (a.longitude - b.longitude).abs() < epsilon
        && (a.latitude_delta - b.latitude_delta).abs() < epsilon
        && (a.longitude_delta - b.longitude_delta).abs() < epsilon
}

/// Raise both spans to at least `min_delta` and clamp the center latitude to
/// `[-max_latitude, max_latitude]`.
pub fn clamp_region_deltas(viewport: &Viewport, min_delta: f64, max_latitude: f64) -> Viewport {
    Viewport {
        latitude: viewport.latitude.clamp(-max_latitude, max_latitude),
        latitude_delta: viewport.latitude_delta.max(min_delta),
        longitude_delta: viewport.longitude_delta.max(min_delta),
        ..*viewport
    }
}

#[cfg(test)]
mod tests {
    use super::{GuardConfig, clamp_region_deltas, is_same_region};
    use crate::viewport::Viewport;
    use foundation::math::DEFAULT_TILE_SIZE_PX;

    fn base() -> Viewport {
        Viewport::new(31.7767, 35.2345, 0.05, 0.03, 1080.0, 2340.0)
    }

    fn nudged(v: Viewport, by: f64) -> [Viewport; 4] {
        [
            Viewport {
                latitude: v.latitude + by,
                ..v
            },
            Viewport {
                longitude: v.longitude + by,
                ..v
            },
            Viewport {
                latitude_delta: v.latitude_delta + by,
                ..v
            },
            Viewport {
                longitude_delta: v.longitude_delta + by,
                ..v
            },
        ]
    }

    #[test]
    fn same_region_is_reflexive() {
        let g = GuardConfig::default();
        assert!(g.is_same_region(&base(), &base()));
    }

    #[test]
    fn same_region_tolerates_animation_echo() {
        let g = GuardConfig::default();
        for v in nudged(base(), 1e-7) {
            assert!(g.is_same_region(&base(), &v));
            assert!(g.is_same_region(&v, &base()));
        }
    }

    #[test]
    fn same_region_detects_real_moves() {
        let g = GuardConfig::default();
        for v in nudged(base(), 1e-3) {
            assert!(!g.is_same_region(&base(), &v));
            assert!(!g.is_same_region(&v, &base()));
        }
    }

    #[test]
    fn pixel_size_is_not_part_of_the_region() {
        let resized = Viewport {
            width_px: 2560.0,
            ..base()
        };
        assert!(is_same_region(&base(), &resized, 1e-6));
    }

    #[test]
    fn tiny_spans_are_raised_to_min_delta() {
        let v = Viewport {
            latitude_delta: 1e-7,
            longitude_delta: 0.0,
            ..base()
        };
        let c = clamp_region_deltas(&v, 5e-4, 85.0);
        assert!(c.latitude_delta >= 5e-4);
        assert!(c.longitude_delta >= 5e-4);
        assert!(c.zoom(DEFAULT_TILE_SIZE_PX).is_finite());
    }

    #[test]
    fn polar_centers_are_clamped() {
        let g = GuardConfig::default();
        let north = g.clamp(&Viewport {
            latitude: 90.0,
            ..base()
        });
        assert_eq!(north.latitude, 85.0);
        let south = g.clamp(&Viewport {
            latitude: -90.0,
            ..base()
        });
        assert_eq!(south.latitude, -85.0);
    }

    #[test]
    fn in_range_regions_pass_through() {
        let g = GuardConfig::default();
        assert_eq!(g.clamp(&base()), base());
    }
}
