//! Conversions between degree spans and continuous tile zoom.
//!
//! Zoom follows slippy-map tiling: at zoom 0 the whole world (360 degrees of
//! longitude) fits in one tile of `tile_size_px` pixels.

use super::mercator::clamp_latitude;

pub const DEFAULT_TILE_SIZE_PX: f64 = 256.0;

/// Degree spans of a viewport.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RegionDeltas {
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

/// Continuous tile zoom for a viewport that spans `longitude_delta` degrees
/// across `width_px` pixels.
///
/// Precondition: `longitude_delta > 0`. Callers clamp degenerate deltas first.
pub fn zoom_from_longitude_delta(longitude_delta: f64, width_px: f64, tile_size_px: f64) -> f64 {
    let world_tiles = width_px / tile_size_px;
    (360.0 * world_tiles / longitude_delta).log2()
}

/// Inverse of [`zoom_from_longitude_delta`].
///
/// The latitude span follows the viewport aspect ratio and is stretched by
/// `1 / cos(latitude)` for Mercator distortion. `latitude` is clamped to the
/// practical Mercator bound so the result stays finite.
pub fn deltas_from_zoom(
    zoom: f64,
    latitude: f64,
    width_px: f64,
    height_px: f64,
    tile_size_px: f64,
) -> RegionDeltas {
    let world_tiles = width_px / tile_size_px;
    let longitude_delta = 360.0 * world_tiles / 2f64.powf(zoom);
    let aspect = height_px / width_px;
    let cos_lat = clamp_latitude(latitude).to_radians().cos();
    RegionDeltas {
        latitude_delta: longitude_delta * aspect / cos_lat,
        longitude_delta,
    }
}

/// Round a continuous zoom and clamp it into `[min_zoom, max_zoom]`.
///
/// Non-finite input maps to `min_zoom`.
pub fn integer_zoom(zoom: f64, min_zoom: u8, max_zoom: u8) -> u8 {
    if !zoom.is_finite() {
        return min_zoom;
    }
    zoom.round().clamp(min_zoom as f64, max_zoom as f64) as u8
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_TILE_SIZE_PX, deltas_from_zoom, integer_zoom, zoom_from_longitude_delta};

    const T: f64 = DEFAULT_TILE_SIZE_PX;

    fn rel_err(a: f64, b: f64) -> f64 {
        ((a - b) / b).abs()
    }

    #[test]
    fn whole_world_in_one_tile_is_zoom_zero() {
        assert_eq!(zoom_from_longitude_delta(360.0, 256.0, T), 0.0);
        assert_eq!(zoom_from_longitude_delta(180.0, 256.0, T), 1.0);
    }

    #[test]
    fn smaller_span_means_larger_zoom() {
        let mut last = f64::NEG_INFINITY;
        for delta in [90.0, 10.0, 1.0, 0.1, 0.01, 0.001] {
            let z = zoom_from_longitude_delta(delta, 1080.0, T);
            assert!(z > last, "zoom must grow: {z} after {last}");
            last = z;
        }
    }

    #[test]
    fn continuous_round_trip_is_exact() {
        for (lat, w, h) in [
            (0.0, 1080.0, 2340.0),
            (64.1355, 1080.0, 2340.0),
            (-54.8019, 1080.0, 2340.0),
            (0.0, 2560.0, 1080.0),
            (0.0, 1080.0, 2560.0),
        ] {
            let z = zoom_from_longitude_delta(0.1, w, T);
            let d = deltas_from_zoom(z, lat, w, h, T);
            assert!(rel_err(d.longitude_delta, 0.1) < 1e-9);
        }
    }

    #[test]
    fn rounded_round_trip_stays_within_tolerance() {
        for (lat, w, h) in [
            (64.1355, 1080.0, 2340.0),
            (-54.8019, 1080.0, 2340.0),
            (0.0, 2560.0, 1080.0),
            (0.0, 1080.0, 2560.0),
        ] {
            let z = zoom_from_longitude_delta(0.1, w, T).round();
            let d = deltas_from_zoom(z, lat, w, h, T);
            assert!(rel_err(d.longitude_delta, 0.1) < 0.2, "lat={lat} w={w} h={h}");
            assert!(d.latitude_delta > 0.0 && d.longitude_delta > 0.0);
        }
    }

    #[test]
    fn latitude_span_is_stretched_away_from_equator() {
        let z = zoom_from_longitude_delta(0.1, 1080.0, T);
        let equator = deltas_from_zoom(z, 0.0, 1080.0, 2340.0, T);
        let north = deltas_from_zoom(z, 64.1355, 1080.0, 2340.0, T);
        assert!(north.latitude_delta > equator.latitude_delta);
        assert!(north.latitude_delta > north.longitude_delta);
    }

    #[test]
    fn aspect_ratio_drives_latitude_span() {
        let wide = deltas_from_zoom(10.0, 0.0, 2560.0, 1080.0, T);
        let tall = deltas_from_zoom(10.0, 0.0, 1080.0, 2560.0, T);
        assert!(wide.longitude_delta > wide.latitude_delta);
        assert!(tall.latitude_delta > tall.longitude_delta);
    }

    #[test]
    fn pole_latitude_stays_finite() {
        let d = deltas_from_zoom(5.0, 90.0, 1080.0, 2340.0, T);
        assert!(d.latitude_delta.is_finite());
    }

    #[test]
    fn integer_zoom_rounds_and_clamps() {
        assert_eq!(integer_zoom(13.49, 1, 20), 13);
        assert_eq!(integer_zoom(13.5, 1, 20), 14);
        assert_eq!(integer_zoom(-3.0, 1, 20), 1);
        assert_eq!(integer_zoom(42.0, 1, 20), 20);
        assert_eq!(integer_zoom(f64::NAN, 1, 20), 1);
    }
}
