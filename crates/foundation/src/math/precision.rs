//! Float keys for sorting and de-duplication.

use core::cmp::Ordering;

/// Decimal places kept by [`CoordKey`] (1e-6 degrees, roughly 11 cm).
pub const COORD_KEY_SCALE: f64 = 1e6;

/// `-0.0` folds to `0.0` and every NaN to one NaN.
pub fn canonical_f64(v: f64) -> f64 {
    match v {
        _ if v == 0.0 => 0.0,
        _ if v.is_nan() => f64::NAN,
        _ => v,
    }
}

/// Total order over canonicalized floats. Use it for every float sort so
/// that equal inputs always sort the same way.
pub fn stable_total_cmp_f64(a: f64, b: f64) -> Ordering {
    canonical_f64(a).total_cmp(&canonical_f64(b))
}

/// A lat/lon pair rounded to [`COORD_KEY_SCALE`].
///
/// Longitudes `180` and `-180` name the same meridian and share a key.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CoordKey {
    pub lat_q: i64,
    pub lon_q: i64,
}

impl CoordKey {
    pub fn new(lat: f64, lon: f64) -> Self {
        let half_turn = quantize(180.0, COORD_KEY_SCALE);
        let lon_q = match quantize(lon, COORD_KEY_SCALE) {
            q if q == half_turn => -half_turn,
            q => q,
        };
        Self {
            lat_q: quantize(lat, COORD_KEY_SCALE),
            lon_q,
        }
    }
}

/// `v * scale` rounded to the nearest integer.
pub fn quantize(v: f64, scale: f64) -> i64 {
    (canonical_f64(v) * scale).round() as i64
}

#[cfg(test)]
mod tests {
    use super::{CoordKey, canonical_f64, quantize, stable_total_cmp_f64};
    use core::cmp::Ordering;

    #[test]
    fn negative_zero_and_nan_are_folded() {
        assert_eq!(canonical_f64(-0.0).to_bits(), 0.0f64.to_bits());
        assert!(canonical_f64(-f64::NAN).is_nan());
        assert_eq!(stable_total_cmp_f64(-0.0, 0.0), Ordering::Equal);
        assert_eq!(stable_total_cmp_f64(f64::NAN, -f64::NAN), Ordering::Equal);
        assert_eq!(stable_total_cmp_f64(1.0, 2.0), Ordering::Less);
    }

    #[test]
    fn coord_keys_absorb_sub_precision_noise() {
        assert_eq!(CoordKey::new(40.7484, -73.9857), CoordKey::new(40.748_400_000_1, -73.985_7));
        assert_ne!(CoordKey::new(40.7484, -73.9857), CoordKey::new(40.7485, -73.9857));
    }

    #[test]
    fn antimeridian_longitudes_share_a_key() {
        assert_eq!(CoordKey::new(0.0, 180.0), CoordKey::new(0.0, -180.0));
        assert_eq!(CoordKey::new(-0.0, 10.0), CoordKey::new(0.0, 10.0));
    }

    #[test]
    fn quantize_rounds_to_nearest() {
        assert_eq!(quantize(1.234_567_4, 1e6), 1_234_567);
        assert_eq!(quantize(1.234_567_6, 1e6), 1_234_568);
    }
}
