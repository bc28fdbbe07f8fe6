//! Normalized Web-Mercator projection.
//!
//! World coordinates are in `[0, 1]` on both axes: `x` grows eastwards from
//! the antimeridian, `y` grows southwards from the top of the tile pyramid.

use std::f64::consts::PI;

/// Practical latitude bound used for viewports and zoom math (degrees).
pub const MAX_LATITUDE: f64 = 85.0;

/// Latitude at which the Web-Mercator square ends (degrees).
pub const MERCATOR_MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Clamp a latitude into `[-MAX_LATITUDE, MAX_LATITUDE]`.
///
/// Out-of-range values are clamped, never rejected.
pub fn clamp_latitude(lat: f64) -> f64 {
    lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
}

pub fn lng_x(lng: f64) -> f64 {
    lng / 360.0 + 0.5
}

pub fn lat_y(lat: f64) -> f64 {
    let sin = lat.to_radians().sin();
    let y = 0.5 - 0.25 * ((1.0 + sin) / (1.0 - sin)).ln() / PI;
    y.clamp(0.0, 1.0)
}

pub fn x_lng(x: f64) -> f64 {
    (x - 0.5) * 360.0
}

pub fn y_lat(y: f64) -> f64 {
    let y2 = (180.0 - y * 360.0).to_radians();
    360.0 * y2.exp().atan() / PI - 90.0
}

/// Wrap a world `x` into `[0, 1)`.
pub fn wrap_x(x: f64) -> f64 {
    x.rem_euclid(1.0)
}
