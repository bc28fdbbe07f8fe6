/// Axis-aligned bounding boxes
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb2 {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Aabb2 {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Aabb2 { min, max }
    }

    /// Inclusive on every edge.
    pub fn contains(&self, p: [f64; 2]) -> bool {
        p[0] >= self.min[0] && p[0] <= self.max[0] && p[1] >= self.min[1] && p[1] <= self.max[1]
    }

    pub fn intersects(&self, other: &Aabb2) -> bool {
        !(other.min[0] > self.max[0]
            || other.max[0] < self.min[0]
            || other.min[1] > self.max[1]
            || other.max[1] < self.min[1])
    }
}

/// Geographic bounding box in degrees.
///
/// Convention:
/// - Longitudes are in `[-180, 180]`, latitudes in `[-90, 90]` once normalized.
/// - `east < west` means the box wraps across the antimeridian.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl GeoBounds {
    pub const WORLD: GeoBounds = GeoBounds {
        west: -180.0,
        south: -90.0,
        east: 180.0,
        north: 90.0,
    };

    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.west.is_finite() && self.south.is_finite() && self.east.is_finite() && self.north.is_finite()
    }

    pub fn crosses_antimeridian(&self) -> bool {
        self.east < self.west
    }

    /// Clamp latitudes to `[-90, 90]` and wrap out-of-range longitudes into
    /// `[-180, 180]`. In-range longitudes (including exactly +/-180) are kept.
    pub fn normalized(&self) -> Self {
        let mut south = self.south.clamp(-90.0, 90.0);
        let mut north = self.north.clamp(-90.0, 90.0);
        if south > north {
            std::mem::swap(&mut south, &mut north);
        }
        Self::new(
            wrap_longitude(self.west),
            south,
            wrap_longitude(self.east),
            north,
        )
    }

    /// Split into boxes that do not wrap. A box that crosses the antimeridian
    /// becomes `[west, 180]` plus `[-180, east]`.
    pub fn split_antimeridian(&self) -> (GeoBounds, Option<GeoBounds>) {
        if !self.crosses_antimeridian() {
            return (*self, None);
        }
        (
            GeoBounds::new(self.west, self.south, 180.0, self.north),
            Some(GeoBounds::new(-180.0, self.south, self.east, self.north)),
        )
    }

    /// Wrap-aware containment test.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        if lat < self.south || lat > self.north {
            return false;
        }
        if self.crosses_antimeridian() {
            lon >= self.west || lon <= self.east
        } else {
            lon >= self.west && lon <= self.east
        }
    }
}

/// Wrap a longitude into `[-180, 180]`. Values already in range are returned
/// unchanged so that an explicit `180` edge survives.
pub fn wrap_longitude(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        return lon;
    }
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

#[cfg(test)]
mod tests {
    use super::{Aabb2, GeoBounds, wrap_longitude};

    #[test]
    fn aabb2_contains_is_inclusive() {
        let b = Aabb2::new([0.0, 0.0], [1.0, 1.0]);
        assert!(b.contains([1.0, 0.0]));
        assert!(!b.contains([1.0001, 0.5]));
        assert!(b.intersects(&Aabb2::new([0.5, 0.5], [2.0, 2.0])));
        assert!(!b.intersects(&Aabb2::new([1.5, 0.5], [2.0, 2.0])));
    }

    #[test]
    fn wraps_only_out_of_range_longitudes() {
        assert_eq!(wrap_longitude(180.0), 180.0);
        assert_eq!(wrap_longitude(-180.0), -180.0);
        assert_eq!(wrap_longitude(190.0), -170.0);
        assert_eq!(wrap_longitude(-190.0), 170.0);
        assert_eq!(wrap_longitude(540.0), -180.0);
    }

    #[test]
    fn split_keeps_plain_boxes_whole() {
        let b = GeoBounds::new(-10.0, -5.0, 10.0, 5.0);
        assert_eq!(b.split_antimeridian(), (b, None));
    }

    #[test]
    fn split_wrapping_box_at_the_seam() {
        let b = GeoBounds::new(170.0, -10.0, -170.0, 10.0);
        assert!(b.crosses_antimeridian());
        let (left, right) = b.split_antimeridian();
        assert_eq!(left, GeoBounds::new(170.0, -10.0, 180.0, 10.0));
        assert_eq!(right, Some(GeoBounds::new(-180.0, -10.0, -170.0, 10.0)));
    }

    #[test]
    fn normalized_clamps_latitude_and_wraps_longitude() {
        let b = GeoBounds::new(175.0, -95.0, 185.0, 95.0).normalized();
        assert_eq!(b, GeoBounds::new(175.0, -90.0, -175.0, 90.0));
        assert!(b.crosses_antimeridian());
        assert!(b.contains(0.0, 179.0));
        assert!(b.contains(0.0, -179.0));
        assert!(!b.contains(0.0, 0.0));
    }
}
