use serde::{Deserialize, Serialize};
use tracing::debug;

/// A listing's map-relevant projection.
///
/// Snapshots arrive as JSON arrays of these and are replaced wholesale; a
/// point is never mutated after ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl GeoPoint {
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            latitude,
            longitude,
            rating: None,
            category: String::new(),
            title: String::new(),
            description: String::new(),
            image_url: None,
        }
    }

    /// Finite, latitude in `[-90, 90]`, longitude in `[-180, 180]`.
    pub fn has_valid_coordinates(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Split a snapshot into indexable points, dropping invalid coordinates.
///
/// Returns the kept points (input order preserved) and the number dropped.
pub fn retain_valid(points: Vec<GeoPoint>) -> (Vec<GeoPoint>, usize) {
    let total = points.len();
    let kept: Vec<GeoPoint> = points
        .into_iter()
        .filter(|p| {
            let ok = p.has_valid_coordinates();
            if !ok {
                debug!(
                    id = %p.id,
                    latitude = p.latitude,
                    longitude = p.longitude,
                    "dropping point with invalid coordinates"
                );
            }
            ok
        })
        .collect();
    let dropped = total - kept.len();
    (kept, dropped)
}
