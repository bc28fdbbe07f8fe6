use foundation::math::precision::CoordKey;
use serde::Serialize;

use crate::index::ClusterId;

/// A geographic coordinate in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeRef {
    Cluster(ClusterId),
    /// Index of the source point in the snapshot.
    Point(u32),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DedupKey {
    pub node: NodeRef,
    pub at: CoordKey,
    pub point_count: u32,
}

/// What the rendering layer draws for one query result.
///
/// Colors, shapes and touch targets are chosen downstream from these public
/// fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum RenderableNode {
    Cluster {
        id: ClusterId,
        centroid: LatLon,
        point_count: u32,
        /// Zoom at which this cluster breaks apart.
        expansion_zoom: u8,
    },
    Singleton {
        /// Position of the source point in the indexed snapshot.
        id: u32,
        coordinate: LatLon,
        source_point_id: String,
        rating: Option<f64>,
        category: String,
    },
}

impl RenderableNode {
    pub fn is_cluster(&self) -> bool {
        matches!(self, RenderableNode::Cluster { .. })
    }

    /// Number of source points this node stands for.
    pub fn point_count(&self) -> u32 {
        match self {
            RenderableNode::Cluster { point_count, .. } => *point_count,
            RenderableNode::Singleton { .. } => 1,
        }
    }

    pub fn position(&self) -> LatLon {
        match self {
            RenderableNode::Cluster { centroid, .. } => *centroid,
            RenderableNode::Singleton { coordinate, .. } => *coordinate,
        }
    }

    pub fn cluster_id(&self) -> Option<ClusterId> {
        match self {
            RenderableNode::Cluster { id, .. } => Some(*id),
            RenderableNode::Singleton { .. } => None,
        }
    }

    /// Identity used to drop the same node reported twice by the two halves
    /// of an antimeridian-split query. Distinct nodes never share a key, even
    /// at the same position.
    pub fn dedup_key(&self) -> DedupKey {
        let p = self.position();
        let node = match self {
            RenderableNode::Cluster { id, .. } => NodeRef::Cluster(*id),
            RenderableNode::Singleton { id, .. } => NodeRef::Point(*id),
        };
        DedupKey {
            node,
            at: CoordKey::new(p.lat, p.lon),
            point_count: self.point_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LatLon, RenderableNode};
    use crate::index::ClusterId;

    fn singleton(lat: f64, lon: f64) -> RenderableNode {
        singleton_at(0, lat, lon)
    }

    fn singleton_at(id: u32, lat: f64, lon: f64) -> RenderableNode {
        RenderableNode::Singleton {
            id,
            coordinate: LatLon::new(lat, lon),
            source_point_id: "p".to_string(),
            rating: Some(4.2),
            category: "restaurant".to_string(),
        }
    }

    #[test]
    fn accessors_cover_both_variants() {
        let c = RenderableNode::Cluster {
            id: ClusterId::new(3, 7),
            centroid: LatLon::new(1.0, 2.0),
            point_count: 5,
            expansion_zoom: 4,
        };
        assert!(c.is_cluster());
        assert_eq!(c.point_count(), 5);
        assert_eq!(c.cluster_id(), Some(ClusterId::new(3, 7)));

        let s = singleton(1.0, 2.0);
        assert!(!s.is_cluster());
        assert_eq!(s.point_count(), 1);
        assert_eq!(s.cluster_id(), None);
        assert_eq!(s.position(), LatLon::new(1.0, 2.0));
    }

    #[test]
    fn seam_longitudes_share_dedup_key() {
        assert_eq!(singleton(0.0, 180.0).dedup_key(), singleton(0.0, -180.0).dedup_key());
        assert_ne!(singleton(0.0, 179.0).dedup_key(), singleton(0.0, -179.0).dedup_key());
    }

    #[test]
    fn co_located_points_keep_distinct_keys() {
        let a = singleton_at(0, 40.7484, -73.9857);
        let b = singleton_at(1, 40.7484, -73.9857);
        assert_ne!(a.dedup_key(), b.dedup_key());

        let cluster = RenderableNode::Cluster {
            id: ClusterId::new(3, 0),
            centroid: LatLon::new(40.7484, -73.9857),
            point_count: 1,
            expansion_zoom: 4,
        };
        assert_ne!(cluster.dedup_key(), singleton_at(0, 40.7484, -73.9857).dedup_key());
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_value(singleton(1.0, 2.0)).unwrap();
        assert_eq!(json["kind"], "singleton");
        assert_eq!(json["sourcePointId"], "p");
        assert_eq!(json["coordinate"]["lon"], 2.0);
    }
}
