use std::collections::BTreeSet;

use foundation::bounds::GeoBounds;
use tracing::warn;

use crate::index::SpatialIndex;
use crate::node::RenderableNode;

/// Renderable nodes visible in `bounds` at `zoom`.
///
/// - `zoom` is clamped to `[min_zoom, max_zoom]`.
/// - Bounds with `east < west` wrap across the antimeridian and are queried as
///   two boxes, `[west, 180]` and `[-180, east]`; results are concatenated and
///   nodes reported by both halves are kept once.
/// - An empty index or a box with no points yields an empty result.
pub fn query(index: &SpatialIndex, bounds: &GeoBounds, zoom: u8) -> Vec<RenderableNode> {
    if index.is_empty() {
        return Vec::new();
    }
    if !bounds.is_finite() {
        warn!(?bounds, "non-finite query bounds");
        return Vec::new();
    }

    let config = index.config();
    let zoom = zoom.clamp(config.min_zoom, config.max_zoom);
    let bounds = covering_bounds(bounds);

    let (first, second) = bounds.split_antimeridian();
    let mut nodes = index.nodes_in(&first, zoom);
    match second {
        Some(second) => {
            nodes.extend(index.nodes_in(&second, zoom));
            dedup_nodes(nodes)
        }
        None => nodes,
    }
}

/// Normalize `bounds`; a span of a full turn or more covers every longitude.
fn covering_bounds(bounds: &GeoBounds) -> GeoBounds {
    if bounds.east - bounds.west >= 360.0 {
        return GeoBounds::new(-180.0, bounds.south, 180.0, bounds.north).normalized();
    }
    bounds.normalized()
}

/// Keep the first node for every dedup key, preserving order.
pub fn dedup_nodes(nodes: Vec<RenderableNode>) -> Vec<RenderableNode> {
    let mut seen = BTreeSet::new();
    nodes
        .into_iter()
        .filter(|n| seen.insert(n.dedup_key()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{dedup_nodes, query};
    use crate::config::ClusterConfig;
    use crate::index::SpatialIndex;
    use crate::node::{LatLon, RenderableNode};
    use crate::point::GeoPoint;
    use foundation::bounds::GeoBounds;
    use pretty_assertions::assert_eq;

    fn build(points: Vec<GeoPoint>) -> SpatialIndex {
        SpatialIndex::build(points, ClusterConfig::default()).unwrap()
    }

    fn build_with(points: Vec<GeoPoint>, config: ClusterConfig) -> SpatialIndex {
        SpatialIndex::build(points, config).unwrap()
    }

    fn lattice() -> Vec<GeoPoint> {
        let mut pts = Vec::new();
        for i in 0..24 {
            for j in 0..12 {
                let lon = -180.0 + i as f64 * 15.0 + 0.37 * j as f64;
                let lat = -60.0 + j as f64 * 10.0 + 0.11 * i as f64;
                pts.push(GeoPoint::new(format!("{i}-{j}"), lat, lon));
            }
        }
        pts
    }

    fn total(nodes: &[RenderableNode]) -> u32 {
        nodes.iter().map(|n| n.point_count()).sum()
    }

    #[test]
    fn empty_index_yields_nothing() {
        let index = build(Vec::new());
        assert!(query(&index, &GeoBounds::WORLD, 3).is_empty());
    }

    #[test]
    fn box_without_points_yields_nothing() {
        let index = build(vec![GeoPoint::new("a", 40.0, -73.0)]);
        let far = GeoBounds::new(100.0, -20.0, 120.0, -10.0);
        assert!(query(&index, &far, 8).is_empty());
    }

    #[test]
    fn seam_pair_clusters_once_in_a_wrapping_box() {
        let index = build(vec![
            GeoPoint::new("east", 0.0, 179.8),
            GeoPoint::new("west", 0.0, -179.8),
        ]);
        let seam = GeoBounds::new(170.0, -10.0, -170.0, 10.0);

        let low = query(&index, &seam, 1);
        assert_eq!(low.len(), 1);
        assert!(low[0].is_cluster());
        assert_eq!(low[0].point_count(), 2);

        let high = query(&index, &seam, 12);
        assert_eq!(high.len(), 2);
        assert!(high.iter().all(|n| !n.is_cluster()));
    }

    #[test]
    fn wrapping_query_conserves_points_inside_bounds() {
        let index = build(lattice());
        let boxes = [
            GeoBounds::new(150.0, -45.0, -150.0, 45.0),
            GeoBounds::new(-30.0, -70.0, 60.0, 70.0),
            GeoBounds::new(90.0, -10.0, 80.0, 10.0),
        ];
        for zoom in [1u8, 2, 3, 5, 8, 20] {
            let everything = query(&index, &GeoBounds::WORLD, zoom);
            assert_eq!(total(&everything), 24 * 12);
            for b in &boxes {
                let expected: u32 = everything
                    .iter()
                    .filter(|n| {
                        let p = n.position();
                        b.contains(p.lat, p.lon)
                    })
                    .map(|n| n.point_count())
                    .sum();
                assert_eq!(total(&query(&index, b, zoom)), expected, "zoom {zoom} box {b:?}");
            }
        }
    }

    #[test]
    fn zoom_is_clamped_to_configured_range() {
        let index = build(lattice());
        assert_eq!(
            query(&index, &GeoBounds::WORLD, 30),
            query(&index, &GeoBounds::WORLD, 20)
        );
        assert_eq!(
            query(&index, &GeoBounds::WORLD, 0),
            query(&index, &GeoBounds::WORLD, 1)
        );
    }

    #[test]
    fn full_turn_spans_cover_the_world() {
        let index = build(lattice());
        let wide = GeoBounds::new(-200.0, -90.0, 200.0, 90.0);
        assert_eq!(query(&index, &wide, 4), query(&index, &GeoBounds::WORLD, 4));
    }

    #[test]
    fn non_finite_bounds_yield_nothing() {
        let index = build(lattice());
        let bad = GeoBounds::new(f64::NAN, -10.0, 10.0, 10.0);
        assert!(query(&index, &bad, 4).is_empty());
    }

    #[test]
    fn dedup_drops_the_seam_twin() {
        let at = |id: u32, lon: f64| RenderableNode::Singleton {
            id,
            coordinate: LatLon::new(1.0, lon),
            source_point_id: "p".to_string(),
            rating: None,
            category: String::new(),
        };
        let nodes = vec![at(0, 180.0), at(0, -180.0), at(1, 10.0), at(2, 10.0)];
        assert_eq!(dedup_nodes(nodes), vec![at(0, 180.0), at(1, 10.0), at(2, 10.0)]);
    }

    #[test]
    fn co_located_listings_below_min_points_are_all_returned() {
        let config = ClusterConfig {
            min_points: 3,
            ..ClusterConfig::default()
        };
        let nyc = build_with(
            vec![
                GeoPoint::new("deli", 40.7484, -73.9857),
                GeoPoint::new("shul", 40.7484, -73.9857),
            ],
            config,
        );
        let plain = GeoBounds::new(-80.0, 30.0, -70.0, 50.0);
        for zoom in [1u8, 10, 20] {
            assert_eq!(nyc.nodes_in(&GeoBounds::WORLD, zoom).len(), 2);
            let nodes = query(&nyc, &plain, zoom);
            assert_eq!(nodes.len(), 2, "zoom {zoom}");
            assert_eq!(total(&nodes), 2);
        }

        let seam = build_with(
            vec![
                GeoPoint::new("east-a", 0.0, 179.5),
                GeoPoint::new("east-b", 0.0, 179.5),
                GeoPoint::new("west", 0.0, -179.5),
            ],
            config,
        );
        let wrapping = GeoBounds::new(170.0, -10.0, -170.0, 10.0);
        for zoom in [10u8, 20] {
            assert_eq!(total(&query(&seam, &wrapping, zoom)), 3, "zoom {zoom}");
        }
    }
}
