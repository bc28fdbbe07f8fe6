use foundation::bounds::{Aabb2, GeoBounds};
use foundation::math::{Vec2, lat_y, lng_x, wrap_x, x_lng, y_lat};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{ClusterConfig, ConfigError};
use crate::node::{LatLon, RenderableNode};
use crate::point::{GeoPoint, retain_valid};
use crate::spatial::KdTree;

const ZOOM_BITS: u32 = 5;
const ZOOM_MASK: u64 = (1 << ZOOM_BITS) - 1;

/// Identifies a cluster within one [`SpatialIndex`].
///
/// Packs the zoom the cluster was formed at with the position of its origin
/// node in the level one zoom below. Ids are only meaningful for the index
/// that issued them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(u64);

impl ClusterId {
    pub fn new(zoom: u8, origin: usize) -> Self {
        ClusterId(((origin as u64) << ZOOM_BITS) | (zoom as u64 & ZOOM_MASK))
    }

    pub fn from_raw(raw: u64) -> Self {
        ClusterId(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }

    /// Zoom at which the cluster was formed.
    pub fn zoom(self) -> u8 {
        (self.0 & ZOOM_MASK) as u8
    }

    fn origin(self) -> usize {
        (self.0 >> ZOOM_BITS) as usize
    }
}

impl std::fmt::Display for ClusterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    UnknownCluster(ClusterId),
}

impl std::fmt::Display for IndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexError::UnknownCluster(id) => write!(f, "unknown cluster id {id}"),
        }
    }
}

impl std::error::Error for IndexError {}

#[derive(Debug, Copy, Clone, PartialEq)]
enum NodeKind {
    Point(u32),
    Cluster(ClusterId),
}

#[derive(Debug, Copy, Clone)]
struct LevelNode {
    /// Normalized Web-Mercator position.
    pos: Vec2,
    num_points: u32,
    kind: NodeKind,
    /// Cluster this node was merged into one zoom level up.
    parent: Option<ClusterId>,
}

#[derive(Debug, Clone)]
struct Level {
    nodes: Vec<LevelNode>,
    tree: KdTree,
}

impl Level {
    fn new(nodes: Vec<LevelNode>, node_size: usize) -> Self {
        let coords: Vec<Vec2> = nodes.iter().map(|n| n.pos).collect();
        Self {
            tree: KdTree::build(&coords, node_size),
            nodes,
        }
    }
}

/// Immutable hierarchical clustering over one snapshot of points.
///
/// One level per zoom in `[min_zoom, max_zoom + 1]`; the top level holds the
/// raw points and every level below greedily merges neighbors within the
/// zoom's pixel radius. Distances wrap across the antimeridian.
///
/// The index is never mutated after `build`; a new snapshot means a new index.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    config: ClusterConfig,
    points: Vec<GeoPoint>,
    /// Indexed by `zoom - min_zoom`.
    levels: Vec<Level>,
    dropped: usize,
}

impl SpatialIndex {
    /// Build an index, dropping points with invalid coordinates first.
    pub fn build(points: Vec<GeoPoint>, config: ClusterConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let total = points.len();
        let (points, dropped) = retain_valid(points);

        let leaves: Vec<LevelNode> = points
            .iter()
            .enumerate()
            .map(|(i, p)| LevelNode {
                pos: Vec2::new(lng_x(p.longitude), lat_y(p.latitude)),
                num_points: 1,
                kind: NodeKind::Point(i as u32),
                parent: None,
            })
            .collect();

        let mut levels_desc: Vec<Level> =
            Vec::with_capacity((config.max_zoom - config.min_zoom) as usize + 2);
        let mut level = Level::new(leaves, config.node_size);
        for zoom in (config.min_zoom..=config.max_zoom).rev() {
            let next = Level::new(cluster_level(&mut level, zoom, &config), config.node_size);
            levels_desc.push(std::mem::replace(&mut level, next));
        }
        levels_desc.push(level);
        levels_desc.reverse();

        info!(
            total,
            kept = points.len(),
            dropped,
            levels = levels_desc.len(),
            "spatial index built"
        );

        Ok(Self {
            config,
            points,
            levels: levels_desc,
            dropped,
        })
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Number of indexed (valid) points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of snapshot points rejected at ingestion.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn point(&self, index: usize) -> Option<&GeoPoint> {
        self.points.get(index)
    }

    /// Nodes inside a non-wrapping `bounds` at `zoom`.
    ///
    /// `zoom` is clamped to `[min_zoom, max_zoom + 1]`; at `max_zoom + 1`
    /// every point is a singleton. Results are in a stable order.
    pub fn nodes_in(&self, bounds: &GeoBounds, zoom: u8) -> Vec<RenderableNode> {
        let level = self.level(zoom);
        let west = bounds.west.clamp(-180.0, 180.0);
        let east = bounds.east.clamp(-180.0, 180.0);
        let query = Aabb2::new(
            [lng_x(west), lat_y(bounds.north)],
            [lng_x(east), lat_y(bounds.south)],
        );
        level
            .tree
            .range(&query)
            .into_iter()
            .map(|i| self.to_renderable(&level.nodes[i]))
            .collect()
    }

    /// The cluster node itself, as it is rendered at the zoom it formed.
    pub fn cluster(&self, id: ClusterId) -> Result<RenderableNode, IndexError> {
        let origin = self.origin_node(id)?;
        let level = self.level(id.zoom());
        let r = self.config.world_radius(id.zoom());
        level
            .tree
            .within_cyclic_x(origin.pos, r)
            .into_iter()
            .map(|i| &level.nodes[i])
            .find(|n| n.kind == NodeKind::Cluster(id))
            .map(|n| self.to_renderable(n))
            .ok_or(IndexError::UnknownCluster(id))
    }

    /// Nodes one zoom level below a cluster.
    pub fn children(&self, id: ClusterId) -> Result<Vec<RenderableNode>, IndexError> {
        self.origin_node(id)?;
        Ok(self
            .child_nodes(id)
            .into_iter()
            .map(|n| self.to_renderable(n))
            .collect())
    }

    /// Source points of a cluster, skipping `offset` and returning at most `limit`.
    pub fn leaves(
        &self,
        id: ClusterId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<&GeoPoint>, IndexError> {
        self.origin_node(id)?;
        let mut out = Vec::new();
        let mut skipped = 0usize;
        self.append_leaves(id, limit, offset, &mut skipped, &mut out);
        Ok(out)
    }

    /// Lowest zoom at which the cluster splits into more than one child.
    pub fn expansion_zoom(&self, id: ClusterId) -> Result<u8, IndexError> {
        self.origin_node(id)?;
        Ok(self.expansion_zoom_of(id))
    }

    fn expansion_zoom_of(&self, id: ClusterId) -> u8 {
        let mut id = id;
        let mut zoom = id.zoom();
        while zoom <= self.config.max_zoom {
            let children = self.child_nodes(id);
            zoom += 1;
            if children.len() != 1 {
                break;
            }
            match children[0].kind {
                NodeKind::Cluster(child) => id = child,
                NodeKind::Point(_) => break,
            }
        }
        zoom
    }

    fn level(&self, zoom: u8) -> &Level {
        let z = zoom.clamp(self.config.min_zoom, self.config.max_zoom + 1);
        &self.levels[(z - self.config.min_zoom) as usize]
    }

    fn origin_node(&self, id: ClusterId) -> Result<&LevelNode, IndexError> {
        let zoom = id.zoom();
        if zoom < self.config.min_zoom || zoom > self.config.max_zoom {
            return Err(IndexError::UnknownCluster(id));
        }
        match self.level(zoom + 1).nodes.get(id.origin()) {
            Some(node) if node.parent == Some(id) => Ok(node),
            _ => Err(IndexError::UnknownCluster(id)),
        }
    }

    /// Caller must have checked `id` with `origin_node`.
    fn child_nodes(&self, id: ClusterId) -> Vec<&LevelNode> {
        let level = self.level(id.zoom() + 1);
        let Some(origin) = level.nodes.get(id.origin()) else {
            return Vec::new();
        };
        let r = self.config.world_radius(id.zoom());
        level
            .tree
            .within_cyclic_x(origin.pos, r)
            .into_iter()
            .map(|i| &level.nodes[i])
            .filter(|n| n.parent == Some(id))
            .collect()
    }

    fn append_leaves<'a>(
        &'a self,
        id: ClusterId,
        limit: usize,
        offset: usize,
        skipped: &mut usize,
        out: &mut Vec<&'a GeoPoint>,
    ) {
        for child in self.child_nodes(id) {
            if out.len() >= limit {
                return;
            }
            match child.kind {
                NodeKind::Cluster(c) => {
                    let n = child.num_points as usize;
                    if *skipped + n <= offset {
                        *skipped += n;
                    } else {
                        self.append_leaves(c, limit, offset, skipped, out);
                    }
                }
                NodeKind::Point(i) => {
                    if *skipped < offset {
                        *skipped += 1;
                    } else {
                        out.push(&self.points[i as usize]);
                    }
                }
            }
        }
    }

    fn to_renderable(&self, node: &LevelNode) -> RenderableNode {
        match node.kind {
            NodeKind::Cluster(id) => RenderableNode::Cluster {
                id,
                centroid: LatLon::new(y_lat(node.pos.y), x_lng(node.pos.x)),
                point_count: node.num_points,
                expansion_zoom: self.expansion_zoom_of(id),
            },
            NodeKind::Point(i) => {
                let p = &self.points[i as usize];
                RenderableNode::Singleton {
                    id: i,
                    coordinate: LatLon::new(p.latitude, p.longitude),
                    source_point_id: p.id.clone(),
                    rating: p.rating,
                    category: p.category.clone(),
                }
            }
        }
    }
}

/// Merge the nodes of `level` (zoom + 1) into the nodes of `zoom`.
///
/// Marks every merged node's `parent` in `level`.
fn cluster_level(level: &mut Level, zoom: u8, config: &ClusterConfig) -> Vec<LevelNode> {
    let r = config.world_radius(zoom);
    let n = level.nodes.len();
    let mut processed = vec![false; n];
    let mut next: Vec<LevelNode> = Vec::new();

    for i in 0..n {
        if processed[i] {
            continue;
        }
        processed[i] = true;

        let origin = level.nodes[i];
        let neighbors = level.tree.within_cyclic_x(origin.pos, r);

        let mut num_points = origin.num_points;
        for &j in &neighbors {
            if !processed[j] {
                num_points += level.nodes[j].num_points;
            }
        }

        if num_points > origin.num_points && num_points >= config.min_points {
            let id = ClusterId::new(zoom, i);
            let mut weighted = origin.pos * origin.num_points as f64;
            for &j in &neighbors {
                if processed[j] {
                    continue;
                }
                processed[j] = true;
                let node = &mut level.nodes[j];
                let pos = Vec2::new(unwrap_near(node.pos.x, origin.pos.x), node.pos.y);
                weighted = weighted + pos * node.num_points as f64;
                node.parent = Some(id);
            }
            level.nodes[i].parent = Some(id);

            let c = weighted * (1.0 / num_points as f64);
            next.push(LevelNode {
                pos: Vec2::new(wrap_x(c.x), c.y),
                num_points,
                kind: NodeKind::Cluster(id),
                parent: None,
            });
        } else {
            next.push(LevelNode {
                parent: None,
                ..origin
            });
            // Too few to cluster: keep the neighbors out of later groups at this zoom.
            if num_points > 1 {
                for &j in &neighbors {
                    if processed[j] {
                        continue;
                    }
                    processed[j] = true;
                    next.push(LevelNode {
                        parent: None,
                        ..level.nodes[j]
                    });
                }
            }
        }
    }

    next
}

/// Shift `x` by a whole world so it lies within half a world of `reference`.
fn unwrap_near(x: f64, reference: f64) -> f64 {
    let d = x - reference;
    if d > 0.5 {
        x - 1.0
    } else if d < -0.5 {
        x + 1.0
    } else {
        x
    }
}
