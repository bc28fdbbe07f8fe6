use cluster::{ClusterId, RenderableNode};
use serde::{Deserialize, Serialize};

use crate::guard::GuardConfig;
use crate::viewport::Viewport;

/// Clusters of at most this many points expand straight to `max_zoom`.
pub const SMALL_CLUSTER_POINTS: u32 = 2;
/// At most this many points: `max_zoom - 1`.
pub const MEDIUM_CLUSTER_POINTS: u32 = 4;
/// At most this many points: `max_zoom - 2`.
pub const LARGE_CLUSTER_POINTS: u32 = 8;

pub const DEFAULT_LARGE_CLUSTER_NUDGE: f64 = 0.75;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExpansionPolicy {
    /// Added to the index expansion zoom of big clusters so they land past
    /// the split instead of on it.
    pub large_cluster_nudge: f64,
}

impl Default for ExpansionPolicy {
    fn default() -> Self {
        Self {
            large_cluster_nudge: DEFAULT_LARGE_CLUSTER_NUDGE,
        }
    }
}

impl ExpansionPolicy {
    /// Zoom to animate to when a cluster is tapped at `current_zoom`.
    ///
    /// Never below `current_zoom` and never above `max_zoom`; when the
    /// two disagree `max_zoom` wins.
    pub fn target_zoom(
        &self,
        point_count: u32,
        expansion_zoom: u8,
        current_zoom: f64,
        max_zoom: u8,
    ) -> f64 {
        let max = max_zoom as f64;
        let tiered = if point_count <= SMALL_CLUSTER_POINTS {
            max
        } else if point_count <= MEDIUM_CLUSTER_POINTS {
            max - 1.0
        } else if point_count <= LARGE_CLUSTER_POINTS {
            max - 2.0
        } else {
            (expansion_zoom as f64 + self.large_cluster_nudge).min(max)
        };
        tiered.max(current_zoom).min(max)
    }
}

/// Result of a cluster tap: where the map should animate to.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpansionDecision {
    pub cluster_id: ClusterId,
    pub point_count: u32,
    pub current_zoom: f64,
    pub target_zoom: f64,
    pub target_viewport: Viewport,
}

/// Plan the expansion of `node` seen in `current`.
///
/// Returns `None` for singletons. The target viewport is centered on the
/// cluster centroid, keeps the surface size, and is passed through `guard`.
/// `target_zoom` is the zoom of that clamped viewport.
pub fn plan_expansion(
    policy: &ExpansionPolicy,
    guard: &GuardConfig,
    node: &RenderableNode,
    current: &Viewport,
    max_zoom: u8,
    tile_size_px: f64,
) -> Option<ExpansionDecision> {
    let RenderableNode::Cluster {
        id,
        centroid,
        point_count,
        expansion_zoom,
    } = node
    else {
        return None;
    };

    let current_zoom = current.zoom(tile_size_px);
    let target_zoom = policy.target_zoom(*point_count, *expansion_zoom, current_zoom, max_zoom);
    let target = Viewport::from_zoom(
        centroid.lat,
        centroid.lon,
        target_zoom,
        current.width_px,
        current.height_px,
        tile_size_px,
    );
    let target_viewport = guard.clamp(&target);
    // Clamping widens the spans, which zooms the viewport out.
    let target_zoom = if target_viewport == target {
        target_zoom
    } else {
        target_viewport.zoom(tile_size_px).min(target_zoom)
    };

    Some(ExpansionDecision {
        cluster_id: *id,
        point_count: *point_count,
        current_zoom,
        target_zoom,
        target_viewport,
    })
}
