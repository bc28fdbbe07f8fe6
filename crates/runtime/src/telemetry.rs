//! Throttled diagnostics sampling for the map pipeline.
//!
//! Telemetry observes results; it never feeds back into them.

use foundation::time::Time;
use tracing::info;

use crate::metrics::{names, Metrics};

/// Minimum seconds between two samples.
pub const SAMPLE_INTERVAL_S: f64 = 1.0;

/// What one rendered frame looked like.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameStats {
    pub tile_zoom: u8,
    pub map_width_px: f64,
    pub map_height_px: f64,
    pub radius: f64,
    pub tile_size: f64,
    pub node_count: usize,
    pub cluster_count: usize,
    /// Sum of `point_count` over the frame's clusters.
    pub clustered_points: u64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TelemetrySample {
    pub stats: FrameStats,
    pub average_points_per_cluster: f64,
    pub last_expansion_zoom: Option<f64>,
    pub last_children_count: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Telemetry {
    enabled: bool,
    interval_s: f64,
    last_sample: Option<Time>,
    last_expansion: Option<(f64, usize)>,
    metrics: Metrics,
}

impl Telemetry {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            interval_s: SAMPLE_INTERVAL_S,
            last_sample: None,
            last_expansion: None,
            metrics: Metrics::new(),
        }
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Count a pipeline event (frames, skipped queries, ...).
    pub fn count(&mut self, name: &'static str) {
        if self.enabled {
            self.metrics.inc_counter(name, 1);
        }
    }

    /// Record a frame; returns a sample at most once per interval.
    pub fn observe_frame(&mut self, now: Time, stats: FrameStats) -> Option<TelemetrySample> {
        if !self.enabled {
            return None;
        }
        self.metrics.inc_counter(names::FRAMES, 1);

        if let Some(last) = self.last_sample {
            if now.since(last) < self.interval_s {
                return None;
            }
        }
        self.last_sample = Some(now);

        let average = if stats.cluster_count > 0 {
            stats.clustered_points as f64 / stats.cluster_count as f64
        } else {
            0.0
        };

        self.metrics.set_gauge(names::TILE_ZOOM, stats.tile_zoom as f64);
        self.metrics.set_gauge(names::NODES, stats.node_count as f64);
        self.metrics.set_gauge(names::CLUSTERS, stats.cluster_count as f64);
        self.metrics.set_gauge(names::AVG_POINTS_PER_CLUSTER, average);

        let sample = TelemetrySample {
            stats,
            average_points_per_cluster: average,
            last_expansion_zoom: self.last_expansion.map(|(z, _)| z),
            last_children_count: self.last_expansion.map(|(_, n)| n),
        };
        info!(
            tile_zoom = stats.tile_zoom,
            width = stats.map_width_px,
            height = stats.map_height_px,
            radius = stats.radius,
            tile_size = stats.tile_size,
            nodes = stats.node_count,
            clusters = stats.cluster_count,
            average_points_per_cluster = average,
            last_expansion_zoom = ?sample.last_expansion_zoom,
            last_children_count = ?sample.last_children_count,
            "map telemetry"
        );
        Some(sample)
    }

    /// Remember the latest cluster expansion for the next sample.
    pub fn record_expansion(&mut self, expansion_zoom: f64, children: usize) {
        if !self.enabled {
            return;
        }
        self.last_expansion = Some((expansion_zoom, children));
        self.metrics.inc_counter(names::EXPANSIONS, 1);
        self.metrics.record(names::EXPANSION_ZOOM, expansion_zoom);
        info!(expansion_zoom, children, "cluster expansion");
    }
}
