use std::collections::BTreeMap;

/// Metric names emitted by the map pipeline.
pub mod names {
    pub const FRAMES: &str = "map.frames";
    pub const QUERIES_SKIPPED: &str = "map.queries_skipped";
    pub const REGIONS_IGNORED: &str = "map.regions_ignored";
    pub const REGIONS_REJECTED: &str = "map.regions_rejected";
    pub const EXPANSIONS: &str = "map.expansions";
    pub const INDEX_REBUILDS: &str = "map.index_rebuilds";
    pub const TILE_ZOOM: &str = "map.tile_zoom";
    pub const NODES: &str = "map.nodes";
    pub const CLUSTERS: &str = "map.clusters";
    pub const AVG_POINTS_PER_CLUSTER: &str = "map.avg_points_per_cluster";
    pub const EXPANSION_ZOOM: &str = "map.expansion_zoom";
}

/// Counters, gauges and value summaries keyed by static name.
///
/// Sorted maps keep every listing in name order, independent of insertion
/// order. Nothing here reads a clock.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Metrics {
    counters: BTreeMap<&'static str, u64>,
    gauges: BTreeMap<&'static str, f64>,
    summaries: BTreeMap<&'static str, Summary>,
}

/// Running count, sum and range of recorded values.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Summary {
    pub count: u64,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
    pub last: f64,
}

impl Summary {
    pub fn record(&mut self, value: f64) {
        let first = self.count == 0;
        self.min = if first { value } else { self.min.min(value) };
        self.max = if first { value } else { self.max.max(value) };
        self.last = value;
        self.count += 1;
        self.sum += value;
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Name-ordered copy of a [`Metrics`] registry.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub counters: Vec<(&'static str, u64)>,
    pub gauges: Vec<(&'static str, f64)>,
    pub summaries: Vec<(&'static str, Summary)>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_counter(&mut self, name: &'static str, by: u64) {
        *self.counters.entry(name).or_default() += by;
    }

    /// Zero for names never incremented.
    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).map_or(0, |c| *c)
    }

    pub fn set_gauge(&mut self, name: &'static str, value: f64) {
        self.gauges.insert(name, value);
    }

    pub fn gauge(&self, name: &str) -> Option<f64> {
        self.gauges.get(name).copied()
    }

    pub fn record(&mut self, name: &'static str, value: f64) {
        self.summaries.entry(name).or_default().record(value);
    }

    pub fn summary(&self, name: &str) -> Option<Summary> {
        self.summaries.get(name).copied()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        fn listed<V: Copy>(map: &BTreeMap<&'static str, V>) -> Vec<(&'static str, V)> {
            map.iter().map(|(k, v)| (*k, *v)).collect()
        }
        MetricsSnapshot {
            counters: listed(&self.counters),
            gauges: listed(&self.gauges),
            summaries: listed(&self.summaries),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Metrics, Summary, names};

    #[test]
    fn counters_add_up_and_default_to_zero() {
        let mut m = Metrics::new();
        m.inc_counter(names::FRAMES, 1);
        m.inc_counter(names::FRAMES, 2);
        assert_eq!(m.counter(names::FRAMES), 3);
        assert_eq!(m.counter(names::EXPANSIONS), 0);
    }

    #[test]
    fn gauges_keep_the_latest_value() {
        let mut m = Metrics::new();
        assert_eq!(m.gauge(names::TILE_ZOOM), None);
        m.set_gauge(names::TILE_ZOOM, 10.0);
        m.set_gauge(names::TILE_ZOOM, 11.0);
        assert_eq!(m.gauge(names::TILE_ZOOM), Some(11.0));
    }

    #[test]
    fn summary_tracks_range_mean_and_last() {
        let mut s = Summary::default();
        assert_eq!(s.mean(), None);
        for v in [15.0, 12.0, 18.0] {
            s.record(v);
        }
        assert_eq!((s.count, s.min, s.max, s.last), (3, 12.0, 18.0, 18.0));
        assert_eq!(s.mean(), Some(15.0));
    }

    #[test]
    fn snapshot_lists_names_in_order() {
        let mut m = Metrics::new();
        m.inc_counter(names::REGIONS_REJECTED, 1);
        m.inc_counter(names::EXPANSIONS, 4);
        m.set_gauge(names::NODES, 7.0);
        m.set_gauge(names::CLUSTERS, 2.0);
        m.record(names::EXPANSION_ZOOM, 19.0);

        let snap = m.snapshot();
        assert_eq!(
            snap.counters,
            vec![(names::EXPANSIONS, 4), (names::REGIONS_REJECTED, 1)]
        );
        assert_eq!(snap.gauges, vec![(names::CLUSTERS, 2.0), (names::NODES, 7.0)]);
        assert_eq!(snap.summaries.len(), 1);
        assert_eq!(snap.summaries[0].1.last, 19.0);
    }
}
