use std::sync::Arc;

use cluster::{ClusterId, ConfigError, GeoPoint, RenderableNode, SpatialIndex, query};
use foundation::handles::Generation;
use foundation::math::integer_zoom;
use foundation::time::Time;
use runtime::metrics::names;
use runtime::{Debouncer, FrameStats, Seq, Telemetry};
use tracing::{debug, info, warn};

use crate::expansion::{ExpansionDecision, plan_expansion};
use crate::settings::{MapSettings, SettingsError};
use crate::slot::{IndexSlot, IndexSnapshot};
use crate::viewport::Viewport;

/// Nodes to draw for one accepted region.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub seq: Seq,
    /// Index generation the nodes came from. Cluster ids are only valid
    /// against this generation.
    pub generation: Generation,
    pub viewport: Viewport,
    /// Continuous zoom of `viewport`.
    pub zoom: f64,
    /// Zoom the index was queried at.
    pub tile_zoom: u8,
    pub nodes: Vec<RenderableNode>,
}

impl RenderFrame {
    pub fn cluster_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_cluster()).count()
    }

    pub fn singleton_count(&self) -> usize {
        self.nodes.len() - self.cluster_count()
    }

    /// Points represented by the frame, clusters counted by their size.
    pub fn point_total(&self) -> u64 {
        self.nodes.iter().map(|n| n.point_count() as u64).sum()
    }

    fn stats(&self, settings: &MapSettings) -> FrameStats {
        let clustered_points = self
            .nodes
            .iter()
            .filter(|n| n.is_cluster())
            .map(|n| n.point_count() as u64)
            .sum();
        FrameStats {
            tile_zoom: self.tile_zoom,
            map_width_px: self.viewport.width_px,
            map_height_px: self.viewport.height_px,
            radius: settings.cluster.radius,
            tile_size: settings.cluster.tile_size,
            node_count: self.nodes.len(),
            cluster_count: self.cluster_count(),
            clustered_points,
        }
    }
}

/// Owns the current index and viewport and turns map events into frames and
/// camera commands.
///
/// Event-driven and single-threaded: every call takes the event time, so a
/// recorded sequence of events replays to the same frames. The index lives
/// in an [`IndexSlot`] that other threads may swap through
/// [`MapController::index_slot`].
#[derive(Debug)]
pub struct MapController {
    settings: MapSettings,
    slot: Arc<IndexSlot>,
    debouncer: Debouncer<Viewport>,
    /// Latest region accepted for rendering, pending or rendered.
    requested: Option<Viewport>,
    /// Region of the last rendered frame.
    viewport: Option<Viewport>,
    last_frame: Option<(Seq, Generation)>,
    telemetry: Telemetry,
}

impl MapController {
    /// Validate `settings` and start with an empty index.
    pub fn new(settings: MapSettings) -> Result<Self, SettingsError> {
        Self::with_points(settings, Vec::new())
    }

    pub fn with_points(settings: MapSettings, points: Vec<GeoPoint>) -> Result<Self, SettingsError> {
        settings.validate()?;
        let index = SpatialIndex::build(points, settings.cluster)?;
        Ok(Self {
            debouncer: Debouncer::from_millis(settings.debounce_ms),
            telemetry: Telemetry::new(settings.diagnostics),
            slot: Arc::new(IndexSlot::new(index)),
            requested: None,
            viewport: None,
            last_frame: None,
            settings,
        })
    }

    pub fn settings(&self) -> &MapSettings {
        &self.settings
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    /// Shared handle for rebuilding the index off the event thread.
    pub fn index_slot(&self) -> Arc<IndexSlot> {
        Arc::clone(&self.slot)
    }

    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        self.slot.current()
    }

    pub fn generation(&self) -> Generation {
        self.slot.generation()
    }

    /// Region of the last rendered frame.
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn has_pending(&self) -> bool {
        self.debouncer.has_pending()
    }

    /// When the pending region becomes due, if any.
    pub fn deadline(&self) -> Option<Time> {
        self.debouncer.deadline()
    }

    /// Rebuild the index from a new listings snapshot and install it.
    ///
    /// The current viewport is re-rendered on the next [`MapController::poll`].
    pub fn replace_points(&mut self, points: Vec<GeoPoint>) -> Result<Generation, ConfigError> {
        let index = SpatialIndex::build(points, self.settings.cluster)?;
        let points = index.len();
        let generation = self.slot.replace(index);
        self.telemetry.count(names::INDEX_REBUILDS);
        info!(generation = generation.get(), points, "index replaced");
        Ok(generation)
    }

    /// Accept a region reported by the map widget.
    ///
    /// Non-finite regions are dropped and the previous frame stays up. The
    /// region is clamped, then ignored if it matches the latest accepted
    /// region within epsilon. Otherwise it is queued behind the debounce
    /// window and its sequence number is returned.
    pub fn on_region_change(&mut self, region: Viewport, now: Time) -> Option<Seq> {
        if let Err(err) = region.validate() {
            warn!(%err, "region rejected");
            self.telemetry.count(names::REGIONS_REJECTED);
            return None;
        }
        let region = self.settings.guard.clamp(&region);

        if let Some(prev) = self.requested {
            let same_surface = prev.width_px == region.width_px && prev.height_px == region.height_px;
            if same_surface && self.settings.guard.is_same_region(&prev, &region) {
                self.telemetry.count(names::REGIONS_IGNORED);
                return None;
            }
        }

        self.requested = Some(region);
        Some(self.debouncer.submit(region, now))
    }

    /// Render the pending region once its debounce window has passed, or
    /// re-render the current one if the index changed underneath it.
    pub fn poll(&mut self, now: Time) -> Option<RenderFrame> {
        if let Some((seq, region)) = self.debouncer.poll(now) {
            if self.debouncer.is_superseded(seq) {
                self.telemetry.count(names::QUERIES_SKIPPED);
                return None;
            }
            return Some(self.render(seq, region, now));
        }

        let (seq, rendered) = self.last_frame?;
        let region = self.viewport?;
        if rendered != self.slot.generation() && !self.debouncer.has_pending() {
            return Some(self.render(seq, region, now));
        }
        None
    }

    /// Render the pending region now, ignoring the debounce window.
    pub fn flush(&mut self, now: Time) -> Option<RenderFrame> {
        let (seq, region) = self.debouncer.flush()?;
        Some(self.render(seq, region, now))
    }

    fn render(&mut self, seq: Seq, region: Viewport, now: Time) -> RenderFrame {
        let snapshot = self.slot.current();
        let cfg = self.settings.cluster;

        let zoom = region.zoom(cfg.tile_size);
        let tile_zoom = integer_zoom(zoom, cfg.min_zoom, cfg.max_zoom);
        let nodes = query(&snapshot.index, &region.bounds(), tile_zoom);

        self.viewport = Some(region);
        self.last_frame = Some((seq, snapshot.generation));

        let frame = RenderFrame {
            seq,
            generation: snapshot.generation,
            viewport: region,
            zoom,
            tile_zoom,
            nodes,
        };
        if self.settings.diagnostics {
            debug!(
                seq = seq.0,
                generation = snapshot.generation.get(),
                zoom,
                tile_zoom,
                nodes = frame.nodes.len(),
                "frame"
            );
            self.telemetry.observe_frame(now, frame.stats(&self.settings));
        }
        frame
    }

    /// Plan the camera move for a tap on cluster `id`, as seen in a frame of
    /// index `generation`.
    ///
    /// Returns `None` when there is nothing to do: the id is stale or not a
    /// cluster, nothing has been rendered yet, or the target region is the
    /// current one.
    pub fn on_cluster_tap(&mut self, id: ClusterId, generation: Generation) -> Option<ExpansionDecision> {
        let snapshot = self.slot.current();
        if generation != snapshot.generation {
            debug!(cluster = %id, "tap on a replaced index ignored");
            return None;
        }
        let current = self.viewport?;
        let node = match snapshot.index.cluster(id) {
            Ok(node) => node,
            Err(err) => {
                debug!(%err, "tap ignored");
                return None;
            }
        };

        let cfg = self.settings.cluster;
        let decision = plan_expansion(
            &self.settings.expansion,
            &self.settings.guard,
            &node,
            &current,
            cfg.max_zoom,
            cfg.tile_size,
        )?;

        if self.settings.guard.is_same_region(&decision.target_viewport, &current) {
            debug!(cluster = %id, "expansion target is the current region");
            return None;
        }

        if self.telemetry.is_enabled() {
            let children = snapshot.index.children(id).map(|c| c.len()).unwrap_or(0);
            if let Ok(expansion_zoom) = snapshot.index.expansion_zoom(id) {
                self.telemetry.record_expansion(expansion_zoom as f64, children);
            }
        }
        debug!(
            cluster = %id,
            points = decision.point_count,
            current_zoom = decision.current_zoom,
            target_zoom = decision.target_zoom,
            "cluster expansion"
        );
        Some(decision)
    }

    /// Target region for the zoom-in button: both spans halved.
    pub fn zoom_in(&self) -> Option<Viewport> {
        let v = self.requested.or(self.viewport)?;
        Some(self.settings.guard.clamp(&v.scaled(0.5)))
    }

    /// Target region for the zoom-out button: both spans doubled, capped at
    /// the whole world.
    pub fn zoom_out(&self) -> Option<Viewport> {
        let v = self.requested.or(self.viewport)?.scaled(2.0);
        let capped = Viewport {
            latitude_delta: v.latitude_delta.min(180.0),
            longitude_delta: v.longitude_delta.min(360.0),
            ..v
        };
        Some(self.settings.guard.clamp(&capped))
    }

    /// Target region centered on `(latitude, longitude)` with the current spans.
    pub fn center_on(&self, latitude: f64, longitude: f64) -> Option<Viewport> {
        if !(latitude.is_finite() && longitude.is_finite()) {
            return None;
        }
        let v = self.requested.or(self.viewport)?;
        Some(self.settings.guard.clamp(&v.centered_on(latitude, longitude)))
    }
}
