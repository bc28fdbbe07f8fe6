use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use cluster::{ClusterId, GeoPoint, RenderableNode};
use foundation::time::Time;
use mapview::{ExpansionDecision, MapController, MapSettings, RenderFrame, Viewport};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Cluster map pins from a JSON listings snapshot")]
struct Args {
    /// JSON settings file (defaults apply without it)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug, Clone, Copy)]
struct Region {
    /// Center latitude
    #[arg(long, allow_negative_numbers = true)]
    lat: f64,

    /// Center longitude
    #[arg(long, allow_negative_numbers = true)]
    lon: f64,

    /// Latitude span in degrees
    #[arg(long)]
    lat_delta: f64,

    /// Longitude span in degrees
    #[arg(long)]
    lon_delta: f64,

    /// Map width in pixels
    #[arg(long, default_value_t = 1080.0)]
    width: f64,

    /// Map height in pixels
    #[arg(long, default_value_t = 2340.0)]
    height: f64,
}

impl Region {
    fn viewport(&self) -> Viewport {
        Viewport::new(
            self.lat,
            self.lon,
            self.lat_delta,
            self.lon_delta,
            self.width,
            self.height,
        )
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the zoom and the nodes visible in a region
    Query {
        /// JSON array of points
        #[arg(long)]
        points: PathBuf,

        #[command(flatten)]
        region: Region,
    },

    /// Plan the camera move for tapping a cluster seen in a region
    Expand {
        #[arg(long)]
        points: PathBuf,

        #[command(flatten)]
        region: Region,

        /// Cluster id as printed by `query`
        #[arg(long)]
        cluster: u64,
    },

    /// Replay a zoom sequence at a fixed center
    Simulate {
        #[arg(long)]
        points: PathBuf,

        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Comma-separated zoom levels
        #[arg(long, value_delimiter = ',', default_value = "5,10,15,12,8,18")]
        zooms: Vec<f64>,

        #[arg(long, default_value_t = 1080.0)]
        width: f64,

        #[arg(long, default_value_t = 2340.0)]
        height: f64,
    },

    /// Validate a settings file and print it with defaults filled in
    CheckSettings { path: PathBuf },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryOutput<'a> {
    zoom: f64,
    tile_zoom: u8,
    generation: u64,
    crosses_antimeridian: bool,
    viewport: Viewport,
    nodes: &'a [RenderableNode],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulationStep {
    step: usize,
    requested_zoom: f64,
    zoom: f64,
    tile_zoom: u8,
    nodes: usize,
    clusters: usize,
    points: u64,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let settings = match &args.settings {
        Some(path) => MapSettings::load(path)?,
        None => MapSettings::default(),
    };

    match args.command {
        Command::Query { points, region } => {
            let (_map, frame) = render_once(settings, &points, region)?;
            print_json(&QueryOutput {
                zoom: frame.zoom,
                tile_zoom: frame.tile_zoom,
                generation: frame.generation.get(),
                crosses_antimeridian: frame.viewport.crosses_antimeridian(),
                viewport: frame.viewport,
                nodes: &frame.nodes,
            })?;
        }
        Command::Expand {
            points,
            region,
            cluster,
        } => {
            let (mut map, frame) = render_once(settings, &points, region)?;
            let id = ClusterId::from_raw(cluster);
            let decision: Option<ExpansionDecision> = map.on_cluster_tap(id, frame.generation);
            if decision.is_none() {
                warn!(cluster, "no expansion for this cluster in this region");
            }
            print_json(&decision)?;
        }
        Command::Simulate {
            points,
            lat,
            lon,
            zooms,
            width,
            height,
        } => {
            let mut map = MapController::with_points(settings, load_points(&points)?)?;
            let tile = map.settings().cluster.tile_size;
            let settle = map.settings().debounce_seconds();

            let mut now = Time::ZERO;
            for (step, requested_zoom) in zooms.into_iter().enumerate() {
                let region = Viewport::from_zoom(lat, lon, requested_zoom, width, height, tile);
                map.on_region_change(region, now);
                now = now.add_seconds(settle);
                if let Some(frame) = map.poll(now) {
                    print_json_line(&SimulationStep {
                        step,
                        requested_zoom,
                        zoom: frame.zoom,
                        tile_zoom: frame.tile_zoom,
                        nodes: frame.nodes.len(),
                        clusters: frame.cluster_count(),
                        points: frame.point_total(),
                    })?;
                }
                now = now.add_seconds(settle);
            }
        }
        Command::CheckSettings { path } => {
            let checked = MapSettings::load(&path)?;
            info!(path = %path.display(), "settings ok");
            println!("{}", checked.to_json_pretty()?);
        }
    }
    Ok(())
}

fn load_points(path: &Path) -> Result<Vec<GeoPoint>, Box<dyn Error>> {
    let text = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
    let points: Vec<GeoPoint> =
        serde_json::from_str(&text).map_err(|e| format!("parse {path:?}: {e}"))?;
    info!(points = points.len(), path = %path.display(), "points loaded");
    Ok(points)
}

fn render_once(
    settings: MapSettings,
    points: &Path,
    region: Region,
) -> Result<(MapController, RenderFrame), Box<dyn Error>> {
    let mut map = MapController::with_points(settings, load_points(points)?)?;
    let viewport = region.viewport();
    viewport.validate()?;
    map.on_region_change(viewport, Time::ZERO);
    let frame = map
        .flush(Time::ZERO)
        .ok_or("region was not accepted")?;
    Ok((map, frame))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_json_line<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
