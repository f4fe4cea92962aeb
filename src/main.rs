//! Terrain scene builder
//!
//! Usage: terrain-scene [config.toml]
//!
//! Builds the terrain grid, loads the elevation and diffuse maps, scatters
//! objects over the acceptable height band and optionally writes the
//! placements as JSON and an offscreen snapshot as PNG.

use std::path::PathBuf;

use anyhow::{Context, Result};

use terrain_scene::gpu::GpuContext;
use terrain_scene::mesh::{TerrainGrid, TerrainMesh};
use terrain_scene::placement::{PlacementEngine, PlacementResult};
use terrain_scene::renderer::{render_snapshot, SnapshotScene};
use terrain_scene::{HeightFieldStore, SceneConfig};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    if let Err(e) = run() {
        log::error!("[main] {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => SceneConfig::load(&path)
            .with_context(|| format!("loading scene config {}", path.display()))?,
        None => {
            log::info!("[main] No config given, using defaults");
            SceneConfig::default()
        }
    };

    let transform = config.terrain.transform()?;
    let grid = TerrainGrid::generate(config.terrain.tessellation)?;
    log::info!(
        "[main] Generated {}x{} terrain grid: {} vertices, {} indices",
        grid.tessellation(),
        grid.tessellation(),
        grid.vertex_count(),
        grid.index_count()
    );

    let gpu = if config.output.snapshot_path.is_some() {
        match pollster::block_on(GpuContext::new_headless()) {
            Ok(ctx) => Some(ctx),
            Err(e) => {
                log::warn!("[main] No GPU available, snapshot will be skipped: {}", e);
                None
            }
        }
    } else {
        None
    };

    let mut store = config.terrain.store();
    if let Some(ctx) = &gpu {
        store.attach_gpu(ctx.clone())?;
    }

    // Load failures are logged by the store and leave it unloaded
    if let Some(path) = &config.terrain.elevation_path {
        let _ = store.load_elevation(path);
    }
    if let Some(path) = &config.terrain.diffuse_path {
        let _ = store.load_diffuse(path);
    }

    let engine = PlacementEngine::new(config.placement.clone(), transform)?;
    let placements = if store.is_elevation_ready() {
        engine.generate_seeded(&store)?
    } else {
        log::warn!("[main] Elevation not loaded, no objects placed and snapshot skipped");
        PlacementResult::default()
    };

    if let Some(path) = &config.output.placements_path {
        placements
            .write_json(path)
            .with_context(|| format!("writing placements {}", path.display()))?;
    }

    let snapshot_target = config
        .output
        .snapshot_path
        .as_ref()
        .filter(|_| store.is_elevation_ready());
    if let (Some(path), Some(ctx)) = (snapshot_target, &gpu) {
        let mesh = TerrainMesh::upload(&ctx.device, &grid);
        let scene = SnapshotScene {
            store: &store,
            mesh: &mesh,
            placements: &placements,
            transform: &transform,
            object_scale: config.placement.object_scale,
            wireframe: config.output.wireframe,
        };
        let image = pollster::block_on(render_snapshot(
            ctx,
            &scene,
            config.output.snapshot_width,
            config.output.snapshot_height,
        ))?;
        image
            .save(path)
            .with_context(|| format!("saving snapshot {}", path.display()))?;
        log::info!("[main] Snapshot written to {}", path.display());
    }

    log_summary(&store, &placements);
    Ok(())
}

fn log_summary(store: &HeightFieldStore, placements: &PlacementResult) {
    log::info!(
        "[main] Scene ready: elevation {:?}, diffuse {:?}, {} objects from {} samples{}",
        store.elevation_path(),
        store.diffuse_path(),
        placements.len(),
        placements.samples_taken(),
        if placements.cap_reached() { " (cap reached)" } else { "" }
    );
}
