//! Offscreen rendering on whatever adapter is available.
//!
//! Skips when the machine has no usable GPU or software fallback.

use image::{DynamicImage, RgbImage};
use terrain_scene::gpu::GpuContext;
use terrain_scene::mesh::{TerrainGrid, TerrainMesh};
use terrain_scene::renderer::{render_snapshot, SnapshotScene};
use terrain_scene::{
    DiffuseImage, ElevationMap, HeightFieldStore, PlacementResult, TerrainError, TerrainTransform,
};

fn gpu() -> Option<GpuContext> {
    match pollster::block_on(GpuContext::new_headless()) {
        Ok(ctx) => Some(ctx),
        Err(e) => {
            eprintln!("skipping GPU test: {}", e);
            None
        }
    }
}

#[test]
fn test_store_uploads_textures_when_gpu_attached() {
    let Some(ctx) = gpu() else { return };

    let mut store = HeightFieldStore::new(1.0);
    store
        .set_elevation(ElevationMap::constant(8, 4, 0.25).unwrap())
        .unwrap();
    assert!(store.elevation_texture().is_none());

    store.attach_gpu(ctx).unwrap();
    let texture = store.elevation_texture().unwrap();
    assert_eq!((texture.width, texture.height), (8, 4));
    assert_eq!(texture.mip_level_count, 4);
    assert_eq!(texture.format, wgpu::TextureFormat::R32Float);
    assert!(store.diffuse_texture().is_none());

    // Height queries never touch the texture
    assert_eq!(store.sample_height(0.5, 0.5).unwrap(), 0.25);
}

#[test]
fn test_snapshot_shows_terrain_against_sky() {
    let Some(ctx) = gpu() else { return };

    let mut store = HeightFieldStore::new(10.0);
    store.attach_gpu(ctx.clone()).unwrap();
    store
        .set_elevation(ElevationMap::constant(4, 4, 0.0).unwrap())
        .unwrap();
    let red = RgbImage::from_pixel(4, 4, image::Rgb([255, 0, 0]));
    store
        .set_diffuse(DiffuseImage::from_image(DynamicImage::ImageRgb8(red)))
        .unwrap();

    let grid = TerrainGrid::generate(8).unwrap();
    let mesh = TerrainMesh::upload(&ctx.device, &grid);
    let transform = TerrainTransform::default();
    let placements = PlacementResult::default();
    let scene = SnapshotScene {
        store: &store,
        mesh: &mesh,
        placements: &placements,
        transform: &transform,
        object_scale: 0.2,
        wireframe: false,
    };

    let image = pollster::block_on(render_snapshot(&ctx, &scene, 64, 48)).unwrap();
    assert_eq!(image.dimensions(), (64, 48));

    // The camera looks down at the origin, so the centre is terrain and the
    // top edge is past the far side of the terrain
    let centre = image.get_pixel(32, 24).0;
    let sky = image.get_pixel(0, 0).0;
    assert!(centre[0] > 200 && centre[1] < 50, "centre pixel {:?}", centre);
    assert!(sky[2] > sky[0], "sky pixel {:?}", sky);
}

#[test]
fn test_snapshot_requires_elevation() {
    let Some(ctx) = gpu() else { return };

    let store = HeightFieldStore::default();
    let grid = TerrainGrid::generate(2).unwrap();
    let mesh = TerrainMesh::upload(&ctx.device, &grid);
    let transform = TerrainTransform::default();
    let placements = PlacementResult::default();
    let scene = SnapshotScene {
        store: &store,
        mesh: &mesh,
        placements: &placements,
        transform: &transform,
        object_scale: 0.2,
        wireframe: false,
    };

    assert!(matches!(
        pollster::block_on(render_snapshot(&ctx, &scene, 16, 16)),
        Err(TerrainError::ElevationNotLoaded)
    ));
}
