//! Loading elevation and diffuse images from disk through the store

use image::{GrayImage, Luma, Rgb, RgbImage};
use tempfile::TempDir;
use terrain_scene::{HeightFieldStore, HeightSampler, TerrainError};

/// 2x2 grayscale: top row white, bottom row black
fn write_split_elevation(dir: &TempDir) -> std::path::PathBuf {
    let mut img = GrayImage::new(2, 2);
    img.put_pixel(0, 0, Luma([255]));
    img.put_pixel(1, 0, Luma([255]));
    img.put_pixel(0, 1, Luma([0]));
    img.put_pixel(1, 1, Luma([0]));
    let path = dir.path().join("elevation.png");
    img.save(&path).unwrap();
    path
}

#[test]
fn test_png_elevation_is_flipped_and_scaled() {
    let dir = TempDir::new().unwrap();
    let path = write_split_elevation(&dir);

    let mut store = HeightFieldStore::new(10.0);
    store.load_elevation(&path).unwrap();
    assert!(store.is_elevation_ready());
    assert_eq!(store.elevation_path(), Some(path.as_path()));

    // v = 0 is the bottom row of the image
    assert_eq!(store.sample_height(0.0, 0.0).unwrap(), 0.0);
    assert_eq!(store.sample_height(1.0, 0.0).unwrap(), 0.0);
    assert!((store.sample_height(0.0, 1.0).unwrap() - 10.0).abs() < 1e-5);
    assert!((store.sample_height(1.0, 1.0).unwrap() - 10.0).abs() < 1e-5);
}

#[test]
fn test_missing_elevation_leaves_store_unloaded() {
    let dir = TempDir::new().unwrap();
    let mut store = HeightFieldStore::default();

    let err = store
        .load_elevation(dir.path().join("does_not_exist.png"))
        .unwrap_err();
    assert!(matches!(err, TerrainError::ImageDecode { .. }));
    assert!(!store.is_elevation_ready());
    assert!(matches!(
        store.sample_height(0.5, 0.5),
        Err(TerrainError::ElevationNotLoaded)
    ));
}

#[test]
fn test_corrupt_file_keeps_previous_elevation() {
    let dir = TempDir::new().unwrap();
    let good = write_split_elevation(&dir);
    let bad = dir.path().join("corrupt.png");
    std::fs::write(&bad, b"definitely not a png").unwrap();

    let mut store = HeightFieldStore::new(1.0);
    store.load_elevation(&good).unwrap();
    let before = store.sample_height(0.0, 1.0).unwrap();

    assert!(store.load_elevation(&bad).is_err());
    assert_eq!(store.sample_height(0.0, 1.0).unwrap(), before);
    assert_eq!(store.elevation_path(), Some(good.as_path()));
}

#[test]
fn test_diffuse_loads_independently_of_elevation() {
    let dir = TempDir::new().unwrap();
    let mut img = RgbImage::new(4, 2);
    img.put_pixel(0, 0, Rgb([200, 10, 20]));
    let path = dir.path().join("diffuse.png");
    img.save(&path).unwrap();

    let mut store = HeightFieldStore::default();
    store.load_diffuse(&path).unwrap();
    assert!(store.is_diffuse_ready());
    assert!(!store.is_elevation_ready());

    let diffuse = store.diffuse().unwrap();
    assert_eq!((diffuse.width(), diffuse.height()), (4, 2));
    // Top-left of the file becomes the last row after the flip
    assert_eq!(diffuse.pixel(0, 1), [200, 10, 20]);
}

#[test]
fn test_store_answers_through_sampler_trait() {
    let dir = TempDir::new().unwrap();
    let path = write_split_elevation(&dir);
    let mut store = HeightFieldStore::new(2.0);
    store.load_elevation(&path).unwrap();

    fn query(sampler: &dyn HeightSampler) -> f32 {
        sampler.sample_height(0.5, 1.0).unwrap()
    }
    assert!((query(&store) - 2.0).abs() < 1e-5);
}
