use std::path::Path;

use image::{ColorType, DynamicImage};

use crate::error::{image_decode_error, TerrainError, TerrainResult};

/// Decoded single-channel elevation raster.
///
/// Rows are stored bottom-up: row 0 is the bottom edge of the source image,
/// so row `height - 1` is read at v = 1.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationMap {
    width: u32,
    height: u32,
    samples: Vec<f32>,
}

impl ElevationMap {
    /// Build a map from raw row-major samples (row 0 at v = 0)
    pub fn from_raw(width: u32, height: u32, samples: Vec<f32>) -> TerrainResult<Self> {
        if width == 0 || height == 0 {
            return Err(TerrainError::InvalidConfig(format!(
                "elevation map must be non-empty, got {}x{}",
                width, height
            )));
        }
        let expected = width as usize * height as usize;
        if samples.len() != expected {
            return Err(TerrainError::InvalidConfig(format!(
                "elevation map {}x{} needs {} samples, got {}",
                width,
                height,
                expected,
                samples.len()
            )));
        }

        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Constant-valued map, mostly useful for tests and placeholders
    pub fn constant(width: u32, height: u32, value: f32) -> TerrainResult<Self> {
        Self::from_raw(width, height, vec![value; width as usize * height as usize])
    }

    /// Decode an elevation image from disk.
    ///
    /// LDR sources are normalized to [0, 1] and raised to `ldr_gamma`.
    pub fn load(path: impl AsRef<Path>, ldr_gamma: f32) -> TerrainResult<Self> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|e| image_decode_error(path, e))?;
        Self::from_image(image, ldr_gamma).map_err(|e| match e {
            TerrainError::InvalidConfig(msg) => image_decode_error(path, msg),
            other => other,
        })
    }

    /// Convert a decoded image, flipping it so the top row lands at v = 1
    pub fn from_image(image: DynamicImage, ldr_gamma: f32) -> TerrainResult<Self> {
        let is_float = matches!(image.color(), ColorType::Rgb32F | ColorType::Rgba32F);
        let luma = image.flipv().to_luma32f();
        let (width, height) = luma.dimensions();

        let mut samples = luma.into_raw();
        if !is_float && ldr_gamma != 1.0 {
            for sample in samples.iter_mut() {
                *sample = sample.powf(ldr_gamma);
            }
        }

        Self::from_raw(width, height, samples)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Raw sample at integer texel coordinates
    pub fn texel(&self, x: u32, y: u32) -> f32 {
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        self.samples[y * self.width as usize + x]
    }

    /// Texel addressed by (u, v): inputs are clamped to [0, 1] and floored,
    /// never interpolated. NaN maps to the first texel.
    pub fn texel_coords(&self, u: f32, v: f32) -> (u32, u32) {
        let u = u.clamp(0.0, 1.0);
        let v = v.clamp(0.0, 1.0);
        let x = (u * (self.width - 1) as f32).floor() as u32;
        let y = (v * (self.height - 1) as f32).floor() as u32;
        (x, y)
    }

    /// Unscaled sample at (u, v)
    pub fn sample(&self, u: f32, v: f32) -> f32 {
        let (x, y) = self.texel_coords(u, v);
        self.texel(x, y)
    }

    /// Smallest and largest raw sample
    pub fn range(&self) -> (f32, f32) {
        self.samples
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &s| {
                (lo.min(s), hi.max(s))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb32FImage};

    fn ramp(width: u32, height: u32) -> ElevationMap {
        let samples = (0..width * height).map(|i| i as f32).collect();
        ElevationMap::from_raw(width, height, samples).unwrap()
    }

    #[test]
    fn test_corners_address_first_and_last_texel() {
        let map = ramp(4, 3);
        assert_eq!(map.sample(0.0, 0.0), 0.0);
        assert_eq!(map.sample(1.0, 1.0), 11.0);
        assert_eq!(map.texel_coords(1.0, 0.0), (3, 0));
    }

    #[test]
    fn test_sampling_floors_instead_of_rounding() {
        let map = ramp(5, 1);
        // 0.99 * 4 = 3.96 -> texel 3
        assert_eq!(map.sample(0.99, 0.0), 3.0);
        assert_eq!(map.sample(0.2499, 0.0), 0.0);
        assert_eq!(map.sample(0.25, 0.0), 1.0);
    }

    #[test]
    fn test_out_of_range_inputs_clamp() {
        let map = ramp(4, 4);
        assert_eq!(map.sample(-5.0, 10.0), map.sample(0.0, 1.0));
        assert_eq!(map.sample(f32::NAN, 0.0), map.sample(0.0, 0.0));
    }

    #[test]
    fn test_single_texel_map() {
        let map = ElevationMap::constant(1, 1, 0.75).unwrap();
        assert_eq!(map.sample(0.3, 0.9), 0.75);
    }

    #[test]
    fn test_from_raw_rejects_wrong_length() {
        assert!(ElevationMap::from_raw(2, 2, vec![0.0; 3]).is_err());
        assert!(ElevationMap::from_raw(0, 2, vec![]).is_err());
    }

    #[test]
    fn test_image_is_flipped_vertically() {
        // Top row of the file is bright, bottom row is dark
        let mut gray = GrayImage::new(2, 2);
        gray.put_pixel(0, 0, Luma([255]));
        gray.put_pixel(1, 0, Luma([255]));
        let map = ElevationMap::from_image(DynamicImage::ImageLuma8(gray), 1.0).unwrap();

        assert_eq!(map.sample(0.0, 1.0), 1.0);
        assert_eq!(map.sample(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_ldr_gamma_applied_only_to_ldr_sources() {
        let gray = GrayImage::from_pixel(1, 1, Luma([128]));
        let linear = ElevationMap::from_image(DynamicImage::ImageLuma8(gray.clone()), 1.0).unwrap();
        let curved = ElevationMap::from_image(DynamicImage::ImageLuma8(gray), 2.2).unwrap();
        let expected = linear.texel(0, 0).powf(2.2);
        assert!((curved.texel(0, 0) - expected).abs() < 1e-6);

        let float = Rgb32FImage::from_pixel(1, 1, image::Rgb([0.5, 0.5, 0.5]));
        let map = ElevationMap::from_image(DynamicImage::ImageRgb32F(float), 2.2).unwrap();
        assert!((map.texel(0, 0) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_range() {
        let map = ramp(3, 2);
        assert_eq!(map.range(), (0.0, 5.0));
    }
}
