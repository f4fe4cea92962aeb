use std::path::Path;

use image::{DynamicImage, RgbImage, RgbaImage};

use crate::error::{image_decode_error, TerrainResult};

/// Decoded 3-channel diffuse raster, flipped like the elevation map
#[derive(Debug, Clone, PartialEq)]
pub struct DiffuseImage {
    image: RgbImage,
}

impl DiffuseImage {
    pub fn load(path: impl AsRef<Path>) -> TerrainResult<Self> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|e| image_decode_error(path, e))?;
        if image.width() == 0 || image.height() == 0 {
            return Err(image_decode_error(path, "image has no pixels"));
        }
        Ok(Self::from_image(image))
    }

    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            image: image.flipv().to_rgb8(),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Pixel at texel coordinates, row 0 at v = 0
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.image.get_pixel(x, y).0
    }

    /// Expand to RGBA with opaque alpha for upload
    pub fn to_rgba(&self) -> RgbaImage {
        DynamicImage::ImageRgb8(self.image.clone()).to_rgba8()
    }
}
