use std::path::{Path, PathBuf};

use super::{DiffuseImage, ElevationMap, HeightSampler};
use crate::constants::terrain::{HEIGHT_SCALE, LDR_DECODE_GAMMA};
use crate::error::{TerrainError, TerrainResult};
use crate::gpu::{GpuContext, GpuTexture};

/// Owns the decoded elevation and diffuse rasters and, when a GPU is
/// attached, their texture projections.
///
/// The CPU copy of the elevation is authoritative for `sample_height`; the
/// texture is derived from it and never read back. Loads that fail leave
/// every field untouched.
pub struct HeightFieldStore {
    height_scale: f32,
    elevation_gamma: f32,

    elevation: Option<ElevationMap>,
    elevation_path: Option<PathBuf>,
    diffuse: Option<DiffuseImage>,
    diffuse_path: Option<PathBuf>,

    gpu: Option<GpuContext>,
    elevation_texture: Option<GpuTexture>,
    diffuse_texture: Option<GpuTexture>,
}

impl Default for HeightFieldStore {
    fn default() -> Self {
        Self::new(HEIGHT_SCALE)
    }
}

impl HeightFieldStore {
    /// Create an empty CPU-only store
    pub fn new(height_scale: f32) -> Self {
        Self {
            height_scale,
            elevation_gamma: LDR_DECODE_GAMMA,
            elevation: None,
            elevation_path: None,
            diffuse: None,
            diffuse_path: None,
            gpu: None,
            elevation_texture: None,
            diffuse_texture: None,
        }
    }

    /// Exponent applied to LDR elevation sources on load
    pub fn with_elevation_gamma(mut self, gamma: f32) -> Self {
        self.elevation_gamma = gamma;
        self
    }

    /// Attach a GPU. Already-loaded rasters are uploaded immediately.
    pub fn attach_gpu(&mut self, ctx: GpuContext) -> TerrainResult<()> {
        if let Some(map) = &self.elevation {
            check_texture_limits(&ctx, self.elevation_path.as_deref(), map.width(), map.height())?;
        }
        if let Some(diffuse) = &self.diffuse {
            check_texture_limits(&ctx, self.diffuse_path.as_deref(), diffuse.width(), diffuse.height())?;
        }

        self.elevation_texture = self
            .elevation
            .as_ref()
            .map(|map| GpuTexture::from_elevation(&ctx, map));
        self.diffuse_texture = self
            .diffuse
            .as_ref()
            .map(|diffuse| GpuTexture::from_diffuse(&ctx, diffuse));
        self.gpu = Some(ctx);
        Ok(())
    }

    /// Decode an elevation image and make it the active height field.
    ///
    /// On failure the error is logged and returned; previously loaded
    /// elevation stays in place.
    pub fn load_elevation(&mut self, path: impl AsRef<Path>) -> TerrainResult<()> {
        let path = path.as_ref();
        let result = ElevationMap::load(path, self.elevation_gamma)
            .and_then(|map| self.commit_elevation(map, Some(path.to_path_buf())));

        match &result {
            Ok(()) => {
                if let Some(map) = &self.elevation {
                    let (lo, hi) = map.range();
                    log::info!(
                        "[HeightFieldStore::load_elevation] Loaded height field {:?} ({}x{}, raw range {:.3}..{:.3})",
                        path,
                        map.width(),
                        map.height(),
                        lo,
                        hi
                    );
                }
            }
            Err(e) => log::error!("[HeightFieldStore::load_elevation] {}", e),
        }
        result
    }

    /// Decode a diffuse image. Independent of the elevation state.
    pub fn load_diffuse(&mut self, path: impl AsRef<Path>) -> TerrainResult<()> {
        let path = path.as_ref();
        let result = DiffuseImage::load(path)
            .and_then(|diffuse| self.commit_diffuse(diffuse, Some(path.to_path_buf())));

        match &result {
            Ok(()) => log::info!(
                "[HeightFieldStore::load_diffuse] Loaded diffuse texture {:?}",
                path
            ),
            Err(e) => log::error!("[HeightFieldStore::load_diffuse] {}", e),
        }
        result
    }

    /// Install an in-memory elevation map
    pub fn set_elevation(&mut self, map: ElevationMap) -> TerrainResult<()> {
        self.commit_elevation(map, None)
    }

    /// Install an in-memory diffuse image
    pub fn set_diffuse(&mut self, diffuse: DiffuseImage) -> TerrainResult<()> {
        self.commit_diffuse(diffuse, None)
    }

    fn commit_elevation(&mut self, map: ElevationMap, path: Option<PathBuf>) -> TerrainResult<()> {
        let texture = match &self.gpu {
            Some(ctx) => {
                check_texture_limits(ctx, path.as_deref(), map.width(), map.height())?;
                Some(GpuTexture::from_elevation(ctx, &map))
            }
            None => None,
        };

        self.elevation = Some(map);
        self.elevation_path = path;
        self.elevation_texture = texture;
        Ok(())
    }

    fn commit_diffuse(&mut self, diffuse: DiffuseImage, path: Option<PathBuf>) -> TerrainResult<()> {
        let texture = match &self.gpu {
            Some(ctx) => {
                check_texture_limits(ctx, path.as_deref(), diffuse.width(), diffuse.height())?;
                Some(GpuTexture::from_diffuse(ctx, &diffuse))
            }
            None => None,
        };

        self.diffuse = Some(diffuse);
        self.diffuse_path = path;
        self.diffuse_texture = texture;
        Ok(())
    }

    pub fn is_elevation_ready(&self) -> bool {
        self.elevation.is_some()
    }

    pub fn is_diffuse_ready(&self) -> bool {
        self.diffuse.is_some()
    }

    /// Vertical scale shared by `sample_height` and the terrain shader
    pub fn height_scale(&self) -> f32 {
        self.height_scale
    }

    pub fn elevation(&self) -> Option<&ElevationMap> {
        self.elevation.as_ref()
    }

    pub fn elevation_path(&self) -> Option<&Path> {
        self.elevation_path.as_deref()
    }

    pub fn diffuse(&self) -> Option<&DiffuseImage> {
        self.diffuse.as_ref()
    }

    pub fn diffuse_path(&self) -> Option<&Path> {
        self.diffuse_path.as_deref()
    }

    pub fn elevation_texture(&self) -> Option<&GpuTexture> {
        self.elevation_texture.as_ref()
    }

    pub fn diffuse_texture(&self) -> Option<&GpuTexture> {
        self.diffuse_texture.as_ref()
    }

    /// Scaled elevation at (u, v); inputs outside [0, 1] are clamped
    pub fn sample_height(&self, u: f32, v: f32) -> TerrainResult<f32> {
        let map = self.elevation.as_ref().ok_or(TerrainError::ElevationNotLoaded)?;
        Ok(map.sample(u, v) * self.height_scale)
    }
}

impl HeightSampler for HeightFieldStore {
    fn sample_height(&self, u: f32, v: f32) -> TerrainResult<f32> {
        HeightFieldStore::sample_height(self, u, v)
    }
}

fn check_texture_limits(
    ctx: &GpuContext,
    path: Option<&Path>,
    width: u32,
    height: u32,
) -> TerrainResult<()> {
    let max = ctx.max_texture_dimension_2d();
    if width > max || height > max {
        return Err(TerrainError::TextureTooLarge {
            path: path.map(Path::to_path_buf).unwrap_or_default(),
            width,
            height,
            max,
        });
    }
    Ok(())
}
