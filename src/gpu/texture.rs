//! Owned GPU textures for the height field.
//!
//! wgpu has no `generateMipmap`, so mip chains are built on the CPU and
//! every level is written with `Queue::write_texture`.

use image::{imageops, RgbaImage};

use super::GpuContext;
use crate::heightfield::{DiffuseImage, ElevationMap};

/// Number of levels in a full mip chain down to 1x1
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

fn next_mip_extent(extent: u32) -> u32 {
    (extent / 2).max(1)
}

/// One mip level of an `R32Float` texture
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationLevel {
    pub width: u32,
    pub height: u32,
    pub samples: Vec<f32>,
}

/// Box-filtered mip chain for elevation data.
///
/// Float elevation may exceed 1.0, so this avoids `imageops` filters that
/// clamp to the subpixel's nominal range.
pub fn elevation_mip_chain(map: &ElevationMap) -> Vec<ElevationLevel> {
    let levels = mip_level_count(map.width(), map.height());
    let mut chain = Vec::with_capacity(levels as usize);
    chain.push(ElevationLevel {
        width: map.width(),
        height: map.height(),
        samples: map.samples().to_vec(),
    });

    for _ in 1..levels {
        let Some(prev) = chain.last() else { break };
        let width = next_mip_extent(prev.width);
        let height = next_mip_extent(prev.height);
        let mut samples = Vec::with_capacity(width as usize * height as usize);

        for y in 0..height {
            for x in 0..width {
                let mut sum = 0.0;
                let mut count = 0.0;
                for sy in (y * 2)..((y * 2 + 2).min(prev.height)) {
                    for sx in (x * 2)..((x * 2 + 2).min(prev.width)) {
                        sum += prev.samples[(sy * prev.width + sx) as usize];
                        count += 1.0;
                    }
                }
                samples.push(sum / count);
            }
        }

        chain.push(ElevationLevel {
            width,
            height,
            samples,
        });
    }

    chain
}

/// Triangle-filtered mip chain for 8-bit color
pub fn color_mip_chain(base: RgbaImage) -> Vec<RgbaImage> {
    let levels = mip_level_count(base.width(), base.height());
    let mut chain = Vec::with_capacity(levels as usize);
    chain.push(base);

    for _ in 1..levels {
        let Some(prev) = chain.last() else { break };
        let next = imageops::resize(
            prev,
            next_mip_extent(prev.width()),
            next_mip_extent(prev.height()),
            imageops::FilterType::Triangle,
        );
        chain.push(next);
    }

    chain
}

/// Texture, view and sampler released together on drop
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub format: wgpu::TextureFormat,
    pub width: u32,
    pub height: u32,
    pub mip_level_count: u32,
    pub filterable: bool,
}

impl GpuTexture {
    /// `R32Float` elevation texture, edge-clamped, linear when the device
    /// can filter 32-bit floats
    pub fn from_elevation(ctx: &GpuContext, map: &ElevationMap) -> Self {
        let filterable = ctx.float32_filterable();
        let filter = if filterable {
            wgpu::FilterMode::Linear
        } else {
            wgpu::FilterMode::Nearest
        };

        let chain = elevation_mip_chain(map);
        let levels: Vec<(u32, u32, &[u8])> = chain
            .iter()
            .map(|level| (level.width, level.height, bytemuck::cast_slice::<f32, u8>(&level.samples)))
            .collect();

        Self::create(
            ctx,
            "Elevation Texture",
            wgpu::TextureFormat::R32Float,
            4,
            &levels,
            wgpu::SamplerDescriptor {
                label: Some("Elevation Sampler"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: filter,
                min_filter: filter,
                mipmap_filter: wgpu::FilterMode::Nearest,
                ..Default::default()
            },
            filterable,
        )
    }

    /// Trilinear sRGB diffuse texture
    pub fn from_diffuse(ctx: &GpuContext, diffuse: &DiffuseImage) -> Self {
        Self::from_rgba(ctx, "Diffuse Texture", diffuse.to_rgba())
    }

    /// 1x1 texture used when no diffuse map is loaded
    pub fn solid_color(ctx: &GpuContext, rgba: [u8; 4]) -> Self {
        Self::from_rgba(ctx, "Solid Color Texture", RgbaImage::from_pixel(1, 1, image::Rgba(rgba)))
    }

    fn from_rgba(ctx: &GpuContext, label: &str, image: RgbaImage) -> Self {
        let chain = color_mip_chain(image);
        let levels: Vec<(u32, u32, &[u8])> = chain
            .iter()
            .map(|level| (level.width(), level.height(), level.as_raw().as_slice()))
            .collect();

        Self::create(
            ctx,
            label,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            4,
            &levels,
            wgpu::SamplerDescriptor {
                label: Some("Diffuse Sampler"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                mipmap_filter: wgpu::FilterMode::Linear,
                ..Default::default()
            },
            true,
        )
    }

    fn create(
        ctx: &GpuContext,
        label: &str,
        format: wgpu::TextureFormat,
        bytes_per_texel: u32,
        levels: &[(u32, u32, &[u8])],
        sampler: wgpu::SamplerDescriptor,
        filterable: bool,
    ) -> Self {
        let (width, height) = levels.first().map(|&(w, h, _)| (w, h)).unwrap_or((1, 1));
        let mip_level_count = levels.len().max(1) as u32;

        log::debug!(
            "[GpuTexture::create] {} {}x{} {:?} with {} mip levels",
            label,
            width,
            height,
            format,
            mip_level_count
        );

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (mip_level, &(level_width, level_height, data)) in levels.iter().enumerate() {
            ctx.queue.write_texture(
                wgpu::ImageCopyTexture {
                    texture: &texture,
                    mip_level: mip_level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                data,
                wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(level_width * bytes_per_texel),
                    rows_per_image: Some(level_height),
                },
                wgpu::Extent3d {
                    width: level_width,
                    height: level_height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = ctx.device.create_sampler(&sampler);

        Self {
            texture,
            view,
            sampler,
            format,
            width,
            height,
            mip_level_count,
            filterable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mip_level_count() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(2, 1), 2);
        assert_eq!(mip_level_count(512, 512), 10);
        assert_eq!(mip_level_count(640, 480), 10);
    }

    #[test]
    fn test_elevation_mip_chain_averages_without_clamping() {
        let map = ElevationMap::from_raw(2, 2, vec![10.0, 20.0, 30.0, 40.0]).unwrap();
        let chain = elevation_mip_chain(&map);
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[1].width, 1);
        assert_eq!(chain[1].samples, vec![25.0]);
    }

    #[test]
    fn test_elevation_mip_chain_handles_odd_sizes() {
        let map = ElevationMap::constant(5, 3, 2.0).unwrap();
        let chain = elevation_mip_chain(&map);
        let last = chain.last().unwrap();
        assert_eq!((last.width, last.height), (1, 1));
        assert_eq!(chain.len() as u32, mip_level_count(5, 3));
        assert!(chain.iter().all(|level| level.samples.iter().all(|&s| s == 2.0)));
    }

    #[test]
    fn test_color_mip_chain_ends_at_one_pixel() {
        let chain = color_mip_chain(RgbaImage::new(8, 2));
        let extents: Vec<_> = chain.iter().map(|l| l.dimensions()).collect();
        assert_eq!(extents, vec![(8, 2), (4, 1), (2, 1), (1, 1)]);
    }
}
