use image::{Rgba, RgbaImage};

use crate::constants::render::{
    CLEAR_COLOR, COLOR_FORMAT, COPY_BYTES_PER_ROW_ALIGNMENT, DEPTH_FORMAT,
};
use crate::error::{gpu_operation_error, TerrainError, TerrainResult};
use crate::gpu::GpuContext;
use crate::heightfield::HeightFieldStore;
use crate::mesh::TerrainMesh;
use crate::placement::PlacementResult;
use crate::transform::TerrainTransform;

use super::{ObjectRenderer, SceneCamera, TerrainRenderer};

const BYTES_PER_PIXEL: u32 = 4;

/// Row pitch the buffer copy requires for a given image width
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * BYTES_PER_PIXEL;
    let align = COPY_BYTES_PER_ROW_ALIGNMENT;
    (unpadded + align - 1) / align * align
}

/// Strip copy-alignment padding from each row
pub fn unpad_rows(data: &[u8], width: u32, height: u32) -> TerrainResult<RgbaImage> {
    let padded = padded_bytes_per_row(width) as usize;
    let unpadded = (width * BYTES_PER_PIXEL) as usize;
    let expected = padded * height as usize;
    if data.len() < expected {
        return Err(TerrainError::Gpu {
            operation: "snapshot readback".to_string(),
            error: format!("expected {} bytes, got {}", expected, data.len()),
        });
    }

    let mut image = RgbaImage::new(width, height);
    for (y, row) in data.chunks_exact(padded).take(height as usize).enumerate() {
        for (x, px) in row[..unpadded].chunks_exact(4).enumerate() {
            image.put_pixel(x as u32, y as u32, Rgba([px[0], px[1], px[2], px[3]]));
        }
    }
    Ok(image)
}

/// Everything the offscreen render needs, borrowed from the caller
pub struct SnapshotScene<'a> {
    pub store: &'a HeightFieldStore,
    pub mesh: &'a TerrainMesh,
    pub placements: &'a PlacementResult,
    pub transform: &'a TerrainTransform,
    pub object_scale: f32,
    /// Draw the terrain as lines when the device supports it
    pub wireframe: bool,
}

/// Render the terrain and its placed objects into an offscreen target and
/// read the pixels back.
pub async fn render_snapshot(
    ctx: &GpuContext,
    scene: &SnapshotScene<'_>,
    width: u32,
    height: u32,
) -> TerrainResult<RgbaImage> {
    let device = &ctx.device;
    let queue = &ctx.queue;

    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let color_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Snapshot Color Texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: COLOR_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let color_view = color_texture.create_view(&wgpu::TextureViewDescriptor::default());

    let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Snapshot Depth Texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());

    let mut terrain = TerrainRenderer::new(ctx, COLOR_FORMAT, scene.transform, scene.wireframe);
    terrain.bind_height_field(ctx, scene.store)?;

    let mut objects = ObjectRenderer::new(device, COLOR_FORMAT);
    objects.set_instances(device, &scene.placements.instance_data(scene.object_scale));

    let view_proj = SceneCamera::new(width, height).view_proj();
    terrain.prepare(queue, view_proj);
    objects.prepare(queue, view_proj);

    let padded_row = padded_bytes_per_row(width);
    let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Snapshot Staging Buffer"),
        size: (padded_row * height) as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Snapshot Encoder"),
    });

    {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Snapshot Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        terrain.draw(&mut render_pass, scene.mesh)?;
        objects.draw(&mut render_pass);
    }

    encoder.copy_texture_to_buffer(
        wgpu::ImageCopyTexture {
            texture: &color_texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::ImageCopyBuffer {
            buffer: &staging_buffer,
            layout: wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(padded_row),
                rows_per_image: Some(height),
            },
        },
        size,
    );

    queue.submit(Some(encoder.finish()));

    let buffer_slice = staging_buffer.slice(..);
    let (tx, rx) = futures::channel::oneshot::channel();
    buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
        // Receiver only disappears if the caller gave up on the snapshot
        let _ = tx.send(result);
    });

    device.poll(wgpu::Maintain::Wait);
    rx.await
        .map_err(|e| gpu_operation_error("snapshot map_async", e))?
        .map_err(|e| gpu_operation_error("snapshot map_async", e))?;

    let data = buffer_slice.get_mapped_range();
    let image = unpad_rows(&data, width, height)?;

    // Mapped range must be dropped before unmapping
    drop(data);
    staging_buffer.unmap();

    log::info!(
        "[render_snapshot] Rendered {}x{} snapshot with {} objects",
        width,
        height,
        scene.placements.len()
    );
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_padding() {
        assert_eq!(padded_bytes_per_row(64), 256);
        assert_eq!(padded_bytes_per_row(65), 512);
        assert_eq!(padded_bytes_per_row(1), 256);
        assert_eq!(padded_bytes_per_row(1280), 5120);
    }

    #[test]
    fn test_unpad_rows_drops_padding() {
        let width = 3;
        let height = 2;
        let pitch = padded_bytes_per_row(width) as usize;
        let mut data = vec![0xAAu8; pitch * height as usize];
        for y in 0..height as usize {
            for x in 0..width as usize {
                let o = y * pitch + x * 4;
                data[o..o + 4].copy_from_slice(&[x as u8, y as u8, 7, 255]);
            }
        }

        let image = unpad_rows(&data, width, height).unwrap();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(2, 1), &Rgba([2, 1, 7, 255]));
    }

    #[test]
    fn test_unpad_rows_rejects_short_buffer() {
        assert!(unpad_rows(&[0u8; 16], 4, 4).is_err());
    }
}
