use wgpu::util::DeviceExt;

use super::grid::TerrainGrid;

/// Static terrain geometry on the GPU.
///
/// Buffers are written once at upload and never mutated; dropping the mesh
/// releases them.
pub struct TerrainMesh {
    position_buffer: wgpu::Buffer,
    tex_coord_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    vertex_count: u32,
    index_count: u32,
    tessellation: u32,
}

impl TerrainMesh {
    pub fn upload(device: &wgpu::Device, grid: &TerrainGrid) -> Self {
        log::info!(
            "[TerrainMesh::upload] Uploading terrain grid: tessellation {}, {} vertices, {} indices",
            grid.tessellation(),
            grid.vertex_count(),
            grid.index_count()
        );

        let position_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Terrain Position Buffer"),
            contents: bytemuck::cast_slice(grid.positions()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let tex_coord_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Terrain TexCoord Buffer"),
            contents: bytemuck::cast_slice(grid.tex_coords()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Terrain Index Buffer"),
            contents: bytemuck::cast_slice(grid.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            position_buffer,
            tex_coord_buffer,
            index_buffer,
            vertex_count: grid.vertex_count() as u32,
            index_count: grid.index_count() as u32,
            tessellation: grid.tessellation(),
        }
    }

    /// One indexed draw over the whole grid
    pub fn draw<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        render_pass.set_vertex_buffer(0, self.position_buffer.slice(..));
        render_pass.set_vertex_buffer(1, self.tex_coord_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn tessellation(&self) -> u32 {
        self.tessellation
    }
}
