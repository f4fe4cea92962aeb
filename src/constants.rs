// Terrain Scene Constants - SINGLE SOURCE OF TRUTH
//
// Every tunable default used by the terrain, placement and renderer code
// lives here. The terrain shader receives the height scale through a
// uniform, never as a literal.
//
// CRITICAL: Do NOT define these values anywhere else in the codebase!

/// Terrain mesh and height field constants
pub mod terrain {
    /// Vertical scale applied to raw elevation samples.
    /// Shared by `HeightFieldStore::sample_height` and the terrain shader.
    pub const HEIGHT_SCALE: f32 = 10.0;

    /// Default grid subdivisions per side
    pub const DEFAULT_TESSELLATION: u32 = 512;

    /// Largest tessellation whose (T+1)² vertices still fit in u32 indices
    pub const MAX_TESSELLATION: u32 = 65_534;

    /// World extent of the terrain along X and Z (world units)
    pub const WORLD_SCALE_X: f32 = 100.0;
    pub const WORLD_SCALE_Z: f32 = 100.0;

    /// Exponent applied to normalized LDR elevation samples on decode.
    /// Float sources are never gamma-adjusted.
    pub const LDR_DECODE_GAMMA: f32 = 2.2;

    /// Domain covered by the generated grid before the model transform
    pub const GRID_MIN: f32 = -1.0;
    pub const GRID_EXTENT: f32 = 2.0;
}

/// Object placement constants
pub mod placement {
    /// Cells per side of the jittered sampling grid
    pub const GRID_RESOLUTION: u32 = 50;

    /// Largest accepted grid resolution. Keeps the jitter span of the last
    /// cell well above f32 spacing near u = 1.
    pub const MAX_GRID_RESOLUTION: u32 = 16_384;

    /// Acceptance band for scaled elevation (world units)
    pub const MIN_HEIGHT: f32 = 0.1;
    pub const MAX_HEIGHT: f32 = 1.0;

    /// Population cap
    pub const MAX_OBJECTS: usize = 500;

    /// Jitter span as a fraction of one cell
    pub const JITTER_FRACTION: f32 = 0.5;

    /// Uniform scale applied to each placed object's model matrix
    pub const OBJECT_SCALE: f32 = 0.2;
}

/// Renderer and snapshot constants
pub mod render {
    pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// wgpu requires buffer-to-texture copies to use 256-byte row pitch
    pub const COPY_BYTES_PER_ROW_ALIGNMENT: u32 = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

    pub const SNAPSHOT_WIDTH: u32 = 1280;
    pub const SNAPSHOT_HEIGHT: u32 = 720;

    /// Camera used for snapshots (degrees, world units)
    pub const FOV_Y_DEGREES: f32 = 45.0;
    pub const ZNEAR: f32 = 5.0;
    pub const ZFAR: f32 = 2000.0;
    pub const CAMERA_POSITION: [f32; 3] = [0.0, 60.0, 90.0];

    pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
        r: 0.2,
        g: 0.2,
        b: 0.8,
        a: 1.0,
    };
}
