//! Offscreen terrain rendering: displaced grid, instanced object markers
//! and pixel readback

mod camera;
mod object_renderer;
mod snapshot;
mod terrain_renderer;

pub use camera::SceneCamera;
pub use object_renderer::{marker_mesh, MarkerVertex, ObjectRenderer};
pub use snapshot::{padded_bytes_per_row, render_snapshot, unpad_rows, SnapshotScene};
pub use terrain_renderer::{terrain_polygon_mode, TerrainRenderer, TerrainUniform};
