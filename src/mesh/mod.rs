//! Terrain grid generation and GPU upload

mod grid;
mod terrain_mesh;
mod vertex;

pub use grid::{validate_tessellation, TerrainGrid};
pub use terrain_mesh::TerrainMesh;
pub use vertex::{PositionVertex, TexCoordVertex};
