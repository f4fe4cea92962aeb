//! Height-field terrain: grid mesh generation, elevation and diffuse
//! loading with point sampling, and jittered-grid object placement.

pub mod config;
pub mod constants;
pub mod error;
pub mod gpu;
pub mod heightfield;
pub mod mesh;
pub mod placement;
pub mod renderer;
pub mod transform;

pub use config::{OutputConfig, SceneConfig, TerrainConfig};
pub use error::{TerrainError, TerrainResult};
pub use gpu::{GpuContext, GpuTexture};
pub use heightfield::{DiffuseImage, ElevationMap, HeightFieldStore, HeightSampler};
pub use mesh::{TerrainGrid, TerrainMesh};
pub use placement::{JitterMode, PlacedObject, PlacementConfig, PlacementEngine, PlacementResult};
pub use transform::TerrainTransform;
