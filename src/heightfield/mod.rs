//! Height field storage and point sampling

mod diffuse;
mod elevation;
mod store;

pub use diffuse::DiffuseImage;
pub use elevation::ElevationMap;
pub use store::HeightFieldStore;

use crate::error::TerrainResult;

/// Anything that can answer scaled elevation queries over the unit square.
///
/// Implementations must be pure functions of their stored state: the same
/// (u, v) always yields the same result.
pub trait HeightSampler {
    fn sample_height(&self, u: f32, v: f32) -> TerrainResult<f32>;
}

impl<S: HeightSampler + ?Sized> HeightSampler for &S {
    fn sample_height(&self, u: f32, v: f32) -> TerrainResult<f32> {
        (**self).sample_height(u, v)
    }
}
