//! GPU device acquisition and owned texture resources

mod context;
mod texture;

pub use context::GpuContext;
pub use texture::{color_mip_chain, elevation_mip_chain, mip_level_count, ElevationLevel, GpuTexture};
