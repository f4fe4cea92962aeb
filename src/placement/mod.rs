//! Jittered-grid placement of secondary objects on the terrain

mod config;
mod engine;
mod instance;

pub use config::{JitterMode, PlacementConfig};
pub use engine::{PlacedObject, PlacementEngine, PlacementResult};
pub use instance::{instance_transform, InstanceRaw};
