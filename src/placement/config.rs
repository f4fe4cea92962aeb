use serde::{Deserialize, Serialize};

use crate::constants::placement::{
    GRID_RESOLUTION, MAX_GRID_RESOLUTION, MAX_HEIGHT, MAX_OBJECTS, MIN_HEIGHT, OBJECT_SCALE,
};
use crate::error::{TerrainError, TerrainResult};

/// Where inside a grid cell the random offset lands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JitterMode {
    /// Offset in [0, span) from the cell's lower corner, matching the
    /// historical tree layout bit for bit given the same random stream
    #[default]
    Quadrant,
    /// Offset in [-span/2, span/2) around the cell center
    Centered,
}

/// Parameters for jittered-grid object placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Cells per side of the sampling grid (G)
    pub grid_resolution: u32,
    /// Inclusive acceptance band on scaled elevation
    pub min_height: f32,
    pub max_height: f32,
    /// Generation stops as soon as this many objects are accepted
    pub max_objects: usize,
    pub jitter: JitterMode,
    /// Fixed seed for reproducible layouts; entropy when absent
    pub seed: Option<u64>,
    /// Uniform scale of each placed object's model matrix
    pub object_scale: f32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            grid_resolution: GRID_RESOLUTION,
            min_height: MIN_HEIGHT,
            max_height: MAX_HEIGHT,
            max_objects: MAX_OBJECTS,
            jitter: JitterMode::Quadrant,
            seed: None,
            object_scale: OBJECT_SCALE,
        }
    }
}

impl PlacementConfig {
    pub fn validate(&self) -> TerrainResult<()> {
        if self.grid_resolution == 0 {
            return Err(TerrainError::InvalidConfig(
                "placement grid_resolution must be at least 1".to_string(),
            ));
        }
        if self.grid_resolution > MAX_GRID_RESOLUTION {
            return Err(TerrainError::InvalidConfig(format!(
                "placement grid_resolution {} exceeds maximum of {}",
                self.grid_resolution, MAX_GRID_RESOLUTION
            )));
        }
        if !self.min_height.is_finite() || !self.max_height.is_finite() {
            return Err(TerrainError::InvalidConfig(format!(
                "placement band must be finite, got [{}, {}]",
                self.min_height, self.max_height
            )));
        }
        if self.min_height > self.max_height {
            return Err(TerrainError::InvalidConfig(format!(
                "placement min_height {} exceeds max_height {}",
                self.min_height, self.max_height
            )));
        }
        if !self.object_scale.is_finite() || self.object_scale <= 0.0 {
            return Err(TerrainError::InvalidConfig(format!(
                "placement object_scale must be positive, got {}",
                self.object_scale
            )));
        }
        Ok(())
    }
}
