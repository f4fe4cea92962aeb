//! Scene configuration loaded from TOML.
//!
//! Every field has a default, so a partial file (or no file at all) yields
//! the stock terrain scene.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::render::{SNAPSHOT_HEIGHT, SNAPSHOT_WIDTH};
use crate::constants::terrain::{
    DEFAULT_TESSELLATION, HEIGHT_SCALE, LDR_DECODE_GAMMA, WORLD_SCALE_X, WORLD_SCALE_Z,
};
use crate::error::{TerrainError, TerrainResult};
use crate::heightfield::HeightFieldStore;
use crate::mesh::validate_tessellation;
use crate::placement::PlacementConfig;
use crate::transform::TerrainTransform;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub terrain: TerrainConfig,
    pub placement: PlacementConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub tessellation: u32,
    pub elevation_path: Option<PathBuf>,
    pub diffuse_path: Option<PathBuf>,
    /// Shared by height queries and the terrain shader
    pub height_scale: f32,
    pub elevation_gamma: f32,
    pub scale_x: f32,
    pub scale_z: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            tessellation: DEFAULT_TESSELLATION,
            elevation_path: Some(PathBuf::from("scenes/nlsFinland/L3123F.png")),
            diffuse_path: Some(PathBuf::from("scenes/nlsFinland/L3123F_downscaled.jpg")),
            height_scale: HEIGHT_SCALE,
            elevation_gamma: LDR_DECODE_GAMMA,
            scale_x: WORLD_SCALE_X,
            scale_z: WORLD_SCALE_Z,
        }
    }
}

impl TerrainConfig {
    pub fn transform(&self) -> TerrainResult<TerrainTransform> {
        TerrainTransform::new(self.scale_x, self.scale_z)
    }

    /// Empty store configured with this terrain's scale and gamma
    pub fn store(&self) -> HeightFieldStore {
        HeightFieldStore::new(self.height_scale).with_elevation_gamma(self.elevation_gamma)
    }

    pub fn validate(&self) -> TerrainResult<()> {
        validate_tessellation(self.tessellation)?;
        if !self.height_scale.is_finite() || self.height_scale <= 0.0 {
            return Err(TerrainError::InvalidConfig(format!(
                "terrain height_scale must be positive, got {}",
                self.height_scale
            )));
        }
        if !self.elevation_gamma.is_finite() || self.elevation_gamma <= 0.0 {
            return Err(TerrainError::InvalidConfig(format!(
                "terrain elevation_gamma must be positive, got {}",
                self.elevation_gamma
            )));
        }
        self.transform()?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Placement list as JSON
    pub placements_path: Option<PathBuf>,
    /// Offscreen render of the scene; needs a GPU
    pub snapshot_path: Option<PathBuf>,
    pub snapshot_width: u32,
    pub snapshot_height: u32,
    /// Render the terrain as wireframe; needs `POLYGON_MODE_LINE`
    pub wireframe: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            placements_path: None,
            snapshot_path: None,
            snapshot_width: SNAPSHOT_WIDTH,
            snapshot_height: SNAPSHOT_HEIGHT,
            wireframe: false,
        }
    }
}

impl SceneConfig {
    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> TerrainResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|error| TerrainError::ConfigIo {
            path: path.to_path_buf(),
            error,
        })?;
        let config = Self::parse(&raw, path)?;
        log::info!("[SceneConfig::load] Loaded scene config from {:?}", path);
        Ok(config)
    }

    /// Parse and validate TOML text; `origin` is only used in errors
    pub fn parse(raw: &str, origin: impl AsRef<Path>) -> TerrainResult<Self> {
        let config: SceneConfig = toml::from_str(raw).map_err(|error| TerrainError::ConfigParse {
            path: origin.as_ref().to_path_buf(),
            error,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> TerrainResult<String> {
        toml::to_string(self).map_err(|e| TerrainError::InvalidConfig(e.to_string()))
    }

    pub fn validate(&self) -> TerrainResult<()> {
        self.terrain.validate()?;
        self.placement.validate()?;
        if self.output.snapshot_width == 0 || self.output.snapshot_height == 0 {
            return Err(TerrainError::InvalidConfig(format!(
                "snapshot size must be non-zero, got {}x{}",
                self.output.snapshot_width, self.output.snapshot_height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::JitterMode;

    #[test]
    fn test_defaults_round_trip_through_toml() {
        let config = SceneConfig::default();
        let text = config.to_toml_string().unwrap();
        let parsed = SceneConfig::parse(&text, "round_trip.toml").unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let raw = r#"
            [terrain]
            tessellation = 64

            [placement]
            jitter = "centered"
            seed = 42
        "#;
        let config = SceneConfig::parse(raw, "partial.toml").unwrap();
        assert_eq!(config.terrain.tessellation, 64);
        assert_eq!(config.terrain.height_scale, HEIGHT_SCALE);
        assert_eq!(config.placement.jitter, JitterMode::Centered);
        assert_eq!(config.placement.seed, Some(42));
        assert_eq!(config.placement.max_objects, 500);
        assert!(config.output.snapshot_path.is_none());
        assert!(!config.output.wireframe);
    }

    #[test]
    fn test_wireframe_flag_parses() {
        let raw = "[output]\nwireframe = true\nsnapshot_path = \"out/scene.png\"\n";
        let config = SceneConfig::parse(raw, "wireframe.toml").unwrap();
        assert!(config.output.wireframe);
        assert_eq!(config.output.snapshot_width, SNAPSHOT_WIDTH);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let zero_tess = "[terrain]\ntessellation = 0\n";
        assert!(matches!(
            SceneConfig::parse(zero_tess, "bad.toml"),
            Err(TerrainError::InvalidTessellation { .. })
        ));

        let negative_tess = "[terrain]\ntessellation = -4\n";
        assert!(matches!(
            SceneConfig::parse(negative_tess, "bad.toml"),
            Err(TerrainError::ConfigParse { .. })
        ));

        let bad_band = "[placement]\nmin_height = 5.0\nmax_height = 1.0\n";
        assert!(matches!(
            SceneConfig::parse(bad_band, "bad.toml"),
            Err(TerrainError::InvalidConfig(_))
        ));

        let bad_scale = "[terrain]\nscale_x = 0.0\n";
        assert!(SceneConfig::parse(bad_scale, "bad.toml").is_err());
    }

    #[test]
    fn test_missing_file_reports_io_error() {
        let err = SceneConfig::load("definitely/missing/scene.toml").unwrap_err();
        assert!(matches!(err, TerrainError::ConfigIo { .. }));
    }

    #[test]
    fn test_store_uses_terrain_scale() {
        let mut terrain = TerrainConfig::default();
        terrain.height_scale = 4.0;
        assert_eq!(terrain.store().height_scale(), 4.0);
    }
}
