//! Mapping between the terrain's parametric domain and world space.
//!
//! The grid spans [-1, 1] in x and z and the placement engine works in
//! (u, v) over [0, 1]. Both go through this type so a placed object and the
//! displaced vertex at the same (u, v) land on the same world point.

use glam::{Mat4, Vec2, Vec3};

use crate::constants::terrain::{WORLD_SCALE_X, WORLD_SCALE_Z};
use crate::error::{TerrainError, TerrainResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainTransform {
    scale_x: f32,
    scale_z: f32,
}

impl Default for TerrainTransform {
    fn default() -> Self {
        Self {
            scale_x: WORLD_SCALE_X,
            scale_z: WORLD_SCALE_Z,
        }
    }
}

impl TerrainTransform {
    /// `scale_x`/`scale_z` are the full world extents of the terrain
    pub fn new(scale_x: f32, scale_z: f32) -> TerrainResult<Self> {
        for (name, value) in [("scale_x", scale_x), ("scale_z", scale_z)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(TerrainError::InvalidConfig(format!(
                    "{} must be a positive finite number, got {}",
                    name, value
                )));
            }
        }
        Ok(Self { scale_x, scale_z })
    }

    pub fn scale_x(&self) -> f32 {
        self.scale_x
    }

    pub fn scale_z(&self) -> f32 {
        self.scale_z
    }

    /// World point for a domain sample; `y` is the already-scaled height
    pub fn uv_to_world(&self, u: f32, v: f32, y: f32) -> Vec3 {
        Vec3::new((u - 0.5) * self.scale_x, y, (v - 0.5) * self.scale_z)
    }

    /// Model matrix taking grid space ([-1, 1] in x/z) to world space.
    /// Y is left unscaled since heights are already in world units.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale(Vec3::new(self.scale_x * 0.5, 1.0, self.scale_z * 0.5))
    }

    /// Horizontal world bounds as (min, max) over (x, z)
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let half = Vec2::new(self.scale_x, self.scale_z) * 0.5;
        (-half, half)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uv_to_world_centers_domain() {
        let transform = TerrainTransform::default();
        assert_eq!(transform.uv_to_world(0.5, 0.5, 3.0), Vec3::new(0.0, 3.0, 0.0));
        assert_eq!(transform.uv_to_world(0.0, 1.0, 0.0), Vec3::new(-50.0, 0.0, 50.0));
    }

    #[test]
    fn test_model_matrix_agrees_with_uv_mapping() {
        let transform = TerrainTransform::new(100.0, 40.0).unwrap();
        let model = transform.model_matrix();
        for (u, v) in [(0.0, 0.0), (0.25, 0.75), (1.0, 1.0)] {
            // Grid vertex for (u, v) before displacement
            let grid = Vec3::new(-1.0 + 2.0 * u, 2.5, -1.0 + 2.0 * v);
            let world = model.transform_point3(grid);
            let expected = transform.uv_to_world(u, v, 2.5);
            assert!((world - expected).length() < 1e-4, "{:?} vs {:?}", world, expected);
        }
    }

    #[test]
    fn test_invalid_scale_rejected() {
        assert!(TerrainTransform::new(0.0, 1.0).is_err());
        assert!(TerrainTransform::new(1.0, f32::NAN).is_err());
        assert!(TerrainTransform::new(-3.0, 1.0).is_err());
    }

    #[test]
    fn test_bounds() {
        let (min, max) = TerrainTransform::default().bounds();
        assert_eq!(min, Vec2::new(-50.0, -50.0));
        assert_eq!(max, Vec2::new(50.0, 50.0));
    }
}
