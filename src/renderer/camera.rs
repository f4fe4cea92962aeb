use glam::{Mat4, Vec3};

use crate::constants::render::{CAMERA_POSITION, FOV_Y_DEGREES, ZFAR, ZNEAR};

/// Fixed perspective camera looking at the terrain centre
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl SceneCamera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Vec3::from(CAMERA_POSITION),
            target: Vec3::ZERO,
            fov_y_degrees: FOV_Y_DEGREES,
            aspect: width.max(1) as f32 / height.max(1) as f32,
            znear: ZNEAR,
            zfar: ZFAR,
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_degrees.to_radians(), self.aspect, self.znear, self.zfar)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_projects_to_screen_centre() {
        let camera = SceneCamera::new(1280, 720);
        let clip = camera.view_proj() * camera.target.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn test_zero_height_does_not_divide_by_zero() {
        let camera = SceneCamera::new(640, 0);
        assert!(camera.aspect.is_finite());
    }
}
