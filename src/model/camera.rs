use glam::{Mat4, Vec3};

use crate::config::SceneConfig;

/// Perspective camera looking down -Z with +Y up.
///
/// `position` is animated toward `target_position` by [`PerspectiveCamera::follow_target`];
/// input only ever moves the target.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target_position: Vec3,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(width: u32, height: u32) -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            target_position: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: 75f32.to_radians(),
            aspect: aspect_ratio(width, height),
            z_near: 0.1,
            z_far: 1000.0,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn from_config(config: &SceneConfig, width: u32, height: u32) -> Self {
        let mut camera = Self::new(width, height);
        camera.fov_y = config.fov_y_degrees.to_radians();
        camera.z_near = config.z_near;
        camera.z_far = config.z_far;
        camera.position = config.camera_home();
        camera.target_position = config.camera_home();
        camera.update_projection_matrix();
        camera
    }

    pub fn forward(&self) -> Vec3 {
        Vec3::NEG_Z
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }

    /// Recompute the cached projection after fov, aspect or clip planes change.
    pub fn update_projection_matrix(&mut self) {
        self.projection = Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far);
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward(), self.up)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection * self.view()
    }

    /// Move `position` a fraction `alpha` of the way toward `target_position`.
    ///
    /// Exponential smoothing: the remaining distance shrinks by `1 - alpha`
    /// each call and never reaches zero.
    pub fn follow_target(&mut self, alpha: f32) {
        self.position = self.position.lerp(self.target_position, alpha);
    }

    pub fn distance_to_target(&self) -> f32 {
        self.position.distance(self.target_position)
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width as f32 / height.max(1) as f32
}
