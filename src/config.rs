use glam::Vec3;

/// Every tunable constant of the scene, in one place.
///
/// `Default` reproduces the stock scene. Hosts override individual fields
/// (the native binary takes the font path from argv or `GLYPHLIGHT_FONT`).
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub font_path: String,

    // Camera
    pub camera_distance: f32,
    pub fov_y_degrees: f32,
    pub z_near: f32,
    pub z_far: f32,
    /// Fraction of the remaining distance to the target covered per frame.
    pub camera_smoothing: f32,
    pub camera_step: f32,

    // Light cube
    pub cube_size: f32,
    pub light_step: f32,

    // Glyphs
    pub alphabet_text: String,
    pub digit_text: String,
    pub glyph_offset_x: f32,
    pub text_size: f32,
    pub text_depth: f32,
    pub curve_segments: usize,
    pub alphabet_color: u32,
    pub digit_color: u32,
    pub ambient_intensity: f32,
    pub attenuation_factor: f32,

    pub clear_color: [f64; 4],
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            font_path: "helvetiker-font.json".to_string(),
            camera_distance: 5.0,
            fov_y_degrees: 75.0,
            z_near: 0.1,
            z_far: 1000.0,
            camera_smoothing: 0.1,
            camera_step: 0.1,
            cube_size: 0.5,
            light_step: 0.1,
            alphabet_text: "u".to_string(),
            digit_text: "2".to_string(),
            glyph_offset_x: 2.0,
            text_size: 1.0,
            text_depth: 0.2,
            curve_segments: 12,
            alphabet_color: 0x00ff00,
            digit_color: 0xff00ff,
            ambient_intensity: 0.242,
            attenuation_factor: 1.0,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl SceneConfig {
    /// Where the camera starts and initially aims to stay.
    pub fn camera_home(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, self.camera_distance)
    }

    /// Replace the font path, ignoring empty overrides.
    pub fn with_font_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        if !path.trim().is_empty() {
            self.font_path = path;
        }
        self
    }
}
