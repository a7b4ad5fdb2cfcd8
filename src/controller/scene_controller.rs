use glam::Vec3;

use crate::config::SceneConfig;
use crate::controller::font_loader::FontRequest;
use crate::controller::input::{InputEvent, KeyAction};
use crate::model::geometry::box_geometry;
use crate::model::text::{text_geometry, TextOptions};
use crate::model::{
    Color, Font, GlyphKind, ObjectId, ObjectKind, PerspectiveCamera, RenderableObject, SceneGraph, ShaderMaterial,
    ShaderProgram, Uniform,
};
use crate::view::SceneRenderer;

pub use crate::model::material::{AMBIENT_INTENSITY, ATTENUATION_FACTOR, BASE_COLOR, LIGHT_POSITION, TIME};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphHandles {
    pub alphabet: ObjectId,
    pub digit: ObjectId,
}

/// Owns the scene, its camera and the renderer, and drives them per frame.
///
/// The only phase change is glyphs absent -> glyphs present, once the font
/// request completes.
pub struct SceneController<R: SceneRenderer> {
    config: SceneConfig,
    scene: SceneGraph,
    camera: PerspectiveCamera,
    renderer: R,
    cube: ObjectId,
    glyphs: Option<GlyphHandles>,
    font_request: Option<FontRequest>,
}

impl<R: SceneRenderer> SceneController<R> {
    /// Size the renderer, place the camera, build the light cube and keep the
    /// pending font request. Starting the frame loop and wiring input is up to
    /// the host.
    pub fn initialize(
        mut renderer: R,
        (width, height): (u32, u32),
        config: SceneConfig,
        font_request: FontRequest,
    ) -> Self {
        renderer.set_size(width, height);
        let camera = PerspectiveCamera::from_config(&config, width, height);

        let mut scene = SceneGraph::new();
        let cube_material = ShaderMaterial::new(ShaderProgram::Cube).with_uniform(TIME, Uniform::Float(0.0));
        let size = config.cube_size;
        let cube = scene.add(RenderableObject::new(
            "light-cube",
            ObjectKind::CubeLight,
            box_geometry(size, size, size),
            cube_material,
        ));

        tracing::info!(width, height, font = font_request.path(), "scene initialized");

        Self {
            config,
            scene,
            camera,
            renderer,
            cube,
            glyphs: None,
            font_request: Some(font_request),
        }
    }

    /// Build the two extruded glyphs lit by the cube and add them to the scene.
    ///
    /// Only the digit material carries an attenuation factor. Runs once; later
    /// calls keep the glyphs already built.
    pub fn create_text_meshes(&mut self, font: &Font) -> GlyphHandles {
        if let Some(glyphs) = self.glyphs {
            tracing::debug!("glyphs already present, ignoring font");
            return glyphs;
        }

        let options = TextOptions {
            size: self.config.text_size,
            depth: self.config.text_depth,
            curve_segments: self.config.curve_segments,
        };
        let light = Uniform::PositionOf(self.cube);
        let ambient = Uniform::Float(self.config.ambient_intensity);

        let alphabet_material = ShaderMaterial::new(ShaderProgram::Alphabet)
            .with_uniform(LIGHT_POSITION, light)
            .with_uniform(BASE_COLOR, Uniform::Color(Color::from_hex(self.config.alphabet_color)))
            .with_uniform(AMBIENT_INTENSITY, ambient);
        let alphabet = self.scene.add(
            RenderableObject::new(
                "alphabet-glyph",
                ObjectKind::Glyph(GlyphKind::Alphabet),
                text_geometry(font, &self.config.alphabet_text, options),
                alphabet_material,
            )
            .at(Vec3::new(-self.config.glyph_offset_x, 0.0, 0.0)),
        );

        let digit_material = ShaderMaterial::new(ShaderProgram::Digit)
            .with_uniform(LIGHT_POSITION, light)
            .with_uniform(BASE_COLOR, Uniform::Color(Color::from_hex(self.config.digit_color)))
            .with_uniform(AMBIENT_INTENSITY, ambient)
            .with_uniform(ATTENUATION_FACTOR, Uniform::Float(self.config.attenuation_factor));
        let digit = self.scene.add(
            RenderableObject::new(
                "digit-glyph",
                ObjectKind::Glyph(GlyphKind::Digit),
                text_geometry(font, &self.config.digit_text, options),
                digit_material,
            )
            .at(Vec3::new(self.config.glyph_offset_x, 0.0, 0.0)),
        );

        let glyphs = GlyphHandles { alphabet, digit };
        self.glyphs = Some(glyphs);
        tracing::info!(objects = self.scene.len(), "glyph meshes added");
        glyphs
    }

    /// Consume the font request's result if it has arrived.
    pub fn poll_font_load(&mut self) {
        let Some(request) = self.font_request.as_mut() else {
            return;
        };
        let Some(result) = request.poll() else {
            return;
        };
        let path = request.path().to_string();
        self.font_request = None;
        match result {
            Ok(font) => {
                self.create_text_meshes(&font);
            }
            Err(e) => tracing::error!(%path, error = %e, "font load failed, rendering the light cube only"),
        }
    }

    /// One frame: ease the camera toward its target, advance the cube's clock
    /// and draw.
    pub fn animate(&mut self, elapsed_secs: f32) {
        self.camera.follow_target(self.config.camera_smoothing);

        if let Some(cube) = self.scene.get_mut(self.cube) {
            cube.material.set_uniform(TIME, Uniform::Float(elapsed_secs));
        }

        self.renderer.render(&self.scene, &self.camera);
    }

    /// Font polling followed by [`SceneController::animate`].
    pub fn tick(&mut self, elapsed_secs: f32) {
        self.poll_font_load();
        self.animate(elapsed_secs);
    }

    pub fn handle_input(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(key) => self.key_down(key),
            InputEvent::Resize { width, height } => self.resize(*width, *height),
        }
    }

    /// `w`/`s` move the cube directly; `a`/`d` move only the camera target.
    pub fn key_down(&mut self, key: &str) {
        let Some(action) = KeyAction::from_key(key) else {
            return;
        };
        match action {
            KeyAction::RaiseLight | KeyAction::LowerLight => {
                if let Some(cube) = self.scene.get_mut(self.cube) {
                    cube.position.y += action.sign() * self.config.light_step;
                }
            }
            KeyAction::PanLeft | KeyAction::PanRight => {
                self.camera.target_position.x += action.sign() * self.config.camera_step;
            }
        }
        tracing::trace!(?action, "key handled");
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            tracing::debug!(width, height, "ignoring resize to an empty viewport");
            return;
        }
        self.camera.set_aspect(width, height);
        self.camera.update_projection_matrix();
        self.renderer.set_size(width, height);
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn cube(&self) -> ObjectId {
        self.cube
    }

    pub fn cube_position(&self) -> Vec3 {
        self.scene.position(self.cube).unwrap_or(Vec3::ZERO)
    }

    pub fn glyphs(&self) -> Option<GlyphHandles> {
        self.glyphs
    }

    pub fn is_font_pending(&self) -> bool {
        self.font_request.is_some()
    }
}
