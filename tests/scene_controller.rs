use std::path::PathBuf;

use glam::Vec3;

use glyphlight::config::SceneConfig;
use glyphlight::controller::scene_controller::{ATTENUATION_FACTOR, LIGHT_POSITION, TIME};
use glyphlight::controller::{FontRequest, FontSlot, FrameLoop, InputEvent, ManualClock, SceneController};
use glyphlight::error::SceneError;
use glyphlight::model::{Font, GlyphKind, ObjectKind, PerspectiveCamera, SceneGraph};
use glyphlight::view::SceneRenderer;

/// Renderer that only remembers what it was asked to draw.
#[derive(Debug, Default)]
struct RecordingRenderer {
    size: (u32, u32),
    frames: usize,
    last_object_count: usize,
    last_camera_position: Option<Vec3>,
}

impl SceneRenderer for RecordingRenderer {
    fn set_size(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) {
        self.frames += 1;
        self.last_object_count = scene.len();
        self.last_camera_position = Some(camera.position);
    }
}

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/blocky-font.json")
}

fn fixture_font() -> Font {
    let bytes = std::fs::read(fixture_path()).unwrap();
    Font::from_slice(&bytes).unwrap()
}

fn pending_scene() -> (SceneController<RecordingRenderer>, FontSlot) {
    let (request, slot) = FontRequest::slot("blocky-font.json");
    let controller =
        SceneController::initialize(RecordingRenderer::default(), (800, 600), SceneConfig::default(), request);
    (controller, slot)
}

fn loaded_scene() -> SceneController<RecordingRenderer> {
    let request = FontRequest::ready("blocky-font.json", Ok(fixture_font()));
    let mut controller =
        SceneController::initialize(RecordingRenderer::default(), (800, 600), SceneConfig::default(), request);
    controller.tick(0.0);
    controller
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

#[test]
fn initialize_sizes_renderer_and_places_camera() {
    let (controller, _slot) = pending_scene();
    assert_eq!(controller.renderer().size(), (800, 600));
    assert_eq!(controller.camera().position, Vec3::new(0.0, 0.0, 5.0));
    assert_eq!(controller.camera().target_position, Vec3::new(0.0, 0.0, 5.0));
    assert!(close(controller.camera().aspect, 800.0 / 600.0));
    assert_eq!(controller.cube_position(), Vec3::ZERO);
    assert!(controller.is_font_pending());
}

#[test]
fn glyphs_appear_once_the_font_arrives() {
    let (mut controller, slot) = pending_scene();
    controller.tick(0.0);
    controller.tick(0.016);
    assert_eq!(controller.scene().len(), 1);
    assert_eq!(controller.renderer().last_object_count, 1);
    assert!(controller.glyphs().is_none());

    slot.complete(Ok(fixture_font()));
    controller.tick(0.032);
    assert_eq!(controller.scene().len(), 3);
    assert_eq!(controller.renderer().last_object_count, 3);
    assert!(!controller.is_font_pending());

    let glyphs = controller.glyphs().unwrap();
    let scene = controller.scene();
    assert_eq!(scene.position(glyphs.alphabet), Some(Vec3::new(-2.0, 0.0, 0.0)));
    assert_eq!(scene.position(glyphs.digit), Some(Vec3::new(2.0, 0.0, 0.0)));
    assert_eq!(scene.position(controller.cube()), Some(Vec3::ZERO));
    assert_eq!(scene.get(glyphs.alphabet).unwrap().kind, ObjectKind::Glyph(GlyphKind::Alphabet));
    assert_eq!(scene.get(glyphs.digit).unwrap().kind, ObjectKind::Glyph(GlyphKind::Digit));
    assert!(!scene.get(glyphs.alphabet).unwrap().geometry.is_empty());
    assert!(!scene.get(glyphs.digit).unwrap().geometry.is_empty());
}

#[test]
fn extruded_glyphs_have_depth() {
    let controller = loaded_scene();
    let glyphs = controller.glyphs().unwrap();
    let (lo, hi) = controller.scene().get(glyphs.digit).unwrap().geometry.bounds().unwrap();
    assert!(close(lo.z, 0.0));
    assert!(close(hi.z, 0.2));
    assert!(close(lo.x, 0.0) && close(hi.x, 0.5));
    assert!(close(hi.y, 0.7));
}

#[test]
fn creating_text_meshes_twice_keeps_the_first_glyphs() {
    let mut controller = loaded_scene();
    let first = controller.glyphs().unwrap();
    let again = controller.create_text_meshes(&fixture_font());
    assert_eq!(first, again);
    assert_eq!(controller.scene().len(), 3);
}

#[test]
fn only_the_digit_attenuates() {
    let controller = loaded_scene();
    let glyphs = controller.glyphs().unwrap();
    let scene = controller.scene();
    let alphabet = &scene.get(glyphs.alphabet).unwrap().material;
    let digit = &scene.get(glyphs.digit).unwrap().material;
    assert!(!alphabet.has_uniform(ATTENUATION_FACTOR));
    assert!(digit.has_uniform(ATTENUATION_FACTOR));
    assert_eq!(digit.float(ATTENUATION_FACTOR, scene), Some(1.0));
}

#[test]
fn moving_the_cube_moves_the_light_seen_by_both_glyphs() {
    let mut controller = loaded_scene();
    let glyphs = controller.glyphs().unwrap();
    let light_of = |c: &SceneController<RecordingRenderer>, id| {
        let scene = c.scene();
        scene.get(id).unwrap().material.vec3(LIGHT_POSITION, scene).unwrap()
    };
    assert_eq!(light_of(&controller, glyphs.alphabet), Vec3::ZERO);

    controller.key_down("w");
    controller.key_down("w");
    let cube = controller.cube_position();
    assert!(close(cube.y, 0.2));
    assert_eq!(light_of(&controller, glyphs.alphabet), cube);
    assert_eq!(light_of(&controller, glyphs.digit), cube);
}

#[test]
fn w_and_s_step_the_cube_vertically() {
    let (mut controller, _slot) = pending_scene();
    for _ in 0..3 {
        controller.key_down("w");
    }
    assert!(close(controller.cube_position().y, 0.3));
    controller.handle_input(&InputEvent::KeyDown("S".to_string()));
    assert!(close(controller.cube_position().y, 0.2));
    assert_eq!(controller.cube_position().x, 0.0);
    assert_eq!(controller.camera().target_position, Vec3::new(0.0, 0.0, 5.0));
}

#[test]
fn a_and_d_only_move_the_camera_target() {
    let (mut controller, _slot) = pending_scene();
    controller.key_down("a");
    assert!(close(controller.camera().target_position.x, -0.1));
    assert_eq!(controller.camera().position, Vec3::new(0.0, 0.0, 5.0));
    assert_eq!(controller.cube_position(), Vec3::ZERO);

    controller.key_down("d");
    controller.key_down("d");
    assert!(close(controller.camera().target_position.x, 0.1));
}

#[test]
fn camera_eases_toward_its_target() {
    let (mut controller, _slot) = pending_scene();
    controller.key_down("a");
    controller.tick(0.0);
    assert!(close(controller.camera().position.x, -0.01));
    assert_eq!(controller.renderer().last_camera_position, Some(controller.camera().position));

    let mut previous = controller.camera().distance_to_target();
    for frame in 1..30 {
        controller.tick(frame as f32 / 60.0);
        let distance = controller.camera().distance_to_target();
        assert!(distance < previous, "frame {frame}: {distance} >= {previous}");
        previous = distance;
    }
    assert!(controller.camera().position.x > -0.1);
}

#[test]
fn unmapped_keys_change_nothing() {
    let (mut controller, _slot) = pending_scene();
    controller.key_down("q");
    controller.key_down("ArrowUp");
    assert_eq!(controller.cube_position(), Vec3::ZERO);
    assert_eq!(controller.camera().target_position, Vec3::new(0.0, 0.0, 5.0));
}

#[test]
fn resize_updates_aspect_and_renderer() {
    let (mut controller, _slot) = pending_scene();
    controller.handle_input(&InputEvent::Resize { width: 1000, height: 500 });
    assert_eq!(controller.camera().aspect, 2.0);
    assert_eq!(controller.renderer().size(), (1000, 500));

    let expected = glam::Mat4::perspective_rh(75f32.to_radians(), 2.0, 0.1, 1000.0);
    assert!(controller.camera().projection().abs_diff_eq(expected, 1e-6));
}

#[test]
fn empty_resize_is_ignored() {
    let (mut controller, _slot) = pending_scene();
    controller.resize(0, 300);
    controller.resize(300, 0);
    assert_eq!(controller.renderer().size(), (800, 600));
    assert!(close(controller.camera().aspect, 800.0 / 600.0));
}

#[test]
fn font_failure_leaves_only_the_cube() {
    let failure = SceneError::FontFetch { path: "missing.json".to_string(), reason: "404 Not Found".to_string() };
    let request = FontRequest::ready("missing.json", Err(failure));
    let mut controller =
        SceneController::initialize(RecordingRenderer::default(), (800, 600), SceneConfig::default(), request);
    controller.tick(0.0);
    controller.tick(0.016);
    assert!(!controller.is_font_pending());
    assert!(controller.glyphs().is_none());
    assert_eq!(controller.scene().len(), 1);
    assert_eq!(controller.renderer().frames, 2);

    // keys still work on the cube-only scene
    controller.key_down("w");
    assert!(close(controller.cube_position().y, 0.1));
}

#[test]
fn frame_loop_feeds_elapsed_time_to_the_cube() {
    let (mut controller, _slot) = pending_scene();
    let mut frame_loop = FrameLoop::new(ManualClock::new());
    frame_loop.clock().advance(0.5);
    assert!(frame_loop.step(&mut controller));
    frame_loop.clock().advance(0.25);
    assert!(frame_loop.step(&mut controller));

    let cube = controller.cube();
    let scene = controller.scene();
    assert_eq!(scene.get(cube).unwrap().material.float(TIME, scene), Some(0.75));
    assert_eq!(frame_loop.frames(), 2);
    assert_eq!(controller.renderer().frames, 2);
}

#[test]
fn stopped_loop_never_ticks() {
    let (mut controller, _slot) = pending_scene();
    let mut frame_loop = FrameLoop::new(ManualClock::new());
    let control = frame_loop.control();
    control.stop();

    controller.key_down("a");
    for _ in 0..5 {
        assert!(!frame_loop.step(&mut controller));
    }
    assert_eq!(frame_loop.frames(), 0);
    assert_eq!(controller.renderer().frames, 0);
    assert_eq!(controller.camera().position, Vec3::new(0.0, 0.0, 5.0));
}

#[test]
fn worker_thread_loads_the_fixture_font() {
    let request = FontRequest::spawn_file_load(fixture_path().to_string_lossy().into_owned());
    let mut controller =
        SceneController::initialize(RecordingRenderer::default(), (640, 480), SceneConfig::default(), request);

    let mut waited = 0;
    while controller.is_font_pending() && waited < 500 {
        controller.tick(0.0);
        std::thread::sleep(std::time::Duration::from_millis(10));
        waited += 1;
    }
    assert!(!controller.is_font_pending(), "font never finished loading");
    assert_eq!(controller.scene().len(), 3);
}
