use std::sync::Arc;

use winit::{
    event::{Event, WindowEvent},
    event_loop::EventLoop,
    window::Window,
};

use glyphlight::{
    config::SceneConfig,
    controller::{input, FontRequest, FrameLoop, InstantClock, SceneController},
    error::Result,
    logging,
    view::{GpuContext, WgpuRenderer},
};

/// Font path from the first argument, then `GLYPHLIGHT_FONT`, then the default.
fn scene_config() -> SceneConfig {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("GLYPHLIGHT_FONT").ok())
        .unwrap_or_default();
    SceneConfig::default().with_font_path(path)
}

#[allow(deprecated)]
fn main() -> Result<()> {
    logging::init();
    let config = scene_config();

    let event_loop = EventLoop::new()?;
    let window_attributes = Window::default_attributes()
        .with_title("glyphlight")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
    let window = Arc::new(event_loop.create_window(window_attributes)?);
    let size = window.inner_size();

    let gpu = pollster::block_on(GpuContext::new_native(window.clone()))?;
    let renderer = WgpuRenderer::new(gpu, &config);
    let font = FontRequest::spawn_file_load(config.font_path.clone());
    let mut controller = SceneController::initialize(renderer, (size.width, size.height), config, font);

    let mut frame_loop = FrameLoop::new(InstantClock::new());
    let control = frame_loop.control();

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { ref event, window_id } if window_id == window.id() => match event {
            WindowEvent::CloseRequested => {
                control.stop();
                elwt.exit();
            }
            WindowEvent::RedrawRequested => {
                if !frame_loop.step(&mut controller) {
                    elwt.exit();
                }
            }
            other => {
                if let Some(input) = input::native::window_event_to_input(other) {
                    controller.handle_input(&input);
                }
            }
        },
        Event::AboutToWait => window.request_redraw(),
        _ => {}
    })?;

    tracing::info!("event loop finished");
    Ok(())
}
