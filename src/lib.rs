pub mod config;
pub mod error;
pub mod logging;
pub mod utils;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
#[cfg(target_arch = "wasm32")]
use web_sys::{Document, Event, HtmlCanvasElement, KeyboardEvent, Window};

#[cfg(target_arch = "wasm32")]
use config::SceneConfig;
#[cfg(target_arch = "wasm32")]
use controller::frame_loop::wasm::start_animation_loop;
#[cfg(target_arch = "wasm32")]
use controller::input::wasm::{keyboard_event_to_input, resize_to_input, window_size};
#[cfg(target_arch = "wasm32")]
use controller::{FontRequest, FrameLoop, InputEvent, LoopControl, PerformanceClock, SceneController};
#[cfg(target_arch = "wasm32")]
use view::{GpuContext, WgpuRenderer};

#[cfg(target_arch = "wasm32")]
type SharedController = Rc<RefCell<SceneController<WgpuRenderer>>>;

#[cfg(target_arch = "wasm32")]
thread_local! {
    static LOOP_CONTROL: RefCell<Option<LoopControl>> = const { RefCell::new(None) };
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    logging::init();

    let config = SceneConfig::default();
    let (window, document, canvas) = init_canvas()?;
    setup_app(window, &document, canvas, config).await
}

/// Stop the animation loop. Pending listeners stay attached but no further
/// frames are drawn.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn stop() {
    LOOP_CONTROL.with(|control| {
        if let Some(control) = control.borrow().as_ref() {
            control.stop();
        }
    });
}

#[cfg(target_arch = "wasm32")]
async fn setup_app(
    window: Window,
    document: &Document,
    canvas: HtmlCanvasElement,
    config: SceneConfig,
) -> Result<(), JsValue> {
    let (width, height) = window_size(&window);
    let gpu = GpuContext::new(&canvas, width, height)
        .await
        .map_err(|e| js_error(format!("GPU init failed: {e}")))?;
    let renderer = WgpuRenderer::new(gpu, &config);

    let font = FontRequest::fetch(config.font_path.clone());
    let controller: SharedController =
        Rc::new(RefCell::new(SceneController::initialize(renderer, (width, height), config, font)));

    setup_event_listeners(document, &window, &canvas, controller.clone())?;

    let mut frame_loop = FrameLoop::new(PerformanceClock::new(&window));
    let control = frame_loop.control();
    LOOP_CONTROL.with(|slot| *slot.borrow_mut() = Some(control.clone()));

    start_animation_loop(window, control, move || frame_loop.step(&mut *controller.borrow_mut()));
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn setup_event_listeners(
    document: &Document,
    window: &Window,
    canvas: &HtmlCanvasElement,
    controller: SharedController,
) -> Result<(), JsValue> {
    // Keyboard down
    {
        let controller = controller.clone();
        let keydown = Closure::wrap(Box::new(move |e: KeyboardEvent| {
            controller.borrow_mut().handle_input(&keyboard_event_to_input(&e));
        }) as Box<dyn FnMut(KeyboardEvent)>);
        document.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
        keydown.forget();
    }

    // Window resize, canvas follows the viewport
    {
        let window_for_resize = window.clone();
        let canvas = canvas.clone();
        let resize = Closure::wrap(Box::new(move |_e: Event| {
            let event = resize_to_input(&window_for_resize);
            if let InputEvent::Resize { width, height } = event {
                canvas.set_width(width);
                canvas.set_height(height);
            }
            controller.borrow_mut().handle_input(&event);
        }) as Box<dyn FnMut(Event)>);
        window.add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())?;
        resize.forget();
    }

    Ok(())
}

/// Full-window canvas appended to the document body.
#[cfg(target_arch = "wasm32")]
fn init_canvas() -> Result<(Window, Document, HtmlCanvasElement), JsValue> {
    let window = web_sys::window().ok_or(js_error("no global `window`"))?;
    let document = window.document().ok_or(js_error("no document on window"))?;
    let body = document.body().ok_or(js_error("no body on document"))?;
    let canvas_el = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| js_error("failed to create canvas"))?;
    let (width, height) = window_size(&window);
    canvas_el.set_width(width);
    canvas_el.set_height(height);
    body.append_child(&canvas_el)?;
    Ok((window, document, canvas_el))
}

#[cfg(target_arch = "wasm32")]
fn js_error<E: Into<String>>(msg: E) -> JsValue {
    JsValue::from_str(&msg.into())
}
