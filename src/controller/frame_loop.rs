use std::cell::Cell;
use std::rc::Rc;

use crate::controller::SceneController;
use crate::view::SceneRenderer;

/// Source of the elapsed seconds fed to the cube's `time` uniform.
pub trait Clock {
    fn elapsed_secs(&self) -> f32;
}

/// Wall clock started when the loop was created.
#[cfg(not(target_arch = "wasm32"))]
pub struct InstantClock {
    start: std::time::Instant,
}

#[cfg(not(target_arch = "wasm32"))]
impl InstantClock {
    pub fn new() -> Self {
        Self { start: std::time::Instant::now() }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for InstantClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Clock for InstantClock {
    fn elapsed_secs(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

/// Seconds elapsed between two millisecond timestamps, never negative.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn secs_between(origin_ms: f64, now_ms: f64) -> f32 {
    ((now_ms - origin_ms).max(0.0) * 0.001) as f32
}

/// `performance.now()`, i.e. seconds since the page started loading.
///
/// Pages without `window.performance` fall back to `Date.now()` measured from
/// when the clock was created.
#[cfg(target_arch = "wasm32")]
pub struct PerformanceClock {
    performance: Option<web_sys::Performance>,
    origin_ms: f64,
}

#[cfg(target_arch = "wasm32")]
impl PerformanceClock {
    pub fn new(window: &web_sys::Window) -> Self {
        let performance = window.performance();
        let origin_ms = if performance.is_some() { 0.0 } else { js_sys::Date::now() };
        Self { performance, origin_ms }
    }
}

#[cfg(target_arch = "wasm32")]
impl Clock for PerformanceClock {
    fn elapsed_secs(&self) -> f32 {
        let now_ms = match &self.performance {
            Some(performance) => performance.now(),
            None => js_sys::Date::now(),
        };
        secs_between(self.origin_ms, now_ms)
    }
}

/// Clock advanced by hand, for single-stepping frames.
#[derive(Debug, Default)]
pub struct ManualClock {
    secs: Cell<f32>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, secs: f32) {
        self.secs.set(self.secs.get() + secs);
    }
}

impl Clock for ManualClock {
    fn elapsed_secs(&self) -> f32 {
        self.secs.get()
    }
}

/// Shared stop flag for a running frame loop. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct LoopControl {
    stopped: Rc<Cell<bool>>,
}

impl LoopControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        if !self.stopped.replace(true) {
            tracing::info!("frame loop stop requested");
        }
    }

    pub fn is_running(&self) -> bool {
        !self.stopped.get()
    }
}

/// Host-owned run loop. Each [`FrameLoop::step`] is exactly one frame.
pub struct FrameLoop<C: Clock> {
    clock: C,
    control: LoopControl,
    frames: u64,
}

impl<C: Clock> FrameLoop<C> {
    pub fn new(clock: C) -> Self {
        Self { clock, control: LoopControl::new(), frames: 0 }
    }

    /// A handle that stops this loop from anywhere on the same thread.
    pub fn control(&self) -> LoopControl {
        self.control.clone()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_running(&self) -> bool {
        self.control.is_running()
    }

    /// Tick the controller once. Returns `false`, leaving the controller
    /// untouched, once the loop has been stopped.
    pub fn step<R: SceneRenderer>(&mut self, controller: &mut SceneController<R>) -> bool {
        if !self.control.is_running() {
            return false;
        }
        controller.tick(self.clock.elapsed_secs());
        self.frames += 1;
        true
    }
}

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;
    use web_sys::Window;

    use super::LoopControl;

    type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

    /// Run `frame` on every animation frame until `control` is stopped.
    ///
    /// The callback re-schedules itself after each frame and simply stops
    /// doing so once `frame` returns `false` or `control` is stopped.
    pub fn start_animation_loop(window: Window, control: LoopControl, mut frame: impl FnMut() -> bool + 'static) {
        let callback: FrameCallback = Rc::new(RefCell::new(None));
        let callback_clone = callback.clone();
        let window_for_loop = window.clone();

        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            if !frame() || !control.is_running() {
                return;
            }
            let scheduled = callback_clone
                .borrow()
                .as_ref()
                .map(|cb| window_for_loop.request_animation_frame(cb.as_ref().unchecked_ref()));
            if let Some(Err(e)) = scheduled {
                tracing::error!(error = ?e, "requestAnimationFrame failed, stopping");
                control.stop();
            }
        }) as Box<dyn FnMut()>));

        let started = callback
            .borrow()
            .as_ref()
            .map(|cb| window.request_animation_frame(cb.as_ref().unchecked_ref()));
        if let Some(Err(e)) = started {
            tracing::error!(error = ?e, "requestAnimationFrame failed to start");
        }
    }
}
