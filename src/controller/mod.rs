// CONTROLLER: input, font loading and the per-frame update
pub mod font_loader;
pub mod frame_loop;
pub mod input;
pub mod scene_controller;

pub use font_loader::{FontRequest, FontSlot};
pub use frame_loop::{Clock, FrameLoop, LoopControl, ManualClock};
#[cfg(not(target_arch = "wasm32"))]
pub use frame_loop::InstantClock;
#[cfg(target_arch = "wasm32")]
pub use frame_loop::PerformanceClock;
pub use input::{InputEvent, KeyAction};
pub use scene_controller::{GlyphHandles, SceneController};
