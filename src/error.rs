use thiserror::Error;

/// Failures the hosts can observe while bringing the scene up.
///
/// The scene controller itself never returns these: a font that fails to
/// load is logged and the scene keeps rendering the cube alone.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to read font file {path}: {source}")]
    FontIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to fetch font {path}: {reason}")]
    FontFetch { path: String, reason: String },
    #[error("malformed typeface font: {0}")]
    FontParse(#[from] serde_json::Error),
    #[error("invalid typeface font: {0}")]
    InvalidFont(String),
    #[error("font loader stopped before delivering a font")]
    FontLoaderGone,
    #[error("no suitable GPU adapter found: {0}")]
    NoAdapter(String),
    #[error("surface supports no texture formats for this adapter")]
    UnsupportedSurface,
    #[error("failed to request GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[cfg(not(target_arch = "wasm32"))]
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[cfg(not(target_arch = "wasm32"))]
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
}

pub type Result<T> = std::result::Result<T, SceneError>;
