//! Asynchronous font requests.
//!
//! A [`FontRequest`] is created when the scene starts and polled once per frame
//! until it yields its result. Native hosts read the file on a worker thread;
//! the web host fetches it relative to the page.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{Result, SceneError};
use crate::model::Font;

type Shared = Rc<RefCell<Option<Result<Font>>>>;

enum Pending {
    #[cfg(not(target_arch = "wasm32"))]
    Worker(std::sync::mpsc::Receiver<Result<Font>>),
    Slot(Shared),
    Done,
}

pub struct FontRequest {
    path: String,
    pending: Pending,
}

/// Completion side of a same-thread request (see [`FontRequest::slot`]).
pub struct FontSlot(Shared);

impl FontSlot {
    pub fn complete(self, result: Result<Font>) {
        *self.0.borrow_mut() = Some(result);
    }
}

impl FontRequest {
    /// A request that has already finished.
    pub fn ready(path: impl Into<String>, result: Result<Font>) -> Self {
        Self { path: path.into(), pending: Pending::Slot(Rc::new(RefCell::new(Some(result)))) }
    }

    /// A request completed later on the same thread through the returned slot.
    pub fn slot(path: impl Into<String>) -> (Self, FontSlot) {
        let shared: Shared = Rc::new(RefCell::new(None));
        let request = Self { path: path.into(), pending: Pending::Slot(shared.clone()) };
        (request, FontSlot(shared))
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The result, exactly once. `None` while still loading and after delivery.
    pub fn poll(&mut self) -> Option<Result<Font>> {
        let result = match &self.pending {
            #[cfg(not(target_arch = "wasm32"))]
            Pending::Worker(rx) => match rx.try_recv() {
                Ok(result) => result,
                Err(std::sync::mpsc::TryRecvError::Empty) => return None,
                Err(std::sync::mpsc::TryRecvError::Disconnected) => Err(SceneError::FontLoaderGone),
            },
            Pending::Slot(shared) => shared.borrow_mut().take()?,
            Pending::Done => return None,
        };
        self.pending = Pending::Done;
        Some(result)
    }
}

/// Read and parse a typeface JSON file.
#[cfg(not(target_arch = "wasm32"))]
pub fn load_font_file(path: &str) -> Result<Font> {
    let bytes = std::fs::read(path).map_err(|source| SceneError::FontIo { path: path.to_string(), source })?;
    Font::from_slice(&bytes)
}

#[cfg(not(target_arch = "wasm32"))]
impl FontRequest {
    /// Load `path` on a background thread.
    pub fn spawn_file_load(path: impl Into<String>) -> Self {
        let path = path.into();
        let (tx, rx) = std::sync::mpsc::channel();
        let worker_path = path.clone();
        let spawned = std::thread::Builder::new().name("font-loader".to_string()).spawn(move || {
            let result = load_font_file(&worker_path);
            if let Err(e) = &result {
                tracing::debug!(path = %worker_path, error = %e, "font worker finished with error");
            }
            // The receiver is gone when the scene shut down first.
            let _ = tx.send(result);
        });
        match spawned {
            Ok(_) => {
                tracing::info!(%path, "loading font");
                Self { path, pending: Pending::Worker(rx) }
            }
            Err(source) => {
                let result = Err(SceneError::FontIo { path: path.clone(), source });
                Self::ready(path, result)
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl FontRequest {
    /// Fetch `path` relative to the page on the browser's event loop.
    pub fn fetch(path: impl Into<String>) -> Self {
        let path = path.into();
        let (request, slot) = Self::slot(path.clone());
        tracing::info!(%path, "fetching font");
        wasm_bindgen_futures::spawn_local(async move {
            slot.complete(fetch_font(&path).await);
        });
        request
    }
}

#[cfg(target_arch = "wasm32")]
async fn fetch_font(path: &str) -> Result<Font> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let fail = |reason: String| SceneError::FontFetch { path: path.to_string(), reason };
    let describe = |e: wasm_bindgen::JsValue| format!("{e:?}");

    let window = web_sys::window().ok_or_else(|| fail("no global `window`".to_string()))?;
    let response = JsFuture::from(window.fetch_with_str(path)).await.map_err(|e| fail(describe(e)))?;
    let response: web_sys::Response = response.dyn_into().map_err(|e| fail(describe(e)))?;
    if !response.ok() {
        return Err(fail(format!("HTTP {}", response.status())));
    }
    let text = response.text().map_err(|e| fail(describe(e)))?;
    let text = JsFuture::from(text).await.map_err(|e| fail(describe(e)))?;
    let text = text.as_string().ok_or_else(|| fail("response body is not text".to_string()))?;
    Font::from_json(&text)
}
