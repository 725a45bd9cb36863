//! Browser backends for the sandbox: canvas 2D drawing, image elements and
//! audio elements.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo::events::EventListener;
use relax_core::{AssetLoader, AudioCue, Canvas, LoadTicket, SandboxError, Vec2, Viewport};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, HtmlAudioElement, HtmlCanvasElement, HtmlImageElement};

/// Image loads that finished since the last frame.
pub type ImageCompletions = Rc<RefCell<Vec<(LoadTicket, Result<HtmlImageElement, SandboxError>)>>>;

fn js_reason(value: &wasm_bindgen::JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// Listeners of one in-flight `<img>` load.
struct PendingLoad {
    done: Rc<Cell<bool>>,
    _on_load: EventListener,
    _on_error: EventListener,
}

/// Loads sprites with `<img>` and sounds with `<audio>`.
///
/// Image results are queued in [`ImageCompletions`] and handed to the sandbox
/// by the frame loop. Listeners of finished loads are released on the next
/// request; dropping the loader unregisters every pending load callback.
pub struct WebAssets {
    completions: ImageCompletions,
    pending: Vec<PendingLoad>,
}

impl WebAssets {
    pub fn new(completions: ImageCompletions) -> Self {
        Self {
            completions,
            pending: Vec::new(),
        }
    }

    /// Number of image loads whose listeners are still registered.
    pub fn pending_loads(&self) -> usize {
        self.pending.len()
    }
}

impl AssetLoader for WebAssets {
    type Image = HtmlImageElement;
    type Audio = WebAudioCue;

    fn load_audio(&mut self, locator: &str) -> Result<WebAudioCue, SandboxError> {
        let audio = HtmlAudioElement::new_with_src(locator)
            .map_err(|e| SandboxError::audio_load(locator, js_reason(&e)))?;
        audio.set_preload("auto");
        audio.load();
        Ok(WebAudioCue { audio })
    }

    fn request_image(&mut self, url: &str, ticket: LoadTicket) {
        self.pending.retain(|load| !load.done.get());

        let image = match HtmlImageElement::new() {
            Ok(image) => image,
            Err(e) => {
                self.completions
                    .borrow_mut()
                    .push((ticket, Err(SandboxError::image_load(url, js_reason(&e)))));
                return;
            }
        };

        let done = Rc::new(Cell::new(false));
        let on_load = {
            let completions = self.completions.clone();
            let done = done.clone();
            let loaded = image.clone();
            EventListener::once(&image, "load", move |_| {
                done.set(true);
                completions.borrow_mut().push((ticket, Ok(loaded)));
            })
        };
        let on_error = {
            let completions = self.completions.clone();
            let done = done.clone();
            let url = url.to_string();
            EventListener::once(&image, "error", move |_| {
                done.set(true);
                completions
                    .borrow_mut()
                    .push((ticket, Err(SandboxError::image_load(url, "image element error"))));
            })
        };
        self.pending.push(PendingLoad {
            done,
            _on_load: on_load,
            _on_error: on_error,
        });

        image.set_src(url);
    }
}

/// One `<audio>` element attached to a body.
pub struct WebAudioCue {
    audio: HtmlAudioElement,
}

impl AudioCue for WebAudioCue {
    fn play_from_start(&mut self, volume: f32) -> Result<(), SandboxError> {
        self.audio.set_current_time(0.0);
        self.audio.set_volume(f64::from(volume));
        let promise = self
            .audio
            .play()
            .map_err(|e| SandboxError::PlaybackRejected(js_reason(&e)))?;

        // Autoplay policy rejects asynchronously until the user interacts.
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                tracing::debug!("[feedback] playback rejected: {}", js_reason(&e));
            }
        });
        Ok(())
    }

    fn stop(&mut self) {
        // `pause` cannot fail on a media element; the Result is a binding artifact.
        let _ = self.audio.pause();
        self.audio.set_current_time(0.0);
        let _ = self.audio.remove_attribute("src");
        self.audio.load();
    }

    fn is_playing(&self) -> bool {
        !self.audio.paused() && !self.audio.ended()
    }
}

/// `CanvasRenderingContext2d` drawing surface.
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, wasm_bindgen::JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| wasm_bindgen::JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { ctx })
    }
}

impl Canvas for CanvasSurface {
    type Image = HtmlImageElement;

    /// Clears in CSS pixels. The backing store may be larger on HiDPI
    /// screens, so the transform is reset to its ratio every frame.
    fn clear(&mut self, viewport: Viewport) {
        if let Some(canvas) = self.ctx.canvas() {
            if viewport.width > 0.0 {
                let ratio = f64::from(canvas.width()) / f64::from(viewport.width);
                if let Err(e) = self.ctx.set_transform(ratio, 0.0, 0.0, ratio, 0.0, 0.0) {
                    tracing::debug!("[client] canvas transform failed: {}", js_reason(&e));
                }
            }
        }
        self.ctx
            .clear_rect(0.0, 0.0, f64::from(viewport.width), f64::from(viewport.height));
    }

    fn fill_rect(&mut self, center: Vec2, half_extents: Vec2, fill: &str) {
        let min = center - half_extents;
        let size = half_extents * 2.0;
        self.ctx.set_fill_style_str(fill);
        self.ctx.fill_rect(
            f64::from(min.x),
            f64::from(min.y),
            f64::from(size.x),
            f64::from(size.y),
        );
    }

    fn draw_sprite(&mut self, image: &HtmlImageElement, center: Vec2, angle: f32, diameter: f32) {
        let d = f64::from(diameter);
        self.ctx.save();
        let placed = self
            .ctx
            .translate(f64::from(center.x), f64::from(center.y))
            .and_then(|()| self.ctx.rotate(f64::from(angle)))
            .and_then(|()| {
                self.ctx
                    .draw_image_with_html_image_element_and_dw_and_dh(image, -d / 2.0, -d / 2.0, d, d)
            });
        if let Err(e) = placed {
            tracing::debug!("[client] sprite draw failed: {}", js_reason(&e));
        }
        self.ctx.restore();
    }
}
