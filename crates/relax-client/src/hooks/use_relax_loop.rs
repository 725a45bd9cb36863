//! Frame loop hook driving a relax-mode sandbox on a canvas.

use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::EventListener;
use relax_core::{
    InputEvent, InputQueue, Item, PHYSICS_DT_MS, Sandbox, SandboxConfig, SandboxStatus, Vec2,
    Viewport,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, HtmlCanvasElement, MouseEvent, PointerEvent};
use yew::prelude::*;

use crate::web::{CanvasSurface, ImageCompletions, WebAssets};

type SandboxSlot = Rc<RefCell<Option<Sandbox<WebAssets>>>>;

/// Sizes the canvas to the window and returns the new viewport in CSS
/// pixels. The backing store is scaled by the device pixel ratio so sprites
/// stay sharp on HiDPI screens.
fn fit_canvas(canvas: &HtmlCanvasElement) -> Viewport {
    let (width, height, ratio) = web_sys::window()
        .map(|window| {
            let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
            let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
            (width, height, window.device_pixel_ratio().max(1.0))
        })
        .unwrap_or((0.0, 0.0, 1.0));

    canvas.set_width((width * ratio).round() as u32);
    canvas.set_height((height * ratio).round() as u32);
    let style = canvas.style();
    let _ = style.set_property("width", &format!("{width}px"));
    let _ = style.set_property("height", &format!("{height}px"));

    Viewport::new(width as f32, height as f32)
}

fn pointer_position(event: &Event) -> Option<Vec2> {
    let mouse = event.dyn_ref::<MouseEvent>()?;
    Some(Vec2::new(mouse.offset_x() as f32, mouse.offset_y() as f32))
}

fn pointer_listener(
    canvas: &HtmlCanvasElement,
    event_type: &'static str,
    input: InputQueue,
    to_event: fn(Vec2) -> InputEvent,
) -> EventListener {
    EventListener::new(canvas, event_type, move |event| {
        if let Some(position) = pointer_position(event) {
            input.push(to_event(position));
        }
    })
}

/// Wires window and canvas events into the sandbox input queue.
fn input_listeners(canvas: &HtmlCanvasElement, input: &InputQueue) -> Vec<EventListener> {
    let mut listeners = vec![
        pointer_listener(canvas, "pointermove", input.clone(), |position| {
            InputEvent::PointerMove { position }
        }),
        pointer_listener(canvas, "pointerup", input.clone(), |position| {
            InputEvent::PointerUp { position }
        }),
        pointer_listener(canvas, "pointercancel", input.clone(), |position| {
            InputEvent::PointerUp { position }
        }),
        pointer_listener(canvas, "dblclick", input.clone(), |position| {
            InputEvent::DoubleClick { position }
        }),
    ];

    {
        // Capture keeps drags alive when the pointer leaves the canvas.
        let input = input.clone();
        let target = canvas.clone();
        listeners.push(EventListener::new(canvas, "pointerdown", move |event| {
            if let Some(pointer) = event.dyn_ref::<PointerEvent>() {
                let _ = target.set_pointer_capture(pointer.pointer_id());
            }
            if let Some(position) = pointer_position(event) {
                input.push(InputEvent::PointerDown { position });
            }
        }));
    }

    if let Some(window) = web_sys::window() {
        let input = input.clone();
        let canvas = canvas.clone();
        listeners.push(EventListener::new(&window, "resize", move |_| {
            let viewport = fit_canvas(&canvas);
            input.push(InputEvent::Resize {
                width: viewport.width,
                height: viewport.height,
            });
        }));
    }

    listeners
}

/// Runs a sandbox on the referenced canvas for as long as the calling
/// component is mounted.
///
/// The sandbox is created on mount and torn down synchronously on unmount:
/// the pending animation frame is cancelled, every listener is removed and
/// all bodies, sprites and cues are released before control returns to Yew.
/// Items are handed over whenever `items` changes; only the first non-empty
/// collection populates the world.
#[hook]
pub fn use_relax_loop(canvas_ref: NodeRef, items: Rc<Vec<Item>>) -> UseStateHandle<SandboxStatus> {
    let status = use_state(|| SandboxStatus::Loading);
    let slot: SandboxSlot = use_mut_ref(|| None);

    {
        let status = status.clone();
        let slot = slot.clone();
        use_effect_with((), move |()| {
            let animation_frame_id: Rc<RefCell<Option<i32>>> = Rc::new(RefCell::new(None));
            // Closure reference for cleanup (to break reference cycle)
            let closure_for_cleanup: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> =
                Rc::new(RefCell::new(None));
            let mut listeners = Vec::new();

            match start(&canvas_ref) {
                Ok((sandbox, completions, mut surface, canvas)) => {
                    listeners = input_listeners(&canvas, &sandbox.input());
                    *slot.borrow_mut() = Some(sandbox);

                    let closure = closure_for_cleanup.clone();
                    let loop_slot = slot.clone();
                    let frame_id = animation_frame_id.clone();
                    let mut last_time = 0.0;
                    let mut last_status = None;

                    *closure_for_cleanup.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
                        let delta = if last_time == 0.0 {
                            f64::from(PHYSICS_DT_MS)
                        } else {
                            (timestamp - last_time).min(100.0)
                        };
                        last_time = timestamp;

                        {
                            let mut guard = loop_slot.borrow_mut();
                            let Some(sandbox) = guard.as_mut() else {
                                return;
                            };

                            let finished = std::mem::take(&mut *completions.borrow_mut());
                            for (ticket, result) in finished {
                                sandbox.sprite_loaded(ticket, result);
                            }

                            let report = sandbox.frame(delta as f32, &mut surface);
                            if report.collisions > 0 {
                                tracing::trace!(
                                    steps = report.steps,
                                    collisions = report.collisions,
                                    cues = report.cues_played,
                                    "[client] frame"
                                );
                            }

                            let current = sandbox.status();
                            if last_status != Some(current) {
                                last_status = Some(current);
                                status.set(current);
                            }
                        }

                        if let Some(window) = web_sys::window() {
                            if let Some(ref closure) = *closure.borrow() {
                                let id = window
                                    .request_animation_frame(closure.as_ref().unchecked_ref())
                                    .ok();
                                *frame_id.borrow_mut() = id;
                            }
                        }
                    }));

                    if let Some(window) = web_sys::window() {
                        if let Some(ref closure) = *closure_for_cleanup.borrow() {
                            let id = window
                                .request_animation_frame(closure.as_ref().unchecked_ref())
                                .ok();
                            *animation_frame_id.borrow_mut() = id;
                        }
                    }
                }
                Err(e) => {
                    tracing::error!("[client] relax mode failed to start: {e:?}");
                }
            }

            move || {
                if let Some(id) = animation_frame_id.borrow_mut().take() {
                    if let Some(window) = web_sys::window() {
                        let _ = window.cancel_animation_frame(id);
                    }
                }
                *closure_for_cleanup.borrow_mut() = None;
                drop(listeners);

                if let Some(mut sandbox) = slot.borrow_mut().take() {
                    sandbox.teardown();
                }
                tracing::info!("[client] relax mode closed");
            }
        });
    }

    {
        let slot = slot.clone();
        use_effect_with(items, move |items| {
            if let Some(sandbox) = slot.borrow_mut().as_mut() {
                sandbox.set_items(items.as_ref().clone());
            }
            || ()
        });
    }

    status
}

fn start(
    canvas_ref: &NodeRef,
) -> Result<(Sandbox<WebAssets>, ImageCompletions, CanvasSurface, HtmlCanvasElement), JsValue> {
    let canvas = canvas_ref
        .cast::<HtmlCanvasElement>()
        .ok_or_else(|| JsValue::from_str("canvas not mounted"))?;
    let viewport = fit_canvas(&canvas);
    let surface = CanvasSurface::new(&canvas)?;

    let config = SandboxConfig {
        seed: js_sys::Date::now() as u64,
        ..SandboxConfig::default()
    };
    let completions = ImageCompletions::default();
    let sandbox = Sandbox::new(config, viewport, WebAssets::new(completions.clone()))
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    Ok((sandbox, completions, surface, canvas))
}
