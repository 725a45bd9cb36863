//! Input events queued by the host and drained once per frame.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// Raw input, in canvas pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InputEvent {
    PointerDown { position: Vec2 },
    PointerMove { position: Vec2 },
    PointerUp { position: Vec2 },
    /// Double-click or double-tap.
    DoubleClick { position: Vec2 },
    Resize { width: f32, height: f32 },
}

/// Shared input queue.
///
/// Event listeners push into it from browser callbacks; the frame loop
/// drains it before stepping, so input is never applied mid-step.
#[derive(Debug, Clone)]
pub struct InputQueue {
    inner: Arc<Mutex<VecDeque<InputEvent>>>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    pub fn push(&self, event: InputEvent) {
        self.inner.lock().push_back(event);
    }

    /// Drain all pending events in arrival order.
    pub fn drain(&self) -> Vec<InputEvent> {
        self.inner.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}
