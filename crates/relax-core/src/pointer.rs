//! Pointer grab-and-throw.
//!
//! While a body is grabbed the stepper replaces its free flight with a spring
//! towards the pointer. Releasing simply removes the spring, so the body keeps
//! whatever velocity the spring gave it last and flies off as a throw.

use crate::body::BodyId;
use crate::math::Vec2;
use crate::physics::PhysicsWorld;

/// An active grab.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerGrab {
    pub body: BodyId,
    /// Pointer position minus body center at pick time.
    pub offset: Vec2,
    pub pointer: Vec2,
}

impl PointerGrab {
    /// Where the spring pulls the body's center.
    pub fn target(&self) -> Vec2 {
        self.pointer - self.offset
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PointerState {
    #[default]
    Idle,
    Grabbing(PointerGrab),
}

impl PointerState {
    pub fn grab(&self) -> Option<&PointerGrab> {
        match self {
            Self::Idle => None,
            Self::Grabbing(grab) => Some(grab),
        }
    }

    pub fn grabbed_body(&self) -> Option<BodyId> {
        self.grab().map(|grab| grab.body)
    }

    pub fn is_grabbing(&self) -> bool {
        matches!(self, Self::Grabbing(_))
    }
}

impl PhysicsWorld {
    /// Grabs the top-most dynamic body under `position`.
    ///
    /// Ignored while another body is held or when nothing is under the pointer.
    pub fn pointer_down(&mut self, position: Vec2) -> Option<BodyId> {
        if let PointerState::Grabbing(grab) = self.pointer {
            tracing::debug!(held = %grab.body, "[pointer] already grabbing, ignoring pointer down");
            return None;
        }

        let id = self.pick(position)?;
        let center = self.body(id)?.position;
        self.pointer = PointerState::Grabbing(PointerGrab {
            body: id,
            offset: position - center,
            pointer: position,
        });
        tracing::debug!(%id, x = position.x, y = position.y, "[pointer] grabbed");
        Some(id)
    }

    /// Moves the spring target. No effect while idle.
    pub fn pointer_move(&mut self, position: Vec2) {
        if let PointerState::Grabbing(grab) = &mut self.pointer {
            grab.pointer = position;
        }
    }

    /// Releases the grab and returns the released body.
    pub fn pointer_up(&mut self, position: Vec2) -> Option<BodyId> {
        let PointerState::Grabbing(grab) = std::mem::take(&mut self.pointer) else {
            return None;
        };
        let speed = self.body(grab.body).map_or(0.0, |body| body.velocity.length());
        tracing::debug!(id = %grab.body, x = position.x, y = position.y, speed, "[pointer] released");
        Some(grab.body)
    }

    pub fn pointer_state(&self) -> &PointerState {
        &self.pointer
    }
}
