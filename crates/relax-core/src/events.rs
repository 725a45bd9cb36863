use serde::{Deserialize, Serialize};

use crate::body::BodyId;

/// A contact detected during a sub-step.
///
/// `body_a < body_b`. `relative_speed` is the approach speed along the
/// contact normal before the contact was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionEvent {
    pub body_a: BodyId,
    pub body_b: BodyId,
    pub relative_speed: f32,
}

impl CollisionEvent {
    pub fn involves(&self, id: BodyId) -> bool {
        self.body_a == id || self.body_b == id
    }
}
