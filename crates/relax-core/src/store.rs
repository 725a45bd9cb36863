//! Body storage with stable ids and constant-time lookup.

use std::collections::HashMap;

use crate::body::{Body, BodyDesc, BodyId, Pose};
use crate::error::SandboxError;
use crate::math::Vec2;

/// Owns every body of a world.
///
/// Bodies are kept in ascending id order, which is also the order contacts
/// are resolved in.
#[derive(Debug, Default)]
pub struct BodyStore {
    bodies: Vec<Body>,
    slots: HashMap<BodyId, usize>,
    next_id: u64,
}

impl BodyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a body and returns its fresh id.
    pub fn create_body(&mut self, desc: BodyDesc) -> Result<BodyId, SandboxError> {
        let id = BodyId(self.next_id);
        let body = Body::from_desc(id, desc)?;
        self.next_id += 1;

        self.slots.insert(id, self.bodies.len());
        self.bodies.push(body);
        Ok(id)
    }

    /// Removes a body. Unknown ids are ignored.
    pub fn remove_body(&mut self, id: BodyId) -> Option<Body> {
        let index = self.slots.remove(&id)?;
        let body = self.bodies.remove(index);
        for (offset, shifted) in self.bodies[index..].iter().enumerate() {
            self.slots.insert(shifted.id(), index + offset);
        }
        Some(body)
    }

    /// Looks a body up by id.
    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.slots.get(&id).map(|&index| &self.bodies[index])
    }

    /// Mutable lookup by id.
    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.slots.get(&id).map(|&index| &mut self.bodies[index])
    }

    /// Whether `id` is alive.
    pub fn contains(&self, id: BodyId) -> bool {
        self.slots.contains_key(&id)
    }

    /// Position and angle of a body.
    pub fn pose(&self, id: BodyId) -> Option<Pose> {
        self.get(id).map(Body::pose)
    }

    /// Overwrites the velocity of a dynamic body. Returns false for unknown
    /// or static bodies.
    pub fn set_velocity(&mut self, id: BodyId, velocity: Vec2) -> bool {
        match self.get_mut(id) {
            Some(body) if body.is_dynamic() => {
                body.velocity = velocity;
                true
            }
            _ => false,
        }
    }

    /// Visits dynamic bodies in id order.
    pub fn for_each_dynamic(&self, mut f: impl FnMut(&Body)) {
        self.bodies.iter().filter(|b| b.is_dynamic()).for_each(|b| f(b));
    }

    /// All bodies in ascending id order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Body> {
        self.bodies.iter()
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [Body] {
        &mut self.bodies
    }

    /// Number of bodies, boundaries included.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// True when no body is alive.
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Number of dynamic bodies.
    pub fn dynamic_count(&self) -> usize {
        self.bodies.iter().filter(|b| b.is_dynamic()).count()
    }

    /// Removes every body. Ids keep counting up.
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.slots.clear();
    }
}
