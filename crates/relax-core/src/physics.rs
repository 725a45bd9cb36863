//! Fixed-step world simulation.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::body::{Body, BodyDesc, BodyId, Material, Pose};
use crate::boundary::{BoundaryLayout, Viewport};
use crate::clock::FrameClock;
use crate::collision::{self, Contact, SolveParams};
use crate::config::{BoundaryConfig, PhysicsConfig};
use crate::error::SandboxError;
use crate::events::CollisionEvent;
use crate::math::Vec2;
use crate::pointer::PointerState;
use crate::store::BodyStore;

/// Owns every body, the boundaries, the pointer grab and the pending
/// collision events of one sandbox session.
pub struct PhysicsWorld {
    pub(crate) config: PhysicsConfig,
    boundary_thickness: f32,
    viewport: Viewport,
    store: BodyStore,
    /// Ground, left wall, right wall.
    boundaries: [BodyId; 3],
    pub(crate) pointer: PointerState,
    events: Vec<CollisionEvent>,
    contacts: Vec<Contact>,
    clock: FrameClock,
    frame: u64,
}

impl fmt::Debug for PhysicsWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhysicsWorld")
            .field("frame", &self.frame)
            .field("body_count", &self.store.len())
            .field("viewport", &self.viewport)
            .field("pointer", &self.pointer)
            .finish_non_exhaustive()
    }
}

impl PhysicsWorld {
    /// Creates a world with its three static boundaries.
    pub fn new(
        config: PhysicsConfig,
        boundary: &BoundaryConfig,
        viewport: Viewport,
    ) -> Result<Self, SandboxError> {
        if !viewport.is_valid() {
            return Err(SandboxError::InvalidConfig(format!(
                "viewport must be positive, got {}x{}",
                viewport.width, viewport.height
            )));
        }

        let mut store = BodyStore::new();
        let material = Material {
            restitution: boundary.restitution,
            friction: boundary.friction,
            air_friction: 0.0,
        };
        let layout = BoundaryLayout::for_viewport(viewport, boundary.thickness);
        let mut boundaries = [BodyId(0); 3];
        for (slot, placement) in boundaries.iter_mut().zip(layout.placements()) {
            *slot = store.create_body(
                BodyDesc::static_rect(placement.half_extents)
                    .position(placement.center)
                    .material(material),
            )?;
        }

        tracing::info!(
            width = viewport.width,
            height = viewport.height,
            "[physics] world created"
        );

        Ok(Self {
            clock: FrameClock::new(config.step_ms, config.max_frame_ms),
            config,
            boundary_thickness: boundary.thickness,
            viewport,
            store,
            boundaries,
            pointer: PointerState::Idle,
            events: Vec::new(),
            contacts: Vec::new(),
            frame: 0,
        })
    }

    /// Adds a body and returns its fresh id.
    pub fn create_body(&mut self, desc: BodyDesc) -> Result<BodyId, SandboxError> {
        self.store.create_body(desc)
    }

    /// Removes a dynamic body. Boundaries and unknown ids are ignored.
    pub fn remove_body(&mut self, id: BodyId) -> Option<Body> {
        if self.boundaries.contains(&id) {
            tracing::warn!(%id, "[physics] refusing to remove boundary");
            return None;
        }
        if self.pointer.grabbed_body() == Some(id) {
            self.pointer = PointerState::Idle;
        }
        self.store.remove_body(id)
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.store.get(id)
    }

    pub fn pose(&self, id: BodyId) -> Option<Pose> {
        self.store.pose(id)
    }

    pub fn set_velocity(&mut self, id: BodyId, velocity: Vec2) -> bool {
        self.store.set_velocity(id, velocity)
    }

    pub fn for_each_dynamic(&self, f: impl FnMut(&Body)) {
        self.store.for_each_dynamic(f);
    }

    pub fn bodies(&self) -> &BodyStore {
        &self.store
    }

    pub fn boundary_ids(&self) -> [BodyId; 3] {
        self.boundaries
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn layout(&self) -> BoundaryLayout {
        BoundaryLayout::for_viewport(self.viewport, self.boundary_thickness)
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Velocity change applied by gravity in one sub-step.
    pub fn gravity_delta(&self) -> Vec2 {
        self.config.gravity_delta()
    }

    /// Advances the simulation by one fixed sub-step.
    pub fn step(&mut self) {
        let gravity = self.gravity_delta();
        let max_speed = self.config.max_speed;
        let grab = self
            .pointer
            .grab()
            .map(|grab| (grab.body, grab.target()));

        for body in self.store.as_mut_slice() {
            match grab {
                Some((id, target)) if id == body.id() => {
                    body.drive_towards(target, self.config.grab_stiffness, max_speed);
                }
                _ => body.integrate(gravity, max_speed),
            }
        }

        let bodies = self.store.as_mut_slice();
        collision::find_contacts(bodies, &mut self.contacts);

        for contact in &self.contacts {
            let relative_speed =
                collision::approach_speed(&bodies[contact.a], &bodies[contact.b], &contact.geometry);
            self.events.push(CollisionEvent {
                body_a: bodies[contact.a].id(),
                body_b: bodies[contact.b].id(),
                relative_speed,
            });
        }

        let params = SolveParams {
            restitution_rule: self.config.restitution_rule,
            friction_rule: self.config.friction_rule,
            resting_speed: self.config.resting_speed,
            correction: self.config.position_correction,
            slop: self.config.position_slop,
        };
        for _ in 0..self.config.velocity_iterations {
            for contact in &self.contacts {
                let (a, b) = collision::pair_mut(bodies, contact.a, contact.b);
                collision::solve_velocity(a, b, &contact.geometry, &params);
            }
        }
        for contact in &self.contacts {
            let (a, b) = collision::pair_mut(bodies, contact.a, contact.b);
            collision::correct_position(a, b, &contact.geometry, &params);
        }

        self.contain();
        self.frame += 1;
    }

    /// Advances by `n` sub-steps.
    pub fn step_n(&mut self, n: u32) {
        for _ in 0..n {
            self.step();
        }
    }

    /// Feeds wall-clock time into the frame clock and runs the sub-steps that
    /// became due. Returns how many ran.
    pub fn advance(&mut self, elapsed_ms: f32) -> u32 {
        let steps = self.clock.advance(elapsed_ms);
        self.step_n(steps);
        steps
    }

    /// Takes the collision events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Top-most dynamic body under `point`, if any.
    pub fn pick(&self, point: Vec2) -> Option<BodyId> {
        self.store
            .iter()
            .rev()
            .find(|body| body.is_dynamic() && body.contains_point(point))
            .map(Body::id)
    }

    /// Moves the boundaries to fit a new viewport and pulls dynamic bodies
    /// back inside if the viewport shrank under them.
    pub fn resize(&mut self, viewport: Viewport) {
        if !viewport.is_valid() {
            tracing::warn!(
                width = viewport.width,
                height = viewport.height,
                "[physics] ignoring invalid resize"
            );
            return;
        }
        self.viewport = viewport;

        let layout = self.layout();
        for (id, placement) in self.boundaries.into_iter().zip(layout.placements()) {
            if let Some(body) = self.store.get_mut(id) {
                body.reshape_static(placement.center, placement.half_extents);
            }
        }

        self.contain();
        tracing::info!(
            width = viewport.width,
            height = viewport.height,
            "[physics] boundaries resized"
        );
    }

    /// Keeps every dynamic body inside the walls and above the ground.
    fn contain(&mut self) {
        let (min_x, max_x, ground_y) = self.layout().interior();
        for body in self.store.as_mut_slice() {
            if !body.is_dynamic() {
                continue;
            }
            let radius = body.radius().unwrap_or(0.0);
            let (lo, hi) = if max_x - min_x >= 2.0 * radius {
                (min_x + radius, max_x - radius)
            } else {
                let mid = (min_x + max_x) * 0.5;
                (mid, mid)
            };

            if body.position.x < lo {
                body.position.x = lo;
                body.velocity.x = body.velocity.x.max(0.0);
            } else if body.position.x > hi {
                body.position.x = hi;
                body.velocity.x = body.velocity.x.min(0.0);
            }
            if body.position.y > ground_y - radius {
                body.position.y = ground_y - radius;
                body.velocity.y = body.velocity.y.min(0.0);
            }
        }
    }

    /// Removes every body, boundaries included, and releases any grab.
    pub fn clear(&mut self) {
        self.store.clear();
        self.pointer = PointerState::Idle;
        self.events.clear();
        self.contacts.clear();
        self.clock.reset();
    }

    /// Deterministic hash of the simulation state.
    pub fn compute_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.frame.hash(&mut hasher);

        for body in self.store.iter() {
            body.id().hash(&mut hasher);
            hash_f32(body.position.x, &mut hasher);
            hash_f32(body.position.y, &mut hasher);
            hash_f32(body.angle, &mut hasher);
            hash_f32(body.velocity.x, &mut hasher);
            hash_f32(body.velocity.y, &mut hasher);
            hash_f32(body.angular_velocity, &mut hasher);
        }

        hasher.finish()
    }

    /// Number of sub-steps run so far.
    pub fn current_frame(&self) -> u64 {
        self.frame
    }
}

fn hash_f32(value: f32, hasher: &mut impl Hasher) {
    value.to_bits().hash(hasher);
}
