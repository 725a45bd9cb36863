//! Rigid bodies: dynamic circles and static boxes.

use std::f32::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SandboxError;
use crate::math::Vec2;

/// Stable handle of a body. Never reused while its world is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub(crate) u64);

impl BodyId {
    /// Raw numeric value, for logging and hashing.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

/// Whether a body takes part in dynamics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Affected by gravity, impulses and the pointer.
    Dynamic,
    /// Immovable boundary.
    Static,
}

/// Collision shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle { radius: f32 },
    Rect { half_extents: Vec2 },
}

impl Shape {
    /// Area in square pixels.
    pub fn area(&self) -> f32 {
        match *self {
            Self::Circle { radius } => PI * radius * radius,
            Self::Rect { half_extents } => 4.0 * half_extents.x * half_extents.y,
        }
    }

    /// Half size of the axis-aligned bounding box.
    pub fn half_size(&self) -> Vec2 {
        match *self {
            Self::Circle { radius } => Vec2::splat(radius),
            Self::Rect { half_extents } => half_extents,
        }
    }

    /// Moment of inertia for the given mass about the centroid.
    fn inertia(&self, mass: f32) -> f32 {
        match *self {
            Self::Circle { radius } => 0.5 * mass * radius * radius,
            Self::Rect { half_extents } => {
                let size = half_extents * 2.0;
                mass * (size.x * size.x + size.y * size.y) / 12.0
            }
        }
    }
}

/// Surface and drag coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub restitution: f32,
    pub friction: f32,
    pub air_friction: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            restitution: 0.6,
            friction: 0.3,
            air_friction: 0.01,
        }
    }
}

/// Position and rotation of a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec2,
    pub angle: f32,
}

/// Description of a body to be created.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDesc {
    kind: BodyKind,
    shape: Shape,
    position: Vec2,
    velocity: Vec2,
    angle: f32,
    angular_velocity: f32,
    density: f32,
    material: Material,
}

impl BodyDesc {
    /// A dynamic circle of the given radius.
    pub fn dynamic_circle(radius: f32) -> Self {
        Self {
            kind: BodyKind::Dynamic,
            shape: Shape::Circle { radius },
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            angle: 0.0,
            angular_velocity: 0.0,
            density: 0.001,
            material: Material::default(),
        }
    }

    /// A static axis-aligned box.
    pub fn static_rect(half_extents: Vec2) -> Self {
        Self {
            kind: BodyKind::Static,
            shape: Shape::Rect { half_extents },
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            angle: 0.0,
            angular_velocity: 0.0,
            density: 0.0,
            material: Material {
                restitution: 0.0,
                friction: 0.3,
                air_friction: 0.0,
            },
        }
    }

    #[must_use]
    pub fn position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub fn velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    #[must_use]
    pub fn angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    #[must_use]
    pub fn angular_velocity(mut self, angular_velocity: f32) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    #[must_use]
    pub fn density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    #[must_use]
    pub fn material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }
}

/// A simulated rigid body.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    id: BodyId,
    kind: BodyKind,
    shape: Shape,
    pub position: Vec2,
    pub velocity: Vec2,
    pub angle: f32,
    pub angular_velocity: f32,
    density: f32,
    mass: f32,
    inv_mass: f32,
    inv_inertia: f32,
    pub material: Material,
}

impl Body {
    /// Builds a body from its description, enforcing positive finite mass
    /// for dynamic bodies.
    pub(crate) fn from_desc(id: BodyId, desc: BodyDesc) -> Result<Self, SandboxError> {
        if !desc.position.is_finite() || !desc.velocity.is_finite() {
            return Err(SandboxError::InvalidBody(format!(
                "{id} has a non-finite initial state"
            )));
        }

        let (mass, inv_mass, inv_inertia) = match desc.kind {
            BodyKind::Static => (f32::INFINITY, 0.0, 0.0),
            BodyKind::Dynamic => {
                let mass = desc.density * desc.shape.area();
                if !mass.is_finite() || mass <= 0.0 {
                    return Err(SandboxError::InvalidBody(format!(
                        "{id} would have mass {mass} (density {}, area {})",
                        desc.density,
                        desc.shape.area()
                    )));
                }
                (mass, 1.0 / mass, 1.0 / desc.shape.inertia(mass))
            }
        };

        let velocity = match desc.kind {
            BodyKind::Static => Vec2::ZERO,
            BodyKind::Dynamic => desc.velocity,
        };

        Ok(Self {
            id,
            kind: desc.kind,
            shape: desc.shape,
            position: desc.position,
            velocity,
            angle: desc.angle,
            angular_velocity: desc.angular_velocity,
            density: desc.density,
            mass,
            inv_mass,
            inv_inertia,
            material: desc.material,
        })
    }

    /// Stable id, unique for the life of the world.
    pub fn id(&self) -> BodyId {
        self.id
    }

    /// Whether the body moves.
    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    /// Collision shape.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// True for bodies moved by the stepper.
    pub fn is_dynamic(&self) -> bool {
        self.kind == BodyKind::Dynamic
    }

    /// Mass per unit area.
    pub fn density(&self) -> f32 {
        self.density
    }

    /// Mass; infinite for static bodies.
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Inverse mass; zero for static bodies.
    pub fn inv_mass(&self) -> f32 {
        self.inv_mass
    }

    /// Inverse moment of inertia; zero for static bodies.
    pub fn inv_inertia(&self) -> f32 {
        self.inv_inertia
    }

    /// Radius for circles, `None` for boxes.
    pub fn radius(&self) -> Option<f32> {
        match self.shape {
            Shape::Circle { radius } => Some(radius),
            Shape::Rect { .. } => None,
        }
    }

    /// Current position and angle.
    pub fn pose(&self) -> Pose {
        Pose {
            position: self.position,
            angle: self.angle,
        }
    }

    /// Axis-aligned bounds as `(min, max)`.
    pub fn aabb(&self) -> (Vec2, Vec2) {
        let half = self.shape.half_size();
        (self.position - half, self.position + half)
    }

    /// Whether `point` lies inside the shape.
    pub fn contains_point(&self, point: Vec2) -> bool {
        match self.shape {
            Shape::Circle { radius } => self.position.distance_squared(point) <= radius * radius,
            Shape::Rect { half_extents } => (point - self.position).abs().cmple(half_extents).all(),
        }
    }

    /// One free-flight sub-step: gravity, air drag, then position update.
    /// Velocities are in pixels per sub-step.
    pub(crate) fn integrate(&mut self, gravity_delta: Vec2, max_speed: f32) {
        if !self.is_dynamic() {
            return;
        }
        let drag = 1.0 - self.material.air_friction;
        self.velocity = ((self.velocity + gravity_delta) * drag).clamp_length_max(max_speed);
        self.angular_velocity *= drag;
        self.position += self.velocity;
        self.angle += self.angular_velocity;
    }

    /// Sub-step for a body held by the pointer: the spring sets the velocity
    /// so the body covers `stiffness` of the remaining distance to `target`.
    pub(crate) fn drive_towards(&mut self, target: Vec2, stiffness: f32, max_speed: f32) {
        if !self.is_dynamic() {
            return;
        }
        self.velocity = ((target - self.position) * stiffness).clamp_length_max(max_speed);
        self.angular_velocity *= 1.0 - self.material.air_friction;
        self.position += self.velocity;
        self.angle += self.angular_velocity;
    }

    /// Applies an impulse at `offset` from the center of mass.
    pub(crate) fn apply_impulse(&mut self, impulse: Vec2, offset: Vec2) {
        self.velocity += impulse * self.inv_mass;
        self.angular_velocity += offset.perp_dot(impulse) * self.inv_inertia;
    }

    /// Moves and reshapes a static body. Dynamic bodies are left untouched.
    pub(crate) fn reshape_static(&mut self, position: Vec2, half_extents: Vec2) {
        if self.is_dynamic() {
            return;
        }
        self.position = position;
        self.shape = Shape::Rect { half_extents };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dynamic_mass_is_density_times_area() {
        let body = Body::from_desc(BodyId(1), BodyDesc::dynamic_circle(50.0).density(0.003)).unwrap();
        let expected = 0.003 * PI * 2500.0;
        assert!((body.mass() - expected).abs() < 1e-4);
        assert!((body.inv_mass() - 1.0 / expected).abs() < 1e-6);
    }

    #[test]
    fn test_zero_density_rejected() {
        let result = Body::from_desc(BodyId(1), BodyDesc::dynamic_circle(30.0).density(0.0));
        assert!(matches!(result, Err(SandboxError::InvalidBody(_))));
    }

    #[test]
    fn test_static_body_has_infinite_mass() {
        let body = Body::from_desc(
            BodyId(1),
            BodyDesc::static_rect(Vec2::new(10.0, 10.0)).velocity(Vec2::X),
        )
        .unwrap();
        assert!(body.mass().is_infinite());
        assert_eq!(body.inv_mass(), 0.0);
        assert_eq!(body.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_static_ignores_integration_and_impulses() {
        let mut body = Body::from_desc(
            BodyId(1),
            BodyDesc::static_rect(Vec2::new(10.0, 10.0)).position(Vec2::new(5.0, 5.0)),
        )
        .unwrap();
        body.integrate(Vec2::new(0.0, 1.0), 100.0);
        body.apply_impulse(Vec2::new(1000.0, 0.0), Vec2::new(0.0, 5.0));
        assert_eq!(body.position, Vec2::new(5.0, 5.0));
        assert_eq!(body.velocity, Vec2::ZERO);
        assert_eq!(body.angular_velocity, 0.0);
    }

    #[test]
    fn test_integrate_applies_gravity_then_drag() {
        let mut body = Body::from_desc(BodyId(1), BodyDesc::dynamic_circle(10.0)).unwrap();
        body.integrate(Vec2::new(0.0, 1.0), 100.0);
        assert!((body.velocity.y - 0.99).abs() < 1e-6);
        assert!((body.position.y - 0.99).abs() < 1e-6);
    }

    #[test]
    fn test_integrate_clamps_speed() {
        let mut body = Body::from_desc(
            BodyId(1),
            BodyDesc::dynamic_circle(10.0).velocity(Vec2::new(500.0, 0.0)),
        )
        .unwrap();
        body.integrate(Vec2::ZERO, 30.0);
        assert!((body.velocity.length() - 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_drive_towards_sets_velocity() {
        let mut body = Body::from_desc(BodyId(1), BodyDesc::dynamic_circle(10.0)).unwrap();
        body.drive_towards(Vec2::new(100.0, 0.0), 0.2, 50.0);
        assert!((body.velocity.x - 20.0).abs() < 1e-5);
        assert!((body.position.x - 20.0).abs() < 1e-5);
    }

    #[test]
    fn test_contains_point() {
        let circle = Body::from_desc(
            BodyId(1),
            BodyDesc::dynamic_circle(10.0).position(Vec2::new(50.0, 50.0)),
        )
        .unwrap();
        assert!(circle.contains_point(Vec2::new(55.0, 55.0)));
        assert!(!circle.contains_point(Vec2::new(60.0, 60.0)));

        let rect = Body::from_desc(
            BodyId(2),
            BodyDesc::static_rect(Vec2::new(10.0, 5.0)).position(Vec2::new(0.0, 0.0)),
        )
        .unwrap();
        assert!(rect.contains_point(Vec2::new(9.0, -4.0)));
        assert!(!rect.contains_point(Vec2::new(11.0, 0.0)));
    }
}
