//! Vector math and contact geometry for circles and axis-aligned boxes.

pub use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Rule used to merge two material coefficients into one contact coefficient.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombineRule {
    #[default]
    Max,
    Min,
    Average,
    GeometricMean,
}

impl CombineRule {
    /// Combines two coefficients.
    pub fn combine(self, a: f32, b: f32) -> f32 {
        match self {
            Self::Max => a.max(b),
            Self::Min => a.min(b),
            Self::Average => (a + b) * 0.5,
            Self::GeometricMean => (a * b).max(0.0).sqrt(),
        }
    }
}

/// Overlap between two shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactGeometry {
    /// Unit normal pointing from the first shape towards the second.
    pub normal: Vec2,
    /// Penetration depth along `normal`.
    pub depth: f32,
}

impl ContactGeometry {
    /// Same contact seen from the other shape.
    #[must_use]
    pub fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            depth: self.depth,
        }
    }
}

/// Circle vs circle overlap test.
///
/// Coincident centers resolve along +Y so the result stays deterministic.
pub fn circle_circle(pa: Vec2, ra: f32, pb: Vec2, rb: f32) -> Option<ContactGeometry> {
    let delta = pb - pa;
    let radii = ra + rb;
    let dist_sq = delta.length_squared();
    if dist_sq >= radii * radii {
        return None;
    }

    let dist = dist_sq.sqrt();
    let normal = if dist > f32::EPSILON { delta / dist } else { Vec2::Y };
    Some(ContactGeometry {
        normal,
        depth: radii - dist,
    })
}

/// Circle vs axis-aligned box overlap test. The normal points from the circle
/// towards the box.
pub fn circle_box(
    center: Vec2,
    radius: f32,
    box_center: Vec2,
    half_extents: Vec2,
) -> Option<ContactGeometry> {
    let local = center - box_center;
    let closest = local.clamp(-half_extents, half_extents);

    if closest != local {
        let delta = closest - local;
        let dist_sq = delta.length_squared();
        if dist_sq >= radius * radius {
            return None;
        }
        let dist = dist_sq.sqrt();
        if dist > f32::EPSILON {
            return Some(ContactGeometry {
                normal: delta / dist,
                depth: radius - dist,
            });
        }
    }

    // Center is inside the box: push out through the nearest face.
    let gap = half_extents - local.abs();
    let (normal, face_gap) = if gap.x < gap.y {
        (Vec2::new(-local.x.signum(), 0.0), gap.x)
    } else {
        (Vec2::new(0.0, -local.y.signum()), gap.y)
    };
    Some(ContactGeometry {
        normal,
        depth: radius + face_gap.max(0.0),
    })
}

/// Velocity of a point rotating with angular velocity `omega` at offset `r`.
#[inline]
pub fn angular_to_linear(omega: f32, r: Vec2) -> Vec2 {
    r.perp() * omega
}
