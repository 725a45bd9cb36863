//! Static ground and side walls laid out from the viewport.

use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// Canvas size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Placement of one boundary box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryPlacement {
    pub center: Vec2,
    pub half_extents: Vec2,
}

/// Ground plus left and right walls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryLayout {
    pub ground: BoundaryPlacement,
    pub left: BoundaryPlacement,
    pub right: BoundaryPlacement,
}

impl BoundaryLayout {
    /// Lays the boundaries flush with the viewport edges.
    ///
    /// The ground overhangs both walls and the walls reach one viewport height
    /// above the top edge, so thrown bodies cannot leave over the sides.
    pub fn for_viewport(viewport: Viewport, thickness: f32) -> Self {
        let Viewport { width, height } = viewport;
        let half_t = thickness * 0.5;
        Self {
            ground: BoundaryPlacement {
                center: Vec2::new(width * 0.5, height - half_t),
                half_extents: Vec2::new(width * 0.5 + thickness, half_t),
            },
            left: BoundaryPlacement {
                center: Vec2::new(half_t, 0.0),
                half_extents: Vec2::new(half_t, height),
            },
            right: BoundaryPlacement {
                center: Vec2::new(width - half_t, 0.0),
                half_extents: Vec2::new(half_t, height),
            },
        }
    }

    pub fn placements(&self) -> [BoundaryPlacement; 3] {
        [self.ground, self.left, self.right]
    }

    /// Interior region `(min_x, max_x, ground_y)` that dynamic bodies live in.
    pub fn interior(&self) -> (f32, f32, f32) {
        (
            self.left.center.x + self.left.half_extents.x,
            self.right.center.x - self.right.half_extents.x,
            self.ground.center.y - self.ground.half_extents.y,
        )
    }
}
