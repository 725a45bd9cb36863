//! Broad phase, narrow phase and impulse resolution.

use crate::body::{Body, Shape};
use crate::math::{CombineRule, ContactGeometry, Vec2, angular_to_linear, circle_box, circle_circle};

/// A detected overlap between two bodies, by index into the store slice.
/// `a < b` always holds, so ordering by `(a, b)` is ordering by id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Contact {
    pub a: usize,
    pub b: usize,
    pub geometry: ContactGeometry,
}

/// Coefficients used while solving contacts.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SolveParams {
    pub restitution_rule: CombineRule,
    pub friction_rule: CombineRule,
    pub resting_speed: f32,
    pub correction: f32,
    pub slop: f32,
}

/// Finds all overlapping pairs, sorted by `(a, b)`.
///
/// Sweep-and-prune along x, then exact shape tests. Static-static pairs are
/// skipped.
pub(crate) fn find_contacts(bodies: &[Body], out: &mut Vec<Contact>) {
    out.clear();

    let mut order: Vec<(usize, Vec2, Vec2)> = bodies
        .iter()
        .enumerate()
        .map(|(index, body)| {
            let (min, max) = body.aabb();
            (index, min, max)
        })
        .collect();
    order.sort_by(|l, r| l.1.x.total_cmp(&r.1.x).then(l.0.cmp(&r.0)));

    for (i, &(ia, min_a, max_a)) in order.iter().enumerate() {
        for &(ib, min_b, max_b) in &order[i + 1..] {
            if min_b.x > max_a.x {
                break;
            }
            if min_b.y > max_a.y || max_b.y < min_a.y {
                continue;
            }

            let (a, b) = if ia < ib { (ia, ib) } else { (ib, ia) };
            if !bodies[a].is_dynamic() && !bodies[b].is_dynamic() {
                continue;
            }
            if let Some(geometry) = narrow_phase(&bodies[a], &bodies[b]) {
                out.push(Contact { a, b, geometry });
            }
        }
    }

    out.sort_by(|l, r| l.a.cmp(&r.a).then(l.b.cmp(&r.b)));
}

fn narrow_phase(a: &Body, b: &Body) -> Option<ContactGeometry> {
    match (a.shape(), b.shape()) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            circle_circle(a.position, ra, b.position, rb)
        }
        (Shape::Circle { radius }, Shape::Rect { half_extents }) => {
            circle_box(a.position, radius, b.position, half_extents)
        }
        (Shape::Rect { half_extents }, Shape::Circle { radius }) => {
            circle_box(b.position, radius, a.position, half_extents).map(ContactGeometry::flipped)
        }
        // Only boundaries are boxes and they never collide with each other.
        (Shape::Rect { .. }, Shape::Rect { .. }) => None,
    }
}

/// Borrows two distinct bodies mutably. Requires `i < j`.
pub(crate) fn pair_mut(bodies: &mut [Body], i: usize, j: usize) -> (&mut Body, &mut Body) {
    debug_assert!(i < j);
    let (head, tail) = bodies.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}

/// Offsets from each center to the contact point.
fn contact_offsets(a: &Body, b: &Body, geometry: &ContactGeometry) -> (Vec2, Vec2) {
    let point = match (a.radius(), b.radius()) {
        (Some(ra), _) => a.position + geometry.normal * (ra - geometry.depth * 0.5),
        (None, Some(rb)) => b.position - geometry.normal * (rb - geometry.depth * 0.5),
        (None, None) => (a.position + b.position) * 0.5,
    };
    (point - a.position, point - b.position)
}

fn relative_velocity(a: &Body, b: &Body, ra: Vec2, rb: Vec2) -> Vec2 {
    (b.velocity + angular_to_linear(b.angular_velocity, rb))
        - (a.velocity + angular_to_linear(a.angular_velocity, ra))
}

/// Speed at which the two bodies approach along the contact normal.
pub(crate) fn approach_speed(a: &Body, b: &Body, geometry: &ContactGeometry) -> f32 {
    let (ra, rb) = contact_offsets(a, b, geometry);
    (-relative_velocity(a, b, ra, rb).dot(geometry.normal)).max(0.0)
}

/// Applies the normal and friction impulses for one contact.
pub(crate) fn solve_velocity(a: &mut Body, b: &mut Body, geometry: &ContactGeometry, params: &SolveParams) {
    let normal = geometry.normal;
    let (ra, rb) = contact_offsets(a, b, geometry);

    let vn = relative_velocity(a, b, ra, rb).dot(normal);
    if vn >= 0.0 {
        return;
    }

    let restitution = if -vn < params.resting_speed {
        0.0
    } else {
        params
            .restitution_rule
            .combine(a.material.restitution, b.material.restitution)
    };

    let k_normal = effective_mass(a, b, ra, rb, normal);
    if k_normal <= 0.0 {
        return;
    }
    let jn = -(1.0 + restitution) * vn / k_normal;
    a.apply_impulse(-normal * jn, ra);
    b.apply_impulse(normal * jn, rb);

    // Coulomb friction, bounded by the normal impulse.
    let v_rel = relative_velocity(a, b, ra, rb);
    let tangent = v_rel - normal * v_rel.dot(normal);
    if tangent.length_squared() <= f32::EPSILON {
        return;
    }
    let tangent = tangent.normalize();
    let k_tangent = effective_mass(a, b, ra, rb, tangent);
    if k_tangent <= 0.0 {
        return;
    }
    let mu = params
        .friction_rule
        .combine(a.material.friction, b.material.friction);
    let jt = (-v_rel.dot(tangent) / k_tangent).clamp(-mu * jn, mu * jn);
    a.apply_impulse(-tangent * jt, ra);
    b.apply_impulse(tangent * jt, rb);
}

fn effective_mass(a: &Body, b: &Body, ra: Vec2, rb: Vec2, axis: Vec2) -> f32 {
    let rna = ra.perp_dot(axis);
    let rnb = rb.perp_dot(axis);
    a.inv_mass() + b.inv_mass() + rna * rna * a.inv_inertia() + rnb * rnb * b.inv_inertia()
}

/// Pushes the bodies apart along the normal, split by inverse mass.
pub(crate) fn correct_position(a: &mut Body, b: &mut Body, geometry: &ContactGeometry, params: &SolveParams) {
    let total = a.inv_mass() + b.inv_mass();
    if total <= 0.0 {
        return;
    }
    let depth = (geometry.depth - params.slop).max(0.0);
    let correction = geometry.normal * (depth * params.correction / total);
    a.position -= correction * a.inv_mass();
    b.position += correction * b.inv_mass();
}
