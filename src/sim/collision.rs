//! Collision detection and response for balls, cushions and pockets
//!
//! Ball-ball contacts use an equal-mass impulse along the line of centers.
//! Cushions are the four edges of the playable rectangle; pockets are
//! circles that swallow any ball whose center enters them.

use glam::Vec2;

use super::state::{Ball, TableGeometry};
use super::vector::{add, distance, dot, magnitude, normalize, scale, sub};

/// Result of a ball-ball contact check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether the balls overlap
    pub hit: bool,
    /// Unit normal from the first ball toward the second
    pub normal: Vec2,
    /// Overlap depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// True iff both balls are on the table and strictly overlapping
pub fn check_overlap(a: &Ball, b: &Ball) -> bool {
    if !a.active || !b.active {
        return false;
    }
    distance(a.pos, b.pos) < a.radius + b.radius
}

/// Contact geometry between two balls
///
/// Coincident centers have no defined normal; they get +X so the pair can
/// still be separated.
pub fn ball_ball_contact(a: &Ball, b: &Ball) -> CollisionResult {
    if !check_overlap(a, b) {
        return CollisionResult::miss();
    }

    let diff = sub(b.pos, a.pos);
    let dist = magnitude(diff);
    let normal = if dist == 0.0 { Vec2::X } else { normalize(diff) };

    CollisionResult {
        hit: true,
        normal,
        penetration: a.radius + b.radius - dist,
    }
}

/// Push an overlapping pair apart and exchange momentum along the normal
///
/// Returns true if an impulse was applied (the balls were approaching).
pub fn resolve_pair(a: &mut Ball, b: &mut Ball, restitution: f32) -> bool {
    let contact = ball_ball_contact(a, b);
    if !contact.hit {
        return false;
    }
    let normal = contact.normal;

    // Half the penetration each
    let separation = scale(normal, contact.penetration / 2.0);
    a.pos = sub(a.pos, separation);
    b.pos = add(b.pos, separation);

    let relative = sub(b.vel, a.vel);
    let vel_along_normal = dot(relative, normal);
    if vel_along_normal > 0.0 {
        // Already separating
        return false;
    }

    // Equal masses
    let impulse_scalar = -(1.0 + restitution) * vel_along_normal / 2.0;
    let impulse = scale(normal, impulse_scalar);
    a.vel = sub(a.vel, impulse);
    b.vel = add(b.vel, impulse);
    true
}

/// Run every pair once in ascending (i, j) order
///
/// Returns the number of impulses applied.
pub fn resolve_all_pairs(balls: &mut [Ball], restitution: f32) -> u32 {
    let mut impacts = 0;
    for i in 0..balls.len() {
        for j in (i + 1)..balls.len() {
            let (head, tail) = balls.split_at_mut(j);
            let a = &mut head[i];
            let b = &mut tail[0];
            if check_overlap(a, b) && resolve_pair(a, b, restitution) {
                impacts += 1;
            }
        }
    }
    impacts
}

/// Index of the pocket the ball center has dropped into, if any
pub fn pocket_hit(pos: Vec2, table: &TableGeometry) -> Option<usize> {
    table
        .pockets
        .iter()
        .position(|&pocket| distance(pos, pocket) < table.pocket_radius)
}

/// Clamp a ball off the cushions, reflecting and damping the perpendicular
/// velocity. Returns true if any cushion was touched.
pub fn bounce_off_cushions(ball: &mut Ball, table: &TableGeometry, wall_bounciness: f32) -> bool {
    let min = table.play_min(ball.radius);
    let max = table.play_max(ball.radius);
    let mut hit = false;

    if ball.pos.x < min.x {
        ball.pos.x = min.x;
        ball.vel.x *= -wall_bounciness;
        hit = true;
    } else if ball.pos.x > max.x {
        ball.pos.x = max.x;
        ball.vel.x *= -wall_bounciness;
        hit = true;
    }

    if ball.pos.y < min.y {
        ball.pos.y = min.y;
        ball.vel.y *= -wall_bounciness;
        hit = true;
    } else if ball.pos.y > max.y {
        ball.pos.y = max.y;
        ball.vel.y *= -wall_bounciness;
        hit = true;
    }

    hit
}

/// What the boundary pass did to a ball
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryHit {
    None,
    Cushion,
    Pocket(usize),
}

/// Pocket check first, cushions only if the ball stayed on the table
pub fn check_boundaries(ball: &mut Ball, table: &TableGeometry, wall_bounciness: f32) -> BoundaryHit {
    if !ball.active {
        return BoundaryHit::None;
    }
    if let Some(pocket) = pocket_hit(ball.pos, table) {
        ball.pocket();
        return BoundaryHit::Pocket(pocket);
    }
    if bounce_off_cushions(ball, table, wall_bounciness) {
        BoundaryHit::Cushion
    } else {
        BoundaryHit::None
    }
}
