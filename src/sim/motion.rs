//! Fixed-step ball motion
//!
//! One call to [`step`] is one frame: every ball moves by its velocity,
//! friction is applied, slow balls snap to rest, pockets and cushions are
//! checked per ball, then all pairs are resolved once.

use glam::Vec2;

use super::collision::{BoundaryHit, check_boundaries, resolve_all_pairs};
use super::state::{Ball, TableGeometry};
use super::vector::{add, magnitude, scale};
use crate::settings::PhysicsConfig;

/// Summary of one physics step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    /// Any ball still has non-zero velocity after the step
    pub moving: bool,
    /// Ids that dropped into a pocket this step
    pub pocketed: Vec<u8>,
    pub cushion_hits: u32,
    pub ball_hits: u32,
}

/// Advance one ball's position and velocity; returns true if it still moves
pub fn integrate(ball: &mut Ball, config: &PhysicsConfig) -> bool {
    if !ball.active {
        return false;
    }
    ball.pos = add(ball.pos, ball.vel);
    ball.vel = scale(ball.vel, config.friction);

    if magnitude(ball.vel) < config.rest_speed {
        ball.vel = Vec2::ZERO;
        false
    } else {
        true
    }
}

/// Advance the whole table by one step
pub fn step(balls: &mut [Ball], table: &TableGeometry, config: &PhysicsConfig) -> StepReport {
    let mut report = StepReport::default();

    for ball in balls.iter_mut() {
        if !ball.active {
            continue;
        }
        integrate(ball, config);
        match check_boundaries(ball, table, config.wall_bounciness) {
            BoundaryHit::Pocket(pocket) => {
                log::debug!("Ball {} dropped into pocket {}", ball.id, pocket);
                report.pocketed.push(ball.id);
            }
            BoundaryHit::Cushion => report.cushion_hits += 1,
            BoundaryHit::None => {}
        }
    }

    report.ball_hits = resolve_all_pairs(balls, config.ball_bounciness);
    report.moving = balls.iter().any(Ball::is_moving);
    report
}
