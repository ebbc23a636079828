//! Scripted opponent
//!
//! Picks a random legal target, aims straight at it with a little jitter and
//! hits it with a random power from a fixed band. No lookahead.

use glam::Vec2;
use rand::Rng;

use super::state::{Ball, BallKind, EIGHT_ID, GameState, Side};
use super::tick::placement_clear;
use crate::{angle_of, direction_from_angle};

/// Maximum aim error either side of the true line (radians)
pub const AIM_JITTER: f32 = 0.025;
/// Shot power band
pub const OPPONENT_MIN_POWER: f32 = 12.0;
pub const OPPONENT_MAX_POWER: f32 = 15.0;
/// Attempts to find a clear ball-in-hand spot before taking the last one
pub const PLACEMENT_ATTEMPTS: u32 = 32;

/// A decided shot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotPlan {
    pub target_id: u8,
    pub target_kind: BallKind,
    pub target_number: Option<u8>,
    pub angle: f32,
    pub power: f32,
}

impl ShotPlan {
    pub fn velocity(&self) -> Vec2 {
        direction_from_angle(self.angle) * self.power
    }
}

/// Balls `side` may aim at, most specific set first
pub fn legal_targets(state: &GameState, side: Side) -> Vec<&Ball> {
    let on_table = || state.balls.iter().filter(|b| b.active);

    let targets: Vec<&Ball> = match state.group_of(side) {
        None => on_table()
            .filter(|b| matches!(b.kind, BallKind::Solid | BallKind::Stripe))
            .collect(),
        Some(group) => {
            let own: Vec<&Ball> = on_table().filter(|b| b.kind == group.kind()).collect();
            if own.is_empty() {
                on_table().filter(|b| b.id == EIGHT_ID).collect()
            } else {
                own
            }
        }
    };

    if targets.is_empty() {
        on_table().filter(|b| !b.is_cue()).collect()
    } else {
        targets
    }
}

/// Choose a target and aim for `side`; `None` if there is nothing to hit
pub fn plan_shot<R: Rng>(state: &GameState, side: Side, rng: &mut R) -> Option<ShotPlan> {
    let cue = state.balls.iter().find(|b| b.is_cue() && b.active)?;
    let targets = legal_targets(state, side);
    if targets.is_empty() {
        return None;
    }
    let target = targets[rng.random_range(0..targets.len())];

    let jitter = (rng.random::<f32>() - 0.5) * 2.0 * AIM_JITTER;
    let angle = angle_of(target.pos - cue.pos) + jitter;
    let power = rng.random_range(OPPONENT_MIN_POWER..OPPONENT_MAX_POWER);

    log::debug!(
        "{} aims at {} {:?}: angle {:.3}, power {:.2}",
        side.name(),
        target.kind.as_str(),
        target.number,
        angle,
        power
    );

    Some(ShotPlan {
        target_id: target.id,
        target_kind: target.kind,
        target_number: target.number,
        angle,
        power,
    })
}

/// Pick a ball-in-hand spot in the kitchen (left quarter of the felt)
pub fn choose_placement<R: Rng>(state: &GameState, rng: &mut R) -> Vec2 {
    let table = &state.table;
    let Some(cue) = state.cue() else {
        return table.head_spot();
    };
    let min = table.play_min(cue.radius);
    let max = table.play_max(cue.radius);
    let kitchen_max_x = (table.cushion + table.width * 0.25).min(max.x);

    let mut spot = table.head_spot();
    for _ in 0..PLACEMENT_ATTEMPTS {
        spot = Vec2::new(
            rng.random_range(min.x..=kitchen_max_x),
            rng.random_range(min.y..=max.y),
        );
        if placement_clear(state, spot) {
            return spot;
        }
    }
    log::warn!("No clear ball-in-hand spot found; placing at ({:.1}, {:.1})", spot.x, spot.y);
    spot
}
