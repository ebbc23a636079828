//! Drag-to-shoot input mapping
//!
//! The player pulls back from the cue ball like drawing a slingshot: the
//! shot goes from the release point toward where the drag started.

use glam::Vec2;

use super::vector::{distance, magnitude, normalize, scale, sub};
use crate::consts::AIM_GRAB_RADIUS;
use crate::settings::PhysicsConfig;

/// Raw (unclamped) power of a drag
#[inline]
pub fn raw_power(start: Vec2, end: Vec2, config: &PhysicsConfig) -> f32 {
    magnitude(sub(start, end)) / config.drag_sensitivity
}

/// Launch velocity for a drag, or `None` if the drag was too short to count
pub fn shot_velocity(start: Vec2, end: Vec2, config: &PhysicsConfig) -> Option<Vec2> {
    let pull_back = sub(start, end);
    let raw = raw_power(start, end, config);
    if raw <= config.min_shot_power {
        return None;
    }
    let power = raw.min(config.max_power);
    Some(scale(normalize(pull_back), power))
}

/// Whether a press at `point` grabs the cue ball for aiming
pub fn can_grab(cue_pos: Vec2, point: Vec2) -> bool {
    distance(point, cue_pos) < AIM_GRAB_RADIUS
}

/// Geometry of the aim guide and cue stick for the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimPreview {
    /// Cue ball center
    pub origin: Vec2,
    /// End of the dashed guide line
    pub guide_end: Vec2,
    /// Unit direction the shot would travel
    pub direction: Vec2,
    /// How far the stick sits back from its resting offset
    pub pull_back: f32,
    /// Power the shot would have, clamped
    pub power: f32,
}

/// Guide line is the pull-back vector tripled; the stick retreats five
/// units per unit of power.
pub fn aim_preview(cue_pos: Vec2, start: Vec2, current: Vec2, config: &PhysicsConfig) -> AimPreview {
    let drag = sub(start, current);
    let power = raw_power(start, current, config).min(config.max_power);
    AimPreview {
        origin: cue_pos,
        guide_end: cue_pos + drag * 3.0,
        direction: normalize(drag),
        pull_back: power * 5.0,
        power,
    }
}
