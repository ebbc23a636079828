//! Eight Ball - 8-ball pool against a scripted opponent
//!
//! Core modules:
//! - `sim`: Deterministic simulation (ball physics, 8-ball rules, opponent)
//! - `renderer`: WebGPU rendering pipeline
//! - `commentary`: Chat log and the optional text-generation side channel
//! - `settings`: Persisted preferences and the physics configuration

pub mod commentary;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::{PhysicsConfig, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep. One step is one "frame" of ball travel.
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Table dimensions (outer edge of the rails)
    pub const TABLE_WIDTH: f32 = 800.0;
    pub const TABLE_HEIGHT: f32 = 400.0;
    /// Width of the wooden rail; the playable felt starts here
    pub const CUSHION_WIDTH: f32 = 32.0;

    pub const BALL_RADIUS: f32 = 10.0;
    pub const POCKET_RADIUS: f32 = 16.0;

    /// Per-step velocity multiplier
    pub const FRICTION: f32 = 0.985;
    /// Energy kept by the perpendicular velocity after a cushion bounce
    pub const WALL_BOUNCINESS: f32 = 0.8;
    /// Ball-to-ball restitution
    pub const BALL_BOUNCINESS: f32 = 0.9;
    /// Maximum shot speed (units per step)
    pub const MAX_POWER: f32 = 15.0;
    /// Below this speed a ball snaps to rest
    pub const REST_SPEED: f32 = 0.05;

    /// Drag length divided by this gives raw shot power
    pub const DRAG_SENSITIVITY: f32 = 5.0;
    /// Raw power must exceed this for a drag to count as a shot
    pub const MIN_SHOT_POWER: f32 = 1.0;
    /// A drag only starts this close to the cue ball
    pub const AIM_GRAB_RADIUS: f32 = 100.0;

    /// Opponent think time before it commits a shot (1.5 s at 60 Hz)
    pub const OPPONENT_DELAY_TICKS: u32 = 90;
}

/// Unit vector pointing along `angle` (radians, y down)
#[inline]
pub fn direction_from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Angle of a vector (radians, y down)
#[inline]
pub fn angle_of(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}
