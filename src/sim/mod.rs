//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by ball list order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod motion;
pub mod opponent;
pub mod rules;
pub mod shot;
pub mod state;
pub mod tick;
pub mod vector;

pub use collision::{BoundaryHit, CollisionResult, check_boundaries, check_overlap, resolve_pair};
pub use motion::{StepReport, step};
pub use opponent::{ShotPlan, choose_placement, legal_targets, plan_shot};
pub use rules::{TurnInput, TurnOutcome, Verdict, apply_outcome, find_free_spot, finish_turn, resolve_turn};
pub use shot::{AimPreview, aim_preview, can_grab, shot_velocity};
pub use state::{
    Ball, BallKind, CUE_ID, Drag, EIGHT_ID, GameEvent, GamePhase, GameState, Group, RngState, Side,
    TableGeometry, WinReason,
};
pub use tick::{TickConfig, TickInput, confirm_placement, move_cue_ball, placement_clear, tick};
