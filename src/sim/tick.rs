//! Fixed timestep simulation tick
//!
//! Core game loop that advances the table deterministically. Pointer input
//! is applied first, then the opponent (or autoplay) gets a chance to act,
//! then the balls move if a shot is in progress. When the last ball stops
//! the shot is handed to the rule engine.

use glam::Vec2;

use super::collision::{check_overlap, pocket_hit};
use super::motion;
use super::opponent::{choose_placement, plan_shot};
use super::rules::finish_turn;
use super::shot::{can_grab, shot_velocity};
use super::state::{CUE_ID, Drag, GameEvent, GamePhase, GameState, PendingShot, Side};
use crate::settings::PhysicsConfig;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer pressed at this table point
    pub press: Option<Vec2>,
    /// Pointer moved to this table point
    pub pointer: Option<Vec2>,
    /// Pointer released at this table point
    pub release: Option<Vec2>,
    /// Confirm ball-in-hand placement where the cue ball currently is
    pub confirm_place: bool,
    /// Autoplay mode - the opponent policy also plays the player's side
    pub autoplay: bool,
}

/// Per-run parameters for the tick
#[derive(Debug, Clone)]
pub struct TickConfig {
    pub physics: PhysicsConfig,
    /// Opponent think time before it shoots
    pub opponent_delay_ticks: u32,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            opponent_delay_ticks: crate::consts::OPPONENT_DELAY_TICKS,
        }
    }
}

/// Advance the game by one fixed step
pub fn tick(state: &mut GameState, input: &TickInput, config: &TickConfig) {
    if state.phase == GamePhase::GameOver {
        return;
    }
    state.time_ticks += 1;

    let scripted = state.turn == Side::Opponent || input.autoplay;
    if scripted {
        state.drag = None;
        scripted_turn(state, config);
    } else {
        handle_pointer(state, input, &config.physics);
    }

    if state.phase == GamePhase::Moving {
        let report = motion::step(&mut state.balls, &state.table, &config.physics);
        if !report.moving {
            finish_turn(state);
        }
    }
}

/// Human input: aiming drags and ball-in-hand placement
fn handle_pointer(state: &mut GameState, input: &TickInput, physics: &PhysicsConfig) {
    match state.phase {
        GamePhase::Aiming => {
            if let Some(point) = input.press {
                if state.cue().is_some_and(|cue| cue.active && can_grab(cue.pos, point)) {
                    state.drag = Some(Drag {
                        start: point,
                        current: point,
                    });
                }
            }
            if let (Some(point), Some(drag)) = (input.pointer, state.drag.as_mut()) {
                drag.current = point;
            }
            if let Some(point) = input.release {
                if let Some(drag) = state.drag.take() {
                    match shot_velocity(drag.start, point, physics) {
                        Some(velocity) => state.fire_shot(velocity),
                        None => log::debug!("Drag too short; shot cancelled"),
                    }
                }
            }
        }
        GamePhase::PlacingCueBall => {
            if let Some(point) = input.pointer.or(input.press) {
                move_cue_ball(state, point);
            }
            if let Some(point) = input.release {
                move_cue_ball(state, point);
                confirm_placement(state);
            } else if input.confirm_place {
                confirm_placement(state);
            }
        }
        GamePhase::Moving | GamePhase::GameOver => {}
    }
}

/// Drag the cue ball during ball in hand, kept on the felt
pub fn move_cue_ball(state: &mut GameState, point: Vec2) {
    let table = state.table;
    if let Some(cue) = state.ball_mut(CUE_ID) {
        cue.pos = table.clamp_to_play(point, cue.radius);
    }
}

/// True if the cue ball may be put down at `spot`: clear of every other
/// ball and outside every pocket mouth
pub fn placement_clear(state: &GameState, spot: Vec2) -> bool {
    let Some(cue) = state.cue() else {
        return false;
    };
    if pocket_hit(spot, &state.table).is_some() {
        return false;
    }
    let mut placed = cue.clone();
    placed.pos = spot;
    placed.active = true;
    !state
        .balls
        .iter()
        .filter(|b| !b.is_cue())
        .any(|b| check_overlap(&placed, b))
}

/// Finish ball in hand; refused while the cue ball overlaps another ball
/// or sits in a pocket
pub fn confirm_placement(state: &mut GameState) -> bool {
    let Some(spot) = state.cue().map(|cue| cue.pos) else {
        return false;
    };
    if !placement_clear(state, spot) {
        log::warn!("Cue ball placement at ({:.1}, {:.1}) rejected", spot.x, spot.y);
        state.events.push(GameEvent::PlacementRejected);
        return false;
    }
    state.phase = GamePhase::Aiming;
    state.events.push(GameEvent::CueBallPlaced { side: state.turn });
    true
}

/// Opponent (or autoplay) decision making with presentation delay
fn scripted_turn(state: &mut GameState, config: &TickConfig) {
    let side = state.turn;
    match state.phase {
        GamePhase::PlacingCueBall => {
            let mut rng = state.rng_state.next_rng();
            let spot = choose_placement(state, &mut rng);
            move_cue_ball(state, spot);
            if !confirm_placement(state) {
                // Accept the spot anyway; the collision pass will separate it
                state.phase = GamePhase::Aiming;
            }
        }
        GamePhase::Aiming => match state.pending_shot.as_mut() {
            Some(pending) if pending.ticks_left > 0 => pending.ticks_left -= 1,
            Some(pending) => {
                let velocity = pending.velocity;
                state.fire_shot(velocity);
            }
            None => {
                let mut rng = state.rng_state.next_rng();
                match plan_shot(state, side, &mut rng) {
                    Some(plan) => {
                        state.events.push(GameEvent::OpponentTargeting {
                            kind: plan.target_kind,
                            number: plan.target_number,
                        });
                        state.pending_shot = Some(PendingShot {
                            target_id: plan.target_id,
                            velocity: plan.velocity(),
                            ticks_left: config.opponent_delay_ticks,
                        });
                    }
                    None => log::warn!("{} has nothing to shoot at", side.name()),
                }
            }
        },
        GamePhase::Moving | GamePhase::GameOver => {}
    }
}
