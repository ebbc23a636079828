//! Scene building: game state to a triangle list
//!
//! Pure function of the state so it can be tested without a GPU.

use glam::Vec2;

use super::shapes;
use super::vertex::{Vertex, colors};
use crate::settings::Settings;
use crate::sim::{AimPreview, BallKind, GamePhase, GameState, Side, aim_preview};

const CIRCLE_SEGMENTS: u32 = 24;
const SHADOW_OFFSET: Vec2 = Vec2::new(2.0, 2.0);
/// Gap between the cue ball and the stick tip at zero power
const STICK_OFFSET: f32 = 15.0;
const STICK_LENGTH: f32 = 200.0;
const STICK_WIDTH: f32 = 6.0;
const STICK_TIP: f32 = 10.0;

/// Aim preview for the player's drag in progress, if any
pub fn current_aim(state: &GameState, settings: &Settings) -> Option<AimPreview> {
    if state.phase != GamePhase::Aiming || state.turn != Side::Player {
        return None;
    }
    let drag = state.drag?;
    let cue = state.cue().filter(|c| c.active)?;
    Some(aim_preview(cue.pos, drag.start, drag.current, &settings.physics))
}

/// Build the full frame in table coordinates
pub fn build_scene(state: &GameState, settings: &Settings) -> Vec<Vertex> {
    let mut out = Vec::with_capacity(8192);
    let table = &state.table;

    // Rails, then felt
    shapes::rect(&mut out, Vec2::ZERO, Vec2::new(table.width, table.height), colors::RAIL);
    let cushion = Vec2::splat(table.cushion);
    shapes::rect(
        &mut out,
        cushion,
        Vec2::new(table.width, table.height) - cushion * 2.0,
        colors::FELT,
    );

    for pocket in &table.pockets {
        shapes::circle(&mut out, *pocket, table.pocket_radius, colors::POCKET, CIRCLE_SEGMENTS);
    }

    for ball in state.balls.iter().filter(|b| b.active) {
        let color = colors::ball(ball.id);
        shapes::circle(&mut out, ball.pos + SHADOW_OFFSET, ball.radius, colors::SHADOW, CIRCLE_SEGMENTS);
        shapes::circle(&mut out, ball.pos, ball.radius, color, CIRCLE_SEGMENTS);

        if ball.kind == BallKind::Stripe {
            shapes::circle(&mut out, ball.pos, ball.radius * 0.9, colors::WHITE, CIRCLE_SEGMENTS);
            shapes::circle_band(&mut out, ball.pos, ball.radius, ball.radius * 0.5, color, 8);
        }
        if ball.number.is_some() {
            shapes::circle(&mut out, ball.pos, ball.radius * 0.4, colors::WHITE, 12);
        }
    }

    if let Some(aim) = current_aim(state, settings) {
        if settings.guide_line {
            shapes::dashed_line(&mut out, aim.origin, aim.guide_end, 2.0, 5.0, colors::GUIDE_LINE);
        }
        // The stick sits behind the ball, opposite the shot direction
        let back = -aim.direction;
        if back != Vec2::ZERO {
            let tip = aim.origin + back * (STICK_OFFSET + aim.pull_back);
            let butt = tip + back * STICK_LENGTH;
            shapes::line(&mut out, tip, butt, STICK_WIDTH, colors::CUE_STICK);
            shapes::line(&mut out, tip, tip + back * STICK_TIP, STICK_WIDTH, colors::CUE_TIP);
        }
    }

    if state.phase == GamePhase::PlacingCueBall && state.turn == Side::Player {
        if let Some(cue) = state.cue() {
            shapes::ring(
                &mut out,
                cue.pos,
                cue.radius + 4.0,
                cue.radius + 6.0,
                colors::WHITE,
                32,
                true,
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Drag;

    fn has_color(vertices: &[Vertex], color: [f32; 4]) -> bool {
        vertices.iter().any(|v| v.color == color)
    }

    #[test]
    fn test_fresh_table_draws_every_ball() {
        let state = GameState::new(1);
        let vertices = build_scene(&state, &Settings::default());
        assert_eq!(vertices.len() % 3, 0);
        assert!(has_color(&vertices, colors::FELT));
        assert!(has_color(&vertices, colors::ball(15)));
        assert!(!has_color(&vertices, colors::CUE_STICK));
    }

    #[test]
    fn test_pocketed_ball_is_not_drawn() {
        let mut state = GameState::new(1);
        let before = build_scene(&state, &Settings::default()).len();
        state.ball_mut(3).unwrap().pocket();
        let after = build_scene(&state, &Settings::default()).len();
        assert!(after < before);
    }

    #[test]
    fn test_drag_draws_stick_and_optional_guide() {
        let mut state = GameState::new(1);
        let cue = state.cue().unwrap().pos;
        state.drag = Some(Drag {
            start: cue,
            current: cue - Vec2::new(30.0, 0.0),
        });

        let mut settings = Settings::default();
        let vertices = build_scene(&state, &settings);
        assert!(has_color(&vertices, colors::CUE_STICK));
        assert!(has_color(&vertices, colors::GUIDE_LINE));

        settings.guide_line = false;
        let vertices = build_scene(&state, &settings);
        assert!(has_color(&vertices, colors::CUE_STICK));
        assert!(!has_color(&vertices, colors::GUIDE_LINE));
    }

    #[test]
    fn test_no_aim_on_opponent_turn() {
        let mut state = GameState::new(1);
        state.turn = Side::Opponent;
        let cue = state.cue().unwrap().pos;
        state.drag = Some(Drag {
            start: cue,
            current: cue - Vec2::new(30.0, 0.0),
        });
        assert!(current_aim(&state, &Settings::default()).is_none());
    }
}
