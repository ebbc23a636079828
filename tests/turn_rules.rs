//! Turn resolution scenarios against a full racked table

use eight_ball::sim::{
    CUE_ID, EIGHT_ID, GamePhase, GameState, Group, Side, TickConfig, TickInput, Verdict,
    WinReason, check_overlap, finish_turn, shot_velocity, tick,
};
use eight_ball::PhysicsConfig;
use glam::Vec2;

/// Snapshot the table, then drop `ids` as if the shot pocketed them
fn shot_pockets(state: &mut GameState, ids: &[u8]) {
    state.turn_start_active = state.active_ids();
    for &id in ids {
        state.ball_mut(id).unwrap().pocket();
    }
}

#[test]
fn eight_on_open_table_loses() {
    let mut state = GameState::new(1);
    shot_pockets(&mut state, &[EIGHT_ID]);
    let outcome = finish_turn(&mut state);

    assert_eq!(
        outcome.verdict,
        Verdict::GameOver {
            winner: Side::Opponent,
            reason: WinReason::EarlyEight
        }
    );
    assert_eq!(state.phase, GamePhase::GameOver);
    assert_eq!(state.winner, Some(Side::Opponent));
}

#[test]
fn eight_with_scratch_loses_even_when_cleared() {
    let mut state = GameState::new(1);
    state.player_group = Some(Group::Solids);
    for id in 1..=7 {
        state.ball_mut(id).unwrap().pocket();
    }
    shot_pockets(&mut state, &[EIGHT_ID, CUE_ID]);
    finish_turn(&mut state);

    assert_eq!(state.phase, GamePhase::GameOver);
    assert_eq!(state.winner, Some(Side::Opponent));
}

#[test]
fn eight_after_clearing_group_wins() {
    let mut state = GameState::new(1);
    state.player_group = Some(Group::Solids);
    for id in 1..=7 {
        state.ball_mut(id).unwrap().pocket();
    }
    shot_pockets(&mut state, &[EIGHT_ID]);
    let outcome = finish_turn(&mut state);

    assert_eq!(
        outcome.verdict,
        Verdict::GameOver {
            winner: Side::Player,
            reason: WinReason::LegalClearance
        }
    );
    assert_eq!(state.winner, Some(Side::Player));
}

#[test]
fn last_solid_and_eight_in_one_shot_loses() {
    let mut state = GameState::new(1);
    state.player_group = Some(Group::Solids);
    for id in 1..=6 {
        state.ball_mut(id).unwrap().pocket();
    }
    shot_pockets(&mut state, &[7, EIGHT_ID]);
    let outcome = finish_turn(&mut state);

    assert_eq!(
        outcome.verdict,
        Verdict::GameOver {
            winner: Side::Opponent,
            reason: WinReason::EarlyEight
        }
    );
    assert_eq!(state.winner, Some(Side::Opponent));
}

#[test]
fn opponent_clearing_stripes_wins_for_opponent() {
    let mut state = GameState::new(1);
    state.player_group = Some(Group::Solids);
    state.turn = Side::Opponent;
    for id in 9..=15 {
        state.ball_mut(id).unwrap().pocket();
    }
    shot_pockets(&mut state, &[EIGHT_ID]);
    finish_turn(&mut state);
    assert_eq!(state.winner, Some(Side::Opponent));
}

#[test]
fn scratch_gives_opponent_ball_in_hand() {
    let mut state = GameState::new(1);
    shot_pockets(&mut state, &[CUE_ID]);
    finish_turn(&mut state);

    assert_eq!(state.turn, Side::Opponent);
    assert_eq!(state.phase, GamePhase::PlacingCueBall);
    let cue = state.cue().unwrap();
    assert!(cue.active);
    assert_eq!(cue.vel, Vec2::ZERO);
    assert_eq!(cue.pos, state.table.head_spot());
}

#[test]
fn own_ball_keeps_the_turn() {
    let mut state = GameState::new(1);
    state.player_group = Some(Group::Solids);
    shot_pockets(&mut state, &[3]);
    let outcome = finish_turn(&mut state);

    assert_eq!(outcome.verdict, Verdict::ContinueTurn);
    assert_eq!(state.turn, Side::Player);
    assert_eq!(state.phase, GamePhase::Aiming);
    assert!(!state.ball(3).unwrap().active);
}

#[test]
fn first_pocket_on_open_table_assigns_groups() {
    let mut state = GameState::new(1);
    shot_pockets(&mut state, &[12]);
    finish_turn(&mut state);

    assert_eq!(state.player_group, Some(Group::Stripes));
    assert_eq!(state.turn, Side::Player);
}

#[test]
fn foreign_ball_passes_turn_and_returns_clear_of_others() {
    let mut state = GameState::new(1);
    state.player_group = Some(Group::Solids);
    shot_pockets(&mut state, &[11]);
    let outcome = finish_turn(&mut state);

    assert_eq!(outcome.verdict, Verdict::PassTurn);
    assert_eq!(state.turn, Side::Opponent);
    assert_eq!(state.phase, GamePhase::Aiming);

    let returned = state.ball(11).unwrap();
    assert!(returned.active);
    assert_eq!(returned.vel, Vec2::ZERO);
    for other in state.balls.iter().filter(|b| b.id != 11) {
        assert!(
            !check_overlap(returned, other),
            "returned ball overlaps ball {}",
            other.id
        );
    }
}

#[test]
fn own_and_foreign_together_pass_the_turn() {
    let mut state = GameState::new(1);
    state.player_group = Some(Group::Solids);
    shot_pockets(&mut state, &[2, 10]);
    finish_turn(&mut state);

    assert_eq!(state.turn, Side::Opponent);
    assert!(!state.ball(2).unwrap().active);
    assert!(state.ball(10).unwrap().active);
}

#[test]
fn short_drag_never_leaves_aiming() {
    let config = PhysicsConfig::default();
    let start = Vec2::new(200.0, 200.0);
    assert!(shot_velocity(start, start - Vec2::new(4.0, 3.0), &config).is_none());

    let mut state = GameState::new(1);
    let cue = state.cue().unwrap().pos;
    let tick_config = TickConfig::default();
    tick(
        &mut state,
        &TickInput {
            press: Some(cue),
            ..Default::default()
        },
        &tick_config,
    );
    tick(
        &mut state,
        &TickInput {
            release: Some(cue + Vec2::new(2.0, 2.0)),
            ..Default::default()
        },
        &tick_config,
    );
    assert_eq!(state.phase, GamePhase::Aiming);
    assert_eq!(state.shots_taken, 0);
    assert!(state.balls.iter().all(|b| b.vel == Vec2::ZERO));
}
