//! 8-ball turn resolution
//!
//! [`resolve_turn`] is a pure function of the table snapshot taken when the
//! shot was struck and the balls as they came to rest. It decides the group
//! assignment, fouls, respawns, the next shooter and the winner.
//! [`apply_outcome`] writes that decision back into the [`GameState`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{
    Ball, BallKind, CUE_ID, EIGHT_ID, GameEvent, GamePhase, GameState, Group, Side, TableGeometry,
    WinReason,
};
use super::vector::distance;

/// Probes the respawn search makes before settling for the last one
pub const RESPAWN_MAX_PROBES: u32 = 100;

/// Everything the rule engine looks at
#[derive(Debug, Clone, Copy)]
pub struct TurnInput<'a> {
    /// Ids on the table when the shot was struck
    pub turn_start_active: &'a [u8],
    /// Balls after everything came to rest
    pub balls: &'a [Ball],
    pub shooter: Side,
    /// Player's group before this shot
    pub player_group: Option<Group>,
    pub table: &'a TableGeometry,
}

/// How the turn ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    GameOver { winner: Side, reason: WinReason },
    /// Cue ball pocketed: the other side gets ball in hand
    Scratch,
    /// Shooter pocketed only their own balls and goes again
    ContinueTurn,
    /// Miss, or a foreign ball went down
    PassTurn,
}

/// Decision for one finished shot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub verdict: Verdict,
    /// Ids that went down this shot, in snapshot order
    pub pocketed: Vec<u8>,
    /// Player group after this shot
    pub player_group: Option<Group>,
    /// Set when this shot decided the groups
    pub group_assigned: bool,
    pub next_turn: Side,
    pub next_phase: GamePhase,
    pub winner: Option<Side>,
    /// Foreign balls put back on the table, with their new spots
    pub respawns: Vec<(u8, Vec2)>,
    /// Where the cue ball goes after a scratch
    pub cue_reset: Option<Vec2>,
}

fn shooter_group(shooter: Side, player_group: Option<Group>) -> Option<Group> {
    match shooter {
        Side::Player => player_group,
        Side::Opponent => player_group.map(Group::other),
    }
}

fn kind_of(balls: &[Ball], id: u8) -> Option<BallKind> {
    balls.iter().find(|b| b.id == id).map(|b| b.kind)
}

/// Decide the result of a shot. Deterministic, no side effects.
pub fn resolve_turn(input: &TurnInput<'_>) -> TurnOutcome {
    let TurnInput {
        turn_start_active,
        balls,
        shooter,
        player_group,
        table,
    } = *input;

    let pocketed: Vec<u8> = turn_start_active
        .iter()
        .copied()
        .filter(|&id| balls.iter().any(|b| b.id == id && !b.active))
        .collect();

    let cue_scratched = pocketed.contains(&CUE_ID);
    let eight_pocketed = pocketed.contains(&EIGHT_ID);
    let other_pocketed: Vec<u8> = pocketed
        .iter()
        .copied()
        .filter(|&id| id != CUE_ID && id != EIGHT_ID)
        .collect();

    // Groups are decided by the first object ball down on a clean shot
    let mut new_player_group = player_group;
    let mut group_assigned = false;
    if player_group.is_none() && !cue_scratched {
        if let Some(group) = other_pocketed
            .first()
            .and_then(|&id| kind_of(balls, id))
            .and_then(|kind| kind.group())
        {
            new_player_group = Some(match shooter {
                Side::Player => group,
                Side::Opponent => group.other(),
            });
            group_assigned = true;
        }
    }

    let own_group = shooter_group(shooter, new_player_group);

    let mut outcome = TurnOutcome {
        verdict: Verdict::PassTurn,
        pocketed,
        player_group: new_player_group,
        group_assigned,
        next_turn: shooter.other(),
        next_phase: GamePhase::Aiming,
        winner: None,
        respawns: Vec::new(),
        cue_reset: None,
    };

    if eight_pocketed {
        let (winner, reason) = if cue_scratched {
            (shooter.other(), WinReason::ScratchOnEight)
        } else {
            // Own balls that were on the table when the shot was struck; the
            // group has to be cleared before the eight is played
            let own_remaining = own_group.is_some_and(|group| {
                turn_start_active
                    .iter()
                    .any(|&id| kind_of(balls, id) == Some(group.kind()))
            });
            if own_group.is_none() || own_remaining {
                (shooter.other(), WinReason::EarlyEight)
            } else {
                (shooter, WinReason::LegalClearance)
            }
        };
        outcome.verdict = Verdict::GameOver { winner, reason };
        outcome.winner = Some(winner);
        outcome.next_turn = shooter;
        outcome.next_phase = GamePhase::GameOver;
        return outcome;
    }

    if cue_scratched {
        outcome.verdict = Verdict::Scratch;
        outcome.next_phase = GamePhase::PlacingCueBall;
        outcome.cue_reset = Some(table.head_spot());
        return outcome;
    }

    let (own, foreign): (Vec<u8>, Vec<u8>) =
        other_pocketed.iter().copied().partition(|&id| match own_group {
            None => true,
            Some(group) => kind_of(balls, id) == Some(group.kind()),
        });

    // Foreign balls come back one at a time so each avoids the previous ones
    let mut occupied: Vec<Vec2> = balls
        .iter()
        .filter(|b| b.active)
        .map(|b| b.pos)
        .collect();
    let radius = balls.first().map(|b| b.radius).unwrap_or(crate::consts::BALL_RADIUS);
    for &id in &foreign {
        let spot = find_free_spot(&occupied, table, radius);
        occupied.push(spot);
        outcome.respawns.push((id, spot));
    }

    if !own.is_empty() && foreign.is_empty() {
        outcome.verdict = Verdict::ContinueTurn;
        outcome.next_turn = shooter;
    }

    outcome
}

/// Walk from the foot spot toward the foot rail, then down a row, until a
/// spot clears every occupied center by two ball diameters.
///
/// Bounded: after [`RESPAWN_MAX_PROBES`] the last probe is used as is.
pub fn find_free_spot(occupied: &[Vec2], table: &TableGeometry, radius: f32) -> Vec2 {
    let clearance = radius * 4.0;
    let stride = radius * 2.0 + 1.0;
    let start = table.foot_spot();
    let min = table.play_min(radius);
    let max = table.play_max(radius);

    let is_free = |spot: Vec2| occupied.iter().all(|&p| distance(p, spot) >= clearance);

    let mut spot = start;
    let mut probes = 0;
    while !is_free(spot) {
        if probes >= RESPAWN_MAX_PROBES {
            log::warn!(
                "No free respawn spot after {} probes; using ({:.1}, {:.1})",
                probes,
                spot.x,
                spot.y
            );
            break;
        }
        spot.x += stride;
        if spot.x > max.x {
            spot.x = start.x;
            spot.y += stride;
            if spot.y > max.y {
                spot.y = min.y;
            }
        }
        probes += 1;
    }
    spot
}

/// Write a turn decision back into the game
pub fn apply_outcome(state: &mut GameState, outcome: &TurnOutcome) {
    let shooter = state.turn;

    if outcome.group_assigned {
        if let Some(group) = outcome.player_group {
            let shooter_group = shooter_group(shooter, Some(group)).unwrap_or(group);
            log::info!("{} takes {}s", shooter.name(), shooter_group.as_str());
            state.events.push(GameEvent::GroupAssigned {
                side: shooter,
                group: shooter_group,
            });
        }
    }
    state.player_group = outcome.player_group;
    state.turn_start_active.clear();

    match outcome.verdict {
        Verdict::GameOver { winner, reason } => {
            log::info!("Game over: {} wins ({:?})", winner.name(), reason);
            state.winner = Some(winner);
            state.phase = GamePhase::GameOver;
            state.events.push(GameEvent::GameOver { winner, reason });
            return;
        }
        Verdict::Scratch => {
            log::info!("{} scratched; ball in hand for {}", shooter.name(), shooter.other().name());
            if let (Some(spot), Some(cue)) = (outcome.cue_reset, state.ball_mut(CUE_ID)) {
                cue.respawn(spot);
            }
            state.events.push(GameEvent::Scratch { side: shooter });
        }
        Verdict::ContinueTurn => {
            log::debug!("{} pocketed own ball(s) and shoots again", shooter.name());
            state.events.push(GameEvent::ExtraTurn { side: shooter });
        }
        Verdict::PassTurn => {}
    }

    if !outcome.respawns.is_empty() {
        for &(id, spot) in &outcome.respawns {
            if let Some(ball) = state.ball_mut(id) {
                ball.respawn(spot);
            }
        }
        let ids: Vec<u8> = outcome.respawns.iter().map(|(id, _)| *id).collect();
        log::info!("Returned foreign balls to the table: {:?}", ids);
        state.events.push(GameEvent::BallsReturned { ids });
    }

    state.turn = outcome.next_turn;
    state.phase = outcome.next_phase;
    if outcome.next_turn != shooter {
        state.events.push(GameEvent::TurnPassed {
            to: outcome.next_turn,
        });
    }
}

/// Resolve the shot that just finished and apply it
pub fn finish_turn(state: &mut GameState) -> TurnOutcome {
    let outcome = resolve_turn(&TurnInput {
        turn_start_active: &state.turn_start_active,
        balls: &state.balls,
        shooter: state.turn,
        player_group: state.player_group,
        table: &state.table,
    });
    apply_outcome(state, &outcome);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fresh rack with the given ids pocketed during a shot by `shooter`
    fn shot(shooter: Side, player_group: Option<Group>, pocketed: &[u8]) -> GameState {
        let mut state = GameState::new(7);
        state.turn = shooter;
        state.player_group = player_group;
        state.turn_start_active = state.active_ids();
        state.phase = GamePhase::Moving;
        for &id in pocketed {
            state.ball_mut(id).unwrap().pocket();
        }
        state
    }

    #[test]
    fn test_pocketed_follows_snapshot_order() {
        let mut state = shot(Side::Player, None, &[]);
        state.ball_mut(12).unwrap().pocket();
        state.ball_mut(2).unwrap().pocket();
        let outcome = finish_turn(&mut state);
        // Snapshot is in rack order: 2 comes before 12
        assert_eq!(outcome.pocketed, vec![2, 12]);
    }

    #[test]
    fn test_balls_already_off_do_not_count() {
        let mut state = GameState::new(7);
        state.ball_mut(3).unwrap().pocket();
        state.turn_start_active = state.active_ids();
        let outcome = finish_turn(&mut state);
        assert!(outcome.pocketed.is_empty());
        assert_eq!(outcome.verdict, Verdict::PassTurn);
        assert_eq!(state.turn, Side::Opponent);
    }

    #[test]
    fn test_opponent_assigns_complementary_group() {
        let mut state = shot(Side::Opponent, None, &[11]);
        let outcome = finish_turn(&mut state);
        assert!(outcome.group_assigned);
        assert_eq!(state.player_group, Some(Group::Solids));
        assert_eq!(state.group_of(Side::Opponent), Some(Group::Stripes));
        assert_eq!(outcome.verdict, Verdict::ContinueTurn);
        assert!(state.events.contains(&GameEvent::GroupAssigned {
            side: Side::Opponent,
            group: Group::Stripes,
        }));
    }

    #[test]
    fn test_scratch_blocks_group_assignment() {
        let mut state = shot(Side::Player, None, &[0, 3]);
        let outcome = finish_turn(&mut state);
        assert!(!outcome.group_assigned);
        assert_eq!(state.player_group, None);
        assert_eq!(outcome.verdict, Verdict::Scratch);
    }

    #[test]
    fn test_first_pocketed_decides_mixed_group() {
        // Solid 1 precedes stripe 9 in the snapshot: player takes solids,
        // so the stripe is foreign and comes back.
        let mut state = shot(Side::Player, None, &[9, 1]);
        let outcome = finish_turn(&mut state);
        assert_eq!(state.player_group, Some(Group::Solids));
        assert_eq!(outcome.verdict, Verdict::PassTurn);
        assert_eq!(outcome.respawns.len(), 1);
        assert_eq!(outcome.respawns[0].0, 9);
        assert!(state.ball(9).unwrap().active);
        assert!(!state.ball(1).unwrap().active);
    }

    #[test]
    fn test_miss_passes_turn() {
        let mut state = shot(Side::Opponent, Some(Group::Solids), &[]);
        let outcome = finish_turn(&mut state);
        assert_eq!(outcome.verdict, Verdict::PassTurn);
        assert_eq!(state.turn, Side::Player);
        assert_eq!(state.phase, GamePhase::Aiming);
        assert!(state.events.contains(&GameEvent::TurnPassed { to: Side::Player }));
    }

    #[test]
    fn test_last_own_ball_and_eight_together_is_early() {
        let mut state = shot(Side::Player, Some(Group::Stripes), &[]);
        for id in 9..=14 {
            state.ball_mut(id).unwrap().pocket();
        }
        state.turn_start_active = state.active_ids();
        state.ball_mut(15).unwrap().pocket();
        state.ball_mut(8).unwrap().pocket();
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
    fn test_opponent_last_ball_with_eight_is_early() {
        // Player holds solids, so the opponent shoots stripes
        let mut state = shot(Side::Opponent, Some(Group::Solids), &[]);
        for id in 10..=15 {
            state.ball_mut(id).unwrap().pocket();
        }
        state.turn_start_active = state.active_ids();
        state.ball_mut(9).unwrap().pocket();
        state.ball_mut(8).unwrap().pocket();
        let outcome = finish_turn(&mut state);
        assert_eq!(outcome.winner, Some(Side::Player));
    }

    #[test]
    fn test_find_free_spot_open_table_is_foot_spot() {
        let table = TableGeometry::default();
        let spot = find_free_spot(&[], &table, 10.0);
        assert_eq!(spot, table.foot_spot());
    }

    #[test]
    fn test_find_free_spot_steps_toward_foot_rail() {
        let table = TableGeometry::default();
        let occupied = [table.foot_spot()];
        let spot = find_free_spot(&occupied, &table, 10.0);
        assert!(spot.x > table.foot_spot().x);
        assert!(spot.distance(table.foot_spot()) >= 40.0);
    }

    #[test]
    fn test_find_free_spot_is_bounded() {
        let table = TableGeometry::default();
        // Carpet the whole table so nothing is free
        let mut occupied = Vec::new();
        let mut y = 0.0;
        while y <= table.height {
            let mut x = 0.0;
            while x <= table.width {
                occupied.push(Vec2::new(x, y));
                x += 5.0;
            }
            y += 5.0;
        }
        let spot = find_free_spot(&occupied, &table, 10.0);
        let min = table.play_min(10.0);
        let max = table.play_max(10.0);
        assert!(spot.y >= min.y && spot.y <= max.y);
        assert!(spot.x <= max.x + 21.0);
    }
}
