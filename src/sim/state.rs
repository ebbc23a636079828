//! Game state and core simulation types
//!
//! Everything the rules and physics touch lives here. The state is plain
//! data: it is owned by the caller and passed by reference to `tick`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Id reserved for the cue ball
pub const CUE_ID: u8 = 0;
/// Id of the eight ball
pub const EIGHT_ID: u8 = 8;

/// Current phase of play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the shooter to take a shot
    Aiming,
    /// Balls rolling; physics is advancing
    Moving,
    /// Ball in hand: the shooter repositions the cue ball
    PlacingCueBall,
    /// A winner has been decided
    GameOver,
}

/// Which side is at the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Side::Player => "Player",
            Side::Opponent => "Robot",
        }
    }
}

/// Ball category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BallKind {
    Cue,
    Solid,
    Stripe,
    Eight,
}

impl BallKind {
    /// Category for a rack number (0 = cue)
    pub fn for_id(id: u8) -> Self {
        match id {
            CUE_ID => BallKind::Cue,
            EIGHT_ID => BallKind::Eight,
            1..=7 => BallKind::Solid,
            _ => BallKind::Stripe,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BallKind::Cue => "CUE",
            BallKind::Solid => "SOLID",
            BallKind::Stripe => "STRIPE",
            BallKind::Eight => "EIGHT",
        }
    }

    /// The group this kind belongs to, if any
    pub fn group(&self) -> Option<Group> {
        match self {
            BallKind::Solid => Some(Group::Solids),
            BallKind::Stripe => Some(Group::Stripes),
            _ => None,
        }
    }
}

/// A side's assigned object-ball group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Group {
    Solids,
    Stripes,
}

impl Group {
    pub fn other(self) -> Self {
        match self {
            Group::Solids => Group::Stripes,
            Group::Stripes => Group::Solids,
        }
    }

    /// Ball kind making up this group
    pub fn kind(self) -> BallKind {
        match self {
            Group::Solids => BallKind::Solid,
            Group::Stripes => BallKind::Stripe,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.kind().as_str()
    }
}

/// A ball on (or off) the table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: u8,
    pub kind: BallKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// False once pocketed
    pub active: bool,
    /// Printed number; `None` only for the cue ball
    pub number: Option<u8>,
}

impl Ball {
    pub fn new(id: u8, pos: Vec2) -> Self {
        Self {
            id,
            kind: BallKind::for_id(id),
            pos,
            vel: Vec2::ZERO,
            radius: BALL_RADIUS,
            active: true,
            number: if id == CUE_ID { None } else { Some(id) },
        }
    }

    pub fn is_cue(&self) -> bool {
        self.id == CUE_ID
    }

    pub fn is_moving(&self) -> bool {
        self.active && self.vel != Vec2::ZERO
    }

    /// Take the ball off the table
    pub fn pocket(&mut self) {
        self.active = false;
        self.vel = Vec2::ZERO;
    }

    /// Put the ball back on the table at rest at `pos`
    pub fn respawn(&mut self, pos: Vec2) {
        self.active = true;
        self.vel = Vec2::ZERO;
        self.pos = pos;
    }
}

/// Fixed table geometry
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TableGeometry {
    pub width: f32,
    pub height: f32,
    /// Rail width; the felt spans `cushion..width - cushion`
    pub cushion: f32,
    pub pocket_radius: f32,
    pub pockets: [Vec2; 6],
}

impl Default for TableGeometry {
    fn default() -> Self {
        Self::new(TABLE_WIDTH, TABLE_HEIGHT, CUSHION_WIDTH, POCKET_RADIUS)
    }
}

impl TableGeometry {
    pub fn new(width: f32, height: f32, cushion: f32, pocket_radius: f32) -> Self {
        let pockets = [
            Vec2::new(cushion, cushion),
            Vec2::new(width / 2.0, cushion),
            Vec2::new(width - cushion, cushion),
            Vec2::new(cushion, height - cushion),
            Vec2::new(width / 2.0, height - cushion),
            Vec2::new(width - cushion, height - cushion),
        ];
        Self {
            width,
            height,
            cushion,
            pocket_radius,
            pockets,
        }
    }

    /// Smallest legal ball center
    pub fn play_min(&self, radius: f32) -> Vec2 {
        Vec2::splat(self.cushion + radius)
    }

    /// Largest legal ball center
    pub fn play_max(&self, radius: f32) -> Vec2 {
        Vec2::new(
            self.width - self.cushion - radius,
            self.height - self.cushion - radius,
        )
    }

    /// Clamp a ball center into the playable rectangle
    pub fn clamp_to_play(&self, pos: Vec2, radius: f32) -> Vec2 {
        pos.clamp(self.play_min(radius), self.play_max(radius))
    }

    /// Where the cue ball starts and where it returns after a scratch
    pub fn head_spot(&self) -> Vec2 {
        Vec2::new(self.width / 4.0, self.height / 2.0)
    }

    /// Rack apex, also the start of the respawn search
    pub fn foot_spot(&self) -> Vec2 {
        Vec2::new(self.width * 0.75, self.height / 2.0)
    }
}

/// Rack slot of every object ball: the eight sits in the middle of the third
/// row and the other numbers fill the remaining slots in ascending order.
pub fn rack_positions(apex: Vec2, radius: f32) -> Vec<(u8, Vec2)> {
    let rows = 5;
    let mut others = (1..=15u8).filter(|&id| id != EIGHT_ID);
    let mut rack = Vec::with_capacity(15);

    for row in 0..rows {
        for col in 0..=row {
            let x = apex.x + row as f32 * (radius * 2.0 * 0.866);
            let y = apex.y - row as f32 * radius + col as f32 * radius * 2.0;
            let id = if row == 2 && col == 1 {
                EIGHT_ID
            } else {
                match others.next() {
                    Some(id) => id,
                    None => continue,
                }
            };
            rack.push((id, Vec2::new(x, y)));
        }
    }

    rack
}

/// RNG state wrapper for serialization
///
/// Each draw site takes a fresh generator derived from `(seed, stream)` and
/// bumps `stream`, so a replay with the same seed makes the same decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed ^ self.stream.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }

    /// Generator for the next decision
    pub fn next_rng(&mut self) -> Pcg32 {
        let rng = self.to_rng();
        self.stream += 1;
        rng
    }
}

/// Why the game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinReason {
    /// Shooter cleared their group and sank the eight
    LegalClearance,
    /// Shooter sank the eight before clearing their group
    EarlyEight,
    /// Shooter sank the eight and scratched
    ScratchOnEight,
}

/// Notable things that happened, drained by the front end each frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ShotFired { side: Side, power: f32 },
    GroupAssigned { side: Side, group: Group },
    Scratch { side: Side },
    BallsReturned { ids: Vec<u8> },
    ExtraTurn { side: Side },
    TurnPassed { to: Side },
    CueBallPlaced { side: Side },
    PlacementRejected,
    OpponentTargeting { kind: BallKind, number: Option<u8> },
    GameOver { winner: Side, reason: WinReason },
}

/// An in-progress aiming drag (table coordinates)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Drag {
    pub start: Vec2,
    pub current: Vec2,
}

/// A shot the opponent has decided on but not yet taken
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingShot {
    pub target_id: u8,
    pub velocity: Vec2,
    pub ticks_left: u32,
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng_state: RngState,
    pub table: TableGeometry,
    /// All sixteen balls, cue first, in rack order
    pub balls: Vec<Ball>,
    pub phase: GamePhase,
    /// Side currently shooting
    pub turn: Side,
    /// Group of the human player; the opponent has the other one
    pub player_group: Option<Group>,
    pub winner: Option<Side>,
    /// Ids on the table when the current shot was taken
    pub turn_start_active: Vec<u8>,
    pub shots_taken: u32,
    pub time_ticks: u64,
    /// Aim preview for the renderer (not gameplay-affecting)
    #[serde(skip)]
    pub drag: Option<Drag>,
    pub pending_shot: Option<PendingShot>,
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a freshly racked game with the given seed
    pub fn new(seed: u64) -> Self {
        let table = TableGeometry::default();
        let mut balls = Vec::with_capacity(16);
        balls.push(Ball::new(CUE_ID, table.head_spot()));
        for (id, pos) in rack_positions(table.foot_spot(), BALL_RADIUS) {
            balls.push(Ball::new(id, pos));
        }

        Self {
            seed,
            rng_state: RngState::new(seed),
            table,
            balls,
            phase: GamePhase::Aiming,
            turn: Side::Player,
            player_group: None,
            winner: None,
            turn_start_active: Vec::new(),
            shots_taken: 0,
            time_ticks: 0,
            drag: None,
            pending_shot: None,
            events: Vec::new(),
        }
    }

    pub fn ball(&self, id: u8) -> Option<&Ball> {
        self.balls.iter().find(|b| b.id == id)
    }

    pub fn ball_mut(&mut self, id: u8) -> Option<&mut Ball> {
        self.balls.iter_mut().find(|b| b.id == id)
    }

    pub fn cue(&self) -> Option<&Ball> {
        self.ball(CUE_ID)
    }

    /// Ids of balls currently on the table, in list order
    pub fn active_ids(&self) -> Vec<u8> {
        self.balls.iter().filter(|b| b.active).map(|b| b.id).collect()
    }

    /// Group assigned to `side`, if decided
    pub fn group_of(&self, side: Side) -> Option<Group> {
        match side {
            Side::Player => self.player_group,
            Side::Opponent => self.player_group.map(Group::other),
        }
    }

    pub fn any_moving(&self) -> bool {
        self.balls.iter().any(Ball::is_moving)
    }

    /// Number of `group` balls still on the table
    pub fn remaining_in_group(&self, group: Group) -> usize {
        self.balls
            .iter()
            .filter(|b| b.active && b.kind == group.kind())
            .count()
    }

    /// Strike the cue ball: snapshot the table and start the balls rolling
    pub fn fire_shot(&mut self, velocity: Vec2) {
        self.turn_start_active = self.active_ids();
        let Some(cue) = self.balls.iter_mut().find(|b| b.is_cue() && b.active) else {
            log::warn!("Shot requested with no cue ball on the table");
            return;
        };
        cue.vel = velocity;
        self.shots_taken += 1;
        self.drag = None;
        self.pending_shot = None;
        self.phase = GamePhase::Moving;
        self.events.push(GameEvent::ShotFired {
            side: self.turn,
            power: velocity.length(),
        });
        log::debug!(
            "{} shoots: power {:.2}, shot #{}",
            self.turn.name(),
            velocity.length(),
            self.shots_taken
        );
    }

    /// Hand the accumulated events to the caller
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
