//! Simulation state and its public boundary
//!
//! `Simulation` owns everything that changes during a run: the active
//! pieces, the spawner queue, the session counters and the seeded RNG.
//! Collaborators only see it through `request_drop`, `tick`, `snapshot`
//! and `reset`.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::piece::{Piece, PopCurve};
use super::rank::Rank;
use super::spawner::{Spawner, jitter, spawn_held_piece};
use crate::Rgb;
use crate::config::{ConfigError, SimConfig};
use crate::consts::QUEUE_LEN;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Accepting drops and advancing physics
    Active,
    /// Run ended; frozen until reset
    Terminal,
}

/// Events emitted for rendering/audio collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// A held piece entered the well
    Dropped { rank: Rank, position: Vec2 },
    /// Two pieces fused; `color` is the consumed rank's color
    Fusion {
        position: Vec2,
        color: Rgb,
        new_rank: Rank,
    },
    /// The run just ended
    GameOver { score: u64 },
}

/// Why a drop request was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuppressReason {
    /// Drop cooldown still running
    Cooldown,
    /// Run has ended
    Terminal,
}

/// Result of a drop request. Suppression is backpressure, not failure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DropOutcome {
    Dropped { id: u32, rank: Rank, x: f32 },
    Suppressed(SuppressReason),
}

impl DropOutcome {
    pub fn is_dropped(&self) -> bool {
        matches!(self, DropOutcome::Dropped { .. })
    }
}

/// Per-run counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Cumulative score (never decreases within a run)
    pub score: u64,
    pub phase: GamePhase,
    /// Ticks until the next drop is accepted
    pub drop_cooldown: u32,
    /// Ticks since the run started
    pub time_ticks: u64,
    /// Accepted drops this run
    pub drops: u32,
    /// Fusions this run
    pub fusions: u32,
}

impl Session {
    fn new() -> Self {
        Self {
            score: 0,
            phase: GamePhase::Active,
            drop_cooldown: 0,
            time_ticks: 0,
            drops: 0,
            fusions: 0,
        }
    }
}

/// Read-only view of one piece
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieceView {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub rank: Rank,
    /// Pop animation radius multiplier
    pub scale: f32,
    /// Effective collision radius
    pub radius: f32,
}

/// Immutable view of the whole simulation, taken between ticks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub pieces: Vec<PieceView>,
    pub score: u64,
    /// Rank waiting to be dropped
    pub held: Rank,
    /// Upcoming ranks after the held one
    pub queue: [Rank; QUEUE_LEN],
    pub terminal: bool,
    /// Whether a drop request would currently be accepted
    pub drop_ready: bool,
    pub time_ticks: u64,
}

/// The falling-piece merge simulation
#[derive(Debug, Clone)]
pub struct Simulation {
    pub(super) config: SimConfig,
    /// Run seed for reproducibility
    seed: u64,
    pub(super) rng: Pcg32,
    pub(super) session: Session,
    pub(super) spawner: Spawner,
    /// Active pieces; index order is the fusion priority
    pub(super) pieces: Vec<Piece>,
    /// Events raised between ticks, delivered with the next tick
    pub(super) pending_events: Vec<SimEvent>,
    pub(super) next_id: u32,
}

impl Simulation {
    /// Validate `config` and start a run with the given seed
    pub fn new(config: SimConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = Pcg32::seed_from_u64(seed);
        let spawner = Spawner::new(config.spawn.spawn_rank_count, &mut rng);

        log::info!("Simulation started with seed {}", seed);
        Ok(Self {
            config,
            seed,
            rng,
            session: Session::new(),
            spawner,
            pieces: Vec::new(),
            pending_events: Vec::new(),
            next_id: 1,
        })
    }

    /// Restart from scratch with the same seed (replays the run)
    pub fn reset(&mut self) {
        self.reset_with_seed(self.seed);
    }

    /// Start a new run with a seed drawn from the current one
    pub fn restart(&mut self) {
        let seed = self.rng.random::<u64>();
        self.reset_with_seed(seed);
    }

    /// Restart from scratch with a new seed
    pub fn reset_with_seed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = Pcg32::seed_from_u64(seed);
        self.spawner = Spawner::new(self.config.spawn.spawn_rank_count, &mut self.rng);
        self.session = Session::new();
        self.pieces.clear();
        self.pending_events.clear();
        self.next_id = 1;
        log::info!("Simulation reset with seed {}", seed);
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn score(&self) -> u64 {
        self.session.score
    }

    pub fn is_terminal(&self) -> bool {
        self.session.phase == GamePhase::Terminal
    }

    /// Active pieces in fusion-priority order
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn held(&self) -> Rank {
        self.spawner.held()
    }

    /// Nearest upcoming rank after the held one
    pub fn peek_next(&self) -> Rank {
        self.spawner.peek_next()
    }

    pub(super) fn pop_curve(&self) -> PopCurve {
        PopCurve::from_timing(&self.config.timing)
    }

    fn next_entity_id(&mut self) -> u32 {
        take_id(&mut self.next_id)
    }

    /// Release the held piece at `x` (clamped into the well)
    ///
    /// Ignored while the drop cooldown runs or after the run has ended.
    pub fn request_drop(&mut self, x: f32) -> DropOutcome {
        if self.is_terminal() {
            return DropOutcome::Suppressed(SuppressReason::Terminal);
        }
        if self.session.drop_cooldown > 0 {
            log::debug!(
                "Drop suppressed ({} cooldown ticks left)",
                self.session.drop_cooldown
            );
            return DropOutcome::Suppressed(SuppressReason::Cooldown);
        }

        let rank = self.spawner.release_held(&mut self.rng);
        let id = self.next_entity_id();
        let piece = spawn_held_piece(id, rank, x, &self.config, &mut self.rng);
        let x = piece.pos.x;

        self.pending_events.push(SimEvent::Dropped {
            rank,
            position: piece.pos,
        });
        self.pieces.push(piece);
        self.session.drop_cooldown = self.config.timing.drop_cooldown_ticks;
        self.session.drops += 1;

        DropOutcome::Dropped { id, rank, x }
    }

    /// Insert a motionless piece directly (scripted scenarios)
    ///
    /// The position is clamped into the well. Returns `None` if `rank` is not
    /// in the rank table or `pos` is not finite.
    pub fn place_piece(&mut self, rank: Rank, pos: Vec2) -> Option<u32> {
        if !self.config.ranks.contains(rank) || !pos.is_finite() {
            return None;
        }
        let well = &self.config.well;
        let radius = self.config.ranks.radius(rank);
        let pos = Vec2::new(
            pos.x.max(radius).min(well.width - radius),
            pos.y.max(radius).min(well.height - radius),
        );

        let id = self.next_entity_id();
        self.pieces.push(Piece::new(
            id,
            rank,
            radius,
            pos,
            self.config.timing.grace_ticks,
        ));
        Some(id)
    }

    /// Read-only view for renderers and UI
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            pieces: self
                .pieces
                .iter()
                .map(|p| PieceView {
                    id: p.id,
                    pos: p.pos,
                    vel: p.vel,
                    rank: p.rank,
                    scale: p.scale,
                    radius: p.radius(),
                })
                .collect(),
            score: self.session.score,
            held: self.spawner.held(),
            queue: self.spawner.queue(),
            terminal: self.is_terminal(),
            drop_ready: !self.is_terminal() && self.session.drop_cooldown == 0,
            time_ticks: self.session.time_ticks,
        }
    }
}

/// Allocate the next entity id
pub(super) fn take_id(next_id: &mut u32) -> u32 {
    let id = *next_id;
    *next_id += 1;
    id
}

/// Build the child of a fusion: upward kick, fresh grace window, pop started
pub(super) fn spawn_fused_piece(
    id: u32,
    rank: Rank,
    pos: Vec2,
    config: &SimConfig,
    rng: &mut Pcg32,
) -> Piece {
    let mut piece = Piece::new(
        id,
        rank,
        config.ranks.radius(rank),
        pos,
        config.timing.grace_ticks,
    );
    piece.vel = Vec2::new(
        jitter(config.spawn.jitter, rng),
        -config.spawn.fusion_impulse,
    );
    piece.start_pop(
        config.timing.pop_ticks,
        PopCurve::from_timing(&config.timing),
    );
    piece
}
