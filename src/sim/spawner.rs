//! Spawner and lookahead queue
//!
//! Spawned ranks are uniform over the lowest few ranks. The queue always
//! holds exactly `QUEUE_LEN` upcoming ranks behind the held piece.

use glam::Vec2;
use rand::Rng;

use super::piece::Piece;
use super::rank::Rank;
use crate::config::SimConfig;
use crate::consts::QUEUE_LEN;

/// Held piece plus the upcoming ranks
#[derive(Debug, Clone, PartialEq)]
pub struct Spawner {
    /// Rank of the piece waiting to be dropped
    held: Rank,
    queue: [Rank; QUEUE_LEN],
    /// Exclusive upper bound of spawnable ranks
    spawn_rank_count: u8,
}

impl Spawner {
    /// Fresh spawner with a random held piece and full queue
    pub fn new(spawn_rank_count: u8, rng: &mut impl Rng) -> Self {
        let held = Self::random_rank(spawn_rank_count, rng);
        let queue = std::array::from_fn(|_| Self::random_rank(spawn_rank_count, &mut *rng));
        Self {
            held,
            queue,
            spawn_rank_count,
        }
    }

    fn random_rank(spawn_rank_count: u8, rng: &mut impl Rng) -> Rank {
        Rank(rng.random_range(0..spawn_rank_count))
    }

    pub fn held(&self) -> Rank {
        self.held
    }

    /// Upcoming ranks, nearest first
    pub fn queue(&self) -> [Rank; QUEUE_LEN] {
        self.queue
    }

    pub fn peek_next(&self) -> Rank {
        self.queue[0]
    }

    /// Pop the front of the queue and refill the back
    pub fn advance_queue(&mut self, rng: &mut impl Rng) -> Rank {
        let next = self.queue[0];
        self.queue.rotate_left(1);
        self.queue[QUEUE_LEN - 1] = Self::random_rank(self.spawn_rank_count, rng);
        next
    }

    /// Release the held piece: returns its rank and promotes the queue front
    pub fn release_held(&mut self, rng: &mut impl Rng) -> Rank {
        let released = self.held;
        self.held = self.advance_queue(rng);
        released
    }
}

/// Build a freshly dropped piece at the spawn height
///
/// `x` is clamped so the piece lies fully inside the well. The piece gets a
/// small random horizontal velocity.
pub fn spawn_held_piece(
    id: u32,
    rank: Rank,
    x: f32,
    config: &SimConfig,
    rng: &mut impl Rng,
) -> Piece {
    debug_assert!(
        config.ranks.contains(rank),
        "spawned rank {} outside rank table",
        rank
    );
    let well = &config.well;
    let radius = config.ranks.radius(rank);
    let x = if x.is_finite() { x } else { well.center_x() };
    let x = x.max(radius).min(well.width - radius);

    let mut piece = Piece::new(
        id,
        rank,
        radius,
        Vec2::new(x, well.spawn_y),
        config.timing.grace_ticks,
    );
    piece.vel.x = jitter(config.spawn.jitter, rng);
    piece
}

/// Uniform horizontal jitter in `[-max, max]`
pub fn jitter(max: f32, rng: &mut impl Rng) -> f32 {
    if max > 0.0 {
        rng.random_range(-max..=max)
    } else {
        0.0
    }
}
