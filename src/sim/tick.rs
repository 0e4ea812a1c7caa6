//! Fixed timestep simulation tick
//!
//! Per tick: cooldown, integration, collision/fusion resolution, final
//! containment, end-of-run check. Nothing here blocks; a tick always
//! completes before the next one starts.

use super::collision::resolve_collisions;
use super::monitor::find_danger_crossing;
use super::state::{GamePhase, SimEvent, Simulation, spawn_fused_piece, take_id};

/// Input commands for a single frame (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Drop the held piece at this x (from pointer position)
    pub drop_x: Option<f32>,
    /// Restart after the run has ended
    pub restart: bool,
    /// Idle/demo mode - the autoplayer picks drop positions
    pub autoplay: bool,
}

/// Horizontal offsets from the well center the autoplayer cycles through
pub const AUTOPLAY_OFFSETS: [f32; 5] = [-30.0, -15.0, 0.0, 15.0, 30.0];

impl Simulation {
    /// Advance the simulation by one fixed step
    ///
    /// Returns the events raised since the previous tick. A terminal
    /// simulation does not change and returns no events.
    pub fn tick(&mut self) -> Vec<SimEvent> {
        if self.is_terminal() {
            return Vec::new();
        }

        let mut events = std::mem::take(&mut self.pending_events);
        self.session.time_ticks += 1;
        self.session.drop_cooldown = self.session.drop_cooldown.saturating_sub(1);

        let curve = self.pop_curve();
        for piece in &mut self.pieces {
            piece.advance(&self.config.physics, &self.config.well, curve);
        }

        let config = &self.config;
        let rng = &mut self.rng;
        let next_id = &mut self.next_id;
        let fusion = resolve_collisions(
            &mut self.pieces,
            &config.ranks,
            &config.physics,
            |rank, pos| spawn_fused_piece(take_id(next_id), rank, pos, config, rng),
        );

        if let Some(fusion) = fusion {
            let value = self.config.ranks.value(fusion.new_rank);
            self.session.score += value;
            self.session.fusions += 1;
            log::debug!(
                "Fusion {} + {} -> rank {} at ({:.1}, {:.1}), score {}",
                fusion.parent_ids.0,
                fusion.parent_ids.1,
                fusion.new_rank,
                fusion.position.x,
                fusion.position.y,
                self.session.score
            );
            events.push(SimEvent::Fusion {
                position: fusion.position,
                color: self.config.ranks.color(fusion.parent_rank),
                new_rank: fusion.new_rank,
            });
        }

        for piece in &mut self.pieces {
            piece.contain(&self.config.well);
        }

        if let Some(piece) = find_danger_crossing(&self.pieces, self.config.well.danger_line) {
            log::info!(
                "Game over: piece {} (rank {}) reached the danger line; score {} after {} ticks",
                piece.id,
                piece.rank,
                self.session.score,
                self.session.time_ticks
            );
            self.session.phase = GamePhase::Terminal;
            events.push(SimEvent::GameOver {
                score: self.session.score,
            });
        }

        events
    }
}

/// Apply one frame of input, then advance one tick
pub fn step(sim: &mut Simulation, input: &TickInput) -> Vec<SimEvent> {
    if input.restart && sim.is_terminal() {
        sim.restart();
    }

    let drop_x = if input.autoplay && !sim.is_terminal() {
        Some(autoplay_drop_x(sim))
    } else {
        input.drop_x
    };
    if let Some(x) = drop_x {
        sim.request_drop(x);
    }

    sim.tick()
}

/// Pick a drop position for the held piece
///
/// Aims at the highest resting piece of the same rank so the drop can fuse;
/// otherwise cycles through fixed offsets around the well center.
pub fn autoplay_drop_x(sim: &Simulation) -> f32 {
    let held = sim.held();
    let target = sim
        .pieces()
        .iter()
        .filter(|p| p.rank == held && !p.in_grace())
        .min_by(|a, b| {
            a.top()
                .partial_cmp(&b.top())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    if let Some(piece) = target {
        return piece.pos.x;
    }

    let offset = AUTOPLAY_OFFSETS[sim.session().drops as usize % AUTOPLAY_OFFSETS.len()];
    sim.config().well.center_x() + offset
}
