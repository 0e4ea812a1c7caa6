//! Pieces and the per-tick integrator
//!
//! A piece is a circle with a rank-derived base radius. Its effective
//! collision radius is scaled by the pop animation, so fusion children
//! briefly change size in the physics as well as on screen.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rank::Rank;
use crate::config::{PhysicsTuning, TimingTuning, WellGeometry};

/// Radius multiplier curve driven by the pop counter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopCurve {
    pub amplitude: f32,
    /// Counter ticks per half sine period
    pub period: f32,
}

impl PopCurve {
    pub fn from_timing(timing: &TimingTuning) -> Self {
        Self {
            amplitude: timing.pop_amplitude,
            period: timing.pop_period,
        }
    }

    /// Scale for a given remaining pop counter; exactly 1.0 at zero
    #[inline]
    pub fn scale(&self, pop_ticks: u32) -> f32 {
        if pop_ticks == 0 {
            return 1.0;
        }
        1.0 + self.amplitude * (pop_ticks as f32 / self.period * std::f32::consts::PI).sin()
    }
}

/// A circular body in the well
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub rank: Rank,
    /// Radius from the rank table, before pop scaling
    pub base_radius: f32,
    /// Remaining pop animation ticks
    pub pop_ticks: u32,
    /// Current pop radius multiplier (always `curve.scale(pop_ticks)`)
    pub scale: f32,
    /// Ticks left before this piece can end the run
    pub grace_ticks: u32,
}

impl Piece {
    pub fn new(id: u32, rank: Rank, base_radius: f32, pos: Vec2, grace_ticks: u32) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            rank,
            base_radius,
            pop_ticks: 0,
            scale: 1.0,
            grace_ticks,
        }
    }

    /// Effective collision radius
    #[inline]
    pub fn radius(&self) -> f32 {
        self.base_radius * self.scale
    }

    /// Top edge y-coordinate
    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y - self.radius()
    }

    /// Start (or restart) the pop animation
    pub fn start_pop(&mut self, ticks: u32, curve: PopCurve) {
        self.pop_ticks = ticks;
        self.scale = curve.scale(ticks);
    }

    pub fn in_grace(&self) -> bool {
        self.grace_ticks > 0
    }

    /// Advance one tick: gravity, damping, rest snapping, integration,
    /// containment, then pop and grace counters.
    pub fn advance(
        &mut self,
        physics: &PhysicsTuning,
        well: &WellGeometry,
        curve: PopCurve,
    ) {
        self.vel.y += physics.gravity;
        self.vel *= physics.damping;

        if self.vel.x.abs() < physics.rest_epsilon {
            self.vel.x = 0.0;
        }
        if self.vel.y.abs() < physics.rest_epsilon {
            self.vel.y = 0.0;
        }

        self.pos += self.vel;
        self.contain(well);

        if self.pop_ticks > 0 {
            self.pop_ticks -= 1;
        }
        self.scale = curve.scale(self.pop_ticks);

        self.grace_ticks = self.grace_ticks.saturating_sub(1);
    }

    /// Clamp into the well; walls and floor are fully inelastic
    pub fn contain(&mut self, well: &WellGeometry) {
        let r = self.radius();
        if self.pos.x - r < 0.0 {
            self.pos.x = r;
            self.vel.x = 0.0;
        } else if self.pos.x + r > well.width {
            self.pos.x = well.width - r;
            self.vel.x = 0.0;
        }

        if self.pos.y + r > well.height {
            self.pos.y = well.height - r;
            self.vel.y = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> (PhysicsTuning, WellGeometry, PopCurve) {
        (
            PhysicsTuning::default(),
            WellGeometry::default(),
            PopCurve::from_timing(&TimingTuning::default()),
        )
    }

    #[test]
    fn test_pop_scale_is_one_at_rest() {
        let (_, _, curve) = defaults();
        assert_eq!(curve.scale(0), 1.0);
        // Counter 10 is a full half period: sin(pi) ~ 0
        assert!((curve.scale(10) - 1.0).abs() < 1e-5);
        assert!(curve.scale(5) > 1.25);
        assert!(curve.scale(15) < 0.75);
    }

    #[test]
    fn test_single_piece_comes_to_rest_on_floor() {
        let (physics, well, curve) = defaults();
        let mut piece = Piece::new(1, Rank(0), 12.0, Vec2::new(122.0, 100.0), 60);

        for _ in 0..300 {
            piece.advance(&physics, &well, curve);
        }

        assert_eq!(piece.pos.y, well.height - piece.radius());
        assert_eq!(piece.vel, Vec2::ZERO);
        assert_eq!(piece.pos.x, 122.0);
    }

    #[test]
    fn test_damping_applies_while_falling() {
        let (physics, well, curve) = defaults();
        let mut piece = Piece::new(1, Rank(0), 12.0, Vec2::new(122.0, 30.0), 60);
        piece.advance(&physics, &well, curve);
        assert!((piece.vel.y - 0.3 * 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_small_velocity_snaps_to_zero() {
        let (physics, well, curve) = defaults();
        let mut piece = Piece::new(1, Rank(0), 12.0, Vec2::new(122.0, 100.0), 60);
        piece.vel.x = 0.04;
        piece.advance(&physics, &well, curve);
        assert_eq!(piece.vel.x, 0.0);
        assert_eq!(piece.pos.x, 122.0);
    }

    #[test]
    fn test_wall_contact_is_inelastic() {
        let (physics, well, curve) = defaults();
        let mut piece = Piece::new(1, Rank(0), 12.0, Vec2::new(14.0, 100.0), 60);
        piece.vel.x = -5.0;
        piece.advance(&physics, &well, curve);
        assert_eq!(piece.pos.x, 12.0);
        assert_eq!(piece.vel.x, 0.0);

        let mut piece = Piece::new(2, Rank(0), 12.0, Vec2::new(230.0, 100.0), 60);
        piece.vel.x = 5.0;
        piece.advance(&physics, &well, curve);
        assert_eq!(piece.pos.x, well.width - 12.0);
        assert_eq!(piece.vel.x, 0.0);
    }

    #[test]
    fn test_pop_counter_drives_radius() {
        let (physics, well, curve) = defaults();
        let mut piece = Piece::new(1, Rank(1), 15.0, Vec2::new(122.0, 200.0), 60);
        piece.start_pop(15, curve);

        for _ in 0..20 {
            piece.advance(&physics, &well, curve);
            assert_eq!(piece.radius(), piece.base_radius * curve.scale(piece.pop_ticks));
        }
        assert_eq!(piece.pop_ticks, 0);
        assert_eq!(piece.radius(), 15.0);
    }

    #[test]
    fn test_grace_counts_down_and_saturates() {
        let (physics, well, curve) = defaults();
        let mut piece = Piece::new(1, Rank(0), 12.0, Vec2::new(122.0, 370.0), 2);
        assert!(piece.in_grace());
        piece.advance(&physics, &well, curve);
        piece.advance(&physics, &well, curve);
        assert!(!piece.in_grace());
        piece.advance(&physics, &well, curve);
        assert_eq!(piece.grace_ticks, 0);
    }
}
