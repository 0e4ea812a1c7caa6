//! Pairwise collision detection, separation and fusion
//!
//! Each tick runs a few relaxation passes over all unordered piece pairs in
//! row-major index order. Overlapping pairs of equal, non-maximal rank fuse;
//! every other overlap is split 50/50 along the center line. The first
//! fusion found ends resolution for the tick, so array order is the fusion
//! priority and replays stay deterministic.

use glam::Vec2;

use super::piece::Piece;
use super::rank::{Rank, RankTable};
use crate::config::PhysicsTuning;

/// Result of a circle-circle overlap check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether the circles overlap
    pub hit: bool,
    /// Center distance
    pub distance: f32,
    /// Unit vector from the first center toward the second (zero if coincident)
    pub normal: Vec2,
    /// Overlap depth along the normal
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss(distance: f32) -> Self {
        Self {
            hit: false,
            distance,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check overlap between two circles
///
/// Coincident centers produce a zero normal: the pair is reported as a hit
/// but separation cannot push it apart this pass.
pub fn circle_circle(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> CollisionResult {
    let delta = b_pos - a_pos;
    let distance = delta.length();
    let min_dist = a_radius + b_radius;

    if distance >= min_dist {
        return CollisionResult::miss(distance);
    }

    let normal = if distance > 0.0 {
        delta / distance
    } else {
        Vec2::ZERO
    };

    CollisionResult {
        hit: true,
        distance,
        normal,
        penetration: min_dist - distance,
    }
}

/// Record of a fusion executed by the resolver
#[derive(Debug, Clone, PartialEq)]
pub struct Fusion {
    /// Rank of both consumed pieces
    pub parent_rank: Rank,
    pub new_rank: Rank,
    /// Midpoint of the consumed pair, where the child was placed
    pub position: Vec2,
    pub parent_ids: (u32, u32),
    pub child_id: u32,
}

/// Borrow two distinct pieces mutably (`i < j`)
fn pair_mut(pieces: &mut [Piece], i: usize, j: usize) -> (&mut Piece, &mut Piece) {
    let (head, tail) = pieces.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}

/// Push a non-fusing overlapping pair apart with equal mass
fn separate(a: &mut Piece, b: &mut Piece, hit: &CollisionResult, contact_damping: f32) {
    let push = hit.normal * hit.penetration * 0.5;
    a.pos -= push;
    b.pos += push;
    a.vel *= contact_damping;
    b.vel *= contact_damping;
}

/// Run the relaxation passes over `pieces`
///
/// `make_child` builds the fused piece from the new rank and the parents'
/// midpoint. Returns the fusion if one happened; at most one fusion runs
/// per call and it ends resolution immediately.
pub fn resolve_collisions(
    pieces: &mut Vec<Piece>,
    ranks: &RankTable,
    physics: &PhysicsTuning,
    make_child: impl FnOnce(Rank, Vec2) -> Piece,
) -> Option<Fusion> {
    for _ in 0..physics.relaxation_passes {
        let n = pieces.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = pair_mut(pieces, i, j);
                let hit = circle_circle(a.pos, a.radius(), b.pos, b.radius());
                if !hit.hit {
                    continue;
                }

                if a.rank == b.rank && ranks.can_fuse(a.rank) {
                    return Some(fuse(pieces, i, j, make_child));
                }

                separate(a, b, &hit, physics.contact_damping);
            }
        }
    }
    None
}

/// Replace pieces `i < j` with one child at their midpoint, appended last
fn fuse(
    pieces: &mut Vec<Piece>,
    i: usize,
    j: usize,
    make_child: impl FnOnce(Rank, Vec2) -> Piece,
) -> Fusion {
    let second = pieces.remove(j);
    let first = pieces.remove(i);
    let position = (first.pos + second.pos) * 0.5;
    let new_rank = first.rank.next();

    let child = make_child(new_rank, position);
    let child_id = child.id;
    pieces.push(child);

    Fusion {
        parent_rank: first.rank,
        new_rank,
        position,
        parent_ids: (first.id, second.id),
        child_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn piece(id: u32, rank: u8, x: f32, y: f32) -> Piece {
        let ranks = RankTable::default();
        Piece::new(id, Rank(rank), ranks.radius(Rank(rank)), Vec2::new(x, y), 60)
    }

    fn child(rank: Rank, pos: Vec2) -> Piece {
        Piece::new(99, rank, RankTable::default().radius(rank), pos, 60)
    }

    #[test]
    fn test_circle_circle_miss_when_touching() {
        let result = circle_circle(Vec2::ZERO, 10.0, Vec2::new(20.0, 0.0), 10.0);
        assert!(!result.hit);
        let result = circle_circle(Vec2::ZERO, 10.0, Vec2::new(19.0, 0.0), 10.0);
        assert!(result.hit);
        assert!((result.penetration - 1.0).abs() < 1e-6);
        assert_eq!(result.normal, Vec2::X);
    }

    #[test]
    fn test_coincident_centers_have_zero_normal() {
        let result = circle_circle(Vec2::new(5.0, 5.0), 10.0, Vec2::new(5.0, 5.0), 10.0);
        assert!(result.hit);
        assert_eq!(result.normal, Vec2::ZERO);
        assert!(result.normal.x.is_finite() && result.normal.y.is_finite());
    }

    #[test]
    fn test_equal_ranks_fuse_into_next_rank() {
        let ranks = RankTable::default();
        let physics = PhysicsTuning::default();
        let mut pieces = vec![piece(1, 0, 100.0, 300.0), piece(2, 0, 110.0, 300.0)];

        let fusion = resolve_collisions(&mut pieces, &ranks, &physics, child).unwrap();

        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].rank, Rank(1));
        assert_eq!(pieces[0].pos, Vec2::new(105.0, 300.0));
        assert_eq!(fusion.parent_rank, Rank(0));
        assert_eq!(fusion.new_rank, Rank(1));
        assert_eq!(fusion.parent_ids, (1, 2));
        assert_eq!(fusion.child_id, 99);
    }

    #[test]
    fn test_max_rank_pieces_separate_instead_of_fusing() {
        let ranks = RankTable::default();
        let physics = PhysicsTuning::default();
        let mut pieces = vec![piece(1, 10, 100.0, 300.0), piece(2, 10, 140.0, 300.0)];
        pieces[0].vel = Vec2::new(1.0, 1.0);

        let fusion = resolve_collisions(&mut pieces, &ranks, &physics, child);

        assert!(fusion.is_none());
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].rank, Rank(10));
        assert_eq!(pieces[1].rank, Rank(10));
        // Overlap of 68 split evenly on the first pass
        assert!(pieces[0].pos.x < 100.0);
        assert!(pieces[1].pos.x > 140.0);
        let gap = pieces[1].pos.x - pieces[0].pos.x;
        assert!((gap - 108.0).abs() < 1e-3);
        assert!((pieces[0].vel.x - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_mismatched_ranks_split_overlap_evenly() {
        let ranks = RankTable::default();
        let physics = PhysicsTuning::default();
        // Radii 12 and 15, centers 17 apart: overlap 10
        let mut pieces = vec![piece(1, 0, 100.0, 300.0), piece(2, 1, 117.0, 300.0)];

        assert!(resolve_collisions(&mut pieces, &ranks, &physics, child).is_none());
        assert!((pieces[0].pos.x - 95.0).abs() < 1e-4);
        assert!((pieces[1].pos.x - 122.0).abs() < 1e-4);
    }

    #[test]
    fn test_first_pair_in_scan_order_wins() {
        let ranks = RankTable::default();
        let physics = PhysicsTuning::default();
        // Pairs (0,1) and (2,3) both fuse; only (0,1) runs this call
        let mut pieces = vec![
            piece(1, 0, 30.0, 300.0),
            piece(2, 0, 40.0, 300.0),
            piece(3, 1, 180.0, 300.0),
            piece(4, 1, 190.0, 300.0),
        ];

        let fusion = resolve_collisions(&mut pieces, &ranks, &physics, child).unwrap();

        assert_eq!(fusion.parent_ids, (1, 2));
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[0].id, 3);
        assert_eq!(pieces[1].id, 4);
        assert_eq!(pieces[2].rank, Rank(1));
    }

    #[test]
    fn test_fusion_discards_remaining_corrections() {
        let ranks = RankTable::default();
        let physics = PhysicsTuning::default();
        let mut pieces = vec![
            piece(1, 0, 30.0, 300.0),
            piece(2, 0, 40.0, 300.0),
            piece(3, 1, 180.0, 300.0),
            piece(4, 2, 190.0, 300.0),
        ];

        resolve_collisions(&mut pieces, &ranks, &physics, child);

        // The (3,4) overlap comes after the fusion in scan order
        assert_eq!(pieces[0].pos.x, 180.0);
        assert_eq!(pieces[1].pos.x, 190.0);
    }

    #[test]
    fn test_coincident_mismatched_pair_stays_finite() {
        let ranks = RankTable::default();
        let physics = PhysicsTuning::default();
        let mut pieces = vec![piece(1, 0, 100.0, 300.0), piece(2, 1, 100.0, 300.0)];
        pieces[0].vel = Vec2::new(1.0, -1.0);

        assert!(resolve_collisions(&mut pieces, &ranks, &physics, child).is_none());
        for p in &pieces {
            assert!(p.pos.is_finite());
            assert!(p.vel.is_finite());
        }
        // Damped once per pass
        assert!((pieces[0].vel.x - 0.729).abs() < 1e-5);
    }
}
