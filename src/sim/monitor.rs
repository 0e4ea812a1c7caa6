//! End-of-run detection

use super::piece::Piece;

/// First piece past its grace window whose top edge reaches the danger line
///
/// y grows downward, so "at or above the line" means `top <= danger_line`.
pub fn find_danger_crossing(pieces: &[Piece], danger_line: f32) -> Option<&Piece> {
    pieces
        .iter()
        .find(|piece| !piece.in_grace() && piece.top() <= danger_line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rank::Rank;
    use glam::Vec2;

    #[test]
    fn test_grace_window_suppresses_crossing() {
        let mut piece = Piece::new(1, Rank(0), 12.0, Vec2::new(100.0, 30.0), 60);
        assert!(find_danger_crossing(std::slice::from_ref(&piece), 60.0).is_none());

        piece.grace_ticks = 0;
        assert!(find_danger_crossing(std::slice::from_ref(&piece), 60.0).is_some());
    }

    #[test]
    fn test_top_edge_exactly_on_line_counts() {
        let mut piece = Piece::new(1, Rank(0), 12.0, Vec2::new(100.0, 72.0), 0);
        assert!(find_danger_crossing(std::slice::from_ref(&piece), 60.0).is_some());

        piece.pos.y = 72.5;
        assert!(find_danger_crossing(std::slice::from_ref(&piece), 60.0).is_none());
    }

    #[test]
    fn test_reports_first_offender() {
        let pieces = vec![
            Piece::new(1, Rank(0), 12.0, Vec2::new(50.0, 300.0), 0),
            Piece::new(2, Rank(0), 12.0, Vec2::new(100.0, 40.0), 0),
            Piece::new(3, Rank(0), 12.0, Vec2::new(150.0, 40.0), 0),
        ];
        assert_eq!(find_danger_crossing(&pieces, 60.0).map(|p| p.id), Some(2));
    }
}
