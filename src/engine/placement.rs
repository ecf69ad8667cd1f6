//! Geometric legality of a turn's placements.

use std::collections::{BTreeSet, HashSet};

use thiserror::Error;

use super::board::Board;
use super::types::{Direction, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("placed tiles do not share a single row or column")]
    NotCollinear,
    #[error("placed tiles leave an empty cell inside the word")]
    GapInWord,
}

/// Placements must share one row or one column, and every cell between the first
/// and last placed tile must be filled, either by an existing tile or a new one.
pub fn check_geometry(board: &Board, positions: &[Position]) -> Result<(), GeometryError> {
    if positions.len() <= 1 {
        return Ok(());
    }

    let rows: BTreeSet<usize> = positions.iter().map(|p| p.row()).collect();
    let cols: BTreeSet<usize> = positions.iter().map(|p| p.col()).collect();
    let single_row = rows.len() == 1;
    let single_col = cols.len() == 1;
    if single_row == single_col {
        return Err(GeometryError::NotCollinear);
    }

    let direction = if single_row {
        Direction::Horizontal
    } else {
        Direction::Vertical
    };
    let fixed = positions[0].across(direction);
    let placed: HashSet<Position> = positions.iter().copied().collect();
    let (min, max) = positions
        .iter()
        .map(|p| p.along(direction))
        .fold((usize::MAX, 0), |(lo, hi), i| (lo.min(i), hi.max(i)));

    for index in min..=max {
        let filled = Position::on_line(direction, fixed, index)
            .map(|p| board.is_occupied(p) || placed.contains(&p))
            .unwrap_or(false);
        if !filled {
            return Err(GeometryError::GapInWord);
        }
    }
    Ok(())
}

pub fn is_geometry_valid(board: &Board, positions: &[Position]) -> bool {
    check_geometry(board, positions).is_ok()
}

/// The first turn must cover the center cell. Later turns need at least one new tile
/// orthogonally adjacent to a tile already on `board`.
pub fn is_connected(board: &Board, positions: &[Position], turn_number: u32) -> bool {
    if turn_number <= 1 {
        return positions.contains(&Position::CENTER);
    }

    let placed: HashSet<Position> = positions.iter().copied().collect();
    positions.iter().any(|p| {
        p.neighbors()
            .any(|n| board.is_occupied(n) && !placed.contains(&n))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::{PlacedTile, Tile};

    fn pos(row: usize, col: usize) -> Position {
        Position::new(row, col).unwrap()
    }

    fn board_with(cells: &[(usize, usize)]) -> Board {
        let placed: Vec<PlacedTile> = cells
            .iter()
            .enumerate()
            .map(|(i, &(r, c))| PlacedTile::new(Tile::letter(i as u32, 'A', 1), pos(r, c)))
            .collect();
        Board::new()
            .with_placed_tiles(&placed)
            .lock_positions(placed.iter().map(|p| p.position))
    }

    #[test]
    fn test_single_tile_is_valid_geometry() {
        assert!(is_geometry_valid(&Board::new(), &[pos(2, 2)]));
        assert!(is_geometry_valid(&Board::new(), &[]));
    }

    #[test]
    fn test_contiguous_row_is_valid() {
        let positions = [pos(7, 6), pos(7, 7), pos(7, 8)];
        assert_eq!(check_geometry(&Board::new(), &positions), Ok(()));
    }

    #[test]
    fn test_contiguous_column_in_any_order() {
        let positions = [pos(9, 4), pos(7, 4), pos(8, 4)];
        assert_eq!(check_geometry(&Board::new(), &positions), Ok(()));
    }

    #[test]
    fn test_diagonal_is_not_collinear() {
        let positions = [pos(7, 7), pos(8, 8)];
        assert_eq!(
            check_geometry(&Board::new(), &positions),
            Err(GeometryError::NotCollinear)
        );
    }

    #[test]
    fn test_gap_detected() {
        let positions = [pos(7, 6), pos(7, 8)];
        assert_eq!(
            check_geometry(&Board::new(), &positions),
            Err(GeometryError::GapInWord)
        );
    }

    #[test]
    fn test_gap_filled_by_existing_tile() {
        let board = board_with(&[(7, 7)]);
        let positions = [pos(7, 6), pos(7, 8)];
        assert_eq!(check_geometry(&board, &positions), Ok(()));
    }

    #[test]
    fn test_first_turn_requires_center() {
        let board = Board::new();
        assert!(is_connected(&board, &[pos(7, 6), pos(7, 7)], 1));
        assert!(!is_connected(&board, &[pos(7, 8), pos(7, 9)], 1));
    }

    #[test]
    fn test_later_turn_requires_adjacency() {
        let board = board_with(&[(7, 7), (7, 8)]);
        assert!(is_connected(&board, &[pos(8, 8)], 2));
        assert!(is_connected(&board, &[pos(6, 7), pos(5, 7)], 2));
        assert!(!is_connected(&board, &[pos(3, 3)], 2));
        // diagonal contact does not count
        assert!(!is_connected(&board, &[pos(8, 9)], 2));
    }

    #[test]
    fn test_any_adjacent_tile_suffices() {
        let board = board_with(&[(7, 7)]);
        // only the last tile touches the existing one
        assert!(is_connected(&board, &[pos(8, 4), pos(8, 5), pos(8, 6), pos(8, 7)], 2));
    }
}
