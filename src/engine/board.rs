//! The 15x15 board.
//!
//! Each row sits behind an `Arc`. Writing tiles or locks clones only the rows that
//! change (`Arc::make_mut`), so the board before a turn and the tentative board
//! after it share every untouched row and can both be inspected.

use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::types::{BonusKind, PlacedTile, Position, Tile, BOARD_SIZE};

/// Classify a cell using the symmetry of the classic layout: fold into the top-left
/// quadrant, then order the pair so the diagonal mirror maps to the same key.
fn classify(row: usize, col: usize) -> BonusKind {
    let last = BOARD_SIZE - 1;
    let r = row.min(last - row);
    let c = col.min(last - col);
    match (r.min(c), r.max(c)) {
        (7, 7) => BonusKind::Center,
        (0, 0) | (0, 7) => BonusKind::TripleWord,
        (1, 1) | (2, 2) | (3, 3) | (4, 4) => BonusKind::DoubleWord,
        (1, 5) | (5, 5) => BonusKind::TripleLetter,
        (0, 3) | (2, 6) | (3, 7) | (6, 6) => BonusKind::DoubleLetter,
        _ => BonusKind::None,
    }
}

pub static BONUS_LAYOUT: Lazy<[[BonusKind; BOARD_SIZE]; BOARD_SIZE]> =
    Lazy::new(|| std::array::from_fn(|row| std::array::from_fn(|col| classify(row, col))));

#[inline]
pub fn bonus_at(pos: Position) -> BonusKind {
    BONUS_LAYOUT[pos.row()][pos.col()]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardCell {
    pub position: Position,
    pub bonus: BonusKind,
    pub tile: Option<Tile>,
    /// Committed in an earlier turn; the tile can never move again.
    pub locked: bool,
}

type Row = [BoardCell; BOARD_SIZE];

fn empty_row(row: usize) -> Row {
    std::array::from_fn(|col| {
        let position = Position::new(row, col).expect("row and col are below BOARD_SIZE");
        BoardCell {
            position,
            bonus: bonus_at(position),
            tile: None,
            locked: false,
        }
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: Vec<Arc<Row>>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            rows: (0..BOARD_SIZE).map(|row| Arc::new(empty_row(row))).collect(),
        }
    }

    #[inline]
    pub fn cell(&self, pos: Position) -> &BoardCell {
        &self.rows[pos.row()][pos.col()]
    }

    #[inline]
    pub fn get_tile(&self, pos: Position) -> Option<Tile> {
        self.cell(pos).tile
    }

    #[inline]
    pub fn is_occupied(&self, pos: Position) -> bool {
        self.cell(pos).tile.is_some()
    }

    pub fn is_locked(&self, pos: Position) -> bool {
        self.cell(pos).locked
    }

    /// True when no cell holds a tile.
    pub fn is_empty(&self) -> bool {
        self.cells().all(|c| c.tile.is_none())
    }

    pub fn cells(&self) -> impl Iterator<Item = &BoardCell> {
        self.rows.iter().flat_map(|row| row.iter())
    }

    pub fn occupied_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells()
            .filter(|c| c.tile.is_some())
            .map(|c| c.position)
    }

    pub fn locked_count(&self) -> usize {
        self.cells().filter(|c| c.locked).count()
    }

    /// Write each placement's tile into its cell. Target cells are expected to be
    /// empty; legality is checked by the caller.
    pub fn with_placed_tiles(&self, placements: &[PlacedTile]) -> Board {
        let mut next = self.clone();
        for placement in placements {
            let pos = placement.position;
            let row = Arc::make_mut(&mut next.rows[pos.row()]);
            debug_assert!(row[pos.col()].tile.is_none(), "cell {pos:?} is occupied");
            row[pos.col()].tile = Some(placement.tile);
        }
        next
    }

    /// Mark cells as permanently committed. Empty cells are left unlocked.
    pub fn lock_positions(&self, positions: impl IntoIterator<Item = Position>) -> Board {
        let mut next = self.clone();
        for pos in positions {
            let row = Arc::make_mut(&mut next.rows[pos.row()]);
            let cell = &mut row[pos.col()];
            debug_assert!(cell.tile.is_some(), "cannot lock empty cell {pos:?}");
            cell.locked = cell.tile.is_some();
        }
        next
    }

    /// Whether `row` is the same allocation in both boards.
    #[cfg(test)]
    pub(crate) fn shares_row(&self, other: &Board, row: usize) -> bool {
        Arc::ptr_eq(&self.rows[row], &other.rows[row])
    }
}

// --- Board custom serde: only occupied cells are stored ---

#[derive(Serialize, Deserialize)]
struct OccupiedCellSerde {
    position: Position,
    tile: Tile,
    #[serde(default)]
    locked: bool,
}

#[derive(Serialize, Deserialize)]
struct BoardSerde {
    cells: Vec<OccupiedCellSerde>,
}

impl Serialize for Board {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let serde_board = BoardSerde {
            cells: self
                .cells()
                .filter_map(|c| {
                    c.tile.map(|tile| OccupiedCellSerde {
                        position: c.position,
                        tile,
                        locked: c.locked,
                    })
                })
                .collect(),
        };
        serde_board.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let serde_board = BoardSerde::deserialize(deserializer)?;
        let mut board = Board::new();
        for cell in serde_board.cells {
            let row = Arc::make_mut(&mut board.rows[cell.position.row()]);
            let target = &mut row[cell.position.col()];
            if target.tile.is_some() {
                return Err(serde::de::Error::custom(format!(
                    "duplicate cell at {:?}",
                    cell.position
                )));
            }
            target.tile = Some(cell.tile);
            target.locked = cell.locked;
        }
        Ok(board)
    }
}
