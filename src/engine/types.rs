//! Core word-game types: positions, bonus squares, tiles, placements and players.

use serde::{Deserialize, Serialize};

pub const BOARD_SIZE: usize = 15;
pub const RACK_SIZE: usize = 7;

/// Letter stored on a joker tile before a letter is assigned to it.
pub const JOKER_MARKER: char = '?';

pub type TileId = u32;
pub type PlayerId = String;
pub type GameId = String;

// --- Position ---

/// A cell coordinate on the board. Both components are always in `0..BOARD_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawPosition")]
pub struct Position {
    row: u8,
    col: u8,
}

#[derive(Deserialize)]
struct RawPosition {
    row: i64,
    col: i64,
}

impl TryFrom<RawPosition> for Position {
    type Error = String;

    fn try_from(raw: RawPosition) -> Result<Self, Self::Error> {
        let row = usize::try_from(raw.row).ok();
        let col = usize::try_from(raw.col).ok();
        row.zip(col)
            .and_then(|(row, col)| Position::new(row, col))
            .ok_or_else(|| format!("position ({}, {}) is off the board", raw.row, raw.col))
    }
}

impl Position {
    pub const CENTER: Position = Position { row: 7, col: 7 };

    pub fn new(row: usize, col: usize) -> Option<Self> {
        if row < BOARD_SIZE && col < BOARD_SIZE {
            Some(Self {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    pub fn row(self) -> usize {
        self.row as usize
    }

    pub fn col(self) -> usize {
        self.col as usize
    }

    /// Coordinate that varies when moving along `direction`.
    pub fn along(self, direction: Direction) -> usize {
        match direction {
            Direction::Horizontal => self.col(),
            Direction::Vertical => self.row(),
        }
    }

    /// Coordinate that stays fixed when moving along `direction`.
    pub fn across(self, direction: Direction) -> usize {
        match direction {
            Direction::Horizontal => self.row(),
            Direction::Vertical => self.col(),
        }
    }

    /// Build the position at `index` on the line `fixed` running in `direction`.
    pub fn on_line(direction: Direction, fixed: usize, index: usize) -> Option<Self> {
        match direction {
            Direction::Horizontal => Self::new(fixed, index),
            Direction::Vertical => Self::new(index, fixed),
        }
    }

    /// Step one cell forward (`forward == true`) or backward along `direction`.
    pub fn step(self, direction: Direction, forward: bool) -> Option<Self> {
        let index = self.along(direction);
        let next = if forward {
            index + 1
        } else {
            index.checked_sub(1)?
        };
        Self::on_line(direction, self.across(direction), next)
    }

    /// Orthogonal neighbors that lie on the board.
    pub fn neighbors(self) -> impl Iterator<Item = Position> {
        Direction::ALL
            .into_iter()
            .flat_map(move |d| [self.step(d, false), self.step(d, true)])
            .flatten()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Horizontal,
    Vertical,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Horizontal, Direction::Vertical];
}

// --- Bonus squares ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusKind {
    None,
    DoubleLetter,
    TripleLetter,
    DoubleWord,
    TripleWord,
    Center,
}

impl BonusKind {
    pub fn letter_multiplier(self) -> u32 {
        match self {
            BonusKind::DoubleLetter => 2,
            BonusKind::TripleLetter => 3,
            _ => 1,
        }
    }

    pub fn word_multiplier(self) -> u32 {
        match self {
            BonusKind::DoubleWord | BonusKind::Center => 2,
            BonusKind::TripleWord => 3,
            _ => 1,
        }
    }
}

// --- Tiles ---

/// A single physical tile. A joker has `letter == JOKER_MARKER` and zero points;
/// its `assigned_letter` is set when it is placed and only affects word text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub letter: char,
    pub points: u32,
    pub is_joker: bool,
    #[serde(default)]
    pub assigned_letter: Option<char>,
}

impl Tile {
    pub fn letter(id: TileId, letter: char, points: u32) -> Self {
        Self {
            id,
            letter: letter.to_ascii_uppercase(),
            points,
            is_joker: false,
            assigned_letter: None,
        }
    }

    pub fn joker(id: TileId) -> Self {
        Self {
            id,
            letter: JOKER_MARKER,
            points: 0,
            is_joker: true,
            assigned_letter: None,
        }
    }

    pub fn with_assigned_letter(self, letter: char) -> Self {
        Self {
            assigned_letter: Some(letter),
            ..self
        }
    }

    /// Letter this tile contributes to word text.
    pub fn resolved_letter(&self) -> char {
        if self.is_joker {
            self.assigned_letter.unwrap_or(JOKER_MARKER)
        } else {
            self.letter
        }
    }
}

/// One tile proposed for placement during the current turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlacedTile {
    pub tile: Tile,
    pub position: Position,
}

impl PlacedTile {
    pub fn new(tile: Tile, position: Position) -> Self {
        Self { tile, position }
    }
}

/// A contiguous run of at least two occupied cells that includes a new tile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FoundWord {
    pub text: String,
    pub tiles: Vec<(Position, Tile)>,
    pub direction: Direction,
}

// --- Players ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub score: u32,
    pub rack: Vec<Tile>,
    /// True only for the player whose turn it is.
    pub is_active: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            score: 0,
            rack: Vec::with_capacity(RACK_SIZE),
            is_active: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Waiting,
    Playing,
    Finished,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_bounds() {
        assert!(Position::new(0, 0).is_some());
        assert!(Position::new(14, 14).is_some());
        assert!(Position::new(15, 0).is_none());
        assert!(Position::new(0, 15).is_none());
    }

    #[test]
    fn test_position_step_stops_at_edges() {
        let corner = Position::new(0, 0).unwrap();
        assert_eq!(corner.step(Direction::Horizontal, false), None);
        assert_eq!(corner.step(Direction::Vertical, false), None);
        assert_eq!(
            corner.step(Direction::Horizontal, true),
            Position::new(0, 1)
        );
        let far = Position::new(14, 14).unwrap();
        assert_eq!(far.step(Direction::Vertical, true), None);
    }

    #[test]
    fn test_neighbors() {
        assert_eq!(Position::CENTER.neighbors().count(), 4);
        assert_eq!(Position::new(0, 0).unwrap().neighbors().count(), 2);
        assert_eq!(Position::new(0, 7).unwrap().neighbors().count(), 3);
    }

    #[test]
    fn test_position_deserialize_rejects_off_board() {
        let ok: Position = serde_json::from_str(r#"{"row": 3, "col": 4}"#).unwrap();
        assert_eq!(ok, Position::new(3, 4).unwrap());
        assert!(serde_json::from_str::<Position>(r#"{"row": 15, "col": 4}"#).is_err());
        assert!(serde_json::from_str::<Position>(r#"{"row": -1, "col": 4}"#).is_err());
    }

    #[test]
    fn test_joker_resolved_letter() {
        let joker = Tile::joker(1);
        assert_eq!(joker.resolved_letter(), JOKER_MARKER);
        assert_eq!(joker.points, 0);
        let assigned = joker.with_assigned_letter('Q');
        assert_eq!(assigned.resolved_letter(), 'Q');
        assert_eq!(assigned.points, 0);
    }

    #[test]
    fn test_bonus_multipliers() {
        assert_eq!(BonusKind::Center.word_multiplier(), 2);
        assert_eq!(BonusKind::TripleWord.word_multiplier(), 3);
        assert_eq!(BonusKind::TripleLetter.letter_multiplier(), 3);
        assert_eq!(BonusKind::DoubleWord.letter_multiplier(), 1);
        assert_eq!(BonusKind::None.word_multiplier(), 1);
    }
}
