//! Tile catalog for the French letter set (98 letters, 2 jokers, 100 tiles).

use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::types::{Tile, TileId, JOKER_MARKER};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LetterSpec {
    pub letter: char,
    pub points: u32,
    pub count: u32,
}

const fn entry(letter: char, points: u32, count: u32) -> LetterSpec {
    LetterSpec {
        letter,
        points,
        count,
    }
}

pub static TILE_CATALOG: Lazy<Vec<LetterSpec>> = Lazy::new(|| {
    vec![
        entry('A', 1, 9),
        entry('B', 3, 2),
        entry('C', 3, 2),
        entry('D', 2, 3),
        entry('E', 1, 14),
        entry('F', 4, 2),
        entry('G', 2, 2),
        entry('H', 4, 2),
        entry('I', 1, 7),
        entry('J', 8, 1),
        entry('K', 10, 1),
        entry('L', 1, 5),
        entry('M', 2, 3),
        entry('N', 1, 6),
        entry('O', 1, 6),
        entry('P', 3, 2),
        entry('Q', 8, 1),
        entry('R', 1, 6),
        entry('S', 1, 6),
        entry('T', 1, 6),
        entry('U', 1, 6),
        entry('V', 4, 2),
        entry('W', 10, 1),
        entry('X', 10, 1),
        entry('Y', 10, 1),
        entry('Z', 10, 1),
        entry(JOKER_MARKER, 0, 2),
    ]
});

pub static LETTER_LOOKUP: Lazy<HashMap<char, &'static LetterSpec>> =
    Lazy::new(|| TILE_CATALOG.iter().map(|s| (s.letter, s)).collect());

/// Point value of a letter (case-insensitive). Jokers are looked up by `JOKER_MARKER`.
pub fn letter_points(letter: char) -> Option<u32> {
    LETTER_LOOKUP
        .get(&letter.to_ascii_uppercase())
        .map(|s| s.points)
}

/// Number of copies of a letter in a full bag.
pub fn letter_count(letter: char) -> Option<u32> {
    LETTER_LOOKUP
        .get(&letter.to_ascii_uppercase())
        .map(|s| s.count)
}

/// Total number of tiles in a full bag.
pub fn tile_total() -> u32 {
    TILE_CATALOG.iter().map(|s| s.count).sum()
}

/// Build every tile of the set in catalog order, with ids `0..tile_total()`.
pub fn build_tile_bag() -> Vec<Tile> {
    let mut tiles = Vec::with_capacity(tile_total() as usize);
    let mut next_id: TileId = 0;
    for spec in TILE_CATALOG.iter() {
        for _ in 0..spec.count {
            let tile = if spec.letter == JOKER_MARKER {
                Tile::joker(next_id)
            } else {
                Tile::letter(next_id, spec.letter, spec.points)
            };
            tiles.push(tile);
            next_id += 1;
        }
    }
    tiles
}
