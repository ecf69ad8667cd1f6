//! Move scoring.
//!
//! Bonus squares only count for tiles placed this turn. A bonus square under a new
//! tile applies to every word that passes through it.

use std::collections::HashSet;

use super::board::Board;
use super::types::{FoundWord, Position, RACK_SIZE};

/// Flat bonus for playing every tile of a full rack in one move.
pub const ALL_TILES_BONUS: u32 = 50;

pub fn score_word(word: &FoundWord, board: &Board, newly_placed: &HashSet<Position>) -> u32 {
    let mut word_score = 0;
    let mut word_multiplier = 1;

    for (pos, tile) in &word.tiles {
        let mut tile_score = if tile.is_joker { 0 } else { tile.points };
        if newly_placed.contains(pos) {
            let bonus = board.cell(*pos).bonus;
            tile_score *= bonus.letter_multiplier();
            word_multiplier *= bonus.word_multiplier();
        }
        word_score += tile_score;
    }

    word_score * word_multiplier
}

pub fn score_move(words: &[FoundWord], board: &Board, newly_placed: &HashSet<Position>) -> u32 {
    let base: u32 = words
        .iter()
        .map(|w| score_word(w, board, newly_placed))
        .sum();
    if newly_placed.len() == RACK_SIZE {
        base + ALL_TILES_BONUS
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tiles::letter_points;
    use crate::engine::types::{Direction, PlacedTile, Tile};
    use crate::engine::words::find_all_words_for_move;

    fn pos(row: usize, col: usize) -> Position {
        Position::new(row, col).unwrap()
    }

    fn tile(id: u32, ch: char) -> Tile {
        Tile::letter(id, ch, letter_points(ch).unwrap())
    }

    fn row_placements(word: &str, row: usize, col: usize) -> Vec<PlacedTile> {
        word.chars()
            .enumerate()
            .map(|(i, ch)| PlacedTile::new(tile(i as u32, ch), pos(row, col + i)))
            .collect()
    }

    fn score(placed: &[PlacedTile], board: &Board) -> u32 {
        let tentative = board.with_placed_tiles(placed);
        let words = find_all_words_for_move(&tentative, placed);
        let newly: HashSet<Position> = placed.iter().map(|p| p.position).collect();
        score_move(&words, &tentative, &newly)
    }

    #[test]
    fn test_center_doubles_word() {
        // C3 H4 A1 T1 = 9, center doubles
        let placed = row_placements("CHAT", 7, 6);
        assert_eq!(score(&placed, &Board::new()), 18);
    }

    #[test]
    fn test_letter_and_word_bonuses() {
        // K on triple word (0,0), last I on double letter (0,3)
        let placed = row_placements("KIWI", 0, 0);
        assert_eq!(score(&placed, &Board::new()), (10 + 1 + 10 + 2) * 3);
    }

    #[test]
    fn test_bonus_not_reused_on_locked_tiles() {
        let first = row_placements("CHAT", 7, 6);
        let board = Board::new()
            .with_placed_tiles(&first)
            .lock_positions(first.iter().map(|p| p.position));
        let s = vec![PlacedTile::new(tile(20, 'S'), pos(7, 10))];
        // CHATS: 3+4+1+1+1, (7,10) has no bonus, center no longer applies
        assert_eq!(score(&s, &board), 10);
    }

    #[test]
    fn test_joker_scores_zero() {
        let placed = vec![
            PlacedTile::new(Tile::joker(1).with_assigned_letter('Q'), pos(7, 7)),
            PlacedTile::new(tile(2, 'I'), pos(7, 8)),
        ];
        // joker on center: 0, I: 1, doubled
        assert_eq!(score(&placed, &Board::new()), 2);
    }

    #[test]
    fn test_score_word_order_invariant() {
        let placed = row_placements("KIWI", 0, 0);
        let board = Board::new().with_placed_tiles(&placed);
        let newly: HashSet<Position> = placed.iter().map(|p| p.position).collect();
        let word = FoundWord {
            text: "KIWI".into(),
            tiles: placed.iter().map(|p| (p.position, p.tile)).collect(),
            direction: Direction::Horizontal,
        };
        let mut reversed = word.clone();
        reversed.tiles.reverse();
        assert_eq!(
            score_word(&word, &board, &newly),
            score_word(&reversed, &board, &newly)
        );
    }

    #[test]
    fn test_all_tiles_bonus() {
        let placed = row_placements("ABCDEFG", 7, 1);
        let tentative = Board::new().with_placed_tiles(&placed);
        let words = find_all_words_for_move(&tentative, &placed);
        let newly: HashSet<Position> = placed.iter().map(|p| p.position).collect();
        let base: u32 = words.iter().map(|w| score_word(w, &tentative, &newly)).sum();
        assert_eq!(score_move(&words, &tentative, &newly), base + ALL_TILES_BONUS);
    }

    #[test]
    fn test_shared_bonus_counts_for_both_words() {
        // A at (7,7) center is shared by the horizontal and vertical words
        let placed = vec![PlacedTile::new(tile(1, 'A'), pos(7, 7))];
        let board = Board::new()
            .with_placed_tiles(&[
                PlacedTile::new(tile(2, 'L'), pos(7, 6)),
                PlacedTile::new(tile(3, 'L'), pos(6, 7)),
            ]);
        // LA: (1 + 1) * 2, LA down: (1 + 1) * 2
        assert_eq!(score(&placed, &board), 8);
    }
}
