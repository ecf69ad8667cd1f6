//! Word discovery: every contiguous line of two or more tiles that passes through a
//! newly placed tile.

use super::board::Board;
use super::types::{Direction, FoundWord, PlacedTile, Position};

/// Walk from `start` while the next cell in the given direction holds a tile.
fn extent(board: &Board, start: Position, direction: Direction, forward: bool) -> Position {
    let mut end = start;
    while let Some(next) = end.step(direction, forward) {
        if !board.is_occupied(next) {
            break;
        }
        end = next;
    }
    end
}

/// The word running through `start` along `direction`, if it is at least two letters.
pub fn find_word_in_line(board: &Board, start: Position, direction: Direction) -> Option<FoundWord> {
    if !board.is_occupied(start) {
        return None;
    }

    let first = extent(board, start, direction, false);
    let last = extent(board, start, direction, true);
    if first == last {
        return None;
    }

    let fixed = first.across(direction);
    let mut text = String::new();
    let mut tiles = Vec::with_capacity(last.along(direction) - first.along(direction) + 1);
    for index in first.along(direction)..=last.along(direction) {
        let pos = Position::on_line(direction, fixed, index)?;
        let tile = board.get_tile(pos)?;
        text.push(tile.resolved_letter());
        tiles.push((pos, tile));
    }

    Some(FoundWord {
        text,
        tiles,
        direction,
    })
}

/// All distinct words formed by a move. `board` must already hold the placed tiles.
pub fn find_all_words_for_move(board: &Board, placed: &[PlacedTile]) -> Vec<FoundWord> {
    let mut words: Vec<FoundWord> = Vec::new();
    for placement in placed {
        for direction in Direction::ALL {
            if let Some(word) = find_word_in_line(board, placement.position, direction) {
                if !words.contains(&word) {
                    words.push(word);
                }
            }
        }
    }
    words
}
