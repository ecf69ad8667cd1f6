//! The move engine: validates a proposed placement and, if legal, produces the next
//! authoritative game state in one step. A rejected move leaves the input untouched.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::dictionary::Dictionary;
use super::placement::{check_geometry, is_connected, GeometryError};
use super::scoring::score_move;
use super::state::GameState;
use super::types::{GameStatus, PlacedTile, Position, Tile, TileId, RACK_SIZE};
use super::words::find_all_words_for_move;

/// Machine-readable rejection reason sent back to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionCode {
    EmptyMove,
    OccupiedCell,
    TileNotInRack,
    InvalidJoker,
    NotCollinear,
    GapInWord,
    NotConnected,
    InvalidWord,
    GameFinished,
    GameNotStarted,
}

impl RejectionCode {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectionCode::EmptyMove => "EMPTY_MOVE",
            RejectionCode::OccupiedCell => "OCCUPIED_CELL",
            RejectionCode::TileNotInRack => "TILE_NOT_IN_RACK",
            RejectionCode::InvalidJoker => "INVALID_JOKER",
            RejectionCode::NotCollinear => "NOT_COLLINEAR",
            RejectionCode::GapInWord => "GAP_IN_WORD",
            RejectionCode::NotConnected => "NOT_CONNECTED",
            RejectionCode::InvalidWord => "INVALID_WORD",
            RejectionCode::GameFinished => "GAME_FINISHED",
            RejectionCode::GameNotStarted => "GAME_NOT_STARTED",
        }
    }
}

impl fmt::Display for RejectionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveRejection {
    #[error("move places no tiles")]
    EmptyMove,
    #[error("cells already taken: {positions:?}")]
    OccupiedCell { positions: Vec<Position> },
    #[error("tiles not in the current rack: {tile_ids:?}")]
    TileNotInRack { tile_ids: Vec<TileId> },
    #[error("joker {tile_id} needs an assigned letter A-Z")]
    InvalidJoker { tile_id: TileId },
    #[error("placed tiles do not share a single row or column")]
    NotCollinear,
    #[error("placed tiles leave an empty cell inside the word")]
    GapInWord,
    #[error("move does not connect to the tiles on the board")]
    NotConnected,
    #[error("not valid words: {words:?}")]
    InvalidWord { words: Vec<String> },
    #[error("game is finished")]
    GameFinished,
    #[error("game has not started")]
    GameNotStarted,
}

impl MoveRejection {
    pub fn code(&self) -> RejectionCode {
        match self {
            MoveRejection::EmptyMove => RejectionCode::EmptyMove,
            MoveRejection::OccupiedCell { .. } => RejectionCode::OccupiedCell,
            MoveRejection::TileNotInRack { .. } => RejectionCode::TileNotInRack,
            MoveRejection::InvalidJoker { .. } => RejectionCode::InvalidJoker,
            MoveRejection::NotCollinear => RejectionCode::NotCollinear,
            MoveRejection::GapInWord => RejectionCode::GapInWord,
            MoveRejection::NotConnected => RejectionCode::NotConnected,
            MoveRejection::InvalidWord { .. } => RejectionCode::InvalidWord,
            MoveRejection::GameFinished => RejectionCode::GameFinished,
            MoveRejection::GameNotStarted => RejectionCode::GameNotStarted,
        }
    }
}

impl From<GeometryError> for MoveRejection {
    fn from(err: GeometryError) -> Self {
        match err {
            GeometryError::NotCollinear => MoveRejection::NotCollinear,
            GeometryError::GapInWord => MoveRejection::GapInWord,
        }
    }
}

/// Result of an accepted move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedMove {
    pub state: GameState,
    pub score: u32,
    pub words: Vec<String>,
    /// Replacement tiles actually drawn (fewer than played once the bag runs low).
    pub drawn: usize,
}

pub struct MoveEngine<'a> {
    dictionary: &'a Dictionary,
}

impl<'a> MoveEngine<'a> {
    pub fn new(dictionary: &'a Dictionary) -> Self {
        Self { dictionary }
    }

    /// Validate and apply a play for the current player.
    pub fn process_play_move(
        &self,
        state: &GameState,
        placements: &[PlacedTile],
    ) -> Result<CommittedMove, MoveRejection> {
        match state.status {
            GameStatus::Finished => return Err(MoveRejection::GameFinished),
            GameStatus::Waiting => return Err(MoveRejection::GameNotStarted),
            GameStatus::Playing => {}
        }
        let player = state
            .current_player()
            .ok_or(MoveRejection::GameNotStarted)?;

        if placements.is_empty() {
            return Err(MoveRejection::EmptyMove);
        }
        check_targets(state, placements)?;
        let resolved = resolve_from_rack(&player.rack, placements)?;
        let positions: Vec<Position> = resolved.iter().map(|p| p.position).collect();

        let tentative = state.board.with_placed_tiles(&resolved);
        let found = find_all_words_for_move(&tentative, &resolved);

        check_geometry(&state.board, &positions)?;
        if !is_connected(&state.board, &positions, state.turn_number) {
            return Err(MoveRejection::NotConnected);
        }
        let invalid: Vec<String> = found
            .iter()
            .filter(|w| !self.dictionary.is_valid(&w.text))
            .map(|w| w.text.clone())
            .collect();
        if found.is_empty() || !invalid.is_empty() {
            return Err(MoveRejection::InvalidWord { words: invalid });
        }

        let newly_placed: HashSet<Position> = positions.iter().copied().collect();
        let score = score_move(&found, &tentative, &newly_placed);

        let mut next = state.clone();
        next.board = tentative.lock_positions(positions.iter().copied());

        let played: HashSet<TileId> = resolved.iter().map(|p| p.tile.id).collect();
        let (bag, drawn) = std::mem::take(&mut next.bag).draw(resolved.len());
        next.bag = bag;
        let drawn_count = drawn.len();

        let mover = &mut next.players[state.current_player_index];
        mover.score += score;
        mover.rack.retain(|t| !played.contains(&t.id));
        mover.rack.extend(drawn);
        debug_assert!(mover.rack.len() <= RACK_SIZE);
        let mover_out = mover.rack.is_empty();
        mover.is_active = false;

        next.turn_number += 1;
        next.current_player_index = (state.current_player_index + 1) % next.players.len();
        if next.bag.is_empty() && mover_out {
            next.status = GameStatus::Finished;
        } else {
            next.players[next.current_player_index].is_active = true;
        }

        Ok(CommittedMove {
            state: next,
            score,
            words: found.into_iter().map(|w| w.text).collect(),
            drawn: drawn_count,
        })
    }
}

/// Reject targets that are already on the board or repeated within the move.
fn check_targets(state: &GameState, placements: &[PlacedTile]) -> Result<(), MoveRejection> {
    let mut seen = HashSet::with_capacity(placements.len());
    let taken: Vec<Position> = placements
        .iter()
        .map(|p| p.position)
        .filter(|&pos| state.board.is_occupied(pos) || !seen.insert(pos))
        .collect();
    if taken.is_empty() {
        Ok(())
    } else {
        Err(MoveRejection::OccupiedCell { positions: taken })
    }
}

/// Swap each requested tile for the rack's copy (matched by id) so letters and
/// points come from the authoritative rack. Only a joker's assigned letter is
/// taken from the request.
fn resolve_from_rack(
    rack: &[Tile],
    placements: &[PlacedTile],
) -> Result<Vec<PlacedTile>, MoveRejection> {
    let mut used = HashSet::with_capacity(placements.len());
    let mut missing = Vec::new();
    let mut resolved = Vec::with_capacity(placements.len());

    for placement in placements {
        let requested = placement.tile;
        let owned = rack.iter().find(|t| t.id == requested.id);
        match owned {
            Some(tile) if used.insert(tile.id) => {
                let tile = if tile.is_joker {
                    let letter = requested
                        .assigned_letter
                        .map(|c| c.to_ascii_uppercase())
                        .filter(char::is_ascii_uppercase)
                        .ok_or(MoveRejection::InvalidJoker { tile_id: tile.id })?;
                    tile.with_assigned_letter(letter)
                } else {
                    Tile {
                        assigned_letter: None,
                        ..*tile
                    }
                };
                resolved.push(PlacedTile::new(tile, placement.position));
            }
            _ => missing.push(requested.id),
        }
    }

    if missing.is_empty() {
        Ok(resolved)
    } else {
        Err(MoveRejection::TileNotInRack { tile_ids: missing })
    }
}
