//! Authoritative game state and its lobby/bootstrap lifecycle.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::bag::TileBag;
use super::board::Board;
use super::types::{GameId, GameStatus, Player, PlayerId, RACK_SIZE};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LobbyError {
    #[error("game is full ({seats} seats)")]
    Full { seats: usize },
    #[error("game has already started")]
    AlreadyStarted,
    #[error("player name must not be empty")]
    EmptyName,
    #[error("player name {0:?} is already taken")]
    NameTaken(String),
    #[error("a game needs at least one player")]
    NoPlayers,
}

/// Full game state. Only the move engine produces a new state once play begins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub id: GameId,
    pub board: Board,
    pub players: Vec<Player>,
    pub bag: TileBag,
    pub turn_number: u32,
    pub current_player_index: usize,
    pub status: GameStatus,
    pub seats: usize,
}

impl GameState {
    /// A lobby with no players, an empty board and an empty bag (filled on `start`).
    pub fn waiting(id: impl Into<GameId>, seats: usize) -> Self {
        Self {
            id: id.into(),
            board: Board::new(),
            players: Vec::with_capacity(seats),
            bag: TileBag::default(),
            turn_number: 1,
            current_player_index: 0,
            status: GameStatus::Waiting,
            seats,
        }
    }

    /// Bootstrap a game that is ready to play: full shuffled bag, racks dealt.
    pub fn new_game<R: Rng + ?Sized>(
        id: impl Into<GameId>,
        names: &[&str],
        rng: &mut R,
    ) -> Result<Self, LobbyError> {
        let mut state = Self::waiting(id, names.len());
        for name in names {
            state.add_player(name)?;
        }
        state.start(rng)?;
        Ok(state)
    }

    pub fn add_player(&mut self, name: &str) -> Result<PlayerId, LobbyError> {
        if self.status != GameStatus::Waiting {
            return Err(LobbyError::AlreadyStarted);
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(LobbyError::EmptyName);
        }
        if self.is_full() {
            return Err(LobbyError::Full { seats: self.seats });
        }
        if self.players.iter().any(|p| p.name == name) {
            return Err(LobbyError::NameTaken(name.to_string()));
        }

        let id = format!("{}-p{}", self.id, self.players.len());
        self.players.push(Player::new(id.clone(), name));
        Ok(id)
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.seats
    }

    /// Shuffle a full bag, deal racks in seat order and hand the turn to seat 0.
    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), LobbyError> {
        if self.status != GameStatus::Waiting {
            return Err(LobbyError::AlreadyStarted);
        }
        if self.players.is_empty() {
            return Err(LobbyError::NoPlayers);
        }

        let mut bag = TileBag::shuffled(rng);
        for player in &mut self.players {
            let (rest, drawn) = bag.draw(RACK_SIZE);
            bag = rest;
            player.rack = drawn;
            player.is_active = false;
        }
        self.bag = bag;
        self.seats = self.players.len();
        self.turn_number = 1;
        self.current_player_index = 0;
        self.players[0].is_active = true;
        self.status = GameStatus::Playing;
        Ok(())
    }

    pub fn current_player(&self) -> Option<&Player> {
        match self.status {
            GameStatus::Playing => self.players.get(self.current_player_index),
            _ => None,
        }
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn bag_size(&self) -> usize {
        self.bag.len()
    }

    pub fn locked_tile_count(&self) -> usize {
        self.board.locked_count()
    }

    /// Bag + racks + locked board tiles. Always the full set once the game started.
    pub fn tiles_in_play(&self) -> usize {
        self.bag.len()
            + self.players.iter().map(|p| p.rack.len()).sum::<usize>()
            + self.locked_tile_count()
    }
}
