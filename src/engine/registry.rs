//! In-memory table of live games.
//!
//! Each game sits behind its own mutex, so moves on different games never contend
//! and moves on the same game are applied one at a time in arrival order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use super::dictionary::Dictionary;
use super::moves::{CommittedMove, MoveEngine, MoveRejection};
use super::state::{GameState, LobbyError};
use super::types::{GameId, GameStatus, PlacedTile, PlayerId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("unknown game: {0}")]
    UnknownGame(GameId),
    #[error("unknown player {player_id} in game {game_id}")]
    UnknownPlayer { game_id: GameId, player_id: PlayerId },
    #[error("it is not {0}'s turn")]
    NotYourTurn(PlayerId),
    #[error("seat count must be between 1 and {max}, got {requested}")]
    InvalidSeats { requested: usize, max: usize },
    #[error(transparent)]
    Lobby(#[from] LobbyError),
    #[error(transparent)]
    Rejected(#[from] MoveRejection),
}

impl RegistryError {
    /// Stable code reported to clients.
    pub fn code(&self) -> &'static str {
        match self {
            RegistryError::UnknownGame(_) => "UNKNOWN_GAME",
            RegistryError::UnknownPlayer { .. } => "UNKNOWN_PLAYER",
            RegistryError::NotYourTurn(_) => "NOT_YOUR_TURN",
            RegistryError::InvalidSeats { .. } => "INVALID_SEATS",
            RegistryError::Lobby(LobbyError::Full { .. }) => "GAME_FULL",
            RegistryError::Lobby(LobbyError::AlreadyStarted) => "ALREADY_STARTED",
            RegistryError::Lobby(LobbyError::EmptyName) => "EMPTY_NAME",
            RegistryError::Lobby(LobbyError::NameTaken(_)) => "NAME_TAKEN",
            RegistryError::Lobby(LobbyError::NoPlayers) => "NO_PLAYERS",
            RegistryError::Rejected(rejection) => rejection.code().as_str(),
        }
    }
}

/// A freshly created game and the host's seat.
#[derive(Debug, Clone)]
pub struct CreatedGame {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub state: GameState,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct GameRegistry {
    dictionary: Arc<Dictionary>,
    max_players: usize,
    rng: Mutex<StdRng>,
    games: RwLock<HashMap<GameId, Arc<Mutex<GameState>>>>,
}

impl GameRegistry {
    /// A fixed `seed` makes game ids and bag shuffles reproducible.
    pub fn new(dictionary: Arc<Dictionary>, max_players: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            dictionary,
            max_players: max_players.max(1),
            rng: Mutex::new(rng),
            games: RwLock::new(HashMap::new()),
        }
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn max_players(&self) -> usize {
        self.max_players
    }

    /// Open a lobby with `host` in seat 0. A single-seat game starts immediately.
    pub fn create_game(&self, host: &str, seats: usize) -> Result<CreatedGame, RegistryError> {
        if seats == 0 || seats > self.max_players {
            return Err(RegistryError::InvalidSeats {
                requested: seats,
                max: self.max_players,
            });
        }

        let mut games = self.games.write().unwrap_or_else(PoisonError::into_inner);
        let mut rng = lock(&self.rng);
        let game_id = loop {
            let candidate = format!("{:08x}", rng.gen::<u32>());
            if !games.contains_key(&candidate) {
                break candidate;
            }
        };

        let mut state = GameState::waiting(game_id.clone(), seats);
        let player_id = state.add_player(host)?;
        if state.is_full() {
            state.start(&mut *rng)?;
        }
        games.insert(game_id.clone(), Arc::new(Mutex::new(state.clone())));

        tracing::info!(game = %game_id, host = %host, seats, "game created");
        Ok(CreatedGame {
            game_id,
            player_id,
            state,
        })
    }

    /// Take the next free seat. The game starts as soon as the last seat fills.
    pub fn join(&self, game_id: &str, name: &str) -> Result<(PlayerId, GameState), RegistryError> {
        let game = self.game(game_id)?;
        let mut state = lock(&game);
        let player_id = state.add_player(name)?;
        if state.is_full() {
            state.start(&mut *lock(&self.rng))?;
            tracing::info!(game = %game_id, players = state.players.len(), "game started");
        }
        tracing::info!(game = %game_id, player = %player_id, "player joined");
        Ok((player_id, state.clone()))
    }

    /// Validate and commit a play for `player_id`. The stored state is replaced only
    /// when the move is accepted.
    pub fn play_move(
        &self,
        game_id: &str,
        player_id: &str,
        placements: &[PlacedTile],
    ) -> Result<CommittedMove, RegistryError> {
        let game = self.game(game_id)?;
        let mut state = lock(&game);

        if state.player(player_id).is_none() {
            return Err(RegistryError::UnknownPlayer {
                game_id: game_id.to_string(),
                player_id: player_id.to_string(),
            });
        }
        if let Some(current) = state.current_player() {
            if current.id != player_id {
                return Err(RegistryError::NotYourTurn(player_id.to_string()));
            }
        }

        let committed = match MoveEngine::new(&self.dictionary).process_play_move(&state, placements)
        {
            Ok(committed) => committed,
            Err(rejection) => {
                tracing::debug!(
                    game = %game_id,
                    player = %player_id,
                    code = %rejection.code(),
                    "move rejected: {rejection}"
                );
                return Err(rejection.into());
            }
        };

        *state = committed.state.clone();
        tracing::info!(
            game = %game_id,
            player = %player_id,
            score = committed.score,
            words = ?committed.words,
            turn = state.turn_number,
            "move committed"
        );
        if state.status == GameStatus::Finished {
            tracing::info!(game = %game_id, "game finished");
        }
        Ok(committed)
    }

    pub fn snapshot(&self, game_id: &str) -> Result<GameState, RegistryError> {
        let game = self.game(game_id)?;
        let state = lock(&game).clone();
        Ok(state)
    }

    pub fn game_ids(&self) -> Vec<GameId> {
        let games = self.games.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<GameId> = games.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.games
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn remove(&self, game_id: &str) -> Option<GameState> {
        let removed = self
            .games
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(game_id)?;
        let state = lock(&removed).clone();
        tracing::info!(game = %game_id, "game removed");
        Some(state)
    }

    fn game(&self, game_id: &str) -> Result<Arc<Mutex<GameState>>, RegistryError> {
        self.games
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(game_id)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownGame(game_id.to_string()))
    }
}
