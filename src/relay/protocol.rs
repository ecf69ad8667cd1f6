//! Wire messages for the relay: one JSON object per line, tagged by `type`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::types::{GameId, PlacedTile, PlayerId};

use super::view::PlayerView;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}

fn default_seats() -> usize {
    2
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    CreateGame {
        player_name: String,
        #[serde(default = "default_seats")]
        seats: usize,
    },
    Join {
        game_id: GameId,
        player_name: String,
    },
    PlayMove {
        placements: Vec<PlacedTile>,
    },
    GetState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    GameCreated {
        game_id: GameId,
        player_id: PlayerId,
    },
    Joined {
        game_id: GameId,
        player_id: PlayerId,
    },
    State {
        view: PlayerView,
    },
    MoveAccepted {
        player_id: PlayerId,
        score: u32,
        words: Vec<String>,
    },
    MoveRejected {
        code: String,
        message: String,
    },
    Error {
        message: String,
    },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }
}

pub fn decode_client(line: &str) -> Result<ClientMessage, ProtocolError> {
    Ok(serde_json::from_str(line.trim())?)
}

/// Encode one message as a single line, without the trailing newline.
pub fn encode_server(message: &ServerMessage) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(message)?)
}
