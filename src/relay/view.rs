//! Per-player projection of the authoritative state.
//!
//! Racks of other players and the bag contents never leave the server.

use serde::{Deserialize, Serialize};

use crate::engine::board::Board;
use crate::engine::state::GameState;
use crate::engine::types::{GameId, GameStatus, PlayerId, Tile};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub name: String,
    pub score: u32,
    pub rack_size: usize,
    /// Only filled for the viewer.
    pub rack: Vec<Tile>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub game_id: GameId,
    pub viewer: Option<PlayerId>,
    pub board: Board,
    pub players: Vec<PlayerSummary>,
    pub bag_size: usize,
    pub turn_number: u32,
    pub current_player_index: usize,
    pub status: GameStatus,
    pub seats: usize,
}

impl PlayerView {
    /// `viewer == None` gives a spectator view with every rack hidden.
    pub fn project(state: &GameState, viewer: Option<&str>) -> Self {
        let players = state
            .players
            .iter()
            .map(|p| PlayerSummary {
                id: p.id.clone(),
                name: p.name.clone(),
                score: p.score,
                rack_size: p.rack.len(),
                rack: if viewer == Some(p.id.as_str()) {
                    p.rack.clone()
                } else {
                    Vec::new()
                },
                is_active: p.is_active,
            })
            .collect();

        Self {
            game_id: state.id.clone(),
            viewer: viewer.map(str::to_string),
            board: state.board.clone(),
            players,
            bag_size: state.bag_size(),
            turn_number: state.turn_number,
            current_player_index: state.current_player_index,
            status: state.status,
            seats: state.seats,
        }
    }

    pub fn own_rack(&self) -> &[Tile] {
        self.players
            .iter()
            .find(|p| Some(&p.id) == self.viewer.as_ref())
            .map(|p| p.rack.as_slice())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn started() -> GameState {
        let mut rng = StdRng::seed_from_u64(11);
        GameState::new_game("v", &["ana", "bob"], &mut rng).unwrap()
    }

    #[test]
    fn test_viewer_sees_only_own_rack() {
        let state = started();
        let view = PlayerView::project(&state, Some("v-p1"));
        assert!(view.players[0].rack.is_empty());
        assert_eq!(view.players[0].rack_size, 7);
        assert_eq!(view.players[1].rack, state.players[1].rack);
        assert_eq!(view.own_rack(), state.players[1].rack.as_slice());
        assert_eq!(view.bag_size, 86);
    }

    #[test]
    fn test_spectator_sees_no_rack() {
        let view = PlayerView::project(&started(), None);
        assert!(view.players.iter().all(|p| p.rack.is_empty()));
        assert!(view.own_rack().is_empty());
    }

    #[test]
    fn test_view_json_has_no_bag() {
        let json = serde_json::to_value(PlayerView::project(&started(), None)).unwrap();
        assert!(json.get("bag").is_none());
        assert_eq!(json["bag_size"], 86);
        assert_eq!(json["status"], "playing");
    }
}
