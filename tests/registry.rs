//! Registry behavior: lobby flow, turn order and concurrent access.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use wordplay_engine::engine::state::LobbyError;
use wordplay_engine::engine::types::{GameStatus, PlacedTile, Position, Tile};
use wordplay_engine::engine::{Dictionary, GameRegistry, RegistryError};

fn registry(seed: u64, words: &[&str]) -> GameRegistry {
    GameRegistry::new(Arc::new(Dictionary::from_words(words)), 4, Some(seed))
}

/// Two tiles from a rack laid across the center, plus the word they spell.
fn opening_from(rack: &[Tile]) -> (Vec<PlacedTile>, String) {
    let placements: Vec<PlacedTile> = rack[..2]
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let tile = if t.is_joker {
                t.with_assigned_letter('E')
            } else {
                *t
            };
            PlacedTile::new(tile, Position::new(7, 7 + i).unwrap())
        })
        .collect();
    let word = placements.iter().map(|p| p.tile.resolved_letter()).collect();
    (placements, word)
}

/// Run the same seeded setup twice: once to learn the host's rack, once with a
/// dictionary that accepts the opening word.
fn two_player_game(seed: u64) -> (GameRegistry, String, String, String, Vec<PlacedTile>) {
    let rehearsal = registry(seed, &["x"]);
    let created = rehearsal.create_game("ana", 2).unwrap();
    let (_, state) = rehearsal.join(&created.game_id, "bob").unwrap();
    let (placements, word) = opening_from(&state.players[0].rack);

    let registry = registry(seed, &[word.as_str()]);
    let created = registry.create_game("ana", 2).unwrap();
    let (bob, state) = registry.join(&created.game_id, "bob").unwrap();
    assert_eq!(opening_from(&state.players[0].rack).0, placements);
    (registry, created.game_id, created.player_id, bob, placements)
}

#[test]
fn test_turns_alternate() {
    let (registry, game_id, ana, bob, opening) = two_player_game(21);

    assert_eq!(
        registry.play_move(&game_id, &bob, &opening),
        Err(RegistryError::NotYourTurn(bob.clone()))
    );

    let committed = registry.play_move(&game_id, &ana, &opening).unwrap();
    assert_eq!(committed.words.len(), 1);
    let state = registry.snapshot(&game_id).unwrap();
    assert_eq!(state.turn_number, 2);
    assert_eq!(state.current_player().map(|p| p.id.as_str()), Some(bob.as_str()));

    assert_eq!(
        registry.play_move(&game_id, &ana, &opening),
        Err(RegistryError::NotYourTurn(ana.clone()))
    );

    // a rejected move keeps the turn with the same player
    let err = registry.play_move(&game_id, &bob, &[]).unwrap_err();
    assert_eq!(err.code(), "EMPTY_MOVE");
    let state = registry.snapshot(&game_id).unwrap();
    assert_eq!(state.current_player().map(|p| p.id.as_str()), Some(bob.as_str()));
}

#[test]
fn test_lobby_flow() {
    let registry = registry(5, &["chat"]);
    let created = registry.create_game("ana", 3).unwrap();
    let game_id = created.game_id;

    assert_eq!(
        registry.join(&game_id, "ana"),
        Err(RegistryError::Lobby(LobbyError::NameTaken("ana".into())))
    );
    let (_, state) = registry.join(&game_id, "bob").unwrap();
    assert_eq!(state.status, GameStatus::Waiting);
    assert!(state.players.iter().all(|p| p.rack.is_empty()));

    let (_, state) = registry.join(&game_id, "cy").unwrap();
    assert_eq!(state.status, GameStatus::Playing);
    assert_eq!(state.tiles_in_play(), 100);

    let err = registry.join(&game_id, "dee").unwrap_err();
    assert_eq!(err.code(), "ALREADY_STARTED");
    assert_eq!(
        registry.join("ffffffff", "dee").unwrap_err().code(),
        "UNKNOWN_GAME"
    );
}

#[test]
fn test_concurrent_creates_get_unique_ids() {
    let registry = Arc::new(registry(9, &["chat"]));
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                (0..10)
                    .map(|i| {
                        registry
                            .create_game(&format!("host{t}-{i}"), 1)
                            .unwrap()
                            .game_id
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(ids.insert(id));
        }
    }
    assert_eq!(ids.len(), 80);
    assert_eq!(registry.len(), 80);
}

#[test]
fn test_racing_moves_commit_once() {
    let rehearsal = registry(33, &["x"]);
    let created = rehearsal.create_game("ana", 1).unwrap();
    let (opening, word) = opening_from(&created.state.players[0].rack);

    let registry = Arc::new(registry(33, &[word.as_str()]));
    let created = registry.create_game("ana", 1).unwrap();
    let game_id = created.game_id;
    let player_id = created.player_id;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let (game_id, player_id, opening) =
                (game_id.clone(), player_id.clone(), opening.clone());
            thread::spawn(move || registry.play_move(&game_id, &player_id, &opening))
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(err.code(), "OCCUPIED_CELL");
    }

    let state = registry.snapshot(&game_id).unwrap();
    assert_eq!(state.turn_number, 2);
    assert_eq!(state.locked_tile_count(), 2);
    assert_eq!(state.tiles_in_play(), 100);
}
