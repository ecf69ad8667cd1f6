//! TCP relay: newline-delimited JSON sessions on top of the game registry.
//!
//! Each connection holds at most one seat. Registry calls run on the blocking pool
//! and the resulting state is published after the game lock is released; every
//! seated connection then sends its own projection of that state. A state that is
//! not newer than the last one sent for its game is dropped, so late publishes never
//! overwrite a later commit. When the last seated connection of a game closes, the
//! game and its channel are freed.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::engine::registry::{GameRegistry, RegistryError};
use crate::engine::state::GameState;
use crate::engine::types::{GameId, GameStatus, PlacedTile, PlayerId};

use super::protocol::{decode_client, encode_server, ClientMessage, ServerMessage};
use super::view::PlayerView;

const UPDATE_BUFFER: usize = 64;

type StateUpdates = broadcast::Receiver<Arc<GameState>>;

type Channels = HashMap<GameId, GameChannel>;

/// Orders states of one game: status first, then turn, then seats taken.
type Progress = (u8, u32, usize);

fn progress(state: &GameState) -> Progress {
    let status = match state.status {
        GameStatus::Waiting => 0,
        GameStatus::Playing => 1,
        GameStatus::Finished => 2,
    };
    (status, state.turn_number, state.players.len())
}

struct GameChannel {
    tx: broadcast::Sender<Arc<GameState>>,
    /// Progress of the newest state sent on `tx`.
    last: Option<Progress>,
}

impl GameChannel {
    fn new() -> Self {
        Self {
            tx: broadcast::channel(UPDATE_BUFFER).0,
            last: None,
        }
    }
}

fn lock_channels(channels: &Mutex<Channels>) -> MutexGuard<'_, Channels> {
    channels.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone)]
struct Seat {
    game_id: GameId,
    player_id: PlayerId,
}

/// Per-connection state.
#[derive(Default)]
struct Session {
    seat: Option<Seat>,
    updates: Option<StateUpdates>,
}

impl Session {
    fn viewer(&self) -> Option<&str> {
        self.seat.as_ref().map(|s| s.player_id.as_str())
    }
}

pub struct RelayServer {
    registry: Arc<GameRegistry>,
    channels: Arc<Mutex<Channels>>,
}

impl RelayServer {
    pub fn new(registry: Arc<GameRegistry>) -> Self {
        Self {
            registry,
            channels: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn registry(&self) -> &Arc<GameRegistry> {
        &self.registry
    }

    /// Accept connections until the listener fails.
    pub async fn serve(self: Arc<Self>, listener: TcpListener) -> std::io::Result<()> {
        loop {
            let (stream, addr) = listener.accept().await?;
            let server = Arc::clone(&self);
            tokio::spawn(async move {
                tracing::info!(%addr, "connection opened");
                match server.handle_connection(stream).await {
                    Ok(()) => tracing::info!(%addr, "connection closed"),
                    Err(e) => tracing::warn!(%addr, error = %e, "connection failed"),
                }
            });
        }
    }

    pub async fn handle_connection(&self, stream: TcpStream) -> std::io::Result<()> {
        let mut session = Session::default();
        let result = self.run_session(stream, &mut session).await;
        self.release(session).await;
        result
    }

    async fn run_session(&self, stream: TcpStream, session: &mut Session) -> std::io::Result<()> {
        let peer: Option<SocketAddr> = stream.peer_addr().ok();
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if line.trim().is_empty() {
                        continue;
                    }
                    for reply in self.handle_line(&line, session).await {
                        send(&mut writer, &reply).await?;
                    }
                }
                update = next_update(&mut session.updates) => {
                    match update {
                        Ok(state) => {
                            let view = PlayerView::project(&state, session.viewer());
                            send(&mut writer, &ServerMessage::State { view }).await?;
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(peer = ?peer, skipped, "state updates lagged, resending snapshot");
                            if let Some(seat) = &session.seat {
                                let reply = self.current_view(Some(seat)).await;
                                send(&mut writer, &reply).await?;
                            }
                        }
                        Err(RecvError::Closed) => session.updates = None,
                    }
                }
            }
        }
        Ok(())
    }

    async fn handle_line(&self, line: &str, session: &mut Session) -> Vec<ServerMessage> {
        let message = match decode_client(line) {
            Ok(message) => message,
            Err(e) => return vec![ServerMessage::error(e.to_string())],
        };

        match message {
            ClientMessage::CreateGame { player_name, seats } => {
                self.create_game(session, player_name, seats).await
            }
            ClientMessage::Join {
                game_id,
                player_name,
            } => self.join(session, game_id, player_name).await,
            ClientMessage::PlayMove { placements } => self.play_move(session, placements).await,
            ClientMessage::GetState => vec![self.current_view(session.seat.as_ref()).await],
        }
    }

    /// Fresh projection of the seated game, read on the blocking pool.
    async fn current_view(&self, seat: Option<&Seat>) -> ServerMessage {
        let Some(seat) = seat else {
            return ServerMessage::error("not seated in a game");
        };
        let registry = Arc::clone(&self.registry);
        let game_id = seat.game_id.clone();
        match tokio::task::spawn_blocking(move || registry.snapshot(&game_id)).await {
            Ok(Ok(state)) => ServerMessage::State {
                view: PlayerView::project(&state, Some(seat.player_id.as_str())),
            },
            Ok(Err(e)) => ServerMessage::error(e.to_string()),
            Err(e) => ServerMessage::error(format!("engine task failed: {e}")),
        }
    }

    async fn create_game(
        &self,
        session: &mut Session,
        player_name: String,
        seats: usize,
    ) -> Vec<ServerMessage> {
        if session.seat.is_some() {
            return vec![ServerMessage::error("already seated in a game")];
        }
        let registry = Arc::clone(&self.registry);
        let created = tokio::task::spawn_blocking(move || registry.create_game(&player_name, seats))
            .await;
        match created {
            Ok(Ok(created)) => {
                session.updates = Some(self.subscribe(&created.game_id));
                session.seat = Some(Seat {
                    game_id: created.game_id.clone(),
                    player_id: created.player_id.clone(),
                });
                let view = PlayerView::project(&created.state, session.viewer());
                vec![
                    ServerMessage::GameCreated {
                        game_id: created.game_id,
                        player_id: created.player_id,
                    },
                    ServerMessage::State { view },
                ]
            }
            Ok(Err(e)) => vec![registry_error(e)],
            Err(e) => vec![ServerMessage::error(format!("engine task failed: {e}"))],
        }
    }

    async fn join(
        &self,
        session: &mut Session,
        game_id: GameId,
        player_name: String,
    ) -> Vec<ServerMessage> {
        if session.seat.is_some() {
            return vec![ServerMessage::error("already seated in a game")];
        }
        // Subscribe first so the published join is delivered to this connection too.
        let updates = self.subscribe(&game_id);
        let registry = Arc::clone(&self.registry);
        let id = game_id.clone();
        let joined = tokio::task::spawn_blocking(move || registry.join(&id, &player_name)).await;
        match joined {
            Ok(Ok((player_id, state))) => {
                session.updates = Some(updates);
                session.seat = Some(Seat {
                    game_id: game_id.clone(),
                    player_id: player_id.clone(),
                });
                self.publish(state);
                vec![ServerMessage::Joined { game_id, player_id }]
            }
            Ok(Err(e)) => {
                drop(updates);
                if matches!(e, RegistryError::UnknownGame(_)) {
                    self.drop_channel(&game_id);
                }
                vec![registry_error(e)]
            }
            Err(e) => vec![ServerMessage::error(format!("engine task failed: {e}"))],
        }
    }

    async fn play_move(
        &self,
        session: &mut Session,
        placements: Vec<PlacedTile>,
    ) -> Vec<ServerMessage> {
        let Some(seat) = session.seat.clone() else {
            return vec![ServerMessage::error("not seated in a game")];
        };
        let registry = Arc::clone(&self.registry);
        let player_id = seat.player_id.clone();
        let played = tokio::task::spawn_blocking(move || {
            registry.play_move(&seat.game_id, &seat.player_id, &placements)
        })
        .await;
        match played {
            Ok(Ok(committed)) => {
                let accepted = ServerMessage::MoveAccepted {
                    player_id,
                    score: committed.score,
                    words: committed.words,
                };
                self.publish(committed.state);
                vec![accepted]
            }
            Ok(Err(e)) => vec![registry_error(e)],
            Err(e) => vec![ServerMessage::error(format!("engine task failed: {e}"))],
        }
    }

    fn subscribe(&self, game_id: &str) -> StateUpdates {
        lock_channels(&self.channels)
            .entry(game_id.to_string())
            .or_insert_with(GameChannel::new)
            .tx
            .subscribe()
    }

    fn drop_channel(&self, game_id: &str) {
        let mut channels = lock_channels(&self.channels);
        if channels
            .get(game_id)
            .map_or(false, |c| c.tx.receiver_count() == 0)
        {
            channels.remove(game_id);
        }
    }

    /// Fan a committed state out to every connection seated in that game.
    fn publish(&self, state: GameState) {
        let mut channels = lock_channels(&self.channels);
        let Some(channel) = channels.get_mut(&state.id) else {
            return;
        };
        let next = progress(&state);
        if channel.last.map_or(false, |last| next <= last) {
            tracing::debug!(game = %state.id, turn = state.turn_number, "dropped stale state");
            return;
        }
        channel.last = Some(next);
        let game_id = state.id.clone();
        // No receivers is fine: everyone may have disconnected.
        let receivers = channel.tx.send(Arc::new(state)).unwrap_or(0);
        tracing::debug!(game = %game_id, receivers, "published state");
    }

    /// End a session. The last connection to leave a game frees the game and its channel.
    async fn release(&self, session: Session) {
        let Session { seat, updates } = session;
        drop(updates);
        let Some(seat) = seat else {
            return;
        };
        let channels = Arc::clone(&self.channels);
        let registry = Arc::clone(&self.registry);
        let released = tokio::task::spawn_blocking(move || {
            // Joins subscribe under this lock: no seat is taken between check and removal.
            let mut channels = lock_channels(&channels);
            let idle = channels
                .get(&seat.game_id)
                .map_or(true, |c| c.tx.receiver_count() == 0);
            if idle {
                channels.remove(&seat.game_id);
                registry.remove(&seat.game_id);
            }
        })
        .await;
        if let Err(e) = released {
            tracing::error!(error = %e, "failed to release session");
        }
    }
}

async fn next_update(updates: &mut Option<StateUpdates>) -> Result<Arc<GameState>, RecvError> {
    match updates {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

fn registry_error(err: RegistryError) -> ServerMessage {
    match err {
        RegistryError::UnknownGame(_) | RegistryError::Lobby(_) | RegistryError::InvalidSeats { .. } => {
            ServerMessage::error(err.to_string())
        }
        _ => ServerMessage::MoveRejected {
            code: err.code().to_string(),
            message: err.to_string(),
        },
    }
}

async fn send<W>(writer: &mut W, message: &ServerMessage) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    match encode_server(message) {
        Ok(mut line) => {
            line.push('\n');
            writer.write_all(line.as_bytes()).await
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to encode server message");
            Ok(())
        }
    }
}
