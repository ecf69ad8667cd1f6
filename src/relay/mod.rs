//! Client-facing transport for the move engine.

pub mod protocol;
pub mod server;
pub mod view;

pub use protocol::{ClientMessage, ServerMessage};
pub use server::RelayServer;
pub use view::PlayerView;
