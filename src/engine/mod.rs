pub mod types;
pub mod tiles;
pub mod bag;
pub mod board;
pub mod words;
pub mod placement;
pub mod dictionary;
pub mod scoring;
pub mod state;
pub mod moves;
pub mod registry;

pub use dictionary::Dictionary;
pub use moves::{CommittedMove, MoveEngine, MoveRejection, RejectionCode};
pub use registry::{GameRegistry, RegistryError};
pub use state::GameState;
