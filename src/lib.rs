//! ROWCRUSH - a falling-block puzzle core
//!
//! The game state lives in [`game::Game`]; callers feed it [`input::Command`]s
//! and call [`game::Game::update`] once per frame with a monotonic
//! millisecond timestamp.

pub mod clock;
pub mod game;
pub mod grid;
pub mod input;
pub mod keys;
pub mod piece;
pub mod score;
pub mod settings;
pub mod tetromino;
pub mod ui;

pub use game::{Game, GameConfig, GameState, LockEvent, Snapshot};
pub use input::{Command, HeldKey};
pub use settings::Settings;
