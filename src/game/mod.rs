//! Game orchestration: the mutable state and the `Game` that drives it
//! through rounds by processing actions.

pub mod game;
pub mod state;

pub use game::{Game, GameBuilder};
pub use state::GameState;
