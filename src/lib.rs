//! # rust-18xx
//!
//! An action-sourced rules engine for 18xx railway board games.
//!
//! ## Design Principles
//!
//! 1. **Actions Are the Truth**: A game is its ordered action list. State,
//!    the active round and the narrative log are derived by replaying it.
//!
//! 2. **Title-Agnostic Core**: No hardcoded map, market or roster. Titles
//!    configure the engine through `GameConfig` (see `games::g1889`).
//!
//! 3. **Transactional Processing**: An action is applied to a copy of the
//!    state and committed only if every rule check passes.
//!
//! ## Architecture
//!
//! - **Rounds**: Auction, stock and operating rounds implement the
//!   `Round` trait; company abilities act through a special overlay.
//!
//! - **Persistent Data Structures**: The action list and the narrative log
//!   use `im-rs`, so cloning a game for a transaction or a replay is cheap.
//!
//! ## Modules
//!
//! - `core`: Entity ids, players, actions, configuration, errors, log
//! - `tiles`: Tile mini-language, parts, tiles and the tile catalog
//! - `board`: Hex grid, adjacency, tokens and reachability
//! - `ledger`: Shares, corporations, companies, stock market and bank
//! - `trains`: Trains and the depot
//! - `phase`: Phases and the phase controller
//! - `rounds`: Round state machine
//! - `game`: Game state and the `Game` orchestrator
//! - `games`: Title data

pub mod core;
pub mod tiles;
pub mod board;
pub mod ledger;
pub mod trains;
pub mod phase;
pub mod rounds;
pub mod game;
pub mod games;

// Re-export commonly used types
pub use crate::core::{
    Action, ActionKind, DividendKind, Route,
    EntityId, EntityType, PlayerId, CorporationId, CompanyId,
    EngineResult, GameError,
    GameConfig, Mode, RuleOptions, GameLog,
};

pub use crate::tiles::{Tile, TileColor};

pub use crate::board::{Board, Hex, HexSpec, Layout};

pub use crate::ledger::{
    Company, Corporation, Share, ShareOwner, SharePrice, StockMarket,
};

pub use crate::trains::{Depot, Train, TrainSpec};

pub use crate::phase::{Phase, PhaseController};

pub use crate::rounds::{ActiveRound, Round, RoundKind, Step};

pub use crate::game::{Game, GameBuilder, GameState};
