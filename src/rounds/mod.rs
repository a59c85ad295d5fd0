//! Round state machine.
//!
//! A game alternates auction, stock and operating rounds. Each round type
//! implements [`Round`]; [`ActiveRound`] is the closed set the game holds
//! and forwards to. Company-entity actions bypass the active round and go
//! through the [`special`] overlay.
//!
//! ## Processing
//!
//! [`Round::process`] checks that the acting entity is the current one,
//! applies the action, lets the round do its turn bookkeeping, and finally
//! gives it a chance to skip entities that have nothing to do.

pub mod auction;
pub mod operating;
pub mod special;
pub mod stock;

use serde::Serialize;

use crate::core::{ActionKind, EngineResult, EntityId, GameError, PlayerId};
use crate::game::GameState;

pub use auction::AuctionRound;
pub use operating::{OperatingRound, Step};
pub use stock::StockRound;

/// Round type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum RoundKind {
    Auction,
    Stock,
    Operating,
}

/// Behavior shared by every round type.
pub trait Round {
    fn kind(&self) -> RoundKind;

    /// Entity whose turn it is, if the round is still running.
    fn current_entity(&self) -> Option<EntityId>;

    fn is_finished(&self, state: &GameState) -> bool;

    /// Validate and apply one action of the current entity.
    fn apply_action(&mut self, state: &mut GameState, entity: EntityId, action: &ActionKind) -> EngineResult<()>;

    /// Turn bookkeeping after an action was applied.
    fn on_action_applied(&mut self, _state: &mut GameState, _entity: EntityId, _action: &ActionKind) -> EngineResult<()> {
        Ok(())
    }

    /// Skip entities with nothing to do.
    fn try_advance_entity(&mut self, _state: &mut GameState) -> EngineResult<()> {
        Ok(())
    }

    /// Last player to take a non-pass action, for seat rotation.
    fn last_to_act(&self) -> Option<PlayerId> {
        None
    }

    /// Process an action of `entity`.
    fn process(&mut self, state: &mut GameState, entity: EntityId, action: &ActionKind) -> EngineResult<()> {
        let current = self.current_entity();
        if current != Some(entity) {
            return Err(GameError::OutOfTurn {
                entity: state.entity_name(entity).to_string(),
                current: current.map_or_else(|| "nobody".to_string(), |e| state.entity_name(e).to_string()),
            });
        }
        self.apply_action(state, entity, action)?;
        self.on_action_applied(state, entity, action)?;
        self.try_advance_entity(state)
    }
}

/// The round a game is in.
#[derive(Clone, Debug, Serialize)]
pub enum ActiveRound {
    Auction(AuctionRound),
    Stock(StockRound),
    Operating(OperatingRound),
}

impl ActiveRound {
    fn inner(&self) -> &dyn Round {
        match self {
            ActiveRound::Auction(r) => r,
            ActiveRound::Stock(r) => r,
            ActiveRound::Operating(r) => r,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Round {
        match self {
            ActiveRound::Auction(r) => r,
            ActiveRound::Stock(r) => r,
            ActiveRound::Operating(r) => r,
        }
    }

    /// Operating round number within the set; 0 outside operating rounds.
    #[must_use]
    pub fn round_num(&self) -> u8 {
        match self {
            ActiveRound::Operating(r) => r.round_num,
            _ => 0,
        }
    }
}

impl Round for ActiveRound {
    fn kind(&self) -> RoundKind {
        self.inner().kind()
    }

    fn current_entity(&self) -> Option<EntityId> {
        self.inner().current_entity()
    }

    fn is_finished(&self, state: &GameState) -> bool {
        self.inner().is_finished(state)
    }

    fn apply_action(&mut self, state: &mut GameState, entity: EntityId, action: &ActionKind) -> EngineResult<()> {
        self.inner_mut().apply_action(state, entity, action)
    }

    fn on_action_applied(&mut self, state: &mut GameState, entity: EntityId, action: &ActionKind) -> EngineResult<()> {
        self.inner_mut().on_action_applied(state, entity, action)
    }

    fn try_advance_entity(&mut self, state: &mut GameState) -> EngineResult<()> {
        self.inner_mut().try_advance_entity(state)
    }

    fn last_to_act(&self) -> Option<PlayerId> {
        self.inner().last_to_act()
    }
}

/// Error for an action type the round does not handle.
pub(crate) fn not_allowed(action: &ActionKind, round: RoundKind) -> GameError {
    GameError::illegal(format!("{} is not allowed in the {round:?} round", action.type_name()))
}
