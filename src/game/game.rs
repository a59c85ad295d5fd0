//! The `Game` orchestrator.
//!
//! ## Action sourcing
//!
//! The ordered action list is the only source of truth. Every other view
//! (state, active round, narrative log) is derived by replaying it from
//! the static setup. [`Game::snapshot`] encodes the derived state, but a
//! snapshot is a cache: equal action lists always give equal bytes.
//!
//! ## Transactions
//!
//! [`Game::process_action`] works on a copy of the state and active round
//! and commits only when the action is accepted. A rejected action leaves
//! the game exactly as it was. State uses persistent collections where it
//! is large, so the copy is cheap.

use std::sync::Arc;

use im::Vector;
use serde_json::Value;

use crate::board::Hex;
use crate::core::{Action, ActionKind, EngineResult, EntityId, GameConfig, GameError, GameLog, Mode, Player};
use crate::ledger::{Company, Corporation, Share, SharePrice};
use crate::rounds::{special, ActiveRound, AuctionRound, OperatingRound, Round, RoundKind, StockRound};
use crate::tiles::{City, Tile};
use crate::trains::Train;

use super::GameState;

/// Round transitions in a row without an action before the game is
/// considered stuck.
const MAX_IDLE_TRANSITIONS: usize = 32;

/// Builder for [`Game`].
///
/// # Example
///
/// ```
/// use rust_18xx::games::g1889;
/// use rust_18xx::GameBuilder;
///
/// let game = GameBuilder::new(g1889::config())
///     .players(["Alice", "Bob", "Carol"])
///     .build()
///     .unwrap();
/// assert_eq!(game.state().player_count(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct GameBuilder {
    config: Arc<GameConfig>,
    players: Vec<String>,
    mode: Mode,
    actions: Vec<Action>,
}

impl GameBuilder {
    pub fn new(config: impl Into<Arc<GameConfig>>) -> Self {
        Self {
            config: config.into(),
            players: Vec::new(),
            mode: Mode::default(),
            actions: Vec::new(),
        }
    }

    /// Player names in seat order.
    #[must_use]
    pub fn players<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.players = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Actions to replay after setup.
    #[must_use]
    pub fn actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.actions = actions.into_iter().collect();
        self
    }

    /// Set up the game and replay the actions.
    ///
    /// A replayed action that fails is reported as [`GameError::Replay`]
    /// with its position in the list.
    pub fn build(self) -> EngineResult<Game> {
        let mut game = Game::new(self.config, self.players, self.mode)?;
        for (index, action) in self.actions.into_iter().enumerate() {
            game.process_action(action).map_err(|e| GameError::Replay {
                index,
                source: Box::new(e),
            })?;
        }
        Ok(game)
    }
}

/// A game in progress.
#[derive(Clone, Debug)]
pub struct Game {
    config: Arc<GameConfig>,
    names: Vec<String>,
    mode: Mode,
    state: GameState,
    round: ActiveRound,
    actions: Vector<Action>,
}

impl Game {
    fn new(config: Arc<GameConfig>, names: Vec<String>, mode: Mode) -> EngineResult<Self> {
        let mut state = GameState::new(&config, &names)?;
        let mut round = if state.all_companies_owned() {
            start_stock(&mut state)?
        } else {
            start_auction(&mut state)
        };
        settle(&mut state, &mut round)?;

        tracing::info!(title = %config.title, players = names.len(), "game created");
        Ok(Self {
            config,
            names,
            mode,
            state,
            round,
            actions: Vector::new(),
        })
    }

    /// Validate and apply one action.
    ///
    /// On success the action is appended to the log with its sequence id
    /// and the rounds advance as far as they can. On failure nothing
    /// changes.
    pub fn process_action(&mut self, action: Action) -> EngineResult<()> {
        match self.apply(action) {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(error = %e, "action rejected");
                Err(e)
            }
        }
    }

    /// Decode a raw wire action and process it.
    pub fn process_json(&mut self, raw: &Value) -> EngineResult<()> {
        let action = Action::from_json(raw)?;
        self.process_action(action)
    }

    fn apply(&mut self, mut action: Action) -> EngineResult<()> {
        let mut state = self.state.clone();
        let mut round = self.round.clone();

        let entity = state.resolve_entity(action.entity_type, &action.entity)?;
        match entity {
            EntityId::Company(company) => special::process(&mut state, company, &action.kind)?,
            _ => round.process(&mut state, entity, &action.kind)?,
        }
        if let ActionKind::BuyTrain { train, .. } = &action.kind {
            let name = state.depot.train(state.find_train(train)?).name.clone();
            state.observe_train_purchase(&name)?;
        }
        settle(&mut state, &mut round)?;

        let id = u32::try_from(self.actions.len() + 1)
            .map_err(|_| GameError::invariant("action log is full"))?;
        action.id = Some(id);
        tracing::debug!(id, entity = %action.entity, kind = action.kind.type_name(), "action applied");

        self.state = state;
        self.round = round;
        self.actions.push_back(action);
        Ok(())
    }

    /// A fresh game with the same setup, replaying `actions`.
    pub fn clone_with(&self, actions: impl IntoIterator<Item = Action>) -> EngineResult<Game> {
        GameBuilder {
            config: Arc::clone(&self.config),
            players: self.names.clone(),
            mode: self.mode,
            actions: Vec::new(),
        }
        .actions(actions.into_iter().map(|a| a.without_id()))
        .build()
    }

    /// The game as it was before the last action.
    pub fn rollback(&self) -> EngineResult<Game> {
        let keep = self.actions.len().saturating_sub(1);
        self.clone_with(self.actions.iter().take(keep).cloned())
    }

    /// Encode the derived state. Two games with equal action lists encode
    /// to equal bytes.
    pub fn snapshot(&self) -> EngineResult<Vec<u8>> {
        bincode::serialize(&(&self.state, &self.round)).map_err(|e| GameError::Snapshot(e.to_string()))
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn round(&self) -> &ActiveRound {
        &self.round
    }

    /// Accepted actions, in order.
    #[must_use]
    pub fn actions(&self) -> &Vector<Action> {
        &self.actions
    }

    #[must_use]
    pub fn log(&self) -> &GameLog {
        &self.state.log
    }

    #[must_use]
    pub fn current_entity(&self) -> Option<EntityId> {
        self.round.current_entity()
    }

    /// Player name or sym of the entity whose turn it is.
    #[must_use]
    pub fn current_entity_name(&self) -> Option<&str> {
        self.current_entity().map(|e| self.state.entity_name(e))
    }

    #[must_use]
    pub fn player_by_id(&self, name: &str) -> Option<&Player> {
        self.state.player_id(name).map(|p| self.state.player(p))
    }

    #[must_use]
    pub fn corporation_by_id(&self, sym: &str) -> Option<&Corporation> {
        self.state.corporation_id(sym).map(|c| self.state.corporation(c))
    }

    #[must_use]
    pub fn company_by_id(&self, sym: &str) -> Option<&Company> {
        self.state.company_id(sym).map(|c| self.state.company(c))
    }

    #[must_use]
    pub fn train_by_id(&self, id: &str) -> Option<&Train> {
        self.state.train_index(id).map(|t| self.state.depot.train(t))
    }

    #[must_use]
    pub fn hex_by_id(&self, coordinates: &str) -> Option<&Hex> {
        self.state.board.hex_by_id(coordinates)
    }

    #[must_use]
    pub fn tile_by_id(&self, id: &str) -> Option<&Tile> {
        self.state.board.tile_by_id(id)
    }

    #[must_use]
    pub fn share_by_id(&self, id: &str) -> Option<&Share> {
        self.state
            .share_location(id)
            .map(|(c, i)| &self.state.corporation(c).shares[i])
    }

    /// Market cell by `row,column` id.
    #[must_use]
    pub fn share_price_by_id(&self, id: &str) -> Option<&SharePrice> {
        self.state.market.cell_by_id(id)
    }

    #[must_use]
    pub fn city_by_id(&self, id: &str) -> Option<&City> {
        self.state.board.city_by_id(id)
    }
}

/// Advance rounds while the active one is finished.
fn settle(state: &mut GameState, round: &mut ActiveRound) -> EngineResult<()> {
    let mut transitions = 0;
    while round.is_finished(state) {
        transitions += 1;
        if transitions > MAX_IDLE_TRANSITIONS {
            return Err(GameError::invariant("no entity can act in any round"));
        }
        *round = next_round(state, round)?;
    }
    Ok(())
}

fn next_round(state: &mut GameState, round: &ActiveRound) -> EngineResult<ActiveRound> {
    match round {
        ActiveRound::Auction(_) | ActiveRound::Stock(_) => {
            if let Some(last) = round.last_to_act() {
                state.rotate_players(last);
            }
            if round.kind() == RoundKind::Auction && state.all_companies_owned() {
                start_stock(state)
            } else {
                Ok(start_operating(state, 1))
            }
        }
        ActiveRound::Operating(r) if r.round_num < state.operating_rounds => Ok(start_operating(state, r.round_num + 1)),
        ActiveRound::Operating(_) => {
            state.turn += 1;
            state.operating_rounds = state.phase().operating_rounds;
            if state.all_companies_owned() {
                start_stock(state)
            } else {
                Ok(start_auction(state))
            }
        }
    }
}

fn start_auction(state: &mut GameState) -> ActiveRound {
    state.log.push(format!("-- Auction Round {} --", state.turn));
    tracing::info!(turn = state.turn, "auction round started");
    ActiveRound::Auction(AuctionRound::new(state))
}

fn start_stock(state: &mut GameState) -> EngineResult<ActiveRound> {
    state.log.push(format!("-- Stock Round {} --", state.turn));
    tracing::info!(turn = state.turn, "stock round started");
    let mut round = StockRound::new(state);
    round.try_advance_entity(state)?;
    Ok(ActiveRound::Stock(round))
}

fn start_operating(state: &mut GameState, round_num: u8) -> ActiveRound {
    state.log.push(format!("-- Operating Round {}.{} --", state.turn, round_num));
    tracing::info!(turn = state.turn, round = round_num, "operating round started");
    ActiveRound::Operating(OperatingRound::new(state, round_num))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EntityType;
    use crate::games::g1889;

    fn game() -> Game {
        GameBuilder::new(g1889::config())
            .players(["A", "B", "C", "D"])
            .build()
            .unwrap()
    }

    fn buy(player: &str, company: &str, price: i64) -> Action {
        Action::player(
            player,
            ActionKind::BuyCompany {
                company: company.into(),
                price,
            },
        )
    }

    #[test]
    fn test_starts_with_auction() {
        let g = game();
        assert_eq!(g.round().kind(), RoundKind::Auction);
        assert_eq!(g.current_entity_name(), Some("A"));
        assert_eq!(g.log().last().map(String::as_str), Some("-- Auction Round 1 --"));
    }

    #[test]
    fn test_ids_assigned_in_order() {
        let mut g = game();
        g.process_action(buy("A", "TR", 20)).unwrap();
        g.process_action(buy("B", "MF", 30)).unwrap();
        let ids: Vec<_> = g.actions().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![Some(1), Some(2)]);
        assert_eq!(g.player_by_id("A").unwrap().cash, 400);
        assert_eq!(g.company_by_id("TR").unwrap().owner, Some(EntityId::Player(crate::core::PlayerId(0))));
    }

    #[test]
    fn test_rejected_action_changes_nothing() {
        let mut g = game();
        let before = g.snapshot().unwrap();
        assert!(matches!(
            g.process_action(buy("B", "TR", 20)),
            Err(GameError::OutOfTurn { .. })
        ));
        assert!(matches!(
            g.process_action(buy("A", "TR", 25)),
            Err(GameError::Illegal(_))
        ));
        assert!(matches!(
            g.process_action(buy("Zed", "TR", 20)),
            Err(GameError::UnknownEntity { .. })
        ));
        assert_eq!(g.snapshot().unwrap(), before);
        assert!(g.actions().is_empty());
    }

    #[test]
    fn test_process_json_unknown_type() {
        let mut g = game();
        let raw = serde_json::json!({"type": "sabotage", "entity": "A", "entity_type": "player"});
        assert_eq!(g.process_json(&raw), Err(GameError::UnknownAction("sabotage".into())));
    }

    #[test]
    fn test_rollback_and_clone_with() {
        let mut g = game();
        g.process_action(buy("A", "TR", 20)).unwrap();
        let one = g.snapshot().unwrap();
        g.process_action(buy("B", "MF", 30)).unwrap();

        let back = g.rollback().unwrap();
        assert_eq!(back.actions().len(), 1);
        assert_eq!(back.snapshot().unwrap(), one);

        let again = g.clone_with(g.actions().iter().cloned()).unwrap();
        assert_eq!(again.snapshot().unwrap(), g.snapshot().unwrap());
    }

    #[test]
    fn test_replay_error_carries_index() {
        let err = GameBuilder::new(g1889::config())
            .players(["A", "B", "C", "D"])
            .actions([buy("A", "TR", 20), buy("A", "MF", 30)])
            .build()
            .unwrap_err();
        match err {
            GameError::Replay { index, source } => {
                assert_eq!(index, 1);
                assert!(matches!(*source, GameError::OutOfTurn { .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_company_actions_bypass_turn_order() {
        let mut g = game();
        g.process_action(buy("A", "TR", 20)).unwrap();
        g.process_action(buy("B", "MF", 30)).unwrap();

        // C is on turn but B's ferry may lay its tile.
        let lay = Action::new(
            EntityType::Company,
            "MF",
            ActionKind::LayTile {
                hex: "J9".into(),
                tile: "437-0".into(),
                rotation: 0,
            },
        );
        g.process_action(lay).unwrap();
        assert_eq!(g.tile_by_id("437-0").map(|t| t.rotation()), Some(0));
        assert_eq!(g.current_entity_name(), Some("C"));
    }

    #[test]
    fn test_read_surface() {
        let g = game();
        assert_eq!(g.hex_by_id("K8").and_then(|h| h.location_name.as_deref()), Some("Tokushima"));
        assert_eq!(g.share_by_id("AR_0").map(|s| s.percent), Some(20));
        assert_eq!(g.share_price_by_id("0,3").map(|p| p.price), Some(100));
        assert_eq!(g.train_by_id("D-19").map(|t| t.price), Some(1100));
        assert!(g.city_by_id("K8-0").is_some());
        assert!(g.corporation_by_id("XX").is_none());
    }

    #[test]
    fn test_game_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<Game>();
    }
}
