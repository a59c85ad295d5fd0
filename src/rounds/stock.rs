//! Stock round: players par corporations and buy and sell certificates.
//!
//! ## Turns
//!
//! A turn may hold at most one buy or par and any number of sales, subject
//! to [`StockRound::can_sell`]. The turn ends on a pass, or as soon as the
//! player has nothing left to do. A pass after an action this turn does
//! not count as a pass for ending the round.
//!
//! The round ends when every player has passed. Corporations whose
//! certificates are all held by players then move up one row.

use std::collections::BTreeSet;

use serde::Serialize;
use smallvec::SmallVec;

use crate::core::{ActionKind, CorporationId, EngineResult, EntityId, GameError, PlayerId};
use crate::game::GameState;
use crate::ledger::{Movement, PriceColor, ShareOwner};

use super::{not_allowed, Round, RoundKind};

/// What a player did this turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
enum TurnAction {
    Buy,
    Sell,
    Par,
}

#[derive(Clone, Debug, Serialize)]
pub struct StockRound {
    entities: Vec<PlayerId>,
    current: usize,
    passed: Vec<bool>,
    /// Sales are closed in the first stock round.
    can_sell: bool,
    /// Corporations each player sold this round.
    players_sold: BTreeSet<(PlayerId, CorporationId)>,
    current_actions: SmallVec<[TurnAction; 4]>,
    last_to_act: Option<PlayerId>,
}

impl StockRound {
    #[must_use]
    pub fn new(state: &GameState) -> Self {
        Self {
            entities: state.priority.clone(),
            current: 0,
            passed: vec![false; state.priority.len()],
            can_sell: state.turn > 1,
            players_sold: BTreeSet::new(),
            current_actions: SmallVec::new(),
            last_to_act: None,
        }
    }

    fn player(&self) -> PlayerId {
        self.entities[self.current]
    }

    fn bought_this_turn(&self) -> bool {
        self.current_actions
            .iter()
            .any(|a| matches!(a, TurnAction::Buy | TurnAction::Par))
    }

    /// Whether `player` may buy certificate `share` of `corporation` now.
    #[must_use]
    pub fn can_buy(&self, state: &GameState, player: PlayerId, corporation: CorporationId, share: usize) -> bool {
        let c = state.corporation(corporation);
        let s = &c.shares[share];
        if s.president || !c.is_parred() || s.owner.player().is_some() {
            return false;
        }
        let brown = c
            .share_price
            .and_then(|p| state.market.cell(p))
            .is_some_and(|cell| cell.color == PriceColor::Brown);

        state.players[player].cash >= state.share_cost(corporation, share)
            && (brown || c.player_percent(player) + s.percent <= state.rules.max_percent_held)
            && !self.players_sold.contains(&(player, corporation))
            && !self.bought_this_turn()
    }

    /// One more certificate of `corporation` would break the limit.
    fn exceeds_cert_limit(state: &GameState, player: PlayerId, corporation: CorporationId) -> bool {
        !state.cert_limit_exempt(corporation) && state.certificate_count(player) + 1 > state.cert_limit
    }

    /// Over the certificate limit.
    #[must_use]
    pub fn must_sell(&self, state: &GameState, player: PlayerId) -> bool {
        state.certificate_count(player) > state.cert_limit
    }

    /// Whether `player` may sell `shares` of `corporation` now.
    #[must_use]
    pub fn can_sell(&self, state: &GameState, player: PlayerId, corporation: CorporationId, shares: &[usize]) -> bool {
        if !self.can_sell || shares.is_empty() {
            return false;
        }
        let distinct: BTreeSet<TurnAction> = self.current_actions.iter().copied().collect();
        let after_buy = distinct.len() == 2
            && matches!(self.current_actions.last(), Some(TurnAction::Buy | TurnAction::Par));

        !self.players_sold.contains(&(player, corporation))
            && !after_buy
            && state.check_sale(player, corporation, shares).is_ok()
    }

    fn can_par(&self, state: &GameState, player: PlayerId) -> bool {
        !self.bought_this_turn()
            && state.certificate_count(player) < state.cert_limit
            && state.players[player].cash >= state.min_price * 2
            && state.corporations.iter().any(|c| !c.is_parred())
    }

    /// The cheapest single certificate a player holds.
    fn cheapest_held(state: &GameState, player: PlayerId) -> Option<(CorporationId, usize)> {
        state
            .corporations
            .iter()
            .flat_map(|c| {
                c.shares
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| s.owner == ShareOwner::Player(player))
                    .map(move |(i, _)| (c.id, i))
            })
            .min_by_key(|&(c, i)| state.market_price(c).map(|p| state.corporation(c).shares[i].price_at(p)))
    }

    fn nothing_to_do(&self, state: &GameState) -> bool {
        let player = self.player();
        let can_sell = Self::cheapest_held(state, player).is_some_and(|(c, i)| self.can_sell(state, player, c, &[i]));
        if can_sell {
            return false;
        }
        let can_buy = state.corporations.iter().any(|c| {
            (0..c.shares.len())
                .any(|i| self.can_buy(state, player, c.id, i) && !Self::exceeds_cert_limit(state, player, c.id))
        });
        !can_buy && !self.can_par(state, player)
    }

    fn next_entity(&mut self) {
        self.current = (self.current + 1) % self.entities.len();
    }

    fn buy(&mut self, state: &mut GameState, player: PlayerId, id: &str) -> EngineResult<()> {
        let (corporation, share) = state.find_share(id)?;
        if !self.can_buy(state, player, corporation, share) {
            return Err(GameError::illegal(format!(
                "{} cannot buy {id}",
                state.players[player].name
            )));
        }
        if Self::exceeds_cert_limit(state, player, corporation) {
            return Err(GameError::illegal(format!(
                "{} is at the certificate limit",
                state.players[player].name
            )));
        }
        state.buy_share(player, corporation, share)?;
        self.current_actions.push(TurnAction::Buy);
        Ok(())
    }

    fn par(&mut self, state: &mut GameState, player: PlayerId, sym: &str, cell: &str) -> EngineResult<()> {
        let corporation = state.find_corporation(sym)?;
        if self.bought_this_turn() {
            return Err(GameError::illegal("only one buy or par per turn"));
        }
        if state.certificate_count(player) + 1 > state.cert_limit {
            return Err(GameError::illegal(format!(
                "{} is at the certificate limit",
                state.players[player].name
            )));
        }
        state.par(player, corporation, cell)?;
        self.current_actions.push(TurnAction::Par);
        Ok(())
    }

    fn sell(&mut self, state: &mut GameState, player: PlayerId, ids: &[String]) -> EngineResult<()> {
        let located = ids
            .iter()
            .map(|id| state.find_share(id))
            .collect::<EngineResult<Vec<_>>>()?;
        let Some(&(corporation, _)) = located.first() else {
            return Err(GameError::illegal("no shares to sell"));
        };
        if located.iter().any(|&(c, _)| c != corporation) {
            return Err(GameError::illegal("shares sold together must be of one corporation"));
        }
        let shares: Vec<usize> = located.iter().map(|&(_, i)| i).collect();
        state.check_sale(player, corporation, &shares)?;
        if !self.can_sell(state, player, corporation, &shares) {
            return Err(GameError::illegal(format!(
                "{} cannot sell {} now",
                state.players[player].name,
                state.corporation(corporation).sym
            )));
        }
        state.sell_shares(player, corporation, &shares)?;
        self.players_sold.insert((player, corporation));
        self.current_actions.push(TurnAction::Sell);
        Ok(())
    }

    fn pass(&mut self, state: &mut GameState, player: PlayerId) -> EngineResult<()> {
        if self.must_sell(state, player) {
            let can_sell_any = state.corporations.iter().any(|c| {
                c.shares
                    .iter()
                    .enumerate()
                    .any(|(i, s)| s.owner == ShareOwner::Player(player) && self.can_sell(state, player, c.id, &[i]))
            });
            if can_sell_any {
                return Err(GameError::illegal(format!(
                    "{} is over the certificate limit and must sell",
                    state.players[player].name
                )));
            }
        }
        state.log.push(format!("{} passes", state.players[player].name));
        self.passed[self.current] = true;
        Ok(())
    }

    fn change_entity(&mut self, state: &GameState) {
        if !self.passed[self.current] && !self.nothing_to_do(state) {
            return;
        }
        if !self.current_actions.is_empty() {
            self.passed[self.current] = false;
        }
        self.current_actions.clear();
        self.next_entity();
    }

    /// Corporations fully held by players move up.
    fn finish(state: &mut GameState) {
        let sold_out: Vec<CorporationId> = state
            .corporations
            .iter()
            .filter(|c| c.is_parred() && c.player_held_percent() >= 100)
            .map(|c| c.id)
            .collect();
        for corporation in sold_out {
            state.move_price(corporation, Movement::Up);
        }
    }
}

impl Round for StockRound {
    fn kind(&self) -> RoundKind {
        RoundKind::Stock
    }

    fn current_entity(&self) -> Option<EntityId> {
        (!self.passed.iter().all(|&p| p)).then(|| EntityId::Player(self.player()))
    }

    fn is_finished(&self, _state: &GameState) -> bool {
        self.passed.iter().all(|&p| p)
    }

    fn apply_action(&mut self, state: &mut GameState, entity: EntityId, action: &ActionKind) -> EngineResult<()> {
        let player = entity
            .as_player()
            .ok_or_else(|| GameError::illegal("only players act in a stock round"))?;
        match action {
            ActionKind::BuyShare { share } => self.buy(state, player, share)?,
            ActionKind::Par { corporation, share_price } => self.par(state, player, corporation, share_price)?,
            ActionKind::SellShares { shares } => self.sell(state, player, shares)?,
            ActionKind::Pass => return self.pass(state, player),
            other => return Err(not_allowed(other, RoundKind::Stock)),
        }
        self.last_to_act = Some(player);
        Ok(())
    }

    fn on_action_applied(&mut self, state: &mut GameState, _entity: EntityId, action: &ActionKind) -> EngineResult<()> {
        if !action.is_pass() {
            self.passed[self.current] = false;
        }
        self.change_entity(state);
        Ok(())
    }

    fn try_advance_entity(&mut self, state: &mut GameState) -> EngineResult<()> {
        if state.rules.auto_pass_idle {
            while !self.is_finished(state) && self.nothing_to_do(state) {
                self.passed[self.current] = true;
                self.next_entity();
            }
        }
        if self.is_finished(state) {
            Self::finish(state);
        }
        Ok(())
    }

    fn last_to_act(&self) -> Option<PlayerId> {
        self.last_to_act
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RuleOptions;
    use crate::games::g1889;

    const AR: CorporationId = CorporationId(0);
    const A: PlayerId = PlayerId(0);
    const B: PlayerId = PlayerId(1);
    const C: PlayerId = PlayerId(2);

    fn setup(turn: u32) -> (GameState, StockRound) {
        let names: Vec<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
        let mut state = GameState::new(&g1889::config(), &names).unwrap();
        state.turn = turn;
        let round = StockRound::new(&state);
        (state, round)
    }

    fn act(s: &mut GameState, r: &mut StockRound, player: PlayerId, action: ActionKind) -> EngineResult<()> {
        r.process(s, EntityId::Player(player), &action)
    }

    fn par(sym: &str, cell: &str) -> ActionKind {
        ActionKind::Par {
            corporation: sym.into(),
            share_price: cell.into(),
        }
    }

    fn buy(id: &str) -> ActionKind {
        ActionKind::BuyShare { share: id.into() }
    }

    fn sell(ids: &[&str]) -> ActionKind {
        ActionKind::SellShares {
            shares: ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_par_ends_turn_in_first_round() {
        let (mut s, mut r) = setup(1);
        act(&mut s, &mut r, A, par("AR", "0,3")).unwrap();
        // No sales in turn 1 and one buy per turn: A is done.
        assert_eq!(r.current_entity(), Some(EntityId::Player(B)));
        assert!(!r.passed[0]);
        assert_eq!(r.last_to_act(), Some(A));
    }

    #[test]
    fn test_one_buy_per_turn() {
        let (mut s, mut r) = setup(2);
        s.par(C, AR, "0,3").unwrap();
        act(&mut s, &mut r, A, buy("AR_1")).unwrap();
        // Turn 2: A could still sell, so the turn stays open.
        assert_eq!(r.current_entity(), Some(EntityId::Player(A)));
        assert!(matches!(act(&mut s, &mut r, A, buy("AR_2")), Err(GameError::Illegal(_))));
    }

    #[test]
    fn test_president_alone_cannot_sell() {
        let (mut s, mut r) = setup(2);
        act(&mut s, &mut r, A, par("AR", "0,3")).unwrap();
        // Nobody else holds AR, so the president certificate cannot be sold
        // and A has nothing left to do.
        assert_eq!(r.current_entity(), Some(EntityId::Player(B)));
        assert!(!r.can_sell(&s, A, AR, &[0]));
    }

    #[test]
    fn test_pass_after_action_is_not_a_pass() {
        let (mut s, mut r) = setup(2);
        s.par(C, AR, "0,3").unwrap();
        act(&mut s, &mut r, A, buy("AR_1")).unwrap();
        act(&mut s, &mut r, A, ActionKind::Pass).unwrap();
        assert!(!r.passed[0]);
        act(&mut s, &mut r, B, ActionKind::Pass).unwrap();
        act(&mut s, &mut r, C, ActionKind::Pass).unwrap();
        assert!(!r.is_finished(&s));
        act(&mut s, &mut r, A, ActionKind::Pass).unwrap();
        assert!(r.is_finished(&s));
    }

    #[test]
    fn test_sold_corporation_cannot_be_bought_back() {
        let (mut s, mut r) = setup(2);
        s.par(C, AR, "0,3").unwrap();
        act(&mut s, &mut r, A, buy("AR_1")).unwrap();
        act(&mut s, &mut r, A, ActionKind::Pass).unwrap();
        act(&mut s, &mut r, B, buy("AR_2")).unwrap();
        act(&mut s, &mut r, B, ActionKind::Pass).unwrap();
        act(&mut s, &mut r, C, ActionKind::Pass).unwrap();
        act(&mut s, &mut r, A, ActionKind::Pass).unwrap();

        act(&mut s, &mut r, B, sell(&["AR_2"])).unwrap();
        assert!(!r.can_buy(&s, B, AR, 3));
        assert!(matches!(act(&mut s, &mut r, B, sell(&["AR_2"])), Err(GameError::Illegal(_))));
    }

    #[test]
    fn test_no_sales_in_first_round() {
        let (mut s, mut r) = setup(1);
        act(&mut s, &mut r, A, par("AR", "0,3")).unwrap();
        act(&mut s, &mut r, B, buy("AR_1")).unwrap();
        act(&mut s, &mut r, C, ActionKind::Pass).unwrap();
        assert!(matches!(act(&mut s, &mut r, A, sell(&["AR_0"])), Err(GameError::Illegal(_))));
    }

    #[test]
    fn test_max_percent_held() {
        let (mut s, r) = setup(1);
        s.players[A].cash = 1000;
        s.par(A, AR, "0,3").unwrap();
        for i in 1..=4 {
            s.buy_share(A, AR, i).unwrap();
        }
        // 60% held; one more would be 70%.
        assert!(!r.can_buy(&s, A, AR, 5));
        assert!(r.can_buy(&s, B, AR, 5));
    }

    #[test]
    fn test_cert_limit_refuses_buy() {
        let (mut s, mut r) = setup(1);
        s.cert_limit = 1;
        act(&mut s, &mut r, A, par("AR", "0,3")).unwrap();
        act(&mut s, &mut r, B, par("IR", "0,3")).unwrap();
        act(&mut s, &mut r, C, ActionKind::Pass).unwrap();
        assert_eq!(r.current_entity(), None);
        assert!(r.is_finished(&s));
    }

    #[test]
    fn test_must_sell_blocks_pass() {
        let (mut s, mut r) = setup(2);
        s.par(A, AR, "0,3").unwrap();
        s.buy_share(A, AR, 1).unwrap();
        s.buy_share(B, AR, 2).unwrap();
        s.buy_share(B, AR, 3).unwrap();
        s.cert_limit = 1;
        assert!(r.must_sell(&s, A));
        assert!(matches!(act(&mut s, &mut r, A, ActionKind::Pass), Err(GameError::Illegal(_))));
        act(&mut s, &mut r, A, sell(&["AR_1"])).unwrap();
        assert!(!r.must_sell(&s, A));
        // Sold AR and at the limit: nothing left, so the turn moves on.
        assert_eq!(r.current_entity(), Some(EntityId::Player(B)));
    }

    #[test]
    fn test_same_certificate_sold_once() {
        let (mut s, mut r) = setup(2);
        s.par(C, AR, "0,3").unwrap();
        s.buy_share(A, AR, 1).unwrap();
        let cash = s.players[A].cash;

        assert!(matches!(act(&mut s, &mut r, A, sell(&["AR_1", "AR_1"])), Err(GameError::Illegal(_))));
        assert_eq!(s.players[A].cash, cash);
        assert_eq!(s.market_price(AR), Some(100));

        act(&mut s, &mut r, A, sell(&["AR_1"])).unwrap();
        assert_eq!(s.players[A].cash, cash + 100);
        assert_eq!(s.market_price(AR), Some(90));
    }

    #[test]
    fn test_over_limit_may_pass_when_market_is_full() {
        let (mut s, mut r) = setup(2);
        s.par(C, AR, "0,3").unwrap();
        for i in 1..=5 {
            s.transfer_share(AR, i, ShareOwner::Market);
        }
        s.buy_share(A, AR, 6).unwrap();
        s.buy_share(A, AR, 7).unwrap();
        s.cert_limit = 1;

        assert!(r.must_sell(&s, A));
        assert!(!r.can_sell(&s, A, AR, &[6]));
        assert!(matches!(act(&mut s, &mut r, A, sell(&["AR_6"])), Err(GameError::Illegal(_))));
        act(&mut s, &mut r, A, ActionKind::Pass).unwrap();
        assert_eq!(r.current_entity(), Some(EntityId::Player(B)));
    }

    #[test]
    fn test_no_sale_after_sell_then_buy() {
        let (mut s, mut r) = setup(2);
        let ir = s.corporation_id("IR").unwrap();
        s.par(C, AR, "0,3").unwrap();
        s.par(B, ir, "0,3").unwrap();
        s.buy_share(A, AR, 1).unwrap();

        r.apply_action(&mut s, EntityId::Player(A), &sell(&["AR_1"])).unwrap();
        r.apply_action(&mut s, EntityId::Player(A), &buy("IR_1")).unwrap();
        assert!(!r.can_sell(&s, A, ir, &[1]));
        assert!(matches!(
            r.apply_action(&mut s, EntityId::Player(A), &sell(&["IR_1"])),
            Err(GameError::Illegal(_))
        ));
    }

    #[test]
    fn test_sale_allowed_after_single_buy() {
        let (mut s, mut r) = setup(2);
        let ir = s.corporation_id("IR").unwrap();
        s.par(B, ir, "0,3").unwrap();

        act(&mut s, &mut r, A, buy("IR_1")).unwrap();
        assert_eq!(r.current_entity(), Some(EntityId::Player(A)));
        assert!(r.can_sell(&s, A, ir, &[1]));
        act(&mut s, &mut r, A, sell(&["IR_1"])).unwrap();
        assert_eq!(s.corporation(ir).percent_of(ShareOwner::Market), 10);
    }

    #[test]
    fn test_idle_players_auto_pass() {
        let (mut s, mut r) = setup(1);
        s.players[B].cash = 0;
        act(&mut s, &mut r, A, ActionKind::Pass).unwrap();
        // B cannot do anything and is skipped.
        assert_eq!(r.current_entity(), Some(EntityId::Player(C)));
        assert!(r.passed[1]);
    }

    #[test]
    fn test_idle_skip_can_be_disabled() {
        let (mut s, mut r) = setup(1);
        s.rules = RuleOptions::default().with_auto_pass_idle(false);
        s.players[B].cash = 0;
        act(&mut s, &mut r, A, ActionKind::Pass).unwrap();
        assert_eq!(r.current_entity(), Some(EntityId::Player(B)));
    }

    #[test]
    fn test_sold_out_moves_up_at_end() {
        let (mut s, mut r) = setup(1);
        s.par(A, AR, "1,3").unwrap();
        for (p, i) in [(A, 1), (A, 2), (A, 3), (A, 4), (B, 5), (B, 6), (C, 7), (C, 8)] {
            s.players[p].cash += 100;
            s.buy_share(p, AR, i).unwrap();
        }
        assert_eq!(s.market_price(AR), Some(90));
        for p in [A, B, C] {
            act(&mut s, &mut r, p, ActionKind::Pass).unwrap();
        }
        assert_eq!(s.market_price(AR), Some(100));
        assert!(s.log.contains("AR's share price changes from $90 to $100"));
    }
}
