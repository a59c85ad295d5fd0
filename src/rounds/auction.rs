//! Waterfall auction of the private companies.
//!
//! Companies are offered cheapest first. The player on turn may buy the
//! cheapest company outright, bid on a more expensive one, or pass. Each
//! purchase lets the waterfall run: the next cheapest company goes to its
//! only bidder, or to a sub-auction among its bidders, until a company
//! without bids is reached.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::{ActionKind, CompanyId, EngineResult, EntityId, GameError, PlayerId};
use crate::game::GameState;

use super::{not_allowed, Round, RoundKind};

const MIN_INCREMENT: i64 = 5;

/// A company auctioned among several bidders.
#[derive(Clone, Debug, Serialize)]
struct SubAuction {
    company: CompanyId,
    /// Player whose purchase started the waterfall; normal turns resume
    /// after them.
    resume_after: PlayerId,
}

#[derive(Clone, Debug, Serialize)]
pub struct AuctionRound {
    entities: Vec<PlayerId>,
    current: usize,
    /// Consecutive passes in normal turns.
    passes: usize,
    /// Open bids per company, in bid order.
    bids: BTreeMap<CompanyId, Vec<(PlayerId, i64)>>,
    auction: Option<SubAuction>,
    last_to_act: Option<PlayerId>,
    finished: bool,
}

impl AuctionRound {
    #[must_use]
    pub fn new(state: &GameState) -> Self {
        Self {
            entities: state.priority.clone(),
            current: 0,
            passes: 0,
            bids: BTreeMap::new(),
            auction: None,
            last_to_act: None,
            finished: false,
        }
    }

    /// Unowned companies, cheapest first.
    fn available(state: &GameState) -> Vec<CompanyId> {
        let mut companies: Vec<_> = state
            .companies
            .iter()
            .filter(|c| c.owner.is_none() && c.is_open())
            .collect();
        companies.sort_by_key(|c| (c.value, c.id));
        companies.into_iter().map(|c| c.id).collect()
    }

    /// Cash `player` has committed to open bids, except on `except`.
    fn committed(&self, player: PlayerId, except: Option<CompanyId>) -> i64 {
        self.bids
            .iter()
            .filter(|(&c, _)| Some(c) != except)
            .flat_map(|(_, bids)| bids.iter())
            .filter(|(p, _)| *p == player)
            .map(|(_, amount)| amount)
            .sum()
    }

    fn high_bid(&self, company: CompanyId) -> Option<(PlayerId, i64)> {
        self.bids
            .get(&company)?
            .iter()
            .copied()
            .max_by_key(|&(_, amount)| amount)
    }

    fn player(&self) -> PlayerId {
        self.entities[self.current]
    }

    fn seat_of(&self, player: PlayerId) -> usize {
        self.entities.iter().position(|&p| p == player).unwrap_or(0)
    }

    fn next_turn(&mut self) {
        self.current = (self.current + 1) % self.entities.len();
    }

    /// In a sub-auction, the lowest bidder acts.
    fn lowest_bidder(&self, company: CompanyId) -> Option<PlayerId> {
        self.bids
            .get(&company)?
            .iter()
            .min_by_key(|&&(_, amount)| amount)
            .map(|&(p, _)| p)
    }

    fn buy(&mut self, state: &mut GameState, player: PlayerId, company: CompanyId, price: i64) -> EngineResult<()> {
        let cheapest = Self::available(state).first().copied();
        if cheapest != Some(company) {
            return Err(GameError::illegal(format!(
                "only the cheapest company may be bought, not {}",
                state.company(company).sym
            )));
        }
        let cost = state.company(company).price();
        if price != cost {
            return Err(GameError::illegal(format!(
                "{} costs ${cost}, not ${price}",
                state.company(company).sym
            )));
        }
        let free = state.players[player].cash - self.committed(player, None);
        if free < cost {
            return Err(GameError::illegal(format!(
                "{} cannot cover ${cost} and their open bids",
                state.players[player].name
            )));
        }

        self.award(state, player, company, cost)?;
        self.last_to_act = Some(player);
        self.passes = 0;
        self.run_waterfall(state, player)
    }

    fn award(&mut self, state: &mut GameState, player: PlayerId, company: CompanyId, price: i64) -> EngineResult<()> {
        state.pay_bank(EntityId::Player(player), price)?;
        state.company_mut(company).owner = Some(EntityId::Player(player));
        self.bids.remove(&company);
        let line = format!(
            "{} buys {} for ${price}",
            state.players[player].name,
            state.company(company).name
        );
        tracing::debug!(player = %state.players[player].name, company = %state.company(company).sym, price, "company sold");
        state.log.push(line);
        Ok(())
    }

    /// Award the next companies in value order while they have bids.
    fn run_waterfall(&mut self, state: &mut GameState, resume_after: PlayerId) -> EngineResult<()> {
        while let Some(&company) = Self::available(state).first() {
            let bidders = self.bids.get(&company).map_or(0, Vec::len);
            match bidders {
                0 => break,
                1 => {
                    if let Some((player, amount)) = self.high_bid(company) {
                        self.award(state, player, company, amount)?;
                    }
                }
                _ => {
                    self.auction = Some(SubAuction { company, resume_after });
                    if let Some(lowest) = self.lowest_bidder(company) {
                        self.current = self.seat_of(lowest);
                    }
                    return Ok(());
                }
            }
        }

        self.auction = None;
        self.current = self.seat_of(resume_after);
        self.next_turn();
        if Self::available(state).is_empty() {
            self.finished = true;
        }
        Ok(())
    }

    fn bid(&mut self, state: &mut GameState, player: PlayerId, company: CompanyId, price: i64) -> EngineResult<()> {
        let c = state.company(company);
        if c.owner.is_some() || c.closed {
            return Err(GameError::illegal(format!("{} is not for sale", c.sym)));
        }
        if self.auction.is_none() && Self::available(state).first() == Some(&company) {
            return Err(GameError::illegal(format!("{} must be bought, not bid on", c.sym)));
        }
        let minimum = self.high_bid(company).map_or(c.value, |(_, high)| high.max(c.value)) + MIN_INCREMENT;
        if price < minimum {
            return Err(GameError::illegal(format!("bid on {} must be at least ${minimum}", c.sym)));
        }
        let free = state.players[player].cash - self.committed(player, Some(company));
        if free < price {
            return Err(GameError::illegal(format!(
                "{} cannot cover a ${price} bid and their other bids",
                state.players[player].name
            )));
        }

        let bids = self.bids.entry(company).or_default();
        bids.retain(|(p, _)| *p != player);
        bids.push((player, price));
        state.log.push(format!(
            "{} bids ${price} for {}",
            state.players[player].name,
            state.company(company).name
        ));
        self.last_to_act = Some(player);
        Ok(())
    }

    fn act_in_auction(&mut self, state: &mut GameState, player: PlayerId, action: &ActionKind) -> EngineResult<()> {
        let Some(SubAuction { company, resume_after }) = self.auction.clone() else {
            return Ok(());
        };
        match action {
            ActionKind::Bid { company: sym, price } => {
                if state.find_company(sym)? != company {
                    return Err(GameError::illegal(format!(
                        "{} is being auctioned",
                        state.company(company).sym
                    )));
                }
                self.bid(state, player, company, *price)?;
            }
            ActionKind::Pass => {
                if let Some(bids) = self.bids.get_mut(&company) {
                    bids.retain(|(p, _)| *p != player);
                }
                state.log.push(format!(
                    "{} passes on {}",
                    state.players[player].name,
                    state.company(company).name
                ));
            }
            other => return Err(not_allowed(other, RoundKind::Auction)),
        }

        if self.bids.get(&company).map_or(0, Vec::len) <= 1 {
            return self.run_waterfall(state, resume_after);
        }
        if let Some(lowest) = self.lowest_bidder(company) {
            self.current = self.seat_of(lowest);
        }
        Ok(())
    }

    /// Everyone passed: the cheapest company gets cheaper.
    fn discount_cheapest(state: &mut GameState) {
        if let Some(&company) = Self::available(state).first() {
            let c = state.company_mut(company);
            c.discount = (c.discount + MIN_INCREMENT).min(c.value);
            let line = format!("{} is now offered for ${}", c.name, c.price());
            state.log.push(line);
        }
    }
}

impl Round for AuctionRound {
    fn kind(&self) -> RoundKind {
        RoundKind::Auction
    }

    fn current_entity(&self) -> Option<EntityId> {
        (!self.finished).then(|| EntityId::Player(self.player()))
    }

    fn is_finished(&self, state: &GameState) -> bool {
        self.finished || Self::available(state).is_empty()
    }

    fn apply_action(&mut self, state: &mut GameState, entity: EntityId, action: &ActionKind) -> EngineResult<()> {
        let player = entity
            .as_player()
            .ok_or_else(|| GameError::illegal("only players act in the auction"))?;
        if self.auction.is_some() {
            return self.act_in_auction(state, player, action);
        }

        match action {
            ActionKind::BuyCompany { company, price } => {
                let company = state.find_company(company)?;
                self.buy(state, player, company, *price)
            }
            ActionKind::Bid { company, price } => {
                let company = state.find_company(company)?;
                self.bid(state, player, company, *price)?;
                self.passes = 0;
                self.next_turn();
                Ok(())
            }
            ActionKind::Pass => {
                state.log.push(format!("{} passes", state.players[player].name));
                self.passes += 1;
                if self.passes >= self.entities.len() {
                    Self::discount_cheapest(state);
                    self.finished = true;
                } else {
                    self.next_turn();
                }
                Ok(())
            }
            other => Err(not_allowed(other, RoundKind::Auction)),
        }
    }

    fn last_to_act(&self) -> Option<PlayerId> {
        self.last_to_act
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::g1889;

    const A: PlayerId = PlayerId(0);
    const B: PlayerId = PlayerId(1);
    const C: PlayerId = PlayerId(2);
    const D: PlayerId = PlayerId(3);

    fn setup() -> (GameState, AuctionRound) {
        let names: Vec<String> = ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect();
        let state = GameState::new(&g1889::config(), &names).unwrap();
        let round = AuctionRound::new(&state);
        (state, round)
    }

    fn buy(sym: &str, price: i64) -> ActionKind {
        ActionKind::BuyCompany { company: sym.into(), price }
    }

    fn bid(sym: &str, price: i64) -> ActionKind {
        ActionKind::Bid { company: sym.into(), price }
    }

    fn act(state: &mut GameState, round: &mut AuctionRound, player: PlayerId, action: ActionKind) -> EngineResult<()> {
        round.process(state, EntityId::Player(player), &action)
    }

    #[test]
    fn test_buy_cheapest_only() {
        let (mut s, mut r) = setup();
        assert!(matches!(act(&mut s, &mut r, A, buy("MF", 30)), Err(GameError::Illegal(_))));
        assert!(matches!(act(&mut s, &mut r, A, buy("TR", 25)), Err(GameError::Illegal(_))));
        act(&mut s, &mut r, A, buy("TR", 20)).unwrap();
        assert_eq!(s.players[A].cash, 400);
        assert_eq!(r.current_entity(), Some(EntityId::Player(B)));
    }

    #[test]
    fn test_out_of_turn() {
        let (mut s, mut r) = setup();
        assert!(matches!(
            act(&mut s, &mut r, B, buy("TR", 20)),
            Err(GameError::OutOfTurn { .. })
        ));
    }

    #[test]
    fn test_bid_minimums() {
        let (mut s, mut r) = setup();
        assert!(matches!(act(&mut s, &mut r, A, bid("TR", 25)), Err(GameError::Illegal(_))));
        assert!(matches!(act(&mut s, &mut r, A, bid("MF", 34)), Err(GameError::Illegal(_))));
        act(&mut s, &mut r, A, bid("MF", 35)).unwrap();
        assert!(matches!(act(&mut s, &mut r, B, bid("MF", 39)), Err(GameError::Illegal(_))));
        act(&mut s, &mut r, B, bid("MF", 40)).unwrap();
        assert_eq!(r.high_bid(CompanyId(1)), Some((B, 40)));
    }

    #[test]
    fn test_bids_must_be_covered() {
        let (mut s, mut r) = setup();
        act(&mut s, &mut r, A, bid("UTF", 410)).unwrap();
        act(&mut s, &mut r, B, ActionKind::Pass).unwrap();
        act(&mut s, &mut r, C, ActionKind::Pass).unwrap();
        act(&mut s, &mut r, D, ActionKind::Pass).unwrap();
        // 420 cash with 410 committed.
        assert!(matches!(act(&mut s, &mut r, A, buy("TR", 20)), Err(GameError::Illegal(_))));
        assert!(matches!(act(&mut s, &mut r, A, bid("SIR", 85)), Err(GameError::Illegal(_))));
    }

    #[test]
    fn test_lone_bidder_awarded_in_waterfall() {
        let (mut s, mut r) = setup();
        act(&mut s, &mut r, A, bid("MF", 45)).unwrap();
        act(&mut s, &mut r, B, buy("TR", 20)).unwrap();

        let mf = s.company_id("MF").unwrap();
        assert_eq!(s.company(mf).owner, Some(EntityId::Player(A)));
        assert_eq!(s.players[A].cash, 375);
        // Turns resume after the buyer.
        assert_eq!(r.current_entity(), Some(EntityId::Player(C)));
        assert_eq!(r.last_to_act(), Some(B));
    }

    #[test]
    fn test_sub_auction_lowest_bidder_first() {
        let (mut s, mut r) = setup();
        act(&mut s, &mut r, A, bid("MF", 35)).unwrap();
        act(&mut s, &mut r, B, bid("MF", 40)).unwrap();
        act(&mut s, &mut r, C, buy("TR", 20)).unwrap();

        // A is the low bidder and must raise or pass.
        assert_eq!(r.current_entity(), Some(EntityId::Player(A)));
        act(&mut s, &mut r, A, bid("MF", 45)).unwrap();
        assert_eq!(r.current_entity(), Some(EntityId::Player(B)));
        act(&mut s, &mut r, B, ActionKind::Pass).unwrap();

        let mf = s.company_id("MF").unwrap();
        assert_eq!(s.company(mf).owner, Some(EntityId::Player(A)));
        assert_eq!(s.players[A].cash, 375);
        assert_eq!(r.current_entity(), Some(EntityId::Player(D)));
    }

    #[test]
    fn test_all_pass_discounts_cheapest() {
        let (mut s, mut r) = setup();
        for p in [A, B, C, D] {
            act(&mut s, &mut r, p, ActionKind::Pass).unwrap();
        }
        assert!(r.is_finished(&s));
        let tr = s.company_id("TR").unwrap();
        assert_eq!(s.company(tr).price(), 15);
        assert_eq!(r.last_to_act(), None);
    }

    #[test]
    fn test_finishes_when_all_owned() {
        let (mut s, mut r) = setup();
        let buys = [
            (A, "TR", 20),
            (B, "MF", 30),
            (C, "ER", 40),
            (D, "SMR", 50),
            (A, "DR", 60),
            (B, "SIR", 80),
        ];
        for (p, sym, price) in buys {
            act(&mut s, &mut r, p, buy(sym, price)).unwrap();
            assert!(!r.is_finished(&s));
        }
        act(&mut s, &mut r, C, buy("UTF", 150)).unwrap();
        assert!(r.is_finished(&s));
        assert_eq!(r.last_to_act(), Some(C));
        assert_eq!(r.current_entity(), None);
    }
}
