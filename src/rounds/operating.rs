//! Operating round: each floated corporation lays track, places tokens,
//! runs trains, pays dividends and buys trains.
//!
//! ## Steps
//!
//! A corporation's turn runs through [`Step`]s in order. An action moves
//! the turn forward to its own step; nothing moves it back. Buying trains
//! and private companies is allowed at any step except while a dividend
//! decision is pending.

use serde::Serialize;

use crate::core::{ActionKind, CompanyId, CorporationId, DividendKind, EngineResult, EntityId, GameError, Route};
use crate::game::GameState;
use crate::ledger::{AbilityKind, Movement, ShareOwner};
use crate::trains::TrainOwner;

use super::{not_allowed, Round, RoundKind};

/// Where a corporation is in its turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Step {
    Track,
    Token,
    Route,
    Dividend,
    Train,
}

#[derive(Clone, Debug, Serialize)]
pub struct OperatingRound {
    /// Position in the set of operating rounds, from 1.
    pub round_num: u8,
    entities: Vec<CorporationId>,
    current: usize,
    step: Step,
    /// Revenue of the routes run this turn.
    revenue: i64,
}

impl OperatingRound {
    /// Start an operating round. Private companies pay their owners first.
    pub fn new(state: &mut GameState, round_num: u8) -> Self {
        pay_company_revenue(state);
        Self {
            round_num,
            entities: state.operating_order(),
            current: 0,
            step: Step::Track,
            revenue: 0,
        }
    }

    #[must_use]
    pub fn step(&self) -> Step {
        self.step
    }

    /// Corporations in the order they operate.
    #[must_use]
    pub fn entities(&self) -> &[CorporationId] {
        &self.entities
    }

    fn advance_to(&mut self, step: Step) {
        self.step = self.step.max(step);
    }

    fn require_before(&self, step: Step, what: &str) -> EngineResult<()> {
        if self.step > step {
            return Err(GameError::illegal(format!("too late in the turn to {what}")));
        }
        Ok(())
    }

    fn require_no_dividend_pending(&self) -> EngineResult<()> {
        if self.step == Step::Dividend {
            return Err(GameError::illegal("a dividend decision is pending"));
        }
        Ok(())
    }

    fn lay_tile(&mut self, state: &mut GameState, corporation: CorporationId, hex_id: &str, tile_id: &str, rotation: u8) -> EngineResult<()> {
        self.require_before(Step::Track, "lay track")?;
        let hex = state.board.find_hex(hex_id)?;
        let tile = state.board.find_tile(tile_id)?;
        if state.board.hex_of_tile(tile).is_some() {
            return Err(GameError::illegal(format!("tile {tile_id} is not available")));
        }

        let old = state.board.tile_on(hex);
        let new = state.board.tile(tile);
        if !state.phase().allows(new.color) {
            return Err(GameError::illegal(format!("{} tiles are not available yet", new.color)));
        }
        let blocked = state.board.hex(hex).blockers.iter().any(|&c| state.company(c).player_owned());
        if blocked {
            return Err(GameError::illegal(format!("{hex_id} is blocked by a private company")));
        }
        if !old.upgrades_to(new, state.rules.strict_upgrade_counts) || !old.preserved_by(&new.rotated(rotation)) {
            return Err(GameError::illegal(format!("{} cannot replace {} on {hex_id}", new.name, old.name)));
        }
        if !state.board.legal_rotations(hex, tile).contains(&rotation) {
            return Err(GameError::illegal(format!("rotation {rotation} is not legal on {hex_id}")));
        }
        let home = state.corporation(corporation).coordinates == hex_id;
        if !home && state.board.reachable_hexes(corporation).binary_search(&hex).is_err() {
            return Err(GameError::illegal(format!(
                "{hex_id} is not connected to {}",
                state.corporation(corporation).sym
            )));
        }

        let cost = terrain_cost(state, corporation, hex);
        if cost > 0 {
            state.pay_bank(EntityId::Corporation(corporation), cost)?;
        }
        let name = state.board.tile(tile).name.clone();
        state.board.lay(hex, tile, rotation)?;

        let sym = &state.corporation(corporation).sym;
        let line = if cost > 0 {
            format!("{sym} spends ${cost} and lays tile #{name} with rotation {rotation} on {hex_id}")
        } else {
            format!("{sym} lays tile #{name} with rotation {rotation} on {hex_id}")
        };
        state.log.push(line);
        self.advance_to(Step::Token);
        Ok(())
    }

    fn place_token(&mut self, state: &mut GameState, corporation: CorporationId, city: &str, slot: usize) -> EngineResult<()> {
        self.require_before(Step::Token, "place a token")?;
        if state.corporation(corporation).tokens_available() == 0 {
            return Err(GameError::illegal(format!(
                "{} has no tokens left",
                state.corporation(corporation).sym
            )));
        }
        let hex = state
            .board
            .hex_of_city(city)
            .ok_or_else(|| GameError::illegal(format!("city {city} is not on the map")))?;
        if state.board.reachable_hexes(corporation).binary_search(&hex).is_err() {
            return Err(GameError::illegal(format!(
                "{} cannot reach {city}",
                state.corporation(corporation).sym
            )));
        }

        let cost = state.token_cost;
        state.pay_bank(EntityId::Corporation(corporation), cost)?;
        state.board.place_token(city, slot, corporation)?;
        state.corporation_mut(corporation).tokens_used += 1;
        state.log.push(format!(
            "{} places a token on {} for ${cost}",
            state.corporation(corporation).sym,
            state.board.hex(hex).id
        ));
        self.advance_to(Step::Route);
        Ok(())
    }

    fn run_routes(&mut self, state: &mut GameState, corporation: CorporationId, routes: &[Route]) -> EngineResult<()> {
        self.require_before(Step::Route, "run routes")?;
        if routes.is_empty() {
            return Err(GameError::illegal("no routes to run"));
        }

        let mut used = Vec::with_capacity(routes.len());
        let mut revenue = 0;
        for route in routes {
            let train = state.find_train(&route.train)?;
            if !state.depot.train(train).operated_by(corporation) {
                return Err(GameError::illegal(format!(
                    "{} does not run train {}",
                    state.corporation(corporation).sym,
                    route.train
                )));
            }
            if used.contains(&train) {
                return Err(GameError::illegal(format!("train {} runs twice", route.train)));
            }
            used.push(train);

            let check = state.board.route_stops(&route.hexes)?;
            if !check.hexes.iter().any(|&h| state.board.has_token(h, corporation)) {
                return Err(GameError::illegal(format!(
                    "route of {} has no {} token",
                    route.train,
                    state.corporation(corporation).sym
                )));
            }
            let distance = state.depot.train(train).distance as usize;
            if check.stops > distance {
                return Err(GameError::illegal(format!(
                    "train {} cannot visit {} stops",
                    route.train, check.stops
                )));
            }
            if route.revenue < 0 {
                return Err(GameError::illegal("route revenue cannot be negative"));
            }
            revenue += route.revenue;
        }

        let sym = state.corporation(corporation).sym.clone();
        for route in routes {
            let name = &state.depot.train(state.find_train(&route.train)?).name;
            let line = format!(
                "{sym} runs a {name} train for ${} ({})",
                route.revenue,
                route.hexes.join("-")
            );
            state.log.push(line);
        }
        self.revenue = revenue;
        self.advance_to(Step::Dividend);
        Ok(())
    }

    fn dividend(&mut self, state: &mut GameState, corporation: CorporationId, kind: DividendKind) -> EngineResult<()> {
        if self.step != Step::Dividend {
            return Err(GameError::illegal("no routes have been run"));
        }
        let revenue = self.revenue;
        let sym = state.corporation(corporation).sym.clone();
        match kind {
            DividendKind::Payout => {
                let per_share = revenue / 10;
                state.log.push(format!("{sym} pays out ${revenue} (${per_share} per share)"));
                for player in state.priority.clone() {
                    let percent = state.corporation(corporation).percent_of(ShareOwner::Player(player));
                    let amount = per_share * i64::from(percent) / 10;
                    if amount > 0 {
                        state.receive_from_bank(EntityId::Player(player), amount);
                        state.log.push(format!("{} receives ${amount}", state.players[player].name));
                    }
                }
                let movement = if revenue > 0 { Movement::Right } else { Movement::Left };
                state.move_price(corporation, movement);
            }
            DividendKind::Withhold => {
                state.receive_from_bank(EntityId::Corporation(corporation), revenue);
                state.log.push(format!("{sym} withholds ${revenue}"));
                state.move_price(corporation, Movement::Left);
            }
        }
        self.revenue = 0;
        self.advance_to(Step::Train);
        Ok(())
    }

    fn buy_train(&mut self, state: &mut GameState, corporation: CorporationId, id: &str, price: i64) -> EngineResult<()> {
        self.require_no_dividend_pending()?;
        let train = state.find_train(id)?;
        let limit = state.phase().train_limit;
        if state.depot.trains_of(corporation).len() >= limit {
            return Err(GameError::illegal(format!(
                "{} is at the train limit of {limit}",
                state.corporation(corporation).sym
            )));
        }

        let t = state.depot.train(train);
        let (owner, list_price, rusted) = (t.owner, t.price, t.rusted);
        let buyer = EntityId::Corporation(corporation);
        let seller = match owner {
            TrainOwner::Depot | TrainOwner::Discard => {
                if !state.depot.is_for_sale(train) {
                    return Err(GameError::illegal(format!("train {id} is not for sale")));
                }
                if price != list_price {
                    return Err(GameError::illegal(format!("train {id} costs ${list_price}")));
                }
                state.pay_bank(buyer, price)?;
                "The Depot".to_string()
            }
            TrainOwner::Corporation(other) => {
                if other == corporation || rusted {
                    return Err(GameError::illegal(format!("train {id} is not for sale")));
                }
                if price < 1 {
                    return Err(GameError::illegal("trains between corporations cost at least $1"));
                }
                state.transfer_cash(buyer, EntityId::Corporation(other), price)?;
                state.corporation(other).sym.clone()
            }
        };

        state.depot.train_mut(train).owner = TrainOwner::Corporation(corporation);
        let line = format!(
            "{} buys a {} train for ${price} from {seller}",
            state.corporation(corporation).sym,
            state.depot.train(train).name
        );
        tracing::debug!(corporation = %state.corporation(corporation).sym, train = id, price, "train bought");
        state.log.push(line);
        self.advance_to(Step::Train);
        Ok(())
    }

    fn buy_company(&mut self, state: &mut GameState, corporation: CorporationId, company: CompanyId, price: i64) -> EngineResult<()> {
        self.require_no_dividend_pending()?;
        if !state.phase().buy_companies {
            return Err(GameError::illegal("private companies cannot be bought in this phase"));
        }
        let c = state.company(company);
        let Some(EntityId::Player(owner)) = c.owner.filter(|_| c.is_open()) else {
            return Err(GameError::illegal(format!("{} is not owned by a player", c.sym)));
        };
        if price * 2 < c.value || price > c.value * 2 {
            return Err(GameError::illegal(format!(
                "{} must be bought for ${} to ${}",
                c.sym,
                (c.value + 1) / 2,
                c.value * 2
            )));
        }

        state.transfer_cash(EntityId::Corporation(corporation), EntityId::Player(owner), price)?;
        state.company_mut(company).owner = Some(EntityId::Corporation(corporation));
        state.log.push(format!(
            "{} buys {} from {} for ${price}",
            state.corporation(corporation).sym,
            state.company(company).name,
            state.players[owner].name
        ));
        Ok(())
    }

    fn pass(&mut self, state: &mut GameState, corporation: CorporationId) -> EngineResult<()> {
        self.require_no_dividend_pending()?;
        let c = state.corporation(corporation);
        let trainless = state.depot.trains_of(corporation).is_empty();
        if trainless && state.depot.cheapest_price().is_some_and(|p| p <= c.cash) {
            return Err(GameError::illegal(format!("{} must buy a train", c.sym)));
        }
        state.log.push(format!("{} passes", c.sym));

        self.current += 1;
        self.step = Step::Track;
        self.revenue = 0;
        Ok(())
    }
}

impl Round for OperatingRound {
    fn kind(&self) -> RoundKind {
        RoundKind::Operating
    }

    fn current_entity(&self) -> Option<EntityId> {
        self.entities.get(self.current).copied().map(EntityId::Corporation)
    }

    fn is_finished(&self, _state: &GameState) -> bool {
        self.current >= self.entities.len()
    }

    fn apply_action(&mut self, state: &mut GameState, entity: EntityId, action: &ActionKind) -> EngineResult<()> {
        let corporation = entity
            .as_corporation()
            .ok_or_else(|| GameError::illegal("only corporations operate"))?;
        match action {
            ActionKind::LayTile { hex, tile, rotation } => self.lay_tile(state, corporation, hex, tile, *rotation),
            ActionKind::PlaceToken { city, slot } => self.place_token(state, corporation, city, *slot),
            ActionKind::RunRoutes { routes } => self.run_routes(state, corporation, routes),
            ActionKind::Dividend { kind } => self.dividend(state, corporation, *kind),
            ActionKind::BuyTrain { train, price } => self.buy_train(state, corporation, train, *price),
            ActionKind::BuyCompany { company, price } => {
                let company = state.find_company(company)?;
                self.buy_company(state, corporation, company, *price)
            }
            ActionKind::Pass => self.pass(state, corporation),
            other => Err(not_allowed(other, RoundKind::Operating)),
        }
    }
}

/// Every open, owned private company pays its revenue to its owner.
fn pay_company_revenue(state: &mut GameState) {
    let payments: Vec<(EntityId, i64, String)> = state
        .companies
        .iter()
        .filter(|c| c.is_open() && c.revenue > 0)
        .filter_map(|c| c.owner.map(|owner| (owner, c.revenue, c.name.clone())))
        .collect();
    for (owner, revenue, name) in payments {
        state.receive_from_bank(owner, revenue);
        let line = format!("{} collects ${revenue} from {name}", state.entity_name(owner));
        state.log.push(line);
    }
}

/// Terrain cost of building on `hex`, less terrain the corporation's
/// companies let it ignore.
fn terrain_cost(state: &GameState, corporation: CorporationId, hex: usize) -> i64 {
    let owner = Some(EntityId::Corporation(corporation));
    let ignored: Vec<&str> = state
        .companies
        .iter()
        .filter(|c| c.owner == owner)
        .flat_map(|c| c.active_abilities())
        .filter_map(|a| match a {
            AbilityKind::IgnoreTerrain { terrain } => Some(terrain.as_str()),
            _ => None,
        })
        .collect();

    state
        .board
        .tile_on(hex)
        .upgrades
        .iter()
        .filter(|u| !u.terrains.iter().any(|t| ignored.contains(&t.as_str())))
        .map(|u| u.cost)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PlayerId;
    use crate::games::g1889;

    const AR: CorporationId = CorporationId(0);
    const A: PlayerId = PlayerId(0);
    const B: PlayerId = PlayerId(1);

    /// AR floated by A (60%) and B (10%).
    fn setup() -> GameState {
        let names: Vec<String> = ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect();
        let mut s = GameState::new(&g1889::config(), &names).unwrap();
        s.players[A].cash = 1000;
        s.par(A, AR, "0,3").unwrap();
        for i in 1..=4 {
            s.buy_share(A, AR, i).unwrap();
        }
        s.buy_share(B, AR, 5).unwrap();
        assert!(s.corporation(AR).floated);
        s
    }

    fn act(s: &mut GameState, r: &mut OperatingRound, action: ActionKind) -> EngineResult<()> {
        r.process(s, EntityId::Corporation(AR), &action)
    }

    fn lay(hex: &str, tile: &str, rotation: u8) -> ActionKind {
        ActionKind::LayTile {
            hex: hex.into(),
            tile: tile.into(),
            rotation,
        }
    }

    fn buy_train(train: &str, price: i64) -> ActionKind {
        ActionKind::BuyTrain {
            train: train.into(),
            price,
        }
    }

    fn run(train: &str, hexes: &[&str], revenue: i64) -> ActionKind {
        ActionKind::RunRoutes {
            routes: vec![Route {
                train: train.into(),
                hexes: hexes.iter().map(|h| h.to_string()).collect(),
                revenue,
            }],
        }
    }

    #[test]
    fn test_company_revenue_paid_at_start() {
        let mut s = setup();
        let tr = s.company_id("TR").unwrap();
        s.company_mut(tr).owner = Some(EntityId::Player(B));
        let cash = s.players[B].cash;
        let r = OperatingRound::new(&mut s, 1);
        assert_eq!(s.players[B].cash, cash + 5);
        assert!(s.log.contains("B collects $5 from Takamatsu E-Railroad"));
        assert_eq!(r.entities(), &[AR]);
    }

    #[test]
    fn test_lay_tile_on_home() {
        let mut s = setup();
        let mut r = OperatingRound::new(&mut s, 1);
        assert!(matches!(act(&mut s, &mut r, lay("K8", "57-0", 0)), Err(GameError::Illegal(_))));
        act(&mut s, &mut r, lay("K8", "57-0", 1)).unwrap();
        assert_eq!(r.step(), Step::Token);
        assert_eq!(s.board.tile_on(s.board.hex_index("K8").unwrap()).name, "57");
        assert!(s.board.city_by_id("57-0-0").unwrap().has_token_of(AR));
        assert!(s.log.contains("AR lays tile #57 with rotation 1 on K8"));

        // Once per turn.
        assert!(matches!(act(&mut s, &mut r, lay("J9", "3-0", 0)), Err(GameError::Illegal(_))));
    }

    #[test]
    fn test_lay_tile_requires_connection_and_phase_color() {
        let mut s = setup();
        let mut r = OperatingRound::new(&mut s, 1);
        assert!(matches!(act(&mut s, &mut r, lay("C8", "9-0", 0)), Err(GameError::Illegal(_))));
        assert!(matches!(act(&mut s, &mut r, lay("F9", "15-0", 0)), Err(GameError::Illegal(_))));
        assert!(matches!(act(&mut s, &mut r, lay("K8", "zz-0", 1)), Err(GameError::UnknownEntity { .. })));
    }

    #[test]
    fn test_terrain_cost_and_ignore_terrain() {
        let mut s = setup();
        let k6 = s.board.hex_index("K6").unwrap();
        assert_eq!(terrain_cost(&s, AR, k6), 80);

        let smr = s.company_id("SMR").unwrap();
        s.company_mut(smr).owner = Some(EntityId::Corporation(AR));
        let h9 = s.board.hex_index("H9").unwrap();
        assert_eq!(terrain_cost(&s, AR, h9), 0);
        assert_eq!(terrain_cost(&s, AR, k6), 80);
    }

    #[test]
    fn test_must_buy_train_before_passing() {
        let mut s = setup();
        let mut r = OperatingRound::new(&mut s, 1);
        assert!(matches!(act(&mut s, &mut r, ActionKind::Pass), Err(GameError::Illegal(_))));
        assert!(matches!(act(&mut s, &mut r, buy_train("2-1", 80)), Err(GameError::Illegal(_))));
        assert!(matches!(act(&mut s, &mut r, buy_train("2-0", 70)), Err(GameError::Illegal(_))));

        act(&mut s, &mut r, buy_train("2-0", 80)).unwrap();
        assert_eq!(s.corporation(AR).cash, 920);
        assert!(s.log.contains("AR buys a 2 train for $80 from The Depot"));
        assert_eq!(r.step(), Step::Train);

        act(&mut s, &mut r, ActionKind::Pass).unwrap();
        assert!(r.is_finished(&s));
        assert_eq!(r.current_entity(), None);
    }

    #[test]
    fn test_train_limit() {
        let mut s = setup();
        let mut r = OperatingRound::new(&mut s, 1);
        for i in 0..4 {
            act(&mut s, &mut r, buy_train(&format!("2-{i}"), 80)).unwrap();
        }
        assert!(matches!(act(&mut s, &mut r, buy_train("2-4", 80)), Err(GameError::Illegal(_))));
    }

    #[test]
    fn test_run_and_pay_out() {
        let mut s = setup();
        let mut r = OperatingRound::new(&mut s, 1);
        act(&mut s, &mut r, lay("K8", "57-0", 1)).unwrap();
        act(&mut s, &mut r, buy_train("2-0", 80)).unwrap();
        assert!(matches!(act(&mut s, &mut r, run("2-0", &["K8", "L7"], 40)), Err(GameError::Illegal(_))));

        let mut s = setup();
        let mut r = OperatingRound::new(&mut s, 1);
        let t = s.find_train("2-0").unwrap();
        s.depot.train_mut(t).owner = TrainOwner::Corporation(AR);
        act(&mut s, &mut r, lay("K8", "57-0", 1)).unwrap();
        act(&mut s, &mut r, run("2-0", &["K8", "L7"], 40)).unwrap();
        assert_eq!(r.step(), Step::Dividend);
        assert!(matches!(act(&mut s, &mut r, ActionKind::Pass), Err(GameError::Illegal(_))));
        assert!(matches!(act(&mut s, &mut r, buy_train("2-1", 80)), Err(GameError::Illegal(_))));

        let (a, b) = (s.players[A].cash, s.players[B].cash);
        act(&mut s, &mut r, ActionKind::Dividend { kind: DividendKind::Payout }).unwrap();
        assert_eq!(s.players[A].cash, a + 24);
        assert_eq!(s.players[B].cash, b + 4);
        assert_eq!(s.market_price(AR), Some(110));
    }

    #[test]
    fn test_withhold_moves_left() {
        let mut s = setup();
        let mut r = OperatingRound::new(&mut s, 1);
        let t = s.find_train("2-0").unwrap();
        s.depot.train_mut(t).owner = TrainOwner::Corporation(AR);
        act(&mut s, &mut r, lay("K8", "57-0", 1)).unwrap();
        act(&mut s, &mut r, run("2-0", &["K8", "L7"], 40)).unwrap();
        let cash = s.corporation(AR).cash;
        act(&mut s, &mut r, ActionKind::Dividend { kind: DividendKind::Withhold }).unwrap();
        assert_eq!(s.corporation(AR).cash, cash + 40);
        assert_eq!(s.market_price(AR), Some(90));
    }

    #[test]
    fn test_route_checks() {
        let mut s = setup();
        let mut r = OperatingRound::new(&mut s, 1);
        act(&mut s, &mut r, lay("K8", "57-0", 1)).unwrap();
        // Not owned.
        assert!(matches!(act(&mut s, &mut r, run("2-0", &["K8", "L7"], 40)), Err(GameError::Illegal(_))));
        let t = s.find_train("2-0").unwrap();
        s.depot.train_mut(t).owner = TrainOwner::Corporation(AR);
        // Not connected.
        assert!(matches!(act(&mut s, &mut r, run("2-0", &["K8", "K6"], 40)), Err(GameError::Illegal(_))));
        // Same train twice.
        let twice = ActionKind::RunRoutes {
            routes: vec![
                Route { train: "2-0".into(), hexes: vec!["K8".into(), "L7".into()], revenue: 40 },
                Route { train: "2-0".into(), hexes: vec!["K8".into(), "J9".into()], revenue: 20 },
            ],
        };
        assert!(matches!(act(&mut s, &mut r, twice), Err(GameError::Illegal(_))));
    }

    #[test]
    fn test_buy_company_needs_phase_and_price_range() {
        let mut s = setup();
        let dr = s.company_id("DR").unwrap();
        s.company_mut(dr).owner = Some(EntityId::Player(B));
        let mut r = OperatingRound::new(&mut s, 1);
        let buy = |price| ActionKind::BuyCompany { company: "DR".into(), price };

        assert!(matches!(act(&mut s, &mut r, buy(60)), Err(GameError::Illegal(_))));
        s.observe_train_purchase("3").unwrap();
        assert!(matches!(act(&mut s, &mut r, buy(29)), Err(GameError::Illegal(_))));
        assert!(matches!(act(&mut s, &mut r, buy(121)), Err(GameError::Illegal(_))));

        let cash = s.players[B].cash;
        act(&mut s, &mut r, buy(120)).unwrap();
        assert_eq!(s.company(dr).owner, Some(EntityId::Corporation(AR)));
        assert_eq!(s.players[B].cash, cash + 120);
    }

    #[test]
    fn test_blocked_hex() {
        let mut s = setup();
        let er = s.company_id("ER").unwrap();
        s.company_mut(er).owner = Some(EntityId::Player(B));
        s.observe_train_purchase("3").unwrap();
        let mut r = OperatingRound::new(&mut s, 1);
        match act(&mut s, &mut r, lay("C4", "14-0", 0)) {
            Err(GameError::Illegal(msg)) => assert!(msg.contains("blocked")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
