//! Game state: everything the rounds read and mutate.
//!
//! ## Structure
//!
//! `GameState` owns the ledger (players, corporations, companies, market,
//! bank), the board, the depot, the phase controller and the narrative
//! log. The active round lives next to it in `Game`, so a round can take
//! `&mut GameState` while it is itself borrowed mutably.
//!
//! ## Lookup caches
//!
//! Stable string ids (player names, syms, share and train ids) resolve
//! through maps built once at construction. They are not part of the
//! serialized snapshot.

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::board::{Board, Layout};
use crate::core::{
    CompanyId, CorporationId, EngineResult, EntityId, EntityType, GameConfig, GameError, GameLog, Player,
    PlayerId, PlayerMap, RuleOptions,
};
use crate::ledger::{
    AbilityKind, Bank, Company, Corporation, Movement, ShareOwner, StockMarket,
};
use crate::phase::{Phase, PhaseController};
use crate::tiles::{catalog, Tile};
use crate::trains::Depot;

#[derive(Clone, Debug, Default)]
struct Lookup {
    players: FxHashMap<String, PlayerId>,
    corporations: FxHashMap<String, CorporationId>,
    companies: FxHashMap<String, CompanyId>,
    /// Share id -> (corporation, index into its certificates).
    shares: FxHashMap<String, (CorporationId, usize)>,
    trains: FxHashMap<String, usize>,
}

/// Complete mutable state of a game, minus the active round.
#[derive(Clone, Debug, Serialize)]
pub struct GameState {
    pub turn: u32,
    /// Operating rounds in the current set, fixed when the set starts.
    pub operating_rounds: u8,
    pub players: PlayerMap<Player>,
    /// Seat order for the next auction or stock round.
    pub priority: Vec<PlayerId>,
    pub bank: Bank,
    pub corporations: Vec<Corporation>,
    pub companies: Vec<Company>,
    pub market: StockMarket,
    pub board: Board,
    pub depot: Depot,
    pub phase: PhaseController,
    pub cert_limit: usize,
    pub token_cost: i64,
    /// Per-10% price of certificates of corporations that are not parred.
    pub min_price: i64,
    pub rules: RuleOptions,
    pub log: GameLog,
    #[serde(skip)]
    lookup: Lookup,
}

impl GameState {
    /// Set up a new game for the given player names.
    pub fn new(config: &GameConfig, names: &[String]) -> EngineResult<Self> {
        let player_count = names.len();
        if player_count == 0 {
            return Err(GameError::config("a game needs players"));
        }
        config.validate(player_count)?;

        let mut lookup = Lookup::default();
        for (i, name) in names.iter().enumerate() {
            if lookup.players.insert(name.clone(), PlayerId(i as u8)).is_some() {
                return Err(GameError::config(format!("player name {name} is not unique")));
            }
        }
        let players = PlayerMap::from_vec(
            names
                .iter()
                .enumerate()
                .map(|(i, name)| Player::new(PlayerId(i as u8), name.clone()))
                .collect(),
        );

        let companies: Vec<Company> = config
            .companies
            .iter()
            .filter(|spec| spec.min_players <= player_count)
            .enumerate()
            .map(|(i, spec)| Company::new(CompanyId(i as u8), spec))
            .collect();

        let market = StockMarket::new(&config.market)?;
        let corporations: Vec<Corporation> = config
            .corporations
            .iter()
            .enumerate()
            .map(|(i, spec)| Corporation::new(CorporationId(i as u8), spec))
            .collect();

        let supply = config
            .tiles
            .iter()
            .flat_map(|(name, count)| (0..*count).map(move |i| (name, i)))
            .map(|(name, i)| Tile::for_name(name).map(|t| t.with_index(i)))
            .collect::<EngineResult<Vec<_>>>()?;
        let board = build_board(config, supply)?;

        for company in &companies {
            lookup.companies.insert(company.sym.clone(), company.id);
        }
        for corporation in &corporations {
            lookup.corporations.insert(corporation.sym.clone(), corporation.id);
            for (i, share) in corporation.shares.iter().enumerate() {
                lookup.shares.insert(share.id.clone(), (corporation.id, i));
            }
        }
        let depot = Depot::new(&config.trains);
        for (i, train) in depot.trains().iter().enumerate() {
            lookup.trains.insert(train.id.clone(), i);
        }

        let phase = PhaseController::new(config.phases.clone());
        let mut state = Self {
            turn: 1,
            operating_rounds: 1,
            players,
            priority: PlayerId::all(player_count).collect(),
            bank: Bank::new(config.bank_cash),
            min_price: market.min_par_price(),
            corporations,
            companies,
            market,
            board,
            depot,
            phase,
            cert_limit: config.cert_limit_for(player_count).unwrap_or_default(),
            token_cost: config.token_cost,
            rules: config.rules.clone(),
            log: GameLog::new(),
            lookup,
        };

        state.place_blockers_and_homes()?;

        let cash = config.starting_cash_for(player_count).unwrap_or_default();
        for player in PlayerId::all(player_count) {
            state.receive_from_bank(EntityId::Player(player), cash);
        }

        state.setup_phase()?;
        state.operating_rounds = state.phase().operating_rounds;
        Ok(state)
    }

    fn place_blockers_and_homes(&mut self) -> EngineResult<()> {
        let blockers: Vec<(CompanyId, String)> = self
            .companies
            .iter()
            .flat_map(|c| {
                c.abilities.iter().filter_map(move |a| match &a.kind {
                    AbilityKind::BlocksHex { hex } => Some((c.id, hex.clone())),
                    _ => None,
                })
            })
            .collect();
        for (company, hex) in blockers {
            let hex = self.board.hex_index(&hex).ok_or_else(|| {
                GameError::config(format!("blocked hex {hex} is not on the map"))
            })?;
            self.board.add_blocker(hex, company);
        }

        for i in 0..self.corporations.len() {
            let hex = self.board.find_hex(&self.corporations[i].coordinates)?;
            self.board.reserve_home(hex, self.corporations[i].id)?;
        }
        Ok(())
    }

    // === Lookup ===

    #[must_use]
    pub fn player_id(&self, name: &str) -> Option<PlayerId> {
        self.lookup.players.get(name).copied()
    }

    #[must_use]
    pub fn corporation_id(&self, sym: &str) -> Option<CorporationId> {
        self.lookup.corporations.get(sym).copied()
    }

    #[must_use]
    pub fn company_id(&self, sym: &str) -> Option<CompanyId> {
        self.lookup.companies.get(sym).copied()
    }

    /// Corporation and certificate index of a share id.
    #[must_use]
    pub fn share_location(&self, id: &str) -> Option<(CorporationId, usize)> {
        self.lookup.shares.get(id).copied()
    }

    #[must_use]
    pub fn train_index(&self, id: &str) -> Option<usize> {
        self.lookup.trains.get(id).copied()
    }

    pub fn find_corporation(&self, sym: &str) -> EngineResult<CorporationId> {
        self.corporation_id(sym).ok_or_else(|| GameError::unknown("corporation", sym))
    }

    pub fn find_company(&self, sym: &str) -> EngineResult<CompanyId> {
        self.company_id(sym).ok_or_else(|| GameError::unknown("company", sym))
    }

    pub fn find_share(&self, id: &str) -> EngineResult<(CorporationId, usize)> {
        self.share_location(id).ok_or_else(|| GameError::unknown("share", id))
    }

    pub fn find_train(&self, id: &str) -> EngineResult<usize> {
        self.train_index(id).ok_or_else(|| GameError::unknown("train", id))
    }

    /// Resolve the acting entity of an action.
    pub fn resolve_entity(&self, entity_type: EntityType, id: &str) -> EngineResult<EntityId> {
        match entity_type {
            EntityType::Player => self
                .player_id(id)
                .map(EntityId::Player)
                .ok_or_else(|| GameError::unknown("player", id)),
            EntityType::Corporation => self.find_corporation(id).map(EntityId::Corporation),
            EntityType::Company => self.find_company(id).map(EntityId::Company),
        }
    }

    // === Access ===

    #[must_use]
    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id]
    }

    #[must_use]
    pub fn corporation(&self, id: CorporationId) -> &Corporation {
        &self.corporations[id.index()]
    }

    pub fn corporation_mut(&mut self, id: CorporationId) -> &mut Corporation {
        &mut self.corporations[id.index()]
    }

    #[must_use]
    pub fn company(&self, id: CompanyId) -> &Company {
        &self.companies[id.index()]
    }

    pub fn company_mut(&mut self, id: CompanyId) -> &mut Company {
        &mut self.companies[id.index()]
    }

    #[must_use]
    pub fn phase(&self) -> &Phase {
        self.phase.current()
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.player_count()
    }

    /// Display name of any entity: player name or sym.
    #[must_use]
    pub fn entity_name(&self, entity: EntityId) -> &str {
        match entity {
            EntityId::Player(p) => &self.players[p].name,
            EntityId::Corporation(c) => &self.corporation(c).sym,
            EntityId::Company(c) => &self.company(c).sym,
        }
    }

    #[must_use]
    pub fn all_companies_owned(&self) -> bool {
        self.companies.iter().all(|c| c.owner.is_some() || c.closed)
    }

    // === Cash ===

    #[must_use]
    pub fn cash_of(&self, entity: EntityId) -> i64 {
        match entity {
            EntityId::Player(p) => self.players[p].cash,
            EntityId::Corporation(c) => self.corporation(c).cash,
            EntityId::Company(_) => 0,
        }
    }

    fn cash_mut(&mut self, entity: EntityId) -> EngineResult<&mut i64> {
        match entity {
            EntityId::Player(p) => Ok(&mut self.players[p].cash),
            EntityId::Corporation(c) => Ok(&mut self.corporations[c.index()].cash),
            EntityId::Company(c) => Err(GameError::invariant(format!("company {} holds no cash", c.0))),
        }
    }

    /// Pay `amount` to the bank. Fails if `from` cannot afford it.
    pub fn pay_bank(&mut self, from: EntityId, amount: i64) -> EngineResult<()> {
        self.spend(from, amount)?;
        self.bank.receive(amount);
        Ok(())
    }

    /// Move cash between two entities.
    pub fn transfer_cash(&mut self, from: EntityId, to: EntityId, amount: i64) -> EngineResult<()> {
        self.spend(from, amount)?;
        *self.cash_mut(to)? += amount;
        Ok(())
    }

    fn spend(&mut self, from: EntityId, amount: i64) -> EngineResult<()> {
        let available = self.cash_of(from);
        if available < amount {
            return Err(GameError::illegal(format!(
                "{} has ${available} and cannot pay ${amount}",
                self.entity_name(from)
            )));
        }
        *self.cash_mut(from)? -= amount;
        Ok(())
    }

    /// Pay `amount` from the bank. The bank may go negative; breaking is
    /// logged once.
    pub fn receive_from_bank(&mut self, to: EntityId, amount: i64) {
        match to {
            EntityId::Player(p) => self.players[p].cash += amount,
            EntityId::Corporation(c) => self.corporations[c.index()].cash += amount,
            EntityId::Company(_) => return,
        }
        if self.bank.spend(amount) {
            tracing::warn!(cash = self.bank.cash, "bank broken");
            self.log.push("-- The bank has broken --");
        }
    }

    // === Shares and prices ===

    /// Price of a certificate from `owner`'s side: par while in the
    /// treasury, otherwise the market price.
    #[must_use]
    pub fn share_cost(&self, corporation: CorporationId, share: usize) -> i64 {
        let c = self.corporation(corporation);
        let share = &c.shares[share];
        let per_ten = match share.owner {
            ShareOwner::Treasury => c.par_price,
            _ => self.market.price_of(c),
        };
        share.price_at(per_ten.unwrap_or(self.min_price))
    }

    /// Current market price per 10%, if parred.
    #[must_use]
    pub fn market_price(&self, corporation: CorporationId) -> Option<i64> {
        self.market.price_of(self.corporation(corporation))
    }

    /// Certificates counting toward `player`'s limit.
    #[must_use]
    pub fn certificate_count(&self, player: PlayerId) -> usize {
        self.corporations
            .iter()
            .filter(|c| !self.cert_limit_exempt(c.id))
            .map(|c| c.shares_of(ShareOwner::Player(player)).count())
            .sum()
    }

    /// The corporation's price color is exempt from the cert limit.
    #[must_use]
    pub fn cert_limit_exempt(&self, corporation: CorporationId) -> bool {
        let c = self.corporation(corporation);
        c.share_price
            .and_then(|p| self.market.cell(p))
            .is_some_and(|cell| self.rules.cert_limit_exempt.contains(&cell.color))
    }

    /// Move a corporation's price and log the change.
    pub fn move_price(&mut self, corporation: CorporationId, movement: Movement) {
        let before = self.market_price(corporation);
        let c = &mut self.corporations[corporation.index()];
        if !self.market.shift(c, movement) {
            return;
        }
        let after = self.market_price(corporation);
        if let (Some(before), Some(after)) = (before, after) {
            let line = format!(
                "{}'s share price changes from ${before} to ${after}",
                self.corporation(corporation).sym
            );
            tracing::debug!(corporation = %self.corporation(corporation).sym, before, after, "price moved");
            self.log.push(line);
        }
    }

    /// Floated corporations in operating order: highest price first, then
    /// rightmost column, then earliest arrival in the cell.
    #[must_use]
    pub fn operating_order(&self) -> Vec<CorporationId> {
        let mut floated: Vec<&Corporation> = self.corporations.iter().filter(|c| c.floated).collect();
        floated.sort_by_key(|c| {
            let price = self.market.price_of(c).unwrap_or(0);
            let column = c.share_price.map_or(0, |(_, col)| col);
            (std::cmp::Reverse(price), std::cmp::Reverse(column), self.market.position_in_cell(c))
        });
        floated.into_iter().map(|c| c.id).collect()
    }

    /// Seat distance from `from` to `to`, walking forward in priority
    /// order.
    #[must_use]
    pub fn seat_distance(&self, from: PlayerId, to: PlayerId) -> usize {
        let n = self.priority.len();
        let a = self.priority.iter().position(|&p| p == from).unwrap_or(0);
        let b = self.priority.iter().position(|&p| p == to).unwrap_or(0);
        (b + n - a) % n
    }

    /// Rotate priority so the seat after `last` goes first.
    pub fn rotate_players(&mut self, last: PlayerId) {
        if let Some(i) = self.priority.iter().position(|&p| p == last) {
            self.priority.rotate_left(i + 1);
        }
    }

    #[must_use]
    pub fn layout(&self) -> Layout {
        self.board.layout()
    }
}

/// Preprinted hexes with names, and the supply, on one board.
fn build_board(config: &GameConfig, supply: Vec<Tile>) -> EngineResult<Board> {
    let mut hexes = Vec::new();
    for spec in &config.hexes {
        for coordinates in &spec.coordinates {
            let tile = match catalog::lookup(&spec.tile) {
                Some(_) => Tile::for_name(&spec.tile)?,
                None => Tile::from_code(coordinates.clone(), spec.color, &spec.tile)?,
            };
            hexes.push((coordinates.clone(), tile.preprinted_at(coordinates)));
        }
    }

    let mut board = Board::new(config.layout, hexes, supply)?;
    for (coordinates, name) in &config.location_names {
        if let Some(hex) = board.hex_index(coordinates) {
            board.set_location_name(hex, name.clone());
        }
    }
    Ok(board)
}
