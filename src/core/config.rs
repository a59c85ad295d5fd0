//! Game configuration types.
//!
//! A title configures the engine at startup by providing:
//! - Static tables: market codes, phases, trains, tile supply, hexes,
//!   companies and corporations.
//! - Player-count tables: starting cash and certificate limit.
//! - `RuleOptions`: switches for rules that vary between titles.
//!
//! The engine never hardcodes a title's data. `GameConfig::validate` is run
//! once at construction; after that the configuration is shared read-only
//! behind an `Arc`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::board::{HexSpec, Layout};
use crate::ledger::{CompanySpec, CorporationSpec, PriceColor};
use crate::phase::Phase;
use crate::trains::TrainSpec;

use super::error::{EngineResult, GameError};

/// How the game is being played. Informational for the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Each player acts from their own session.
    #[default]
    Multi,
    /// All players share one session.
    Hotseat,
}

/// Rules that vary between titles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOptions {
    /// Skip stock-round entities that have nothing to do.
    pub auto_pass_idle: bool,

    /// Require equal town and city counts on upgrades. Titles with
    /// OO-style upgrades turn this off.
    pub strict_upgrade_counts: bool,

    /// Most a player may hold of one corporation (percent), unless the
    /// price is in a brown cell.
    pub max_percent_held: u8,

    /// Most of one corporation the market may hold (percent).
    pub market_share_limit: u8,

    /// Price colors whose certificates do not count toward the cert limit.
    pub cert_limit_exempt: Vec<PriceColor>,
}

impl Default for RuleOptions {
    fn default() -> Self {
        Self {
            auto_pass_idle: true,
            strict_upgrade_counts: true,
            max_percent_held: 60,
            market_share_limit: 50,
            cert_limit_exempt: vec![PriceColor::Yellow, PriceColor::Orange, PriceColor::Brown],
        }
    }
}

impl RuleOptions {
    #[must_use]
    pub fn with_auto_pass_idle(mut self, enabled: bool) -> Self {
        self.auto_pass_idle = enabled;
        self
    }

    #[must_use]
    pub fn with_strict_upgrade_counts(mut self, enabled: bool) -> Self {
        self.strict_upgrade_counts = enabled;
        self
    }

    #[must_use]
    pub fn with_max_percent_held(mut self, percent: u8) -> Self {
        self.max_percent_held = percent;
        self
    }

    #[must_use]
    pub fn with_market_share_limit(mut self, percent: u8) -> Self {
        self.market_share_limit = percent;
        self
    }
}

/// Complete static configuration of one title.
///
/// ## Example
///
/// ```
/// use rust_18xx::core::GameConfig;
/// use rust_18xx::games::g1889;
///
/// let config: GameConfig = g1889::config();
/// assert_eq!(config.title, "1889");
/// assert_eq!(config.cert_limit_for(4), Some(14));
/// assert!(config.validate(4).is_ok());
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameConfig {
    /// Title name, used in logs.
    pub title: String,

    /// Board orientation.
    pub layout: Layout,

    /// Initial bank cash.
    pub bank_cash: i64,

    /// Starting cash per player, keyed by player count.
    pub starting_cash: BTreeMap<usize, i64>,

    /// Certificate limit per player, keyed by player count.
    pub cert_limit: BTreeMap<usize, usize>,

    /// Stock market rows of cell codes (`100p`, `50y`, ``).
    pub market: Vec<Vec<String>>,

    /// Phases in order. The first is active at construction.
    pub phases: Vec<Phase>,

    /// Train generations in depot order.
    pub trains: Vec<TrainSpec>,

    /// Tile supply as (catalog name, count).
    pub tiles: Vec<(String, usize)>,

    /// Preprinted hexes.
    pub hexes: Vec<HexSpec>,

    /// Location names by hex coordinate.
    pub location_names: BTreeMap<String, String>,

    /// Private companies in auction order.
    pub companies: Vec<CompanySpec>,

    pub corporations: Vec<CorporationSpec>,

    /// Cost of placing a station token during an operating turn.
    pub token_cost: i64,

    pub rules: RuleOptions,
}

impl GameConfig {
    /// Create an empty configuration for a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            layout: Layout::Flat,
            bank_cash: 12_000,
            starting_cash: BTreeMap::new(),
            cert_limit: BTreeMap::new(),
            market: Vec::new(),
            phases: Phase::standard(),
            trains: TrainSpec::standard(),
            tiles: Vec::new(),
            hexes: Vec::new(),
            location_names: BTreeMap::new(),
            companies: Vec::new(),
            corporations: Vec::new(),
            token_cost: 40,
            rules: RuleOptions::default(),
        }
    }

    #[must_use]
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn with_bank_cash(mut self, cash: i64) -> Self {
        self.bank_cash = cash;
        self
    }

    /// Set starting cash and cert limit for one player count.
    #[must_use]
    pub fn with_player_count(mut self, players: usize, cash: i64, cert_limit: usize) -> Self {
        self.starting_cash.insert(players, cash);
        self.cert_limit.insert(players, cert_limit);
        self
    }

    #[must_use]
    pub fn with_market<R, C>(mut self, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        self.market = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        self
    }

    #[must_use]
    pub fn with_phases(mut self, phases: Vec<Phase>) -> Self {
        self.phases = phases;
        self
    }

    #[must_use]
    pub fn with_trains(mut self, trains: Vec<TrainSpec>) -> Self {
        self.trains = trains;
        self
    }

    /// Add copies of a catalog tile to the supply.
    #[must_use]
    pub fn with_tile(mut self, name: impl Into<String>, count: usize) -> Self {
        self.tiles.push((name.into(), count));
        self
    }

    #[must_use]
    pub fn with_hex(mut self, hex: HexSpec) -> Self {
        self.hexes.push(hex);
        self
    }

    #[must_use]
    pub fn with_location_name(mut self, coordinates: impl Into<String>, name: impl Into<String>) -> Self {
        self.location_names.insert(coordinates.into(), name.into());
        self
    }

    #[must_use]
    pub fn with_company(mut self, company: CompanySpec) -> Self {
        self.companies.push(company);
        self
    }

    #[must_use]
    pub fn with_corporation(mut self, corporation: CorporationSpec) -> Self {
        self.corporations.push(corporation);
        self
    }

    #[must_use]
    pub fn with_token_cost(mut self, cost: i64) -> Self {
        self.token_cost = cost;
        self
    }

    #[must_use]
    pub fn with_rules(mut self, rules: RuleOptions) -> Self {
        self.rules = rules;
        self
    }

    #[must_use]
    pub fn starting_cash_for(&self, players: usize) -> Option<i64> {
        self.starting_cash.get(&players).copied()
    }

    #[must_use]
    pub fn cert_limit_for(&self, players: usize) -> Option<usize> {
        self.cert_limit.get(&players).copied()
    }

    /// Check the configuration for a given player count.
    ///
    /// Tile codes and market codes are checked when the board and market
    /// are built; this covers everything that is only a table lookup.
    pub fn validate(&self, players: usize) -> EngineResult<()> {
        if self.starting_cash_for(players).is_none() || self.cert_limit_for(players).is_none() {
            return Err(GameError::config(format!(
                "{} does not support {players} players",
                self.title
            )));
        }
        if self.phases.is_empty() {
            return Err(GameError::config("no phases"));
        }
        if self.trains.is_empty() {
            return Err(GameError::config("no trains"));
        }
        if self.market.is_empty() {
            return Err(GameError::config("empty stock market"));
        }

        for (i, phase) in self.phases.iter().enumerate().skip(1) {
            let Some(on) = &phase.on else {
                return Err(GameError::config(format!("phase {} has no trigger train", phase.name)));
            };
            if !self.trains.iter().any(|t| &t.name == on) {
                return Err(GameError::config(format!(
                    "phase {} (#{i}) triggers on unknown train {on}",
                    phase.name
                )));
            }
        }

        let mut syms: Vec<&str> = self.corporations.iter().map(|c| c.sym.as_str()).collect();
        syms.sort_unstable();
        if syms.windows(2).any(|w| w[0] == w[1]) {
            return Err(GameError::config("duplicate corporation sym"));
        }

        let mut syms: Vec<&str> = self.companies.iter().map(|c| c.sym.as_str()).collect();
        syms.sort_unstable();
        if syms.windows(2).any(|w| w[0] == w[1]) {
            return Err(GameError::config("duplicate company sym"));
        }

        for corporation in &self.corporations {
            if !self.hexes.iter().any(|h| h.coordinates.contains(&corporation.coordinates)) {
                return Err(GameError::config(format!(
                    "{} home {} is not on the map",
                    corporation.sym, corporation.coordinates
                )));
            }
            if corporation.float_percent == 0 || corporation.float_percent > 100 {
                return Err(GameError::config(format!("{} float percent", corporation.sym)));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::TileColor;

    fn minimal() -> GameConfig {
        GameConfig::new("test")
            .with_player_count(2, 600, 20)
            .with_market([["100p", "110"]])
            .with_hex(HexSpec::new(TileColor::White, ["A1", "A3"], "city"))
            .with_corporation(CorporationSpec::new("XX", "Test Railway", "A1"))
    }

    #[test]
    fn test_player_count_tables() {
        let config = minimal();
        assert_eq!(config.starting_cash_for(2), Some(600));
        assert_eq!(config.cert_limit_for(2), Some(20));
        assert_eq!(config.starting_cash_for(3), None);
    }

    #[test]
    fn test_validate() {
        assert!(minimal().validate(2).is_ok());
        assert!(matches!(minimal().validate(5), Err(GameError::Config(_))));
    }

    #[test]
    fn test_validate_home_off_map() {
        let config = minimal().with_corporation(CorporationSpec::new("YY", "Lost", "Z9"));
        assert!(matches!(config.validate(2), Err(GameError::Config(_))));
    }

    #[test]
    fn test_validate_duplicate_sym() {
        let config = minimal().with_corporation(CorporationSpec::new("XX", "Again", "A3"));
        assert!(matches!(config.validate(2), Err(GameError::Config(_))));
    }

    #[test]
    fn test_rule_defaults() {
        let rules = RuleOptions::default();
        assert!(rules.auto_pass_idle);
        assert!(rules.strict_upgrade_counts);
        assert_eq!(rules.max_percent_held, 60);
        assert_eq!(rules.market_share_limit, 50);

        let rules = rules.with_auto_pass_idle(false).with_market_share_limit(60);
        assert!(!rules.auto_pass_idle);
        assert_eq!(rules.market_share_limit, 60);
    }

    #[test]
    fn test_mode_wire_names() {
        assert_eq!(serde_json::to_string(&Mode::Hotseat).unwrap(), "\"hotseat\"");
        assert_eq!(Mode::default(), Mode::Multi);
    }
}
