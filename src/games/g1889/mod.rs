//! 1889: History of Shikoku Railways.
//!
//! Seven corporations, seven private companies and a small flat-layout
//! map of Shikoku with mountain and water terrain.

mod data;

use crate::board::{HexSpec, Layout};
use crate::core::GameConfig;
use crate::ledger::{Ability, AbilityKind, CompanySpec, CorporationSpec, OwnerType};
use crate::phase::Phase;
use crate::trains::TrainSpec;

use data::{BANK_CASH, CORPORATIONS, FLOAT_PERCENT, HEXES, LOCATION_NAMES, MARKET, PLAYER_COUNTS, TILES, TITLE};

/// Full configuration for 1889.
#[must_use]
pub fn config() -> GameConfig {
    let mut config = GameConfig::new(TITLE)
        .with_layout(Layout::Flat)
        .with_bank_cash(BANK_CASH)
        .with_market(MARKET.iter().map(|row| row.iter().copied()))
        .with_phases(Phase::standard())
        .with_trains(TrainSpec::standard());

    for (players, cash, cert_limit) in PLAYER_COUNTS {
        config = config.with_player_count(players, cash, cert_limit);
    }
    for (name, count) in TILES {
        config = config.with_tile(name, count);
    }
    for &(color, coordinates, tile) in HEXES {
        config = config.with_hex(HexSpec::new(color, coordinates.iter().copied(), tile));
    }
    for (coordinates, name) in LOCATION_NAMES {
        config = config.with_location_name(coordinates, name);
    }
    for company in companies() {
        config = config.with_company(company);
    }
    for (sym, name, tokens, home) in CORPORATIONS {
        config = config.with_corporation(
            CorporationSpec::new(sym, name, home)
                .with_tokens(tokens)
                .with_float_percent(FLOAT_PERCENT),
        );
    }
    config
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn companies() -> Vec<CompanySpec> {
    vec![
        CompanySpec::new("TR", "Takamatsu E-Railroad", 20, 5)
            .with_ability(Ability::new(AbilityKind::BlocksHex { hex: "K4".into() })),
        CompanySpec::new("MF", "Mitsubishi Ferry", 30, 5).with_ability(
            Ability::new(AbilityKind::TileLay {
                tiles: strings(&["437"]),
                hexes: strings(&["B11", "G10", "I12", "J9"]),
            })
            .for_owner(OwnerType::Player),
        ),
        CompanySpec::new("ER", "Ehime Railway", 40, 10)
            .with_ability(Ability::new(AbilityKind::BlocksHex { hex: "C4".into() }))
            .with_ability(
                Ability::new(AbilityKind::TileLay {
                    tiles: strings(&["12", "13", "14", "15", "205", "206"]),
                    hexes: strings(&["C4"]),
                })
                .for_owner(OwnerType::Corporation),
            ),
        CompanySpec::new("SMR", "Sumitomo Mines Railway", 50, 15).with_ability(
            Ability::new(AbilityKind::IgnoreTerrain {
                terrain: "mountain".into(),
            })
            .for_owner(OwnerType::Corporation),
        ),
        CompanySpec::new("DR", "Dougo Railway", 60, 15).with_ability(
            Ability::new(AbilityKind::Exchange {
                corporation: "IR".into(),
            })
            .for_owner(OwnerType::Player),
        ),
        CompanySpec::new("SIR", "South Iyo Railway", 80, 20).with_min_players(3),
        CompanySpec::new("UTF", "Uno-Takamsu Ferry", 150, 30)
            .with_min_players(4)
            .with_ability(Ability::new(AbilityKind::NeverCloses).for_owner(OwnerType::Player))
            .with_ability(
                Ability::new(AbilityKind::RevenueChange {
                    revenue: 50,
                    when: "5".into(),
                })
                .for_owner(OwnerType::Player),
            ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_is_valid() {
        let config = config();
        assert_eq!(config.title, "1889");
        for players in 2..=6 {
            assert!(config.validate(players).is_ok());
        }
        assert!(config.validate(7).is_err());
        assert_eq!(config.cert_limit_for(4), Some(14));
        assert_eq!(config.starting_cash_for(5), Some(390));
    }

    #[test]
    fn test_tables() {
        let config = config();
        assert_eq!(config.companies.len(), 7);
        assert_eq!(config.corporations.len(), 7);
        assert!(config.corporations.iter().all(|c| c.float_percent == 50));
        assert_eq!(config.tiles.iter().map(|(_, n)| n).sum::<usize>(), 63);
        let hexes: usize = config.hexes.iter().map(|h| h.coordinates.len()).sum();
        assert_eq!(hexes, 52);
    }
}
