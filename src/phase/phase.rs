//! Phase definitions.

use serde::{Deserialize, Serialize};

use crate::tiles::TileColor;

/// Something that happens once when a phase starts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseEvent {
    /// Every train with this name rusts.
    Rust(String),
    /// Every private company without `NeverCloses` closes.
    CloseCompanies,
}

/// One phase of the game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub name: String,
    pub operating_rounds: u8,
    pub train_limit: usize,
    /// Tile colors that may be laid.
    pub tiles: Vec<TileColor>,
    /// Train whose first purchase starts this phase.
    pub on: Option<String>,
    pub events: Vec<PhaseEvent>,
    /// Corporations may buy private companies.
    pub buy_companies: bool,
}

impl Phase {
    pub fn new(name: impl Into<String>, operating_rounds: u8, train_limit: usize, tiles: &[TileColor]) -> Self {
        let name = name.into();
        Self {
            on: Some(name.clone()),
            name,
            operating_rounds,
            train_limit,
            tiles: tiles.to_vec(),
            events: Vec::new(),
            buy_companies: true,
        }
    }

    #[must_use]
    pub fn with_event(mut self, event: PhaseEvent) -> Self {
        self.events.push(event);
        self
    }

    #[must_use]
    pub fn without_company_sales(mut self) -> Self {
        self.buy_companies = false;
        self
    }

    #[must_use]
    pub fn allows(&self, color: TileColor) -> bool {
        self.tiles.contains(&color)
    }

    /// Phase-keyed revenue lookup key: the newest tile color, or
    /// `diesel` in the diesel phase.
    #[must_use]
    pub fn revenue_key(&self) -> &str {
        if self.name == "D" {
            return "diesel";
        }
        self.tiles.last().map_or("yellow", |c| c.name())
    }

    /// The usual 2/3/4/5/6/D phases.
    #[must_use]
    pub fn standard() -> Vec<Phase> {
        use TileColor::{Brown, Green, Yellow};

        vec![
            Phase::new("2", 1, 4, &[Yellow]).without_company_sales(),
            Phase::new("3", 2, 4, &[Yellow, Green]),
            Phase::new("4", 2, 3, &[Yellow, Green]).with_event(PhaseEvent::Rust("2".into())),
            Phase::new("5", 3, 2, &[Yellow, Green, Brown]).with_event(PhaseEvent::CloseCompanies),
            Phase::new("6", 3, 2, &[Yellow, Green, Brown]).with_event(PhaseEvent::Rust("3".into())),
            Phase::new("D", 3, 2, &[Yellow, Green, Brown]).with_event(PhaseEvent::Rust("4".into())),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_phases() {
        let phases = Phase::standard();
        assert_eq!(phases.len(), 6);
        assert!(!phases[0].buy_companies);
        assert!(phases[1].buy_companies);
        assert_eq!(phases[2].events, vec![PhaseEvent::Rust("2".into())]);
        assert_eq!(phases[3].train_limit, 2);
        assert!(phases[3].allows(TileColor::Brown));
        assert!(!phases[1].allows(TileColor::Brown));
        assert_eq!(phases[5].on.as_deref(), Some("D"));
    }

    #[test]
    fn test_revenue_key() {
        let phases = Phase::standard();
        assert_eq!(phases[0].revenue_key(), "yellow");
        assert_eq!(phases[4].revenue_key(), "brown");
        assert_eq!(phases[5].revenue_key(), "diesel");
    }
}
