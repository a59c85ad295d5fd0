//! Phase progression and phase events.

use serde::{Deserialize, Serialize};

use crate::core::EngineResult;
use crate::game::GameState;
use crate::ledger::AbilityKind;

use super::phase::{Phase, PhaseEvent};

/// Ordered phases and the index of the current one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseController {
    phases: Vec<Phase>,
    index: usize,
}

impl PhaseController {
    #[must_use]
    pub fn new(phases: Vec<Phase>) -> Self {
        Self { phases, index: 0 }
    }

    #[must_use]
    pub fn current(&self) -> &Phase {
        &self.phases[self.index]
    }

    #[must_use]
    pub fn next(&self) -> Option<&Phase> {
        self.phases.get(self.index + 1)
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    fn advance(&mut self) -> bool {
        if self.index + 1 < self.phases.len() {
            self.index += 1;
            true
        } else {
            false
        }
    }
}

impl GameState {
    /// Check whether buying `train_name` starts the next phase, and set it
    /// up if so.
    pub fn observe_train_purchase(&mut self, train_name: &str) -> EngineResult<()> {
        let starts_next = self
            .phase
            .next()
            .is_some_and(|next| next.on.as_deref() == Some(train_name));
        if starts_next && self.phase.advance() {
            self.setup_phase()?;
        }
        Ok(())
    }

    /// Announce the current phase and run its events.
    pub(crate) fn setup_phase(&mut self) -> EngineResult<()> {
        let phase = self.phase.current().clone();
        let tiles = phase
            .tiles
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        tracing::info!(phase = %phase.name, "phase change");
        self.log.push(format!(
            "-- Phase {} (Operating Rounds: {}, Train Limit: {}, Available Tiles: {}) --",
            phase.name, phase.operating_rounds, phase.train_limit, tiles
        ));

        for event in &phase.events {
            match event {
                PhaseEvent::Rust(name) => {
                    self.log.push(format!("-- Event: {name} trains rust --"));
                    let lost = self.depot.rust(name);
                    tracing::debug!(train = %name, lost, "trains rusted");
                }
                PhaseEvent::CloseCompanies => self.close_companies()?,
            }
        }

        self.apply_revenue_changes(&phase.name);
        self.enforce_train_limit();
        Ok(())
    }

    fn close_companies(&mut self) -> EngineResult<()> {
        self.log.push("-- Event: private companies close --");
        for company in self.companies.iter_mut() {
            if company.closed || company.active_abilities().any(|a| matches!(a, AbilityKind::NeverCloses)) {
                continue;
            }
            company.close()?;
        }
        Ok(())
    }

    fn apply_revenue_changes(&mut self, phase: &str) {
        for company in self.companies.iter_mut().filter(|c| c.is_open()) {
            let change = company.abilities.iter().find_map(|a| match &a.kind {
                AbilityKind::RevenueChange { revenue, when } if when == phase => Some(*revenue),
                _ => None,
            });
            if let Some(revenue) = change {
                company.revenue = revenue;
            }
        }
    }

    /// Discard trains over the phase limit, cheapest first.
    fn enforce_train_limit(&mut self) {
        let limit = self.phase.current().train_limit;
        for i in 0..self.corporations.len() {
            let corporation = self.corporations[i].id;
            let mut owned = self.depot.trains_of(corporation);
            if owned.len() <= limit {
                continue;
            }
            owned.sort_by_key(|&t| self.depot.train(t).price);
            for &train in &owned[..owned.len() - limit] {
                let line = format!(
                    "{} discards a {} train",
                    self.corporations[i].sym,
                    self.depot.train(train).name
                );
                self.depot.discard(train);
                self.log.push(line);
            }
        }
    }
}
