//! The train depot.
//!
//! Trains are sold strictly in roster order: only the first unsold train
//! is on offer, plus anything in the discard pool.

use serde::{Deserialize, Serialize};

use crate::core::CorporationId;

use super::train::{Train, TrainOwner, TrainSpec};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Depot {
    trains: Vec<Train>,
}

impl Depot {
    #[must_use]
    pub fn new(specs: &[TrainSpec]) -> Self {
        let trains = specs
            .iter()
            .flat_map(|spec| (0..spec.count).map(move |i| Train::new(spec, i)))
            .collect();
        Self { trains }
    }

    #[must_use]
    pub fn trains(&self) -> &[Train] {
        &self.trains
    }

    #[must_use]
    pub fn train(&self, index: usize) -> &Train {
        &self.trains[index]
    }

    pub fn train_mut(&mut self, index: usize) -> &mut Train {
        &mut self.trains[index]
    }

    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.trains.iter().position(|t| t.id == id)
    }

    /// The first unsold train.
    #[must_use]
    pub fn next_available(&self) -> Option<usize> {
        self.trains
            .iter()
            .position(|t| t.owner == TrainOwner::Depot && !t.rusted)
    }

    /// Indices of discarded trains.
    pub fn discarded(&self) -> impl Iterator<Item = usize> + '_ {
        self.trains
            .iter()
            .enumerate()
            .filter(|(_, t)| t.owner == TrainOwner::Discard && !t.rusted)
            .map(|(i, _)| i)
    }

    /// Whether the depot will sell train `index` now.
    #[must_use]
    pub fn is_for_sale(&self, index: usize) -> bool {
        let train = &self.trains[index];
        !train.rusted
            && match train.owner {
                TrainOwner::Depot => self.next_available() == Some(index),
                TrainOwner::Discard => true,
                TrainOwner::Corporation(_) => false,
            }
    }

    /// Cheapest price the depot will sell a train for.
    #[must_use]
    pub fn cheapest_price(&self) -> Option<i64> {
        self.next_available()
            .into_iter()
            .chain(self.discarded())
            .map(|i| self.trains[i].price)
            .min()
    }

    /// Running trains of a corporation, in roster order.
    #[must_use]
    pub fn trains_of(&self, corporation: CorporationId) -> Vec<usize> {
        self.trains
            .iter()
            .enumerate()
            .filter(|(_, t)| t.operated_by(corporation))
            .map(|(i, _)| i)
            .collect()
    }

    /// Rust every train named `name`. Returns how many corporation-owned
    /// trains were lost.
    pub fn rust(&mut self, name: &str) -> usize {
        let mut lost = 0;
        for train in self.trains.iter_mut().filter(|t| t.name == name && !t.rusted) {
            train.rusted = true;
            if matches!(train.owner, TrainOwner::Corporation(_)) {
                lost += 1;
            }
        }
        lost
    }

    /// Move a train to the discard pool.
    pub fn discard(&mut self, index: usize) {
        self.trains[index].owner = TrainOwner::Discard;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depot() -> Depot {
        Depot::new(&[TrainSpec::new("2", 2, 80, 2), TrainSpec::new("3", 3, 180, 1)])
    }

    #[test]
    fn test_sold_in_order() {
        let mut depot = depot();
        assert_eq!(depot.next_available(), Some(0));
        assert!(depot.is_for_sale(0));
        assert!(!depot.is_for_sale(1));

        depot.train_mut(0).owner = TrainOwner::Corporation(CorporationId(0));
        assert_eq!(depot.next_available(), Some(1));
        assert_eq!(depot.position("3-0"), Some(2));
    }

    #[test]
    fn test_discard_pool() {
        let mut depot = depot();
        depot.train_mut(0).owner = TrainOwner::Corporation(CorporationId(0));
        depot.train_mut(1).owner = TrainOwner::Corporation(CorporationId(0));
        depot.train_mut(2).owner = TrainOwner::Corporation(CorporationId(0));
        assert_eq!(depot.cheapest_price(), None);

        depot.discard(1);
        assert!(depot.is_for_sale(1));
        assert_eq!(depot.cheapest_price(), Some(80));
        assert_eq!(depot.trains_of(CorporationId(0)), vec![0, 2]);
    }

    #[test]
    fn test_rust() {
        let mut depot = depot();
        depot.train_mut(0).owner = TrainOwner::Corporation(CorporationId(1));
        assert_eq!(depot.rust("2"), 1);
        assert!(depot.trains_of(CorporationId(1)).is_empty());
        assert!(!depot.is_for_sale(1));
        assert_eq!(depot.rust("2"), 0);
    }
}
