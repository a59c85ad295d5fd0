//! Trains.

use serde::{Deserialize, Serialize};

use crate::core::CorporationId;

/// One train generation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainSpec {
    pub name: String,
    /// Stops the train may count.
    pub distance: u32,
    pub price: i64,
    /// Copies in the depot.
    pub count: usize,
}

impl TrainSpec {
    pub fn new(name: impl Into<String>, distance: u32, price: i64, count: usize) -> Self {
        Self {
            name: name.into(),
            distance,
            price,
            count,
        }
    }

    /// The usual 2/3/4/5/6/D roster.
    #[must_use]
    pub fn standard() -> Vec<TrainSpec> {
        vec![
            TrainSpec::new("2", 2, 80, 6),
            TrainSpec::new("3", 3, 180, 5),
            TrainSpec::new("4", 4, 300, 4),
            TrainSpec::new("5", 5, 450, 3),
            TrainSpec::new("6", 6, 630, 2),
            TrainSpec::new("D", 999, 1100, 20),
        ]
    }
}

/// Where a train is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrainOwner {
    /// Not yet sold.
    Depot,
    /// Discarded over a train limit; for sale again at face value.
    Discard,
    Corporation(CorporationId),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Train {
    /// `NAME-N`.
    pub id: String,
    pub name: String,
    pub distance: u32,
    pub price: i64,
    pub owner: TrainOwner,
    pub rusted: bool,
}

impl Train {
    #[must_use]
    pub fn new(spec: &TrainSpec, index: usize) -> Self {
        Self {
            id: format!("{}-{}", spec.name, index),
            name: spec.name.clone(),
            distance: spec.distance,
            price: spec.price,
            owner: TrainOwner::Depot,
            rusted: false,
        }
    }

    /// Owned by `corporation` and still running.
    #[must_use]
    pub fn operated_by(&self, corporation: CorporationId) -> bool {
        !self.rusted && self.owner == TrainOwner::Corporation(corporation)
    }
}
