//! Trains and the depot that sells them.

pub mod depot;
pub mod train;

pub use depot::Depot;
pub use train::{Train, TrainOwner, TrainSpec};
