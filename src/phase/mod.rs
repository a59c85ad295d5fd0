//! Game phases: what may be built, how many trains a corporation may own,
//! and the events that fire when a phase begins.

pub mod controller;
pub mod phase;

pub use controller::PhaseController;
pub use phase::{Phase, PhaseEvent};
