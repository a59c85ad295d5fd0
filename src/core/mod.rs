//! Core engine types: entities, players, actions, configuration, errors
//! and the narrative log.
//!
//! This module contains the building blocks that are title-agnostic.
//! Titles configure these via `GameConfig` rather than modifying the core.

pub mod action;
pub mod config;
pub mod entity;
pub mod error;
pub mod log;
pub mod player;

pub use action::{Action, ActionKind, DividendKind, Route, ACTION_TYPES};
pub use config::{GameConfig, Mode, RuleOptions};
pub use entity::{CompanyId, CorporationId, EntityId, EntityType};
pub use error::{EngineResult, GameError};
pub use log::GameLog;
pub use player::{Player, PlayerId, PlayerMap};
