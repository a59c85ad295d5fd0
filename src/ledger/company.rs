//! Private companies and their abilities.
//!
//! ## Lifecycle
//!
//! A company starts unowned, is bought by a player in the auction, may be
//! sold on to a corporation, and eventually closes (by phase event or by
//! using an exchange ability). Closing is final; closing a closed company
//! is an invariant error.
//!
//! ## Abilities
//!
//! Abilities are a closed set of variants. Each may be restricted to an
//! owner type: an ability restricted to corporations does nothing while a
//! player holds the company.

use serde::{Deserialize, Serialize};

use crate::core::{CompanyId, EngineResult, EntityId, GameError};

/// Which kind of owner an ability works for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerType {
    Player,
    Corporation,
}

/// What an ability does.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AbilityKind {
    /// No tile may be laid on `hex` while a player owns the company.
    BlocksHex { hex: String },
    /// Lay one of `tiles` on one of `hexes`, once, for free.
    TileLay { tiles: Vec<String>, hexes: Vec<String> },
    /// Exchange the company for a share of `corporation`.
    Exchange { corporation: String },
    /// The owning corporation pays no cost for `terrain`.
    IgnoreTerrain { terrain: String },
    /// Survives the close-companies event.
    NeverCloses,
    /// Revenue becomes `revenue` when phase `when` starts.
    RevenueChange { revenue: i64, when: String },
}

/// An ability with its optional owner restriction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ability {
    #[serde(flatten)]
    pub kind: AbilityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_type: Option<OwnerType>,
}

impl Ability {
    #[must_use]
    pub fn new(kind: AbilityKind) -> Self {
        Self { kind, owner_type: None }
    }

    #[must_use]
    pub fn for_owner(mut self, owner_type: OwnerType) -> Self {
        self.owner_type = Some(owner_type);
        self
    }

    /// Whether the ability works for `owner`.
    #[must_use]
    pub fn usable_by(&self, owner: EntityId) -> bool {
        match (self.owner_type, owner) {
            (None, _) => true,
            (Some(OwnerType::Player), EntityId::Player(_)) => true,
            (Some(OwnerType::Corporation), EntityId::Corporation(_)) => true,
            _ => false,
        }
    }
}

/// Static data of a private company.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanySpec {
    pub sym: String,
    pub name: String,
    pub value: i64,
    pub revenue: i64,
    pub abilities: Vec<Ability>,
    /// Only in play with at least this many players.
    pub min_players: usize,
}

impl CompanySpec {
    pub fn new(sym: impl Into<String>, name: impl Into<String>, value: i64, revenue: i64) -> Self {
        Self {
            sym: sym.into(),
            name: name.into(),
            value,
            revenue,
            abilities: Vec::new(),
            min_players: 0,
        }
    }

    #[must_use]
    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.abilities.push(ability);
        self
    }

    #[must_use]
    pub fn with_min_players(mut self, players: usize) -> Self {
        self.min_players = players;
        self
    }
}

/// A private company in play.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub sym: String,
    pub name: String,
    pub value: i64,
    pub revenue: i64,
    /// Price reduction from rounds where every player passed.
    pub discount: i64,
    pub abilities: Vec<Ability>,
    pub owner: Option<EntityId>,
    pub closed: bool,
}

impl Company {
    #[must_use]
    pub fn new(id: CompanyId, spec: &CompanySpec) -> Self {
        Self {
            id,
            sym: spec.sym.clone(),
            name: spec.name.clone(),
            value: spec.value,
            revenue: spec.revenue,
            discount: 0,
            abilities: spec.abilities.clone(),
            owner: None,
            closed: false,
        }
    }

    /// Current auction price.
    #[must_use]
    pub fn price(&self) -> i64 {
        (self.value - self.discount).max(0)
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.closed
    }

    /// Owned by a player and not closed.
    #[must_use]
    pub fn player_owned(&self) -> bool {
        self.is_open() && matches!(self.owner, Some(EntityId::Player(_)))
    }

    /// Close the company. Its abilities stop working.
    pub fn close(&mut self) -> EngineResult<()> {
        if self.closed {
            return Err(GameError::invariant(format!("{} is already closed", self.sym)));
        }
        self.closed = true;
        Ok(())
    }

    /// Abilities that currently work: the company is open, owned, and the
    /// owner type matches.
    pub fn active_abilities(&self) -> impl Iterator<Item = &AbilityKind> {
        let owner = self.owner.filter(|_| self.is_open());
        self.abilities
            .iter()
            .filter(move |a| owner.is_some_and(|o| a.usable_by(o)))
            .map(|a| &a.kind)
    }

    /// Whether any ability, usable or not, matches.
    pub fn has_ability(&self, predicate: impl Fn(&AbilityKind) -> bool) -> bool {
        self.abilities.iter().any(|a| predicate(&a.kind))
    }

    /// Remove the first ability matching `predicate`.
    pub fn remove_ability(&mut self, predicate: impl Fn(&AbilityKind) -> bool) {
        if let Some(i) = self.abilities.iter().position(|a| predicate(&a.kind)) {
            self.abilities.remove(i);
        }
    }
}
