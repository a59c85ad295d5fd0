//! Entity identification.
//!
//! Three kinds of actors exist in a game: players, corporations and
//! private companies. Inside the engine each is identified by a small
//! `Copy` index assigned at construction (seat order, or title-data
//! order). On the wire they are always referenced by stable strings
//! (player name, corporation sym, company sym) so that an action log can
//! be replayed in a different process.
//!
//! ```
//! use rust_18xx::core::{CorporationId, EntityId, EntityType, PlayerId};
//!
//! let president = EntityId::Player(PlayerId::new(2));
//! assert_eq!(president.entity_type(), EntityType::Player);
//! assert!(EntityId::Corporation(CorporationId(0)).is_corporation());
//! ```

use serde::{Deserialize, Serialize};

use super::player::PlayerId;

/// Index of a corporation in title-data order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CorporationId(pub u8);

impl CorporationId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a private company in title-data order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CompanyId(pub u8);

impl CompanyId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Wire-level discriminator for the acting entity of an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Player,
    Corporation,
    Company,
}

/// Any actor that can own cash, shares or be the subject of an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityId {
    Player(PlayerId),
    Corporation(CorporationId),
    Company(CompanyId),
}

impl EntityId {
    #[must_use]
    pub const fn entity_type(self) -> EntityType {
        match self {
            EntityId::Player(_) => EntityType::Player,
            EntityId::Corporation(_) => EntityType::Corporation,
            EntityId::Company(_) => EntityType::Company,
        }
    }

    #[must_use]
    pub const fn as_player(self) -> Option<PlayerId> {
        match self {
            EntityId::Player(p) => Some(p),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_corporation(self) -> Option<CorporationId> {
        match self {
            EntityId::Corporation(c) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_corporation(self) -> bool {
        matches!(self, EntityId::Corporation(_))
    }

    #[must_use]
    pub const fn is_company(self) -> bool {
        matches!(self, EntityId::Company(_))
    }
}

impl From<PlayerId> for EntityId {
    fn from(id: PlayerId) -> Self {
        EntityId::Player(id)
    }
}

impl From<CorporationId> for EntityId {
    fn from(id: CorporationId) -> Self {
        EntityId::Corporation(id)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityId::Player(p) => write!(f, "{}", p),
            EntityId::Corporation(c) => write!(f, "Corporation {}", c.0),
            EntityId::Company(c) => write!(f, "Company {}", c.0),
        }
    }
}
