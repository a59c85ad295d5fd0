//! Share certificates.

use serde::{Deserialize, Serialize};

use crate::core::{CorporationId, PlayerId};

/// Who holds a certificate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShareOwner {
    /// Unsold, held by the corporation (IPO).
    Treasury,
    /// Sold back to the open market.
    Market,
    Player(PlayerId),
}

impl ShareOwner {
    #[must_use]
    pub fn player(self) -> Option<PlayerId> {
        match self {
            ShareOwner::Player(p) => Some(p),
            _ => None,
        }
    }
}

/// One certificate of a corporation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    /// `SYM_N`.
    pub id: String,
    pub corporation: CorporationId,
    pub index: u8,
    pub percent: u8,
    pub president: bool,
    pub owner: ShareOwner,
}

impl Share {
    #[must_use]
    pub fn new(sym: &str, corporation: CorporationId, index: u8, percent: u8) -> Self {
        Self {
            id: format!("{sym}_{index}"),
            corporation,
            index,
            percent,
            president: index == 0,
            owner: ShareOwner::Treasury,
        }
    }

    /// Price of this certificate given a per-10% price.
    #[must_use]
    pub fn price_at(&self, price: i64) -> i64 {
        price * i64::from(self.percent) / 10
    }
}
