//! Public corporations.
//!
//! A corporation is floated by players buying its certificates. Its
//! certificates are one 20% president certificate and eight 10%
//! certificates; the holder of the president certificate controls it.

use serde::{Deserialize, Serialize};

use crate::core::{CorporationId, PlayerId};

use super::share::{Share, ShareOwner};

/// Static data of a corporation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorporationSpec {
    pub sym: String,
    pub name: String,
    /// Station tokens, including the home token.
    pub tokens: u8,
    /// Percent that must leave the treasury before it floats.
    pub float_percent: u8,
    /// Home hex.
    pub coordinates: String,
}

impl CorporationSpec {
    pub fn new(sym: impl Into<String>, name: impl Into<String>, coordinates: impl Into<String>) -> Self {
        Self {
            sym: sym.into(),
            name: name.into(),
            tokens: 2,
            float_percent: 60,
            coordinates: coordinates.into(),
        }
    }

    #[must_use]
    pub fn with_tokens(mut self, tokens: u8) -> Self {
        self.tokens = tokens;
        self
    }

    #[must_use]
    pub fn with_float_percent(mut self, percent: u8) -> Self {
        self.float_percent = percent;
        self
    }
}

/// A corporation in play.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corporation {
    pub id: CorporationId,
    pub sym: String,
    pub name: String,
    pub coordinates: String,
    pub float_percent: u8,
    pub tokens: u8,
    pub tokens_used: u8,
    pub cash: i64,
    pub floated: bool,
    pub par_price: Option<i64>,
    /// Current market cell `(row, column)`.
    pub share_price: Option<(usize, usize)>,
    pub shares: Vec<Share>,
}

impl Corporation {
    #[must_use]
    pub fn new(id: CorporationId, spec: &CorporationSpec) -> Self {
        let shares = std::iter::once(Share::new(&spec.sym, id, 0, 20))
            .chain((1..=8).map(|i| Share::new(&spec.sym, id, i, 10)))
            .collect();

        Self {
            id,
            sym: spec.sym.clone(),
            name: spec.name.clone(),
            coordinates: spec.coordinates.clone(),
            float_percent: spec.float_percent,
            tokens: spec.tokens,
            tokens_used: 0,
            cash: 0,
            floated: false,
            par_price: None,
            share_price: None,
            shares,
        }
    }

    #[must_use]
    pub fn is_parred(&self) -> bool {
        self.par_price.is_some()
    }

    /// Player holding the president certificate, once parred.
    #[must_use]
    pub fn president(&self) -> Option<PlayerId> {
        self.shares.iter().find(|s| s.president).and_then(|s| s.owner.player())
    }

    #[must_use]
    pub fn percent_of(&self, owner: ShareOwner) -> u8 {
        self.shares
            .iter()
            .filter(|s| s.owner == owner)
            .map(|s| s.percent)
            .sum()
    }

    #[must_use]
    pub fn player_percent(&self, player: PlayerId) -> u8 {
        self.percent_of(ShareOwner::Player(player))
    }

    /// Percent held by all players together.
    #[must_use]
    pub fn player_held_percent(&self) -> u8 {
        self.shares
            .iter()
            .filter(|s| matches!(s.owner, ShareOwner::Player(_)))
            .map(|s| s.percent)
            .sum()
    }

    /// Percent that has left the treasury.
    #[must_use]
    pub fn sold_percent(&self) -> u8 {
        100 - self.percent_of(ShareOwner::Treasury)
    }

    /// Certificates held by `owner`, in index order.
    pub fn shares_of(&self, owner: ShareOwner) -> impl Iterator<Item = &Share> {
        self.shares.iter().filter(move |s| s.owner == owner)
    }

    #[must_use]
    pub fn share_index(&self, id: &str) -> Option<usize> {
        self.shares.iter().position(|s| s.id == id)
    }

    #[must_use]
    pub fn tokens_available(&self) -> u8 {
        self.tokens.saturating_sub(self.tokens_used)
    }
}
