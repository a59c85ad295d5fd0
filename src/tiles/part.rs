//! Tile parts: the stops, track and markings printed on a tile.
//!
//! ## Stops
//!
//! `City`, `Town` and `Offboard` are revenue locations. Cities carry token
//! slots and per-slot home reservations. Each city and town has a *local
//! id* (the `id:` parameter of its clause) that identifies it across
//! upgrades: a green tile's city 0 continues the yellow tile's city 0.
//!
//! ## Track
//!
//! A `Path` joins two endpoints. An endpoint is a tile edge (0-5, before
//! rotation), a stop on the same tile, or the tile's single junction.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{CorporationId, EngineResult, GameError};

/// Revenue printed on a stop.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Revenue {
    /// A single value.
    Flat(i64),
    /// Several values separated by `/`.
    List(Vec<i64>),
    /// Values keyed by phase color, e.g. `yellow_30|brown_60`.
    Phased(Vec<(String, i64)>),
}

impl Revenue {
    /// Parse a revenue parameter.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let number = |s: &str| {
            s.trim()
                .parse::<i64>()
                .map_err(|_| format!("bad revenue `{s}`"))
        };

        if raw.contains('|') || raw.contains('_') {
            let phased = raw
                .split('|')
                .map(|entry| {
                    let (key, value) = entry
                        .split_once('_')
                        .ok_or_else(|| format!("bad phased revenue `{entry}`"))?;
                    Ok((key.to_string(), number(value)?))
                })
                .collect::<Result<Vec<_>, String>>()?;
            Ok(Revenue::Phased(phased))
        } else if raw.contains('/') {
            Ok(Revenue::List(raw.split('/').map(number).collect::<Result<_, _>>()?))
        } else {
            Ok(Revenue::Flat(number(raw)?))
        }
    }

    /// Largest printed value.
    #[must_use]
    pub fn max(&self) -> i64 {
        match self {
            Revenue::Flat(v) => *v,
            Revenue::List(values) => values.iter().copied().max().unwrap_or(0),
            Revenue::Phased(values) => values.iter().map(|(_, v)| *v).max().unwrap_or(0),
        }
    }

    /// Value for a phase key (`yellow`, `brown`, ...). Flat and list
    /// revenues ignore the key.
    #[must_use]
    pub fn for_key(&self, key: &str) -> i64 {
        match self {
            Revenue::Flat(v) => *v,
            Revenue::List(values) => values.first().copied().unwrap_or(0),
            Revenue::Phased(values) => values
                .iter()
                .find(|(k, _)| k == key)
                .or_else(|| values.first())
                .map_or(0, |(_, v)| *v),
        }
    }
}

impl Default for Revenue {
    fn default() -> Self {
        Revenue::Flat(0)
    }
}

/// A city: revenue location with token slots.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct City {
    pub local_id: u8,
    pub revenue: Revenue,
    pub slots: usize,
    /// One entry per slot.
    pub tokens: SmallVec<[Option<CorporationId>; 4]>,
    /// Home reservations; entry `i` reserves slot `i`.
    pub reservations: SmallVec<[CorporationId; 2]>,
}

impl City {
    #[must_use]
    pub fn new(revenue: Revenue, slots: usize, local_id: u8) -> Self {
        Self {
            local_id,
            revenue,
            slots,
            tokens: SmallVec::from_elem(None, slots),
            reservations: SmallVec::new(),
        }
    }

    pub fn add_reservation(&mut self, corporation: CorporationId) {
        self.reservations.push(corporation);
    }

    /// Slot reserved for `corporation`, if any.
    #[must_use]
    pub fn reservation_of(&self, corporation: CorporationId) -> Option<usize> {
        self.reservations.iter().position(|&c| c == corporation)
    }

    #[must_use]
    pub fn has_token_of(&self, corporation: CorporationId) -> bool {
        self.tokens.iter().any(|t| *t == Some(corporation))
    }

    /// The slot a token of `corporation` would go into: its reservation,
    /// otherwise the first empty unreserved slot.
    #[must_use]
    pub fn slot_for(&self, corporation: CorporationId) -> Option<usize> {
        self.reservation_of(corporation).or_else(|| {
            self.tokens
                .iter()
                .enumerate()
                .position(|(i, t)| t.is_none() && self.reservations.get(i).is_none())
        })
    }

    /// Put a token of `corporation` into `slot`.
    ///
    /// Whether the corporation has a token left is the caller's concern.
    pub fn place_token(&mut self, slot: usize, corporation: CorporationId) -> EngineResult<()> {
        let Some(current) = self.tokens.get(slot) else {
            return Err(GameError::illegal(format!("city has no slot {slot}")));
        };
        if current.is_some() {
            return Err(GameError::invariant(format!("slot {slot} is already occupied")));
        }
        if let Some(&holder) = self.reservations.get(slot) {
            if holder != corporation {
                return Err(GameError::illegal(format!("slot {slot} is reserved")));
            }
        }
        if let Some(reserved) = self.reservation_of(corporation) {
            if reserved != slot {
                return Err(GameError::illegal(format!(
                    "corporation has a reservation for slot {reserved}"
                )));
            }
        }
        if self.has_token_of(corporation) {
            return Err(GameError::illegal("corporation already has a token in this city"));
        }

        self.tokens[slot] = Some(corporation);
        Ok(())
    }
}

/// A town: revenue location without token slots.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Town {
    pub local_id: u8,
    pub revenue: Revenue,
}

/// An off-board location with phase-dependent revenue.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Offboard {
    pub revenue: Revenue,
}

/// Terrain cost printed on a hex or tile.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Upgrade {
    pub cost: i64,
    pub terrains: Vec<String>,
    /// Edge the cost applies to; `None` applies to the whole tile.
    pub edge: Option<u8>,
}

/// Stop kind of a node endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    City,
    Town,
    Offboard,
}

/// One end of a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Endpoint {
    /// Tile edge, unrotated numbering.
    Edge(u8),
    /// A stop on this tile. `index` is its position among the tile's stops
    /// of the same kind.
    Node { kind: NodeKind, index: usize, local_id: u8 },
    /// The tile's lawson junction.
    Junction,
}

impl Endpoint {
    #[must_use]
    pub fn rotate(self, ticks: u8) -> Self {
        match self {
            Endpoint::Edge(e) => Endpoint::Edge((e + ticks) % 6),
            other => other,
        }
    }

    #[must_use]
    pub fn edge(self) -> Option<u8> {
        match self {
            Endpoint::Edge(e) => Some(e),
            _ => None,
        }
    }

    /// Upgrade compatibility: edges match exactly, stops match by kind and
    /// local id, junctions match junctions.
    #[must_use]
    pub fn fits(self, other: Endpoint) -> bool {
        match (self, other) {
            (Endpoint::Edge(a), Endpoint::Edge(b)) => a == b,
            (
                Endpoint::Node { kind: ka, local_id: la, .. },
                Endpoint::Node { kind: kb, local_id: lb, .. },
            ) => ka == kb && la == lb,
            (Endpoint::Junction, Endpoint::Junction) => true,
            _ => false,
        }
    }
}

/// A piece of track between two endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path {
    pub a: Endpoint,
    pub b: Endpoint,
}

impl Path {
    #[must_use]
    pub fn new(a: Endpoint, b: Endpoint) -> Self {
        Self { a, b }
    }

    #[must_use]
    pub fn rotate(self, ticks: u8) -> Self {
        Self {
            a: self.a.rotate(ticks),
            b: self.b.rotate(ticks),
        }
    }

    /// Edges this path leaves the tile through.
    pub fn exits(&self) -> impl Iterator<Item = u8> {
        [self.a.edge(), self.b.edge()].into_iter().flatten()
    }

    /// The stop or junction this path touches, if any.
    #[must_use]
    pub fn branch(&self) -> Option<Endpoint> {
        [self.a, self.b]
            .into_iter()
            .find(|e| !matches!(e, Endpoint::Edge(_)))
    }

    /// True if this path is carried over by `other`, in either orientation.
    #[must_use]
    pub fn fits_within(&self, other: &Path) -> bool {
        (self.a.fits(other.a) && self.b.fits(other.b)) || (self.a.fits(other.b) && self.b.fits(other.a))
    }
}

/// A decoded tile clause.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Part {
    City(City),
    Town(Town),
    Offboard(Offboard),
    Junction,
    Label(String),
    Upgrade(Upgrade),
    Path(Path),
}

/// Exits of a set of paths, sorted and unique.
pub(crate) fn exits_of<'a>(paths: impl IntoIterator<Item = &'a Path>) -> SmallVec<[u8; 6]> {
    let mut exits: SmallVec<[u8; 6]> = paths.into_iter().flat_map(Path::exits).collect();
    exits.sort_unstable();
    exits.dedup();
    exits
}
