//! Hexes and board geometry.
//!
//! Coordinates have the form `A1..Z99`. The letter is the column (`x`) and
//! the number minus one is the row (`y`) in a doubled coordinate system:
//! on a flat layout vertical neighbours are two rows apart, on a pointy
//! layout horizontal neighbours are two columns apart.

use serde::{Deserialize, Serialize};

use crate::core::{CompanyId, EngineResult, GameError};
use crate::tiles::TileColor;

/// Board orientation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    #[default]
    Flat,
    Pointy,
}

const FLAT: [((i32, i32), u8); 6] = [
    ((0, 2), 0),
    ((-1, 1), 1),
    ((-1, -1), 2),
    ((0, -2), 3),
    ((1, -1), 4),
    ((1, 1), 5),
];

const POINTY: [((i32, i32), u8); 6] = [
    ((1, 1), 0),
    ((-1, 1), 1),
    ((-2, 0), 2),
    ((-1, -1), 3),
    ((1, -1), 4),
    ((2, 0), 5),
];

impl Layout {
    /// Coordinate offset of the neighbour in each direction.
    #[must_use]
    pub fn directions(self) -> &'static [((i32, i32), u8); 6] {
        match self {
            Layout::Flat => &FLAT,
            Layout::Pointy => &POINTY,
        }
    }

    /// Direction from one coordinate to an adjacent one.
    #[must_use]
    pub fn direction(self, from: (i32, i32), to: (i32, i32)) -> Option<u8> {
        let delta = (to.0 - from.0, to.1 - from.1);
        self.directions()
            .iter()
            .find(|(offset, _)| *offset == delta)
            .map(|(_, dir)| *dir)
    }
}

/// The opposite direction.
#[must_use]
pub const fn invert(dir: u8) -> u8 {
    (dir + 3) % 6
}

/// Parse `A1..Z99` into doubled `(x, y)`.
pub fn parse_coordinates(coordinates: &str) -> EngineResult<(i32, i32)> {
    let bad = || GameError::config(format!("bad coordinates `{coordinates}`"));

    let mut chars = coordinates.chars();
    let letter = chars.next().filter(char::is_ascii_uppercase).ok_or_else(bad)?;
    let number: i32 = chars.as_str().parse().map_err(|_| bad())?;
    if !(1..=99).contains(&number) {
        return Err(bad());
    }

    Ok((i32::from(letter as u8 - b'A'), number - 1))
}

/// Preprinted hexes sharing a color and tile.
///
/// `tile` is either a catalog name (`city`, `mtn80`) or a raw tile code
/// for hexes with unique printing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexSpec {
    pub color: TileColor,
    pub coordinates: Vec<String>,
    pub tile: String,
}

impl HexSpec {
    pub fn new<I, S>(color: TileColor, coordinates: I, tile: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            color,
            coordinates: coordinates.into_iter().map(Into::into).collect(),
            tile: tile.into(),
        }
    }
}

/// One hex of the map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hex {
    /// Coordinates, also the stable id.
    pub id: String,
    pub x: i32,
    pub y: i32,
    /// Index of the current tile in the board's tile arena.
    pub tile: usize,
    /// Neighbouring hex indices by direction.
    pub neighbors: [Option<usize>; 6],
    pub location_name: Option<String>,
    /// Private companies whose ownership blocks tile lays here.
    pub blockers: Vec<CompanyId>,
}

impl Hex {
    pub fn new(coordinates: &str, tile: usize) -> EngineResult<Self> {
        let (x, y) = parse_coordinates(coordinates)?;
        Ok(Self {
            id: coordinates.to_string(),
            x,
            y,
            tile,
            neighbors: [None; 6],
            location_name: None,
            blockers: Vec::new(),
        })
    }

    #[must_use]
    pub fn xy(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Directions that have a neighbour.
    pub fn neighbor_directions(&self) -> impl Iterator<Item = u8> + '_ {
        (0..6u8).filter(|&d| self.neighbors[d as usize].is_some())
    }
}
