//! Tiles and upgrade legality.
//!
//! A `Tile` owns its decoded parts, split by kind. Paths are stored
//! unrotated; every geometric query (`paths`, `exits`) applies the current
//! rotation on demand, so nothing derived can go stale after a rotation.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{EngineResult, GameError};

use super::catalog;
use super::decode::decode;
use super::part::{exits_of, City, Offboard, Part, Path, Town, Upgrade};

/// Tile color. Upgrades step through White, Yellow, Green, Brown, Gray.
/// Red tiles are off-board and never upgrade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileColor {
    White,
    Yellow,
    Green,
    Brown,
    Gray,
    Red,
}

impl TileColor {
    /// The color an upgrade of this color must have.
    #[must_use]
    pub fn next(self) -> Option<TileColor> {
        match self {
            TileColor::White => Some(TileColor::Yellow),
            TileColor::Yellow => Some(TileColor::Green),
            TileColor::Green => Some(TileColor::Brown),
            TileColor::Brown => Some(TileColor::Gray),
            TileColor::Gray | TileColor::Red => None,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            TileColor::White => "white",
            TileColor::Yellow => "yellow",
            TileColor::Green => "green",
            TileColor::Brown => "brown",
            TileColor::Gray => "gray",
            TileColor::Red => "red",
        }
    }

    /// Gray and red hexes keep their track fixed.
    #[must_use]
    pub fn is_fixed(self) -> bool {
        matches!(self, TileColor::Gray | TileColor::Red)
    }
}

impl std::fmt::Display for TileColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = self.name();
        let mut chars = name.chars();
        if let Some(first) = chars.next() {
            write!(f, "{}{}", first.to_ascii_uppercase(), chars.as_str())?;
        }
        Ok(())
    }
}

/// A physical tile, either preprinted on a hex or in the supply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Stable id: `name-index` for supply tiles, the hex coordinate for
    /// preprinted ones.
    pub id: String,
    pub name: String,
    pub color: TileColor,
    rotation: u8,
    pub preprinted: bool,
    pub cities: Vec<City>,
    pub towns: Vec<Town>,
    pub offboards: Vec<Offboard>,
    pub junction: bool,
    pub label: Option<String>,
    pub upgrades: Vec<Upgrade>,
    paths: Vec<Path>,
}

impl Tile {
    /// Build a tile from a raw code.
    pub fn from_code(name: impl Into<String>, color: TileColor, code: &str) -> EngineResult<Self> {
        let name = name.into();
        let mut tile = Self {
            id: name.clone(),
            name,
            color,
            rotation: 0,
            preprinted: false,
            cities: Vec::new(),
            towns: Vec::new(),
            offboards: Vec::new(),
            junction: false,
            label: None,
            upgrades: Vec::new(),
            paths: Vec::new(),
        };

        for part in decode(code)? {
            match part {
                Part::City(city) => tile.cities.push(city),
                Part::Town(town) => tile.towns.push(town),
                Part::Offboard(offboard) => tile.offboards.push(offboard),
                Part::Junction => tile.junction = true,
                Part::Label(label) => tile.label = Some(label),
                Part::Upgrade(upgrade) => tile.upgrades.push(upgrade),
                Part::Path(path) => tile.paths.push(path),
            }
        }

        Ok(tile)
    }

    /// Build a catalog tile by name.
    ///
    /// ```
    /// use rust_18xx::tiles::{Tile, TileColor};
    ///
    /// let tile = Tile::for_name("57").unwrap();
    /// assert_eq!(tile.color, TileColor::Yellow);
    /// assert_eq!(tile.exits().as_slice(), &[0, 3]);
    /// assert!(Tile::for_name("nope").is_err());
    /// ```
    pub fn for_name(name: &str) -> EngineResult<Self> {
        let (color, code) = catalog::lookup(name).ok_or_else(|| GameError::UnknownTile(name.to_string()))?;
        Self::from_code(name, color, code)
    }

    /// Give a supply tile its `name-index` id.
    #[must_use]
    pub fn with_index(mut self, index: usize) -> Self {
        self.id = format!("{}-{}", self.name, index);
        self
    }

    /// Mark as preprinted on the hex at `coordinates`.
    #[must_use]
    pub fn preprinted_at(mut self, coordinates: &str) -> Self {
        self.id = coordinates.to_string();
        self.preprinted = true;
        self
    }

    #[must_use]
    pub fn rotation(&self) -> u8 {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: u8) {
        self.rotation = rotation % 6;
    }

    /// A copy turned by `ticks` sixths of a turn.
    #[must_use]
    pub fn rotated(&self, ticks: u8) -> Self {
        let mut tile = self.clone();
        tile.set_rotation(self.rotation + ticks % 6);
        tile
    }

    /// Paths at the current rotation.
    pub fn paths(&self) -> impl Iterator<Item = Path> + '_ {
        self.paths.iter().map(move |p| p.rotate(self.rotation))
    }

    /// Paths at rotation 0.
    #[must_use]
    pub fn base_paths(&self) -> &[Path] {
        &self.paths
    }

    /// Edges with track, sorted and unique, at the current rotation.
    #[must_use]
    pub fn exits(&self) -> SmallVec<[u8; 6]> {
        let rotated: SmallVec<[Path; 8]> = self.paths().collect();
        exits_of(&rotated)
    }

    /// Exits this tile would have at `rotation`.
    #[must_use]
    pub fn exits_at(&self, rotation: u8) -> SmallVec<[u8; 6]> {
        let rotated: SmallVec<[Path; 8]> = self.paths.iter().map(|p| p.rotate(rotation % 6)).collect();
        exits_of(&rotated)
    }

    /// Lawson track: all track meets in the center.
    #[must_use]
    pub fn is_lawson(&self) -> bool {
        self.junction
            || (self.cities.len() == 1 && self.towns.is_empty())
            || (self.cities.is_empty() && self.towns.len() == 1)
    }

    /// Total terrain cost printed on the tile.
    #[must_use]
    pub fn terrain_cost(&self) -> i64 {
        self.upgrades.iter().map(|u| u.cost).sum()
    }

    /// True if any upgrade part names `terrain`.
    #[must_use]
    pub fn has_terrain(&self, terrain: &str) -> bool {
        self.upgrades.iter().any(|u| u.terrains.iter().any(|t| t == terrain))
    }

    /// Revenue stops on the tile.
    #[must_use]
    pub fn stop_count(&self) -> usize {
        self.cities.len() + self.towns.len() + self.offboards.len()
    }

    /// Whether `other` is a legal replacement for this tile in some
    /// rotation.
    ///
    /// The color must be exactly one step higher and labels must match.
    /// With `strict_counts`, town and city counts must be equal. Track
    /// must be preserved: for some rotation of this tile every path fits
    /// within a path of `other` as laid.
    #[must_use]
    pub fn upgrades_to(&self, other: &Tile, strict_counts: bool) -> bool {
        self.color.next() == Some(other.color)
            && self.label == other.label
            && (!strict_counts || self.counts_match(other))
            && (0..6).any(|ticks| self.paths_fit(ticks, other))
    }

    /// Town and city counts are equal.
    #[must_use]
    pub fn counts_match(&self, other: &Tile) -> bool {
        self.towns.len() == other.towns.len() && self.cities.len() == other.cities.len()
    }

    /// Every current path of this tile is carried by `other` at its
    /// current rotation.
    #[must_use]
    pub fn preserved_by(&self, other: &Tile) -> bool {
        let new: SmallVec<[Path; 8]> = other.paths().collect();
        self.paths().all(|old| new.iter().any(|n| old.fits_within(n)))
    }

    fn paths_fit(&self, ticks: u8, other: &Tile) -> bool {
        let new: SmallVec<[Path; 8]> = other.paths().collect();
        self.paths
            .iter()
            .map(|p| p.rotate(ticks))
            .all(|old| new.iter().any(|n| old.fits_within(n)))
    }

    /// Filter `candidates` to the legal upgrades of this tile, one per name.
    pub fn upgrade_tiles<'a>(&self, candidates: impl IntoIterator<Item = &'a Tile>, strict_counts: bool) -> Vec<&'a Tile> {
        let mut found: Vec<&Tile> = Vec::new();
        for tile in candidates {
            if self.upgrades_to(tile, strict_counts) && !found.iter().any(|t| t.name == tile.name) {
                found.push(tile);
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(name: &str) -> Tile {
        Tile::for_name(name).unwrap()
    }

    #[test]
    fn test_exits_follow_rotation() {
        let mut t = tile("6");
        assert_eq!(t.exits().as_slice(), &[0, 2]);
        t.set_rotation(5);
        assert_eq!(t.exits().as_slice(), &[1, 5]);
        assert_eq!(t.exits_at(1).as_slice(), &[1, 3]);
    }

    #[test]
    fn test_rotation_closed() {
        let t = tile("5").rotated(4).rotated(5);
        assert_eq!(t.rotation(), 3);
        assert_eq!(tile("5").rotated(6).exits(), tile("5").exits());
    }

    #[test]
    fn test_lawson() {
        assert!(tile("57").is_lawson());
        assert!(tile("3").is_lawson());
        assert!(tile("81A").is_lawson());
        assert!(!tile("9").is_lawson());
        assert!(!tile("1").is_lawson());
    }

    #[test]
    fn test_yellow_to_green_city() {
        // 57 is a straight city; 14 adds two more exits.
        assert!(tile("57").upgrades_to(&tile("14"), true));
        assert!(tile("57").upgrades_to(&tile("15"), true));
        // 12 has no pair of opposite exits.
        assert!(!tile("57").upgrades_to(&tile("12"), true));
    }

    #[test]
    fn test_track_upgrades() {
        assert!(tile("9").upgrades_to(&tile("19"), true));
        assert!(tile("8").upgrades_to(&tile("16"), true));
        assert!(!tile("9").upgrades_to(&tile("16"), true));
        assert!(!tile("9").upgrades_to(&tile("14"), true));
    }

    #[test]
    fn test_color_must_step_once() {
        assert!(!tile("9").upgrades_to(&tile("9"), true));
        assert!(!tile("9").upgrades_to(&tile("41"), true));
        assert!(tile("city").upgrades_to(&tile("57"), true));
        assert!(!tile("blank").upgrades_to(&tile("57"), true));
        assert!(tile("blank").upgrades_to(&tile("57"), false));
    }

    #[test]
    fn test_labels_must_match() {
        let kotohira = Tile::from_code("I4", TileColor::White, "c=r:0;l=H;u=c:80").unwrap();
        assert!(kotohira.upgrades_to(&tile("438"), true));
        assert!(!tile("city").upgrades_to(&tile("438"), true));
        assert!(!kotohira.upgrades_to(&tile("57"), true));
    }

    #[test]
    fn test_preserved_by_at_rotation() {
        let old = tile("57");
        let mut new = tile("14");
        assert!(old.preserved_by(&new));
        new.set_rotation(1);
        assert!(!old.preserved_by(&new));
    }

    #[test]
    fn test_upgrade_tiles_unique_by_name() {
        let supply = vec![tile("14").with_index(0), tile("14").with_index(1), tile("12"), tile("15")];
        let names: Vec<&str> = tile("57")
            .upgrade_tiles(&supply, true)
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, vec!["14", "15"]);
    }

    #[test]
    fn test_ids() {
        assert_eq!(tile("57").with_index(1).id, "57-1");
        let preprinted = tile("city").preprinted_at("K8");
        assert_eq!(preprinted.id, "K8");
        assert_eq!(preprinted.name, "city");
        assert!(preprinted.preprinted);
    }

    #[test]
    fn test_terrain() {
        let t = tile("mtn+wtr80");
        assert_eq!(t.terrain_cost(), 80);
        assert!(t.has_terrain("mountain"));
        assert!(t.has_terrain("water"));
        assert!(!tile("wtr80").has_terrain("mountain"));
    }

    #[test]
    fn test_color_display() {
        assert_eq!(TileColor::Yellow.to_string(), "Yellow");
        assert!(TileColor::Gray > TileColor::Brown);
        assert_eq!(TileColor::Brown.next(), Some(TileColor::Gray));
        assert_eq!(TileColor::Red.next(), None);
    }
}
