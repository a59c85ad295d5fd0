//! The map: hexes, the tile arena and connectivity queries.
//!
//! ## Ownership
//!
//! Every tile in the game, preprinted or in the supply, lives in one arena
//! (`Vec<Tile>`). A hex refers to its current tile by index and to its
//! neighbours by hex index, so adjacency never owns anything and cloning
//! the board is a plain deep copy.
//!
//! ## Lookup
//!
//! Id lookups (hex by coordinates, tile by id, city by id, supply by tile
//! name) go through maps built once in [`Board::new`]. Ids are stable for
//! the life of the game, so the maps are never patched.

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use smallvec::SmallVec;

use crate::core::{CompanyId, CorporationId, EngineResult, GameError};
use crate::tiles::{City, Path, Tile};

use super::hex::{Hex, Layout};

#[derive(Clone, Debug, Default)]
struct BoardIndex {
    hexes: FxHashMap<String, usize>,
    coordinates: FxHashMap<(i32, i32), usize>,
    tiles: FxHashMap<String, usize>,
    /// City id -> (tile index, city index within the tile).
    cities: FxHashMap<String, (usize, usize)>,
    /// Tile name -> supply tile indices, ascending.
    supply: FxHashMap<String, Vec<usize>>,
}

/// A validated route over the board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteCheck {
    /// Hex indices in route order.
    pub hexes: Vec<usize>,
    /// Hexes with at least one revenue location.
    pub stops: usize,
}

/// The game map.
#[derive(Clone, Debug, Serialize)]
pub struct Board {
    layout: Layout,
    hexes: Vec<Hex>,
    tiles: Vec<Tile>,
    /// Hex each tile is currently laid on.
    tile_hex: Vec<Option<usize>>,
    #[serde(skip)]
    index: BoardIndex,
}

impl Board {
    /// Build a board from preprinted hexes and the tile supply, then link
    /// neighbours.
    pub fn new(layout: Layout, hexes: Vec<(String, Tile)>, supply: Vec<Tile>) -> EngineResult<Self> {
        let mut board = Board {
            layout,
            hexes: Vec::with_capacity(hexes.len()),
            tiles: Vec::with_capacity(hexes.len() + supply.len()),
            tile_hex: Vec::with_capacity(hexes.len() + supply.len()),
            index: BoardIndex::default(),
        };

        for (coordinates, tile) in hexes {
            let hex_index = board.hexes.len();
            let tile_index = board.tiles.len();
            let hex = Hex::new(&coordinates, tile_index)?;

            if board.index.coordinates.insert(hex.xy(), hex_index).is_some() {
                return Err(GameError::config(format!("hex {coordinates} defined twice")));
            }
            board.index.hexes.insert(coordinates, hex_index);
            board.hexes.push(hex);
            board.tiles.push(tile);
            board.tile_hex.push(Some(hex_index));
        }

        for tile in supply {
            let tile_index = board.tiles.len();
            board.index.supply.entry(tile.name.clone()).or_default().push(tile_index);
            board.tiles.push(tile);
            board.tile_hex.push(None);
        }

        for (tile_index, tile) in board.tiles.iter().enumerate() {
            if board.index.tiles.insert(tile.id.clone(), tile_index).is_some() {
                return Err(GameError::config(format!("tile id {} is not unique", tile.id)));
            }
            for city_index in 0..tile.cities.len() {
                board
                    .index
                    .cities
                    .insert(format!("{}-{}", tile.id, city_index), (tile_index, city_index));
            }
        }

        board.connect();
        Ok(board)
    }

    /// Link each hex to the hexes around it.
    ///
    /// A gray or red neighbour is only linked if its track points back at
    /// this hex.
    fn connect(&mut self) {
        for hex_index in 0..self.hexes.len() {
            let xy = self.hexes[hex_index].xy();
            for ((dx, dy), dir) in self.layout.directions() {
                let Some(&neighbor) = self.index.coordinates.get(&(xy.0 + dx, xy.1 + dy)) else {
                    continue;
                };
                if self.tile_on(neighbor).color.is_fixed() && !self.targeting(neighbor, hex_index) {
                    continue;
                }
                self.hexes[hex_index].neighbors[*dir as usize] = Some(neighbor);
            }
        }
    }

    #[must_use]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    #[must_use]
    pub fn hexes(&self) -> &[Hex] {
        &self.hexes
    }

    #[must_use]
    pub fn hex(&self, hex: usize) -> &Hex {
        &self.hexes[hex]
    }

    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    #[must_use]
    pub fn tile(&self, tile: usize) -> &Tile {
        &self.tiles[tile]
    }

    /// The tile currently on `hex`.
    #[must_use]
    pub fn tile_on(&self, hex: usize) -> &Tile {
        &self.tiles[self.hexes[hex].tile]
    }

    #[must_use]
    pub fn hex_of_tile(&self, tile: usize) -> Option<usize> {
        self.tile_hex[tile]
    }

    #[must_use]
    pub fn hex_index(&self, coordinates: &str) -> Option<usize> {
        self.index.hexes.get(coordinates).copied()
    }

    /// Resolve coordinates or fail with `UnknownEntity`.
    pub fn find_hex(&self, coordinates: &str) -> EngineResult<usize> {
        self.hex_index(coordinates)
            .ok_or_else(|| GameError::unknown("hex", coordinates))
    }

    #[must_use]
    pub fn hex_by_id(&self, coordinates: &str) -> Option<&Hex> {
        self.hex_index(coordinates).map(|i| &self.hexes[i])
    }

    #[must_use]
    pub fn tile_index(&self, id: &str) -> Option<usize> {
        self.index.tiles.get(id).copied()
    }

    pub fn find_tile(&self, id: &str) -> EngineResult<usize> {
        self.tile_index(id).ok_or_else(|| GameError::unknown("tile", id))
    }

    #[must_use]
    pub fn tile_by_id(&self, id: &str) -> Option<&Tile> {
        self.tile_index(id).map(|i| &self.tiles[i])
    }

    #[must_use]
    pub fn city_by_id(&self, id: &str) -> Option<&City> {
        self.index
            .cities
            .get(id)
            .map(|&(tile, city)| &self.tiles[tile].cities[city])
    }

    /// Lowest-index copy of `name` that is not on the map.
    #[must_use]
    pub fn available_tile(&self, name: &str) -> Option<usize> {
        self.index
            .supply
            .get(name)?
            .iter()
            .copied()
            .find(|&t| self.tile_hex[t].is_none())
    }

    /// Supply tiles not on the map, in arena order.
    pub fn unplaced_tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles
            .iter()
            .zip(&self.tile_hex)
            .filter(|(t, hex)| hex.is_none() && !t.preprinted)
            .map(|(t, _)| t)
    }

    pub fn set_location_name(&mut self, hex: usize, name: impl Into<String>) {
        self.hexes[hex].location_name = Some(name.into());
    }

    pub fn add_blocker(&mut self, hex: usize, company: CompanyId) {
        self.hexes[hex].blockers.push(company);
    }

    /// Reserve a slot in the first city of `hex` for a home token.
    pub fn reserve_home(&mut self, hex: usize, corporation: CorporationId) -> EngineResult<()> {
        let tile = self.hexes[hex].tile;
        let city = self.tiles[tile]
            .cities
            .first_mut()
            .ok_or_else(|| GameError::config(format!("home hex {} has no city", self.hexes[hex].id)))?;
        city.add_reservation(corporation);
        Ok(())
    }

    /// Direction from `from` to the adjacent hex `to`.
    #[must_use]
    pub fn neighbor_direction(&self, from: usize, to: usize) -> Option<u8> {
        self.layout.direction(self.hexes[from].xy(), self.hexes[to].xy())
    }

    /// `from` has track leading toward `to`.
    #[must_use]
    pub fn targeting(&self, from: usize, to: usize) -> bool {
        self.neighbor_direction(from, to)
            .is_some_and(|dir| self.tile_on(from).exits().contains(&dir))
    }

    /// Both hexes have track leading toward each other.
    #[must_use]
    pub fn connected(&self, a: usize, b: usize) -> bool {
        self.targeting(a, b) && self.targeting(b, a)
    }

    /// Paths of `hex` that exit toward `other`. Unless `direct`, paths that
    /// share a stop or junction with those are included too.
    #[must_use]
    pub fn connected_paths(&self, hex: usize, other: usize, direct: bool) -> Vec<Path> {
        let Some(dir) = self.neighbor_direction(hex, other) else {
            return Vec::new();
        };
        let tile = self.tile_on(hex);
        let mut paths: Vec<Path> = tile.paths().filter(|p| p.exits().any(|e| e == dir)).collect();
        if direct {
            return paths;
        }

        let branches: SmallVec<[_; 4]> = paths.iter().filter_map(Path::branch).collect();
        for path in tile.paths() {
            if !paths.contains(&path) && path.branch().is_some_and(|b| branches.contains(&b)) {
                paths.push(path);
            }
        }
        paths
    }

    /// Connected paths on both sides of the `a`-`b` border.
    #[must_use]
    pub fn connections(&self, a: usize, b: usize, direct: bool) -> Vec<Path> {
        let mut paths = self.connected_paths(a, b, direct);
        paths.extend(self.connected_paths(b, a, direct));
        paths
    }

    /// Exits of `hex` reachable from its border with `other`.
    #[must_use]
    pub fn connected_exits(&self, hex: usize, other: usize, direct: bool) -> SmallVec<[u8; 6]> {
        let mut exits: SmallVec<[u8; 6]> = self
            .connected_paths(hex, other, direct)
            .iter()
            .flat_map(Path::exits)
            .collect();
        exits.sort_unstable();
        exits.dedup();
        exits
    }

    /// Rotations of `tile` that keep every exit of the current tile on
    /// `hex` and only point at existing neighbours.
    #[must_use]
    pub fn legal_rotations(&self, hex: usize, tile: usize) -> SmallVec<[u8; 6]> {
        let current = self.tile_on(hex).exits();
        let neighbors = &self.hexes[hex].neighbors;
        let tile = &self.tiles[tile];

        (0..6u8)
            .filter(|&rotation| {
                let exits = tile.exits_at(rotation);
                current.iter().all(|e| exits.contains(e))
                    && exits.iter().all(|&e| neighbors[e as usize].is_some())
            })
            .collect()
    }

    /// Replace the tile on `hex` with `tile` at `rotation`.
    ///
    /// Tokens and reservations move city by city onto the new tile. The
    /// old tile returns to the supply unless it was preprinted.
    pub fn lay(&mut self, hex: usize, tile: usize, rotation: u8) -> EngineResult<()> {
        if self.tile_hex[tile].is_some() {
            return Err(GameError::invariant(format!("tile {} is already on the map", self.tiles[tile].id)));
        }
        let old = self.hexes[hex].tile;
        let old_cities = self.tiles[old].cities.clone();
        if old_cities.len() > self.tiles[tile].cities.len() {
            return Err(GameError::illegal(format!(
                "tile {} has fewer cities than the tile it replaces",
                self.tiles[tile].id
            )));
        }

        for (i, city) in old_cities.iter().enumerate() {
            let target = &mut self.tiles[tile].cities[i];
            if city.tokens.len() > target.slots {
                return Err(GameError::illegal(format!(
                    "tile {} has too few slots for existing tokens",
                    self.tiles[tile].id
                )));
            }
            target.reservations = city.reservations.clone();
            for (slot, token) in city.tokens.iter().enumerate() {
                if token.is_some() {
                    target.tokens[slot] = *token;
                }
            }
        }

        for city in &mut self.tiles[old].cities {
            city.reservations.clear();
            city.tokens.iter_mut().for_each(|t| *t = None);
        }
        if !self.tiles[old].preprinted {
            self.tiles[old].set_rotation(0);
        }
        self.tile_hex[old] = None;

        self.tiles[tile].set_rotation(rotation);
        self.tile_hex[tile] = Some(hex);
        self.hexes[hex].tile = tile;
        Ok(())
    }

    /// Hexes whose current tile has a token of `corporation`.
    #[must_use]
    pub fn token_hexes(&self, corporation: CorporationId) -> Vec<usize> {
        (0..self.hexes.len())
            .filter(|&h| self.has_token(h, corporation))
            .collect()
    }

    #[must_use]
    pub fn has_token(&self, hex: usize, corporation: CorporationId) -> bool {
        self.tile_on(hex).cities.iter().any(|c| c.has_token_of(corporation))
    }

    /// Hexes the corporation's network touches, ascending.
    ///
    /// Flood fill from token hexes: every hex an exit points at is
    /// reachable, and the fill continues through it when the two hexes
    /// are connected. Tokens of other corporations do not block.
    #[must_use]
    pub fn reachable_hexes(&self, corporation: CorporationId) -> Vec<usize> {
        let starts = self.token_hexes(corporation);
        let mut reached: FxHashSet<usize> = starts.iter().copied().collect();
        let mut expanded: FxHashSet<usize> = reached.clone();
        let mut queue: VecDeque<usize> = starts.into_iter().collect();

        while let Some(hex) = queue.pop_front() {
            for dir in self.tile_on(hex).exits() {
                let Some(neighbor) = self.hexes[hex].neighbors[dir as usize] else {
                    continue;
                };
                reached.insert(neighbor);
                if self.connected(hex, neighbor) && expanded.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }

        let mut reached: Vec<usize> = reached.into_iter().collect();
        reached.sort_unstable();
        reached
    }

    /// Put a token into a city on the map. Returns the hex index.
    pub fn place_token(&mut self, city_id: &str, slot: usize, corporation: CorporationId) -> EngineResult<usize> {
        let &(tile, city) = self
            .index
            .cities
            .get(city_id)
            .ok_or_else(|| GameError::unknown("city", city_id))?;
        let hex = self.tile_hex[tile].ok_or_else(|| GameError::illegal(format!("city {city_id} is not on the map")))?;

        self.tiles[tile].cities[city].place_token(slot, corporation)?;
        Ok(hex)
    }

    /// Hex a city is on, if its tile is laid.
    #[must_use]
    pub fn hex_of_city(&self, city_id: &str) -> Option<usize> {
        let &(tile, _) = self.index.cities.get(city_id)?;
        self.tile_hex[tile]
    }

    /// Place the home token of `corporation` on `hex`, in its reserved slot
    /// when it has one.
    pub fn place_home_token(&mut self, hex: usize, corporation: CorporationId) -> EngineResult<String> {
        let tile = self.hexes[hex].tile;
        let cities = &self.tiles[tile].cities;
        let (city, slot) = cities
            .iter()
            .enumerate()
            .find_map(|(i, c)| c.reservation_of(corporation).map(|s| (i, s)))
            .or_else(|| {
                cities
                    .iter()
                    .enumerate()
                    .find_map(|(i, c)| c.slot_for(corporation).map(|s| (i, s)))
            })
            .ok_or_else(|| GameError::invariant(format!("no room for a home token on {}", self.hexes[hex].id)))?;

        self.tiles[tile].cities[city].place_token(slot, corporation)?;
        Ok(format!("{}-{}", self.tiles[tile].id, city))
    }

    /// Validate a declared route: consecutive hexes must be connected
    /// neighbours.
    pub fn route_stops(&self, coordinates: &[String]) -> EngineResult<RouteCheck> {
        if coordinates.len() < 2 {
            return Err(GameError::illegal("a route needs at least two hexes"));
        }

        let hexes = coordinates
            .iter()
            .map(|c| self.find_hex(c))
            .collect::<EngineResult<Vec<_>>>()?;

        for pair in hexes.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if self.neighbor_direction(a, b).is_none() || !self.connected(a, b) {
                return Err(GameError::illegal(format!(
                    "{} and {} are not connected",
                    self.hexes[a].id, self.hexes[b].id
                )));
            }
        }

        let stops = hexes.iter().filter(|&&h| self.tile_on(h).stop_count() > 0).count();
        Ok(RouteCheck { hexes, stops })
    }
}
