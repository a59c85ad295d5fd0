//! Tiles: the compact tile grammar, tile parts and upgrade rules.
//!
//! ## Grammar
//!
//! Every tile, printed or preprinted, is described by a short code such
//! as `c=r:20;p=a:0,b:_0;p=a:_0,b:3` (a city worth 20 with track to edges
//! 0 and 3). See [`decode`] for the full grammar.
//!
//! ## Catalog
//!
//! Standard tiles are looked up by name with [`Tile::for_name`].

pub mod catalog;
pub mod decode;
pub mod part;
pub mod tile;

pub use decode::decode;
pub use part::{City, Endpoint, NodeKind, Offboard, Part, Path, Revenue, Town, Upgrade};
pub use tile::{Tile, TileColor};
