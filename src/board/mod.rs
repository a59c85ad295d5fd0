//! The hex map: coordinates, adjacency, tile lays, tokens and
//! reachability.

pub mod board;
pub mod hex;

pub use board::{Board, RouteCheck};
pub use hex::{invert, parse_coordinates, Hex, HexSpec, Layout};
