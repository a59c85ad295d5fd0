//! Title data.
//!
//! Each title is a module exposing `config()`, a complete [`GameConfig`]
//! for the engine. Titles add nothing but data.
//!
//! [`GameConfig`]: crate::core::GameConfig

pub mod g1889;
