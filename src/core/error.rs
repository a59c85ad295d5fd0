//! Engine error taxonomy.
//!
//! Every fallible engine operation returns [`EngineResult`]. Errors fall
//! into three groups:
//!
//! - **Illegal actions**: unknown action types, malformed references,
//!   out-of-turn submissions and rule violations. The failed action leaves
//!   the game untouched.
//! - **Configuration errors**: unknown tiles, malformed tile clauses and
//!   inconsistent title data. These abort construction.
//! - **Invariant violations**: a caller submitted something the state can
//!   never accept (occupied token slot, closing a closed company).

use thiserror::Error;

/// Result alias used throughout the engine.
pub type EngineResult<T> = std::result::Result<T, GameError>;

/// All errors raised by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GameError {
    /// The `type` discriminator of a raw action is not a known action kind.
    #[error("unknown action type `{0}`")]
    UnknownAction(String),

    /// A raw action could not be decoded.
    #[error("malformed action: {0}")]
    MalformedAction(String),

    /// A stable id did not resolve to anything in this game.
    #[error("unknown {kind} `{id}`")]
    UnknownEntity { kind: &'static str, id: String },

    /// The acting entity is not the one whose turn it is.
    #[error("`{entity}` cannot act now, waiting on `{current}`")]
    OutOfTurn { entity: String, current: String },

    /// The action violates a legality rule of the active round.
    #[error("illegal action: {0}")]
    Illegal(String),

    /// A tile name is not in the catalog.
    #[error("tile `{0}` not found")]
    UnknownTile(String),

    /// A tile code clause could not be parsed.
    #[error("malformed tile clause `{clause}`: {reason}")]
    TileGrammar { clause: String, reason: String },

    /// The title configuration is inconsistent.
    #[error("configuration error: {0}")]
    Config(String),

    /// State would become inconsistent.
    #[error("invariant violated: {0}")]
    Invariant(String),

    /// A previously accepted action failed while replaying a log.
    #[error("replay failed at action {index}: {source}")]
    Replay {
        index: usize,
        #[source]
        source: Box<GameError>,
    },

    /// The state snapshot could not be encoded.
    #[error("snapshot failed: {0}")]
    Snapshot(String),
}

impl GameError {
    /// Shorthand for [`GameError::Illegal`].
    pub fn illegal(detail: impl Into<String>) -> Self {
        Self::Illegal(detail.into())
    }

    /// Shorthand for [`GameError::Invariant`].
    pub fn invariant(detail: impl Into<String>) -> Self {
        Self::Invariant(detail.into())
    }

    /// Shorthand for [`GameError::Config`].
    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config(detail.into())
    }

    /// Shorthand for [`GameError::UnknownEntity`].
    pub fn unknown(kind: &'static str, id: impl Into<String>) -> Self {
        Self::UnknownEntity { kind, id: id.into() }
    }

    pub(crate) fn grammar(clause: &str, reason: impl Into<String>) -> Self {
        Self::TileGrammar {
            clause: clause.to_string(),
            reason: reason.into(),
        }
    }

    /// True for errors that reject a single action without implying an
    /// engine or configuration fault.
    #[must_use]
    pub fn is_illegal_action(&self) -> bool {
        matches!(
            self,
            GameError::UnknownAction(_)
                | GameError::MalformedAction(_)
                | GameError::UnknownEntity { .. }
                | GameError::OutOfTurn { .. }
                | GameError::Illegal(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            GameError::UnknownAction("teleport".into()).to_string(),
            "unknown action type `teleport`"
        );
        assert_eq!(
            GameError::unknown("corporation", "XX").to_string(),
            "unknown corporation `XX`"
        );
        assert_eq!(
            GameError::grammar("q=1", "unknown part type `q`").to_string(),
            "malformed tile clause `q=1`: unknown part type `q`"
        );
    }

    #[test]
    fn test_replay_wraps_source() {
        let err = GameError::Replay {
            index: 3,
            source: Box::new(GameError::illegal("no cash")),
        };
        assert_eq!(err.to_string(), "replay failed at action 3: illegal action: no cash");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_classification() {
        assert!(GameError::illegal("x").is_illegal_action());
        assert!(GameError::OutOfTurn { entity: "a".into(), current: "b".into() }.is_illegal_action());
        assert!(!GameError::invariant("x").is_illegal_action());
        assert!(!GameError::UnknownTile("999".into()).is_illegal_action());
    }
}
