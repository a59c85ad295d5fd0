//! Narrative game log.
//!
//! The narrative log is what a reader of the game sees: round headers,
//! phase changes, purchases and price movements. It is part of the game
//! state, so replaying a log reproduces it line for line.
//!
//! Structured diagnostics go through `tracing` instead; the two channels
//! are independent and the engine never installs a subscriber.

use im::Vector;
use serde::{Deserialize, Serialize};

/// Ordered, persistent list of narrative lines.
///
/// Backed by `im::Vector` so cloning the state for a transactional action
/// does not copy the log.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameLog {
    entries: Vector<String>,
}

impl GameLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line.
    pub fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::trace!(target: "rust_18xx::log", "{line}");
        self.entries.push_back(line);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&String> {
        self.entries.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.entries.iter()
    }

    /// True if any line equals `line`.
    #[must_use]
    pub fn contains(&self, line: &str) -> bool {
        self.entries.iter().any(|l| l == line)
    }
}
