//! Action representation and wire format.
//!
//! An action is an immutable record of one decision: *who* acted
//! (`entity` + `entity_type`), *what* they did (`type` plus kind-specific
//! fields) and, once accepted, its position in the log (`id`).
//!
//! The wire form is a flat JSON object. Every reference to another game
//! object is a stable string id, never an in-memory index, so a log can
//! be replayed by a fresh engine in another process:
//!
//! ```
//! use rust_18xx::core::{Action, ActionKind};
//!
//! let raw = serde_json::json!({
//!     "type": "buy_share",
//!     "entity": "Alice",
//!     "entity_type": "player",
//!     "share": "AR_1",
//! });
//! let action = Action::from_json(&raw).unwrap();
//! assert_eq!(action.kind, ActionKind::BuyShare { share: "AR_1".into() });
//! assert_eq!(action.to_json(), raw);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entity::EntityType;
use super::error::{EngineResult, GameError};

/// Discriminator strings accepted in the `type` field.
pub const ACTION_TYPES: [&str; 11] = [
    "bid",
    "buy_company",
    "buy_share",
    "buy_train",
    "dividend",
    "lay_tile",
    "par",
    "pass",
    "place_token",
    "run_routes",
    "sell_shares",
];

/// How a corporation distributes route revenue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DividendKind {
    /// Pay revenue to shareholders.
    Payout,
    /// Keep revenue in the corporation treasury.
    Withhold,
}

/// One train's declared route. Revenue is computed outside the engine.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Route {
    pub train: String,
    /// Hex coordinates visited, in order.
    pub hexes: Vec<String>,
    pub revenue: i64,
}

/// The action vocabulary.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    Bid { company: String, price: i64 },
    BuyCompany { company: String, price: i64 },
    BuyShare { share: String },
    BuyTrain { train: String, price: i64 },
    Dividend { kind: DividendKind },
    LayTile { hex: String, tile: String, rotation: u8 },
    Par { corporation: String, share_price: String },
    Pass,
    PlaceToken { city: String, slot: usize },
    RunRoutes { routes: Vec<Route> },
    SellShares { shares: Vec<String> },
}

impl ActionKind {
    /// The wire discriminator of this kind.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            ActionKind::Bid { .. } => "bid",
            ActionKind::BuyCompany { .. } => "buy_company",
            ActionKind::BuyShare { .. } => "buy_share",
            ActionKind::BuyTrain { .. } => "buy_train",
            ActionKind::Dividend { .. } => "dividend",
            ActionKind::LayTile { .. } => "lay_tile",
            ActionKind::Par { .. } => "par",
            ActionKind::Pass => "pass",
            ActionKind::PlaceToken { .. } => "place_token",
            ActionKind::RunRoutes { .. } => "run_routes",
            ActionKind::SellShares { .. } => "sell_shares",
        }
    }

    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self, ActionKind::Pass)
    }
}

/// A complete action record.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    /// Position in the action log, assigned when the action is accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,

    /// Stable id of the acting entity (player name or sym).
    pub entity: String,

    pub entity_type: EntityType,

    #[serde(flatten)]
    pub kind: ActionKind,
}

impl Action {
    /// Create an action for an arbitrary entity.
    #[must_use]
    pub fn new(entity_type: EntityType, entity: impl Into<String>, kind: ActionKind) -> Self {
        Self {
            id: None,
            entity: entity.into(),
            entity_type,
            kind,
        }
    }

    /// Create a player action.
    #[must_use]
    pub fn player(name: impl Into<String>, kind: ActionKind) -> Self {
        Self::new(EntityType::Player, name, kind)
    }

    /// Create a corporation action.
    #[must_use]
    pub fn corporation(sym: impl Into<String>, kind: ActionKind) -> Self {
        Self::new(EntityType::Corporation, sym, kind)
    }

    /// Create a private company action.
    #[must_use]
    pub fn company(sym: impl Into<String>, kind: ActionKind) -> Self {
        Self::new(EntityType::Company, sym, kind)
    }

    /// Decode a raw wire value.
    ///
    /// A missing or unrecognised `type` is reported as
    /// [`GameError::UnknownAction`]; any other decoding problem as
    /// [`GameError::MalformedAction`].
    pub fn from_json(raw: &Value) -> EngineResult<Self> {
        let type_name = raw
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| GameError::MalformedAction("missing `type`".into()))?;

        if !ACTION_TYPES.contains(&type_name) {
            return Err(GameError::UnknownAction(type_name.to_string()));
        }

        serde_json::from_value(raw.clone())
            .map_err(|e| GameError::MalformedAction(format!("{type_name}: {e}")))
    }

    /// Decode a raw JSON string.
    pub fn from_json_str(raw: &str) -> EngineResult<Self> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| GameError::MalformedAction(e.to_string()))?;
        Self::from_json(&value)
    }

    /// Encode to the wire format.
    #[must_use]
    pub fn to_json(&self) -> Value {
        // Every field is a string, integer, list or nested record.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Copy of this action without its log position.
    #[must_use]
    pub fn without_id(&self) -> Self {
        Self {
            id: None,
            ..self.clone()
        }
    }
}
