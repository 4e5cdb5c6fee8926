use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of user interaction recorded against a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    View,
    AddToCart,
    Purchase,
    Search,
    TimeSpent,
}

impl ActionKind {
    /// Database/wire representation of the action kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::View => "VIEW",
            ActionKind::AddToCart => "ADD_TO_CART",
            ActionKind::Purchase => "PURCHASE",
            ActionKind::Search => "SEARCH",
            ActionKind::TimeSpent => "TIME_SPENT",
        }
    }

    /// Action kinds that signal interest in a product, used by the
    /// collaborative overlap queries
    pub const ENGAGEMENT: [ActionKind; 3] = [
        ActionKind::View,
        ActionKind::AddToCart,
        ActionKind::Purchase,
    ];
}

impl Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VIEW" => Ok(ActionKind::View),
            "ADD_TO_CART" => Ok(ActionKind::AddToCart),
            "PURCHASE" => Ok(ActionKind::Purchase),
            "SEARCH" => Ok(ActionKind::Search),
            "TIME_SPENT" => Ok(ActionKind::TimeSpent),
            other => Err(format!("unknown action kind: {}", other)),
        }
    }
}

/// A stored interaction record
///
/// Immutable once created. `expires_at` carries the retention deadline stamped
/// at insert time; purging expired rows happens outside this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    pub id: i64,
    pub user_id: Option<String>,
    pub session_id: String,
    pub product_id: i32,
    pub action: ActionKind,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Fields for inserting a new interaction record
#[derive(Debug, Clone)]
pub struct NewInteraction {
    pub user_id: Option<String>,
    pub session_id: String,
    pub product_id: i32,
    pub action: ActionKind,
    pub metadata: Option<serde_json::Value>,
    pub expires_at: DateTime<Utc>,
}

/// One row of a user's behavior window, joined with the product's category
/// and price for summarization
#[derive(Debug, Clone)]
pub struct InteractionEvent {
    pub product_id: i32,
    pub action: ActionKind,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub category: String,
    pub price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_kind_round_trip() {
        for action in [
            ActionKind::View,
            ActionKind::AddToCart,
            ActionKind::Purchase,
            ActionKind::Search,
            ActionKind::TimeSpent,
        ] {
            assert_eq!(action.as_str().parse::<ActionKind>().unwrap(), action);
        }
    }

    #[test]
    fn test_action_kind_rejects_unknown() {
        assert!("CLICKED".parse::<ActionKind>().is_err());
        assert!("view".parse::<ActionKind>().is_err());
    }

    #[test]
    fn test_action_kind_serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&ActionKind::AddToCart).unwrap();
        assert_eq!(json, "\"ADD_TO_CART\"");

        let decoded: ActionKind = serde_json::from_str("\"TIME_SPENT\"").unwrap();
        assert_eq!(decoded, ActionKind::TimeSpent);
    }
}
