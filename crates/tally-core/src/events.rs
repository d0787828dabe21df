//! Push events broadcast on a customer's private channel.

use serde::{Deserialize, Serialize};

/// Event kinds the billing service broadcasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RealtimeEventKind {
    /// Usage changed for a feature or event (`usage.updated`).
    UsageUpdated,

    /// A balance moved (`balance.updated`).
    BalanceUpdated,

    /// A subscription started, changed, or ended (`subscription.updated`).
    SubscriptionUpdated,

    /// A payment completed (`transaction.completed`).
    TransactionCompleted,
}

impl RealtimeEventKind {
    /// The event name as broadcast on the channel.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UsageUpdated => "usage.updated",
            Self::BalanceUpdated => "balance.updated",
            Self::SubscriptionUpdated => "subscription.updated",
            Self::TransactionCompleted => "transaction.completed",
        }
    }

    /// Parse a broadcast event name, if it is one of the documented kinds.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "usage.updated" => Some(Self::UsageUpdated),
            "balance.updated" => Some(Self::BalanceUpdated),
            "subscription.updated" => Some(Self::SubscriptionUpdated),
            "transaction.completed" => Some(Self::TransactionCompleted),
            _ => None,
        }
    }
}

/// A push event: a name tag plus an opaque payload.
///
/// The name is kept as broadcast so events outside the documented kinds
/// still reach listeners registered for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeEvent {
    /// Event name as broadcast (e.g. `"usage.updated"`).
    #[serde(rename = "type")]
    pub name: String,

    /// Opaque payload.
    pub data: serde_json::Value,
}

impl RealtimeEvent {
    /// Build an event from a kind and payload.
    #[must_use]
    pub fn new(kind: RealtimeEventKind, data: serde_json::Value) -> Self {
        Self {
            name: kind.as_str().to_string(),
            data,
        }
    }

    /// The documented kind, if the name matches one.
    #[must_use]
    pub fn kind(&self) -> Option<RealtimeEventKind> {
        RealtimeEventKind::from_name(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_names() {
        for kind in [
            RealtimeEventKind::UsageUpdated,
            RealtimeEventKind::BalanceUpdated,
            RealtimeEventKind::SubscriptionUpdated,
            RealtimeEventKind::TransactionCompleted,
        ] {
            assert_eq!(RealtimeEventKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(RealtimeEventKind::from_name("unknown.event"), None);
    }

    #[test]
    fn envelope_uses_the_type_tag() {
        let event = RealtimeEvent::new(
            RealtimeEventKind::BalanceUpdated,
            serde_json::json!({"balance": 42.0}),
        );
        let wire = serde_json::to_value(&event).unwrap();
        assert_eq!(wire["type"], "balance.updated");
        assert_eq!(wire["data"]["balance"], 42.0);
        assert_eq!(event.kind(), Some(RealtimeEventKind::BalanceUpdated));
    }

    #[test]
    fn unknown_events_keep_their_name() {
        let event: RealtimeEvent =
            serde_json::from_value(serde_json::json!({"type": "plan.renamed", "data": {}}))
                .unwrap();
        assert_eq!(event.name, "plan.renamed");
        assert_eq!(event.kind(), None);
    }
}
