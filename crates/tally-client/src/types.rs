//! Request and response types for the billing API.

use serde::{Deserialize, Serialize};
use tally_core::UsageRef;

use crate::error::ClientError;

/// Ref fields embedded in check/track/usage bodies.
///
/// Exactly one of the two is set, derived from the [`UsageRef`] variant.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct RefFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
}

impl TryFrom<&UsageRef> for RefFields {
    type Error = ClientError;

    fn try_from(subject: &UsageRef) -> Result<Self, ClientError> {
        if subject.id().is_empty() {
            return Err(ClientError::Validation(
                "a feature id or event name is required".to_string(),
            ));
        }
        Ok(match subject {
            UsageRef::Feature(id) => Self {
                feature_id: Some(id.clone()),
                event_name: None,
            },
            UsageRef::Event(name) => Self {
                feature_id: None,
                event_name: Some(name.clone()),
            },
        })
    }
}

/// Body for the track and usage endpoints (identical wire shape; the
/// endpoints differ in whether `value` is a delta or an overwrite).
#[derive(Debug, Clone, Serialize)]
pub(crate) struct UsageWriteRequest {
    #[serde(flatten)]
    pub subject: RefFields,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Receipt for a tracked usage event.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackReceipt {
    /// Human-readable confirmation.
    pub message: String,

    /// Server-assigned event ID.
    pub event_id: String,

    /// Customer the event was recorded against.
    pub customer_id: String,

    /// Feature the event resolved to, when addressed by feature.
    pub feature_id: Option<String>,
}

/// Receipt for an absolute usage overwrite.
#[derive(Debug, Clone, Deserialize)]
pub struct SetUsageReceipt {
    /// Human-readable confirmation.
    pub message: String,

    /// Customer the usage was written for.
    pub customer_id: String,

    /// Feature the write resolved to, when addressed by feature.
    pub feature_id: Option<String>,
}

/// A customer record with its entitled features.
///
/// The server attaches more fields than the SDK models; they are preserved
/// in `extra`.
#[derive(Debug, Clone, Deserialize)]
pub struct Customer {
    /// Features the customer is entitled to.
    pub features: Vec<CustomerFeature>,

    /// Remaining server-supplied fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One feature row on a customer record.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerFeature {
    /// Opaque feature ID.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Remaining server-supplied fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Optional fields for creating a checkout session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckoutOptions {
    /// Customer email to prefill.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Customer name to prefill.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Customer phone to prefill.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// ISO currency code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Where the payment provider redirects after completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,

    /// Opaque metadata attached to the session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CheckoutRequest {
    pub plan_id: String,
    pub amount: f64,
    #[serde(flatten)]
    pub options: CheckoutOptions,
}

/// A pending payment/subscription flow.
///
/// The session's lifecycle ends when the customer completes or abandons the
/// redirect; the SDK has no further visibility into it.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    /// Where to redirect the customer to complete payment.
    pub authorization_url: String,

    /// Provider reference for the session.
    pub reference: String,

    /// Customer the session belongs to.
    pub customer_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RevokeRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
}

/// Result of revoking one or all subscriptions.
#[derive(Debug, Clone, Deserialize)]
pub struct RevokeOutcome {
    /// Human-readable confirmation.
    pub message: String,

    /// The revoked subscription, when a single one was targeted.
    pub subscription: Option<RevokedSubscription>,

    /// Number revoked, when all active subscriptions were targeted.
    ///
    /// The upstream contract does not pin down whether revoke-all with no
    /// active subscriptions yields `0` here or an error status; callers
    /// should handle both.
    pub revoked_count: Option<u64>,
}

/// Subscription row embedded in a revoke response.
#[derive(Debug, Clone, Deserialize)]
pub struct RevokedSubscription {
    /// Opaque subscription ID.
    pub id: String,

    /// Remaining server-supplied fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Error body shape the API uses for rejections.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn feature_ref_serializes_feature_id_only() {
        let fields = RefFields::try_from(&UsageRef::feature("feat-123")).unwrap();
        let body = serde_json::to_value(&fields).unwrap();
        assert_eq!(body, json!({"feature_id": "feat-123"}));
    }

    #[test]
    fn event_ref_serializes_event_name_only() {
        let fields = RefFields::try_from(&UsageRef::event("api_call")).unwrap();
        let body = serde_json::to_value(&fields).unwrap();
        assert_eq!(body, json!({"event_name": "api_call"}));
    }

    #[test]
    fn empty_ref_fails_validation() {
        let err = RefFields::try_from(&UsageRef::feature("")).unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[test]
    fn usage_write_flattens_the_subject() {
        let request = UsageWriteRequest {
            subject: RefFields::try_from(&UsageRef::event("api_call")).unwrap(),
            value: 3.0,
            metadata: None,
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body, json!({"event_name": "api_call", "value": 3.0}));
    }

    #[test]
    fn revoke_without_id_serializes_empty_object() {
        let request = RevokeRequest {
            subscription_id: None,
        };
        assert_eq!(serde_json::to_value(&request).unwrap(), json!({}));
    }

    #[test]
    fn checkout_options_omit_unset_fields() {
        let request = CheckoutRequest {
            plan_id: "01ARZ3NDEKTSV4RRFFQ69G5FAV".to_string(),
            amount: 5.0,
            options: CheckoutOptions {
                email: Some("jo@example.com".to_string()),
                ..CheckoutOptions::default()
            },
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            json!({
                "plan_id": "01ARZ3NDEKTSV4RRFFQ69G5FAV",
                "amount": 5.0,
                "email": "jo@example.com"
            })
        );
    }

    #[test]
    fn customer_preserves_unmodeled_fields() {
        let customer: Customer = serde_json::from_value(json!({
            "features": [{"id": "feat-1", "name": "Seats", "tier": "pro"}],
            "plan": "growth"
        }))
        .unwrap();

        assert_eq!(customer.features.len(), 1);
        assert_eq!(customer.features[0].extra["tier"], "pro");
        assert_eq!(customer.extra["plan"], "growth");
    }
}
