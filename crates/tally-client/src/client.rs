//! Billing API HTTP client.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tally_core::{Entitlement, UsageRef};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::types::{
    ApiErrorBody, CheckoutOptions, CheckoutRequest, CheckoutSession, Customer, RefFields,
    RevokeOutcome, RevokeRequest, SetUsageReceipt, TrackReceipt, UsageWriteRequest,
};

/// Tally billing API client.
///
/// One method per billing endpoint; every call is a single authenticated
/// request/response cycle with no retries and no client-side state beyond
/// the credentials. Instances are cheap to clone; clones share credentials,
/// so rotating the token on one applies to subsequent calls on all of them
/// (in-flight requests keep the headers they were issued with).
#[derive(Debug, Clone)]
pub struct TallyClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Arc<RwLock<Credentials>>,
}

#[derive(Debug)]
struct Credentials {
    public_key: String,
    customer_token: String,
}

impl TallyClient {
    /// Create a new client from a validated config.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] if the HTTP client cannot be
    /// built.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| {
                ClientError::Configuration(format!("failed to build HTTP client: {err}"))
            })?;

        Ok(Self {
            http,
            base_url: config.api_url,
            credentials: Arc::new(RwLock::new(Credentials {
                public_key: config.public_key,
                customer_token: config.customer_token,
            })),
        })
    }

    /// Replace the customer token used by subsequent calls.
    pub fn set_customer_token(&self, token: impl Into<String>) {
        self.credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .customer_token = token.into();
    }

    /// Replace the public key used by subsequent calls.
    pub fn set_public_key(&self, public_key: impl Into<String>) {
        self.credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .public_key = public_key.into();
    }

    /// Check feature access or event balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn check(&self, subject: &UsageRef) -> Result<Entitlement, ClientError> {
        let body = RefFields::try_from(subject)?;
        let url = format!("{}/api/v1/customers/check", self.base_url);

        let response = self.authed(self.http.post(&url)).json(&body).send().await?;
        self.handle_response(response).await
    }

    /// Track an incremental usage event.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn track(
        &self,
        subject: &UsageRef,
        value: f64,
        metadata: Option<serde_json::Value>,
    ) -> Result<TrackReceipt, ClientError> {
        let body = UsageWriteRequest {
            subject: RefFields::try_from(subject)?,
            value,
            metadata,
        };
        let url = format!("{}/api/v1/customers/track", self.base_url);

        let response = self.authed(self.http.post(&url)).json(&body).send().await?;
        self.handle_response(response).await
    }

    /// Overwrite usage for a feature or event with an absolute value.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn set_usage(
        &self,
        subject: &UsageRef,
        value: f64,
        metadata: Option<serde_json::Value>,
    ) -> Result<SetUsageReceipt, ClientError> {
        let body = UsageWriteRequest {
            subject: RefFields::try_from(subject)?,
            value,
            metadata,
        };
        let url = format!("{}/api/v1/customers/usage", self.base_url);

        let response = self.authed(self.http.post(&url)).json(&body).send().await?;
        self.handle_response(response).await
    }

    /// Fetch a customer record with its features.
    ///
    /// The endpoint requires business-level credentials; a client configured
    /// with a customer token will be rejected server-side. Primarily for
    /// server-side use.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn get_customer(&self, customer_id: &str) -> Result<Customer, ClientError> {
        if customer_id.is_empty() {
            return Err(ClientError::Validation(
                "a customer id is required".to_string(),
            ));
        }
        let url = format!("{}/api/v1/customers/{customer_id}", self.base_url);

        let response = self.authed(self.http.get(&url)).send().await?;
        self.handle_response(response).await
    }

    /// Create a checkout session for a plan.
    ///
    /// `amount` is validated server-side (minimum 1); an out-of-range value
    /// comes back as a request error, not a local check.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn create_checkout(
        &self,
        plan_id: &str,
        amount: f64,
        options: CheckoutOptions,
    ) -> Result<CheckoutSession, ClientError> {
        if plan_id.is_empty() {
            return Err(ClientError::Validation("a plan id is required".to_string()));
        }
        let body = CheckoutRequest {
            plan_id: plan_id.to_string(),
            amount,
            options,
        };
        let url = format!("{}/api/v1/customers/checkout", self.base_url);

        let response = self.authed(self.http.post(&url)).json(&body).send().await?;
        self.handle_response(response).await
    }

    /// Revoke one subscription, or every active subscription for the
    /// customer when no id is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn revoke_subscription(
        &self,
        subscription_id: Option<&str>,
    ) -> Result<RevokeOutcome, ClientError> {
        let body = RevokeRequest {
            subscription_id: subscription_id.map(ToString::to_string),
        };
        let url = format!("{}/api/v1/customers/revoke_subscription", self.base_url);

        let response = self.authed(self.http.post(&url)).json(&body).send().await?;
        self.handle_response(response).await
    }

    /// Attach auth and content headers, reading credentials at call time.
    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let credentials = self
            .credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        builder
            .header(
                "Authorization",
                format!("Bearer {}", credentials.customer_token),
            )
            .header("X-Public-Key", &credentials.public_key)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
    }

    /// Convert a response into a typed result, sanitizing errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        // Only the body's `message` field is surfaced from a rejection;
        // credentials never appear in the error.
        let message = match response.json::<ApiErrorBody>().await {
            Ok(ApiErrorBody {
                message: Some(message),
            }) => message,
            _ => format!("request failed with status {}", status.as_u16()),
        };

        tracing::debug!(status = status.as_u16(), "billing API rejected request");
        Err(ClientError::Request {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TallyClient {
        let config =
            ClientConfig::new("http://localhost:8080/", "pk_test_abc", "cat_test_xyz").unwrap();
        TallyClient::new(config).unwrap()
    }

    #[test]
    fn client_uses_trimmed_base_url() {
        assert_eq!(client().base_url, "http://localhost:8080");
    }

    #[test]
    fn token_rotation_is_shared_with_clones() {
        let client = client();
        let clone = client.clone();
        client.set_customer_token("cat_rotated");

        let credentials = clone
            .credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        assert_eq!(credentials.customer_token, "cat_rotated");
    }

    #[test]
    fn public_key_rotation_applies() {
        let client = client();
        client.set_public_key("pk_rotated");

        let credentials = client
            .credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        assert_eq!(credentials.public_key, "pk_rotated");
    }
}
