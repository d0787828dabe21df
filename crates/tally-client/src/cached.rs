//! Cache-aware client: reads served cache-first, mutations wired to their
//! invalidation edges.

use std::sync::Arc;

use tally_core::{Entitlement, UsageRef, UsageSnapshot};

use crate::cache::{InvalidationScope, QueryCache};
use crate::client::TallyClient;
use crate::config::CacheConfig;
use crate::error::ClientError;
use crate::types::{
    CheckoutOptions, CheckoutSession, Customer, RevokeOutcome, SetUsageReceipt, TrackReceipt,
};

/// [`TallyClient`] plus the read/write/invalidate contract.
///
/// Reads (`check`, `usage`, `customer`) return the cached value while it is
/// inside its freshness window and re-fetch otherwise. Mutations always hit
/// the API; on success they discard the cached reads they may have changed:
///
/// | Mutation | Discards |
/// |---|---|
/// | [`track`](Self::track) | every check and usage entry |
/// | [`set_usage`](Self::set_usage) | the written ref's check and usage entries |
/// | [`revoke_subscription`](Self::revoke_subscription) | every customer record |
/// | [`create_checkout`](Self::create_checkout) | nothing |
///
/// `track` discards broadly because one recorded event can move several
/// derived balances (shared pools); `set_usage` is a direct non-aggregating
/// overwrite, so only the written ref can have changed. A failed mutation
/// discards nothing.
///
/// Realtime events are not wired in automatically: a caller that wants
/// push-driven coherence calls [`invalidate`](Self::invalidate) from its
/// event callback.
#[derive(Clone)]
pub struct CachedClient {
    client: TallyClient,
    cache: Arc<QueryCache>,
}

impl CachedClient {
    /// Wrap a client with default freshness windows.
    #[must_use]
    pub fn new(client: TallyClient) -> Self {
        Self::with_config(client, CacheConfig::default())
    }

    /// Wrap a client with custom freshness windows.
    #[must_use]
    pub fn with_config(client: TallyClient, config: CacheConfig) -> Self {
        Self {
            client,
            cache: Arc::new(QueryCache::new(config)),
        }
    }

    /// The underlying client, for cache-bypassing calls and credential
    /// rotation.
    #[must_use]
    pub fn client(&self) -> &TallyClient {
        &self.client
    }

    /// Check feature access or event balance, cache-first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn check(&self, subject: &UsageRef) -> Result<Entitlement, ClientError> {
        if let Some(hit) = self.cache.fresh_check(subject) {
            tracing::debug!(subject = %subject, "check served from cache");
            return Ok(hit);
        }
        let entitlement = self.client.check(subject).await?;
        self.cache.store_check(subject, entitlement.clone());
        Ok(entitlement)
    }

    /// Current usage triple for a ref, cache-first.
    ///
    /// Derived from the check endpoint; there is no separate usage read on
    /// the wire.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn usage(&self, subject: &UsageRef) -> Result<UsageSnapshot, ClientError> {
        if let Some(hit) = self.cache.fresh_usage(subject) {
            tracing::debug!(subject = %subject, "usage served from cache");
            return Ok(hit);
        }
        let snapshot = self.client.check(subject).await?.snapshot();
        self.cache.store_usage(subject, snapshot);
        Ok(snapshot)
    }

    /// Fetch a customer record, cache-first.
    ///
    /// Same credential caveat as [`TallyClient::get_customer`].
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn customer(&self, customer_id: &str) -> Result<Customer, ClientError> {
        if let Some(hit) = self.cache.fresh_customer(customer_id) {
            tracing::debug!(customer_id, "customer served from cache");
            return Ok(hit);
        }
        let customer = self.client.get_customer(customer_id).await?;
        self.cache.store_customer(customer_id, customer.clone());
        Ok(customer)
    }

    /// Track an incremental usage event and discard every cached check and
    /// usage entry.
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
        let receipt = self.client.track(subject, value, metadata).await?;
        self.cache.invalidate(&InvalidationScope::AllChecks);
        self.cache.invalidate(&InvalidationScope::AllUsage);
        Ok(receipt)
    }

    /// Overwrite usage for a ref and discard that ref's cached entries only.
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
        let receipt = self.client.set_usage(subject, value, metadata).await?;
        self.cache
            .invalidate(&InvalidationScope::Check(subject.clone()));
        self.cache
            .invalidate(&InvalidationScope::Usage(subject.clone()));
        Ok(receipt)
    }

    /// Revoke one or all subscriptions and discard every cached customer
    /// record.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn revoke_subscription(
        &self,
        subscription_id: Option<&str>,
    ) -> Result<RevokeOutcome, ClientError> {
        let outcome = self.client.revoke_subscription(subscription_id).await?;
        self.cache.invalidate(&InvalidationScope::AllCustomers);
        Ok(outcome)
    }

    /// Create a checkout session. No cached read depends on checkout state
    /// (it lives server-side and in the redirect), so nothing is discarded.
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
        self.client.create_checkout(plan_id, amount, options).await
    }

    /// Discard cached reads by hand, e.g. from a realtime event callback.
    pub fn invalidate(&self, scope: &InvalidationScope) {
        self.cache.invalidate(scope);
    }
}
