//! Query cache for the read operations.
//!
//! Not a general-purpose cache: three fixed namespaces (check, usage,
//! customer) with per-namespace freshness windows, exact-key and
//! whole-namespace invalidation. Mutations pick their invalidation scope
//! from the table in [`crate::CachedClient`]; nothing here evicts on size
//! or refreshes in the background.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tally_core::{Entitlement, UsageRef, UsageSnapshot};

use crate::config::CacheConfig;
use crate::types::Customer;

struct Entry<T> {
    value: T,
    fetched_at: Instant,
}

impl<T: Clone> Entry<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            fetched_at: Instant::now(),
        }
    }

    fn fresh(&self, ttl: Duration) -> Option<T> {
        (self.fetched_at.elapsed() < ttl).then(|| self.value.clone())
    }
}

/// Which cached entries to discard.
///
/// Mutations use these internally; they are public so a realtime event
/// callback can drive the same edges by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationScope {
    /// Every check entry.
    AllChecks,

    /// Every derived usage entry.
    AllUsage,

    /// Every customer record.
    AllCustomers,

    /// The check entry for one ref.
    Check(UsageRef),

    /// The usage entry for one ref.
    Usage(UsageRef),

    /// The customer record for one id.
    Customer(String),
}

#[derive(Default)]
struct Store {
    check: HashMap<UsageRef, Entry<Entitlement>>,
    usage: HashMap<UsageRef, Entry<UsageSnapshot>>,
    customer: HashMap<String, Entry<Customer>>,
}

pub(crate) struct QueryCache {
    config: CacheConfig,
    store: Mutex<Store>,
}

impl QueryCache {
    pub(crate) fn new(config: CacheConfig) -> Self {
        Self {
            config,
            store: Mutex::new(Store::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn fresh_check(&self, subject: &UsageRef) -> Option<Entitlement> {
        self.lock()
            .check
            .get(subject)
            .and_then(|entry| entry.fresh(self.config.check_ttl))
    }

    pub(crate) fn store_check(&self, subject: &UsageRef, value: Entitlement) {
        self.lock().check.insert(subject.clone(), Entry::new(value));
    }

    pub(crate) fn fresh_usage(&self, subject: &UsageRef) -> Option<UsageSnapshot> {
        self.lock()
            .usage
            .get(subject)
            .and_then(|entry| entry.fresh(self.config.usage_ttl))
    }

    pub(crate) fn store_usage(&self, subject: &UsageRef, value: UsageSnapshot) {
        self.lock().usage.insert(subject.clone(), Entry::new(value));
    }

    pub(crate) fn fresh_customer(&self, customer_id: &str) -> Option<Customer> {
        self.lock()
            .customer
            .get(customer_id)
            .and_then(|entry| entry.fresh(self.config.customer_ttl))
    }

    pub(crate) fn store_customer(&self, customer_id: &str, value: Customer) {
        self.lock()
            .customer
            .insert(customer_id.to_string(), Entry::new(value));
    }

    pub(crate) fn invalidate(&self, scope: &InvalidationScope) {
        let mut store = self.lock();
        match scope {
            InvalidationScope::AllChecks => {
                store.check.clear();
            }
            InvalidationScope::AllUsage => {
                store.usage.clear();
            }
            InvalidationScope::AllCustomers => {
                store.customer.clear();
            }
            InvalidationScope::Check(subject) => {
                store.check.remove(subject);
            }
            InvalidationScope::Usage(subject) => {
                store.usage.remove(subject);
            }
            InvalidationScope::Customer(customer_id) => {
                store.customer.remove(customer_id);
            }
        }
        tracing::debug!(scope = ?scope, "cache invalidated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entitlement(usage: f64) -> Entitlement {
        Entitlement {
            allowed: true,
            balance: 100.0 - usage,
            usage,
            included_usage: 100.0,
            unlimited: false,
            interval: "month".to_string(),
            next_reset_at: None,
            code: "feature_found".to_string(),
        }
    }

    fn cache_with_ttl(ttl: Duration) -> QueryCache {
        QueryCache::new(CacheConfig {
            check_ttl: ttl,
            usage_ttl: ttl,
            customer_ttl: ttl,
        })
    }

    #[test]
    fn fresh_entry_is_served() {
        let cache = cache_with_ttl(Duration::from_secs(60));
        let subject = UsageRef::feature("feat-123");

        cache.store_check(&subject, entitlement(10.0));
        assert_eq!(cache.fresh_check(&subject), Some(entitlement(10.0)));
    }

    #[test]
    fn stale_entry_is_not_served() {
        let cache = cache_with_ttl(Duration::ZERO);
        let subject = UsageRef::feature("feat-123");

        cache.store_check(&subject, entitlement(10.0));
        assert_eq!(cache.fresh_check(&subject), None);
    }

    #[test]
    fn exact_invalidation_spares_other_refs() {
        let cache = cache_with_ttl(Duration::from_secs(60));
        let written = UsageRef::feature("feat-123");
        let other = UsageRef::feature("other-feature");

        cache.store_check(&written, entitlement(10.0));
        cache.store_check(&other, entitlement(20.0));
        cache.invalidate(&InvalidationScope::Check(written.clone()));

        assert_eq!(cache.fresh_check(&written), None);
        assert!(cache.fresh_check(&other).is_some());
    }

    #[test]
    fn namespace_invalidation_clears_every_ref() {
        let cache = cache_with_ttl(Duration::from_secs(60));
        let first = UsageRef::feature("feat-123");
        let second = UsageRef::event("api_call");

        cache.store_check(&first, entitlement(10.0));
        cache.store_check(&second, entitlement(20.0));
        cache.store_usage(&first, entitlement(10.0).snapshot());
        cache.invalidate(&InvalidationScope::AllChecks);

        assert_eq!(cache.fresh_check(&first), None);
        assert_eq!(cache.fresh_check(&second), None);
        // Other namespaces are untouched.
        assert!(cache.fresh_usage(&first).is_some());
    }
}
