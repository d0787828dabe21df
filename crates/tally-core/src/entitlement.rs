//! Entitlement state returned by the check endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current entitlement state for one feature or event on one customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entitlement {
    /// Whether the customer may use the feature right now.
    pub allowed: bool,

    /// Remaining units in the current billing interval.
    pub balance: f64,

    /// Units consumed in the current billing interval.
    pub usage: f64,

    /// Units included with the customer's plan.
    pub included_usage: f64,

    /// Whether the entitlement is uncapped.
    pub unlimited: bool,

    /// Billing interval the balance resets on (e.g. `"month"`).
    pub interval: String,

    /// When the interval next resets, if it does.
    pub next_reset_at: Option<DateTime<Utc>>,

    /// Server decision code for the allowed/denied outcome.
    pub code: String,
}

impl Entitlement {
    /// Project the usage triple served by the derived usage read.
    #[must_use]
    pub fn snapshot(&self) -> UsageSnapshot {
        UsageSnapshot {
            usage: self.usage,
            balance: self.balance,
            included_usage: self.included_usage,
        }
    }
}

/// The usage/balance/included triple derived from an [`Entitlement`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    /// Units consumed in the current billing interval.
    pub usage: f64,

    /// Remaining units.
    pub balance: f64,

    /// Units included with the plan.
    pub included_usage: f64,
}
