//! Tally client SDK.
//!
//! This crate provides a typed async client for the Tally usage-based
//! billing API, a cache binding layer with a fixed read/write/invalidate
//! contract, and an optional realtime bridge for per-customer push events.
//!
//! # Example
//!
//! ```no_run
//! use tally_client::{CachedClient, ClientConfig, TallyClient};
//! use tally_core::UsageRef;
//!
//! # async fn example() -> Result<(), tally_client::ClientError> {
//! let config = ClientConfig::new(
//!     "https://billing.example.com",
//!     "pk_live_1234",
//!     "cat_live_5678",
//! )?;
//! let client = CachedClient::new(TallyClient::new(config)?);
//!
//! let seats = UsageRef::feature("seats-standard");
//! let entitlement = client.check(&seats).await?;
//! if entitlement.allowed {
//!     client.track(&seats, 1.0, None).await?;
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod cache;
mod cached;
mod client;
mod config;
mod error;
pub mod realtime;
mod types;

pub use cache::InvalidationScope;
pub use cached::CachedClient;
pub use client::TallyClient;
pub use config::{CacheConfig, ClientConfig, RealtimeConfig};
pub use error::ClientError;
pub use types::{
    CheckoutOptions, CheckoutSession, Customer, CustomerFeature, RevokeOutcome,
    RevokedSubscription, SetUsageReceipt, TrackReceipt,
};

pub use tally_core::{Entitlement, RealtimeEvent, RealtimeEventKind, UsageRef, UsageSnapshot};
