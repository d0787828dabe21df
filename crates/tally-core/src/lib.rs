//! Core types for the Tally billing SDK.
//!
//! This crate provides the domain vocabulary shared by the Tally client:
//!
//! - **Refs**: [`UsageRef`] — which feature or metered event an operation targets
//! - **Entitlements**: [`Entitlement`], [`UsageSnapshot`] — current allowance
//!   state for one feature or event on one customer
//! - **Events**: [`RealtimeEvent`], [`RealtimeEventKind`] — push notifications
//!   broadcast on a customer's private channel
//!
//! All identifiers (feature IDs, plan IDs, customer IDs, tokens) are opaque
//! strings. Nothing in this crate parses them beyond the ref classification
//! rule documented on [`UsageRef::parse`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod entitlement;
pub mod events;
pub mod refs;

pub use entitlement::{Entitlement, UsageSnapshot};
pub use events::{RealtimeEvent, RealtimeEventKind};
pub use refs::{RefError, UsageRef};
