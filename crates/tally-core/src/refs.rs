//! Usage references: which feature or metered event an operation targets.

use std::fmt;

/// The subject of a billing operation.
///
/// The billing API addresses usage either by feature ID or by event name,
/// never both. Keeping the two as explicit variants makes the request-body
/// invariant — exactly one of `feature_id`/`event_name` populated — hold by
/// construction instead of by string inspection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UsageRef {
    /// A billable feature, addressed by its opaque ID (e.g. `"seats-standard"`).
    Feature(String),

    /// A named usage event (e.g. `"api_call"`).
    Event(String),
}

impl UsageRef {
    /// Create a feature ref.
    #[must_use]
    pub fn feature(id: impl Into<String>) -> Self {
        Self::Feature(id.into())
    }

    /// Create an event ref.
    #[must_use]
    pub fn event(name: impl Into<String>) -> Self {
        Self::Event(name.into())
    }

    /// Classify a bare identifier: identifiers containing a hyphen are
    /// feature IDs, anything else is an event name.
    ///
    /// This mirrors the convention the billing dashboard uses when it issues
    /// feature IDs, but it is a convention, not a type check — an event name
    /// that happens to contain a hyphen will be classified as a feature and
    /// misrouted. Callers that know which kind they hold should use
    /// [`UsageRef::feature`] or [`UsageRef::event`] instead.
    ///
    /// # Errors
    ///
    /// Returns [`RefError::Empty`] for an empty identifier.
    pub fn parse(identifier: &str) -> Result<Self, RefError> {
        if identifier.is_empty() {
            return Err(RefError::Empty);
        }
        if identifier.contains('-') {
            Ok(Self::Feature(identifier.to_string()))
        } else {
            Ok(Self::Event(identifier.to_string()))
        }
    }

    /// The underlying identifier, whichever kind it is.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Feature(id) | Self::Event(id) => id,
        }
    }

    /// The feature ID, if this is a feature ref.
    #[must_use]
    pub fn feature_id(&self) -> Option<&str> {
        match self {
            Self::Feature(id) => Some(id),
            Self::Event(_) => None,
        }
    }

    /// The event name, if this is an event ref.
    #[must_use]
    pub fn event_name(&self) -> Option<&str> {
        match self {
            Self::Event(name) => Some(name),
            Self::Feature(_) => None,
        }
    }
}

impl fmt::Display for UsageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Errors producing a [`UsageRef`].
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RefError {
    /// The identifier was empty.
    #[error("empty usage ref")]
    Empty,
}
