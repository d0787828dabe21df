//! Transport seam for the realtime bridge.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tally_core::RealtimeEvent;
use tokio::sync::mpsc;

/// Events queued per subscription before the dispatch task drains them.
const EVENT_QUEUE_DEPTH: usize = 64;

/// Credentials a transport presents when subscribing to a private channel.
#[derive(Debug, Clone)]
pub struct ChannelAuth {
    /// Endpoint that authorizes the subscription.
    pub endpoint: String,

    /// Customer token presented as `Authorization: Bearer ...`.
    pub bearer: String,
}

impl ChannelAuth {
    /// Derive the auth target from the billing API URL: the broadcast
    /// server authorizes private channels at `<origin>/broadcasting/auth`,
    /// authenticated with the customer token.
    ///
    /// # Errors
    ///
    /// Returns [`RealtimeError::InvalidUrl`] if `api_url` does not parse.
    pub fn for_api(api_url: &str, customer_token: &str) -> Result<Self, RealtimeError> {
        let url = reqwest::Url::parse(api_url)
            .map_err(|err| RealtimeError::InvalidUrl(format!("{api_url}: {err}")))?;
        let origin = url.origin().ascii_serialization();
        Ok(Self {
            endpoint: format!("{origin}/broadcasting/auth"),
            bearer: customer_token.to_string(),
        })
    }
}

/// Errors from the realtime transport.
#[derive(Debug, thiserror::Error)]
pub enum RealtimeError {
    /// The API URL the auth endpoint derives from does not parse.
    #[error("invalid api url: {0}")]
    InvalidUrl(String),

    /// The channel subscription was rejected.
    #[error("subscription failed: {0}")]
    Subscribe(String),

    /// The transport connection failed.
    #[error("connection failed: {0}")]
    Connection(String),
}

/// Delivery of named events for one channel subscription.
pub type EventReceiver = mpsc::Receiver<RealtimeEvent>;

/// Pub/sub transport the bridge drives.
///
/// Implementations own the wire protocol and private-channel
/// authentication; the bridge only needs subscribe/unsubscribe.
#[async_trait]
pub trait RealtimeTransport: Send + Sync {
    /// Subscribe to `channel`, authenticating with `auth`. The returned
    /// receiver yields events until the channel is left or the connection
    /// drops.
    ///
    /// # Errors
    ///
    /// Fails if the connection cannot be established or the auth endpoint
    /// rejects the subscription.
    async fn subscribe(
        &self,
        channel: &str,
        auth: &ChannelAuth,
    ) -> Result<EventReceiver, RealtimeError>;

    /// Unsubscribe from `channel`. Unknown channels are a no-op.
    async fn unsubscribe(&self, channel: &str);
}

/// In-process transport: events are injected by the embedder (or a test)
/// instead of arriving over a socket.
#[derive(Default)]
pub struct InProcessTransport {
    channels: Mutex<HashMap<String, mpsc::Sender<RealtimeEvent>>>,
}

impl InProcessTransport {
    /// Create an empty transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver an event to a channel's subscriber.
    ///
    /// Returns whether the event was accepted (false when nothing is
    /// subscribed or the subscriber has gone away).
    pub async fn publish(&self, channel: &str, event: RealtimeEvent) -> bool {
        let sender = self
            .channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(channel)
            .cloned();
        match sender {
            Some(sender) => sender.send(event).await.is_ok(),
            None => false,
        }
    }
}

#[async_trait]
impl RealtimeTransport for InProcessTransport {
    async fn subscribe(
        &self,
        channel: &str,
        _auth: &ChannelAuth,
    ) -> Result<EventReceiver, RealtimeError> {
        let (sender, receiver) = mpsc::channel(EVENT_QUEUE_DEPTH);
        self.channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(channel.to_string(), sender);
        Ok(receiver)
    }

    async fn unsubscribe(&self, channel: &str) {
        self.channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(channel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_endpoint_derives_from_the_api_origin() {
        let auth =
            ChannelAuth::for_api("https://billing.example.com/api/v1", "cat_test").unwrap();
        assert_eq!(auth.endpoint, "https://billing.example.com/broadcasting/auth");
        assert_eq!(auth.bearer, "cat_test");
    }

    #[test]
    fn malformed_api_url_is_rejected() {
        let err = ChannelAuth::for_api("not a url", "cat_test").unwrap_err();
        assert!(matches!(err, RealtimeError::InvalidUrl(_)));
    }
}
