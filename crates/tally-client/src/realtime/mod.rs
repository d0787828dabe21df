//! Realtime bridge: per-customer private-channel subscription with named
//! event callbacks.
//!
//! The bridge never touches the query cache. That decoupling is deliberate:
//! push events and cached reads stay independent, and a caller that wants
//! push-driven cache coherence invalidates from its own callback:
//!
//! ```no_run
//! # async fn example(
//! #     cached: tally_client::CachedClient,
//! #     bridge: tally_client::realtime::RealtimeBridge,
//! # ) {
//! use tally_client::InvalidationScope;
//!
//! bridge.listen("usage.updated", move |_event| {
//!     cached.invalidate(&InvalidationScope::AllChecks);
//!     cached.invalidate(&InvalidationScope::AllUsage);
//! });
//! # }
//! ```

mod transport;

pub use transport::{
    ChannelAuth, EventReceiver, InProcessTransport, RealtimeError, RealtimeTransport,
};

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tally_core::RealtimeEvent;
use tokio::task::JoinHandle;

/// Connection lifecycle of a [`RealtimeBridge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Realtime not enabled, or torn down.
    Disabled,

    /// Subscription requested, channel not yet acknowledged.
    Connecting,

    /// Channel acknowledged; events flowing.
    Connected,
}

type Callback = Arc<dyn Fn(&RealtimeEvent) + Send + Sync>;
type ListenerMap = HashMap<String, Vec<Callback>>;

/// One customer's private-channel subscription.
///
/// The bridge is an explicitly owned object with process-wide lifecycle
/// rules: build it where the customer session lives, [`connect`] once,
/// hand it (behind an `Arc` if shared) to whatever consumes events, and
/// [`leave_channel`] on teardown. At most one channel subscription exists
/// per bridge.
///
/// [`connect`]: Self::connect
/// [`leave_channel`]: Self::leave_channel
pub struct RealtimeBridge {
    transport: Arc<dyn RealtimeTransport>,
    customer_id: String,
    auth: ChannelAuth,
    enabled: bool,
    state: Mutex<ConnectionState>,
    listeners: Arc<Mutex<ListenerMap>>,
    dispatch: Mutex<Option<JoinHandle<()>>>,
}

impl RealtimeBridge {
    /// Build a bridge for one customer's private channel.
    ///
    /// With `enabled: false` the bridge stays permanently [`Disabled`] and
    /// every method is a no-op, so embedders keep one code path whether or
    /// not realtime is configured.
    ///
    /// [`Disabled`]: ConnectionState::Disabled
    #[must_use]
    pub fn new(
        transport: Arc<dyn RealtimeTransport>,
        customer_id: impl Into<String>,
        auth: ChannelAuth,
        enabled: bool,
    ) -> Self {
        let customer_id = customer_id.into();
        Self {
            transport,
            enabled: enabled && !customer_id.is_empty(),
            customer_id,
            auth,
            state: Mutex::new(ConnectionState::Disabled),
            listeners: Arc::new(Mutex::new(ListenerMap::new())),
            dispatch: Mutex::new(None),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *lock(&self.state)
    }

    /// Channel the bridge subscribes to: `private-customer.{id}`.
    #[must_use]
    pub fn channel_name(&self) -> String {
        format!("private-customer.{}", self.customer_id)
    }

    /// Subscribe to the customer's private channel and start dispatching
    /// events to registered listeners.
    ///
    /// No-op when disabled or already connecting/connected. On a transport
    /// failure the bridge returns to [`ConnectionState::Disabled`] so a
    /// later attempt is possible; there is no automatic reconnect.
    ///
    /// # Errors
    ///
    /// Propagates the transport's subscribe failure.
    pub async fn connect(&self) -> Result<(), RealtimeError> {
        if !self.enabled {
            return Ok(());
        }
        {
            let mut state = lock(&self.state);
            if *state != ConnectionState::Disabled {
                return Ok(());
            }
            *state = ConnectionState::Connecting;
        }

        let channel = self.channel_name();
        match self.transport.subscribe(&channel, &self.auth).await {
            Ok(receiver) => {
                let listeners = Arc::clone(&self.listeners);
                *lock(&self.dispatch) = Some(tokio::spawn(dispatch_events(receiver, listeners)));
                *lock(&self.state) = ConnectionState::Connected;
                tracing::debug!(channel = %channel, "realtime channel connected");
                Ok(())
            }
            Err(err) => {
                *lock(&self.state) = ConnectionState::Disabled;
                tracing::debug!(channel = %channel, error = %err, "realtime subscribe failed");
                Err(err)
            }
        }
    }

    /// Register `callback` for events named `event` (e.g. `"usage.updated"`).
    ///
    /// No-op while the bridge is disabled. Listeners registered before
    /// [`connect`](Self::connect) receive events once connected.
    pub fn listen(&self, event: &str, callback: impl Fn(&RealtimeEvent) + Send + Sync + 'static) {
        if !self.enabled {
            return;
        }
        lock(&self.listeners)
            .entry(event.to_string())
            .or_default()
            .push(Arc::new(callback));
    }

    /// Unsubscribe and stop dispatching. Idempotent.
    pub async fn leave_channel(&self) {
        if !self.enabled {
            return;
        }
        let previous = {
            let mut state = lock(&self.state);
            std::mem::replace(&mut *state, ConnectionState::Disabled)
        };
        if previous == ConnectionState::Disabled {
            return;
        }

        self.transport.unsubscribe(&self.channel_name()).await;
        if let Some(handle) = lock(&self.dispatch).take() {
            handle.abort();
        }
        tracing::debug!(channel = %self.channel_name(), "realtime channel left");
    }
}

impl Drop for RealtimeBridge {
    fn drop(&mut self) {
        // The transport unsubscribe needs an async context; dropping only
        // stops local dispatch.
        if let Some(handle) = lock(&self.dispatch).take() {
            handle.abort();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn dispatch_events(mut receiver: EventReceiver, listeners: Arc<Mutex<ListenerMap>>) {
    while let Some(event) = receiver.recv().await {
        // Snapshot the callbacks so listeners can be registered from inside
        // a callback without deadlocking.
        let registered: Vec<Callback> = lock(&listeners)
            .get(&event.name)
            .cloned()
            .unwrap_or_default();

        if registered.is_empty() {
            tracing::debug!(event = %event.name, "realtime event with no listener");
            continue;
        }
        for callback in registered {
            callback(&event);
        }
    }
}
