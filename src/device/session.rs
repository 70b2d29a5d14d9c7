// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session lifecycle behind the [`ScreenLightBar`](super::ScreenLightBar)
//! facade.
//!
//! A session owns the transport, the command dispatcher, the property
//! cache and the callback registry. [`establish`] drives the initial
//! connection, [`run_listener`] reacts to everything the device pushes
//! afterwards: property notifications, socket losses and reconnects.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{broadcast, watch};

use crate::dispatch::CommandDispatcher;
use crate::error::{ProtocolError, Result};
use crate::protocol::{InboundMessage, codec};
use crate::state::{DeviceProperty, STATE_PROPS, StateCache};
use crate::subscription::CallbackRegistry;
use crate::transport::{SessionEvent, Transport};

use super::builder::SessionOptions;

/// Lifecycle of a device session.
///
/// `Disconnected` is terminal: it is only entered through an explicit
/// [`disconnect`](super::ScreenLightBar::disconnect). A lost socket puts
/// the session into `Reconnecting` instead and the transport keeps
/// dialing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Ready,
    Reconnecting,
    Disconnected,
}

impl SessionState {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Ready => "ready",
            Self::Reconnecting => "reconnecting",
            Self::Disconnected => "disconnected",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shared state of one device session.
pub(crate) struct SessionCore<T> {
    pub(crate) transport: Arc<T>,
    pub(crate) dispatcher: Arc<CommandDispatcher<T>>,
    pub(crate) cache: StateCache,
    pub(crate) callbacks: CallbackRegistry,
    pub(crate) options: SessionOptions,
    pub(crate) model: String,
    pub(crate) address: String,
    state_tx: watch::Sender<SessionState>,
}

impl<T> SessionCore<T>
where
    T: Transport + Send + Sync + 'static,
{
    pub(crate) fn new(
        transport: Arc<T>,
        dispatcher: Arc<CommandDispatcher<T>>,
        options: SessionOptions,
        model: String,
        address: String,
    ) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Connecting);
        Self {
            transport,
            dispatcher,
            cache: StateCache::new(),
            callbacks: CallbackRegistry::new(),
            options,
            model,
            address,
            state_tx,
        }
    }

    pub(crate) fn session_state(&self) -> SessionState {
        *self.state_tx.borrow()
    }

    pub(crate) fn watch_session(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    pub(crate) fn set_state(&self, next: SessionState) {
        let previous = self.state_tx.send_replace(next);
        if previous != next {
            tracing::debug!(from = %previous, to = %next, "session state changed");
        }
    }

    /// Re-reads the cached property set and replaces the cache with the
    /// answer. Subscribers see the fields that actually changed. On error
    /// the cache keeps its previous content.
    pub(crate) async fn refresh(&self) -> Result<()> {
        let record = self.dispatcher.get_prop(&STATE_PROPS).await?;
        let changed = self.cache.replace(record);
        self.emit_changed(changed);
        Ok(())
    }

    pub(crate) async fn refresh_swallowed(&self) {
        if let Err(error) = self.refresh().await {
            tracing::warn!(error = %error, "state refresh failed");
        }
    }

    fn emit_changed(&self, changed: DeviceProperty) {
        if changed.is_empty() {
            return;
        }
        self.callbacks.dispatch_state_changed(&changed);
    }

    async fn handle_message(&self, value: &Value) {
        match codec::classify(value) {
            Some(InboundMessage::Notification(notification)) => {
                if notification.touches_power {
                    // Power pushes are unreliable on this firmware, so the
                    // cache is rebuilt from a fresh read instead of merged.
                    tracing::debug!("device reported a power change, re-reading state");
                    self.refresh_swallowed().await;
                } else {
                    let changed = self.cache.merge(&notification.record);
                    self.emit_changed(changed);
                }
            }
            // Responses are consumed by the dispatcher's own subscribers.
            Some(InboundMessage::Response(_)) => {}
            None => tracing::trace!(payload = %value, "ignoring unrecognized line"),
        }
    }

    async fn handle_reconnected(&self) {
        tokio::time::sleep(self.options.settle_delay).await;
        self.set_state(SessionState::Ready);
        match self.dispatcher.get_prop(&STATE_PROPS).await {
            Ok(record) => {
                self.cache.replace(record);
                let snapshot = self.cache.snapshot();
                self.callbacks.dispatch_connected(&snapshot);
                // After a coverage gap every present field counts as changed.
                self.emit_changed(snapshot.diff(&DeviceProperty::default()));
            }
            Err(error) => {
                tracing::warn!(error = %error, "state re-read after reconnect failed");
            }
        }
    }

    fn handle_disconnected(&self) {
        tracing::debug!("connection lost, retry pending");
        self.dispatcher.cancel_pending();
        self.set_state(SessionState::Reconnecting);
        self.callbacks.dispatch_disconnected();
    }
}

/// Waits until the transport reports a usable connection, then lets the
/// device settle before any command is sent.
///
/// An already-connected transport short-circuits without the settle
/// delay. On timeout a half-open socket is torn down and an idle retry
/// loop is stopped, so the transport ends up quiet either way.
pub(crate) async fn establish<T: Transport>(transport: &T, options: &SessionOptions) -> Result<()> {
    if transport.is_connected() {
        return Ok(());
    }

    let mut events = transport.subscribe();
    transport.connect();

    // Safe: connect timeouts are far below u64::MAX milliseconds.
    #[allow(clippy::cast_possible_truncation)]
    let timeout_ms = options.connect_timeout.as_millis() as u64;

    let wait = tokio::time::timeout(options.connect_timeout, async {
        loop {
            match events.recv().await {
                Ok(SessionEvent::Connected) => return Ok(()),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event stream lagged while connecting");
                    if transport.is_connected() {
                        return Ok(());
                    }
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(ProtocolError::ChannelClosed("transport events".to_string()));
                }
            }
        }
    })
    .await;

    match wait {
        Ok(outcome) => outcome?,
        Err(_elapsed) => {
            if transport.has_socket() {
                transport.disconnect(true);
            } else {
                transport.cancel_retry();
            }
            tracing::warn!(timeout_ms, "connection attempt timed out");
            return Err(ProtocolError::ConnectionTimeout(timeout_ms).into());
        }
    }

    tokio::time::sleep(options.settle_delay).await;
    tracing::debug!("session settled");
    Ok(())
}

/// Reacts to transport events until the event stream closes or the task
/// is aborted by [`disconnect`](super::ScreenLightBar::disconnect).
pub(crate) async fn run_listener<T>(
    core: Arc<SessionCore<T>>,
    mut events: broadcast::Receiver<SessionEvent>,
) where
    T: Transport + Send + Sync + 'static,
{
    loop {
        match events.recv().await {
            Ok(SessionEvent::Message(value)) => core.handle_message(&value).await,
            Ok(SessionEvent::Connected) => core.handle_reconnected().await,
            Ok(SessionEvent::Disconnected) => core.handle_disconnected(),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event stream lagged, re-reading device state");
                core.refresh_swallowed().await;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::Instant;

    use super::*;
    use crate::error::Error;
    use crate::transport::mock::MockTransport;

    fn options_for_test() -> SessionOptions {
        SessionOptions {
            connect_timeout: Duration::from_secs(3),
            settle_delay: Duration::from_millis(100),
            ..SessionOptions::default()
        }
    }

    #[test]
    fn session_states_render_lowercase() {
        assert_eq!(SessionState::Connecting.to_string(), "connecting");
        assert_eq!(SessionState::Ready.to_string(), "ready");
        assert_eq!(SessionState::Reconnecting.to_string(), "reconnecting");
        assert_eq!(SessionState::Disconnected.to_string(), "disconnected");
    }

    #[tokio::test(start_paused = true)]
    async fn established_transport_short_circuits() {
        let mock = MockTransport::silent();
        mock.connect();
        let before = Instant::now();

        establish(&mock, &options_for_test()).await.unwrap();

        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_connection_waits_for_the_settle_delay() {
        let mock = MockTransport::silent();
        let before = Instant::now();

        establish(&mock, &options_for_test()).await.unwrap();

        assert!(mock.is_connected());
        assert_eq!(before.elapsed(), Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_without_a_socket_stops_the_retry_loop() {
        let mock = MockTransport::silent();
        mock.refuse_connections();

        let error = establish(&mock, &options_for_test()).await.unwrap_err();

        assert!(matches!(
            error,
            Error::Protocol(ProtocolError::ConnectionTimeout(3000))
        ));
        assert_eq!(mock.retry_cancels(), 1);
        assert_eq!(mock.forced_disconnects(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_with_a_half_open_socket_forces_a_teardown() {
        let mock = MockTransport::silent();
        mock.refuse_connections();
        mock.dial_only();

        let error = establish(&mock, &options_for_test()).await.unwrap_err();

        assert!(matches!(
            error,
            Error::Protocol(ProtocolError::ConnectionTimeout(3000))
        ));
        assert_eq!(mock.forced_disconnects(), 1);
        assert_eq!(mock.retry_cancels(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn late_connections_beat_the_timeout() {
        let mock = MockTransport::silent();
        mock.refuse_connections();
        let trigger = mock.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.restore_socket();
        });
        let before = Instant::now();

        establish(&mock, &options_for_test()).await.unwrap();

        assert_eq!(before.elapsed(), Duration::from_millis(1100));
    }
}
