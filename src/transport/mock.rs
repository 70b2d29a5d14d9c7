// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory transport for unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::broadcast;

use super::{SessionEvent, Transport};
use crate::error::ProtocolError;

type Responder = Box<dyn FnMut(&Value) -> Option<Value> + Send>;

/// Scriptable in-memory stand-in for the TCP transport.
///
/// Records every line sent through it and answers via an optional
/// responder closure. Cloning yields another handle to the same mock, so
/// a test can keep one for assertions after moving the other into the
/// code under test.
#[derive(Clone)]
pub(crate) struct MockTransport {
    inner: Arc<Inner>,
}

struct Inner {
    events: broadcast::Sender<SessionEvent>,
    sent: Mutex<Vec<String>>,
    responder: Mutex<Option<Responder>>,
    connected: AtomicBool,
    socket_present: AtomicBool,
    accept_connects: AtomicBool,
    forced_disconnects: AtomicUsize,
    retry_cancels: AtomicUsize,
}

impl MockTransport {
    /// A mock that never answers.
    pub(crate) fn silent() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(Inner {
                events,
                sent: Mutex::new(Vec::new()),
                responder: Mutex::new(None),
                connected: AtomicBool::new(false),
                socket_present: AtomicBool::new(false),
                accept_connects: AtomicBool::new(true),
                forced_disconnects: AtomicUsize::new(0),
                retry_cancels: AtomicUsize::new(0),
            }),
        }
    }

    /// A mock that acknowledges every command with `["ok"]`.
    pub(crate) fn auto_ok() -> Self {
        Self::respond_with(|command| {
            let id = command.get("id")?.as_i64()?;
            Some(serde_json::json!({"id": id, "result": ["ok"]}))
        })
    }

    /// A mock driven by the given responder closure. Returning `None`
    /// leaves a command unanswered.
    pub(crate) fn respond_with<F>(responder: F) -> Self
    where
        F: FnMut(&Value) -> Option<Value> + Send + 'static,
    {
        let mock = Self::silent();
        mock.set_responder(responder);
        mock
    }

    pub(crate) fn set_responder<F>(&self, responder: F)
    where
        F: FnMut(&Value) -> Option<Value> + Send + 'static,
    {
        *self.inner.responder.lock() = Some(Box::new(responder));
    }

    /// Every line sent so far, in order.
    pub(crate) fn sent_lines(&self) -> Vec<String> {
        self.inner.sent.lock().clone()
    }

    /// The `method` field of every line sent so far.
    pub(crate) fn sent_methods(&self) -> Vec<String> {
        self.sent_lines()
            .iter()
            .filter_map(|line| {
                let value: Value = serde_json::from_str(line).ok()?;
                Some(value.get("method")?.as_str()?.to_string())
            })
            .collect()
    }

    pub(crate) fn sent_count(&self) -> usize {
        self.inner.sent.lock().len()
    }

    /// Live event-stream subscribers.
    pub(crate) fn subscriber_count(&self) -> usize {
        self.inner.events.receiver_count()
    }

    /// Pushes an inbound message, as if the device had sent a line.
    pub(crate) fn emit_message(&self, value: Value) {
        let _ = self.inner.events.send(SessionEvent::Message(value));
    }

    /// Simulates a socket loss.
    pub(crate) fn lose_socket(&self) {
        self.inner.connected.store(false, Ordering::Release);
        self.inner.socket_present.store(false, Ordering::Release);
        let _ = self.inner.events.send(SessionEvent::Disconnected);
    }

    /// Simulates a dial that opened a socket without reaching a usable
    /// session, so `has_socket` reports `true` while `is_connected` does
    /// not.
    pub(crate) fn dial_only(&self) {
        self.inner.socket_present.store(true, Ordering::Release);
    }

    /// Makes later `connect` calls do nothing, as if the device were
    /// unreachable. `restore_socket` still works.
    pub(crate) fn refuse_connections(&self) {
        self.inner.accept_connects.store(false, Ordering::Release);
    }

    /// Simulates the low-level retry succeeding.
    pub(crate) fn restore_socket(&self) {
        self.inner.connected.store(true, Ordering::Release);
        let _ = self.inner.events.send(SessionEvent::Connected);
    }

    pub(crate) fn forced_disconnects(&self) -> usize {
        self.inner.forced_disconnects.load(Ordering::Acquire)
    }

    pub(crate) fn retry_cancels(&self) -> usize {
        self.inner.retry_cancels.load(Ordering::Acquire)
    }
}

impl Transport for MockTransport {
    fn connect(&self) {
        if !self.inner.accept_connects.load(Ordering::Acquire) {
            return;
        }
        self.inner.socket_present.store(true, Ordering::Release);
        if !self.inner.connected.swap(true, Ordering::AcqRel) {
            let _ = self.inner.events.send(SessionEvent::Connected);
        }
    }

    fn disconnect(&self, force: bool) {
        if force {
            self.inner.forced_disconnects.fetch_add(1, Ordering::AcqRel);
        }
        self.inner.socket_present.store(false, Ordering::Release);
        if self.inner.connected.swap(false, Ordering::AcqRel) {
            let _ = self.inner.events.send(SessionEvent::Disconnected);
        }
    }

    async fn send(&self, line: &str) -> Result<(), ProtocolError> {
        if !self.inner.connected.load(Ordering::Acquire) {
            return Err(ProtocolError::NotConnected);
        }
        self.inner.sent.lock().push(line.to_string());

        let command: Value = serde_json::from_str(line).expect("sent line must be valid JSON");
        let reply = {
            let mut responder = self.inner.responder.lock();
            responder.as_mut().and_then(|respond| respond(&command))
        };
        if let Some(reply) = reply {
            let _ = self.inner.events.send(SessionEvent::Message(reply));
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::Acquire)
    }

    fn has_socket(&self) -> bool {
        self.is_connected() || self.inner.socket_present.load(Ordering::Acquire)
    }

    fn cancel_retry(&self) {
        self.inner.retry_cancels.fetch_add(1, Ordering::AcqRel);
    }
}
