// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session transport boundary.
//!
//! Everything socket-shaped lives behind the [`Transport`] trait: raw TCP,
//! line framing, JSON decode and the low-level reconnect schedule. The
//! layers above only see [`SessionEvent`]s and an async `send`. The crate
//! ships [`TcpTransport`] as the production implementation; tests swap in
//! an in-memory mock.

use std::future::Future;

use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::ProtocolError;

mod tcp;

#[cfg(test)]
pub(crate) mod mock;

pub use tcp::TcpTransport;

/// Lifecycle and traffic events fanned out to transport subscribers.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The socket is established and readable.
    Connected,
    /// The socket is gone; the transport retries on its own schedule
    /// unless it was force-disconnected.
    Disconnected,
    /// One decoded inbound JSON line.
    Message(Value),
}

/// A connection to the device.
///
/// Implementations retry lost connections on their own; `connect` and
/// `disconnect` only steer that machinery. Subscribers observe the
/// resulting lifecycle through the event stream, and dropping a receiver
/// is the de-registration.
pub trait Transport {
    /// Begins connecting. Idempotent while a connection attempt or an
    /// established session is already underway.
    fn connect(&self);

    /// Tears down the current socket. With `force` the scheduled
    /// reconnect attempt is cancelled as well; without it the transport
    /// reconnects after its retry interval.
    fn disconnect(&self, force: bool);

    /// Writes one protocol line. The transport appends the terminator.
    /// The returned future is `Send` so callers can drive sends from
    /// spawned tasks.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::NotConnected`] without a live socket, or
    /// [`ProtocolError::Io`] if the write fails.
    fn send(&self, line: &str) -> impl Future<Output = Result<(), ProtocolError>> + Send;

    /// Subscribes to the event stream.
    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;

    /// Whether a session is currently established.
    fn is_connected(&self) -> bool;

    /// Whether a socket exists right now (established or mid-teardown).
    fn has_socket(&self) -> bool;

    /// Cancels a pending reconnect attempt and stops retrying until the
    /// next [`connect`](Self::connect) call.
    fn cancel_retry(&self);
}
