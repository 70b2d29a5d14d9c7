// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tokio TCP implementation of the transport contract.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::{Mutex, Notify, broadcast};
use tokio::task::JoinHandle;

use super::{SessionEvent, Transport};
use crate::error::ProtocolError;

/// Buffered events per subscriber. Inbound traffic is a handful of lines
/// per second at worst, so a slow subscriber has to stall for a long time
/// before it lags.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Line-delimited JSON over TCP, with automatic reconnect.
///
/// A background task owns the socket lifecycle: it connects when asked,
/// reads `\r\n`-terminated lines, decodes each as JSON and fans the
/// result out as [`SessionEvent::Message`]. Undecodable lines are dropped
/// with a trace log. After a socket loss it retries on a fixed interval
/// until force-disconnected.
///
/// Construction spawns the background task and therefore requires a tokio
/// runtime.
#[derive(Debug)]
pub struct TcpTransport {
    shared: Arc<Shared>,
    supervisor: JoinHandle<()>,
}

#[derive(Debug)]
struct Shared {
    address: SocketAddr,
    retry_interval: Duration,
    events: broadcast::Sender<SessionEvent>,
    /// Write half of the live socket. `None` whenever no session exists.
    writer: Mutex<Option<OwnedWriteHalf>>,
    connected: AtomicBool,
    has_socket: AtomicBool,
    /// Whether the supervisor should hold a connection open.
    desired: AtomicBool,
    /// Wakes the supervisor out of its idle wait.
    kick: Notify,
    /// Tears down the current socket.
    drop_socket: Notify,
    /// Wakes the supervisor out of its retry sleep.
    skip_retry: Notify,
}

impl TcpTransport {
    /// Creates the transport and spawns its supervisor task. No
    /// connection is attempted until [`Transport::connect`] is called.
    #[must_use]
    pub fn new(address: SocketAddr, retry_interval: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let shared = Arc::new(Shared {
            address,
            retry_interval,
            events,
            writer: Mutex::new(None),
            connected: AtomicBool::new(false),
            has_socket: AtomicBool::new(false),
            desired: AtomicBool::new(false),
            kick: Notify::new(),
            drop_socket: Notify::new(),
            skip_retry: Notify::new(),
        });
        let supervisor = tokio::spawn(run_supervisor(Arc::clone(&shared)));
        Self { shared, supervisor }
    }

    /// Returns the device address this transport dials.
    #[must_use]
    pub fn address(&self) -> SocketAddr {
        self.shared.address
    }
}

impl Transport for TcpTransport {
    fn connect(&self) {
        self.shared.desired.store(true, Ordering::Release);
        self.shared.kick.notify_one();
    }

    fn disconnect(&self, force: bool) {
        if force {
            self.shared.desired.store(false, Ordering::Release);
            self.shared.skip_retry.notify_waiters();
        }
        self.shared.drop_socket.notify_waiters();
    }

    async fn send(&self, line: &str) -> Result<(), ProtocolError> {
        let mut slot = self.shared.writer.lock().await;
        let Some(writer) = slot.as_mut() else {
            return Err(ProtocolError::NotConnected);
        };
        // One buffered write per line so concurrent senders never
        // interleave partial frames.
        let framed = format!("{line}\r\n");
        writer.write_all(framed.as_bytes()).await?;
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.shared.events.subscribe()
    }

    fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::Acquire)
    }

    fn has_socket(&self) -> bool {
        self.shared.has_socket.load(Ordering::Acquire)
    }

    fn cancel_retry(&self) {
        self.shared.desired.store(false, Ordering::Release);
        self.shared.skip_retry.notify_waiters();
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.supervisor.abort();
    }
}

/// Connection lifecycle loop. Idles until connection is desired, then
/// dials, serves the socket to completion and sleeps out the retry
/// interval before dialing again.
async fn run_supervisor(shared: Arc<Shared>) {
    loop {
        while !shared.desired.load(Ordering::Acquire) {
            shared.kick.notified().await;
        }

        match TcpStream::connect(shared.address).await {
            Ok(stream) => serve_socket(&shared, stream).await,
            Err(error) => {
                tracing::debug!(address = %shared.address, error = %error, "connect attempt failed");
            }
        }

        if !shared.desired.load(Ordering::Acquire) {
            continue;
        }
        tokio::select! {
            () = tokio::time::sleep(shared.retry_interval) => {}
            () = shared.skip_retry.notified() => {}
        }
    }
}

/// Serves one established socket until it is lost or torn down.
async fn serve_socket(shared: &Shared, stream: TcpStream) {
    // A force-disconnect can land while the dial is in flight.
    if !shared.desired.load(Ordering::Acquire) {
        return;
    }

    let (read_half, write_half) = stream.into_split();
    *shared.writer.lock().await = Some(write_half);
    shared.has_socket.store(true, Ordering::Release);
    shared.connected.store(true, Ordering::Release);
    let _ = shared.events.send(SessionEvent::Connected);
    tracing::debug!(address = %shared.address, "session established");

    let mut lines = BufReader::new(read_half).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => forward_line(shared, &line),
                Ok(None) => {
                    tracing::debug!(address = %shared.address, "device closed the connection");
                    break;
                }
                Err(error) => {
                    tracing::debug!(address = %shared.address, error = %error, "socket read failed");
                    break;
                }
            },
            () = shared.drop_socket.notified() => {
                tracing::debug!(address = %shared.address, "session torn down");
                break;
            }
        }
    }

    shared.connected.store(false, Ordering::Release);
    shared.has_socket.store(false, Ordering::Release);
    *shared.writer.lock().await = None;
    let _ = shared.events.send(SessionEvent::Disconnected);
}

fn forward_line(shared: &Shared, line: &str) {
    match serde_json::from_str::<serde_json::Value>(line) {
        Ok(value) => {
            let _ = shared.events.send(SessionEvent::Message(value));
        }
        Err(error) => {
            tracing::trace!(line = %line, error = %error, "dropping undecodable inbound line");
        }
    }
}
