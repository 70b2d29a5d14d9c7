// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Builder for [`ScreenLightBar`] sessions.
//!
//! The builder validates the device address and carries the timing knobs
//! of a session. Every knob has a default suitable for a light bar on a
//! home LAN; `connect()` dials the device and hands back a ready facade.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{ProtocolError, Result};
use crate::transport::TcpTransport;

use super::ScreenLightBar;

/// TCP port the light bar listens on when LAN control is enabled.
pub const DEFAULT_PORT: u16 = 55443;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(300);
const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(1);
const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);
const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(5);

/// Timing knobs shared by the transport, dispatcher and session loop.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SessionOptions {
    pub(crate) port: u16,
    pub(crate) connect_timeout: Duration,
    pub(crate) settle_delay: Duration,
    pub(crate) response_timeout: Duration,
    pub(crate) debounce_window: Duration,
    pub(crate) retry_interval: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            settle_delay: DEFAULT_SETTLE_DELAY,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            debounce_window: DEFAULT_DEBOUNCE_WINDOW,
            retry_interval: DEFAULT_RETRY_INTERVAL,
        }
    }
}

/// Configures and opens a [`ScreenLightBar`] session.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use yeebar::ScreenLightBar;
///
/// # async fn example() -> yeebar::Result<()> {
/// let light = ScreenLightBar::builder("192.168.1.40")
///     .response_timeout(Duration::from_secs(2))
///     .connect()
///     .await?;
/// # let _ = light;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ScreenLightBarBuilder {
    address: String,
    options: SessionOptions,
}

impl ScreenLightBarBuilder {
    pub(crate) fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            options: SessionOptions::default(),
        }
    }

    /// Overrides the TCP port. Defaults to [`DEFAULT_PORT`].
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.options.port = port;
        self
    }

    /// Ceiling for the initial connection attempt. Defaults to 5 minutes
    /// so a device that is briefly offline can still be picked up.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.options.connect_timeout = timeout;
        self
    }

    /// Grace period after the socket opens before commands are sent.
    /// Defaults to 1 second.
    #[must_use]
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.options.settle_delay = delay;
        self
    }

    /// How long a command waits for its reply. Defaults to 5 seconds.
    #[must_use]
    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.options.response_timeout = timeout;
        self
    }

    /// Quiet window applied to rapid-fire setters. Defaults to 500 ms.
    #[must_use]
    pub fn debounce_window(mut self, window: Duration) -> Self {
        self.options.debounce_window = window;
        self
    }

    /// Pause between reconnect attempts after the socket drops.
    /// Defaults to 5 seconds.
    #[must_use]
    pub fn retry_interval(mut self, interval: Duration) -> Self {
        self.options.retry_interval = interval;
        self
    }

    /// Dials the device and builds the facade.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidAddress`] when the address is not an
    /// IP literal, [`ProtocolError::ConnectionTimeout`] when the device does
    /// not accept the connection in time, and
    /// [`crate::error::DeviceError::UnsupportedModel`] when the device is
    /// not a screen light bar.
    pub async fn connect(self) -> Result<ScreenLightBar> {
        let address = resolve_address(&self.address, self.options.port)?;
        let transport = Arc::new(TcpTransport::new(address, self.options.retry_interval));
        ScreenLightBar::connect_with(transport, address.to_string(), self.options).await
    }
}

/// Parses an IP literal into a socket address.
///
/// Hostnames are rejected on purpose: the device lives on the local
/// network and resolution surprises are worse than asking the caller
/// for the IP.
fn resolve_address(host: &str, port: u16) -> Result<SocketAddr> {
    let ip: IpAddr = host
        .trim()
        .parse()
        .map_err(|_| ProtocolError::InvalidAddress(host.to_string()))?;
    Ok(SocketAddr::new(ip, port))
}
