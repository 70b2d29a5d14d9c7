// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! High-level facade for a Yeelight screen light bar.
//!
//! [`ScreenLightBar`] owns one TCP session to the device. Reads come
//! from a local property cache fed by device pushes, writes go through
//! a dispatcher that correlates replies and debounces rapid-fire
//! setters. Power is the exception: it switches immediately and its
//! result is awaited.

mod builder;
mod session;

pub use builder::{DEFAULT_PORT, ScreenLightBarBuilder};
pub use session::SessionState;

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::dispatch::CommandDispatcher;
use crate::error::{DeviceError, Result};
use crate::protocol::{CommandMessage, CommandMethod, Param};
use crate::state::{DeviceProperty, PropertyName};
use crate::subscription::SubscriptionId;
use crate::transport::{TcpTransport, Transport};
use crate::types::{
    Brightness, ColorTemperature, Hue, LightType, Power, Range, Saturation, Transition,
};

use builder::SessionOptions;
use session::SessionCore;

/// Device models this crate knows how to drive.
pub const SUPPORTED_MODELS: [&str; 1] = ["lamp15"];

/// Color-temperature envelope of the lamp15 hardware.
pub const COLOR_TEMPERATURE_RANGE: Range = Range::new(2700, 6500);

const POWER_TRANSITION: Transition = Transition::smooth(500);
const ADJUST_TRANSITION: Transition = Transition::smooth(250);

/// Handle to one Yeelight screen light bar.
///
/// Built via [`ScreenLightBar::connect`] or [`ScreenLightBar::builder`].
/// Getters answer from the cache without touching the network; setters
/// validate against the cache first and only then emit a command. The
/// main channel carries brightness and color temperature, the
/// background channel additionally hue and saturation.
///
/// ```no_run
/// use yeebar::{Brightness, LightType, ScreenLightBar};
///
/// # async fn example() -> yeebar::Result<()> {
/// let light = ScreenLightBar::connect("192.168.1.40").await?;
/// light.turn_on(LightType::Main).await?;
/// light.set_brightness(LightType::Main, Brightness::clamped(70));
/// # Ok(())
/// # }
/// ```
pub struct ScreenLightBar<T: Transport + Send + Sync + 'static = TcpTransport> {
    core: Arc<SessionCore<T>>,
    listener: JoinHandle<()>,
}

impl ScreenLightBar<TcpTransport> {
    // ========== Constructors ==========

    /// Starts a builder for the device at `address`, an IP literal.
    pub fn builder(address: impl Into<String>) -> ScreenLightBarBuilder {
        ScreenLightBarBuilder::new(address)
    }

    /// Connects with default options.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ProtocolError::InvalidAddress`] for
    /// anything that is not an IP literal,
    /// [`crate::error::ProtocolError::ConnectionTimeout`] when the device
    /// stays unreachable and [`DeviceError::UnsupportedModel`] when the
    /// probed model is not a screen light bar.
    pub async fn connect(address: impl Into<String>) -> Result<Self> {
        Self::builder(address).connect().await
    }
}

impl<T> ScreenLightBar<T>
where
    T: Transport + Send + Sync + 'static,
{
    pub(crate) async fn connect_with(
        transport: Arc<T>,
        address: String,
        options: SessionOptions,
    ) -> Result<Self> {
        session::establish(transport.as_ref(), &options).await?;

        let dispatcher = Arc::new(CommandDispatcher::new(
            Arc::clone(&transport),
            options.response_timeout,
            options.debounce_window,
        ));

        let probed = match dispatcher.get_prop(&[PropertyName::Model]).await {
            Ok(record) => record,
            Err(error) => {
                transport.disconnect(true);
                return Err(error);
            }
        };
        let model = probed.model.unwrap_or_default();
        if !SUPPORTED_MODELS.contains(&model.as_str()) {
            transport.disconnect(true);
            return Err(DeviceError::UnsupportedModel { model }.into());
        }
        tracing::info!(model = %model, address = %address, "device accepted");

        let core = Arc::new(SessionCore::new(
            transport, dispatcher, options, model, address,
        ));
        let events = core.transport.subscribe();
        let listener = tokio::spawn(session::run_listener(Arc::clone(&core), events));

        // A failed first read leaves the cache empty rather than
        // aborting the session.
        core.refresh_swallowed().await;
        core.set_state(SessionState::Ready);

        Ok(Self { core, listener })
    }

    // ========== State Access ==========

    /// Last known power state of a channel.
    #[must_use]
    pub fn power(&self, light: LightType) -> Option<Power> {
        let snapshot = self.core.cache.snapshot();
        match light {
            LightType::Main => snapshot.power,
            LightType::Background => snapshot.bg_power,
        }
    }

    /// Last known brightness of a channel.
    #[must_use]
    pub fn brightness(&self, light: LightType) -> Option<Brightness> {
        let snapshot = self.core.cache.snapshot();
        match light {
            LightType::Main => snapshot.bright,
            LightType::Background => snapshot.bg_bright,
        }
    }

    /// Last known color temperature of a channel.
    #[must_use]
    pub fn color_temperature(&self, light: LightType) -> Option<ColorTemperature> {
        let snapshot = self.core.cache.snapshot();
        match light {
            LightType::Main => snapshot.ct,
            LightType::Background => snapshot.bg_ct,
        }
    }

    /// Last known hue. The main channel has no color support, so the
    /// answer there is always `None`.
    #[must_use]
    pub fn hue(&self, light: LightType) -> Option<Hue> {
        match light {
            LightType::Main => None,
            LightType::Background => self.core.cache.snapshot().bg_hue,
        }
    }

    /// Last known saturation, `None` on the main channel.
    #[must_use]
    pub fn saturation(&self, light: LightType) -> Option<Saturation> {
        match light {
            LightType::Main => None,
            LightType::Background => self.core.cache.snapshot().bg_sat,
        }
    }

    /// Snapshot of everything known about the device.
    #[must_use]
    pub fn state(&self) -> DeviceProperty {
        self.core.cache.snapshot()
    }

    /// Model string reported by the device during the handshake.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.core.model
    }

    /// Address the session was opened against.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.core.address
    }

    /// Current lifecycle state of the session.
    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.core.session_state()
    }

    /// Watches session lifecycle transitions.
    #[must_use]
    pub fn watch_session(&self) -> watch::Receiver<SessionState> {
        self.core.watch_session()
    }

    /// Re-reads the tracked properties from the device and reconciles
    /// the cache. Subscribers are notified of fields that changed.
    ///
    /// # Errors
    ///
    /// Returns an error when the device cannot be reached or rejects
    /// the read. The cache keeps its previous content in that case.
    pub async fn refresh(&self) -> Result<()> {
        self.core.refresh().await
    }

    // ========== Power Control ==========

    /// Switches a channel on or off with a smooth 500 ms ramp.
    ///
    /// Power is never debounced: the command goes out immediately and
    /// its reply is awaited. A request matching the cached state is
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::CommandFailed`] when the device rejects
    /// the command and a protocol error when no reply arrives in time.
    pub async fn set_power(&self, light: LightType, power: Power) -> Result<()> {
        let snapshot = self.core.cache.snapshot();
        let cached = match light {
            LightType::Main => snapshot.power,
            LightType::Background => snapshot.bg_power,
        };
        if cached == Some(power) {
            tracing::debug!(light = %light, power = %power, "power already matches, skipping");
            return Ok(());
        }

        let command = CommandMessage::set_power(light, power, POWER_TRANSITION);
        self.core.dispatcher.send_command(command).await?;

        let patch = match light {
            LightType::Main => DeviceProperty {
                power: Some(power),
                ..DeviceProperty::default()
            },
            LightType::Background => DeviceProperty {
                bg_power: Some(power),
                ..DeviceProperty::default()
            },
        };
        self.core.cache.apply_optimistic(&patch);
        Ok(())
    }

    /// Shorthand for [`set_power`](Self::set_power) with [`Power::On`].
    ///
    /// # Errors
    ///
    /// Same as [`set_power`](Self::set_power).
    pub async fn turn_on(&self, light: LightType) -> Result<()> {
        self.set_power(light, Power::On).await
    }

    /// Shorthand for [`set_power`](Self::set_power) with [`Power::Off`].
    ///
    /// # Errors
    ///
    /// Same as [`set_power`](Self::set_power).
    pub async fn turn_off(&self, light: LightType) -> Result<()> {
        self.set_power(light, Power::Off).await
    }

    // ========== Brightness Control ==========

    /// Requests a brightness change with a smooth 250 ms ramp.
    ///
    /// Debounced: rapid calls collapse into one command carrying the
    /// last value. Dropped when the value already matches the cache or
    /// the channel is not known to be on.
    pub fn set_brightness(&self, light: LightType, level: Brightness) {
        let snapshot = self.core.cache.snapshot();
        let (cached_power, cached_level) = match light {
            LightType::Main => (snapshot.power, snapshot.bright),
            LightType::Background => (snapshot.bg_power, snapshot.bg_bright),
        };
        if cached_level == Some(level) {
            return;
        }
        if cached_power != Some(Power::On) {
            tracing::debug!(light = %light, "channel not known to be on, dropping brightness");
            return;
        }

        let command = CommandMessage::set_brightness(light, level, ADJUST_TRANSITION);
        self.core.dispatcher.send_debounced(command);

        let patch = match light {
            LightType::Main => DeviceProperty {
                bright: Some(level),
                ..DeviceProperty::default()
            },
            LightType::Background => DeviceProperty {
                bg_bright: Some(level),
                ..DeviceProperty::default()
            },
        };
        self.core.cache.apply_optimistic(&patch);
    }

    // ========== Color Control ==========

    /// Requests a color-temperature change, clamped to
    /// [`COLOR_TEMPERATURE_RANGE`]. Debounced like brightness.
    pub fn set_color_temperature(&self, light: LightType, temperature: ColorTemperature) {
        let temperature =
            ColorTemperature::clamped(COLOR_TEMPERATURE_RANGE.clamp(temperature.kelvin()));
        let snapshot = self.core.cache.snapshot();
        let (cached_power, cached_value) = match light {
            LightType::Main => (snapshot.power, snapshot.ct),
            LightType::Background => (snapshot.bg_power, snapshot.bg_ct),
        };
        if cached_value == Some(temperature) {
            return;
        }
        if cached_power != Some(Power::On) {
            tracing::debug!(light = %light, "channel not known to be on, dropping temperature");
            return;
        }

        let command = CommandMessage::set_color_temperature(light, temperature, ADJUST_TRANSITION);
        self.core.dispatcher.send_debounced(command);

        let patch = match light {
            LightType::Main => DeviceProperty {
                ct: Some(temperature),
                ..DeviceProperty::default()
            },
            LightType::Background => DeviceProperty {
                bg_ct: Some(temperature),
                ..DeviceProperty::default()
            },
        };
        self.core.cache.apply_optimistic(&patch);
    }

    /// Requests a hue change on the background channel.
    ///
    /// Hue and saturation travel in one `bg_set_hsv` command, so the
    /// cached saturation must be known. No-op on the main channel,
    /// which has no color support.
    pub fn set_hue(&self, light: LightType, hue: Hue) {
        if light == LightType::Main {
            tracing::debug!("main channel has no hue control, skipping");
            return;
        }
        let snapshot = self.core.cache.snapshot();
        if snapshot.bg_hue == Some(hue) {
            return;
        }
        if snapshot.bg_power != Some(Power::On) {
            tracing::debug!("background not known to be on, dropping hue");
            return;
        }
        let Some(saturation) = snapshot.bg_sat else {
            tracing::debug!("saturation unknown, dropping hue");
            return;
        };

        let command =
            CommandMessage::set_hsv(LightType::Background, hue, saturation, ADJUST_TRANSITION);
        self.core.dispatcher.send_debounced(command);

        let patch = DeviceProperty {
            bg_hue: Some(hue),
            ..DeviceProperty::default()
        };
        self.core.cache.apply_optimistic(&patch);
    }

    /// Requests a saturation change on the background channel.
    ///
    /// Counterpart of [`set_hue`](Self::set_hue): needs a known cached
    /// hue and is a no-op on the main channel.
    pub fn set_saturation(&self, light: LightType, saturation: Saturation) {
        if light == LightType::Main {
            tracing::debug!("main channel has no saturation control, skipping");
            return;
        }
        let snapshot = self.core.cache.snapshot();
        if snapshot.bg_sat == Some(saturation) {
            return;
        }
        if snapshot.bg_power != Some(Power::On) {
            tracing::debug!("background not known to be on, dropping saturation");
            return;
        }
        let Some(hue) = snapshot.bg_hue else {
            tracing::debug!("hue unknown, dropping saturation");
            return;
        };

        let command =
            CommandMessage::set_hsv(LightType::Background, hue, saturation, ADJUST_TRANSITION);
        self.core.dispatcher.send_debounced(command);

        let patch = DeviceProperty {
            bg_sat: Some(saturation),
            ..DeviceProperty::default()
        };
        self.core.cache.apply_optimistic(&patch);
    }

    // ========== Raw Commands ==========

    /// Sends an arbitrary command and returns the raw result strings.
    ///
    /// Correlated and awaited like any built-in setter but bypasses the
    /// cache. Meant for methods without a dedicated wrapper.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::CommandFailed`] when the device rejects
    /// the command and a protocol error when no reply arrives in time.
    pub async fn send_command(
        &self,
        method: CommandMethod,
        params: Vec<Param>,
    ) -> Result<Vec<String>> {
        self.core
            .dispatcher
            .send_command(CommandMessage::new(method, params))
            .await
    }

    // ========== Subscriptions ==========

    /// Registers a callback for property changes. The callback receives
    /// only the fields that changed.
    pub fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceProperty) + Send + Sync + 'static,
    {
        self.core.callbacks.on_state_changed(callback)
    }

    /// Registers a callback for reconnects. The callback receives the
    /// freshly read snapshot.
    pub fn on_connected<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceProperty) + Send + Sync + 'static,
    {
        self.core.callbacks.on_connected(callback)
    }

    /// Registers a callback for lost connections, fired both on socket
    /// drops and on [`disconnect`](Self::disconnect).
    pub fn on_disconnected<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.core.callbacks.on_disconnected(callback)
    }

    /// Removes a previously registered callback. Returns `false` when
    /// the id is unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.core.callbacks.unsubscribe(id)
    }

    // ========== Teardown ==========

    /// Ends the session for good.
    ///
    /// Pending debounced commands are dropped, the socket is closed and
    /// the transport stops retrying. Disconnected callbacks fire one
    /// last time and the session state becomes
    /// [`SessionState::Disconnected`], which is terminal.
    pub fn disconnect(&self) {
        if self.core.session_state() == SessionState::Disconnected {
            return;
        }
        self.listener.abort();
        self.core.dispatcher.cancel_pending();
        self.core.transport.disconnect(true);
        self.core.set_state(SessionState::Disconnected);
        self.core.callbacks.dispatch_disconnected();
        tracing::info!(address = %self.core.address, "session closed");
    }
}

impl<T> fmt::Debug for ScreenLightBar<T>
where
    T: Transport + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScreenLightBar")
            .field("model", &self.core.model)
            .field("address", &self.core.address)
            .field("state", &self.core.session_state())
            .finish_non_exhaustive()
    }
}

impl<T> Drop for ScreenLightBar<T>
where
    T: Transport + Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.listener.abort();
        self.core.dispatcher.cancel_pending();
        self.core.transport.disconnect(true);
        self.core.callbacks.clear();
    }
}
