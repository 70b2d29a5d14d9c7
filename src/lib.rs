// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `yeebar` - A Rust library to control the Yeelight screen light bar.
//!
//! This library speaks the Yeelight LAN protocol (line-delimited JSON
//! over TCP) and drives both channels of the light bar: the main white
//! light and the ambient background light.
//!
//! # Supported Features
//!
//! - **Power control**: Per-channel on/off with smooth ramps
//! - **Light control**: Brightness, color temperature, background hue
//!   and saturation
//! - **Live state**: Local cache fed by device pushes, with change
//!   callbacks carrying only the fields that changed
//! - **Resilient sessions**: Automatic reconnect with a full state
//!   reload once the device is back
//!
//! # Supported Models
//!
//! - Screen light bar (`lamp15`): main channel plus color-capable
//!   background channel
//!
//! # Quick Start
//!
//! ```no_run
//! use yeebar::{Brightness, LightType, ScreenLightBar};
//!
//! #[tokio::main]
//! async fn main() -> yeebar::Result<()> {
//!     let light = ScreenLightBar::connect("192.168.1.40").await?;
//!
//!     light.turn_on(LightType::Main).await?;
//!
//!     // Debounced: rapid calls collapse into one command.
//!     light.set_brightness(LightType::Main, Brightness::clamped(70));
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Tuning the Session
//!
//! ```no_run
//! use std::time::Duration;
//! use yeebar::ScreenLightBar;
//!
//! #[tokio::main]
//! async fn main() -> yeebar::Result<()> {
//!     let light = ScreenLightBar::builder("192.168.1.40")
//!         .connect_timeout(Duration::from_secs(10))
//!         .response_timeout(Duration::from_secs(2))
//!         .connect()
//!         .await?;
//!
//!     println!("connected to {}", light.address());
//!     Ok(())
//! }
//! ```
//!
//! ## Watching the Device
//!
//! ```no_run
//! use yeebar::{LightType, ScreenLightBar};
//!
//! #[tokio::main]
//! async fn main() -> yeebar::Result<()> {
//!     let light = ScreenLightBar::connect("192.168.1.40").await?;
//!
//!     // Fires for pushes from the device and for reconnect reloads.
//!     light.on_state_changed(|changed| {
//!         if let Some(level) = changed.bright {
//!             println!("brightness is now {level}");
//!         }
//!     });
//!
//!     light.turn_on(LightType::Background).await?;
//!     Ok(())
//! }
//! ```

mod device;
mod dispatch;
pub mod error;
pub mod protocol;
pub mod state;
pub mod subscription;
pub mod transport;
pub mod types;

pub use device::{
    COLOR_TEMPERATURE_RANGE, DEFAULT_PORT, SUPPORTED_MODELS, ScreenLightBar,
    ScreenLightBarBuilder, SessionState,
};
pub use error::{DeviceError, Error, ParseError, ProtocolError, Result, ValueError};
pub use protocol::{CommandMessage, CommandMethod, Param, ResponseOutcome};
pub use state::{DeviceProperty, PropertyName, STATE_PROPS};
pub use subscription::{CallbackRegistry, SubscriptionId};
pub use transport::{SessionEvent, TcpTransport, Transport};
pub use types::{
    Brightness, ColorMode, ColorTemperature, Hue, LightType, Power, Range, Rgb, Saturation,
    Transition,
};
