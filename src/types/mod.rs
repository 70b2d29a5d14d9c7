// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for light bar control.
//!
//! This module provides type-safe representations of the values used in
//! commands and device state. Each type enforces its valid range at
//! construction time, preventing invalid values from reaching the wire.
//!
//! # Types
//!
//! - [`Power`] - On/off state tokens
//! - [`Brightness`] - Brightness percentage (1-100)
//! - [`ColorTemperature`] - Color temperature in Kelvin (1700-6500)
//! - [`Hue`] - Color hue in degrees (0-359)
//! - [`Saturation`] - Color saturation percentage (0-100)
//! - [`Rgb`] - Packed 24-bit RGB color
//! - [`ColorMode`] - Active color scheme selector
//! - [`LightType`] - Main vs. background channel selector
//! - [`Range`] - Closed interval for property bounds
//! - [`Transition`] - Smooth/sudden effect for mutating commands

mod brightness;
mod color;
mod color_temperature;
mod light_type;
mod power;
mod range;
mod transition;

pub use brightness::Brightness;
pub use color::{ColorMode, Hue, Rgb, Saturation};
pub use color_temperature::ColorTemperature;
pub use light_type::LightType;
pub use power::Power;
pub use range::Range;
pub use transition::Transition;
