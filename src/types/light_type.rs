// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Light channel selector.
//!
//! The screen light bar is two lights in one housing: the main downward
//! bar and an ambient background light pointed at the wall. Most operations
//! are addressed to one of the two.

use std::fmt;

/// One of the device's two light channels.
///
/// # Examples
///
/// ```
/// use yeebar::types::LightType;
///
/// assert_eq!(LightType::Main.as_str(), "main");
/// assert_eq!(LightType::Background.as_str(), "background");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightType {
    /// The main screen bar light. Supports power, brightness and color
    /// temperature.
    Main,
    /// The ambient background light. Additionally supports hue/saturation
    /// and RGB color.
    Background,
}

impl LightType {
    /// Returns the channel name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Background => "background",
        }
    }
}

impl fmt::Display for LightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
