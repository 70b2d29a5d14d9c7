// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Color types for the background light.
//!
//! The background channel takes hue/saturation pairs or a packed 24-bit RGB
//! integer, and reports which color scheme is active through a mode selector.

use std::fmt;

use crate::error::ValueError;

/// Color hue in degrees (0-359, where 0 is red).
///
/// # Examples
///
/// ```
/// use yeebar::types::Hue;
///
/// let hue = Hue::new(120).unwrap();
/// assert_eq!(hue.value(), 120);
/// assert!(Hue::new(360).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hue(u16);

impl Hue {
    /// Maximum hue value (inclusive).
    pub const MAX: u16 = 359;

    /// Creates a new hue value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidHue` if the value exceeds 359.
    pub fn new(value: u16) -> Result<Self, ValueError> {
        if value > Self::MAX {
            return Err(ValueError::InvalidHue(value));
        }
        Ok(Self(value))
    }

    /// Returns the hue in degrees.
    #[must_use]
    pub const fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for Hue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.0)
    }
}

impl TryFrom<u16> for Hue {
    type Error = ValueError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Color saturation as a percentage (0-100).
///
/// # Examples
///
/// ```
/// use yeebar::types::Saturation;
///
/// let sat = Saturation::new(80).unwrap();
/// assert_eq!(sat.value(), 80);
/// assert!(Saturation::new(101).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Saturation(u8);

impl Saturation {
    /// Maximum saturation value (inclusive).
    pub const MAX: u8 = 100;

    /// Creates a new saturation value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidSaturation` if the value exceeds 100.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if value > Self::MAX {
            return Err(ValueError::InvalidSaturation(value));
        }
        Ok(Self(value))
    }

    /// Returns the saturation percentage.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Saturation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl TryFrom<u8> for Saturation {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Packed 24-bit RGB color (1-16777215).
///
/// The device encodes color as `red * 65536 + green * 256 + blue`; zero is
/// not accepted on the wire.
///
/// # Examples
///
/// ```
/// use yeebar::types::Rgb;
///
/// let color = Rgb::from_components(255, 128, 0).unwrap();
/// assert_eq!(color.red(), 255);
/// assert_eq!(color.green(), 128);
/// assert_eq!(color.blue(), 0);
/// assert_eq!(color.packed(), 0x00FF_8000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(u32);

impl Rgb {
    /// Maximum packed value (white, `0xFFFFFF`).
    pub const MAX: u32 = 0x00FF_FFFF;

    /// Creates an RGB color from a packed integer.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidRgb` if the value is zero or exceeds
    /// `0xFFFFFF`.
    pub fn new(packed: u32) -> Result<Self, ValueError> {
        if packed == 0 || packed > Self::MAX {
            return Err(ValueError::InvalidRgb(packed));
        }
        Ok(Self(packed))
    }

    /// Creates an RGB color from individual components.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidRgb` for pure black (the wire format has
    /// no zero value).
    pub fn from_components(red: u8, green: u8, blue: u8) -> Result<Self, ValueError> {
        Self::new((u32::from(red) << 16) | (u32::from(green) << 8) | u32::from(blue))
    }

    /// Returns the packed 24-bit value.
    #[must_use]
    pub const fn packed(&self) -> u32 {
        self.0
    }

    /// Returns the red component.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn red(&self) -> u8 {
        ((self.0 >> 16) & 0xFF) as u8
    }

    /// Returns the green component.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn green(&self) -> u8 {
        ((self.0 >> 8) & 0xFF) as u8
    }

    /// Returns the blue component.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn blue(&self) -> u8 {
        (self.0 & 0xFF) as u8
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

impl TryFrom<u32> for Rgb {
    type Error = ValueError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Active color scheme of a light channel.
///
/// The device reports this as a numeric selector: 1 for RGB, 2 for color
/// temperature, 3 for HSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorMode {
    /// Packed-RGB color is active.
    Rgb,
    /// Color temperature is active.
    Temperature,
    /// Hue/saturation color is active.
    Hsv,
}

impl ColorMode {
    /// Decodes the wire selector, returning `None` for unknown values.
    #[must_use]
    pub const fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            1 => Some(Self::Rgb),
            2 => Some(Self::Temperature),
            3 => Some(Self::Hsv),
            _ => None,
        }
    }

    /// Returns the wire selector for this mode.
    #[must_use]
    pub const fn as_raw(&self) -> i64 {
        match self {
            Self::Rgb => 1,
            Self::Temperature => 2,
            Self::Hsv => 3,
        }
    }

    /// Returns `true` for the RGB and HSV modes, where the color pair is
    /// live and the color temperature is stale.
    #[must_use]
    pub const fn is_color(&self) -> bool {
        matches!(self, Self::Rgb | Self::Hsv)
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Rgb => "rgb",
            Self::Temperature => "temperature",
            Self::Hsv => "hsv",
        };
        write!(f, "{name}")
    }
}
