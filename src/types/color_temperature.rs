// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Color temperature type.
//!
//! Yeelight devices take color temperature directly in Kelvin. The protocol
//! envelope is 1700-6500 K; individual models advertise a narrower range.

use std::fmt;

use crate::error::ValueError;
use crate::types::Range;

/// Color temperature in Kelvin (1700-6500).
///
/// Lower values are warmer (more orange), higher values are cooler (bluer).
///
/// # Examples
///
/// ```
/// use yeebar::types::ColorTemperature;
///
/// let ct = ColorTemperature::new(4000).unwrap();
/// assert_eq!(ct.kelvin(), 4000);
///
/// // Out-of-envelope values are rejected...
/// assert!(ColorTemperature::new(1000).is_err());
///
/// // ...or clamped on request
/// assert_eq!(ColorTemperature::clamped(9000).kelvin(), 6500);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColorTemperature(u16);

impl ColorTemperature {
    /// The protocol-wide color-temperature envelope in Kelvin.
    pub const ENVELOPE: Range = Range::new(1700, 6500);

    /// Warm white (2700 K).
    pub const WARM: Self = Self(2700);

    /// Neutral white (4000 K).
    pub const NEUTRAL: Self = Self(4000);

    /// Cool daylight (6500 K).
    pub const COOL: Self = Self(6500);

    /// Creates a new color temperature.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if the value is outside
    /// [1700, 6500] K.
    pub fn new(kelvin: u16) -> Result<Self, ValueError> {
        if !Self::ENVELOPE.contains(kelvin) {
            return Err(ValueError::OutOfRange {
                min: Self::ENVELOPE.min,
                max: Self::ENVELOPE.max,
                actual: kelvin,
            });
        }
        Ok(Self(kelvin))
    }

    /// Creates a color temperature, clamping into the protocol envelope.
    #[must_use]
    pub const fn clamped(kelvin: u16) -> Self {
        Self(Self::ENVELOPE.clamp(kelvin))
    }

    /// Returns the color temperature in Kelvin.
    #[must_use]
    pub const fn kelvin(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for ColorTemperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}K", self.0)
    }
}

impl TryFrom<u16> for ColorTemperature {
    type Error = ValueError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_temperature_valid() {
        let ct = ColorTemperature::new(2700).unwrap();
        assert_eq!(ct.kelvin(), 2700);
        assert!(ColorTemperature::new(1700).is_ok());
        assert!(ColorTemperature::new(6500).is_ok());
    }

    #[test]
    fn color_temperature_invalid() {
        assert!(ColorTemperature::new(1699).is_err());
        assert!(ColorTemperature::new(6501).is_err());
    }

    #[test]
    fn color_temperature_clamped() {
        assert_eq!(ColorTemperature::clamped(1000).kelvin(), 1700);
        assert_eq!(ColorTemperature::clamped(4000).kelvin(), 4000);
        assert_eq!(ColorTemperature::clamped(9000).kelvin(), 6500);
    }

    #[test]
    fn color_temperature_presets() {
        assert!(ColorTemperature::WARM < ColorTemperature::NEUTRAL);
        assert!(ColorTemperature::NEUTRAL < ColorTemperature::COOL);
    }

    #[test]
    fn color_temperature_display() {
        assert_eq!(ColorTemperature::NEUTRAL.to_string(), "4000K");
    }
}
