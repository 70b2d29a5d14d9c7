// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Brightness type.
//!
//! The device accepts brightness as a percentage between 1 and 100; zero is
//! not a valid brightness (turning a channel dark is a power operation).

use std::fmt;

use crate::error::ValueError;

/// Brightness level as a percentage (1-100).
///
/// # Examples
///
/// ```
/// use yeebar::types::Brightness;
///
/// let bright = Brightness::new(75).unwrap();
/// assert_eq!(bright.value(), 75);
///
/// // Zero and values above 100 are rejected
/// assert!(Brightness::new(0).is_err());
/// assert!(Brightness::new(101).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Brightness(u8);

impl Brightness {
    /// Minimum brightness (1%).
    pub const MIN: Self = Self(1);

    /// Maximum brightness (100%).
    pub const MAX: Self = Self(100);

    /// Creates a new brightness value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidBrightness` if the value is outside
    /// [1, 100].
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if value == 0 || value > 100 {
            return Err(ValueError::InvalidBrightness(value));
        }
        Ok(Self(value))
    }

    /// Creates a brightness value, clamping into the valid range.
    #[must_use]
    pub const fn clamped(value: u8) -> Self {
        if value == 0 {
            Self(1)
        } else if value > 100 {
            Self(100)
        } else {
            Self(value)
        }
    }

    /// Returns the brightness percentage.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Brightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl TryFrom<u8> for Brightness {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brightness_valid_values() {
        for v in 1..=100 {
            let bright = Brightness::new(v).unwrap();
            assert_eq!(bright.value(), v);
        }
    }

    #[test]
    fn brightness_rejects_zero() {
        assert!(matches!(
            Brightness::new(0),
            Err(ValueError::InvalidBrightness(0))
        ));
    }

    #[test]
    fn brightness_rejects_over_100() {
        assert!(Brightness::new(101).is_err());
    }

    #[test]
    fn brightness_clamped() {
        assert_eq!(Brightness::clamped(0).value(), 1);
        assert_eq!(Brightness::clamped(50).value(), 50);
        assert_eq!(Brightness::clamped(200).value(), 100);
    }

    #[test]
    fn brightness_display() {
        assert_eq!(Brightness::new(40).unwrap().to_string(), "40%");
    }

    #[test]
    fn brightness_ordering() {
        assert!(Brightness::MIN < Brightness::MAX);
    }
}
