// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power state type.
//!
//! The device reports and accepts power as the lowercase tokens `"on"` and
//! `"off"`; this module provides the typed representation.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// Power state of a light channel.
///
/// # Examples
///
/// ```
/// use yeebar::types::Power;
///
/// let state = Power::On;
/// assert_eq!(state.as_str(), "on");
/// assert!(state.is_on());
///
/// let parsed: Power = "off".parse().unwrap();
/// assert_eq!(parsed, Power::Off);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Power {
    /// The channel is lit.
    On,
    /// The channel is dark.
    Off,
}

impl Power {
    /// Returns the wire token for this state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }

    /// Returns `true` if this is the on state.
    #[must_use]
    pub const fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }
}

impl fmt::Display for Power {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Power {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            other => Err(ValueError::InvalidPowerToken(other.to_string())),
        }
    }
}

impl From<bool> for Power {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_as_str() {
        assert_eq!(Power::On.as_str(), "on");
        assert_eq!(Power::Off.as_str(), "off");
    }

    #[test]
    fn power_from_str() {
        assert_eq!("on".parse::<Power>().unwrap(), Power::On);
        assert_eq!("off".parse::<Power>().unwrap(), Power::Off);
    }

    #[test]
    fn power_from_str_rejects_unknown() {
        let result = "ON".parse::<Power>();
        assert!(matches!(result, Err(ValueError::InvalidPowerToken(_))));
    }

    #[test]
    fn power_from_bool() {
        assert_eq!(Power::from(true), Power::On);
        assert_eq!(Power::from(false), Power::Off);
    }

    #[test]
    fn power_is_on() {
        assert!(Power::On.is_on());
        assert!(!Power::Off.is_on());
    }

    #[test]
    fn power_display() {
        assert_eq!(Power::On.to_string(), "on");
    }
}
