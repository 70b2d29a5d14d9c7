// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Closed numeric interval used for property bounds.

use std::fmt;

/// A closed `[min, max]` interval.
///
/// Used to describe the envelope a device property accepts, such as the
/// color-temperature bounds of a particular model.
///
/// # Examples
///
/// ```
/// use yeebar::types::Range;
///
/// let ct = Range::new(2700, 6500);
/// assert!(ct.contains(4000));
/// assert_eq!(ct.clamp(9000), 6500);
/// assert_eq!(ct.clamp(1000), 2700);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    /// Lower bound, inclusive.
    pub min: u16,
    /// Upper bound, inclusive.
    pub max: u16,
}

impl Range {
    /// Creates a new closed interval. `min` must not exceed `max`.
    #[must_use]
    pub const fn new(min: u16, max: u16) -> Self {
        Self { min, max }
    }

    /// Returns `true` if `value` lies within the interval.
    #[must_use]
    pub const fn contains(&self, value: u16) -> bool {
        value >= self.min && value <= self.max
    }

    /// Clamps `value` into the interval.
    #[must_use]
    pub const fn clamp(&self, value: u16) -> u16 {
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}
