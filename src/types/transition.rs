// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transition effect for mutating commands.
//!
//! Every state-changing command carries an effect pair on the wire: a token
//! (`"smooth"` or `"sudden"`) followed by a duration in milliseconds. The
//! duration is ignored by the device for sudden transitions but must still
//! be present.

use std::fmt;

/// How the light animates toward a newly commanded value.
///
/// # Examples
///
/// ```
/// use yeebar::types::Transition;
///
/// let fade = Transition::smooth(400);
/// assert_eq!(fade.token(), "smooth");
/// assert_eq!(fade.duration_ms(), 400);
///
/// let snap = Transition::SUDDEN;
/// assert_eq!(snap.token(), "sudden");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// Jump to the target value immediately.
    Sudden,
    /// Fade to the target value over the given number of milliseconds.
    Smooth(u32),
}

impl Transition {
    /// An immediate transition.
    pub const SUDDEN: Self = Self::Sudden;

    /// The device-enforced minimum smooth duration in milliseconds.
    pub const MIN_SMOOTH_MS: u32 = 30;

    /// Creates a smooth transition, raising sub-minimum durations to the
    /// device floor.
    #[must_use]
    pub const fn smooth(duration_ms: u32) -> Self {
        if duration_ms < Self::MIN_SMOOTH_MS {
            Self::Smooth(Self::MIN_SMOOTH_MS)
        } else {
            Self::Smooth(duration_ms)
        }
    }

    /// Returns the wire token.
    #[must_use]
    pub const fn token(&self) -> &'static str {
        match self {
            Self::Sudden => "sudden",
            Self::Smooth(_) => "smooth",
        }
    }

    /// Returns the duration in milliseconds (zero for sudden transitions).
    #[must_use]
    pub const fn duration_ms(&self) -> u32 {
        match self {
            Self::Sudden => 0,
            Self::Smooth(ms) => *ms,
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sudden => write!(f, "sudden"),
            Self::Smooth(ms) => write!(f, "smooth({ms}ms)"),
        }
    }
}
