// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state tracking.
//!
//! [`DeviceProperty`] is the sparse record the rest of the crate trades
//! in; [`StateCache`] keeps the authoritative copy and turns raw updates
//! into change sets.

mod cache;
mod property;

pub use cache::StateCache;
pub use property::{DeviceProperty, PropertyName, STATE_PROPS};
