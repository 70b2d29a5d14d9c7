// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscription handling for device events.
//!
//! Consumers register callbacks on the device facade and get a
//! [`SubscriptionId`] back; the id releases the callback deterministically
//! via `unsubscribe`.

mod callback;

pub use callback::{CallbackRegistry, SubscriptionId};
