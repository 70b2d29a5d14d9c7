// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire protocol for the LAN control interface.
//!
//! The device speaks line-delimited JSON over TCP. This module defines the
//! message types ([`CommandMessage`], [`CommandResponse`],
//! [`NotificationMessage`]) and the [`codec`] functions that validate and
//! coerce inbound payloads.

pub mod codec;
mod message;

pub use message::{
    CommandMessage, CommandMethod, CommandResponse, InboundMessage, NotificationMessage, Param,
    ResponseOutcome,
};
