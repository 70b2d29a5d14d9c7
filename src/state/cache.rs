// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared cache of the last known device state.

use parking_lot::Mutex;

use super::property::DeviceProperty;

/// Last known device state, shared between the command path and the
/// notification listener.
///
/// All updates take the inner lock once and compute their change set
/// against the value they replace, so two concurrent updates can never
/// both claim the same field as changed.
#[derive(Debug, Default)]
pub struct StateCache {
    inner: Mutex<DeviceProperty>,
}

impl StateCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> DeviceProperty {
        self.inner.lock().clone()
    }

    /// Applies a local write ahead of device confirmation.
    ///
    /// Reads observe the new value immediately; the device echoes the
    /// change back as a notification later and the echo diffs to nothing.
    pub fn apply_optimistic(&self, patch: &DeviceProperty) {
        self.inner.lock().merge_from(patch);
    }

    /// Merges a partial update and returns the fields that actually
    /// changed.
    pub fn merge(&self, patch: &DeviceProperty) -> DeviceProperty {
        let mut guard = self.inner.lock();
        let previous = guard.clone();
        guard.merge_from(patch);
        guard.diff(&previous)
    }

    /// Replaces the whole cached record and returns the fields that
    /// actually changed.
    ///
    /// Used after a full poll, where an absent field means the device no
    /// longer reports it rather than "unchanged".
    pub fn replace(&self, snapshot: DeviceProperty) -> DeviceProperty {
        let mut guard = self.inner.lock();
        let previous = std::mem::replace(&mut *guard, snapshot);
        guard.diff(&previous)
    }
}
