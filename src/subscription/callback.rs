// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback management for device state subscriptions.
//!
//! This module provides the core types for managing subscription callbacks:
//!
//! - [`SubscriptionId`] - Unique identifier for unsubscribing
//! - [`CallbackRegistry`] - Internal registry for storing and dispatching callbacks

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::state::DeviceProperty;

/// Unique identifier for a subscription.
///
/// This ID is returned when creating a subscription and can be used to
/// unsubscribe later. IDs are unique within a device's lifetime.
///
/// # Examples
///
/// ```ignore
/// let sub_id = device.on_state_changed(|diff| { /* ... */ });
///
/// // Later, unsubscribe
/// device.unsubscribe(sub_id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Creates a new subscription ID with the given value.
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Type alias for state change callbacks (receives the change set).
type StateChangedCallback = Arc<dyn Fn(&DeviceProperty) + Send + Sync>;

/// Type alias for connected callbacks (receives the fresh snapshot).
type ConnectedCallback = Arc<dyn Fn(&DeviceProperty) + Send + Sync>;

/// Type alias for disconnected callbacks.
type DisconnectedCallback = Arc<dyn Fn() + Send + Sync>;

/// Registry for managing device subscription callbacks.
///
/// This is an internal type used by the device session to store and
/// dispatch callbacks. It uses thread-safe interior mutability via
/// `parking_lot::RwLock`, and callbacks are wrapped in `Arc` so dispatch
/// never holds a lock while user code runs long.
pub struct CallbackRegistry {
    /// Counter for generating unique subscription IDs.
    next_id: AtomicU64,
    /// State change callbacks (receive each non-empty diff).
    state_changed_callbacks: RwLock<HashMap<SubscriptionId, StateChangedCallback>>,
    /// Connected callbacks (called after a session is usable again).
    connected_callbacks: RwLock<HashMap<SubscriptionId, ConnectedCallback>>,
    /// Disconnected callbacks (called when the session drops).
    disconnected_callbacks: RwLock<HashMap<SubscriptionId, DisconnectedCallback>>,
}

impl CallbackRegistry {
    /// Creates a new empty callback registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            state_changed_callbacks: RwLock::new(HashMap::new()),
            connected_callbacks: RwLock::new(HashMap::new()),
            disconnected_callbacks: RwLock::new(HashMap::new()),
        }
    }

    /// Generates a new unique subscription ID.
    fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    // =========================================================================
    // Registration methods
    // =========================================================================

    /// Registers a callback for state changes.
    ///
    /// The callback receives each non-empty change set exactly once.
    pub fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceProperty) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.state_changed_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for when the session becomes usable.
    ///
    /// The callback receives the freshly refreshed state snapshot.
    pub fn on_connected<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceProperty) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.connected_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for when the session drops.
    pub fn on_disconnected<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.disconnected_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    // =========================================================================
    // Unsubscription
    // =========================================================================

    /// Unregisters a callback by its subscription ID.
    ///
    /// Returns `true` if a callback was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        if self.state_changed_callbacks.write().remove(&id).is_some() {
            return true;
        }
        if self.connected_callbacks.write().remove(&id).is_some() {
            return true;
        }
        if self.disconnected_callbacks.write().remove(&id).is_some() {
            return true;
        }
        false
    }

    /// Clears all callbacks.
    pub fn clear(&self) {
        self.state_changed_callbacks.write().clear();
        self.connected_callbacks.write().clear();
        self.disconnected_callbacks.write().clear();
    }

    // =========================================================================
    // Dispatch methods
    // =========================================================================

    /// Dispatches a change set to the state change callbacks.
    ///
    /// Callbacks are called synchronously in an arbitrary order; the
    /// handles are cloned out first so no lock is held during the calls.
    pub fn dispatch_state_changed(&self, changed: &DeviceProperty) {
        let callbacks: Vec<StateChangedCallback> = {
            let map = self.state_changed_callbacks.read();
            map.values().cloned().collect()
        };
        for callback in callbacks {
            callback(changed);
        }
    }

    /// Dispatches the connected event with the fresh state snapshot.
    pub fn dispatch_connected(&self, snapshot: &DeviceProperty) {
        let callbacks: Vec<ConnectedCallback> = {
            let map = self.connected_callbacks.read();
            map.values().cloned().collect()
        };
        for callback in callbacks {
            callback(snapshot);
        }
    }

    /// Dispatches the disconnected event.
    pub fn dispatch_disconnected(&self) {
        let callbacks: Vec<DisconnectedCallback> = {
            let map = self.disconnected_callbacks.read();
            map.values().cloned().collect()
        };
        for callback in callbacks {
            callback();
        }
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Returns the total number of registered callbacks.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.state_changed_callbacks.read().len()
            + self.connected_callbacks.read().len()
            + self.disconnected_callbacks.read().len()
    }

    /// Returns `true` if there are no registered callbacks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callback_count() == 0
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}
