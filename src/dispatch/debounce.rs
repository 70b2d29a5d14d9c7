// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-method debounce slot table.

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::protocol::CommandMethod;

/// One armed-timer slot per command method, all initialized empty.
///
/// Generations order competing timers for the same method: arming bumps
/// the slot's generation, and a timer may only fire if it still holds the
/// current one. This closes the race where an aborted task has already
/// woken and would otherwise send a superseded command.
#[derive(Debug)]
pub(crate) struct DebounceMap {
    slots: Mutex<[Slot; CommandMethod::COUNT]>,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    armed: bool,
    handle: Option<JoinHandle<()>>,
}

impl DebounceMap {
    pub(crate) fn new() -> Self {
        Self {
            slots: Mutex::new(std::array::from_fn(|_| Slot::default())),
        }
    }

    /// Supersedes any armed timer for `method` and returns the generation
    /// the new timer must present to fire.
    pub(crate) fn arm(&self, method: CommandMethod) -> u64 {
        let mut slots = self.slots.lock();
        let slot = &mut slots[method.index()];
        slot.generation += 1;
        slot.armed = true;
        if let Some(handle) = slot.handle.take() {
            handle.abort();
        }
        slot.generation
    }

    /// Stores the task handle for an armed timer. If the slot moved on
    /// while the task was being spawned, the stale task is aborted
    /// instead.
    pub(crate) fn attach(&self, method: CommandMethod, generation: u64, handle: JoinHandle<()>) {
        let mut slots = self.slots.lock();
        let slot = &mut slots[method.index()];
        if slot.armed && slot.generation == generation {
            slot.handle = Some(handle);
        } else {
            handle.abort();
        }
    }

    /// Called by a woken timer before sending. Clears the slot and
    /// returns `true` if the timer still owns it; a superseded or
    /// cancelled timer gets `false` and must not send.
    pub(crate) fn try_claim(&self, method: CommandMethod, generation: u64) -> bool {
        let mut slots = self.slots.lock();
        let slot = &mut slots[method.index()];
        if slot.armed && slot.generation == generation {
            slot.armed = false;
            slot.handle = None;
            true
        } else {
            false
        }
    }

    /// Aborts every armed timer and clears all slots.
    pub(crate) fn cancel_all(&self) {
        let mut slots = self.slots.lock();
        for slot in slots.iter_mut() {
            slot.generation += 1;
            slot.armed = false;
            if let Some(handle) = slot.handle.take() {
                handle.abort();
            }
        }
    }

    /// Number of currently armed timers.
    #[cfg(test)]
    pub(crate) fn armed_count(&self) -> usize {
        self.slots.lock().iter().filter(|slot| slot.armed).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn arming_supersedes_previous_generation() {
        let map = DebounceMap::new();
        let first = map.arm(CommandMethod::SetBright);
        let second = map.arm(CommandMethod::SetBright);

        assert!(second > first);
        assert!(!map.try_claim(CommandMethod::SetBright, first));
        assert!(map.try_claim(CommandMethod::SetBright, second));
    }

    #[tokio::test]
    async fn claim_clears_the_slot() {
        let map = DebounceMap::new();
        let generation = map.arm(CommandMethod::SetCtAbx);

        assert_eq!(map.armed_count(), 1);
        assert!(map.try_claim(CommandMethod::SetCtAbx, generation));
        assert_eq!(map.armed_count(), 0);
        // A second claim of the same generation must fail.
        assert!(!map.try_claim(CommandMethod::SetCtAbx, generation));
    }

    #[tokio::test]
    async fn methods_use_independent_slots() {
        let map = DebounceMap::new();
        let bright = map.arm(CommandMethod::SetBright);
        let ct = map.arm(CommandMethod::SetCtAbx);

        assert_eq!(map.armed_count(), 2);
        assert!(map.try_claim(CommandMethod::SetBright, bright));
        assert!(map.try_claim(CommandMethod::SetCtAbx, ct));
    }

    #[tokio::test]
    async fn cancel_all_invalidates_armed_timers() {
        let map = DebounceMap::new();
        let bright = map.arm(CommandMethod::SetBright);
        let power = map.arm(CommandMethod::BgSetPower);

        map.cancel_all();
        assert_eq!(map.armed_count(), 0);
        assert!(!map.try_claim(CommandMethod::SetBright, bright));
        assert!(!map.try_claim(CommandMethod::BgSetPower, power));
    }

    #[tokio::test]
    async fn stale_attach_aborts_the_handle() {
        let map = DebounceMap::new();
        let stale = map.arm(CommandMethod::SetBright);
        let _current = map.arm(CommandMethod::SetBright);

        let handle = tokio::spawn(async {
            tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
        });
        map.attach(CommandMethod::SetBright, stale, handle);

        let slots = map.slots.lock();
        assert!(slots[CommandMethod::SetBright.index()].handle.is_none());
    }
}
