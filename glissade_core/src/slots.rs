// Copyright 2026 the Glissade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generational slot storage for effect instances.
//!
//! Every per-element effect (viewport binding, tilt, parallax, count-up) lives
//! in a [`Slots`] arena and is addressed by a [`SlotId`]. Removing an entry
//! bumps the slot's generation, so a handle kept by a UI element after its
//! effect was torn down is detected as stale and every operation on it
//! becomes a no-op instead of touching a recycled slot.

use alloc::vec::Vec;
use core::fmt;

/// A handle to an entry in a [`Slots`] arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId {
    /// Slot index into the arena.
    pub(crate) idx: u32,
    /// Generation counter; must match the arena's generation for this slot.
    pub(crate) generation: u32,
}

impl SlotId {
    /// Returns the raw slot index (for diagnostics and dirty-tracking keys).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlotId({}@gen{})", self.idx, self.generation)
    }
}

#[derive(Debug)]
struct Entry<T> {
    generation: u32,
    value: Option<T>,
}

/// Generational arena. Freed slots are recycled through a free list.
#[derive(Debug)]
pub struct Slots<T> {
    entries: Vec<Entry<T>>,
    free_list: Vec<u32>,
    live: usize,
}

impl<T> Default for Slots<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Slots<T> {
    /// Creates an empty arena.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            free_list: Vec::new(),
            live: 0,
        }
    }

    /// Inserts a value and returns its handle.
    pub fn insert(&mut self, value: T) -> SlotId {
        self.live += 1;
        if let Some(idx) = self.free_list.pop() {
            let entry = &mut self.entries[idx as usize];
            entry.value = Some(value);
            return SlotId {
                idx,
                generation: entry.generation,
            };
        }
        assert!(
            self.entries.len() < u32::MAX as usize,
            "effect arena exhausted"
        );
        #[expect(
            clippy::cast_possible_truncation,
            reason = "checked against u32::MAX above"
        )]
        let idx = self.entries.len() as u32;
        self.entries.push(Entry {
            generation: 0,
            value: Some(value),
        });
        SlotId { idx, generation: 0 }
    }

    /// Removes and returns the value for a live handle. Stale handles return
    /// `None`.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        let entry = self.entries.get_mut(id.idx as usize)?;
        if entry.generation != id.generation {
            return None;
        }
        let value = entry.value.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free_list.push(id.idx);
        self.live -= 1;
        Some(value)
    }

    /// Returns whether the handle refers to a live entry.
    #[must_use]
    pub fn contains(&self, id: SlotId) -> bool {
        self.get(id).is_some()
    }

    /// Returns a reference to a live entry.
    #[must_use]
    pub fn get(&self, id: SlotId) -> Option<&T> {
        let entry = self.entries.get(id.idx as usize)?;
        if entry.generation != id.generation {
            return None;
        }
        entry.value.as_ref()
    }

    /// Returns a mutable reference to a live entry.
    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        let entry = self.entries.get_mut(id.idx as usize)?;
        if entry.generation != id.generation {
            return None;
        }
        entry.value.as_mut()
    }

    /// Returns the live entry at raw slot `idx`, with its handle.
    #[must_use]
    pub fn get_at(&self, idx: u32) -> Option<(SlotId, &T)> {
        let entry = self.entries.get(idx as usize)?;
        let value = entry.value.as_ref()?;
        Some((
            SlotId {
                idx,
                generation: entry.generation,
            },
            value,
        ))
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether the arena holds no live entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Iterates live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &T)> {
        self.entries.iter().enumerate().filter_map(|(idx, entry)| {
            let value = entry.value.as_ref()?;
            #[expect(
                clippy::cast_possible_truncation,
                reason = "insert caps the arena below u32::MAX slots"
            )]
            let idx = idx as u32;
            Some((
                SlotId {
                    idx,
                    generation: entry.generation,
                },
                value,
            ))
        })
    }

    /// Iterates live entries mutably in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SlotId, &mut T)> {
        self.entries
            .iter_mut()
            .enumerate()
            .filter_map(|(idx, entry)| {
                let generation = entry.generation;
                let value = entry.value.as_mut()?;
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "insert caps the arena below u32::MAX slots"
                )]
                let idx = idx as u32;
                Some((SlotId { idx, generation }, value))
            })
    }

    /// Returns the handles of all live entries.
    #[must_use]
    pub fn ids(&self) -> Vec<SlotId> {
        self.iter().map(|(id, _)| id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut slots = Slots::new();
        let a = slots.insert("a");
        let b = slots.insert("b");
        assert_eq!(slots.get(a), Some(&"a"));
        assert_eq!(slots.get(b), Some(&"b"));
        assert_eq!(slots.len(), 2);
    }

    #[test]
    fn removed_handle_is_stale_after_reuse() {
        let mut slots = Slots::new();
        let a = slots.insert(1);
        assert_eq!(slots.remove(a), Some(1));
        let b = slots.insert(2);
        assert_eq!(a.index(), b.index(), "slot should be recycled");
        assert_ne!(a.generation(), b.generation(), "generation must bump");
        assert_eq!(slots.get(a), None, "stale handle must not see new value");
        assert_eq!(slots.remove(a), None, "stale remove is a no-op");
        assert_eq!(slots.get(b), Some(&2));
    }

    #[test]
    fn double_remove_is_noop() {
        let mut slots = Slots::new();
        let a = slots.insert(());
        assert!(slots.remove(a).is_some());
        assert!(slots.remove(a).is_none());
        assert!(slots.is_empty());
    }

    #[test]
    fn iter_skips_free_slots() {
        let mut slots = Slots::new();
        let a = slots.insert(10);
        let b = slots.insert(20);
        let c = slots.insert(30);
        let _ = slots.remove(b);
        let seen: Vec<_> = slots.iter().map(|(id, v)| (id, *v)).collect();
        assert_eq!(seen, alloc::vec![(a, 10), (c, 30)]);
        assert_eq!(slots.get_at(b.index()), None);
    }
}
