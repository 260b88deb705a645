//! Generational handle arena.
//!
//! Objects live in numbered slots. A [`Handle`] names a slot together with
//! the slot's generation, so a handle kept past the object's deletion no
//! longer resolves even after the slot is reused.
//!
//! Releasing a slot takes two explicit steps. [`HandleArena::retire`] takes
//! the item out and parks the slot: it is neither live nor reusable.
//! [`HandleArena::recycle`] then bumps the generation and puts the slot on
//! the free list. Callers unlink every reference to the handle in between.
//! A slot whose generation is used up is taken out of service for good
//! instead of wrapping back to a generation older handles may still carry.

use serde::{Deserialize, Serialize};
use sos_core::{Error, Handle, Result};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) enum SlotState<T> {
    Live(T),
    Retired,
    Free,
    /// Generations are used up; the slot is never handed out again.
    Exhausted,
}

impl<T> Slot<T> {
    /// Moves a released slot to its next generation. Returns false when the
    /// generation cannot advance and the slot is retired permanently.
    fn advance(&mut self) -> bool {
        match self.generation.checked_add(1) {
            Some(next) => {
                self.generation = next;
                self.state = SlotState::Free;
                true
            }
            None => {
                self.state = SlotState::Exhausted;
                false
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct Slot<T> {
    pub(crate) generation: u32,
    pub(crate) state: SlotState<T>,
}

/// Slot storage addressed by generational handles.
#[derive(Clone, Debug)]
pub struct HandleArena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
}

impl<T> Default for HandleArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HandleArena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Number of live items.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of slots ever allocated, live or not.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Stores `item`, reusing a recycled slot when one is available.
    pub fn allocate(&mut self, item: T) -> Result<Handle> {
        if let Some(slot) = self.free.pop() {
            let entry = &mut self.slots[slot as usize];
            entry.state = SlotState::Live(item);
            self.live += 1;
            return Ok(Handle::new(slot, entry.generation));
        }
        let slot = u32::try_from(self.slots.len())
            .map_err(|_| Error::resource_exhausted("object handle space is full"))?;
        self.slots.push(Slot {
            generation: 0,
            state: SlotState::Live(item),
        });
        self.live += 1;
        Ok(Handle::new(slot, 0))
    }

    fn slot(&self, handle: Handle) -> Option<&Slot<T>> {
        self.slots
            .get(handle.slot() as usize)
            .filter(|s| s.generation == handle.generation())
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.get(handle).is_some()
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        match &self.slot(handle)?.state {
            SlotState::Live(item) => Some(item),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        let slot = self
            .slots
            .get_mut(handle.slot() as usize)
            .filter(|s| s.generation == handle.generation())?;
        match &mut slot.state {
            SlotState::Live(item) => Some(item),
            _ => None,
        }
    }

    /// First release step: takes the item out of a live slot and parks the
    /// slot. Fails with `AlreadyDeleted` if the handle is not live.
    pub fn retire(&mut self, handle: Handle) -> Result<T> {
        let slot = self
            .slots
            .get_mut(handle.slot() as usize)
            .filter(|s| s.generation == handle.generation() && matches!(s.state, SlotState::Live(_)))
            .ok_or(Error::AlreadyDeleted { handle })?;
        self.live -= 1;
        match std::mem::replace(&mut slot.state, SlotState::Retired) {
            SlotState::Live(item) => Ok(item),
            _ => Err(Error::AlreadyDeleted { handle }),
        }
    }

    /// Second release step: makes a retired slot reusable under a new
    /// generation. Returns false if the slot was not retired by `handle`.
    pub fn recycle(&mut self, handle: Handle) -> bool {
        let Some(slot) = self.slots.get_mut(handle.slot() as usize) else {
            return false;
        };
        if slot.generation != handle.generation() || !matches!(slot.state, SlotState::Retired) {
            return false;
        }
        if slot.advance() {
            self.free.push(handle.slot());
        } else {
            tracing::debug!(slot = handle.slot(), "slot generations exhausted; slot retired");
        }
        true
    }

    /// Live items in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| match &slot.state {
            SlotState::Live(item) => Some((Handle::new(i as u32, slot.generation), item)),
            _ => None,
        })
    }

    /// Drops every item. Every slot becomes free under a new generation, so
    /// no handle issued before the call resolves afterwards.
    pub fn clear(&mut self) {
        self.free.clear();
        for (i, slot) in self.slots.iter_mut().enumerate().rev() {
            if !matches!(slot.state, SlotState::Exhausted) && slot.advance() {
                self.free.push(i as u32);
            }
        }
        self.live = 0;
    }

    pub(crate) fn slots(&self) -> &[Slot<T>] {
        &self.slots
    }

    pub(crate) fn free_list(&self) -> &[u32] {
        &self.free
    }

    /// Rebuilds an arena from persisted slots.
    ///
    /// Retired slots never reach a snapshot, since deletion completes before
    /// a commit can run; any found are treated as free.
    pub(crate) fn from_parts(mut slots: Vec<Slot<T>>, mut free: Vec<u32>) -> Result<Self> {
        for (i, slot) in slots.iter_mut().enumerate() {
            if matches!(slot.state, SlotState::Retired) {
                slot.state = SlotState::Free;
                free.push(i as u32);
            }
        }
        free.sort_unstable();
        free.dedup();
        for &f in &free {
            match slots.get(f as usize) {
                Some(Slot {
                    state: SlotState::Free,
                    ..
                }) => {}
                _ => return Err(Error::corrupted(format!("free list names slot {} which is not free", f))),
            }
        }
        let unlisted = slots
            .iter()
            .filter(|s| matches!(s.state, SlotState::Free))
            .count();
        if unlisted != free.len() {
            return Err(Error::corrupted("free slots missing from the free list"));
        }
        let exhausted = slots
            .iter()
            .filter(|s| matches!(s.state, SlotState::Exhausted))
            .count();
        let live = slots.len() - free.len() - exhausted;
        // Lowest free slot is popped first.
        free.reverse();
        Ok(Self { slots, free, live })
    }
}
