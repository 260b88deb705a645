//! Object handles.
//!
//! A handle names a live object inside one store. The slot part is recycled
//! after the object is deleted and fully removed from every index; the
//! generation part changes on every reuse so a stale handle is detected
//! instead of silently naming the new occupant.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned identifier for an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Handle {
    slot: u32,
    generation: u32,
}

impl Handle {
    /// Creates a handle from its parts.
    pub const fn new(slot: u32, generation: u32) -> Self {
        Self { slot, generation }
    }

    /// Returns the slot number.
    #[inline]
    pub fn slot(&self) -> u32 {
        self.slot
    }

    /// Returns the generation of the slot this handle was issued for.
    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.slot, self.generation)
    }
}
