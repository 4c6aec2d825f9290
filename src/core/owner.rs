//! Owner identification.
//!
//! Every modifier is registered under an [`OwnerId`]: the relic instance,
//! ball effect or temporary buff that asked for it. Pipelines never look
//! behind the handle; they only compare it to find what to remove.
//!
//! ## Generations
//!
//! An `OwnerId` is an arena slot plus a generation counter. When an owner
//! is released its slot may be reused, but the generation is bumped first,
//! so a stale handle held by a destroyed object never matches the new
//! occupant's modifiers.
//!
//! ```
//! use rust_modifiers::core::OwnerArena;
//!
//! let mut arena = OwnerArena::new();
//! let relic = arena.acquire();
//! assert!(arena.is_live(relic));
//!
//! arena.release(relic);
//! let next = arena.acquire();
//!
//! assert_eq!(next.index(), relic.index()); // slot reused
//! assert_ne!(next, relic);                 // but never confused
//! ```

use serde::{Deserialize, Serialize};

/// Opaque identity under which modifiers are registered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OwnerId {
    index: u32,
    generation: u32,
}

impl OwnerId {
    /// Create an owner handle from raw parts.
    ///
    /// Hosts that already have stable identities (save-file ids, entity
    /// indices) can use this directly instead of an [`OwnerArena`].
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Owner handle for a host-assigned id with generation zero.
    #[must_use]
    pub const fn from_raw(index: u32) -> Self {
        Self::new(index, 0)
    }

    /// Arena slot.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot when this handle was issued.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl From<u32> for OwnerId {
    fn from(index: u32) -> Self {
        Self::from_raw(index)
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Owner({}v{})", self.index, self.generation)
    }
}

/// Allocator for generation-checked owner handles.
#[derive(Clone, Debug, Default)]
pub struct OwnerArena {
    /// Current generation per slot.
    generations: Vec<u32>,
    /// Whether the slot is currently handed out.
    live: Vec<bool>,
    /// Released slots, reused LIFO.
    free: Vec<u32>,
}

impl OwnerArena {
    /// Create an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh owner handle.
    pub fn acquire(&mut self) -> OwnerId {
        if let Some(index) = self.free.pop() {
            let slot = index as usize;
            self.live[slot] = true;
            return OwnerId::new(index, self.generations[slot]);
        }

        let index = self.generations.len() as u32;
        self.generations.push(0);
        self.live.push(true);
        OwnerId::new(index, 0)
    }

    /// Release a handle. Returns `false` if it was stale or never issued.
    pub fn release(&mut self, owner: OwnerId) -> bool {
        if !self.is_live(owner) {
            return false;
        }

        let slot = owner.index as usize;
        self.live[slot] = false;
        self.generations[slot] = self.generations[slot].wrapping_add(1);
        self.free.push(owner.index);
        true
    }

    /// Is this handle the current occupant of its slot?
    #[must_use]
    pub fn is_live(&self, owner: OwnerId) -> bool {
        let slot = owner.index as usize;
        slot < self.generations.len()
            && self.live[slot]
            && self.generations[slot] == owner.generation
    }

    /// Number of live owners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.iter().filter(|&&live| live).count()
    }

    /// Check if no owner is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
