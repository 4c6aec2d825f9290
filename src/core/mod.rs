//! Core identifiers: owners, phases, modifier and subscription handles.
//!
//! These are the small `Copy` types every other module passes around.

pub mod owner;
pub mod phase;

pub use owner::{OwnerArena, OwnerId};
pub use phase::Phase;

use serde::{Deserialize, Serialize};

/// Handle to one registered modifier, unique within its pipeline.
///
/// Ids are allocated in registration order, which is also the tie-break
/// order for modifiers sharing a phase and priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModifierId(pub u64);

impl ModifierId {
    /// Create a new modifier ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ModifierId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Modifier({})", self.0)
    }
}

/// Handle to an observer subscription on a pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

impl SubscriptionId {
    /// Create a new subscription ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Subscription({})", self.0)
    }
}
