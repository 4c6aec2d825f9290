//! Owner-scoped registration and teardown.
//!
//! An effect (a relic, a timed buff) acquires an owner handle when it
//! activates, registers whatever modifiers it needs across any pipelines,
//! and releases the handle when it ends. Releasing removes everything the
//! owner left behind in one call.

use tracing::warn;

use crate::core::OwnerId;
use crate::error::RegistryError;
use crate::modifiers::Modifier;
use crate::pipeline::{lock, Registration};

use super::{PipelineId, Registry};

impl Registry {
    /// Issue a fresh owner handle from the registry's arena.
    pub fn acquire_owner(&self) -> OwnerId {
        lock(&self.owners).acquire()
    }

    /// Remove everything `owner` registered and retire the handle.
    ///
    /// Returns the number of modifiers removed. Releasing an unknown or
    /// already-released handle still sweeps the pipelines and is otherwise
    /// a no-op.
    pub fn release_owner(&self, owner: OwnerId) -> usize {
        let removed = self.remove_all_for(owner);
        if !lock(&self.owners).release(owner) {
            warn!(
                target: "modifiers::registry",
                owner = %owner,
                "Released owner was not live in this registry"
            );
        }
        removed
    }

    /// Is `owner` a live handle issued by this registry?
    #[must_use]
    pub fn is_live_owner(&self, owner: OwnerId) -> bool {
        lock(&self.owners).is_live(owner)
    }

    /// Acquire a new owner and return a scope for registering under it.
    pub fn scope(&self) -> OwnerScope<'_> {
        OwnerScope {
            registry: self,
            owner: self.acquire_owner(),
        }
    }
}

/// Registration helper bound to one owner.
///
/// Every modifier registered through the scope is built for the scope's
/// owner, so an effect cannot accidentally register under someone else.
///
/// ```
/// use rust_modifiers::modifiers::Modifier;
/// use rust_modifiers::registry::{PipelineId, Registry};
///
/// let registry = Registry::new();
/// let scope = registry.scope();
///
/// scope.register(PipelineId::CoinGain, |owner| Modifier::addition(owner, 2)).unwrap();
/// scope.register(PipelineId::CoinConsume, |owner| Modifier::<i32>::multiplication(owner, 0.5)).unwrap();
/// assert_eq!(registry.process(PipelineId::CoinConsume, 10), Ok(5));
///
/// let owner = scope.release();
/// assert!(!registry.is_live_owner(owner));
/// assert_eq!(registry.process(PipelineId::CoinConsume, 10), Ok(10));
/// ```
#[derive(Debug)]
pub struct OwnerScope<'r> {
    registry: &'r Registry,
    owner: OwnerId,
}

impl<'r> OwnerScope<'r> {
    /// The owner this scope registers under.
    #[must_use]
    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Build a modifier for this owner and register it on `pipeline`.
    pub fn register<T, F>(&self, pipeline: PipelineId, build: F) -> Result<Registration, RegistryError>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce(OwnerId) -> Modifier<T>,
    {
        self.registry.register_modifier(pipeline, build(self.owner))
    }

    /// Pipelines this owner currently has modifiers in.
    #[must_use]
    pub fn pipelines(&self) -> Vec<PipelineId> {
        self.registry.pipelines_with(self.owner)
    }

    /// Remove everything registered under this scope and retire the owner.
    pub fn release(self) -> OwnerId {
        self.registry.release_owner(self.owner);
        self.owner
    }
}
