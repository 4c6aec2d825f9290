//! Registry storage and typed pipeline lookup.

use std::any::{self, Any};
use std::fmt;
use std::sync::{Arc, Mutex};

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use strum::IntoEnumIterator;
use tracing::debug;

use crate::attack::AttackData;
use crate::config::RegistryConfig;
use crate::core::{OwnerArena, OwnerId};
use crate::debug::{ModifierInfo, PipelineSnapshot, RegistrySnapshot};
use crate::error::RegistryError;
use crate::modifiers::Modifier;
use crate::pipeline::{lock, Pipeline, Registration};

use super::PipelineId;

const TARGET: &str = "modifiers::registry";

/// Type-independent view of a pipeline, used for owner sweeps and tooling.
trait ErasedPipeline: Send + Sync {
    fn remove_modifiers_for(&self, owner: OwnerId) -> usize;
    fn has_owner(&self, owner: OwnerId) -> bool;
    fn modifiers(&self) -> Vec<ModifierInfo>;
    fn clear(&self);
}

impl<T: Clone + Send + Sync + 'static> ErasedPipeline for Pipeline<T> {
    fn remove_modifiers_for(&self, owner: OwnerId) -> usize {
        Pipeline::remove_modifiers_for(self, owner)
    }

    fn has_owner(&self, owner: OwnerId) -> bool {
        Pipeline::has_owner(self, owner)
    }

    fn modifiers(&self) -> Vec<ModifierInfo> {
        Pipeline::modifiers(self)
    }

    fn clear(&self) {
        Pipeline::clear(self);
    }
}

/// One defined pipeline. `typed` and `erased` point at the same object.
struct Slot {
    id: PipelineId,
    value_type: &'static str,
    typed: Arc<dyn Any + Send + Sync>,
    erased: Arc<dyn ErasedPipeline>,
}

/// Named pipelines plus owner bookkeeping.
///
/// Pipelines are defined up front (`&mut self`) and live as long as the
/// registry. Everything after that (registering, processing, removing)
/// takes `&self`, so the registry can be shared behind an `Arc`.
pub struct Registry {
    config: RegistryConfig,
    /// Kept in definition order so sweeps and snapshots are deterministic.
    slots: Vec<Slot>,
    pub(super) owners: Mutex<OwnerArena>,
    /// Pipelines each owner registered into through this registry.
    pub(super) touched: Mutex<FxHashMap<OwnerId, SmallVec<[PipelineId; 4]>>>,
}

impl Registry {
    /// Registry with the standard pipelines and default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Registry with the standard pipelines.
    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        let mut registry = Self::empty(config);
        for id in PipelineId::iter() {
            match id {
                PipelineId::PlayerAttack => {
                    registry.insert_slot::<AttackData>(id);
                }
                _ => {
                    registry.insert_slot::<i32>(id);
                }
            }
        }
        registry
    }

    /// Registry with no pipelines; define them with [`define`](Self::define).
    #[must_use]
    pub fn empty(config: RegistryConfig) -> Self {
        Self {
            config,
            slots: Vec::new(),
            owners: Mutex::new(OwnerArena::new()),
            touched: Mutex::new(FxHashMap::default()),
        }
    }

    /// Create the pipeline `id` carrying values of type `T`.
    pub fn define<T>(&mut self, id: PipelineId) -> Result<Arc<Pipeline<T>>, RegistryError>
    where
        T: Clone + Send + Sync + 'static,
    {
        if self.slot(id).is_some() {
            return Err(RegistryError::AlreadyDefined(id));
        }
        Ok(self.insert_slot(id))
    }

    /// Append a pipeline slot. Callers ensure `id` is not yet defined.
    fn insert_slot<T>(&mut self, id: PipelineId) -> Arc<Pipeline<T>>
    where
        T: Clone + Send + Sync + 'static,
    {
        let pipeline = Arc::new(Pipeline::<T>::with_config(
            id.to_string(),
            self.config.for_pipeline(id),
        ));
        self.slots.push(Slot {
            id,
            value_type: any::type_name::<T>(),
            typed: pipeline.clone(),
            erased: pipeline.clone(),
        });

        debug!(target: TARGET, pipeline = %id, value_type = any::type_name::<T>(), "Pipeline defined");
        pipeline
    }

    fn slot(&self, id: PipelineId) -> Option<&Slot> {
        self.slots.iter().find(|s| s.id == id)
    }

    /// Typed handle to a pipeline.
    pub fn pipeline<T>(&self, id: PipelineId) -> Result<Arc<Pipeline<T>>, RegistryError>
    where
        T: Clone + Send + Sync + 'static,
    {
        let slot = self.slot(id).ok_or(RegistryError::UnknownPipeline(id))?;
        Arc::clone(&slot.typed)
            .downcast::<Pipeline<T>>()
            .map_err(|_| RegistryError::TypeMismatch {
                pipeline: id,
                requested: any::type_name::<T>(),
            })
    }

    /// Is `id` defined?
    #[must_use]
    pub fn contains(&self, id: PipelineId) -> bool {
        self.slot(id).is_some()
    }

    /// Defined pipelines, in definition order.
    pub fn ids(&self) -> impl Iterator<Item = PipelineId> + '_ {
        self.slots.iter().map(|s| s.id)
    }

    /// Configuration the registry was built with.
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Run `base` through pipeline `id`.
    pub fn process<T>(&self, id: PipelineId, base: T) -> Result<T, RegistryError>
    where
        T: Clone + Send + Sync + 'static,
    {
        Ok(self.pipeline::<T>(id)?.process(base))
    }

    /// Register a modifier on pipeline `id` and remember that its owner
    /// touched that pipeline.
    pub fn register_modifier<T>(
        &self,
        id: PipelineId,
        modifier: Modifier<T>,
    ) -> Result<Registration, RegistryError>
    where
        T: Clone + Send + Sync + 'static,
    {
        let pipeline = self.pipeline::<T>(id)?;
        let owner = modifier.owner();
        let registration = pipeline.add_modifier(modifier);

        let mut touched = lock(&self.touched);
        let pipelines = touched.entry(owner).or_default();
        if !pipelines.contains(&id) {
            pipelines.push(id);
        }

        Ok(registration)
    }

    /// Read-only listing of one pipeline's modifiers, in application order.
    pub fn modifiers(&self, id: PipelineId) -> Result<Vec<ModifierInfo>, RegistryError> {
        self.slot(id)
            .map(|s| s.erased.modifiers())
            .ok_or(RegistryError::UnknownPipeline(id))
    }

    /// Copy of every pipeline's modifiers.
    #[must_use]
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            pipelines: self
                .slots
                .iter()
                .map(|s| PipelineSnapshot {
                    pipeline: s.id,
                    value_type: s.value_type,
                    modifiers: s.erased.modifiers(),
                })
                .collect(),
        }
    }

    /// Remove every modifier `owner` has in any pipeline.
    ///
    /// Sweeps every pipeline, including ones the owner reached without
    /// going through [`register_modifier`](Self::register_modifier).
    /// Safe to call repeatedly or for owners that registered nothing.
    pub fn remove_all_for(&self, owner: OwnerId) -> usize {
        let removed: usize = self
            .slots
            .iter()
            .map(|s| s.erased.remove_modifiers_for(owner))
            .sum();
        lock(&self.touched).remove(&owner);

        if removed > 0 {
            debug!(target: TARGET, owner = %owner, removed, "Owner removed from all pipelines");
        }
        removed
    }

    /// Pipelines in which `owner` currently has modifiers.
    #[must_use]
    pub fn pipelines_with(&self, owner: OwnerId) -> Vec<PipelineId> {
        self.slots
            .iter()
            .filter(|s| s.erased.has_owner(owner))
            .map(|s| s.id)
            .collect()
    }

    /// Pipelines `owner` registered into through this registry since it
    /// was last removed.
    #[must_use]
    pub fn pipelines_touched_by(&self, owner: OwnerId) -> Vec<PipelineId> {
        lock(&self.touched)
            .get(&owner)
            .map(|p| p.to_vec())
            .unwrap_or_default()
    }

    /// Remove every modifier and observer from every pipeline. Teardown only.
    pub fn clear(&self) {
        for slot in &self.slots {
            slot.erased.clear();
        }
        lock(&self.touched).clear();
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("pipelines", &self.ids().collect::<Vec<_>>())
            .field("config", &self.config)
            .finish()
    }
}
