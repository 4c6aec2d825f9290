//! Read-only introspection for tooling.
//!
//! Everything here is a copy: holding a [`ModifierInfo`] or a
//! [`RegistrySnapshot`] gives no way back into the pipelines.

use serde::Serialize;

use crate::core::{ModifierId, OwnerId, Phase};
use crate::modifiers::{Modifier, ModifierKind};
use crate::registry::PipelineId;

/// Description of one registered modifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ModifierInfo {
    pub id: ModifierId,
    pub owner: OwnerId,
    pub kind: ModifierKind,
    pub name: String,
    pub phase: Phase,
    pub priority: i32,
}

impl ModifierInfo {
    pub(crate) fn new<T>(id: ModifierId, modifier: &Modifier<T>) -> Self {
        Self {
            id,
            owner: modifier.owner(),
            kind: modifier.kind().clone(),
            name: modifier.name().to_string(),
            phase: modifier.phase(),
            priority: modifier.priority(),
        }
    }
}

/// One pipeline's modifiers, in application order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PipelineSnapshot {
    pub pipeline: PipelineId,
    pub value_type: &'static str,
    pub modifiers: Vec<ModifierInfo>,
}

/// Every pipeline in a registry at one moment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RegistrySnapshot {
    pub pipelines: Vec<PipelineSnapshot>,
}

impl RegistrySnapshot {
    /// Modifiers registered by `owner`, with the pipeline each lives in.
    pub fn owned_by(&self, owner: OwnerId) -> impl Iterator<Item = (PipelineId, &ModifierInfo)> {
        self.pipelines.iter().flat_map(move |p| {
            p.modifiers
                .iter()
                .filter(move |m| m.owner == owner)
                .map(move |m| (p.pipeline, m))
        })
    }

    /// Total modifiers across all pipelines.
    #[must_use]
    pub fn total(&self) -> usize {
        self.pipelines.iter().map(|p| p.modifiers.len()).sum()
    }

    /// Pretty JSON for dumping to a debug console or file.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
