//! # rust-modifiers
//!
//! Deterministic value-modification pipelines for game rules.
//!
//! Relics, ball effects and economy rules all want a say in values like
//! "coins gained" or "damage dealt". Each rule is a [`Modifier`]; each kind
//! of value has a [`Pipeline`] that runs its modifiers in a fixed order and
//! returns the result to the host.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Modifiers run by phase, then priority, then
//!    registration order. Same modifiers, same input, same output.
//!
//! 2. **Fail-Safe**: A broken rule is logged and skipped. A re-entrant
//!    call gets its input back. Nothing here stops the host loop.
//!
//! 3. **Owner-Scoped**: Every modifier belongs to an owner, and one call
//!    removes an owner's modifiers from every pipeline.
//!
//! 4. **Generic Values**: Pipelines carry any cloneable value, from plain
//!    integers to the six-channel [`AttackData`].
//!
//! ## Modules
//!
//! - `core`: Owner handles, phases, modifier and subscription ids
//! - `modifiers`: Modifier kinds, conditions, value traits
//! - `pipeline`: The ordered chain, observers, traces
//! - `registry`: Named pipelines and owner lifecycle
//! - `attack`: Multi-channel attack payloads
//! - `config`: Pipeline and registry configuration
//! - `debug`: Read-only introspection for tooling
//! - `error`: Error types

pub mod core;
pub mod error;
pub mod config;
pub mod modifiers;
pub mod pipeline;
pub mod registry;
pub mod attack;
pub mod debug;

// Re-export commonly used types
pub use crate::core::{ModifierId, OwnerArena, OwnerId, Phase, SubscriptionId};

pub use crate::error::{ConfigError, ModifierError, RegistryError};

pub use crate::config::{PipelineConfig, RegistryConfig};

pub use crate::modifiers::{Additive, Channeled, Condition, Modifier, ModifierKind, Scalable};

pub use crate::pipeline::{Pipeline, Registration, StepOutcome, Trace, TraceStep};

pub use crate::registry::{OwnerScope, PipelineId, Registry};

pub use crate::attack::{AttackChannel, AttackData};

pub use crate::debug::{ModifierInfo, PipelineSnapshot, RegistrySnapshot};
