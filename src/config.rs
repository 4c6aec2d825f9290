//! Pipeline and registry configuration.
//!
//! Hosts configure behaviour at startup, either in code through the
//! builder methods or from JSON shipped alongside game data:
//!
//! ```
//! use rust_modifiers::config::RegistryConfig;
//! use rust_modifiers::registry::PipelineId;
//!
//! let config = RegistryConfig::from_json(r#"{
//!     "defaults": { "catch_panics": true },
//!     "overrides": { "player-attack": { "allow_duplicate_kinds": true } }
//! }"#).unwrap();
//!
//! assert!(config.for_pipeline(PipelineId::PlayerAttack).allow_duplicate_kinds);
//! assert!(!config.for_pipeline(PipelineId::CoinGain).allow_duplicate_kinds);
//! ```

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::registry::PipelineId;

/// Behaviour switches for a single pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Accept a second modifier of the same kind from the same owner.
    ///
    /// Off by default: re-registering is logged and ignored.
    pub allow_duplicate_kinds: bool,

    /// Catch panics from modifier bodies, conditions, callbacks and
    /// observers, and treat them as faults.
    pub catch_panics: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            allow_duplicate_kinds: false,
            catch_panics: true,
        }
    }
}

impl PipelineConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow the same owner to stack modifiers of one kind.
    #[must_use]
    pub fn allow_duplicates(mut self) -> Self {
        self.allow_duplicate_kinds = true;
        self
    }

    /// Let panics from rule bodies propagate to the caller.
    #[must_use]
    pub fn propagate_panics(mut self) -> Self {
        self.catch_panics = false;
        self
    }
}

/// Configuration for every pipeline in a [`Registry`](crate::registry::Registry).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Applied to every pipeline without an override.
    pub defaults: PipelineConfig,

    /// Per-pipeline replacements for `defaults`.
    pub overrides: FxHashMap<PipelineId, PipelineConfig>,
}

impl RegistryConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Replace the defaults.
    #[must_use]
    pub fn with_defaults(mut self, defaults: PipelineConfig) -> Self {
        self.defaults = defaults;
        self
    }

    /// Override the configuration of one pipeline.
    #[must_use]
    pub fn with_override(mut self, pipeline: PipelineId, config: PipelineConfig) -> Self {
        self.overrides.insert(pipeline, config);
        self
    }

    /// Effective configuration for a pipeline.
    #[must_use]
    pub fn for_pipeline(&self, pipeline: PipelineId) -> PipelineConfig {
        self.overrides
            .get(&pipeline)
            .copied()
            .unwrap_or(self.defaults)
    }
}
