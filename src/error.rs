//! Error types.
//!
//! Nothing in here ever escapes [`Pipeline::process`](crate::pipeline::Pipeline::process):
//! modifier faults are logged and skipped. Registry errors are returned to
//! the host because they mean the host wired something up wrong.

use std::any::Any;

use thiserror::Error;

use crate::registry::PipelineId;

/// Failure inside one modifier's body.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ModifierError {
    /// The rule body reported a failure.
    #[error("modifier failed: {0}")]
    Failed(String),

    /// The rule body (or its condition or callback) panicked.
    #[error("modifier panicked: {0}")]
    Panicked(String),
}

impl ModifierError {
    /// A failure reported by a rule body.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Convert a caught panic payload.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::Panicked(message)
    }
}

/// Host-side wiring errors from the [`Registry`](crate::registry::Registry).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("pipeline {0} is not defined")]
    UnknownPipeline(PipelineId),

    #[error("pipeline {pipeline} does not carry values of type {requested}")]
    TypeMismatch {
        pipeline: PipelineId,
        requested: &'static str,
    },

    #[error("pipeline {0} is already defined")]
    AlreadyDefined(PipelineId),
}

/// Failure loading a [`RegistryConfig`](crate::config::RegistryConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid registry config")]
    Parse(#[from] serde_json::Error),
}
