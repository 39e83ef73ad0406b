//! Step domain model and the step factory contract

use crate::core::config::SharedConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Kind of work a step performs on the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepType {
    Processing,
    Training,
    Transform,
    Condition,
    RegisterModel,
}

/// A single unit of remote-executable work
///
/// Steps are produced once by a [`StepFactory`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Step {
    /// Step name, unique within a pipeline
    pub name: String,

    #[serde(rename = "Type")]
    pub step_type: StepType,

    /// Backend-specific arguments, passed through untouched
    pub arguments: serde_json::Value,

    /// Names of steps the backend must finish before this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    /// Command a local session runs for this step (empty = nothing to run)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,

    /// Environment variables for the step's process
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub environment: HashMap<String, String>,
}

impl Step {
    pub fn new(name: impl Into<String>, step_type: StepType) -> Self {
        Self {
            name: name.into(),
            step_type,
            arguments: serde_json::Value::Object(Default::default()),
            depends_on: Vec::new(),
            command: Vec::new(),
            environment: HashMap::new(),
        }
    }

    pub fn with_arguments(mut self, arguments: serde_json::Value) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn with_command<I, S>(mut self, command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command = command.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dependency(mut self, step_name: impl Into<String>) -> Self {
        self.depends_on.push(step_name.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }
}

/// Materializes a [`Step`] from shared and step-specific configuration
///
/// Implementations must be deterministic and must not assume any
/// connectivity (sessions, roles) has been resolved yet.
pub trait StepFactory: Send + Sync {
    /// Step-specific configuration this factory consumes
    type Config: Send + Sync;

    /// Human-readable factory name used in error messages
    fn name(&self) -> &str;

    fn create_step(&self, shared: &SharedConfig, config: &Self::Config) -> anyhow::Result<Step>;
}

trait MaterializeStep: Send + Sync {
    fn factory_name(&self) -> &str;
    fn materialize(&self, shared: &SharedConfig) -> anyhow::Result<Step>;
}

struct FactoryWithConfig<F: StepFactory> {
    factory: F,
    config: F::Config,
}

impl<F: StepFactory> MaterializeStep for FactoryWithConfig<F> {
    fn factory_name(&self) -> &str {
        self.factory.name()
    }

    fn materialize(&self, shared: &SharedConfig) -> anyhow::Result<Step> {
        self.factory.create_step(shared, &self.config)
    }
}

/// A step factory paired with its step configuration
pub struct BuildingBlock {
    inner: Box<dyn MaterializeStep>,
}

impl BuildingBlock {
    pub fn new<F>(factory: F, config: F::Config) -> Self
    where
        F: StepFactory + 'static,
    {
        Self {
            inner: Box::new(FactoryWithConfig { factory, config }),
        }
    }

    pub fn factory_name(&self) -> &str {
        self.inner.factory_name()
    }

    /// Invoke the factory with its paired configuration
    pub fn create_step(&self, shared: &SharedConfig) -> anyhow::Result<Step> {
        self.inner.materialize(shared)
    }
}

impl std::fmt::Debug for BuildingBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildingBlock")
            .field("factory", &self.factory_name())
            .finish()
    }
}
