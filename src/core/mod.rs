//! Core domain models
//!
//! Configuration, steps, pipeline definitions, backend connectivity and the
//! error taxonomy shared by the rest of the crate.

pub mod config;
pub mod context;
pub mod error;
pub mod pipeline;
pub mod state;
pub mod step;

pub use config::{Environment, SharedConfig, WaitPolicy};
pub use context::{ConnectionContext, ExecutionSession};
pub use error::*;
pub use pipeline::PipelineDefinition;
pub use state::*;
pub use step::{BuildingBlock, Step, StepFactory, StepType};
