//! pipewright - assemble step factories into pipelines and run them on an
//! orchestration backend

pub mod backend;
pub mod core;
pub mod data;
pub mod execution;
pub mod logging;
pub mod steps;

// Re-export commonly used types
pub use crate::backend::{Backend, LocalBackend, LocalBackendConfig};
pub use crate::core::{BuildingBlock, Environment, ExecutionStatus, SharedConfig, Step, StepFactory, StepType};
pub use crate::core::{OrchestratorError, WaitPolicy};
pub use crate::execution::{OrchestrationEvent, PipelineAssembler, PipelineOrchestrator};
