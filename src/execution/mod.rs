//! Pipeline assembly and execution

pub mod assembler;
pub mod orchestrator;
pub mod waiter;

pub use assembler::PipelineAssembler;
pub use orchestrator::{EventHandler, OrchestrationEvent, PipelineOrchestrator};
pub use waiter::wait_for_completion;
