//! Step factories shipped with the crate

pub mod processing;

pub use processing::{ProcessingConfig, ProcessingInput, ProcessingOutput, ProcessingStepFactory};
