//! Pipeline assembler - turns building blocks into an ordered step list

use crate::core::{
    config::SharedConfig,
    error::AssemblyError,
    step::{BuildingBlock, Step},
};
use std::collections::HashSet;
use tracing::{debug, error};

/// Materializes steps from (factory, config) pairs
pub struct PipelineAssembler;

impl PipelineAssembler {
    /// Invoke every factory in order and collect the resulting steps
    ///
    /// The output has the same order as `building_blocks`. The first
    /// failing factory aborts assembly and nothing built so far is returned.
    pub fn assemble(
        building_blocks: &[BuildingBlock],
        shared_config: &SharedConfig,
    ) -> Result<Vec<Step>, AssemblyError> {
        let mut steps = Vec::with_capacity(building_blocks.len());
        let mut names = HashSet::new();

        for (index, block) in building_blocks.iter().enumerate() {
            let step = block.create_step(shared_config).map_err(|source| {
                error!(
                    "Step factory {} (building block {}) failed: {:#}",
                    block.factory_name(),
                    index,
                    source
                );
                AssemblyError::Factory {
                    index,
                    factory: block.factory_name().to_string(),
                    source,
                }
            })?;

            if !names.insert(step.name.clone()) {
                return Err(AssemblyError::DuplicateStep {
                    index,
                    name: step.name,
                });
            }

            debug!("Assembled step {} from {}", step.name, block.factory_name());
            steps.push(step);
        }

        Ok(steps)
    }
}
