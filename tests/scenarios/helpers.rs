//! Shared fixtures for orchestration scenarios

use pipewright::core::{BuildingBlock, Environment, SharedConfig, Step, StepFactory, StepType, WaitPolicy};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Configuration for a [`TestStepFactory`]
#[derive(Debug, Clone)]
pub struct TestStepConfig {
    pub step_name: String,
    pub fail: bool,
}

/// Step factory double that counts invocations and can be told to fail
#[derive(Clone)]
pub struct TestStepFactory {
    name: &'static str,
    invocations: Arc<AtomicUsize>,
}

impl TestStepFactory {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            invocations: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

impl StepFactory for TestStepFactory {
    type Config = TestStepConfig;

    fn name(&self) -> &str {
        self.name
    }

    fn create_step(&self, shared: &SharedConfig, config: &TestStepConfig) -> anyhow::Result<Step> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        if config.fail {
            anyhow::bail!("factory {} refused {}", self.name, config.step_name);
        }
        Ok(Step::new(config.step_name.clone(), StepType::Processing)
            .with_env("PROJECT", shared.project_name.clone()))
    }
}

pub fn block(factory: &TestStepFactory, step_name: &str) -> BuildingBlock {
    BuildingBlock::new(
        factory.clone(),
        TestStepConfig {
            step_name: step_name.to_string(),
            fail: false,
        },
    )
}

pub fn failing_block(factory: &TestStepFactory, step_name: &str) -> BuildingBlock {
    BuildingBlock::new(
        factory.clone(),
        TestStepConfig {
            step_name: step_name.to_string(),
            fail: true,
        },
    )
}

/// Shared config that polls without sleeping
pub fn shared(project_name: &str, environment: Environment) -> SharedConfig {
    SharedConfig::new(project_name, "eu-west-1", "ml-artifacts", environment)
        .with_wait_policy(WaitPolicy::new(0, 10))
}
