//! Processing step factory

use crate::core::{
    config::{validate_resource_name, Settings, SharedConfig},
    step::{Step, StepFactory, StepType},
};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;

/// Data made available to the processing container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingInput {
    pub name: String,
    pub source: String,
    pub destination: String,
}

/// Data uploaded from the processing container when it finishes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingOutput {
    pub name: String,
    pub source: String,

    /// Upload target; defaults to a prefix under the project bucket
    #[serde(default)]
    pub destination: Option<String>,
}

/// Configuration of one processing step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingConfig {
    pub step_name: String,

    /// Container image that runs the script
    pub image_uri: String,

    #[serde(default = "default_instance_type")]
    pub instance_type: String,

    #[serde(default = "default_instance_count")]
    pub instance_count: u32,

    /// Interpreter the script is run with
    #[serde(default = "default_command")]
    pub command: Vec<String>,

    /// Script to run inside the container
    pub code: String,

    #[serde(default)]
    pub arguments: Vec<String>,

    #[serde(default)]
    pub inputs: Vec<ProcessingInput>,

    #[serde(default)]
    pub outputs: Vec<ProcessingOutput>,

    #[serde(default)]
    pub environment: HashMap<String, String>,

    #[serde(default)]
    pub depends_on: Vec<String>,
}

fn default_instance_type() -> String {
    "ml.m5.xlarge".to_string()
}

fn default_instance_count() -> u32 {
    1
}

fn default_command() -> Vec<String> {
    vec!["python3".to_string()]
}

impl Settings for ProcessingConfig {
    fn validate(&self) -> Result<()> {
        validate_resource_name("step_name", &self.step_name)?;
        if self.image_uri.trim().is_empty() {
            anyhow::bail!("Step '{}' has no image_uri", self.step_name);
        }
        if self.instance_count == 0 {
            anyhow::bail!("Step '{}' needs at least one instance", self.step_name);
        }
        if self.command.is_empty() {
            anyhow::bail!("Step '{}' has an empty command", self.step_name);
        }
        if self.code.trim().is_empty() {
            anyhow::bail!("Step '{}' has no code to run", self.step_name);
        }
        Ok(())
    }
}

/// Builds `Processing` steps from [`ProcessingConfig`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessingStepFactory;

impl ProcessingStepFactory {
    fn output_destination(shared: &SharedConfig, config: &ProcessingConfig, output: &ProcessingOutput) -> String {
        output.destination.clone().unwrap_or_else(|| {
            format!(
                "s3://{}/{}/{}/{}",
                shared.project_bucket, shared.project_name, config.step_name, output.name
            )
        })
    }
}

impl StepFactory for ProcessingStepFactory {
    type Config = ProcessingConfig;

    fn name(&self) -> &str {
        "processing"
    }

    fn create_step(&self, shared: &SharedConfig, config: &ProcessingConfig) -> Result<Step> {
        config.validate()?;

        let inputs: Vec<_> = config
            .inputs
            .iter()
            .map(|input| {
                json!({
                    "InputName": input.name,
                    "S3Input": {
                        "S3Uri": input.source,
                        "LocalPath": input.destination,
                    },
                })
            })
            .collect();

        let outputs: Vec<_> = config
            .outputs
            .iter()
            .map(|output| {
                json!({
                    "OutputName": output.name,
                    "S3Output": {
                        "S3Uri": Self::output_destination(shared, config, output),
                        "LocalPath": output.source,
                    },
                })
            })
            .collect();

        let mut entrypoint = config.command.clone();
        entrypoint.push(config.code.clone());

        let arguments = json!({
            "ProcessingResources": {
                "ClusterConfig": {
                    "InstanceType": config.instance_type,
                    "InstanceCount": config.instance_count,
                },
            },
            "AppSpecification": {
                "ImageUri": config.image_uri,
                "ContainerEntrypoint": entrypoint,
                "ContainerArguments": config.arguments,
            },
            "ProcessingInputs": inputs,
            "ProcessingOutputConfig": { "Outputs": outputs },
            "Environment": config.environment,
        });

        let mut step = Step::new(config.step_name.clone(), StepType::Processing)
            .with_arguments(arguments)
            .with_command(entrypoint.into_iter().chain(config.arguments.iter().cloned()));
        step.depends_on = config.depends_on.clone();
        step.environment = config.environment.clone();
        Ok(step)
    }
}
