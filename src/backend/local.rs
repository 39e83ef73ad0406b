//! In-process backend for `local` runs
//!
//! Pipelines are registered in memory and each execution runs the steps'
//! commands as child processes, one after another in submission order.

use crate::backend::{Backend, LocalBackendConfig};
use crate::core::{
    context::{ControlClient, ExecutionSession, RegionalSession, RuntimeClient},
    error::BackendError,
    pipeline::PipelineDefinition,
    state::{ExecutionHandle, ExecutionStatus, PipelineHandle},
    step::Step,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
struct RegisteredPipeline {
    definition: PipelineDefinition,
    document: String,
    role_arn: String,
}

/// Backend that executes pipelines on the local machine
#[derive(Debug, Clone)]
pub struct LocalBackend {
    config: LocalBackendConfig,
    pipelines: Arc<RwLock<HashMap<String, RegisteredPipeline>>>,
    executions: Arc<RwLock<HashMap<String, ExecutionStatus>>>,
}

impl LocalBackend {
    pub fn new(config: LocalBackendConfig) -> Self {
        Self {
            config,
            pipelines: Arc::new(RwLock::new(HashMap::new())),
            executions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Definition currently registered under a name
    pub async fn registered_pipeline(&self, name: &str) -> Option<PipelineDefinition> {
        self.pipelines
            .read()
            .await
            .get(name)
            .map(|p| p.definition.clone())
    }

    /// Rendered definition document currently registered under a name
    pub async fn registered_document(&self, name: &str) -> Option<String> {
        self.pipelines
            .read()
            .await
            .get(name)
            .map(|p| p.document.clone())
    }

    /// Number of executions still tracked; finished ones are dropped once
    /// their terminal status has been reported
    pub async fn tracked_executions(&self) -> usize {
        self.executions.read().await.len()
    }

    /// Number of registered pipelines
    pub async fn pipeline_count(&self) -> usize {
        self.pipelines.read().await.len()
    }

    fn pipeline_arn(name: &str) -> String {
        format!("local:pipeline/{}", name)
    }
}

impl Default for LocalBackend {
    fn default() -> Self {
        Self::new(LocalBackendConfig::default())
    }
}

#[async_trait]
impl Backend for LocalBackend {
    async fn regional_session(&self, region: &str) -> Result<RegionalSession, BackendError> {
        Ok(RegionalSession {
            region: region.to_string(),
            session_id: Uuid::new_v4().to_string(),
        })
    }

    async fn control_client(&self, session: &RegionalSession) -> Result<ControlClient, BackendError> {
        Ok(ControlClient {
            region: session.region.clone(),
            endpoint: format!("local://{}/control", session.region),
        })
    }

    async fn runtime_client(&self, session: &RegionalSession) -> Result<RuntimeClient, BackendError> {
        Ok(RuntimeClient {
            region: session.region.clone(),
            endpoint: format!("local://{}/runtime", session.region),
        })
    }

    async fn default_execution_role(&self, _session: &ExecutionSession) -> Result<String, BackendError> {
        Ok(self.config.execution_role.clone())
    }

    async fn create_pipeline(
        &self,
        pipeline: &PipelineDefinition,
        document: &str,
        role_arn: &str,
    ) -> Result<PipelineHandle, BackendError> {
        if !pipeline.session.is_local() {
            return Err(BackendError::Unsupported(format!(
                "pipeline '{}' is bound to a remote session",
                pipeline.name
            )));
        }

        let registered = RegisteredPipeline {
            definition: pipeline.clone(),
            document: document.to_string(),
            role_arn: role_arn.to_string(),
        };
        let replaced = self
            .pipelines
            .write()
            .await
            .insert(pipeline.name.clone(), registered)
            .is_some();

        if replaced {
            info!("Updated local pipeline {}", pipeline.name);
        } else {
            info!("Created local pipeline {}", pipeline.name);
        }
        debug!("Pipeline {} definition: {}", pipeline.name, document);

        Ok(PipelineHandle {
            name: pipeline.name.clone(),
            arn: Self::pipeline_arn(&pipeline.name),
            role_arn: role_arn.to_string(),
        })
    }

    async fn start(&self, pipeline: &PipelineHandle) -> Result<ExecutionHandle, BackendError> {
        let registered = self
            .pipelines
            .read()
            .await
            .get(&pipeline.name)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("pipeline '{}'", pipeline.name)))?;

        let execution_id = Uuid::new_v4().to_string();
        self.executions
            .write()
            .await
            .insert(execution_id.clone(), ExecutionStatus::Executing);

        info!(
            "Starting local execution {} of {} as {}",
            execution_id, pipeline.name, registered.role_arn
        );

        let executions = self.executions.clone();
        let config = self.config.clone();
        let id = execution_id.clone();
        tokio::spawn(async move {
            let status = run_steps(&registered.definition.steps, &config).await;
            executions.write().await.insert(id, status);
        });

        Ok(ExecutionHandle {
            execution_id,
            pipeline_name: pipeline.name.clone(),
            started_at: chrono::Utc::now(),
        })
    }

    async fn describe_execution(
        &self,
        execution: &ExecutionHandle,
    ) -> Result<ExecutionStatus, BackendError> {
        let mut executions = self.executions.write().await;
        let status = executions
            .get(&execution.execution_id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("execution '{}'", execution.execution_id)))?;

        if status.is_terminal() {
            executions.remove(&execution.execution_id);
            debug!("Dropped finished execution {}", execution.execution_id);
        }
        Ok(status)
    }
}

/// Run every step in order, stopping at the first failure
async fn run_steps(steps: &[Step], config: &LocalBackendConfig) -> ExecutionStatus {
    for step in steps {
        if let Err(reason) = run_step(step, config).await {
            warn!("Local step {} failed: {}", step.name, reason);
            return ExecutionStatus::Failed {
                reason: format!("step '{}': {}", step.name, reason),
            };
        }
    }
    ExecutionStatus::Succeeded
}

async fn run_step(step: &Step, config: &LocalBackendConfig) -> Result<(), String> {
    let Some((program, args)) = step.command.split_first() else {
        debug!("Step {} has no local command", step.name);
        return Ok(());
    };

    debug!("Running step {}: {} {:?}", step.name, program, args);

    let mut command = Command::new(program);
    command.args(args).envs(&step.environment).kill_on_drop(true);
    if let Some(dir) = &config.working_dir {
        command.current_dir(dir);
    }

    let output = timeout(Duration::from_secs(config.step_timeout_secs), command.output())
        .await
        .map_err(|_| format!("timed out after {} seconds", config.step_timeout_secs))?
        .map_err(|e| format!("failed to spawn '{}': {}", program, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let exit_code = output.status.code().unwrap_or(-1);
        return Err(format!("exited with code {}: {}", exit_code, stderr.trim()));
    }

    debug!(
        "Step {} finished with {} bytes of output",
        step.name,
        output.stdout.len()
    );
    Ok(())
}
