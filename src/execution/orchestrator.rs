//! Pipeline orchestrator - assembles, registers and runs a pipeline

use crate::{
    backend::Backend,
    core::{
        config::SharedConfig,
        context::ConnectionContext,
        error::{AssemblyError, ExecutionError, OrchestratorError, RegistrationError},
        pipeline::PipelineDefinition,
        state::{ExecutionHandle, ExecutionStatus, PipelineHandle},
        step::{BuildingBlock, Step},
    },
    execution::{assembler::PipelineAssembler, waiter::wait_for_completion},
};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{error, info, warn};

/// Events that can occur while a pipeline is registered and run
#[derive(Debug, Clone)]
pub enum OrchestrationEvent {
    PipelineRegistered {
        name: String,
        role_arn: String,
    },
    ExecutionStarted {
        pipeline_name: String,
        execution_id: String,
    },
    ExecutionPolled {
        execution_id: String,
        attempt: u32,
        status: ExecutionStatus,
    },
    ExecutionFinished {
        execution_id: String,
        status: ExecutionStatus,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(OrchestrationEvent) + Send + Sync>;

/// Owns the lifecycle of one pipeline run
///
/// Steps are assembled on construction. The pipeline is registered with the
/// backend the first time it is needed and reused afterwards.
pub struct PipelineOrchestrator<B> {
    shared_config: SharedConfig,
    steps: Vec<Step>,
    backend: Arc<B>,
    context: ConnectionContext<B>,
    pipeline: OnceCell<PipelineHandle>,
    event_handlers: Vec<EventHandler>,
}

impl<B: Backend> PipelineOrchestrator<B> {
    pub fn new(
        building_blocks: Vec<BuildingBlock>,
        shared_config: SharedConfig,
        backend: B,
    ) -> Result<Self, AssemblyError> {
        let steps = PipelineAssembler::assemble(&building_blocks, &shared_config)?;
        info!(
            "Assembled {} steps for pipeline {} ({})",
            steps.len(),
            shared_config.project_name,
            shared_config.environment
        );

        let backend = Arc::new(backend);
        let context = ConnectionContext::new(backend.clone(), shared_config.clone());

        Ok(Self {
            shared_config,
            steps,
            backend,
            context,
            pipeline: OnceCell::new(),
            event_handlers: Vec::new(),
        })
    }

    /// Add an event handler
    pub fn with_event_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(OrchestrationEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
        self
    }

    fn emit_event(&self, event: OrchestrationEvent) {
        for handler in &self.event_handlers {
            handler(event.clone());
        }
    }

    /// Assembled steps in submission order
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn shared_config(&self) -> &SharedConfig {
        &self.shared_config
    }

    pub fn context(&self) -> &ConnectionContext<B> {
        &self.context
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The registered pipeline, creating it on first access
    pub async fn pipeline(&self) -> Result<&PipelineHandle, OrchestratorError> {
        self.pipeline.get_or_try_init(|| self.register()).await
    }

    async fn register(&self) -> Result<PipelineHandle, OrchestratorError> {
        let name = self.shared_config.project_name.clone();
        let session = self.context.execution_session().await?.clone();
        let definition = PipelineDefinition::new(name.clone(), self.steps.clone(), session);
        let role_arn = self.context.resolved_role().await?;
        let document = definition
            .definition()
            .map_err(|source| RegistrationError::Definition {
                name: name.clone(),
                source,
            })?;

        info!("Registering pipeline {} with role {}", name, role_arn);
        let handle = self
            .backend
            .create_pipeline(&definition, &document, role_arn)
            .await
            .map_err(|source| {
                error!("Failed to register pipeline {}: {}", name, source);
                RegistrationError::Rejected {
                    name: name.clone(),
                    source,
                }
            })?;

        self.emit_event(OrchestrationEvent::PipelineRegistered {
            name,
            role_arn: handle.role_arn.clone(),
        });
        Ok(handle)
    }

    /// Start an execution and wait for it to finish
    ///
    /// Blocks for at most `wait.poll_interval_secs * wait.max_attempts`.
    /// Only a successful execution returns `Ok`.
    pub async fn run(&self) -> Result<(), OrchestratorError> {
        self.log_wait_bounds();
        let execution = self.start().await?;
        self.wait(&execution).await
    }

    /// Like [`run`](Self::run), but stop waiting once `shutdown` resolves
    ///
    /// The remote execution keeps going; only the local wait is abandoned.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<(), OrchestratorError>
    where
        F: Future<Output = ()>,
    {
        self.log_wait_bounds();
        let execution = self.start().await?;
        tokio::select! {
            biased;
            _ = shutdown => {
                warn!("Stopped waiting for execution {}", execution.execution_id);
                Err(ExecutionError::Cancelled {
                    execution_id: execution.execution_id.clone(),
                }
                .into())
            }
            result = self.wait(&execution) => result,
        }
    }

    fn log_wait_bounds(&self) {
        let wait = &self.shared_config.wait;
        info!(
            "Running pipeline {}: up to {} status checks every {}s (at most {}s of waiting)",
            self.shared_config.project_name,
            wait.max_attempts,
            wait.poll_interval_secs,
            wait.max_wait().as_secs()
        );
    }

    async fn start(&self) -> Result<ExecutionHandle, OrchestratorError> {
        let pipeline = self.pipeline().await?;
        let execution = self
            .backend
            .start(pipeline)
            .await
            .map_err(|source| ExecutionError::Start {
                name: pipeline.name.clone(),
                source,
            })?;

        info!(
            "Started execution {} of pipeline {}",
            execution.execution_id, pipeline.name
        );
        self.emit_event(OrchestrationEvent::ExecutionStarted {
            pipeline_name: pipeline.name.clone(),
            execution_id: execution.execution_id.clone(),
        });
        Ok(execution)
    }

    async fn wait(&self, execution: &ExecutionHandle) -> Result<(), OrchestratorError> {
        let status = wait_for_completion(
            self.backend.as_ref(),
            execution,
            &self.shared_config.wait,
            |attempt, status| {
                self.emit_event(OrchestrationEvent::ExecutionPolled {
                    execution_id: execution.execution_id.clone(),
                    attempt,
                    status: status.clone(),
                })
            },
        )
        .await
        .map_err(|e| {
            error!("{}", e);
            e
        })?;

        self.emit_event(OrchestrationEvent::ExecutionFinished {
            execution_id: execution.execution_id.clone(),
            status: status.clone(),
        });

        let execution_id = execution.execution_id.clone();
        match status {
            ExecutionStatus::Succeeded => {
                info!("Pipeline {} finished successfully", execution.pipeline_name);
                Ok(())
            }
            ExecutionStatus::Failed { reason } => {
                error!("Pipeline {} failed: {}", execution.pipeline_name, reason);
                Err(ExecutionError::Failed { execution_id, reason }.into())
            }
            ExecutionStatus::Stopped => {
                warn!("Pipeline {} was stopped", execution.pipeline_name);
                Err(ExecutionError::Stopped { execution_id }.into())
            }
            status @ (ExecutionStatus::Executing | ExecutionStatus::Stopping) => {
                unreachable!(
                    "wait_for_completion only returns terminal statuses, got {:?}",
                    status
                )
            }
        }
    }
}
