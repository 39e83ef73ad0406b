//! Backend client interface for registering and running pipelines

pub mod client;
pub mod local;

use crate::core::{
    context::{ControlClient, ExecutionSession, RegionalSession, RuntimeClient},
    error::BackendError,
    pipeline::PipelineDefinition,
    state::{ExecutionHandle, ExecutionStatus, PipelineHandle},
};
use async_trait::async_trait;

pub use client::LocalBackendConfig;
pub use local::LocalBackend;

/// Narrow interface to the orchestration backend
///
/// Session and client derivations are only called by
/// [`ConnectionContext`](crate::core::ConnectionContext), which caches
/// their results for the rest of a run.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Open a session bound to a region through the credential chain
    async fn regional_session(&self, region: &str) -> Result<RegionalSession, BackendError>;

    /// Create the pipeline management client
    async fn control_client(&self, session: &RegionalSession) -> Result<ControlClient, BackendError>;

    /// Create the execution-time client
    async fn runtime_client(&self, session: &RegionalSession) -> Result<RuntimeClient, BackendError>;

    /// Look up the caller's default execution role
    async fn default_execution_role(&self, session: &ExecutionSession) -> Result<String, BackendError>;

    /// Create the pipeline, or replace an existing one with the same name
    ///
    /// `document` is the rendered [`PipelineDefinition::definition`].
    async fn create_pipeline(
        &self,
        pipeline: &PipelineDefinition,
        document: &str,
        role_arn: &str,
    ) -> Result<PipelineHandle, BackendError>;

    /// Start an execution of a registered pipeline
    async fn start(&self, pipeline: &PipelineHandle) -> Result<ExecutionHandle, BackendError>;

    /// Report the current status of an execution
    async fn describe_execution(
        &self,
        execution: &ExecutionHandle,
    ) -> Result<ExecutionStatus, BackendError>;
}
