//! Remote pipeline and execution state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a pipeline execution as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// Execution is in progress
    Executing,
    /// A stop was requested and is being carried out
    Stopping,
    /// Execution was stopped before finishing
    Stopped,
    /// Execution failed
    Failed { reason: String },
    /// Execution finished successfully
    Succeeded,
}

impl ExecutionStatus {
    /// Check if the status will not change anymore
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecutionStatus::Stopped | ExecutionStatus::Failed { .. } | ExecutionStatus::Succeeded
        )
    }
}

/// A pipeline registered with the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineHandle {
    /// Pipeline name
    pub name: String,

    /// Backend identifier of the registered pipeline
    pub arn: String,

    /// Role the pipeline was registered with
    pub role_arn: String,
}

/// A started pipeline execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionHandle {
    /// Backend identifier of the execution
    pub execution_id: String,

    /// Pipeline the execution belongs to
    pub pipeline_name: String,

    /// When the backend accepted the start request
    pub started_at: DateTime<Utc>,
}
