//! Bounded wait for a started execution

use crate::backend::Backend;
use crate::core::{
    config::WaitPolicy,
    error::ExecutionError,
    state::{ExecutionHandle, ExecutionStatus},
};
use tracing::debug;

/// Poll an execution until it reaches a terminal status
///
/// The first check happens right away; `policy.poll_interval()` separates
/// later checks. After `policy.max_attempts` non-terminal checks the wait
/// gives up with [`ExecutionError::WaitExhausted`]. `on_poll` sees every
/// observed status together with its 1-based attempt number.
pub async fn wait_for_completion<B, F>(
    backend: &B,
    execution: &ExecutionHandle,
    policy: &WaitPolicy,
    mut on_poll: F,
) -> Result<ExecutionStatus, ExecutionError>
where
    B: Backend + ?Sized,
    F: FnMut(u32, &ExecutionStatus),
{
    for attempt in 1..=policy.max_attempts {
        let status = backend
            .describe_execution(execution)
            .await
            .map_err(|source| ExecutionError::Poll {
                execution_id: execution.execution_id.clone(),
                source,
            })?;

        debug!(
            "Execution {} status check {}/{}: {:?}",
            execution.execution_id, attempt, policy.max_attempts, status
        );
        on_poll(attempt, &status);

        if status.is_terminal() {
            return Ok(status);
        }

        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.poll_interval()).await;
        }
    }

    Err(ExecutionError::WaitExhausted {
        execution_id: execution.execution_id.clone(),
        attempts: policy.max_attempts,
    })
}
