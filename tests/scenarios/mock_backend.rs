//! Counting backend double for deterministic orchestration tests

use async_trait::async_trait;
use pipewright::backend::Backend;
use pipewright::core::context::{ControlClient, ExecutionSession, RegionalSession, RuntimeClient};
use pipewright::core::{
    BackendError, ExecutionHandle, ExecutionStatus, PipelineDefinition, PipelineHandle,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct MockState {
    calls: Mutex<HashMap<&'static str, usize>>,
    default_role: Mutex<Option<String>>,
    statuses: Mutex<VecDeque<ExecutionStatus>>,
    session_error: Mutex<Option<String>>,
    client_error: Mutex<Option<String>>,
    create_error: Mutex<Option<String>>,
    start_error: Mutex<Option<String>>,
    registered: Mutex<Vec<(PipelineDefinition, String)>>,
    documents: Mutex<Vec<String>>,
}

/// Backend that records every call and replays scripted statuses
///
/// Clones share state, so a test can hand one clone to the orchestrator and
/// inspect the other afterwards.
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<MockState>,
}

impl MockBackend {
    /// Backend whose executions succeed on the first status check
    pub fn new() -> Self {
        Self::default()
            .with_default_role(Some("arn:default"))
            .with_statuses(vec![ExecutionStatus::Succeeded])
    }

    /// `None` makes the default role lookup fail
    pub fn with_default_role(self, role: Option<&str>) -> Self {
        *self.state.default_role.lock().unwrap() = role.map(str::to_string);
        self
    }

    /// Statuses returned by successive status checks; the last one repeats
    pub fn with_statuses(self, statuses: Vec<ExecutionStatus>) -> Self {
        *self.state.statuses.lock().unwrap() = statuses.into();
        self
    }

    /// Opening the regional session fails, as with missing credentials
    pub fn failing_session(self, message: &str) -> Self {
        *self.state.session_error.lock().unwrap() = Some(message.to_string());
        self
    }

    /// Creating either backend client fails
    pub fn failing_client(self, message: &str) -> Self {
        *self.state.client_error.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn rejecting_create(self, message: &str) -> Self {
        *self.state.create_error.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn failing_start(self, message: &str) -> Self {
        *self.state.start_error.lock().unwrap() = Some(message.to_string());
        self
    }

    /// Number of times a backend method was called
    pub fn calls(&self, method: &str) -> usize {
        self.state
            .calls
            .lock()
            .unwrap()
            .get(method)
            .copied()
            .unwrap_or(0)
    }

    /// Pipelines passed to `create_pipeline`, with the role used
    pub fn registered(&self) -> Vec<(PipelineDefinition, String)> {
        self.state.registered.lock().unwrap().clone()
    }

    /// Definition documents passed to `create_pipeline`
    pub fn documents(&self) -> Vec<String> {
        self.state.documents.lock().unwrap().clone()
    }

    fn client_error(&self) -> Result<(), BackendError> {
        match self.state.client_error.lock().unwrap().clone() {
            Some(message) => Err(BackendError::Api(message)),
            None => Ok(()),
        }
    }

    fn record(&self, method: &'static str) {
        *self.state.calls.lock().unwrap().entry(method).or_insert(0) += 1;
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn regional_session(&self, region: &str) -> Result<RegionalSession, BackendError> {
        self.record("regional_session");
        if let Some(message) = self.state.session_error.lock().unwrap().clone() {
            return Err(BackendError::Api(message));
        }
        Ok(RegionalSession {
            region: region.to_string(),
            session_id: "session-1".to_string(),
        })
    }

    async fn control_client(&self, session: &RegionalSession) -> Result<ControlClient, BackendError> {
        self.record("control_client");
        self.client_error()?;
        Ok(ControlClient {
            region: session.region.clone(),
            endpoint: "mock://control".to_string(),
        })
    }

    async fn runtime_client(&self, session: &RegionalSession) -> Result<RuntimeClient, BackendError> {
        self.record("runtime_client");
        self.client_error()?;
        Ok(RuntimeClient {
            region: session.region.clone(),
            endpoint: "mock://runtime".to_string(),
        })
    }

    async fn default_execution_role(&self, _session: &ExecutionSession) -> Result<String, BackendError> {
        self.record("default_execution_role");
        self.state
            .default_role
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| BackendError::NotFound("default execution role".to_string()))
    }

    async fn create_pipeline(
        &self,
        pipeline: &PipelineDefinition,
        document: &str,
        role_arn: &str,
    ) -> Result<PipelineHandle, BackendError> {
        self.record("create_pipeline");
        if let Some(message) = self.state.create_error.lock().unwrap().clone() {
            return Err(BackendError::Api(message));
        }
        self.state
            .registered
            .lock()
            .unwrap()
            .push((pipeline.clone(), role_arn.to_string()));
        self.state.documents.lock().unwrap().push(document.to_string());
        Ok(PipelineHandle {
            name: pipeline.name.clone(),
            arn: format!("mock:pipeline/{}", pipeline.name),
            role_arn: role_arn.to_string(),
        })
    }

    async fn start(&self, pipeline: &PipelineHandle) -> Result<ExecutionHandle, BackendError> {
        self.record("start");
        if let Some(message) = self.state.start_error.lock().unwrap().clone() {
            return Err(BackendError::Api(message));
        }
        Ok(ExecutionHandle {
            execution_id: format!("exec-{}", self.calls("start")),
            pipeline_name: pipeline.name.clone(),
            started_at: chrono::Utc::now(),
        })
    }

    async fn describe_execution(
        &self,
        _execution: &ExecutionHandle,
    ) -> Result<ExecutionStatus, BackendError> {
        self.record("describe_execution");
        let mut statuses = self.state.statuses.lock().unwrap();
        let status = if statuses.len() > 1 {
            statuses.pop_front()
        } else {
            statuses.front().cloned()
        };
        Ok(status.unwrap_or(ExecutionStatus::Executing))
    }
}
