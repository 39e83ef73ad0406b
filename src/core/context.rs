//! Connection context - lazily derived, cached backend connectivity
//!
//! Everything needed to reach the backend is derived on first use and kept
//! for the rest of the run. One context belongs to one orchestration run.

use crate::backend::Backend;
use crate::core::{config::SharedConfig, error::ConnectivityError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Credentials and region binding for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionalSession {
    pub region: String,
    pub session_id: String,
}

/// Client for pipeline registration and management
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlClient {
    pub region: String,
    pub endpoint: String,
}

/// Client for execution-time interactions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeClient {
    pub region: String,
    pub endpoint: String,
}

/// In-process session: steps run locally, the remote backend is never contacted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSession;

/// Session wired to the remote backend clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSession {
    pub regional: RegionalSession,
    pub control: ControlClient,
    pub runtime: RuntimeClient,

    /// Default artifact store
    pub default_bucket: String,
}

/// The session a pipeline is bound to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionSession {
    Local(LocalSession),
    Remote(RemoteSession),
}

impl ExecutionSession {
    pub fn is_local(&self) -> bool {
        matches!(self, ExecutionSession::Local(_))
    }
}

/// Memoized connectivity for one orchestration run
pub struct ConnectionContext<B> {
    backend: Arc<B>,
    config: SharedConfig,
    regional_session: OnceCell<RegionalSession>,
    control_client: OnceCell<ControlClient>,
    runtime_client: OnceCell<RuntimeClient>,
    execution_session: OnceCell<ExecutionSession>,
    resolved_role: OnceCell<String>,
}

impl<B: Backend> ConnectionContext<B> {
    pub fn new(backend: Arc<B>, config: SharedConfig) -> Self {
        Self {
            backend,
            config,
            regional_session: OnceCell::new(),
            control_client: OnceCell::new(),
            runtime_client: OnceCell::new(),
            execution_session: OnceCell::new(),
            resolved_role: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    /// Session bound to the configured region
    pub async fn regional_session(&self) -> Result<&RegionalSession, ConnectivityError> {
        self.regional_session
            .get_or_try_init(|| self.open_regional_session())
            .await
    }

    /// Client for pipeline registration and management
    pub async fn control_client(&self) -> Result<&ControlClient, ConnectivityError> {
        self.control_client
            .get_or_try_init(|| self.create_control_client())
            .await
    }

    /// Client for execution-time interactions
    pub async fn runtime_client(&self) -> Result<&RuntimeClient, ConnectivityError> {
        self.runtime_client
            .get_or_try_init(|| self.create_runtime_client())
            .await
    }

    /// Session the pipeline is bound to, selected by environment
    ///
    /// `local` never touches the regional session or the clients.
    pub async fn execution_session(&self) -> Result<&ExecutionSession, ConnectivityError> {
        self.execution_session
            .get_or_try_init(|| self.create_execution_session())
            .await
    }

    /// Role used to register and run the pipeline
    ///
    /// The explicit role wins; otherwise the backend's default execution
    /// role for the execution session is looked up once.
    pub async fn resolved_role(&self) -> Result<&str, ConnectivityError> {
        let role = self
            .resolved_role
            .get_or_try_init(|| self.resolve_role())
            .await?;
        Ok(role.as_str())
    }

    async fn open_regional_session(&self) -> Result<RegionalSession, ConnectivityError> {
        debug!("Opening session for region {}", self.config.region);
        self.backend
            .regional_session(&self.config.region)
            .await
            .map_err(|source| ConnectivityError::Session {
                region: self.config.region.clone(),
                source,
            })
    }

    async fn create_control_client(&self) -> Result<ControlClient, ConnectivityError> {
        let session = self.regional_session().await?;
        debug!("Creating control client");
        self.backend
            .control_client(session)
            .await
            .map_err(|source| ConnectivityError::Client {
                service: "control",
                source,
            })
    }

    async fn create_runtime_client(&self) -> Result<RuntimeClient, ConnectivityError> {
        let session = self.regional_session().await?;
        debug!("Creating runtime client");
        self.backend
            .runtime_client(session)
            .await
            .map_err(|source| ConnectivityError::Client {
                service: "runtime",
                source,
            })
    }

    async fn create_execution_session(&self) -> Result<ExecutionSession, ConnectivityError> {
        if self.config.environment.is_local() {
            debug!("Using in-process execution session");
            return Ok(ExecutionSession::Local(LocalSession));
        }

        let regional = self.regional_session().await?.clone();
        let control = self.control_client().await?.clone();
        let runtime = self.runtime_client().await?.clone();
        debug!(
            "Using remote execution session ({}) with bucket {}",
            self.config.environment, self.config.project_bucket
        );
        Ok(ExecutionSession::Remote(RemoteSession {
            regional,
            control,
            runtime,
            default_bucket: self.config.project_bucket.clone(),
        }))
    }

    async fn resolve_role(&self) -> Result<String, ConnectivityError> {
        if let Some(role) = self.config.explicit_role() {
            return Ok(role.to_string());
        }

        let session = self.execution_session().await?;
        let role = self
            .backend
            .default_execution_role(session)
            .await
            .map_err(ConnectivityError::RoleResolution)?;
        info!("No role configured, using default execution role {}", role);
        Ok(role)
    }
}
