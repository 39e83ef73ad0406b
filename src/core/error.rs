//! Error types for configuration, assembly, connectivity, registration and execution

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by a backend implementation
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration could not be loaded
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// The configuration source does not exist on disk
    #[error("configuration file does not exist: {}", path.display())]
    Missing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read configuration file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source was readable but malformed or failed validation
    #[error("invalid {config_type} configuration{}: {message}", source_suffix(.path))]
    Invalid {
        config_type: &'static str,
        path: Option<PathBuf>,
        message: String,
    },
}

fn source_suffix(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" in {}", p.display()))
        .unwrap_or_default()
}

/// A step factory failed to produce a step
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("step factory '{factory}' (building block {index}) failed: {source}")]
    Factory {
        index: usize,
        factory: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("duplicate step name '{name}' produced by building block {index}")]
    DuplicateStep { index: usize, name: String },
}

/// Session, client or role derivation failed
#[derive(Debug, Error)]
pub enum ConnectivityError {
    #[error("failed to open a session for region '{region}': {source}")]
    Session {
        region: String,
        #[source]
        source: BackendError,
    },

    #[error("failed to create {service} client: {source}")]
    Client {
        service: &'static str,
        #[source]
        source: BackendError,
    },

    #[error("no role configured and no default execution role available: {0}")]
    RoleResolution(#[source] BackendError),
}

/// The backend refused to create the pipeline
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("backend rejected pipeline '{name}': {source}")]
    Rejected {
        name: String,
        #[source]
        source: BackendError,
    },

    #[error("failed to render definition of pipeline '{name}': {source}")]
    Definition {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A started execution did not succeed
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("failed to start pipeline '{name}': {source}")]
    Start {
        name: String,
        #[source]
        source: BackendError,
    },

    #[error("failed to poll execution {execution_id}: {source}")]
    Poll {
        execution_id: String,
        #[source]
        source: BackendError,
    },

    #[error("execution {execution_id} failed: {reason}")]
    Failed { execution_id: String, reason: String },

    #[error("execution {execution_id} was stopped")]
    Stopped { execution_id: String },

    #[error("execution {execution_id} did not finish after {attempts} status checks")]
    WaitExhausted { execution_id: String, attempts: u32 },

    #[error("stopped waiting for execution {execution_id}")]
    Cancelled { execution_id: String },
}

/// Any failure surfaced by the orchestrator
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error(transparent)]
    Connectivity(#[from] ConnectivityError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}
