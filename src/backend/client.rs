//! Local backend configuration

use std::path::PathBuf;

/// Configuration for [`LocalBackend`](super::LocalBackend)
#[derive(Debug, Clone)]
pub struct LocalBackendConfig {
    /// Role reported as the default execution role
    pub execution_role: String,

    /// Timeout for a single step command in seconds
    pub step_timeout_secs: u64,

    /// Working directory for step commands (defaults to the current directory)
    pub working_dir: Option<PathBuf>,
}

impl Default for LocalBackendConfig {
    fn default() -> Self {
        Self {
            execution_role: "local-execution-role".to_string(),
            step_timeout_secs: 10800,
            working_dir: None,
        }
    }
}

impl LocalBackendConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_execution_role(mut self, role: impl Into<String>) -> Self {
        self.execution_role = role.into();
        self
    }

    pub fn with_step_timeout(mut self, timeout_secs: u64) -> Self {
        self.step_timeout_secs = timeout_secs;
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}
