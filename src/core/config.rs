//! Shared configuration and YAML configuration loading

use crate::core::error::ConfigurationError;
use anyhow::Result;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::error;

/// Deployment stage a pipeline runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Run steps in-process, never contacting the remote backend
    Local,
    Dev,
    Qa,
    Prod,
}

impl Environment {
    pub fn is_local(&self) -> bool {
        matches!(self, Environment::Local)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Dev => "dev",
            Environment::Qa => "qa",
            Environment::Prod => "prod",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            "dev" => Ok(Environment::Dev),
            "qa" => Ok(Environment::Qa),
            "prod" => Ok(Environment::Prod),
            other => anyhow::bail!(
                "unknown environment '{}' (expected local, dev, qa or prod)",
                other
            ),
        }
    }
}

/// How long `run()` waits for an execution to reach a terminal status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitPolicy {
    /// Seconds between two status checks
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Number of status checks before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_max_attempts() -> u32 {
    120
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl WaitPolicy {
    pub fn new(poll_interval_secs: u64, max_attempts: u32) -> Self {
        Self {
            poll_interval_secs,
            max_attempts,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Upper bound on the time spent sleeping between polls
    pub fn max_wait(&self) -> Duration {
        self.poll_interval() * self.max_attempts.saturating_sub(1)
    }
}

/// Configuration shared by every step of a pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Project name, also used as the pipeline name
    pub project_name: String,

    /// Region the backend session is bound to
    pub region: String,

    /// Bucket used as the default artifact store
    pub project_bucket: String,

    /// Role to register and run the pipeline with; the backend's default
    /// execution role is used when absent
    #[serde(default)]
    pub role_arn: Option<String>,

    /// Stage this run targets
    pub environment: Environment,

    #[serde(default)]
    pub wait: WaitPolicy,
}

impl SharedConfig {
    pub fn new(
        project_name: impl Into<String>,
        region: impl Into<String>,
        project_bucket: impl Into<String>,
        environment: Environment,
    ) -> Self {
        Self {
            project_name: project_name.into(),
            region: region.into(),
            project_bucket: project_bucket.into(),
            role_arn: None,
            environment,
            wait: WaitPolicy::default(),
        }
    }

    pub fn with_role_arn(mut self, role_arn: impl Into<String>) -> Self {
        self.role_arn = Some(role_arn.into());
        self
    }

    pub fn with_wait_policy(mut self, wait: WaitPolicy) -> Self {
        self.wait = wait;
        self
    }

    /// The explicitly configured role, exactly as given; blank values count as absent
    pub fn explicit_role(&self) -> Option<&str> {
        self.role_arn
            .as_deref()
            .filter(|role| !role.trim().is_empty())
    }
}

fn pipeline_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9](-*[a-zA-Z0-9]){0,255}$").expect("pipeline name pattern is valid")
    })
}

/// Check that a name is accepted as a pipeline or step name by the backend
pub fn validate_resource_name(kind: &str, name: &str) -> Result<()> {
    if !pipeline_name_pattern().is_match(name) {
        anyhow::bail!(
            "{} '{}' must be 1-256 alphanumeric characters or hyphens, starting and ending with an alphanumeric character",
            kind,
            name
        );
    }
    Ok(())
}

/// A configuration type that can be loaded from a file and validated
pub trait Settings: DeserializeOwned {
    /// Check invariants serde cannot express
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

impl Settings for SharedConfig {
    fn validate(&self) -> Result<()> {
        validate_resource_name("project_name", &self.project_name)?;
        if self.region.trim().is_empty() {
            anyhow::bail!("region must not be empty");
        }
        if self.project_bucket.trim().is_empty() {
            anyhow::bail!("project_bucket must not be empty");
        }
        if self.wait.max_attempts == 0 {
            anyhow::bail!("wait.max_attempts must be at least 1");
        }
        Ok(())
    }
}

fn config_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Load and validate a configuration object from a YAML file
///
/// A missing file is logged before the error is returned, so the cause is
/// visible even when the caller only reports a generic failure.
pub fn load_config<T: Settings>(path: impl AsRef<Path>) -> Result<T, ConfigurationError> {
    let path = path.as_ref();
    let config_type = config_type_name::<T>();

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            error!(
                "Failed to load {} because the following file does not exist: {}",
                config_type,
                path.display()
            );
            return Err(ConfigurationError::Missing {
                path: path.to_path_buf(),
                source: e,
            });
        }
        Err(e) => {
            return Err(ConfigurationError::Io {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    parse_config(&content, Some(path))
}

/// Parse and validate a configuration object from a YAML string
pub fn from_yaml_str<T: Settings>(yaml: &str) -> Result<T, ConfigurationError> {
    parse_config(yaml, None)
}

fn parse_config<T: Settings>(yaml: &str, path: Option<&Path>) -> Result<T, ConfigurationError> {
    let config_type = config_type_name::<T>();
    let invalid = |message: String| ConfigurationError::Invalid {
        config_type,
        path: path.map(Path::to_path_buf),
        message,
    };

    let config: T = serde_yaml::from_str(yaml).map_err(|e| invalid(e.to_string()))?;
    config.validate().map_err(|e| invalid(format!("{:#}", e)))?;
    Ok(config)
}
