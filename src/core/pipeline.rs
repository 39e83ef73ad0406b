//! Pipeline definition submitted to the backend

use crate::core::{context::ExecutionSession, step::Step};
use serde::Serialize;

/// Version tag of the definition document format
pub const DEFINITION_VERSION: &str = "2020-12-01";

/// A named, ordered collection of steps bound to an execution session
#[derive(Debug, Clone)]
pub struct PipelineDefinition {
    /// Pipeline name
    pub name: String,

    /// Steps in submission order
    pub steps: Vec<Step>,

    /// Session the pipeline is registered and executed through
    pub session: ExecutionSession,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct DefinitionDocument<'a> {
    version: &'static str,
    metadata: serde_json::Map<String, serde_json::Value>,
    parameters: Vec<serde_json::Value>,
    steps: &'a [Step],
}

impl PipelineDefinition {
    pub fn new(name: impl Into<String>, steps: Vec<Step>, session: ExecutionSession) -> Self {
        Self {
            name: name.into(),
            steps,
            session,
        }
    }

    /// Step names in submission order
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }

    /// Render the definition document the backend registers
    pub fn definition(&self) -> serde_json::Result<String> {
        serde_json::to_string(&DefinitionDocument {
            version: DEFINITION_VERSION,
            metadata: serde_json::Map::new(),
            parameters: Vec::new(),
            steps: &self.steps,
        })
    }
}
