use std::path::PathBuf;

use thiserror::Error;

use crate::model::AddressDescriptor;

/// Every way a pipeline run can fail. All variants are fatal; the run aborts at the first one.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required tool or resource location is missing. Raised before any stage runs.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The image does not contain exactly one code section.
    #[error("Expected exactly one code section, found {matches}")]
    SectionResolution { matches: usize },

    /// The input file could not be parsed as a PE image.
    #[error("Failed to parse executable image: {0}")]
    Image(String),

    /// An external tool failed to start or exited unsuccessfully.
    #[error("{tool} failed ({status})")]
    ExternalTool { tool: String, status: String, log: String },

    /// A line of an interchange file could not be parsed.
    #[error("Malformed line {line} in {}: {content:?}", path.display())]
    MalformedIntermediateFile { path: PathBuf, line: usize, content: String },

    /// Two debug symbols share one address descriptor under the `reject` policy.
    #[error("Symbols '{kept}' and '{rejected}' share address descriptor {descriptor}")]
    NameCollision { descriptor: AddressDescriptor, kept: String, rejected: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        PipelineError::Io { context: context.into(), source }
    }

    /// Captured tool output, if this error came from an external tool.
    pub fn tool_log(&self) -> Option<(&str, &str)> {
        match self {
            PipelineError::ExternalTool { tool, log, .. } => Some((tool.as_str(), log.as_str())),
            _ => None,
        }
    }
}

/// Pipeline error tagged with the stage it aborted.
#[derive(Debug, Error)]
#[error("{stage} failed: {error}")]
pub struct StageFailure {
    pub stage: crate::services::pipeline::Stage,
    #[source]
    pub error: PipelineError,
}

impl StageFailure {
    pub fn state(&self) -> crate::services::pipeline::PipelineState {
        crate::services::pipeline::PipelineState::Failed(self.stage)
    }
}
