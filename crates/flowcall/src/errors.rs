use thiserror::Error;

/// Failures of the remote call itself, in either mode
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Workflow call failed ({status}): {message}")]
    Remote { status: String, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// A structurally valid response that broke the response contract
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolViolation {
    #[error("Response contained no choices")]
    EmptyChoices,
}

/// A single streamed frame that was not valid JSON. Never surfaced to stream consumers.
#[derive(Error, Debug)]
#[error("Invalid JSON frame: {frame}")]
pub struct FrameParseError {
    pub frame: String,
    #[source]
    pub source: serde_json::Error,
}

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Could not read file '{name}': {source}")]
    FileRead {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Protocol violation: {0}")]
    Protocol(#[from] ProtocolViolation),
}

impl WorkflowError {
    pub fn file_read(name: impl Into<String>, source: std::io::Error) -> Self {
        WorkflowError::FileRead {
            name: name.into(),
            source,
        }
    }

    /// True when the failure happened before anything was sent to the remote endpoint
    pub fn is_local(&self) -> bool {
        matches!(self, WorkflowError::FileRead { .. })
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
