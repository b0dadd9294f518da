use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormPilotError {
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("session not found: {id}")]
    SessionNotFound { id: String },

    #[error("schema not found: {filename}")]
    SchemaNotFound { filename: String },

    #[error("form definition error: {0}")]
    FormDefinition(String),

    #[error("LLM provider error: {0}")]
    LlmProvider(String),

    #[error("LLM call timed out after {secs}s")]
    LlmTimeout { secs: u64 },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl FormPilotError {
    /// Short error code string sent to clients in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            FormPilotError::MalformedRequest(_) => "MALFORMED_REQUEST",
            FormPilotError::InvalidBody(_) => "INVALID_BODY",
            FormPilotError::SessionNotFound { .. } => "SESSION_NOT_FOUND",
            FormPilotError::SchemaNotFound { .. } => "SCHEMA_NOT_FOUND",
            FormPilotError::FormDefinition(_) => "FORM_DEFINITION_ERROR",
            FormPilotError::LlmProvider(_) => "LLM_PROVIDER_ERROR",
            FormPilotError::LlmTimeout { .. } => "LLM_TIMEOUT",
            FormPilotError::Config(_) => "CONFIG_ERROR",
            FormPilotError::Serialization(_) => "SERIALIZATION_ERROR",
            FormPilotError::Io(_) => "IO_ERROR",
            FormPilotError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status code this error maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            FormPilotError::MalformedRequest(_) => 400,
            FormPilotError::SessionNotFound { .. } | FormPilotError::SchemaNotFound { .. } => 404,
            FormPilotError::InvalidBody(_) | FormPilotError::FormDefinition(_) => 422,
            FormPilotError::LlmProvider(_) | FormPilotError::LlmTimeout { .. } => 500,
            FormPilotError::Config(_) | FormPilotError::Serialization(_) | FormPilotError::Io(_) | FormPilotError::Internal(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, FormPilotError>;
