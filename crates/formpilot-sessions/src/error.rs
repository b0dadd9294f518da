use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not found: {id}")]
    NotFound { id: String },

    #[error("session id already in use: {id}")]
    AlreadyExists { id: String },
}

pub type Result<T> = std::result::Result<T, SessionError>;
