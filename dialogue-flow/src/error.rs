use thiserror::Error;

/// Errors produced by the flow engine
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Step index out of range: {0}")]
    StepOutOfRange(usize),

    #[error("Input required: {0}")]
    InputRequired(String),

    #[error("Generation already pending: {0}")]
    OperationPending(String),

    #[error("Step does not accept a file upload: {0}")]
    UnexpectedUpload(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

pub type Result<T> = std::result::Result<T, FlowError>;
