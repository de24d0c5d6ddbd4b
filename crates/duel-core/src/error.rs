use thiserror::Error;

/// Error taxonomy shared by every service. All four kinds propagate to the
/// immediate caller untouched; retry policy is a caller decision.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed input. Recoverable by the caller correcting the request.
    #[error("{0}")]
    Validation(String),

    /// Unknown lobby/game id, or a handle that is not a participant.
    #[error("{0}")]
    NotFound(String),

    /// The operation is valid but the current state forbids it.
    #[error("{0}")]
    Conflict(String),

    /// The external generation/scoring capability failed. The game stays in
    /// its prior status; the caller may retry through the manual failsafe.
    #[error("{0}")]
    Generation(String),
}

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ServiceError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ServiceError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        ServiceError::Conflict(msg.into())
    }

    pub fn generation(msg: impl Into<String>) -> Self {
        ServiceError::Generation(msg.into())
    }
}
