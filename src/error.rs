use thiserror::Error;

pub type Result<T> = std::result::Result<T, BanditError>;

/// Errors surfaced by experiments, exporters and prompt helpers.
#[derive(Debug, Error)]
pub enum BanditError {
    /// Invalid input: no arms, zero rounds, out-of-range rates, bad keywords.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// Operation not valid in the current experiment state.
    #[error("invalid state: {0}")]
    State(String),

    /// The external completion collaborator failed.
    #[error("completion failed: {0}")]
    Completion(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "serde")]
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BanditError {
    pub(crate) fn precondition(msg: impl Into<String>) -> Self {
        BanditError::Precondition(msg.into())
    }

    pub(crate) fn state(msg: impl Into<String>) -> Self {
        BanditError::State(msg.into())
    }
}
