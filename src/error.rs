use crate::model::VersionStatus;
use thiserror::Error;

pub type DocResult<T> = Result<T, DocError>;

/// Errors surfaced by the documentation engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DocError {
    /// Requested project, version or endpoint does not exist
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    /// The record store failed for a transport or storage reason
    #[error("Record store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Cannot move version from '{from}' to '{to}'")]
    InvalidTransition { from: VersionStatus, to: VersionStatus },

    #[error("Unsupported example language: {0}")]
    UnsupportedLanguage(String),

    /// A uniqueness constraint of the store was violated
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    Validation(String),
}

impl DocError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        DocError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Classify a store error, keeping domain errors raised inside the store intact
    pub fn from_store(err: anyhow::Error) -> Self {
        match err.downcast_ref::<DocError>() {
            Some(doc_error) => doc_error.clone(),
            None => DocError::StoreUnavailable(format!("{:#}", err)),
        }
    }
}
