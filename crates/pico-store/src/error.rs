use thiserror::Error;

/// Errors from storage backends.
///
/// Lookups of absent keys are not errors; they return `Ok(None)`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
