use thiserror::Error;

/// Errors from repository operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepoError {
    #[error("feed error: {0}")]
    Feed(#[from] pico_feed::FeedError),

    #[error("store error: {0}")]
    Store(#[from] pico_store::StoreError),
}

pub type RepoResult<T> = Result<T, RepoError>;
