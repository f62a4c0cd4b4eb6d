use thiserror::Error;

/// Errors from silo operations.
///
/// A stale or duplicate submission is not an error; `put` reports it as
/// `Ok(false)`. These variants cover structural and temporal rejections
/// that callers must surface, never retry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SiloError {
    /// The site's runlevel is not the one this silo serves (0).
    #[error("unsupported runlevel: {0}")]
    UnsupportedRunlevel(u8),

    /// The site's embedded date is further ahead of the clock than the
    /// allowed skew.
    #[error("site from future: dated {date}, now {now}")]
    SiteFromFuture { date: i64, now: i64 },

    #[error(transparent)]
    Wire(#[from] pico_wire::WireError),

    #[error(transparent)]
    Repo(#[from] pico_repo::RepoError),

    #[error("store error: {0}")]
    Store(#[from] pico_store::StoreError),

    #[error("corrupt index entry: {0}")]
    CorruptIndex(String),
}

pub type SiloResult<T> = Result<T, SiloError>;
