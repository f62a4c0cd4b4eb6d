use thiserror::Error;

/// Errors from feed construction, verification, and framing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeedError {
    #[error("feed buffer truncated")]
    Truncated,

    #[error("bad feed magic")]
    BadMagic,

    #[error("feed too large: {size} bytes exceeds maximum {max}")]
    TooLarge { size: usize, max: usize },

    #[error("invalid public key")]
    InvalidKey,

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("bad signature at block {index}")]
    BadSignature { index: usize },

    #[error("broken chain at block {index}: prev does not match previous signature")]
    BrokenChain { index: usize },
}

pub type FeedResult<T> = Result<T, FeedError>;
