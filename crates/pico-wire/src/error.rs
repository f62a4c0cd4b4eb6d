use thiserror::Error;

/// Errors from wire parsing, packing, and unpacking.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    /// The document-type tag is missing or not one this system understands.
    #[error("unsupported format: {0:?}")]
    UnsupportedFormat(String),

    /// The input is not a signed block (e.g. an empty feed).
    #[error("not a block")]
    NotABlock,

    /// A header line is not valid UTF-8.
    #[error("header block is not valid UTF-8")]
    HeaderEncoding,

    /// A header value contains a newline; the grammar has no escaping.
    #[error("header value for {0:?} contains a newline")]
    HeaderValue(String),

    /// The `date` header is not an integer epoch-milliseconds value.
    #[error("bad date header: {0:?}")]
    BadDate(String),

    /// No secret key available to sign with, embedded or passed.
    #[error("no signing secret available")]
    NoSecret,

    #[error("feed error: {0}")]
    Feed(#[from] pico_feed::FeedError),
}

pub type WireResult<T> = Result<T, WireError>;
