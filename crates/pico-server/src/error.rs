use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    /// More body bytes arrived than `Content-Length` declared.
    #[error("buffer overflow: declared {declared}, received {received}")]
    BufferOverflow { declared: usize, received: usize },

    /// The body ended before the declared `Content-Length` was reached.
    #[error("buffer underflow: declared {declared}, received {received}")]
    BufferUnderflow { declared: usize, received: usize },

    #[error("content-length required")]
    LengthRequired,

    #[error("bad content-length: {0:?}")]
    BadLength(String),

    #[error("payload too large: {size} bytes, limit {max}")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("body read timed out")]
    Timeout,

    #[error("unsupported content type: {0:?}")]
    UnsupportedMediaType(String),

    /// The `:key` path segment is not a hex-encoded public key.
    #[error("bad key: {0:?}")]
    BadKey(String),

    /// The `:key` path segment does not match the submitted block's signer.
    #[error("verification failed")]
    KeyMismatch,

    #[error("empty feed")]
    EmptyFeed,

    #[error("not-modified")]
    NotModified,

    #[error("not found")]
    NotFound,

    #[error("feed error: {0}")]
    Feed(#[from] pico_feed::FeedError),

    #[error("wire error: {0}")]
    Wire(#[from] pico_wire::WireError),

    #[error("silo error: {0}")]
    Silo(#[from] pico_silo::SiloError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    fn status(&self) -> StatusCode {
        use pico_silo::SiloError;
        match self {
            Self::BufferOverflow { .. }
            | Self::BufferUnderflow { .. }
            | Self::BadLength(_)
            | Self::BadKey(_)
            | Self::EmptyFeed
            | Self::Feed(_)
            | Self::Wire(_) => StatusCode::BAD_REQUEST,
            Self::LengthRequired => StatusCode::LENGTH_REQUIRED,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::KeyMismatch => StatusCode::UNAUTHORIZED,
            Self::NotModified => StatusCode::NOT_MODIFIED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Silo(err) => match err {
                SiloError::UnsupportedRunlevel(_)
                | SiloError::SiteFromFuture { .. }
                | SiloError::Wire(_)
                | SiloError::Repo(_) => StatusCode::BAD_REQUEST,
                SiloError::Store(_) | SiloError::CorruptIndex(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Server-side faults are logged in full but leave as a generic line.
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "internal error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
