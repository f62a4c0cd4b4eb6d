use std::time::Duration;

use axum::body::Body;
use futures::StreamExt;

use crate::error::{ServerError, ServerResult};

/// Read a request body into a buffer bounded by its declared length.
///
/// The buffer is sized from `declared` only after `declared` has been
/// checked against the hard ceiling, so a hostile `Content-Length` cannot
/// drive allocation. The byte count must then land exactly on `declared`:
/// extra bytes are an overflow, a short stream is an underflow. The whole
/// read runs under `timeout` to bound slow-body clients.
pub async fn read_bounded(
    body: Body,
    declared: usize,
    max: usize,
    timeout: Duration,
) -> ServerResult<Vec<u8>> {
    if declared > max {
        return Err(ServerError::PayloadTooLarge {
            size: declared,
            max,
        });
    }
    match tokio::time::timeout(timeout, fill(body, declared)).await {
        Ok(result) => result,
        Err(_) => Err(ServerError::Timeout),
    }
}

async fn fill(body: Body, declared: usize) -> ServerResult<Vec<u8>> {
    let mut buf = Vec::with_capacity(declared);
    let mut stream = body.into_data_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ServerError::Internal(e.to_string()))?;
        let received = buf.len() + chunk.len();
        if received > declared {
            return Err(ServerError::BufferOverflow { declared, received });
        }
        buf.extend_from_slice(&chunk);
    }
    if buf.len() < declared {
        return Err(ServerError::BufferUnderflow {
            declared,
            received: buf.len(),
        });
    }
    Ok(buf)
}
