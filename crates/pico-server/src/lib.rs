//! HTTP surface for the pico silo.
//!
//! Four routes over an [`pico_silo::Silo`]: publish (`POST /:key`), fetch
//! (`GET /:key`, raw feed or rendered HTML by content negotiation), stat
//! (`GET /stat/:key`), and listing (`GET /`). The only route that can write
//! is publish, and it runs every body through bounded ingestion before any
//! decoding happens: declared length checked against a hard ceiling, bytes
//! streamed into a pre-sized buffer, overflow/underflow rejected, the whole
//! read under a timeout.

pub mod config;
pub mod error;
pub mod handlers;
pub mod ingest;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handlers::{AppState, ListingRow, FEED_CONTENT_TYPE};
pub use router::build_router;
pub use server::SiloServer;
