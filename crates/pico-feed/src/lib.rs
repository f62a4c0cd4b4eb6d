//! Signed append-only feed log for pico web apps.
//!
//! A feed is a sequence of blocks signed by a single ed25519 identity, each
//! block chained to the previous one by signature. The signer's public key
//! doubles as the feed's permanent identity: it never changes across
//! versions of the document carried in the blocks.
//!
//! # Key Types
//!
//! - [`SecretKey`] / [`PublicKey`] / [`Signature`] — ed25519 material
//! - [`Block`] — one signed unit of opaque body bytes
//! - [`Feed`] — the chained sequence, with bounded encode/decode

pub mod error;
pub mod feed;
pub mod keys;

pub use error::{FeedError, FeedResult};
pub use feed::{Block, Feed, MAX_FEED_SIZE};
pub use keys::{PublicKey, SecretKey, Signature};
