//! Per-signer feed repository.
//!
//! Stores one feed head per public key inside a [`Sublevel`] of the shared
//! key-value store. The contract is append-or-reject: [`Repo::merge`] only
//! changes state when the incoming feed is new material that chains onto
//! what is already stored, and reports whether anything changed. History
//! for a key is discarded wholesale via [`Repo::rollback`].

pub mod error;
pub mod repo;

pub use error::{RepoError, RepoResult};
pub use repo::{Head, Repo};
