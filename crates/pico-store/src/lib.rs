//! Ordered key-value storage for the silo.
//!
//! The [`KvStore`] trait is the seam a persistent backend plugs into; the
//! in-memory [`MemoryKv`] backend serves tests and ephemeral servers.
//! [`Sublevel`] carves independent namespaces out of one store, so the
//! repository, metadata index, and hit counter never collide.
//!
//! A missing key is `Ok(None)` everywhere, never an error.

pub mod error;
pub mod memory;
pub mod sublevel;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryKv;
pub use sublevel::Sublevel;
pub use traits::KvStore;
