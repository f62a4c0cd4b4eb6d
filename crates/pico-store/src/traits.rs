use crate::error::StoreResult;

/// Ordered key-value store over raw bytes.
///
/// All implementations must satisfy these invariants:
/// - A lookup of an absent key returns `Ok(None)`, never an error.
/// - `scan_prefix` yields entries in ascending key order.
/// - Reads and writes of a single key are atomic; the store does not
///   provide transactions across keys.
/// - I/O failures are propagated, never silently ignored.
pub trait KvStore: Send + Sync {
    /// Read the value stored at `key`.
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    /// Write `value` at `key`, replacing any existing value.
    fn put(&self, key: &[u8], value: &[u8]) -> StoreResult<()>;

    /// Delete the value at `key`. Returns `true` if one existed.
    fn delete(&self, key: &[u8]) -> StoreResult<bool>;

    /// All entries whose key starts with `prefix`, in key order.
    fn scan_prefix(&self, prefix: &[u8]) -> StoreResult<Vec<(Vec<u8>, Vec<u8>)>>;
}
