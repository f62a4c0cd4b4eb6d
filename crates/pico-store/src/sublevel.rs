use std::sync::Arc;

use crate::error::StoreResult;
use crate::traits::KvStore;

/// A named namespace over a shared [`KvStore`].
///
/// Keys are laid out as `!<name>!<key>`, the sublevel convention of the
/// levelup family of stores. Two sublevels with different names can never
/// observe each other's entries; scans strip the prefix back off.
#[derive(Clone)]
pub struct Sublevel {
    store: Arc<dyn KvStore>,
    prefix: Vec<u8>,
}

impl Sublevel {
    /// Open the namespace `name` on `store`.
    pub fn new(store: Arc<dyn KvStore>, name: &str) -> Self {
        let mut prefix = Vec::with_capacity(name.len() + 2);
        prefix.push(b'!');
        prefix.extend_from_slice(name.as_bytes());
        prefix.push(b'!');
        Self { store, prefix }
    }

    fn full_key(&self, key: &[u8]) -> Vec<u8> {
        let mut full = Vec::with_capacity(self.prefix.len() + key.len());
        full.extend_from_slice(&self.prefix);
        full.extend_from_slice(key);
        full
    }

    pub fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        self.store.get(&self.full_key(key))
    }

    pub fn put(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        self.store.put(&self.full_key(key), value)
    }

    pub fn delete(&self, key: &[u8]) -> StoreResult<bool> {
        self.store.delete(&self.full_key(key))
    }

    /// All entries in this namespace, keys returned without the prefix.
    pub fn entries(&self) -> StoreResult<Vec<(Vec<u8>, Vec<u8>)>> {
        Ok(self
            .store
            .scan_prefix(&self.prefix)?
            .into_iter()
            .map(|(k, v)| (k[self.prefix.len()..].to_vec(), v))
            .collect())
    }
}

impl std::fmt::Debug for Sublevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sublevel")
            .field("prefix", &String::from_utf8_lossy(&self.prefix))
            .finish()
    }
}
