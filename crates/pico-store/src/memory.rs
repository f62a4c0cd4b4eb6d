use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::StoreResult;
use crate::traits::KvStore;

/// In-memory, BTreeMap-based store.
///
/// Intended for tests and ephemeral servers. The BTreeMap keeps keys
/// ordered so `scan_prefix` matches what a disk-backed ordered store would
/// yield. Values are cloned on read.
pub struct MemoryKv {
    inner: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryKv {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of entries currently stored, across all namespaces.
    pub fn len(&self) -> usize {
        self.inner.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().expect("lock poisoned").is_empty()
    }
}

impl Default for MemoryKv {
    fn default() -> Self {
        Self::new()
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        let map = self.inner.read().expect("lock poisoned");
        Ok(map.get(key).cloned())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        let mut map = self.inner.write().expect("lock poisoned");
        map.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> StoreResult<bool> {
        let mut map = self.inner.write().expect("lock poisoned");
        Ok(map.remove(key).is_some())
    }

    fn scan_prefix(&self, prefix: &[u8]) -> StoreResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let map = self.inner.read().expect("lock poisoned");
        Ok(map
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

impl std::fmt::Debug for MemoryKv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryKv").field("entries", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_roundtrip() {
        let kv = MemoryKv::new();
        kv.put(b"a", b"1").unwrap();
        assert_eq!(kv.get(b"a").unwrap(), Some(b"1".to_vec()));
    }

    #[test]
    fn missing_key_is_none() {
        let kv = MemoryKv::new();
        assert_eq!(kv.get(b"ghost").unwrap(), None);
    }

    #[test]
    fn put_overwrites() {
        let kv = MemoryKv::new();
        kv.put(b"a", b"1").unwrap();
        kv.put(b"a", b"2").unwrap();
        assert_eq!(kv.get(b"a").unwrap(), Some(b"2".to_vec()));
        assert_eq!(kv.len(), 1);
    }

    #[test]
    fn delete_reports_existence() {
        let kv = MemoryKv::new();
        kv.put(b"a", b"1").unwrap();
        assert!(kv.delete(b"a").unwrap());
        assert!(!kv.delete(b"a").unwrap());
        assert_eq!(kv.get(b"a").unwrap(), None);
    }

    #[test]
    fn scan_prefix_is_ordered_and_bounded() {
        let kv = MemoryKv::new();
        kv.put(b"x/b", b"2").unwrap();
        kv.put(b"x/a", b"1").unwrap();
        kv.put(b"y/a", b"3").unwrap();
        let entries = kv.scan_prefix(b"x/").unwrap();
        assert_eq!(
            entries,
            vec![
                (b"x/a".to_vec(), b"1".to_vec()),
                (b"x/b".to_vec(), b"2".to_vec()),
            ]
        );
    }

    #[test]
    fn scan_empty_prefix_returns_everything() {
        let kv = MemoryKv::new();
        kv.put(b"a", b"1").unwrap();
        kv.put(b"b", b"2").unwrap();
        assert_eq!(kv.scan_prefix(b"").unwrap().len(), 2);
    }

    #[test]
    fn concurrent_readers_are_safe() {
        use std::sync::Arc;
        use std::thread;

        let kv = Arc::new(MemoryKv::new());
        kv.put(b"shared", b"value").unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let kv = Arc::clone(&kv);
                thread::spawn(move || {
                    assert_eq!(kv.get(b"shared").unwrap(), Some(b"value".to_vec()));
                })
            })
            .collect();
        for h in handles {
            h.join().expect("thread should not panic");
        }
    }
}
