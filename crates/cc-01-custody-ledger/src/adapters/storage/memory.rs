use crate::domain::errors::{BatchWriteError, KVStoreError};
use crate::ports::outbound::{KeyValueStore, ScanResult, WriteOp};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// In-memory key-value store.
///
/// Keys are kept ordered so prefix scans come back in key order. A batch is
/// applied under one write lock, so readers never observe half of it.
#[derive(Default)]
pub struct InMemoryKVStore {
    data: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl InMemoryKVStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Copy of every pair, in key order. Used to compare store states.
    pub fn snapshot(&self) -> BTreeMap<Vec<u8>, Vec<u8>> {
        self.data.read().clone()
    }
}

/// Ordered scan over a `BTreeMap`, shared with the file-backed store.
pub(crate) fn scan_ordered(data: &BTreeMap<Vec<u8>, Vec<u8>>, prefix: &[u8]) -> ScanResult {
    data.range(prefix.to_vec()..)
        .take_while(|(k, _)| k.starts_with(prefix))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Apply a write plan to a map. Infallible for in-memory maps.
pub(crate) fn apply_to_map(data: &mut BTreeMap<Vec<u8>, Vec<u8>>, operations: Vec<WriteOp>) {
    for op in operations {
        match op {
            WriteOp::Put { key, value } => {
                data.insert(key, value);
            }
            WriteOp::Delete { key } => {
                data.remove(&key);
            }
        }
    }
}

impl KeyValueStore for InMemoryKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.read().get(key).cloned())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.data.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), KVStoreError> {
        self.data.write().remove(key);
        Ok(())
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.data.read().contains_key(key))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError> {
        Ok(scan_ordered(&self.data.read(), prefix))
    }

    fn apply_batch(&self, operations: Vec<WriteOp>) -> Result<(), BatchWriteError> {
        apply_to_map(&mut self.data.write(), operations);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_kv_store() {
        let store = InMemoryKVStore::new();

        store.put(b"key1", b"value1").unwrap();
        store.put(b"key2", b"value2").unwrap();

        assert_eq!(store.get(b"key1").unwrap(), Some(b"value1".to_vec()));
        assert_eq!(store.get(b"key2").unwrap(), Some(b"value2".to_vec()));
        assert_eq!(store.get(b"key3").unwrap(), None);

        assert!(store.exists(b"key1").unwrap());
        store.delete(b"key1").unwrap();
        assert!(!store.exists(b"key1").unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_prefix_scan_is_ordered_and_bounded() {
        let store = InMemoryKVStore::new();
        store.put(b"lot:L2", b"2").unwrap();
        store.put(b"lot:L1", b"1").unwrap();
        store.put(b"lot:L10", b"10").unwrap();
        store.put(b"lou", b"x").unwrap();
        store.put(b"agent:collector:R1", b"r").unwrap();

        let keys: Vec<_> = store
            .prefix_scan(b"lot:")
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();

        assert_eq!(
            keys,
            vec![b"lot:L1".to_vec(), b"lot:L10".to_vec(), b"lot:L2".to_vec()]
        );
    }

    #[test]
    fn test_empty_prefix_scans_everything() {
        let store = InMemoryKVStore::new();
        store.put(b"a", b"1").unwrap();
        store.put(b"b", b"2").unwrap();
        assert_eq!(store.prefix_scan(b"").unwrap().len(), 2);
    }

    #[test]
    fn test_apply_batch() {
        let store = InMemoryKVStore::new();
        store.put(b"old", b"x").unwrap();

        store
            .apply_batch(vec![
                WriteOp::put(b"new".to_vec(), b"y".to_vec()),
                WriteOp::delete(b"old".to_vec()),
            ])
            .unwrap();

        assert!(store.exists(b"new").unwrap());
        assert!(!store.exists(b"old").unwrap());
    }
}
