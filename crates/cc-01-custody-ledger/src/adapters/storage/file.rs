use crate::adapters::storage::lock::{sibling_path, StoreLock};
use crate::adapters::storage::memory::{apply_to_map, scan_ordered};
use crate::domain::errors::{BatchWriteError, KVStoreError};
use crate::ports::outbound::{KeyValueStore, ScanResult, WriteOp};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

type Map = BTreeMap<Vec<u8>, Vec<u8>>;

/// Durable single-file key-value store.
///
/// The whole map lives in memory and is rewritten to disk after every
/// mutation through a temp file and rename, so the file on disk always holds
/// a complete state. A batch is persisted as one rewrite: if the write fails,
/// neither the file nor the in-memory map change.
///
/// Only one handle may have a given file open: `open` takes an exclusive
/// lock on `<path>.lock` and holds it until the store is dropped.
///
/// File format: repeated `[key_len:u32 LE][key][value_len:u32 LE][value]`.
pub struct FileBackedKVStore {
    data: RwLock<Map>,
    path: PathBuf,
    _lock: StoreLock,
}

impl FileBackedKVStore {
    /// Open the store at `path`, creating an empty one if the file is absent.
    ///
    /// A truncated or malformed file is reported as `CorruptionError` rather
    /// than silently dropping records. A store already opened by another
    /// handle is reported as `Locked`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, KVStoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_error)?;
            }
        }
        let lock = StoreLock::acquire(&path)?;

        let data = if path.exists() {
            let data = Self::load_from_file(&path)?;
            info!(
                "[cc-01] Loaded {} keys from {}",
                data.len(),
                path.display()
            );
            data
        } else {
            info!("[cc-01] No existing store at {}, starting empty", path.display());
            Map::new()
        };

        Ok(Self {
            data: RwLock::new(data),
            path,
            _lock: lock,
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_file(path: &Path) -> Result<Map, KVStoreError> {
        let mut file = std::fs::File::open(path).map_err(io_error)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(io_error)?;
        decode(&bytes)
    }

    fn save_to_file(&self, data: &Map) -> Result<(), KVStoreError> {
        let bytes = encode(data);

        let temp_path = sibling_path(&self.path, ".tmp");
        let mut file = std::fs::File::create(&temp_path).map_err(io_error)?;
        file.write_all(&bytes).map_err(io_error)?;
        file.sync_all().map_err(io_error)?;
        std::fs::rename(&temp_path, &self.path).map_err(io_error)?;

        debug!("[cc-01] Persisted {} keys ({} bytes)", data.len(), bytes.len());
        Ok(())
    }

    /// Apply `operations` to a copy of the map, persist it, then publish it.
    fn commit(&self, operations: Vec<WriteOp>) -> Result<(), KVStoreError> {
        let mut guard = self.data.write();
        let mut next = guard.clone();
        apply_to_map(&mut next, operations);
        self.save_to_file(&next)?;
        *guard = next;
        Ok(())
    }
}

fn io_error(e: std::io::Error) -> KVStoreError {
    KVStoreError::IOError {
        message: e.to_string(),
    }
}

fn encode(data: &Map) -> Vec<u8> {
    let mut bytes = Vec::new();
    for (key, value) in data {
        bytes.extend_from_slice(&(key.len() as u32).to_le_bytes());
        bytes.extend_from_slice(key);
        bytes.extend_from_slice(&(value.len() as u32).to_le_bytes());
        bytes.extend_from_slice(value);
    }
    bytes
}

fn decode(bytes: &[u8]) -> Result<Map, KVStoreError> {
    let mut data = Map::new();
    let mut cursor = 0;

    while cursor < bytes.len() {
        let key = read_chunk(bytes, &mut cursor)?;
        let value = read_chunk(bytes, &mut cursor)?;
        data.insert(key, value);
    }

    Ok(data)
}

fn read_chunk(bytes: &[u8], cursor: &mut usize) -> Result<Vec<u8>, KVStoreError> {
    let corrupt = |what: &str| KVStoreError::CorruptionError {
        message: format!("truncated {} at offset {}", what, *cursor),
    };

    let len_bytes: [u8; 4] = bytes
        .get(*cursor..*cursor + 4)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| corrupt("length prefix"))?;
    let len = u32::from_le_bytes(len_bytes) as usize;
    let start = *cursor + 4;

    let chunk = bytes
        .get(start..start + len)
        .ok_or_else(|| corrupt("record"))?
        .to_vec();
    *cursor = start + len;
    Ok(chunk)
}

impl KeyValueStore for FileBackedKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.read().get(key).cloned())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.commit(vec![WriteOp::put(key, value)])
    }

    fn delete(&self, key: &[u8]) -> Result<(), KVStoreError> {
        self.commit(vec![WriteOp::delete(key)])
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.data.read().contains_key(key))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError> {
        Ok(scan_ordered(&self.data.read(), prefix))
    }

    fn apply_batch(&self, operations: Vec<WriteOp>) -> Result<(), BatchWriteError> {
        self.commit(operations)
            .map_err(|source| BatchWriteError { applied: 0, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.db");

        {
            let store = FileBackedKVStore::open(&path).unwrap();
            store.put(b"lot:L1", b"{}").unwrap();
            store
                .apply_batch(vec![
                    WriteOp::put(b"lot:L2".to_vec(), b"{}".to_vec()),
                    WriteOp::delete(b"lot:L1".to_vec()),
                ])
                .unwrap();
        }

        let reopened = FileBackedKVStore::open(&path).unwrap();
        assert!(!reopened.exists(b"lot:L1").unwrap());
        assert_eq!(reopened.get(b"lot:L2").unwrap(), Some(b"{}".to_vec()));
    }

    #[test]
    fn test_second_open_is_refused_while_first_is_live() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.db");

        let first = FileBackedKVStore::open(&path).unwrap();
        first.put(b"agent:collector:R1", b"{}").unwrap();

        match FileBackedKVStore::open(&path) {
            Err(KVStoreError::Locked { path: locked, .. }) => {
                assert!(locked.ends_with("ledger.db.lock"));
            }
            other => panic!("expected Locked, got {:?}", other.map(|_| ())),
        }

        first.put(b"lot:L1", b"{}").unwrap();
        drop(first);

        let reopened = FileBackedKVStore::open(&path).unwrap();
        assert!(reopened.exists(b"agent:collector:R1").unwrap());
        assert!(reopened.exists(b"lot:L1").unwrap());
    }

    #[test]
    fn test_data_path_with_tmp_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.tmp");

        {
            let store = FileBackedKVStore::open(&path).unwrap();
            store.put(b"k", b"v").unwrap();
        }

        assert!(!dir.path().join("ledger.tmp.tmp").exists());
        let reopened = FileBackedKVStore::open(&path).unwrap();
        assert_eq!(reopened.get(b"k").unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn test_missing_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileBackedKVStore::open(dir.path().join("nested/new.db")).unwrap();
        assert!(store.prefix_scan(b"").unwrap().is_empty());

        store.put(b"k", b"v").unwrap();
        assert!(dir.path().join("nested/new.db").exists());
    }

    #[test]
    fn test_truncated_file_is_corruption() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.db");
        std::fs::write(&path, [5u8, 0, 0, 0, b'a']).unwrap();

        match FileBackedKVStore::open(&path) {
            Err(KVStoreError::CorruptionError { .. }) => {}
            other => panic!("expected corruption error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_prefix_scan_ordered() {
        let dir = TempDir::new().unwrap();
        let store = FileBackedKVStore::open(dir.path().join("s.db")).unwrap();
        store.put(b"p:b", b"2").unwrap();
        store.put(b"p:a", b"1").unwrap();
        store.put(b"q:a", b"3").unwrap();

        let scanned = store.prefix_scan(b"p:").unwrap();
        assert_eq!(
            scanned,
            vec![
                (b"p:a".to_vec(), b"1".to_vec()),
                (b"p:b".to_vec(), b"2".to_vec())
            ]
        );
    }
}
