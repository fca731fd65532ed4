//! Browser blob store backed by LocalStorage (wasm32 only)

use super::BlobStore;
use crate::error::StorageError;

/// Reads and writes records in `window.localStorage`
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorageStore;

impl LocalStorageStore {
    fn storage() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StorageError::Unavailable)
    }
}

impl BlobStore for LocalStorageStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::storage()?
            .get_item(key)
            .map_err(|_| StorageError::Unavailable)
    }

    fn write(&mut self, key: &str, blob: &str) -> Result<(), StorageError> {
        Self::storage()?
            .set_item(key, blob)
            .map_err(|_| StorageError::WriteRejected {
                key: key.to_string(),
            })
    }
}
