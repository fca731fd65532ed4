//! In-process blob store (tests, headless runs)

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::BlobStore;
use crate::error::StorageError;

/// Blob store backed by a shared map
///
/// Clones share the same map, so a test can hand one clone to the game and
/// inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blobs: Rc<RefCell<HashMap<String, String>>>,
    reject_writes: Rc<RefCell<bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail (simulates a full/locked backend)
    pub fn set_reject_writes(&self, reject: bool) {
        *self.reject_writes.borrow_mut() = reject;
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.blobs.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.borrow().is_empty()
    }
}

impl BlobStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.blobs.borrow().get(key).cloned())
    }

    fn write(&mut self, key: &str, blob: &str) -> Result<(), StorageError> {
        if *self.reject_writes.borrow() {
            return Err(StorageError::WriteRejected {
                key: key.to_string(),
            });
        }
        self.blobs
            .borrow_mut()
            .insert(key.to_string(), blob.to_string());
        Ok(())
    }
}
