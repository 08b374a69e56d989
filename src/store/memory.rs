//! In-memory [ObjectStore], used by the orchestrator tests.

use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex};

use crate::store::{ObjectStore, StoreError};

/// Keeps blobs in a shared map.
///
/// Clones share the same underlying objects, so a test can hold on to one
/// handle while the orchestrator owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    objects: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a stored blob, if present.
    pub fn object(&self, name: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(name).cloned()
    }
}

impl ObjectStore for MemoryStore {
    fn put(&self, name: &str, data: &mut dyn Read) -> Result<(), StoreError> {
        let mut blob = Vec::new();
        data.read_to_end(&mut blob)
            .map_err(|e| StoreError::new(e.to_string()))?;

        self.objects.lock().unwrap().insert(name.to_string(), blob);
        Ok(())
    }

    fn get(&self, name: &str) -> Result<Box<dyn Read>, StoreError> {
        let blob = self
            .objects
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::new(format!("no such object: {name}")))?;

        Ok(Box::new(Cursor::new(blob)))
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.objects.lock().unwrap().keys().cloned().collect())
    }

    fn delete(&self, name: &str) -> Result<(), StoreError> {
        self.objects.lock().unwrap().remove(name);
        Ok(())
    }
}
