//! Object-store access for backup blobs.

pub mod memory;
pub mod s3;

pub use memory::MemoryStore;
pub use s3::S3Store;

use std::io::Read;

use derive_more::{Display, Error};

/// Any failed call against the object store.
#[derive(Debug, Display, Error)]
#[display("object store request failed: {detail}")]
pub struct StoreError {
    detail: String,
}

impl StoreError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Blob storage scoped to one bucket.
///
/// Listing returns all object names in no particular order; callers build the
/// time ordering through [`backup::catalog`](crate::backup::catalog). Writes
/// are single atomic calls, there are no partial uploads to clean up.
pub trait ObjectStore {
    /// Stores a blob under `name`, replacing any previous one.
    fn put(&self, name: &str, data: &mut dyn Read) -> Result<(), StoreError>;

    /// Fetches the blob stored under `name`.
    fn get(&self, name: &str) -> Result<Box<dyn Read>, StoreError>;

    /// Lists all object names in the bucket.
    fn list(&self) -> Result<Vec<String>, StoreError>;

    /// Deletes the blob stored under `name`; deleting an absent name is fine.
    fn delete(&self, name: &str) -> Result<(), StoreError>;
}
