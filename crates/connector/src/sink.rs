//! Object-storage sink for canonical trade records.
//!
//! One record, one key, one put. Storage failures are absorbed here and
//! reported as outcomes so the pipeline keeps flowing.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, ObjectStoreExt, PutPayload};
use tracing::{debug, trace};

use tickvault_metadata::{StorageConfig, StorageType};

use crate::error::WriterError;
use crate::record::TradeRecord;
use crate::traits::RecordWriter;

/// Result of one write attempt against the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The object landed under the derived key
    Written { key: String },
    /// The storage capability rejected the put; the run continues
    Failed { key: String, reason: String },
}

impl WriteOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, WriteOutcome::Written { .. })
    }

    /// The derived key this outcome refers to
    pub fn key(&self) -> &str {
        match self {
            WriteOutcome::Written { key } | WriteOutcome::Failed { key, .. } => key,
        }
    }
}

/// Writes each record as a JSON document to an object store.
pub struct ObjectStoreWriter {
    store: Arc<dyn ObjectStore>,
    /// Human-readable destination (bucket or path) for logging
    destination: String,
    records_written: u64,
}

impl ObjectStoreWriter {
    pub fn new(store: Arc<dyn ObjectStore>, destination: impl Into<String>) -> Self {
        Self {
            store,
            destination: destination.into(),
            records_written: 0,
        }
    }

    /// Build a writer from the environment's storage configuration.
    ///
    /// S3 credentials and region come from the process environment
    /// (AWS_ACCESS_KEY_ID etc.), with an optional region override from the
    /// config.
    pub fn from_config(storage: &StorageConfig) -> Result<Self, WriterError> {
        match storage.storage_type {
            StorageType::S3 => {
                let bucket = storage.bucket.as_deref().ok_or_else(|| {
                    WriterError::UnsupportedStorage("s3 storage requires a bucket".to_string())
                })?;

                let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);
                if let Some(ref region) = storage.region {
                    builder = builder.with_region(region.clone());
                }
                let store = builder
                    .build()
                    .map_err(|e| WriterError::Backend(e.to_string()))?;

                Ok(Self::new(Arc::new(store), bucket))
            }
            StorageType::Local => {
                let path = storage.path.as_deref().ok_or_else(|| {
                    WriterError::UnsupportedStorage("local storage requires a path".to_string())
                })?;

                let store = LocalFileSystem::new_with_prefix(path)
                    .map_err(|e| WriterError::Backend(e.to_string()))?;

                Ok(Self::new(Arc::new(store), path))
            }
            StorageType::Memory => Ok(Self::new(Arc::new(InMemory::new()), "memory")),
        }
    }

    /// Get count of records stored so far
    pub fn records_written(&self) -> u64 {
        self.records_written
    }
}

#[async_trait]
impl RecordWriter for ObjectStoreWriter {
    async fn write(&mut self, record: &TradeRecord) -> WriteOutcome {
        let key = record.storage_key();

        let body = match serde_json::to_vec(record) {
            Ok(body) => body,
            Err(e) => {
                return WriteOutcome::Failed {
                    key,
                    reason: format!("serialization failed: {}", e),
                }
            }
        };

        // Same-triple records collide on the key; this put replaces any
        // earlier object (last write wins).
        let path = ObjectPath::from(key.as_str());
        match self
            .store
            .put(&path, PutPayload::from(Bytes::from(body)))
            .await
        {
            Ok(_) => {
                self.records_written += 1;
                debug!(key = %key, destination = %self.destination, "Record stored");
                WriteOutcome::Written { key }
            }
            Err(e) => WriteOutcome::Failed {
                key,
                reason: e.to_string(),
            },
        }
    }

    async fn close(&mut self) -> Result<(), WriterError> {
        trace!(count = self.records_written, "Object store writer closing");
        Ok(())
    }
}
