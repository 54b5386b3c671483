use std::collections::HashMap;
use std::io;

use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use futures::stream::BoxStream;
use tokio::sync::RwLock;

use crate::application::ports::{StagingStore, StagingStoreError};
use crate::domain::StoragePath;

/// Keeps staged uploads in memory. Used by tests and by deployments
/// without writable disk.
#[derive(Default)]
pub struct InMemoryStagingStore {
    objects: RwLock<HashMap<String, Bytes>>,
}

impl InMemoryStagingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl StagingStore for InMemoryStagingStore {
    async fn store(
        &self,
        path: &StoragePath,
        mut stream: BoxStream<'_, Result<Bytes, io::Error>>,
    ) -> Result<u64, StagingStoreError> {
        let mut buffer = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            buffer.extend_from_slice(&chunk?);
        }

        let size = buffer.len() as u64;
        self.objects
            .write()
            .await
            .insert(path.as_str().to_string(), buffer.freeze());
        Ok(size)
    }

    async fn fetch(&self, path: &StoragePath) -> Result<Bytes, StagingStoreError> {
        self.objects
            .read()
            .await
            .get(path.as_str())
            .cloned()
            .ok_or_else(|| StagingStoreError::NotFound(path.to_string()))
    }

    async fn delete(&self, path: &StoragePath) -> Result<(), StagingStoreError> {
        self.objects
            .write()
            .await
            .remove(path.as_str())
            .map(|_| ())
            .ok_or_else(|| StagingStoreError::DeleteFailed(format!("not found: {}", path)))
    }
}
