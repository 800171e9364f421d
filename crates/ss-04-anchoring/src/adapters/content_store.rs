//! Content store keyed by Keccak-256 of the stored bytes

use crate::domain::AnchorError;
use crate::ports::ContentStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_crypto::keccak256;
use std::collections::HashMap;

#[derive(Default)]
pub struct InMemoryContentStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content id for `data`.
    pub fn content_id(data: &[u8]) -> String {
        format!("0x{}", hex::encode(keccak256(data)))
    }

    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn add_data(&self, data: Vec<u8>) -> Result<String, AnchorError> {
        let id = Self::content_id(&data);
        self.blobs.write().entry(id.clone()).or_insert(data);
        Ok(id)
    }

    async fn get_data(&self, content_id: &str) -> Result<Vec<u8>, AnchorError> {
        self.blobs
            .read()
            .get(content_id)
            .cloned()
            .ok_or_else(|| AnchorError::ContentNotFound(content_id.to_string()))
    }
}
