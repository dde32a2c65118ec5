//! In-memory storage medium.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::medium::StorageMedium;
use crate::error::Result;

/// Volatile medium backed by a sorted map. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryMedium {
    records: RwLock<BTreeMap<String, String>>,
}

impl MemoryMedium {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageMedium for MemoryMedium {
    async fn read(&self, name: &str) -> Result<Option<String>> {
        Ok(self.records.read().await.get(name).cloned())
    }

    async fn write(&self, name: &str, envelope: &str) -> Result<()> {
        self.records
            .write()
            .await
            .insert(name.to_string(), envelope.to_string());
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<()> {
        self.records.write().await.remove(name);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .records
            .read()
            .await
            .keys()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect())
    }
}
