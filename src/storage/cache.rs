//! LocalCache - encrypted key-value cache keyed by record id.
//!
//! Workflow: value → JSON → AES-256-GCM → base64 blob → backend
//!
//! Absence is a normal outcome (`Ok(None)`); a blob that fails to decrypt
//! or parse is an error, never `None`. Writes are last-writer-wins per key.

use super::backend::KeyValueStore;
use crate::crypto::{derive_key, EncryptedBlob, Encryptor, KeyMaterial};
use crate::error::Result;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

pub struct LocalCache {
    store: Arc<dyn KeyValueStore>,
    encryptor: Encryptor,
}

impl LocalCache {
    /// Derives the key once for the lifetime of the cache.
    pub fn new(store: Arc<dyn KeyValueStore>, material: &KeyMaterial) -> Self {
        let key = derive_key(material);
        Self {
            store,
            encryptor: Encryptor::new(&key),
        }
    }

    pub fn with_encryptor(store: Arc<dyn KeyValueStore>, encryptor: Encryptor) -> Self {
        Self { store, encryptor }
    }

    pub async fn save<T: Serialize + ?Sized>(&self, id: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        let blob = self.encryptor.encrypt(&json)?;
        self.store.set(id, blob.into_string()).await?;
        tracing::debug!("Saved encrypted entry {}", id);
        Ok(())
    }

    pub async fn load<T: DeserializeOwned>(&self, id: &str) -> Result<Option<T>> {
        let Some(raw) = self.store.get(id).await? else {
            tracing::debug!("No local entry for {}", id);
            return Ok(None);
        };

        let json = self.encryptor.decrypt(&EncryptedBlob::from(raw))?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    pub async fn remove(&self, id: &str) -> Result<()> {
        self.store.remove(id).await?;
        tracing::debug!("Removed local entry {}", id);
        Ok(())
    }

    /// Every key in the namespace, records and credentials alike.
    pub async fn keys(&self) -> Result<Vec<String>> {
        self.store.keys().await
    }
}
