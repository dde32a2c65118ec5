//! The operations offered to collaborators, wired over one shared key.

use std::sync::Arc;

use secrecy::SecretString;

use crate::anchor::{Anchor, AnchorCodec, AnchorPolicy};
use crate::annotations::{AnnotationManager, AnnotationSet, PageEntry, PageSession};
use crate::crypto::{KeyDerivationParams, KeyManager};
use crate::document::{Document, Span};
use crate::error::Result;
use crate::storage::{SecureStore, StorageMedium};

/// One key manager, one store, one anchor policy.
///
/// Cheap to clone; clones share the key and the medium.
#[derive(Clone)]
pub struct Gloss {
    keys: Arc<KeyManager>,
    store: SecureStore,
    annotations: AnnotationManager,
}

impl Gloss {
    pub fn new(
        medium: Arc<dyn StorageMedium>,
        params: KeyDerivationParams,
        policy: AnchorPolicy,
    ) -> Self {
        let keys = Arc::new(KeyManager::new(params));
        let store = SecureStore::new(medium, keys.clone());
        let annotations = AnnotationManager::new(store.clone(), AnchorCodec::new(policy));
        Self {
            keys,
            store,
            annotations,
        }
    }

    pub fn keys(&self) -> &Arc<KeyManager> {
        &self.keys
    }

    pub fn store(&self) -> &SecureStore {
        &self.store
    }

    pub fn annotations(&self) -> &AnnotationManager {
        &self.annotations
    }

    /// Derive and install a key; an empty passphrase clears it.
    pub fn set_passphrase(&self, passphrase: &SecretString) -> Result<()> {
        self.keys.set_passphrase(passphrase).map(|_| ())
    }

    pub async fn get_record(&self, name: &str) -> Result<Option<serde_json::Value>> {
        self.store.get_value(name).await
    }

    pub async fn put_record(&self, name: &str, record: &serde_json::Value) -> Result<()> {
        self.store.set_value(name, record).await
    }

    pub async fn delete_record(&self, name: &str) -> Result<()> {
        self.store.delete(name).await
    }

    pub fn encode_anchor(&self, doc: &Document, selection: &Span) -> Result<Anchor> {
        self.annotations.codec().encode(doc, selection)
    }

    pub fn decode_anchor(&self, doc: &Document, anchor: &Anchor) -> Option<Span> {
        self.annotations.codec().decode(doc, anchor)
    }

    pub async fn load_annotations(&self, url: &str) -> Result<AnnotationSet> {
        self.annotations.load_annotations(url).await
    }

    pub async fn save_annotations(&self, url: &str, set: &AnnotationSet) -> Result<()> {
        self.annotations.save_annotations(url, set).await
    }

    pub async fn list_pages(&self) -> Result<Vec<PageEntry>> {
        self.annotations.list_pages().await
    }

    pub async fn open_page(&self, url: &str, doc: &Document) -> Result<PageSession> {
        self.annotations.open_page(url, doc).await
    }
}

impl std::fmt::Debug for Gloss {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gloss")
            .field("keys", &self.keys)
            .field("policy", &self.annotations.codec().policy())
            .finish()
    }
}
