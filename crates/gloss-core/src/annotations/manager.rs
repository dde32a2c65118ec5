//! Per-URL annotation persistence.

use crate::anchor::AnchorCodec;
use crate::document::Document;
use crate::error::{GlossError, Result};
use crate::storage::{Lookup, SecureStore};

use super::session::PageSession;
use super::types::{AnnotationSet, PageEntry, PageIndex};

/// Record name prefix for per-page annotation sets.
pub const ANNOTATIONS_PREFIX: &str = "annotations:";

/// Record name of the page index.
pub const PAGE_INDEX_RECORD: &str = "pages:index";

/// What the store holds for a page.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredSet {
    Missing,
    /// Encrypted and unreadable: no key is set, or the record was sealed
    /// under a different one.
    Locked,
    Found(AnnotationSet),
}

/// Loads and saves [`AnnotationSet`]s through a [`SecureStore`], one record
/// per page URL, and keeps the page index current.
#[derive(Clone)]
pub struct AnnotationManager {
    store: SecureStore,
    codec: AnchorCodec,
}

impl AnnotationManager {
    pub fn new(store: SecureStore, codec: AnchorCodec) -> Self {
        Self { store, codec }
    }

    pub fn store(&self) -> &SecureStore {
        &self.store
    }

    pub fn codec(&self) -> &AnchorCodec {
        &self.codec
    }

    /// Record name holding the annotations of `url`.
    pub fn record_name(url: &str) -> String {
        format!("{}{}", ANNOTATIONS_PREFIX, url)
    }

    /// Read the stored set for `url`, keeping "locked" apart from "missing".
    pub async fn fetch_annotations(&self, url: &str) -> Result<StoredSet> {
        validate_url(url)?;
        match self.store.fetch(&Self::record_name(url)).await? {
            Lookup::Missing => Ok(StoredSet::Missing),
            Lookup::Locked | Lookup::Mismatched => Ok(StoredSet::Locked),
            Lookup::Found(value) => {
                let mut set: AnnotationSet = serde_json::from_value(value)?;
                set.url = url.to_string();
                Ok(StoredSet::Found(set))
            }
        }
    }

    /// The stored set for `url`, or an empty one when nothing is stored or
    /// the record cannot be read under the current key.
    ///
    /// # Errors
    ///
    /// Returns `GlossError::StorageUnavailable` if the medium fails.
    pub async fn load_annotations(&self, url: &str) -> Result<AnnotationSet> {
        match self.fetch_annotations(url).await? {
            StoredSet::Found(set) => Ok(set),
            StoredSet::Missing | StoredSet::Locked => Ok(AnnotationSet::new(url)),
        }
    }

    /// Replace the stored set for `url` and update the page index.
    ///
    /// An empty set drops the page from the index. The call succeeds once the
    /// page record is written; a failed index update is logged and skipped.
    pub async fn save_annotations(&self, url: &str, set: &AnnotationSet) -> Result<()> {
        validate_url(url)?;
        if set.url != url {
            return Err(GlossError::InvalidInput(format!(
                "Annotation set belongs to {}, not {}",
                set.url, url
            )));
        }

        self.store.set(&Self::record_name(url), set).await?;
        tracing::debug!(
            highlights = set.highlights.len(),
            notes = set.notes.len() + usize::from(set.page_note.is_some()),
            "annotations saved"
        );

        if let Err(err) = self.update_index(set).await {
            tracing::warn!(error = %err, "page index update failed");
        }
        Ok(())
    }

    /// Pages with saved annotations, most recently updated first.
    ///
    /// The index is maintained on a best-effort basis. Saves made while it
    /// was unreadable under the current key, or while writing it failed, are
    /// missing from it, and an unreadable index lists as empty.
    pub async fn list_pages(&self) -> Result<Vec<PageEntry>> {
        Ok(self
            .store
            .get::<PageIndex>(PAGE_INDEX_RECORD)
            .await?
            .unwrap_or_default()
            .pages)
    }

    /// Start a page session for `url` and hydrate it against `doc`.
    pub async fn open_page(&self, url: &str, doc: &Document) -> Result<PageSession> {
        let mut session = PageSession::new(self.clone(), url);
        session.load(doc).await?;
        Ok(session)
    }

    async fn update_index(&self, set: &AnnotationSet) -> Result<()> {
        let mut index = match self.store.fetch(PAGE_INDEX_RECORD).await? {
            Lookup::Found(value) => serde_json::from_value::<PageIndex>(value)?,
            Lookup::Missing => PageIndex::default(),
            Lookup::Locked | Lookup::Mismatched => {
                // Rewriting it now would replace ciphertext we cannot read.
                tracing::warn!("page index is unreadable, skipping update");
                return Ok(());
            }
        };

        if set.is_empty() {
            index.remove(&set.url);
        } else {
            index.upsert(PageEntry::from(set));
        }
        self.store.set(PAGE_INDEX_RECORD, &index).await
    }
}

fn validate_url(url: &str) -> Result<()> {
    if url.trim().is_empty() {
        return Err(GlossError::InvalidInput("Page URL cannot be empty".to_string()));
    }
    Ok(())
}
