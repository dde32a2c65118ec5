//! The annotation state of one open page.

use chrono::Utc;
use uuid::Uuid;

use crate::anchor::Anchor;
use crate::document::{Document, Span};
use crate::error::{GlossError, Result};

use super::manager::{AnnotationManager, StoredSet};
use super::tags::normalize_tags;
use super::types::{AnnotationSet, NewNote, Note};

/// Lifecycle of a [`PageSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    Loading,
    Ready,
}

/// A highlight bound to its anchor and the live span it resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    pub anchor: Anchor,
    pub span: Span,
}

/// In-memory annotations for the active page.
///
/// Every mutation is applied to the in-memory set and then persisted in
/// full. If persisting fails the in-memory state is rolled back, so the
/// session never drifts from what the store holds.
pub struct PageSession {
    manager: AnnotationManager,
    url: String,
    state: PageState,
    set: AnnotationSet,
    highlights: Vec<Highlight>,
    locked: bool,
}

impl PageSession {
    pub fn new(manager: AnnotationManager, url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            manager,
            set: AnnotationSet::new(url.clone()),
            url,
            state: PageState::Loading,
            highlights: Vec::new(),
            locked: false,
        }
    }

    /// Read the stored set and re-apply its anchors against `doc`.
    ///
    /// Anchors that no longer resolve are skipped and drop out of the set on
    /// the next save. A record that cannot be read under the current key
    /// (none set, or a different passphrase) hydrates as empty and leaves the
    /// session read-only.
    ///
    /// # Errors
    ///
    /// Store failures propagate and leave the session in `Loading`.
    pub async fn load(&mut self, doc: &Document) -> Result<()> {
        self.state = PageState::Loading;
        let stored = self.manager.fetch_annotations(&self.url).await?;

        let (mut set, locked) = match stored {
            StoredSet::Found(set) => (set, false),
            StoredSet::Missing => (AnnotationSet::new(self.url.clone()), false),
            StoredSet::Locked => (AnnotationSet::new(self.url.clone()), true),
        };

        let codec = *self.manager.codec();
        let mut highlights = Vec::with_capacity(set.highlights.len());
        for anchor in &set.highlights {
            match codec.decode(doc, anchor) {
                Some(span) => highlights.push(Highlight {
                    anchor: anchor.clone(),
                    span,
                }),
                None => tracing::warn!(
                    start = anchor.start,
                    end = anchor.end,
                    "skipping highlight that no longer resolves"
                ),
            }
        }
        set.highlights = highlights.iter().map(|h| h.anchor.clone()).collect();
        if let Some(title) = doc.title() {
            set.title = Some(title);
        }

        tracing::debug!(
            highlights = highlights.len(),
            locked,
            "page session ready"
        );
        self.set = set;
        self.highlights = highlights;
        self.locked = locked;
        self.state = PageState::Ready;
        Ok(())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    /// True when the stored record could not be read for lack of a key.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn annotations(&self) -> &AnnotationSet {
        &self.set
    }

    /// Live highlights, in creation order.
    pub fn highlights(&self) -> &[Highlight] {
        &self.highlights
    }

    /// Anchor `selection`, add it as a highlight and persist.
    pub async fn add_highlight(&mut self, doc: &Document, selection: &Span) -> Result<Highlight> {
        self.ensure_writable()?;
        let codec = *self.manager.codec();
        let anchor = codec.encode(doc, selection)?;
        let span = codec.resolve(doc, &anchor)?;
        let highlight = Highlight { anchor, span };

        let snapshot = self.snapshot();
        self.set.highlights.push(highlight.anchor.clone());
        self.highlights.push(highlight.clone());
        self.persist(snapshot).await?;
        Ok(highlight)
    }

    /// Remove every highlight and persist; returns how many were removed.
    pub async fn clear_highlights(&mut self) -> Result<usize> {
        self.ensure_writable()?;
        let removed = self.highlights.len();

        let snapshot = self.snapshot();
        self.set.highlights.clear();
        self.highlights.clear();
        self.persist(snapshot).await?;
        Ok(removed)
    }

    /// Create or replace a note and persist.
    ///
    /// A note without a position is the page note and replaces it in place,
    /// keeping its id. A point note replaces the one with the same id, or is
    /// appended.
    pub async fn upsert_note(&mut self, note: NewNote) -> Result<Note> {
        self.ensure_writable()?;
        let tags = normalize_tags(&note.tags)?;
        let now = Utc::now();

        let snapshot = self.snapshot();
        let saved = match note.position {
            None => {
                let id = self
                    .set
                    .page_note
                    .as_ref()
                    .map(|existing| existing.id)
                    .or(note.id)
                    .unwrap_or_else(Uuid::new_v4);
                let saved = Note {
                    id,
                    text: note.text,
                    tags,
                    position: None,
                    updated_at: now,
                };
                self.set.page_note = Some(saved.clone());
                saved
            }
            Some(position) => {
                let id = note.id.unwrap_or_else(Uuid::new_v4);
                let saved = Note {
                    id,
                    text: note.text,
                    tags,
                    position: Some(position),
                    updated_at: now,
                };
                match self.set.notes.iter_mut().find(|existing| existing.id == id) {
                    Some(existing) => *existing = saved.clone(),
                    None => self.set.notes.push(saved.clone()),
                }
                saved
            }
        };

        self.persist(snapshot).await?;
        Ok(saved)
    }

    /// Delete the note with `id` and persist; returns whether it existed.
    pub async fn remove_note(&mut self, id: Uuid) -> Result<bool> {
        self.ensure_writable()?;

        let snapshot = self.snapshot();
        let before = self.set.notes.len();
        self.set.notes.retain(|note| note.id != id);
        let mut removed = self.set.notes.len() != before;
        if self.set.page_note.as_ref().is_some_and(|note| note.id == id) {
            self.set.page_note = None;
            removed = true;
        }

        if !removed {
            return Ok(false);
        }
        self.persist(snapshot).await?;
        Ok(true)
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.state != PageState::Ready {
            return Err(GlossError::InvalidInput(
                "Page annotations are still loading".to_string(),
            ));
        }
        if self.locked {
            return Err(GlossError::DecryptionUnavailable);
        }
        Ok(())
    }

    fn snapshot(&self) -> (AnnotationSet, Vec<Highlight>) {
        (self.set.clone(), self.highlights.clone())
    }

    async fn persist(&mut self, snapshot: (AnnotationSet, Vec<Highlight>)) -> Result<()> {
        self.set.updated_at = Utc::now();
        if let Err(err) = self.manager.save_annotations(&self.url, &self.set).await {
            tracing::warn!(error = %err, "annotation save failed, rolling back");
            (self.set, self.highlights) = snapshot;
            return Err(err);
        }
        Ok(())
    }
}

impl std::fmt::Debug for PageSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageSession")
            .field("url", &self.url)
            .field("state", &self.state)
            .field("highlights", &self.highlights.len())
            .field("locked", &self.locked)
            .finish()
    }
}
