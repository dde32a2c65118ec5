//! Annotation management.
//!
//! Each page URL owns one [`AnnotationSet`] (highlight anchors plus notes),
//! persisted as a single secure record named `annotations:<url>`. A
//! [`PageSession`] holds the set for the active page, re-applies its anchors
//! on load and writes every change straight through to the store.
//!
//! Concurrent sessions for the same URL are not merged; the later save wins.

mod manager;
mod session;
mod tags;
mod types;

pub use manager::{AnnotationManager, StoredSet, ANNOTATIONS_PREFIX, PAGE_INDEX_RECORD};
pub use session::{Highlight, PageSession, PageState};
pub use tags::{normalize_tags, split_tags, MAX_TAGS_PER_NOTE, MAX_TAG_BYTES};
pub use types::{AnnotationSet, NewNote, Note, PageEntry, PageIndex, Position};
