//! Persisted annotation records.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::anchor::Anchor;

/// Screen position of a point note.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A note attached to a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier for this note
    pub id: Uuid,

    /// Free-form body
    pub text: String,

    /// Normalized tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Where a point note sits; `None` for the page note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,

    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn is_page_note(&self) -> bool {
        self.position.is_none()
    }
}

/// Builder for creating or replacing a note.
#[derive(Debug, Clone, Default)]
pub struct NewNote {
    /// Existing point note to replace; a fresh id is assigned when unset
    pub id: Option<Uuid>,

    /// Note body
    pub text: String,

    /// Raw tags, normalized on upsert
    pub tags: Vec<String>,

    /// `None` addresses the single page note
    pub position: Option<Position>,
}

impl NewNote {
    /// The page-scoped note, overwritten in place.
    pub fn page(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// A point-scoped note at a screen position.
    pub fn point(text: impl Into<String>, position: Position) -> Self {
        Self {
            text: text.into(),
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }
}

/// Everything annotated on one page, persisted as a single record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationSet {
    /// Page URL
    pub url: String,

    /// Page title at the last save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Highlight anchors in creation order
    #[serde(default)]
    pub highlights: Vec<Anchor>,

    /// The page-scoped note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_note: Option<Note>,

    /// Point-scoped notes
    #[serde(default)]
    pub notes: Vec<Note>,

    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl AnnotationSet {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            highlights: Vec::new(),
            page_note: None,
            notes: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// True when nothing is annotated.
    pub fn is_empty(&self) -> bool {
        self.highlights.is_empty() && self.page_note.is_none() && self.notes.is_empty()
    }

    /// Page note followed by point notes.
    pub fn all_notes(&self) -> impl Iterator<Item = &Note> {
        self.page_note.iter().chain(self.notes.iter())
    }

    /// Sorted union of every note's tags.
    pub fn tags(&self) -> Vec<String> {
        self.all_notes()
            .flat_map(|note| note.tags.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// One row of the page index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageEntry {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<&AnnotationSet> for PageEntry {
    fn from(set: &AnnotationSet) -> Self {
        Self {
            url: set.url.clone(),
            title: set.title.clone(),
            tags: set.tags(),
            updated_at: set.updated_at,
        }
    }
}

/// Index of annotated pages, most recently updated first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageIndex {
    #[serde(default)]
    pub pages: Vec<PageEntry>,
}

impl PageIndex {
    /// Replace the entry for `entry.url`, or add it.
    pub fn upsert(&mut self, entry: PageEntry) {
        self.pages.retain(|page| page.url != entry.url);
        self.pages.push(entry);
        self.pages
            .sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.url.cmp(&b.url)));
    }

    /// Drop the entry for `url`; returns whether one existed.
    pub fn remove(&mut self, url: &str) -> bool {
        let before = self.pages.len();
        self.pages.retain(|page| page.url != url);
        self.pages.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn note(tags: &[&str], position: Option<Position>) -> Note {
        Note {
            id: Uuid::new_v4(),
            text: "n".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            position,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_set_tags_are_sorted_union() {
        let mut set = AnnotationSet::new("https://example.org");
        set.page_note = Some(note(&["zeta", "alpha"], None));
        set.notes.push(note(&["alpha", "mid"], Some(Position::new(1.0, 2.0))));
        assert_eq!(set.tags(), vec!["alpha", "mid", "zeta"]);
        assert!(!set.is_empty());
    }

    #[test]
    fn test_set_deserializes_with_missing_collections() {
        let set: AnnotationSet = serde_json::from_value(serde_json::json!({
            "url": "https://example.org",
            "updated_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert!(set.is_empty());
        assert!(set.title.is_none());
    }

    #[test]
    fn test_page_note_omits_position() {
        let value = serde_json::to_value(note(&[], None)).unwrap();
        assert!(value.get("position").is_none());
    }

    #[test]
    fn test_index_upsert_replaces_and_orders() {
        let now = Utc::now();
        let entry = |url: &str, age: i64| PageEntry {
            url: url.to_string(),
            title: None,
            tags: Vec::new(),
            updated_at: now - Duration::minutes(age),
        };

        let mut index = PageIndex::default();
        index.upsert(entry("a", 10));
        index.upsert(entry("b", 5));
        index.upsert(entry("a", 1));

        let urls: Vec<_> = index.pages.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(urls, vec!["a", "b"]);
        assert!(index.remove("b"));
        assert!(!index.remove("b"));
    }
}
