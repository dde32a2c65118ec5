//! Parsing helpers for command arguments.

use std::path::Path;

use uuid::Uuid;

use gloss_core::{Anchor, Document, Span};

use crate::errors::CliError;

/// Read and parse the XHTML file standing in for the live page.
pub fn read_document(path: &str) -> anyhow::Result<Document> {
    let path = Path::new(path);
    let markup = std::fs::read_to_string(path).map_err(|e| {
        CliError::not_found(
            format!("Failed to read document {}: {}", path.display(), e),
            "Pass an existing XHTML file with --file.",
        )
    })?;
    Ok(Document::parse_xhtml(&markup)?)
}

/// Select the `occurrence`-th match of `quote` in the document body.
pub fn select_quote(doc: &Document, quote: &str, occurrence: usize) -> anyhow::Result<Span> {
    if quote.is_empty() {
        return Err(CliError::invalid_input("--quote cannot be empty").into());
    }
    doc.find_text(quote, occurrence).ok_or_else(|| {
        CliError::not_found(
            format!("Text \"{}\" not found (occurrence {})", quote, occurrence),
            "Quotes match the document body exactly, including whitespace.",
        )
        .into()
    })
}

pub fn parse_uuid(value: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(value.trim())
        .map_err(|_| CliError::invalid_input(format!("Invalid note id: {}", value)).into())
}

pub fn parse_json_arg(value: &str) -> anyhow::Result<serde_json::Value> {
    serde_json::from_str(value)
        .map_err(|e| CliError::invalid_input(format!("Invalid JSON: {}", e)).into())
}

pub fn parse_anchor(value: &str) -> anyhow::Result<Anchor> {
    serde_json::from_str(value)
        .map_err(|e| CliError::invalid_input(format!("Invalid anchor JSON: {}", e)).into())
}

/// First `max` chars of `text`, with an ellipsis when cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
