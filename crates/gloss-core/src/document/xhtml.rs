//! XHTML loader.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{Document, NodeId};
use crate::error::{GlossError, Result};

/// Elements that never have content, whether or not they are self-closed.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

pub(super) fn parse(markup: &str) -> Result<Document> {
    let mut reader = Reader::from_str(markup);
    reader.config_mut().check_end_names = false;
    reader.config_mut().trim_text(false);

    let mut doc: Option<Document> = None;
    let mut stack: Vec<NodeId> = Vec::new();

    loop {
        let event = reader.read_event().map_err(|e| {
            GlossError::InvalidInput(format!(
                "Malformed markup at byte {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(start) => {
                let tag = tag_name(&start);
                let node = open_element(&mut doc, &stack, &tag)?;
                if !VOID_ELEMENTS.contains(&tag.as_str()) {
                    stack.push(node);
                }
            }
            Event::Empty(start) => {
                let tag = tag_name(&start);
                open_element(&mut doc, &stack, &tag)?;
            }
            Event::End(end) => {
                let tag = String::from_utf8_lossy(end.local_name().as_ref()).to_ascii_lowercase();
                close_element(doc.as_ref(), &mut stack, &tag);
            }
            Event::Text(text) => {
                let value = text
                    .unescape_with(html_entity)
                    .map_err(|e| GlossError::InvalidInput(format!("Bad text content: {}", e)))?;
                append_text(&mut doc, &stack, value)?;
            }
            Event::CData(data) => {
                let value = String::from_utf8_lossy(&data).into_owned();
                append_text(&mut doc, &stack, Cow::Owned(value))?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    doc.ok_or_else(|| GlossError::InvalidInput("Markup contains no root element".to_string()))
}

fn tag_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).to_ascii_lowercase()
}

fn open_element(doc: &mut Option<Document>, stack: &[NodeId], tag: &str) -> Result<NodeId> {
    match (doc.as_mut(), stack.last()) {
        (Some(doc), Some(&parent)) => doc.append_element(parent, tag),
        (Some(_), None) => Err(GlossError::InvalidInput(format!(
            "Unexpected second root element <{}>",
            tag
        ))),
        (None, _) => {
            let created = Document::new(tag);
            let root = created.root();
            *doc = Some(created);
            Ok(root)
        }
    }
}

/// Pop up to and including the nearest open element named `tag`; stray end
/// tags are ignored.
fn close_element(doc: Option<&Document>, stack: &mut Vec<NodeId>, tag: &str) {
    let Some(doc) = doc else {
        return;
    };
    if let Some(position) = stack.iter().rposition(|&node| doc.tag(node) == Some(tag)) {
        stack.truncate(position);
    }
}

fn append_text(doc: &mut Option<Document>, stack: &[NodeId], value: Cow<'_, str>) -> Result<()> {
    if value.is_empty() {
        return Ok(());
    }
    match (doc.as_mut(), stack.last()) {
        (Some(doc), Some(&parent)) => doc.append_text(parent, &value).map(|_| ()),
        // Whitespace around the root element carries no content.
        _ if value.trim().is_empty() => Ok(()),
        _ => Err(GlossError::InvalidInput(
            "Text content outside the root element".to_string(),
        )),
    }
}

fn html_entity(name: &str) -> Option<&'static str> {
    match name {
        "nbsp" => Some("\u{a0}"),
        "copy" => Some("\u{a9}"),
        "reg" => Some("\u{ae}"),
        "ndash" => Some("\u{2013}"),
        "mdash" => Some("\u{2014}"),
        "lsquo" => Some("\u{2018}"),
        "rsquo" => Some("\u{2019}"),
        "ldquo" => Some("\u{201c}"),
        "rdquo" => Some("\u{201d}"),
        "hellip" => Some("\u{2026}"),
        _ => None,
    }
}
