//! `gloss annotate`: highlights and notes for one page.

use serde_json::json;

use gloss_core::annotations::{split_tags, Highlight, PageSession, Position};
use gloss_core::document::TextMap;
use gloss_core::{Document, NewNote, Note, Span};

use crate::app::AppContext;
use crate::cli::{AnnotateSubcommand, DocumentArgs, NoteArgs};
use crate::errors::CliError;
use crate::helpers::{parse_uuid, read_document, select_quote, truncate};
use crate::ui::{badge, kv, mark, print, receipt, table, Badge, UiContext};

/// Characters of surrounding text shown around a highlight.
const CONTEXT_RADIUS: usize = 24;

pub async fn handle_annotate(
    ctx: &AppContext<'_>,
    command: &AnnotateSubcommand,
) -> anyhow::Result<()> {
    match command {
        AnnotateSubcommand::Show { url, doc, json } => handle_show(ctx, url, doc, *json).await,
        AnnotateSubcommand::Highlight { url, doc, quote } => {
            let (document, mut session) = open_session(ctx, url, doc).await?;
            let selection = select_quote(&document, &quote.quote, quote.occurrence)?;
            let highlight = session.add_highlight(&document, &selection).await?;
            if !ctx.quiet() {
                let ui = ctx.ui(false);
                let text = document.span_text(&highlight.span)?;
                print(
                    &ui,
                    &receipt(
                        &ui,
                        "Highlight saved",
                        &[
                            ("Text", truncate(&text, 60)),
                            ("Highlights", session.highlights().len().to_string()),
                        ],
                    ),
                );
            }
            Ok(())
        }
        AnnotateSubcommand::Clear { url, doc } => {
            let (_, mut session) = open_session(ctx, url, doc).await?;
            let removed = session.clear_highlights().await?;
            if !ctx.quiet() {
                let ui = ctx.ui(false);
                print(
                    &ui,
                    &receipt(&ui, "Highlights cleared", &[("Removed", removed.to_string())]),
                );
            }
            Ok(())
        }
        AnnotateSubcommand::Note(args) => handle_note(ctx, args).await,
        AnnotateSubcommand::RemoveNote { url, doc, id } => {
            let id = parse_uuid(id)?;
            let (_, mut session) = open_session(ctx, url, doc).await?;
            if !session.remove_note(id).await? {
                return Err(CliError::not_found(
                    format!("Note {} not found on {}", id, url),
                    "Run `gloss annotate show` to list note ids.",
                )
                .into());
            }
            if !ctx.quiet() {
                let ui = ctx.ui(false);
                print(&ui, &receipt(&ui, "Note removed", &[("Id", id.to_string())]));
            }
            Ok(())
        }
        AnnotateSubcommand::Pages { json } => handle_pages(ctx, *json).await,
    }
}

async fn open_session(
    ctx: &AppContext<'_>,
    url: &str,
    doc: &DocumentArgs,
) -> anyhow::Result<(Document, PageSession)> {
    let document = read_document(&doc.file)?;
    let gloss = ctx.open().await?;
    let session = gloss.open_page(url, &document).await?;
    Ok((document, session))
}

async fn handle_note(ctx: &AppContext<'_>, args: &NoteArgs) -> anyhow::Result<()> {
    let tags: Vec<String> = args.tag.iter().flat_map(|raw| split_tags(raw)).collect();
    let mut note = match (args.x, args.y) {
        (Some(x), Some(y)) => NewNote::point(args.text.clone(), Position::new(x, y)),
        _ => NewNote::page(args.text.clone()),
    }
    .with_tags(tags);
    if let Some(id) = &args.id {
        note = note.with_id(parse_uuid(id)?);
    }

    let (_, mut session) = open_session(ctx, &args.url, &args.doc).await?;
    let saved = session.upsert_note(note).await?;
    if !ctx.quiet() {
        let ui = ctx.ui(false);
        let scope = if saved.is_page_note() { "page" } else { "point" };
        print(
            &ui,
            &receipt(
                &ui,
                "Note saved",
                &[
                    ("Id", saved.id.to_string()),
                    ("Scope", scope.to_string()),
                    ("Tags", saved.tags.join(", ")),
                ],
            ),
        );
    }
    Ok(())
}

async fn handle_show(
    ctx: &AppContext<'_>,
    url: &str,
    doc: &DocumentArgs,
    json: bool,
) -> anyhow::Result<()> {
    let (document, session) = open_session(ctx, url, doc).await?;
    let set = session.annotations();

    let ui = ctx.ui(json);
    if ui.mode.is_json() {
        let highlights = session
            .highlights()
            .iter()
            .map(|h| -> anyhow::Result<serde_json::Value> {
                Ok(json!({
                    "anchor": h.anchor,
                    "text": document.span_text(&h.span)?,
                }))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        let output = json!({
            "url": session.url(),
            "title": set.title,
            "locked": session.is_locked(),
            "highlights": highlights,
            "page_note": set.page_note,
            "notes": set.notes,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", kv(&ui, "Url", session.url()));
    if let Some(title) = &set.title {
        println!("{}", kv(&ui, "Title", title));
    }
    if session.is_locked() {
        println!(
            "{}",
            badge(&ui, Badge::Warn, "Annotations are encrypted; set a passphrase")
        );
        return Ok(());
    }

    println!("{}", kv(&ui, "Highlights", &session.highlights().len().to_string()));
    for highlight in session.highlights() {
        println!("  {}", render_highlight(&ui, &document, highlight)?);
    }

    if let Some(note) = &set.page_note {
        println!("{}", kv(&ui, "Page note", &note.text));
    }
    if !set.notes.is_empty() {
        let rows: Vec<Vec<String>> = set.notes.iter().map(note_row).collect();
        println!("{}", table(&ui, &["Id", "Position", "Tags", "Text"], &rows));
    }
    Ok(())
}

async fn handle_pages(ctx: &AppContext<'_>, json: bool) -> anyhow::Result<()> {
    let gloss = ctx.open().await?;
    let pages = gloss.list_pages().await?;
    let ui = ctx.ui(json);
    if ui.mode.is_json() {
        println!("{}", serde_json::to_string_pretty(&pages)?);
        return Ok(());
    }

    if pages.is_empty() {
        if !ctx.quiet() {
            print(&ui, &kv(&ui, "Pages", "none"));
        }
        return Ok(());
    }
    let rows: Vec<Vec<String>> = pages
        .iter()
        .map(|page| {
            vec![
                page.url.clone(),
                page.title.clone().unwrap_or_default(),
                page.tags.join(","),
                page.updated_at.format("%Y-%m-%d %H:%M").to_string(),
            ]
        })
        .collect();
    println!("{}", table(&ui, &["Url", "Title", "Tags", "Updated"], &rows));
    Ok(())
}

fn render_highlight(
    ui: &UiContext,
    doc: &Document,
    highlight: &Highlight,
) -> anyhow::Result<String> {
    match passage(doc, &highlight.span, CONTEXT_RADIUS) {
        Some((text, from, to)) => Ok(mark(ui, &text, from, to)),
        None => Ok(doc.span_text(&highlight.span)?),
    }
}

/// Body text around `span`, with the span's bounds inside it.
fn passage(doc: &Document, span: &Span, radius: usize) -> Option<(String, usize, usize)> {
    let map = TextMap::build(doc, doc.body());
    let start = map.offset_of(span.start).ok()?;
    let end = map.offset_of(span.end).ok()?;
    let from = start.saturating_sub(radius);
    let to = (end + radius).min(map.len());
    let text: String = map
        .slice(from, to)
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();
    Some((text, start - from, end - from))
}

fn note_row(note: &Note) -> Vec<String> {
    let position = note
        .position
        .map(|p| format!("{:.0},{:.0}", p.x, p.y))
        .unwrap_or_default();
    vec![
        note.id.to_string()[..8].to_string(),
        position,
        note.tags.join(","),
        truncate(&note.text, 48),
    ]
}
