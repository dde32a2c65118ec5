//! `gloss anchor`: anchors against a document file, no store involved.

use gloss_core::{AnchorCodec, GlossError};

use crate::app::AppContext;
use crate::cli::AnchorSubcommand;
use crate::helpers::{parse_anchor, read_document, select_quote};

pub fn handle_anchor(ctx: &AppContext<'_>, command: &AnchorSubcommand) -> anyhow::Result<()> {
    let codec = AnchorCodec::new(ctx.config()?.anchor.policy);
    match command {
        AnchorSubcommand::Encode { doc, quote } => {
            let document = read_document(&doc.file)?;
            let selection = select_quote(&document, &quote.quote, quote.occurrence)?;
            let anchor = codec.encode(&document, &selection)?;
            println!("{}", serde_json::to_string(&anchor)?);
        }
        AnchorSubcommand::Decode { doc, anchor } => {
            let document = read_document(&doc.file)?;
            let anchor = parse_anchor(anchor)?;
            let span = codec.decode(&document, &anchor).ok_or_else(|| {
                GlossError::AnchorUnresolvable("anchor does not apply to this document".to_string())
            })?;
            println!("{}", document.span_text(&span)?);
        }
    }
    Ok(())
}
