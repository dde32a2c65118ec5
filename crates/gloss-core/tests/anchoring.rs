use std::sync::Arc;

use proptest::prelude::*;
use secrecy::SecretString;

use gloss_core::crypto::KeyDerivationParams;
use gloss_core::document::TextMap;
use gloss_core::storage::SqliteMedium;
use gloss_core::{AnchorCodec, AnchorPolicy, Document, Gloss, NodeId, Span};

/// html > [head > title, body > p* ] where every paragraph alternates plain
/// text segments and `<em>` wrapped ones.
fn build(paragraphs: &[Vec<String>]) -> (Document, NodeId, NodeId) {
    let mut doc = Document::new("html");
    let root = doc.root();
    let head = doc.append_element(root, "head").unwrap();
    let title = doc.append_element(head, "title").unwrap();
    doc.append_text(title, "t").unwrap();
    let body = doc.append_element(root, "body").unwrap();
    for segments in paragraphs {
        let p = doc.append_element(body, "p").unwrap();
        for (i, segment) in segments.iter().enumerate() {
            if i % 2 == 1 {
                let em = doc.append_element(p, "em").unwrap();
                doc.append_text(em, segment).unwrap();
            } else {
                doc.append_text(p, segment).unwrap();
            }
        }
    }
    (doc, body, title)
}

fn paragraphs() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(prop::collection::vec("[a-zé ]{0,6}", 1..4), 1..5)
}

fn selection(doc: &Document, a: usize, b: usize) -> Span {
    let map = TextMap::build(doc, doc.body());
    Span::new(map.locate(a).unwrap(), map.locate(b).unwrap())
}

proptest! {
    #[test]
    fn decode_of_encode_returns_selected_text(
        paras in paragraphs(),
        x in 0usize..200,
        y in 0usize..200,
        narrow: bool,
    ) {
        let (doc, body, _) = build(&paras);
        let len = TextMap::build(&doc, body).len();
        let (a, b) = (x % (len + 1), y % (len + 1));
        prop_assume!(a != b);

        let policy = if narrow { AnchorPolicy::CommonAncestor } else { AnchorPolicy::DocumentBody };
        let codec = AnchorCodec::new(policy);
        let expected = TextMap::build(&doc, body).slice(a.min(b), a.max(b));

        let anchor = codec.encode(&doc, &selection(&doc, a, b)).unwrap();
        prop_assert!(anchor.start < anchor.end);
        let span = codec.decode(&doc, &anchor).unwrap();
        prop_assert_eq!(doc.span_text(&span).unwrap(), expected);
    }

    #[test]
    fn unrelated_insertions_keep_anchor_valid(
        paras in paragraphs(),
        x in 0usize..200,
        y in 0usize..200,
        at in 0usize..10,
        narrow: bool,
    ) {
        let (mut doc, body, title) = build(&paras);
        let len = TextMap::build(&doc, body).len();
        let (a, b) = (x % (len + 1), y % (len + 1));
        prop_assume!(a != b);

        let policy = if narrow { AnchorPolicy::CommonAncestor } else { AnchorPolicy::DocumentBody };
        let codec = AnchorCodec::new(policy);
        let anchor = codec.encode(&doc, &selection(&doc, a, b)).unwrap();
        let expected = TextMap::build(&doc, body).slice(a.min(b), a.max(b));

        let index = at % (doc.children(body).unwrap().len() + 1);
        doc.insert_element(body, index, "aside").unwrap();
        doc.append_text(title, " (updated)").unwrap();

        let span = codec.decode(&doc, &anchor).unwrap();
        prop_assert_eq!(doc.span_text(&span).unwrap(), expected);
    }
}

#[test]
fn test_shrinking_below_end_is_none() {
    let mut doc = Document::parse_xhtml(
        "<html><body><p>First paragraph.</p><p id=\"x\">Second one.</p></body></html>",
    )
    .unwrap();
    let codec = AnchorCodec::default();
    let anchor = codec
        .encode(&doc, &doc.find_text("one", 0).unwrap())
        .unwrap();

    let second = doc.element_children(doc.body()).nth(1).unwrap();
    let text = doc.children(second).unwrap()[0];
    doc.set_text(text, "Second").unwrap();

    assert!(codec.decode(&doc, &anchor).is_none());
}

#[test]
fn test_anchor_survives_reparse_with_extra_markup() {
    let before = Document::parse_xhtml(
        "<html><head><title>A</title></head><body><p>One <b>two</b> three</p></body></html>",
    )
    .unwrap();
    let after = Document::parse_xhtml(
        "<html><head><title>A</title><meta charset=\"utf-8\"/></head>\
         <body><div class=\"ad\"></div><p>One <b>two</b> three</p></body></html>",
    )
    .unwrap();

    let codec = AnchorCodec::default();
    let anchor = codec
        .encode(&before, &before.find_text("two thr", 0).unwrap())
        .unwrap();
    let wire = serde_json::to_string(&anchor).unwrap();
    let anchor = serde_json::from_str(&wire).unwrap();

    let span = codec.decode(&after, &anchor).unwrap();
    assert_eq!(after.span_text(&span).unwrap(), "two thr");
}

#[tokio::test]
async fn test_overlapping_highlights_persist_and_decode() {
    let dir = tempfile::tempdir().unwrap();
    let medium = SqliteMedium::open(&dir.path().join("gloss.db")).unwrap();
    let params = KeyDerivationParams::new(b"gloss-integration-salt".to_vec(), 100_000).unwrap();
    let gloss = Gloss::new(Arc::new(medium), params, AnchorPolicy::DocumentBody);
    gloss
        .set_passphrase(&SecretString::from("correctpass".to_string()))
        .unwrap();

    let url = "https://example.org/essay";
    let doc = Document::parse_xhtml(
        "<html><body><p>It was the best of times, it was the worst of times.</p></body></html>",
    )
    .unwrap();

    let mut session = gloss.open_page(url, &doc).await.unwrap();
    session
        .add_highlight(&doc, &doc.find_text("best of times, it was", 0).unwrap())
        .await
        .unwrap();
    session
        .add_highlight(&doc, &doc.find_text("it was the worst", 0).unwrap())
        .await
        .unwrap();

    let stored = gloss.load_annotations(url).await.unwrap();
    assert_eq!(stored.highlights.len(), 2);
    assert!(stored.highlights[0].end > stored.highlights[1].start);

    let reopened = gloss.open_page(url, &doc).await.unwrap();
    let texts: Vec<String> = reopened
        .highlights()
        .iter()
        .map(|h| doc.span_text(&h.span).unwrap())
        .collect();
    assert_eq!(texts, vec!["best of times, it was", "it was the worst"]);
}
