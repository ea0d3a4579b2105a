//! DOM traversal over a parsed document: per-tag text extraction for
//! indexing, and whole-document text extraction for near-duplicate
//! detection.

use super::is_indexed_tag;
use html5ever::driver::ParseOpts;
use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// One occurrence of an indexed tag, in document order, with its own
/// (non-deduplicated against ancestors) text content.
pub struct TagText {
    pub tag: String,
    pub text: String,
    pub is_important: bool,
}

/// Parsed document: every indexed tag's text plus the full document's
/// concatenated text for similarity comparison.
pub struct ParsedDocument {
    pub tags: Vec<TagText>,
    pub full_text: String,
}

/// Parse `html` leniently — malformed markup is tolerated the same way
/// a browser tolerates it, matching the forgiving parser the original
/// system relied on.
pub fn parse(html: &str) -> ParsedDocument {
    let dom = parse_document(RcDom::default(), ParseOpts::default())
        .from_utf8()
        .read_from(&mut html.as_bytes())
        .unwrap_or_default();

    let mut tags = Vec::new();
    collect_tags(&dom.document, &mut tags);

    let mut full_text = String::new();
    collect_text_into(&dom.document, &mut full_text);

    ParsedDocument { tags, full_text }
}

fn collect_tags(handle: &Handle, out: &mut Vec<TagText>) {
    if let NodeData::Element { name, .. } = &handle.data {
        let tag_name = local_name(name);
        if is_indexed_tag(&tag_name) {
            let mut text = String::new();
            collect_text_into(handle, &mut text);
            out.push(TagText {
                is_important: super::is_important_tag(&tag_name),
                tag: tag_name,
                text,
            });
        }
    }
    for child in handle.children.borrow().iter() {
        collect_tags(child, out);
    }
}

fn collect_text_into(handle: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &handle.data {
        out.push_str(&contents.borrow());
        out.push(' ');
    }
    for child in handle.children.borrow().iter() {
        collect_text_into(child, out);
    }
}

fn local_name(name: &QualName) -> String {
    name.local.as_ref().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_important_and_text_tags_independently() {
        let doc = parse("<html><body><h1>Big <b>Bold</b> Title</h1><p>body text</p></body></html>");
        let h1 = doc.tags.iter().find(|t| t.tag == "h1").unwrap();
        assert!(h1.is_important);
        assert!(h1.text.contains("Big"));
        assert!(h1.text.contains("Bold"));

        let b = doc.tags.iter().find(|t| t.tag == "b").unwrap();
        assert!(b.is_important);
        assert!(b.text.contains("Bold"));

        let p = doc.tags.iter().find(|t| t.tag == "p").unwrap();
        assert!(!p.is_important);
        assert!(p.text.contains("body text"));
    }

    #[test]
    fn full_text_includes_untagged_content() {
        let doc = parse("<html><body>loose text<p>tagged</p></body></html>");
        assert!(doc.full_text.contains("loose text"));
        assert!(doc.full_text.contains("tagged"));
    }
}
