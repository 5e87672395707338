//! Outline extraction with comrak.
//!
//! Parses a raw text buffer into an ordered sequence of [`HeadingItem`]s.
//! The walk over the syntax tree is worklist-based rather than recursive so
//! pathological nesting cannot exhaust the stack.

use anyhow::Result;
use comrak::nodes::{AstNode, NodeValue};
use comrak::{Arena, Options, parse_document};

use super::slug::SlugAllocator;
use super::types::{HeadingItem, LineIndex, heading_id};

/// Extract the heading outline of `text`.
///
/// Never fails: any internal extraction error is logged and an empty
/// outline is returned.
///
/// # Example
///
/// ```
/// use headway::document::extract;
///
/// let outline = extract("# One\n\nbody\n\n## Two\n");
/// assert_eq!(outline.len(), 2);
/// assert_eq!(outline[0].anchor, "one");
/// assert_eq!(outline[1].level, 2);
/// ```
pub fn extract(text: &str) -> Vec<HeadingItem> {
    match try_extract(text) {
        Ok(items) => items,
        Err(err) => {
            tracing::warn!("outline extraction failed: {err:#}");
            Vec::new()
        }
    }
}

fn try_extract(text: &str) -> Result<Vec<HeadingItem>> {
    let arena = Arena::new();
    let root = parse_document(&arena, text, &parse_options());
    let index = LineIndex::new(text);
    let mut slugs = SlugAllocator::new();
    let mut items = Vec::new();

    // Document-order walk over block nodes. Headings can sit inside block
    // quotes and list items, so descend into every non-heading block.
    let mut stack: Vec<&AstNode> = Vec::new();
    push_children(&mut stack, root);

    while let Some(node) = stack.pop() {
        let heading = {
            let data = node.data.borrow();
            match &data.value {
                NodeValue::Heading(heading) => Some((heading.level, data.sourcepos)),
                _ => None,
            }
        };
        let Some((level, sourcepos)) = heading else {
            push_children(&mut stack, node);
            continue;
        };
        if !(1..=6).contains(&level) {
            continue;
        }
        let from = offset_at(&index, sourcepos.start.line, sourcepos.start.column, text);
        let to = end_offset_at(&index, sourcepos.end.line, sourcepos.end.column, text);
        if to <= from {
            tracing::debug!(
                line = sourcepos.start.line,
                "skipping heading with degenerate source range"
            );
            continue;
        }
        let label = collect_inline_text(node);
        if label.is_empty() {
            continue;
        }
        anyhow::ensure!(
            items.last().is_none_or(|prev: &HeadingItem| prev.from < from),
            "heading positions out of document order at offset {from}"
        );
        let id = heading_id(from);
        let anchor = slugs.allocate(&label, &id);
        items.push(HeadingItem {
            id,
            text: label,
            level,
            from,
            to,
            line: index.line_of(from),
            anchor,
        });
    }

    Ok(items)
}

/// GFM extensions matching the documents this tool is pointed at. Header id
/// generation stays off; anchors are allocated here, not by the parser.
fn parse_options() -> Options {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;
    options
}

fn push_children<'a>(stack: &mut Vec<&'a AstNode<'a>>, node: &'a AstNode<'a>) {
    // Reversed so popping yields document order.
    let mut children: Vec<_> = node.children().collect();
    children.reverse();
    stack.extend(children);
}

/// Byte offset of a 1-based line/column start position.
fn offset_at(index: &LineIndex, line: usize, column: usize, text: &str) -> usize {
    let line_start = index.offset_of_line(line.saturating_sub(1));
    (line_start + column.saturating_sub(1)).min(text.len())
}

/// Half-open end offset for a 1-based line and inclusive end column.
fn end_offset_at(index: &LineIndex, line: usize, column: usize, text: &str) -> usize {
    let line_start = index.offset_of_line(line.saturating_sub(1));
    (line_start + column).min(text.len())
}

/// Collect the human-readable label of a heading node.
///
/// Keeps textual content only: link labels and image alt text survive,
/// their targets do not. Emphasis and code markers were already consumed
/// by the parser, whose word-boundary rules leave intraword underscores
/// like `snake_case` untouched. Raw inline markup is dropped wholesale,
/// and whitespace runs collapse to single spaces.
fn collect_inline_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut out = String::new();
    let mut stack: Vec<&'a AstNode<'a>> = Vec::new();
    push_children(&mut stack, node);

    while let Some(inline) = stack.pop() {
        match &inline.data.borrow().value {
            NodeValue::Text(text) => out.push_str(text),
            NodeValue::Code(code) => out.push_str(&code.literal),
            NodeValue::SoftBreak | NodeValue::LineBreak => out.push(' '),
            NodeValue::HtmlInline(_) => {}
            // Emphasis, strong, strikethrough, links, images, footnote
            // bodies: recurse into the label content.
            _ => push_children(&mut stack, inline),
        }
    }

    normalize_whitespace(&out)
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atx_levels() {
        let outline = extract("# One\n\n## Two\n\n###### Six\n");
        let levels: Vec<u8> = outline.iter().map(|h| h.level).collect();
        assert_eq!(levels, vec![1, 2, 6]);
    }

    #[test]
    fn test_setext_levels_one_and_two() {
        let outline = extract("Title\n=====\n\nSection\n-------\n");
        assert_eq!(outline.len(), 2);
        assert_eq!(outline[0].level, 1);
        assert_eq!(outline[0].text, "Title");
        assert_eq!(outline[1].level, 2);
        assert_eq!(outline[1].text, "Section");
    }

    #[test]
    fn test_ranges_are_half_open_and_ordered() {
        let src = "# First\n\ntext\n\n## Second\n";
        let outline = extract(src);
        assert_eq!(outline.len(), 2);
        for h in &outline {
            assert!(h.to > h.from);
        }
        assert!(outline[0].from < outline[1].from);
        assert!(src[outline[0].from..outline[0].to].starts_with("# First"));
        assert!(src[outline[1].from..outline[1].to].starts_with("## Second"));
    }

    #[test]
    fn test_line_numbers_are_zero_based() {
        let outline = extract("intro\n\n# Heading\n");
        assert_eq!(outline.len(), 1);
        assert_eq!(outline[0].line, 2);
    }

    #[test]
    fn test_ids_derive_from_start_offset() {
        let outline = extract("# A\n\n## B\n");
        assert_eq!(outline[0].id, format!("heading-{}", outline[0].from));
        assert_eq!(outline[1].id, format!("heading-{}", outline[1].from));
    }

    #[test]
    fn test_duplicate_text_gets_numbered_anchors() {
        let outline = extract("# Introduction\n\n## Introduction\n\n### Introduction\n");
        let anchors: Vec<&str> = outline.iter().map(|h| h.anchor.as_str()).collect();
        assert_eq!(anchors, vec!["introduction", "introduction-2", "introduction-3"]);
    }

    #[test]
    fn test_embedded_markup_is_dropped() {
        let outline = extract("## Hello & <world>\n");
        assert_eq!(outline.len(), 1);
        assert_eq!(outline[0].text, "Hello &");
        assert_eq!(outline[0].level, 2);
    }

    #[test]
    fn test_word_boundary_emphasis() {
        let outline = extract("# This is _italic_ text with snake_case\n");
        assert_eq!(outline[0].text, "This is italic text with snake_case");
    }

    #[test]
    fn test_bold_markers_removed() {
        let outline = extract("# **Bold** and __also bold__ and *starred*\n");
        assert_eq!(outline[0].text, "Bold and also bold and starred");
    }

    #[test]
    fn test_link_keeps_label_only() {
        let outline = extract("# See [the docs](https://example.com/x) here\n");
        assert_eq!(outline[0].text, "See the docs here");
    }

    #[test]
    fn test_reference_link_keeps_label_only() {
        let outline = extract("# See [the docs][ref]\n\n[ref]: https://example.com\n");
        assert_eq!(outline[0].text, "See the docs");
    }

    #[test]
    fn test_image_keeps_alt_only() {
        let outline = extract("# Logo ![alt text](logo.png) end\n");
        assert_eq!(outline[0].text, "Logo alt text end");
    }

    #[test]
    fn test_inline_code_kept_verbatim() {
        let outline = extract("# Run `cargo build --release` now\n");
        assert_eq!(outline[0].text, "Run cargo build --release now");
    }

    #[test]
    fn test_escapes_resolve_to_literals() {
        let outline = extract(r"# Not \*emphasis\* here");
        assert_eq!(outline[0].text, "Not *emphasis* here");
    }

    #[test]
    fn test_empty_after_stripping_is_discarded() {
        let outline = extract("# <br>\n\n# Real\n");
        assert_eq!(outline.len(), 1);
        assert_eq!(outline[0].text, "Real");
    }

    #[test]
    fn test_punctuation_heading_uses_fallback_anchor() {
        let outline = extract("# !!!\n");
        assert_eq!(outline.len(), 1);
        assert_eq!(outline[0].anchor, outline[0].id);
    }

    #[test]
    fn test_headings_inside_blockquote_found() {
        let outline = extract("> # Quoted heading\n");
        assert_eq!(outline.len(), 1);
        assert_eq!(outline[0].text, "Quoted heading");
    }

    #[test]
    fn test_heading_in_fenced_code_ignored() {
        let outline = extract("```\n# not a heading\n```\n\n# real\n");
        assert_eq!(outline.len(), 1);
        assert_eq!(outline[0].text, "real");
    }

    #[test]
    fn test_whitespace_collapsed() {
        let outline = extract("#   Spaced \t out   heading\n");
        assert_eq!(outline[0].text, "Spaced out heading");
    }

    #[test]
    fn test_no_headings_yields_empty() {
        assert!(extract("just a paragraph\n\nanother\n").is_empty());
        assert!(extract("").is_empty());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;
        use std::collections::HashSet;

        proptest! {
            #[test]
            fn extraction_invariants_hold(
                src in "[a-zA-Z0-9#_*`\\[\\]()!<>&. \n-]{0,400}",
            ) {
                let outline = extract(&src);
                let mut anchors = HashSet::new();
                let mut ids = HashSet::new();
                let mut prev_from = None;
                for h in &outline {
                    prop_assert!(h.to > h.from);
                    prop_assert!(h.to <= src.len());
                    prop_assert!((1..=6).contains(&h.level));
                    prop_assert!(anchors.insert(h.anchor.clone()));
                    prop_assert!(ids.insert(h.id.clone()));
                    if let Some(prev) = prev_from {
                        prop_assert!(h.from > prev);
                    }
                    prev_from = Some(h.from);
                }
            }
        }
    }
}
