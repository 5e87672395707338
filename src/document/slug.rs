//! Anchor slug allocation.
//!
//! Slugs are derived from normalized heading text and deduplicated across
//! one extraction pass. Counting is sequential in document order; the
//! allocator never looks ahead at later headings.

use std::collections::{HashMap, HashSet};

/// Per-pass slug allocator.
///
/// Create one per extraction pass; the occurrence counts and the set of
/// issued anchors reset with it.
#[derive(Debug, Default)]
pub struct SlugAllocator {
    counts: HashMap<String, u32>,
    issued: HashSet<String>,
}

impl SlugAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an anchor for `text`, falling back to `fallback` when the
    /// text slugifies to nothing (e.g. punctuation-only headings).
    ///
    /// The first occurrence of a base slug is returned unchanged; the Nth
    /// subsequent occurrence (N >= 2) becomes `"<base>-N>"`. If a candidate
    /// is already taken by an earlier literal heading (a document can
    /// contain both `"Intro 2"` and two `"Intro"`s), the counter keeps
    /// advancing until the candidate is free.
    pub fn allocate(&mut self, text: &str, fallback: &str) -> String {
        let base = slugify(text);
        let base = if base.is_empty() {
            fallback.to_string()
        } else {
            base
        };

        let count = self.counts.entry(base.clone()).or_insert(0);
        *count += 1;
        let mut candidate = if *count == 1 {
            base.clone()
        } else {
            format!("{base}-{count}")
        };
        while !self.issued.insert(candidate.clone()) {
            *count += 1;
            candidate = format!("{base}-{count}");
        }
        candidate
    }
}

/// Lowercase, keep ASCII alphanumerics, collapse everything else to single
/// hyphens, trim leading/trailing hyphens.
fn slugify(s: &str) -> String {
    let mut out = String::new();
    let mut last_dash = false;
    for ch in s.chars() {
        let lower = ch.to_ascii_lowercase();
        if lower.is_ascii_alphanumeric() {
            out.push(lower);
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    out.trim_matches('-').to_string()
}
