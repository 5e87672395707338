//! Outline value types and the offset-to-line index.

use std::ops::Range;

/// One heading in an extracted outline.
///
/// Produced fresh on every extraction pass. The `id` is a deterministic
/// function of the heading's start offset, so it is stable for a given
/// document snapshot but not across edits that shift offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingItem {
    /// Snapshot-stable identifier, `"heading-<from>"`.
    pub id: String,
    /// Normalized label with inline markdown formatting removed.
    pub text: String,
    /// Heading level, 1-6.
    pub level: u8,
    /// Start byte offset of the heading construct in the source.
    pub from: usize,
    /// End byte offset (half-open); always greater than `from`.
    pub to: usize,
    /// Zero-based line number of `from`.
    pub line: usize,
    /// URL-safe slug, unique within one extraction pass.
    pub anchor: String,
}

impl HeadingItem {
    /// The byte range the heading construct occupies.
    pub const fn range(&self) -> Range<usize> {
        self.from..self.to
    }
}

/// Derive the snapshot-stable id for a heading starting at `from`.
pub fn heading_id(from: usize) -> String {
    format!("heading-{from}")
}

/// Monotonic offset-to-line resolver.
///
/// Built once per extraction pass in O(n); queries are O(log n).
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset of the start of each line, ascending, first entry 0.
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            line_starts,
            len: text.len(),
        }
    }

    /// Zero-based line containing the byte at `offset`.
    ///
    /// Offsets past the end of the text resolve to the last line.
    pub fn line_of(&self, offset: usize) -> usize {
        self.line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1)
    }

    /// Byte offset of the start of a zero-based line.
    ///
    /// Lines past the end resolve to the text length.
    pub fn offset_of_line(&self, line: usize) -> usize {
        self.line_starts.get(line).copied().unwrap_or(self.len)
    }

    /// Total number of lines.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}
