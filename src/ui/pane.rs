//! The document pane: a read-only editor view over the raw markdown
//! source, with soft-wrap layout and scroll state.
//!
//! The pane implements [`EditorView`], making it the in-process adapter the
//! scroll-convergence controller drives. Soft-wrap row geometry is only
//! available after [`DocumentPane::ensure_layout`] has run for the current
//! width; until then measurements report unmeasurable, which is exactly the
//! window the convergence retries cover.

use std::ops::Range;

use unicode_width::UnicodeWidthChar;

use super::viewport::Viewport;
use crate::document::LineIndex;
use crate::scroll::{EditorView, Geometry, ScrollAlign};

/// One visual row of the pane, attributed to its source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneRow {
    /// Zero-based source line this row belongs to.
    pub line: usize,
    /// The row's text slice.
    pub text: String,
}

#[derive(Debug)]
struct RowLayout {
    width: u16,
    /// First visual row of each source line, ascending.
    first_row: Vec<usize>,
    total_rows: usize,
}

/// Read-only document view with soft wrap.
#[derive(Debug)]
pub struct DocumentPane {
    source: String,
    lines: Vec<String>,
    line_index: LineIndex,
    viewport: Viewport,
    selection: Range<usize>,
    layout: Option<RowLayout>,
    focused: bool,
}

impl DocumentPane {
    pub fn new(source: String, width: u16, height: u16) -> Self {
        let lines = split_lines(&source);
        let line_index = LineIndex::new(&source);
        Self {
            viewport: Viewport::new(width, height, lines.len()),
            lines,
            line_index,
            selection: 0..0,
            layout: None,
            focused: true,
            source,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Replace the source text, keeping the scroll position where possible.
    pub fn set_source(&mut self, source: String) {
        self.lines = split_lines(&source);
        self.line_index = LineIndex::new(&source);
        self.source = source;
        let len = self.source.len();
        self.selection = self.selection.start.min(len)..self.selection.end.min(len);
        self.layout = None;
    }

    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub const fn is_focused(&self) -> bool {
        self.focused
    }

    pub const fn blur(&mut self) {
        self.focused = false;
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        if width != self.viewport.width() {
            self.layout = None;
        }
        self.viewport.resize(width, height);
    }

    pub fn scroll_up(&mut self, n: usize) {
        self.viewport.scroll_up(n);
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.viewport.scroll_down(n);
    }

    pub fn page_up(&mut self) {
        self.viewport.page_up();
    }

    pub fn page_down(&mut self) {
        self.viewport.page_down();
    }

    pub fn half_page_up(&mut self) {
        self.viewport.half_page_up();
    }

    pub fn half_page_down(&mut self) {
        self.viewport.half_page_down();
    }

    pub fn go_to_top(&mut self) {
        self.viewport.go_to_top();
    }

    pub fn go_to_bottom(&mut self) {
        self.viewport.go_to_bottom();
    }

    pub const fn layout_ready(&self) -> bool {
        self.layout.is_some()
    }

    /// Drop the current soft-wrap layout (document or width changed).
    pub fn invalidate_layout(&mut self) {
        self.layout = None;
    }

    /// Build the soft-wrap row layout for `width` if it is not current.
    /// Runs once per width change; O(n) over the text.
    pub fn ensure_layout(&mut self, width: u16) {
        let width = width.max(1);
        if self
            .layout
            .as_ref()
            .is_some_and(|layout| layout.width == width)
        {
            return;
        }
        let mut first_row = Vec::with_capacity(self.lines.len());
        let mut row = 0;
        for line in &self.lines {
            first_row.push(row);
            row += wrapped_row_count(line, width);
        }
        self.layout = Some(RowLayout {
            width,
            first_row,
            total_rows: row,
        });
        self.viewport.set_total_rows(row);
    }

    /// Visual row of a byte offset, when layout is current.
    pub fn row_of_offset(&self, offset: usize) -> Option<usize> {
        let layout = self.layout.as_ref()?;
        let line = self.line_index.line_of(offset);
        let base = *layout.first_row.get(line)?;
        let line_start = self.line_index.offset_of_line(line);
        let text = self.lines.get(line)?;
        let mut prefix = offset.saturating_sub(line_start).min(text.len());
        while !text.is_char_boundary(prefix) {
            prefix -= 1;
        }
        let prefix_width: usize = text[..prefix].chars().filter_map(UnicodeWidthChar::width).sum();
        Some(base + prefix_width / layout.width as usize)
    }

    /// The currently visible rows, wrapped to the layout width.
    pub fn visible_rows(&self) -> Vec<PaneRow> {
        let Some(layout) = self.layout.as_ref() else {
            return Vec::new();
        };
        let visible = self.viewport.visible_range();
        let mut rows = Vec::with_capacity(visible.len());
        // First line whose rows can reach the window.
        let start_line = layout
            .first_row
            .partition_point(|&r| r <= visible.start)
            .saturating_sub(1);
        let mut row = layout.first_row.get(start_line).copied().unwrap_or(0);
        for (i, line) in self.lines.iter().enumerate().skip(start_line) {
            if row >= visible.end {
                break;
            }
            for chunk in wrap_line(line, layout.width) {
                if row >= visible.end {
                    break;
                }
                if row >= visible.start {
                    rows.push(PaneRow {
                        line: i,
                        text: chunk,
                    });
                }
                row += 1;
            }
        }
        rows
    }
}

impl EditorView for DocumentPane {
    fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    fn set_selection(&mut self, range: Range<usize>) {
        let len = self.source.len();
        let start = range.start.min(len);
        self.selection = start..range.end.clamp(start, len);
    }

    fn scroll_into_view(&mut self, range: Range<usize>, align: ScrollAlign) {
        // Without current layout the row is unknowable; the convergence
        // protocol re-issues the command after the next layout pass.
        let Some(row) = self.row_of_offset(range.start) else {
            return;
        };
        match align {
            ScrollAlign::Start => self.viewport.set_offset(row),
            ScrollAlign::Nearest => self.viewport.bring_into_view(row),
        }
    }

    fn force_scroll_top(&mut self, top: f32) {
        let row = top.max(0.0).round() as usize;
        self.viewport.set_offset(row);
    }

    fn measure_geometry(&self, range: Range<usize>) -> Option<Geometry> {
        let block_top = self.row_of_offset(range.start)? as f32;
        Some(Geometry {
            viewport_top: self.viewport.offset() as f32,
            block_top,
        })
    }

    fn focus(&mut self) {
        self.focused = true;
    }
}

fn split_lines(source: &str) -> Vec<String> {
    source.lines().map(ToOwned::to_owned).collect()
}

/// Greedy character wrap by display width. Every line yields at least one
/// row; wide characters that would straddle the boundary move to the next
/// row whole.
fn wrap_line(line: &str, width: u16) -> Vec<String> {
    let width = usize::from(width.max(1));
    let mut rows = Vec::new();
    let mut current = String::new();
    let mut used = 0;
    for ch in line.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width && !current.is_empty() {
            rows.push(std::mem::take(&mut current));
            used = 0;
        }
        current.push(ch);
        used += w;
    }
    rows.push(current);
    rows
}

fn wrapped_row_count(line: &str, width: u16) -> usize {
    wrap_line(line, width).len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scroll::{ScrollConvergence, ScrollPolicy, ViewId};

    fn pane_with(source: &str, width: u16, height: u16) -> DocumentPane {
        let mut pane = DocumentPane::new(source.to_string(), width, height);
        pane.ensure_layout(width);
        pane
    }

    #[test]
    fn test_wrap_line_counts_rows() {
        assert_eq!(wrap_line("", 10), vec![String::new()]);
        assert_eq!(wrap_line("short", 10), vec!["short".to_string()]);
        assert_eq!(
            wrap_line("0123456789abcde", 10),
            vec!["0123456789".to_string(), "abcde".to_string()]
        );
    }

    #[test]
    fn test_wrap_line_wide_chars_do_not_straddle() {
        // Three double-width chars at width 5: two fit, the third wraps.
        let rows = wrap_line("\u{4e00}\u{4e01}\u{4e02}", 5);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], "\u{4e00}\u{4e01}");
    }

    #[test]
    fn test_row_of_offset_accounts_for_wrapping() {
        // Line 0 wraps into 3 rows at width 4; line 1 starts at row 3.
        let pane = pane_with("abcdefghij\nsecond", 4, 10);
        assert_eq!(pane.row_of_offset(0), Some(0));
        assert_eq!(pane.row_of_offset(5), Some(1));
        assert_eq!(pane.row_of_offset(11), Some(3));
    }

    #[test]
    fn test_measure_unready_before_layout() {
        let pane = DocumentPane::new("# One\n\ntext".to_string(), 80, 24);
        assert!(pane.measure_geometry(0..5).is_none());
    }

    #[test]
    fn test_measure_after_layout() {
        let pane = pane_with("# One\n\n## Two", 80, 24);
        let geometry = pane.measure_geometry(7..13).unwrap();
        assert_eq!(geometry.viewport_top, 0.0);
        assert_eq!(geometry.block_top, 2.0);
    }

    #[test]
    fn test_visible_rows_window() {
        let src = (0..50).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let mut pane = pane_with(&src, 80, 5);
        pane.scroll_down(10);
        let rows = pane.visible_rows();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].text, "line 10");
        assert_eq!(rows[0].line, 10);
    }

    #[test]
    fn test_resize_to_new_width_invalidates_layout() {
        let mut pane = pane_with("some text here", 80, 24);
        assert!(pane.layout_ready());
        pane.resize(40, 24);
        assert!(!pane.layout_ready());
    }

    /// End-to-end convergence against the real adapter: the jump lands
    /// while layout is stale, the first attempt cannot measure, and the
    /// second corrects the viewport after relayout shifted every row.
    #[test]
    fn test_convergence_corrects_after_relayout() {
        let mut src = String::new();
        for _ in 0..30 {
            src.push_str("a wrapping paragraph line that is fairly long\n");
        }
        src.push_str("# Target\n");
        for _ in 0..30 {
            src.push_str("trailing body text that also wraps when narrowed\n");
        }
        let mut pane = pane_with(&src, 80, 10);
        let from = src.find("# Target").unwrap();
        let to = from + "# Target".len();

        let mut ctl = ScrollConvergence::new(ScrollPolicy::default());
        let view = ViewId(0);
        ctl.begin(view, &mut pane, from..to, false, 0);
        let jumped_to = pane.viewport().offset();
        assert_eq!(jumped_to, pane.row_of_offset(from).unwrap());

        // Narrower pane: every line now wraps, pushing the target down.
        pane.resize(30, 10);
        ctl.tick(view, &mut pane, 160); // unmeasurable, rescheduled
        assert!(ctl.has_session(view));

        pane.ensure_layout(30);
        ctl.tick(view, &mut pane, 160 + 260);
        let target_row = pane.row_of_offset(from).unwrap();
        assert_eq!(pane.viewport().offset(), target_row);
        assert!(!ctl.has_session(view));
    }
}
