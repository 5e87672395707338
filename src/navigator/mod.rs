//! Outline navigator state.
//!
//! [`NavigatorState`] owns the live heading list shown in the panel: the
//! full sequence from the latest extraction, the free-text filter, the
//! selection, and duplicate-preview suppression. It is fed headings from
//! outside on every document change and holds no reference to the document
//! buffer itself.

mod debounce;

pub use debounce::Debouncer;

use crate::document::HeadingItem;

/// Delay before a filter edit is applied to the list.
pub const FILTER_DEBOUNCE_MS: u64 = 150;
/// Delay before a selection change emits a preview notification.
pub const PREVIEW_DEBOUNCE_MS: u64 = 30;

/// Filter, selection, and preview state for one open panel.
///
/// Invariant: when the filtered list is non-empty the selection references
/// a member of it; when the filtered list is empty the selection is absent.
/// Empty lists and missing selections are defined states, never errors.
#[derive(Debug, Default)]
pub struct NavigatorState {
    headings: Vec<HeadingItem>,
    filter_text: String,
    /// Indices into `headings`, ascending.
    filtered: Vec<usize>,
    selected: Option<String>,
    last_previewed: Option<String>,
}

impl NavigatorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The full (unfiltered) heading sequence.
    pub fn headings(&self) -> &[HeadingItem] {
        &self.headings
    }

    /// Replace the working sequence after a (re-)extraction.
    ///
    /// With `selected_id` omitted, the previous selection survives if its id
    /// still exists in the recomputed filtered list; otherwise the first
    /// filtered item is selected. Offsets shift under edits, so a surviving
    /// id means "a heading starting at the same offset", which is the
    /// accepted approximation of identity here.
    pub fn set_headings(&mut self, headings: Vec<HeadingItem>, selected_id: Option<&str>) {
        self.headings = headings;
        self.recompute_filtered();
        self.revalidate_selection(selected_id);
    }

    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    /// Apply a new filter query (case-insensitive substring match on the
    /// heading text, not the anchor). Debouncing happens at the UI
    /// boundary, not here.
    pub fn set_filter_text(&mut self, text: impl Into<String>) {
        self.filter_text = text.into();
        self.recompute_filtered();
        self.revalidate_selection(None);
    }

    /// The filtered headings, in document order.
    pub fn filtered(&self) -> impl Iterator<Item = &HeadingItem> {
        self.filtered.iter().map(|&i| &self.headings[i])
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// The currently selected heading, if any.
    pub fn selected(&self) -> Option<&HeadingItem> {
        let id = self.selected.as_deref()?;
        self.filtered().find(|h| h.id == id)
    }

    /// Position of the selection within the filtered list.
    pub fn selected_index(&self) -> Option<usize> {
        let id = self.selected.as_deref()?;
        self.filtered().position(|h| h.id == id)
    }

    /// Select a specific filtered item by id (e.g. from a pointer gesture).
    /// Returns whether the selection changed.
    pub fn select_id(&mut self, id: &str) -> bool {
        if self.selected.as_deref() == Some(id) {
            return false;
        }
        if self.filtered().any(|h| h.id == id) {
            self.selected = Some(id.to_string());
            true
        } else {
            false
        }
    }

    /// Move the selection by `delta` positions with wraparound, as used by
    /// both arrow-key and Tab/Shift-Tab navigation. A no-op leaving the
    /// selection empty when the filtered list is empty. Returns whether the
    /// selection changed.
    pub fn move_selection(&mut self, delta: isize) -> bool {
        let len = self.filtered.len();
        if len == 0 {
            let had = self.selected.take().is_some();
            return had;
        }
        let current = self.selected_index().unwrap_or(0);
        let next = (current as isize + delta).rem_euclid(len as isize) as usize;
        let id = self.headings[self.filtered[next]].id.clone();
        let changed = self.selected.as_deref() != Some(id.as_str());
        self.selected = Some(id);
        changed
    }

    /// The heading a confirm gesture commits to, or `None` when nothing is
    /// selected (a no-op, not an error).
    pub fn confirm(&self) -> Option<&HeadingItem> {
        self.selected()
    }

    /// Record a preview emission for `id`, suppressing back-to-back
    /// duplicates. Returns whether the notification should actually fire.
    pub fn note_previewed(&mut self, id: &str) -> bool {
        if self.last_previewed.as_deref() == Some(id) {
            return false;
        }
        self.last_previewed = Some(id.to_string());
        true
    }

    fn recompute_filtered(&mut self) {
        let query = self.filter_text.trim().to_lowercase();
        self.filtered = self
            .headings
            .iter()
            .enumerate()
            .filter(|(_, h)| query.is_empty() || h.text.to_lowercase().contains(&query))
            .map(|(i, _)| i)
            .collect();
    }

    /// Restore the selection invariant after `headings` or `filtered`
    /// changed: prefer `preferred`, then the previous selection, then the
    /// first filtered item, then none.
    fn revalidate_selection(&mut self, preferred: Option<&str>) {
        let in_filtered =
            |id: &str| -> bool { self.filtered.iter().any(|&i| self.headings[i].id == id) };

        if let Some(id) = preferred
            && in_filtered(id)
        {
            self.selected = Some(id.to_string());
            return;
        }
        if let Some(id) = self.selected.as_deref()
            && in_filtered(id)
        {
            return;
        }
        self.selected = self
            .filtered
            .first()
            .map(|&i| self.headings[i].id.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::extract;

    fn nav_with(src: &str) -> NavigatorState {
        let mut nav = NavigatorState::new();
        nav.set_headings(extract(src), None);
        nav
    }

    const THREE: &str = "# Alpha\n\n## Beta\n\n## Gamma\n";

    #[test]
    fn test_set_headings_selects_first() {
        let nav = nav_with(THREE);
        assert_eq!(nav.filtered_len(), 3);
        assert_eq!(nav.selected().unwrap().text, "Alpha");
    }

    #[test]
    fn test_set_headings_empty_has_no_selection() {
        let nav = nav_with("no headings here\n");
        assert_eq!(nav.filtered_len(), 0);
        assert!(nav.selected_id().is_none());
    }

    #[test]
    fn test_move_selection_wraps_forward() {
        let mut nav = nav_with(THREE);
        nav.move_selection(2);
        assert_eq!(nav.selected().unwrap().text, "Gamma");
        nav.move_selection(1);
        assert_eq!(nav.selected().unwrap().text, "Alpha");
    }

    #[test]
    fn test_move_selection_wraps_backward() {
        let mut nav = nav_with(THREE);
        nav.move_selection(-1);
        assert_eq!(nav.selected().unwrap().text, "Gamma");
    }

    #[test]
    fn test_move_selection_on_empty_list_is_noop() {
        let mut nav = nav_with("plain text\n");
        nav.move_selection(1);
        assert!(nav.selected_id().is_none());
        nav.move_selection(-3);
        assert!(nav.selected_id().is_none());
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let mut nav = nav_with(THREE);
        nav.set_filter_text("BET");
        assert_eq!(nav.filtered_len(), 1);
        assert_eq!(nav.selected().unwrap().text, "Beta");
    }

    #[test]
    fn test_filter_matches_text_not_anchor() {
        let mut nav = nav_with("# Hello & World\n");
        // The anchor is "hello-world"; the hyphen only exists there.
        nav.set_filter_text("hello-");
        assert_eq!(nav.filtered_len(), 0);
        assert!(nav.selected_id().is_none());
    }

    #[test]
    fn test_filter_keeps_selection_when_still_matching() {
        let mut nav = nav_with(THREE);
        nav.move_selection(1); // Beta
        nav.set_filter_text("a"); // all three match
        assert_eq!(nav.selected().unwrap().text, "Beta");
    }

    #[test]
    fn test_filter_falls_back_to_first_match() {
        let mut nav = nav_with(THREE);
        nav.move_selection(1); // Beta
        nav.set_filter_text("gamma");
        assert_eq!(nav.selected().unwrap().text, "Gamma");
    }

    #[test]
    fn test_reextraction_preserves_selection_by_id() {
        let mut nav = nav_with(THREE);
        nav.move_selection(2); // Gamma
        let id = nav.selected_id().unwrap().to_string();
        // Unmodified document: same offsets, same ids.
        nav.set_headings(extract(THREE), None);
        assert_eq!(nav.selected_id(), Some(id.as_str()));
    }

    #[test]
    fn test_explicit_selected_id_wins() {
        let mut nav = nav_with(THREE);
        let beta_id = nav.filtered().nth(1).unwrap().id.clone();
        nav.set_headings(extract(THREE), Some(&beta_id));
        assert_eq!(nav.selected().unwrap().text, "Beta");
    }

    #[test]
    fn test_vanished_selection_falls_back_to_first() {
        let mut nav = nav_with(THREE);
        nav.move_selection(2);
        nav.set_headings(extract("# Different\n"), None);
        assert_eq!(nav.selected().unwrap().text, "Different");
    }

    #[test]
    fn test_confirm_returns_selection_or_none() {
        let mut nav = nav_with(THREE);
        assert_eq!(nav.confirm().unwrap().text, "Alpha");
        nav.set_filter_text("zzz");
        assert!(nav.confirm().is_none());
    }

    #[test]
    fn test_preview_dedup_suppresses_repeat() {
        let mut nav = nav_with(THREE);
        assert!(nav.note_previewed("heading-0"));
        assert!(!nav.note_previewed("heading-0"));
        assert!(nav.note_previewed("heading-9"));
        assert!(nav.note_previewed("heading-0"));
    }

    #[test]
    fn test_select_id_only_accepts_filtered_members() {
        let mut nav = nav_with(THREE);
        let gamma_id = nav.filtered().nth(2).unwrap().id.clone();
        assert!(nav.select_id(&gamma_id));
        assert!(!nav.select_id("heading-99999"));
        assert_eq!(nav.selected().unwrap().text, "Gamma");
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn selection_stays_in_filtered(
                deltas in prop::collection::vec(-5isize..5, 0..32),
                query in "[a-z]{0,3}",
            ) {
                let mut nav = nav_with(THREE);
                nav.set_filter_text(query);
                for delta in deltas {
                    nav.move_selection(delta);
                    if nav.filtered_len() == 0 {
                        prop_assert!(nav.selected_id().is_none());
                    } else {
                        prop_assert!(nav.selected_index().is_some());
                    }
                }
            }
        }
    }
}
