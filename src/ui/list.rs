//! Keyed projection of the filtered outline onto reusable list nodes.
//!
//! The panel re-renders on every filter keystroke and document edit, so the
//! node set is reconciled against the filtered headings by id instead of
//! being rebuilt: unchanged items keep their node (and its formatted
//! label), new ids get fresh nodes, vanished ids are dropped, and surviving
//! nodes are reordered to match the filtered sequence.

use std::collections::HashMap;

use crate::document::HeadingItem;

/// One rendered list entry, keyed by heading id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListNode {
    pub id: String,
    pub text: String,
    pub level: u8,
    pub anchor: String,
    /// Indented display label, recomputed only when text or level change.
    pub label: String,
}

impl ListNode {
    fn new(item: &HeadingItem) -> Self {
        Self {
            id: item.id.clone(),
            text: item.text.clone(),
            level: item.level,
            anchor: item.anchor.clone(),
            label: format_label(item),
        }
    }

    /// Sync a reused node with its heading. Returns whether the label had
    /// to be recomputed.
    fn refresh(&mut self, item: &HeadingItem) -> bool {
        self.anchor.clone_from(&item.anchor);
        if self.text == item.text && self.level == item.level {
            return false;
        }
        self.text.clone_from(&item.text);
        self.level = item.level;
        self.label = format_label(item);
        true
    }
}

fn format_label(item: &HeadingItem) -> String {
    let indent = "  ".repeat(usize::from(item.level.saturating_sub(1)));
    format!("{indent}{}", item.text)
}

/// Counters reported by one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub created: usize,
    pub removed: usize,
    /// Reused nodes whose relative order changed.
    pub moved: usize,
    /// Reused nodes, moved or not.
    pub retained: usize,
}

/// The panel's list of heading nodes.
#[derive(Debug, Default)]
pub struct HeadingList {
    nodes: Vec<ListNode>,
    scroll_offset: usize,
}

impl HeadingList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[ListNode] {
        &self.nodes
    }

    pub const fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Reconcile the node set against the filtered headings, in order.
    pub fn reconcile<'a>(
        &mut self,
        items: impl Iterator<Item = &'a HeadingItem>,
    ) -> ReconcileStats {
        let mut stats = ReconcileStats::default();
        let mut old: HashMap<String, (usize, ListNode)> = std::mem::take(&mut self.nodes)
            .into_iter()
            .enumerate()
            .map(|(i, node)| (node.id.clone(), (i, node)))
            .collect();

        let mut last_reused_pos: Option<usize> = None;
        for item in items {
            if let Some((old_pos, mut node)) = old.remove(&item.id) {
                node.refresh(item);
                stats.retained += 1;
                // A reused node that jumped in front of a previously placed
                // one was reordered.
                if last_reused_pos.is_some_and(|prev| old_pos < prev) {
                    stats.moved += 1;
                } else {
                    last_reused_pos = Some(old_pos);
                }
                self.nodes.push(node);
            } else {
                stats.created += 1;
                self.nodes.push(ListNode::new(item));
            }
        }
        stats.removed = old.len();
        stats
    }

    /// Scroll the list window so the row at `index` is visible.
    pub fn ensure_visible(&mut self, index: usize, visible_rows: usize) {
        if visible_rows == 0 {
            return;
        }
        if index < self.scroll_offset {
            self.scroll_offset = index;
        } else if index >= self.scroll_offset + visible_rows {
            self.scroll_offset = index + 1 - visible_rows;
        }
        let max = self.nodes.len().saturating_sub(visible_rows);
        self.scroll_offset = self.scroll_offset.min(max);
    }

}
