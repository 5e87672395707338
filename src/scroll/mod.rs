//! Scroll convergence: making a heading jump visually reliable when the
//! view's layout settles after the initial scroll command returns.
//!
//! A jump issues a scroll immediately, then a verification session measures
//! the target's geometry after a tuned delay and corrects the viewport if
//! the heading drifted off the top edge. Sessions live in an explicit table
//! keyed by view identity; starting a new navigation for a view cancels its
//! predecessor, and at most one session per view exists at a time.

use std::collections::HashMap;
use std::ops::Range;

/// Stable identity of one editor view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(pub u64);

/// Where a scroll-into-view should place the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAlign {
    /// Pin the target at the top edge of the viewport.
    Start,
    /// Minimal movement to bring the target into view.
    Nearest,
}

/// Geometry of a measured target block, in adapter-defined units
/// (pixels for a rendered view, rows for a terminal pane).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    /// Top edge of the visible scroll area.
    pub viewport_top: f32,
    /// Top edge of the target block.
    pub block_top: f32,
}

impl Geometry {
    /// Signed distance of the block below the viewport top.
    pub fn offset_from_viewport_top(&self) -> f32 {
        self.block_top - self.viewport_top
    }
}

/// The editor-view adapter the controller drives.
///
/// Measurement may legitimately fail (`None`) while the view has pending
/// layout work; that is what the retry schedule exists for.
pub trait EditorView {
    fn selection(&self) -> Range<usize>;
    fn set_selection(&mut self, range: Range<usize>);
    fn scroll_into_view(&mut self, range: Range<usize>, align: ScrollAlign);
    /// Direct scroll-offset write that must not be declined, even if the
    /// view believes the range is already visible.
    fn force_scroll_top(&mut self, top: f32);
    fn measure_geometry(&self, range: Range<usize>) -> Option<Geometry>;
    fn focus(&mut self);
}

/// Tuning constants for the verification protocol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollPolicy {
    /// Measurement attempts per session.
    pub max_attempts: u32,
    /// Delay before the first measurement.
    pub first_delay_ms: u64,
    /// Delay before each subsequent measurement; longer, so deferred
    /// content gets a chance to settle.
    pub retry_delay_ms: u64,
    /// Acceptable drift below the viewport top.
    pub below_tolerance: f32,
    /// Acceptable drift above the viewport top. Stricter: a heading
    /// overshot past the top edge reads as a missed jump.
    pub above_tolerance: f32,
}

impl Default for ScrollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            first_delay_ms: 160,
            retry_delay_ms: 260,
            below_tolerance: 12.0,
            above_tolerance: 1.5,
        }
    }
}

#[derive(Debug)]
struct Session {
    target: Range<usize>,
    attempt: u32,
    due_at_ms: u64,
    restore_focus: bool,
}

/// Per-view verification sessions and the protocol that drives them.
#[derive(Debug, Default)]
pub struct ScrollConvergence {
    policy: ScrollPolicy,
    sessions: HashMap<ViewId, Session>,
}

impl ScrollConvergence {
    pub fn new(policy: ScrollPolicy) -> Self {
        Self {
            policy,
            sessions: HashMap::new(),
        }
    }

    pub const fn policy(&self) -> &ScrollPolicy {
        &self.policy
    }

    /// Start a navigation to `target`: commit the selection, issue the
    /// initial scroll, and schedule verification. Any in-flight session for
    /// the same view is cancelled first.
    pub fn begin(
        &mut self,
        view_id: ViewId,
        view: &mut impl EditorView,
        target: Range<usize>,
        restore_focus: bool,
        now_ms: u64,
    ) {
        self.cancel(view_id);
        view.set_selection(target.clone());
        view.scroll_into_view(target.clone(), ScrollAlign::Start);
        if restore_focus {
            view.focus();
        }
        self.sessions.insert(
            view_id,
            Session {
                target,
                attempt: 0,
                due_at_ms: now_ms + self.policy.first_delay_ms,
                restore_focus,
            },
        );
    }

    /// Cancel the in-flight session for a view, if any. Returns whether one
    /// existed. Invoked on new navigation and on panel close; cancellation
    /// is an explicit operation here, never garbage collection.
    pub fn cancel(&mut self, view_id: ViewId) -> bool {
        self.sessions.remove(&view_id).is_some()
    }

    pub fn cancel_all(&mut self) {
        self.sessions.clear();
    }

    pub fn has_session(&self, view_id: ViewId) -> bool {
        self.sessions.contains_key(&view_id)
    }

    /// Earliest pending attempt deadline, for poll-timeout selection.
    pub fn next_deadline(&self) -> Option<u64> {
        self.sessions.values().map(|s| s.due_at_ms).min()
    }

    /// Run the session for `view_id` if its attempt is due. The tick is
    /// two-phase: the selection and geometry reads complete before any
    /// write touches the view.
    pub fn tick(&mut self, view_id: ViewId, view: &mut impl EditorView, now_ms: u64) {
        let Some(session) = self.sessions.get(&view_id) else {
            return;
        };
        if now_ms < session.due_at_ms {
            return;
        }
        let target = session.target.clone();
        let attempt = session.attempt;
        let restore_focus = session.restore_focus;

        // Read phase.
        let live = view.selection();
        if live.start != target.start {
            // The user moved on; abort silently.
            tracing::debug!(view = view_id.0, "verification target went stale");
            self.sessions.remove(&view_id);
            return;
        }
        let geometry = view.measure_geometry(target.clone());

        // Write phase.
        let budget_left = attempt + 1 < self.policy.max_attempts;
        match geometry {
            None => {
                if budget_left {
                    // Layout not ready; re-issue the scroll defensively and
                    // try again later.
                    view.scroll_into_view(target, ScrollAlign::Start);
                    self.reschedule(view_id, now_ms);
                } else {
                    tracing::warn!(
                        view = view_id.0,
                        attempts = attempt + 1,
                        "giving up on scroll verification: geometry unmeasurable"
                    );
                    self.sessions.remove(&view_id);
                }
            }
            Some(geometry) => {
                let offset = geometry.offset_from_viewport_top();
                let needs_correction = offset > self.policy.below_tolerance
                    || offset < -self.policy.above_tolerance;
                if needs_correction {
                    tracing::debug!(
                        view = view_id.0,
                        attempt,
                        offset,
                        "correcting viewport after layout shift"
                    );
                    view.force_scroll_top(geometry.block_top);
                    view.scroll_into_view(target, ScrollAlign::Start);
                    if restore_focus {
                        view.focus();
                    }
                }
                if budget_left {
                    // Even a clean measurement gets one confirmation pass;
                    // layout can still shift underneath it.
                    self.reschedule(view_id, now_ms);
                } else {
                    self.sessions.remove(&view_id);
                }
            }
        }
    }

    fn reschedule(&mut self, view_id: ViewId, now_ms: u64) {
        if let Some(session) = self.sessions.get_mut(&view_id) {
            session.attempt += 1;
            session.due_at_ms = now_ms + self.policy.retry_delay_ms;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scriptable view: the next measurement outcome is set by each test,
    /// every command is recorded.
    struct MockView {
        selection: Range<usize>,
        geometry: Option<Geometry>,
        scroll_commands: Vec<(Range<usize>, ScrollAlign)>,
        forced_tops: Vec<f32>,
        focus_calls: u32,
    }

    impl MockView {
        fn new() -> Self {
            Self {
                selection: 0..0,
                geometry: None,
                scroll_commands: Vec::new(),
                forced_tops: Vec::new(),
                focus_calls: 0,
            }
        }
    }

    impl EditorView for MockView {
        fn selection(&self) -> Range<usize> {
            self.selection.clone()
        }
        fn set_selection(&mut self, range: Range<usize>) {
            self.selection = range;
        }
        fn scroll_into_view(&mut self, range: Range<usize>, align: ScrollAlign) {
            self.scroll_commands.push((range, align));
        }
        fn force_scroll_top(&mut self, top: f32) {
            self.forced_tops.push(top);
        }
        fn measure_geometry(&self, _range: Range<usize>) -> Option<Geometry> {
            self.geometry
        }
        fn focus(&mut self) {
            self.focus_calls += 1;
        }
    }

    const VIEW: ViewId = ViewId(1);

    fn geometry(offset: f32) -> Geometry {
        Geometry {
            viewport_top: 100.0,
            block_top: 100.0 + offset,
        }
    }

    /// Drive tick at each due deadline until the session ends, counting
    /// measurement attempts.
    fn run_to_completion(
        ctl: &mut ScrollConvergence,
        view: &mut MockView,
        outcomes: &[Option<Geometry>],
    ) -> u32 {
        let mut attempts = 0;
        while let Some(deadline) = ctl.next_deadline() {
            view.geometry = outcomes.get(attempts as usize).copied().flatten();
            ctl.tick(VIEW, view, deadline);
            attempts += 1;
            assert!(attempts <= 16, "session failed to terminate");
        }
        attempts
    }

    #[test]
    fn test_begin_commits_selection_and_scrolls() {
        let mut ctl = ScrollConvergence::new(ScrollPolicy::default());
        let mut view = MockView::new();
        ctl.begin(VIEW, &mut view, 40..55, false, 0);
        assert_eq!(view.selection, 40..55);
        assert_eq!(view.scroll_commands, vec![(40..55, ScrollAlign::Start)]);
        assert!(ctl.has_session(VIEW));
        assert_eq!(ctl.next_deadline(), Some(160));
    }

    #[test]
    fn test_at_most_max_attempts() {
        let mut ctl = ScrollConvergence::new(ScrollPolicy::default());
        let mut view = MockView::new();
        ctl.begin(VIEW, &mut view, 10..20, false, 0);
        // Clean geometry every time: one verification + one confirmation.
        let attempts = run_to_completion(&mut ctl, &mut view, &[Some(geometry(0.0)); 4]);
        assert_eq!(attempts, 2);
        assert!(!ctl.has_session(VIEW));
    }

    #[test]
    fn test_offset_beyond_tolerance_triggers_correction() {
        let mut ctl = ScrollConvergence::new(ScrollPolicy::default());
        let mut view = MockView::new();
        ctl.begin(VIEW, &mut view, 10..20, false, 0);
        view.geometry = Some(geometry(20.0));
        ctl.tick(VIEW, &mut view, 160);
        assert_eq!(view.forced_tops, vec![120.0]);
        // begin() scrolled once, the correction scrolled again.
        assert_eq!(view.scroll_commands.len(), 2);
    }

    #[test]
    fn test_offset_within_tolerance_leaves_viewport_alone() {
        let mut ctl = ScrollConvergence::new(ScrollPolicy::default());
        let mut view = MockView::new();
        ctl.begin(VIEW, &mut view, 10..20, false, 0);
        view.geometry = Some(geometry(8.0));
        ctl.tick(VIEW, &mut view, 160);
        assert!(view.forced_tops.is_empty());
        assert_eq!(view.scroll_commands.len(), 1);
        // Confirmation attempt still scheduled.
        assert!(ctl.has_session(VIEW));
        assert_eq!(ctl.next_deadline(), Some(160 + 260));
    }

    #[test]
    fn test_overshoot_above_top_uses_stricter_tolerance() {
        let mut ctl = ScrollConvergence::new(ScrollPolicy::default());
        let mut view = MockView::new();
        ctl.begin(VIEW, &mut view, 10..20, false, 0);
        // 2 units above the top: inside the below-tolerance band but past
        // the stricter above-tolerance.
        view.geometry = Some(geometry(-2.0));
        ctl.tick(VIEW, &mut view, 160);
        assert_eq!(view.forced_tops.len(), 1);
    }

    #[test]
    fn test_stale_selection_aborts_silently() {
        let mut ctl = ScrollConvergence::new(ScrollPolicy::default());
        let mut view = MockView::new();
        ctl.begin(VIEW, &mut view, 10..20, false, 0);
        view.selection = 90..95; // user moved on
        view.geometry = Some(geometry(50.0));
        ctl.tick(VIEW, &mut view, 160);
        assert!(!ctl.has_session(VIEW));
        assert!(view.forced_tops.is_empty());
        assert_eq!(view.scroll_commands.len(), 1); // only the initial scroll
    }

    #[test]
    fn test_unmeasurable_reissues_scroll_then_gives_up() {
        let mut ctl = ScrollConvergence::new(ScrollPolicy::default());
        let mut view = MockView::new();
        ctl.begin(VIEW, &mut view, 10..20, false, 0);
        let attempts = run_to_completion(&mut ctl, &mut view, &[None, None, None]);
        assert_eq!(attempts, 2);
        // Initial scroll + one defensive re-scroll (the final attempt gives
        // up instead of rescrolling).
        assert_eq!(view.scroll_commands.len(), 2);
        assert!(!ctl.has_session(VIEW));
    }

    #[test]
    fn test_unmeasurable_then_shifted_geometry_converges() {
        let mut ctl = ScrollConvergence::new(ScrollPolicy::default());
        let mut view = MockView::new();
        ctl.begin(VIEW, &mut view, 10..20, false, 0);
        let attempts =
            run_to_completion(&mut ctl, &mut view, &[None, Some(geometry(30.0))]);
        assert_eq!(attempts, 2);
        assert_eq!(view.forced_tops, vec![130.0]);
    }

    #[test]
    fn test_new_navigation_cancels_predecessor() {
        let mut ctl = ScrollConvergence::new(ScrollPolicy::default());
        let mut view = MockView::new();
        ctl.begin(VIEW, &mut view, 10..20, false, 0);
        ctl.begin(VIEW, &mut view, 200..210, false, 50);
        assert!(ctl.has_session(VIEW));
        assert_eq!(ctl.next_deadline(), Some(50 + 160));
        // Only the new target is ever verified.
        view.geometry = Some(geometry(0.0));
        ctl.tick(VIEW, &mut view, 210);
        assert_eq!(view.selection, 200..210);
    }

    #[test]
    fn test_focus_restored_on_correction_when_requested() {
        let mut ctl = ScrollConvergence::new(ScrollPolicy::default());
        let mut view = MockView::new();
        ctl.begin(VIEW, &mut view, 10..20, true, 0);
        assert_eq!(view.focus_calls, 1);
        view.geometry = Some(geometry(40.0));
        ctl.tick(VIEW, &mut view, 160);
        assert_eq!(view.focus_calls, 2);
    }

    #[test]
    fn test_cancel_all_empties_table() {
        let mut ctl = ScrollConvergence::new(ScrollPolicy::default());
        let mut view = MockView::new();
        ctl.begin(ViewId(1), &mut view, 0..5, false, 0);
        ctl.begin(ViewId(2), &mut view, 5..9, false, 0);
        ctl.cancel_all();
        assert_eq!(ctl.next_deadline(), None);
    }

    #[test]
    fn test_tick_before_deadline_is_noop() {
        let mut ctl = ScrollConvergence::new(ScrollPolicy::default());
        let mut view = MockView::new();
        ctl.begin(VIEW, &mut view, 10..20, false, 0);
        ctl.tick(VIEW, &mut view, 100);
        assert!(view.forced_tops.is_empty());
        assert!(ctl.has_session(VIEW));
    }
}
