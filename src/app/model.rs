use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::config::PanelDimensions;
use crate::document::{HeadingItem, extract};
use crate::navigator::NavigatorState;
use crate::scroll::{ScrollConvergence, ScrollPolicy, ViewId};
use crate::ui::list::HeadingList;
use crate::ui::pane::DocumentPane;

/// The single document pane's view identity.
pub const PANE_VIEW: ViewId = ViewId(0);

const TOAST_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// The complete application state.
///
/// All state lives here - no global or scattered state.
pub struct Model {
    /// Path to the source file
    pub file_path: PathBuf,
    /// The document pane (scroll state, soft-wrap layout, selection)
    pub pane: DocumentPane,
    /// Outline of the current document, independent of the panel lifecycle
    pub outline: Vec<HeadingItem>,
    /// Panel state; fresh on every panel open, discarded on close
    pub navigator: NavigatorState,
    /// Keyed list nodes projected from the navigator's filtered headings
    pub list: HeadingList,
    /// In-flight scroll verification sessions
    pub convergence: ScrollConvergence,
    /// Whether the outline panel is open
    pub panel_visible: bool,
    /// Live contents of the panel's filter box (applied after a debounce)
    pub filter_input: String,
    /// Panel width/height configuration
    pub panel_dims: PanelDimensions,
    /// Whether file watching is enabled
    pub watch_enabled: bool,
    /// Whether the help overlay is visible
    pub help_visible: bool,
    /// Whether the app should quit
    pub should_quit: bool,
    toast: Option<Toast>,
}

impl Model {
    pub fn new(file_path: PathBuf, source: String, size: (u16, u16)) -> Self {
        let (width, height) = size;
        let pane = DocumentPane::new(source, width.saturating_sub(1), height.saturating_sub(1));
        let outline = extract(pane.source());
        Self {
            file_path,
            pane,
            outline,
            navigator: NavigatorState::new(),
            list: HeadingList::new(),
            convergence: ScrollConvergence::new(ScrollPolicy::default()),
            panel_visible: false,
            filter_input: String::new(),
            panel_dims: PanelDimensions::default(),
            watch_enabled: false,
            help_visible: false,
            should_quit: false,
            toast: None,
        }
    }

    /// Open the panel with a fresh navigator over the current outline.
    pub fn open_panel(&mut self) {
        self.navigator = NavigatorState::new();
        self.navigator.set_headings(self.outline.clone(), None);
        self.list = HeadingList::new();
        self.filter_input.clear();
        self.sync_list();
        self.panel_visible = true;
    }

    /// Close the panel, cancelling any in-flight verification. The
    /// navigator's full heading set stays behind for pane styling; its
    /// filter and selection die with the panel.
    pub fn close_panel(&mut self) {
        self.panel_visible = false;
        self.filter_input.clear();
        self.convergence.cancel(PANE_VIEW);
    }

    /// Reconcile the panel list against the navigator's filtered headings.
    pub fn sync_list(&mut self) {
        let stats = self.list.reconcile(self.navigator.filtered());
        tracing::trace!(?stats, "panel list reconciled");
    }

    /// Re-extract the outline after a document change. With the panel open
    /// the previous selection survives by id where it still exists.
    pub fn refresh_outline(&mut self) {
        self.outline = extract(self.pane.source());
        if self.panel_visible {
            self.navigator.set_headings(self.outline.clone(), None);
            self.sync_list();
        }
    }

    /// Reload the document from disk and refresh the outline.
    pub fn reload_from_disk(&mut self) -> Result<()> {
        let source = std::fs::read_to_string(&self.file_path)
            .with_context(|| format!("Failed to read {}", self.file_path.display()))?;
        self.pane.set_source(source);
        self.refresh_outline();
        Ok(())
    }

    pub fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + TOAST_DURATION,
        });
    }

    /// Drop an expired toast; returns whether one was removed.
    pub fn expire_toast(&mut self, now: Instant) -> bool {
        if self.toast.as_ref().is_some_and(|t| t.expires_at <= now) {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn toast(&self) -> Option<(ToastLevel, &str)> {
        self.toast.as_ref().map(|t| (t.level, t.message.as_str()))
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new(PathBuf::new(), String::new(), (80, 24))
    }
}
