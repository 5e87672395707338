use std::path::Path;
use std::time::Duration;

use crate::app::{App, Message, Model, PANE_VIEW, ToastLevel};
use crate::document::HeadingItem;
use crate::host::{self, HostRequest, LinkError, NoteResolver};
use crate::watcher::FileWatcher;

/// Resolves the current file as a "note": the title is the first level-1
/// heading, falling back to the file stem.
struct OutlineTitleResolver<'a> {
    file_path: &'a Path,
    outline: &'a [HeadingItem],
}

impl NoteResolver for OutlineTitleResolver<'_> {
    fn note_title(&self, note_id: &str) -> Option<String> {
        if note_id != self.file_path.to_string_lossy() {
            return None;
        }
        self.outline
            .iter()
            .find(|h| h.level == 1)
            .map(|h| h.text.clone())
            .or_else(|| {
                self.file_path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().to_string())
            })
    }
}

impl App {
    pub(super) fn make_file_watcher(path: &Path) -> notify::Result<FileWatcher> {
        FileWatcher::new(path, Duration::from_millis(200))
    }

    pub(super) fn handle_message_side_effects(
        model: &mut Model,
        file_watcher: &mut Option<FileWatcher>,
        msg: &Message,
        now_ms: u64,
    ) {
        match msg {
            Message::ToggleWatch => {
                if model.watch_enabled {
                    match Self::make_file_watcher(&model.file_path) {
                        Ok(watcher) => {
                            *file_watcher = Some(watcher);
                            model.show_toast(ToastLevel::Info, "Watching file changes");
                        }
                        Err(err) => {
                            model.watch_enabled = false;
                            *file_watcher = None;
                            model.show_toast(
                                ToastLevel::Warning,
                                format!("Watch unavailable: {err}"),
                            );
                            tracing::warn!(
                                path = %model.file_path.display(),
                                "failed to start watcher: {err}"
                            );
                        }
                    }
                } else {
                    *file_watcher = None;
                    model.show_toast(ToastLevel::Info, "Watch disabled");
                }
            }
            Message::ForceReload | Message::FileChanged => {
                if let Err(err) = model.reload_from_disk() {
                    model.show_toast(ToastLevel::Error, format!("Reload failed: {err}"));
                    tracing::warn!(path = %model.file_path.display(), "reload failed: {err:#}");
                } else if matches!(msg, Message::ForceReload) {
                    model.show_toast(ToastLevel::Info, "Reloaded");
                }
            }
            Message::Confirm | Message::ClickItem(_) => {
                Self::jump_to_selection(model, now_ms);
            }
            Message::PreviewDue(id) => {
                Self::preview_selected(model, id, now_ms);
            }
            Message::CopyHeadingLink => {
                Self::copy_selected_heading_link(model);
            }
            _ => {}
        }
    }

    /// Commit the selection: jump with focus restoration.
    fn jump_to_selection(model: &mut Model, now_ms: u64) {
        let Some(target) = model.navigator.confirm().map(HeadingItem::range) else {
            return;
        };
        model
            .convergence
            .begin(PANE_VIEW, &mut model.pane, target, true, now_ms);
    }

    /// Fire a debounced preview if the selection it was scheduled for is
    /// still current and differs from the last one previewed.
    pub(super) fn preview_selected(model: &mut Model, id: &str, now_ms: u64) {
        if !model.panel_visible || model.navigator.selected_id() != Some(id) {
            return;
        }
        if !model.navigator.note_previewed(id) {
            return;
        }
        let Some(target) = model.navigator.selected().map(HeadingItem::range) else {
            return;
        };
        model
            .convergence
            .begin(PANE_VIEW, &mut model.pane, target, false, now_ms);
    }

    fn copy_selected_heading_link(model: &mut Model) {
        let Some(heading) = model.navigator.selected() else {
            return;
        };
        let request = HostRequest::CopyHeadingLink {
            note_id: model.file_path.to_string_lossy().to_string(),
            heading_text: heading.text.clone(),
            heading_anchor: heading.anchor.clone(),
        };
        let resolver = OutlineTitleResolver {
            file_path: &model.file_path,
            outline: &model.outline,
        };
        match host::handle_request(&request, &resolver) {
            Ok(_) => model.show_toast(ToastLevel::Info, "Copied heading link"),
            // Unresolvable note: already logged, the action is a no-op.
            Err(LinkError::UnknownNote(_)) => {}
            Err(err @ LinkError::Clipboard(_)) => {
                model.show_toast(ToastLevel::Error, format!("Copy failed: {err}"));
            }
        }
    }
}
