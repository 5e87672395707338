use crate::app::Model;

/// All possible events and actions in the application.
///
/// These represent user input, system events, and internal actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Document pane
    /// Scroll up by n rows
    ScrollUp(usize),
    /// Scroll down by n rows
    ScrollDown(usize),
    /// Scroll up one page
    PageUp,
    /// Scroll down one page
    PageDown,
    /// Scroll up half page
    HalfPageUp,
    /// Scroll down half page
    HalfPageDown,
    /// Go to beginning of document
    GoToTop,
    /// Go to end of document
    GoToBottom,

    // Outline panel
    /// Toggle the panel (fresh navigator on open)
    TogglePanel,
    /// Close the panel
    ClosePanel,
    /// Live edit of the filter box (applied after a debounce)
    FilterInput(String),
    /// Debounced filter application
    FilterApply(String),
    /// Move the selection by a delta with wraparound
    MoveSelection(isize),
    /// Select the filtered item under the pointer
    HoverIndex(usize),
    /// Select and jump to the filtered item under the pointer
    ClickItem(usize),
    /// Commit the current selection (jump with focus restore)
    Confirm,
    /// Debounced preview for a selection; carries the heading id it was
    /// scheduled for so a stale selection no-ops
    PreviewDue(String),
    /// Copy a markdown link for the selected heading
    CopyHeadingLink,

    // File watching
    /// Toggle file watching
    ToggleWatch,
    /// File changed externally, reload
    FileChanged,
    /// Force reload file
    ForceReload,

    /// Toggle help overlay
    ToggleHelp,
    /// Hide help overlay
    HideHelp,

    // Window
    /// Terminal resized
    Resize(u16, u16),
    /// Redraw screen
    Redraw,

    // Application
    /// Quit the application
    Quit,
}

/// Pure function that updates the model based on a message.
///
/// This is the core of TEA - all state transitions happen here.
/// IO side effects live in the effects handler, not here.
pub fn update(mut model: Model, msg: Message) -> Model {
    match msg {
        // Document pane
        Message::ScrollUp(n) => model.pane.scroll_up(n),
        Message::ScrollDown(n) => model.pane.scroll_down(n),
        Message::PageUp => model.pane.page_up(),
        Message::PageDown => model.pane.page_down(),
        Message::HalfPageUp => model.pane.half_page_up(),
        Message::HalfPageDown => model.pane.half_page_down(),
        Message::GoToTop => model.pane.go_to_top(),
        Message::GoToBottom => model.pane.go_to_bottom(),

        // Outline panel
        Message::TogglePanel => {
            if model.panel_visible {
                model.close_panel();
            } else {
                model.open_panel();
            }
        }
        Message::ClosePanel => {
            if model.panel_visible {
                model.close_panel();
            }
        }
        Message::FilterInput(text) => {
            model.filter_input = text;
        }
        Message::FilterApply(text) => {
            model.navigator.set_filter_text(text);
            model.sync_list();
        }
        Message::MoveSelection(delta) => {
            model.navigator.move_selection(delta);
        }
        Message::HoverIndex(index) | Message::ClickItem(index) => {
            let id = model
                .navigator
                .filtered()
                .nth(index)
                .map(|h| h.id.clone());
            if let Some(id) = id {
                model.navigator.select_id(&id);
            }
        }

        // Confirm/ClickItem jumps, preview scrolls, link copying, and file
        // IO are side effects handled after the state transition.
        Message::Confirm
        | Message::PreviewDue(_)
        | Message::CopyHeadingLink
        | Message::FileChanged
        | Message::ForceReload
        | Message::Redraw => {}

        Message::ToggleWatch => {
            model.watch_enabled = !model.watch_enabled;
        }
        Message::ToggleHelp => {
            model.help_visible = !model.help_visible;
        }
        Message::HideHelp => {
            model.help_visible = false;
        }

        // Window
        Message::Resize(width, height) => {
            model
                .pane
                .resize(width.saturating_sub(1), height.saturating_sub(1));
        }

        // Application
        Message::Quit => {
            model.should_quit = true;
        }
    }
    model
}
