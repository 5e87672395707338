use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;

use crate::app::{App, Message, Model};
use crate::navigator::Debouncer;
use crate::ui;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut Debouncer<(u16, u16)>,
    ) -> Option<Message> {
        match event {
            Event::Key(key) => Self::handle_key(*key, model),
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Resize(w, h) => {
                resize_debouncer.queue((*w, *h), now_ms);
                None
            }
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        if model.help_visible {
            return Some(Message::HideHelp);
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('q') => Some(Message::Quit),
                KeyCode::Char('y') if model.panel_visible => Some(Message::CopyHeadingLink),
                _ => None,
            };
        }
        if model.panel_visible {
            return Self::handle_panel_key(key, model);
        }
        Self::handle_document_key(key)
    }

    /// Keys while the panel is open: navigation and the filter box. Plain
    /// characters type into the filter, so all bindings here are
    /// non-printing keys.
    fn handle_panel_key(key: KeyEvent, model: &Model) -> Option<Message> {
        match key.code {
            KeyCode::Esc => Some(Message::ClosePanel),
            KeyCode::Enter => Some(Message::Confirm),
            KeyCode::Up => Some(Message::MoveSelection(-1)),
            KeyCode::Down => Some(Message::MoveSelection(1)),
            KeyCode::Tab => Some(Message::MoveSelection(1)),
            KeyCode::BackTab => Some(Message::MoveSelection(-1)),
            KeyCode::Backspace => {
                let mut text = model.filter_input.clone();
                text.pop();
                Some(Message::FilterInput(text))
            }
            KeyCode::Char(ch) => {
                let mut text = model.filter_input.clone();
                text.push(ch);
                Some(Message::FilterInput(text))
            }
            _ => None,
        }
    }

    fn handle_document_key(key: KeyEvent) -> Option<Message> {
        match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Char('o' | 't') => Some(Message::TogglePanel),
            KeyCode::Char('?') => Some(Message::ToggleHelp),
            KeyCode::Char('w') => Some(Message::ToggleWatch),
            KeyCode::Char('r') => Some(Message::ForceReload),
            KeyCode::Char('j') | KeyCode::Down => Some(Message::ScrollDown(1)),
            KeyCode::Char('k') | KeyCode::Up => Some(Message::ScrollUp(1)),
            KeyCode::Char(' ') | KeyCode::PageDown => Some(Message::PageDown),
            KeyCode::Char('b') | KeyCode::PageUp => Some(Message::PageUp),
            KeyCode::Char('d') => Some(Message::HalfPageDown),
            KeyCode::Char('u') => Some(Message::HalfPageUp),
            KeyCode::Char('g') | KeyCode::Home => Some(Message::GoToTop),
            KeyCode::Char('G') | KeyCode::End => Some(Message::GoToBottom),
            _ => None,
        }
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        if model.help_visible {
            return None;
        }

        if model.panel_visible {
            let doc_area = Self::document_area(model);
            let popup = ui::panel_rect(
                doc_area,
                model.panel_dims.width_cols,
                model.panel_dims.max_height_fraction,
            );
            let in_popup = point_in_rect(mouse.column, mouse.row, popup);
            let item_under_pointer = Self::panel_item_at(model, popup, mouse.row, mouse.column);

            return match mouse.kind {
                MouseEventKind::Up(MouseButton::Left) => match item_under_pointer {
                    Some(index) => Some(Message::ClickItem(index)),
                    None if !in_popup => Some(Message::ClosePanel),
                    None => None,
                },
                MouseEventKind::ScrollUp => Some(Message::MoveSelection(-1)),
                MouseEventKind::ScrollDown => Some(Message::MoveSelection(1)),
                MouseEventKind::Moved => item_under_pointer.map(Message::HoverIndex),
                _ => None,
            };
        }

        match mouse.kind {
            MouseEventKind::ScrollUp => Some(Message::ScrollUp(3)),
            MouseEventKind::ScrollDown => Some(Message::ScrollDown(3)),
            _ => None,
        }
    }

    /// Reconstruct the document area from the pane's viewport (the frame is
    /// one column wider for padding and one row taller for the status bar).
    fn document_area(model: &Model) -> Rect {
        Rect::new(
            0,
            0,
            model.pane.viewport().width().saturating_add(1),
            model.pane.viewport().height(),
        )
    }

    /// The filtered-list index under a pointer position, if any.
    fn panel_item_at(model: &Model, popup: Rect, row: u16, column: u16) -> Option<usize> {
        let list_top = popup.y + ui::PANEL_LIST_TOP;
        let list_rows = ui::panel_list_rows(popup.height);
        if !point_in_rect(column, row, popup) || row < list_top {
            return None;
        }
        let rel = (row - list_top) as usize;
        if rel >= list_rows {
            return None;
        }
        let index = model.list.scroll_offset() + rel;
        (index < model.navigator.filtered_len()).then_some(index)
    }
}

const fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}
