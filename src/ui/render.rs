use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::app::{Model, ToastLevel};

use super::style;

/// Rows consumed by the panel chrome above the list: top border plus the
/// filter line.
pub const PANEL_LIST_TOP: u16 = 2;
/// Rows consumed below the list: footer hint plus bottom border.
const PANEL_LIST_BOTTOM: u16 = 2;

/// Render the complete UI.
pub fn render(model: &mut Model, frame: &mut Frame) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    render_document(model, frame, chunks[0]);
    render_status_bar(model, frame, chunks[1]);

    if model.panel_visible {
        render_panel(model, frame, chunks[0]);
    }
    if model.help_visible {
        render_help_overlay(frame, chunks[0]);
    }
}

fn render_document(model: &mut Model, frame: &mut Frame, area: Rect) {
    let content_width = area.width.saturating_sub(1).max(1);
    model.pane.resize(content_width, area.height);
    model.pane.ensure_layout(content_width);

    // Heading lines get level styling; everything else is plain text.
    let heading_levels: std::collections::HashMap<usize, u8> = model
        .outline
        .iter()
        .map(|h| (h.line, h.level))
        .collect();
    let selected_line = model.navigator.selected().map(|h| h.line);

    let lines: Vec<Line> = model
        .pane
        .visible_rows()
        .into_iter()
        .map(|row| {
            let mut row_style = heading_levels
                .get(&row.line)
                .map_or_else(style::text_style, |&level| style::style_for_level(level));
            if selected_line == Some(row.line) && model.panel_visible {
                row_style = row_style.reversed();
            }
            Line::styled(row.text, row_style)
        })
        .collect();

    let pane_block = Block::default().padding(Padding::new(1, 0, 0, 0));
    frame.render_widget(Paragraph::new(lines).block(pane_block), area);
}

/// The floating outline panel, centered over the document pane.
pub fn panel_rect(area: Rect, width_cols: u16, max_height_fraction: f32) -> Rect {
    let width = width_cols.min(area.width.saturating_sub(2)).max(10);
    let max_height = (f32::from(area.height) * max_height_fraction).round() as u16;
    let height = max_height.clamp(5, area.height.saturating_sub(2).max(5));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + 1;
    Rect::new(x, y, width, height.min(area.height))
}

/// Rows of list content a panel of `height` shows.
pub const fn panel_list_rows(height: u16) -> usize {
    height.saturating_sub(PANEL_LIST_TOP + PANEL_LIST_BOTTOM) as usize
}

fn render_panel(model: &mut Model, frame: &mut Frame, area: Rect) {
    let dims = model.panel_dims;
    let popup = panel_rect(area, dims.width_cols, dims.max_height_fraction);
    frame.render_widget(Clear, popup);

    let heading_total = model.navigator.headings().len();
    let title = format!(" Outline ({heading_total}) ");
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    frame.render_widget(block, popup);

    let inner_width = popup.width.saturating_sub(2) as usize;
    let filter_area = Rect::new(popup.x + 1, popup.y + 1, popup.width.saturating_sub(2), 1);
    let filter_line = Line::from(vec![
        Span::styled("> ", style::filter_style()),
        Span::raw(model.filter_input.clone()),
        Span::styled("\u{2582}", style::filter_style()),
    ]);
    frame.render_widget(Paragraph::new(filter_line), filter_area);

    let rows = panel_list_rows(popup.height);
    if let Some(index) = model.navigator.selected_index() {
        model.list.ensure_visible(index, rows);
    }
    let selected_id = model.navigator.selected_id().map(ToOwned::to_owned);
    let start = model.list.scroll_offset();

    let mut lines: Vec<Line> = Vec::with_capacity(rows);
    if model.list.nodes().is_empty() {
        let message = if heading_total == 0 {
            "no headings found"
        } else {
            "no matches"
        };
        lines.push(Line::styled(format!(" {message}"), style::hint_style()));
    } else {
        for node in model.list.nodes().iter().skip(start).take(rows) {
            let is_selected = selected_id.as_deref() == Some(node.id.as_str());
            let marker = if is_selected { ">" } else { " " };
            let mut label = format!("{marker}{}", node.label);
            label.truncate(label
                .char_indices()
                .nth(inner_width)
                .map_or(label.len(), |(i, _)| i));
            let base = style::style_for_level(node.level);
            let line_style = if is_selected { base.reversed() } else { base };
            lines.push(Line::styled(label, line_style));
        }
    }

    let list_area = Rect::new(
        popup.x + 1,
        popup.y + PANEL_LIST_TOP,
        popup.width.saturating_sub(2),
        popup.height.saturating_sub(PANEL_LIST_TOP + PANEL_LIST_BOTTOM),
    );
    frame.render_widget(Paragraph::new(lines), list_area);

    let footer_area = Rect::new(
        popup.x + 1,
        popup.y + popup.height.saturating_sub(2),
        popup.width.saturating_sub(2),
        1,
    );
    let footer = Paragraph::new(Line::styled(
        " enter jump \u{b7} ^y copy link \u{b7} esc close",
        style::hint_style(),
    ));
    frame.render_widget(footer, footer_area);
}

fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let filename = model
        .file_path
        .file_name()
        .map_or_else(|| "untitled".to_string(), |s| s.to_string_lossy().to_string());

    let (text, status_style) = if let Some((level, message)) = model.toast() {
        let bg = match level {
            ToastLevel::Info => Color::Blue,
            ToastLevel::Warning => Color::Yellow,
            ToastLevel::Error => Color::Red,
        };
        (
            format!(" {message}"),
            Style::default().bg(bg).fg(Color::White),
        )
    } else {
        let watch_indicator = if model.watch_enabled { " [watching]" } else { "" };
        let headings = model.outline.len();
        (
            format!(
                " {filename}{watch_indicator} \u{b7} {headings} headings \u{b7} row {}/{}",
                model.pane.viewport().offset() + 1,
                model.pane.viewport().total_rows().max(1),
            ),
            Style::default().bg(Color::Indexed(236)).fg(Color::White),
        )
    };
    frame.render_widget(Paragraph::new(text).style(status_style), area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let width = area.width.saturating_sub(8).clamp(30, 56);
    let height = 14.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let popup = Rect::new(x, y, width, height);
    frame.render_widget(Clear, popup);

    let lines = vec![
        Line::raw(" o / t      toggle outline panel"),
        Line::raw(" \u{2191}/\u{2193} tab    move selection (wraps)"),
        Line::raw(" enter      jump to heading"),
        Line::raw(" ctrl+y     copy heading link"),
        Line::raw(" type       filter headings"),
        Line::raw(" esc        close panel / help"),
        Line::raw(" j/k space  scroll document"),
        Line::raw(" g / G      top / bottom"),
        Line::raw(" w          toggle watch"),
        Line::raw(" r          reload"),
        Line::raw(" q          quit"),
    ];
    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .padding(Padding::new(1, 1, 0, 0));
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}
