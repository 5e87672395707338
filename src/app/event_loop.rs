use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::app::{App, Message, Model, PANE_VIEW, ToastLevel, update};
use crate::navigator::{Debouncer, FILTER_DEBOUNCE_MS, PREVIEW_DEBOUNCE_MS};
use crate::watcher::FileWatcher;

const RESIZE_DEBOUNCE_MS: u64 = 100;
const IDLE_POLL_MS: u64 = 250;

impl App {
    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal initialization, reading the document,
    /// or the event loop encounters an I/O failure.
    pub fn run(&mut self) -> Result<()> {
        let source = std::fs::read_to_string(&self.file_path)
            .with_context(|| format!("Failed to read {}", self.file_path.display()))?;

        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal - headway requires an interactive terminal")?;
        let size = terminal.size()?;

        let mut model = Model::new(self.file_path.clone(), source, (size.width, size.height));
        model.watch_enabled = self.watch_enabled;
        model.panel_dims = self.panel_dims;
        if self.panel_visible {
            model.open_panel();
        }

        execute!(stdout(), EnableMouseCapture)?;
        let result = Self::event_loop(&mut terminal, &mut model);
        let _ = execute!(stdout(), DisableMouseCapture);
        ratatui::restore();

        result
    }

    /// Queue or cancel the filter/preview debouncers for a just-applied
    /// message. Previews chase user-driven selection changes; a confirmed
    /// jump supersedes any pending preview.
    pub(super) fn queue_nav_debouncers(
        model: &Model,
        msg: &Message,
        now_ms: u64,
        filter_debouncer: &mut Debouncer<String>,
        preview_debouncer: &mut Debouncer<String>,
    ) {
        match msg {
            Message::FilterInput(text) => {
                filter_debouncer.queue(text.clone(), now_ms);
            }
            Message::MoveSelection(_) | Message::HoverIndex(_) | Message::FilterApply(_) => {
                if model.panel_visible
                    && let Some(id) = model.navigator.selected_id()
                {
                    preview_debouncer.queue(id.to_string(), now_ms);
                }
            }
            Message::Confirm | Message::ClickItem(_) => {
                preview_debouncer.cancel();
            }
            Message::ClosePanel | Message::TogglePanel if !model.panel_visible => {
                filter_debouncer.cancel();
                preview_debouncer.cancel();
            }
            _ => {}
        }
    }

    fn event_loop(terminal: &mut DefaultTerminal, model: &mut Model) -> Result<()> {
        let start = Instant::now();
        let mut resize_debouncer: Debouncer<(u16, u16)> = Debouncer::new(RESIZE_DEBOUNCE_MS);
        let mut filter_debouncer: Debouncer<String> = Debouncer::new(FILTER_DEBOUNCE_MS);
        let mut preview_debouncer: Debouncer<String> = Debouncer::new(PREVIEW_DEBOUNCE_MS);
        let mut file_watcher = if model.watch_enabled {
            match Self::make_file_watcher(&model.file_path) {
                Ok(watcher) => Some(watcher),
                Err(err) => {
                    model.watch_enabled = false;
                    model.show_toast(ToastLevel::Warning, format!("Watch unavailable: {err}"));
                    tracing::warn!(
                        path = %model.file_path.display(),
                        "failed to start watcher: {err}"
                    );
                    None
                }
            }
        } else {
            None
        };
        let mut needs_render = true;

        loop {
            let now_ms = elapsed_ms(start);

            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }

            if let Some((width, height)) = resize_debouncer.take_ready(now_ms) {
                *model = update(std::mem::take(model), Message::Resize(width, height));
                needs_render = true;
            }

            if let Some(query) = filter_debouncer.take_ready(now_ms) {
                let msg = Message::FilterApply(query);
                *model = update(std::mem::take(model), msg.clone());
                Self::queue_nav_debouncers(
                    model,
                    &msg,
                    now_ms,
                    &mut filter_debouncer,
                    &mut preview_debouncer,
                );
                needs_render = true;
            }

            if let Some(id) = preview_debouncer.take_ready(now_ms) {
                Self::preview_selected(model, &id, now_ms);
                needs_render = true;
            }

            if model.watch_enabled
                && file_watcher
                    .as_mut()
                    .is_some_and(FileWatcher::take_change_ready)
            {
                *model = update(std::mem::take(model), Message::FileChanged);
                Self::handle_message_side_effects(
                    model,
                    &mut file_watcher,
                    &Message::FileChanged,
                    now_ms,
                );
                needs_render = true;
            }

            if model
                .convergence
                .next_deadline()
                .is_some_and(|deadline| deadline <= now_ms)
            {
                model.convergence.tick(PANE_VIEW, &mut model.pane, now_ms);
                needs_render = true;
            }

            // Poll until the earliest pending deadline, capped at an idle
            // heartbeat so toasts still expire.
            let poll_ms = if needs_render {
                0
            } else {
                let deadlines = [
                    resize_debouncer.next_deadline(),
                    filter_debouncer.next_deadline(),
                    preview_debouncer.next_deadline(),
                    model.convergence.next_deadline(),
                ];
                deadlines
                    .into_iter()
                    .flatten()
                    .min()
                    .map_or(IDLE_POLL_MS, |deadline| {
                        deadline.saturating_sub(now_ms).clamp(1, IDLE_POLL_MS)
                    })
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                // Refresh the timestamp after the poll wait so debouncers
                // see accurate times.
                let event_ms = elapsed_ms(start);
                let msg =
                    Self::handle_event(&event::read()?, model, event_ms, &mut resize_debouncer);
                if let Some(msg) = msg {
                    let side_msg = msg.clone();
                    *model = update(std::mem::take(model), msg);
                    Self::handle_message_side_effects(
                        model,
                        &mut file_watcher,
                        &side_msg,
                        event_ms,
                    );
                    Self::queue_nav_debouncers(
                        model,
                        &side_msg,
                        event_ms,
                        &mut filter_debouncer,
                        &mut preview_debouncer,
                    );
                    needs_render = true;
                }

                // Coalesce key repeat bursts into a single render.
                while event::poll(Duration::from_millis(0))? {
                    let drain_ms = elapsed_ms(start);
                    let msg =
                        Self::handle_event(&event::read()?, model, drain_ms, &mut resize_debouncer);
                    if let Some(msg) = msg {
                        let side_msg = msg.clone();
                        *model = update(std::mem::take(model), msg);
                        Self::handle_message_side_effects(
                            model,
                            &mut file_watcher,
                            &side_msg,
                            drain_ms,
                        );
                        Self::queue_nav_debouncers(
                            model,
                            &side_msg,
                            drain_ms,
                            &mut filter_debouncer,
                            &mut preview_debouncer,
                        );
                        needs_render = true;
                    }
                }
            }

            if needs_render {
                terminal.draw(|frame| crate::ui::render(model, frame))?;
                needs_render = false;
            }

            if model.should_quit {
                break;
            }
        }
        Ok(())
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
