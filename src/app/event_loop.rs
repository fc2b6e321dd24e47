use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use crossterm::event::{
    DisableBracketedPaste, DisableFocusChange, DisableMouseCapture, EnableBracketedPaste,
    EnableFocusChange, EnableMouseCapture,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use tracing::{debug, info, trace, warn};

use crate::app::{App, Message, Model, ToastLevel, update};
use crate::session::unix_now;
use crate::watcher::FileWatcher;

pub(super) struct ResizeDebouncer {
    delay_ms: u64,
    pending: Option<(u16, u16, u64)>,
}

impl ResizeDebouncer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub(super) const fn queue(&mut self, width: u16, height: u16, now_ms: u64) {
        self.pending = Some((width, height, now_ms));
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> Option<(u16, u16)> {
        let (width, height, queued_at) = self.pending?;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            Some((width, height))
        } else {
            None
        }
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl App {
    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal initialization or the event loop hits an
    /// I/O failure. Content load and save failures are shown in the UI.
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal: inkdesk requires an interactive terminal")?;
        let size = terminal.size()?;
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            EnableFocusChange
        )?;

        let mut model = self.build_model((size.width, size.height));
        info!(
            path = %model.file_path.display(),
            width = size.width,
            height = size.height,
            read_only = model.read_only,
            "editor started"
        );

        let result = Self::event_loop(&mut terminal, &mut model);

        let _ = execute!(
            stdout(),
            DisableFocusChange,
            DisableBracketedPaste,
            DisableMouseCapture
        );
        ratatui::restore();

        self.ctx = std::mem::take(&mut model.ctx);
        result
    }

    fn build_model(&mut self, terminal_size: (u16, u16)) -> Model {
        let ctx = std::mem::take(&mut self.ctx);
        let mut model = Model::new(self.file_path.clone(), ctx, terminal_size);
        if self.placeholder.is_some() {
            model.editor.set_placeholder(self.placeholder.clone());
        }
        model.read_only = self.read_only;
        model.watch_enabled = self.watch_enabled;
        model
            .config_global_path
            .clone_from(&self.config_global_path);
        model.config_local_path.clone_from(&self.config_local_path);
        model.apply_gates();

        if let Err(err) = model.load_content() {
            warn!(error = %err, "initial load failed");
            model.show_toast(ToastLevel::Error, format!("Load failed: {err}"));
        }
        if !model.ctx.editing_allowed() {
            model.show_toast(
                ToastLevel::Warning,
                "Sign in with --token to enable editing",
            );
        }
        model
    }

    fn event_loop(terminal: &mut DefaultTerminal, model: &mut Model) -> Result<()> {
        let start = Instant::now();
        let mut resize_debouncer = ResizeDebouncer::new(100);
        let mut file_watcher = if model.watch_enabled {
            match Self::make_file_watcher(&model.file_path) {
                Ok(watcher) => Some(watcher),
                Err(err) => {
                    model.watch_enabled = false;
                    model.show_toast(ToastLevel::Warning, format!("Watch unavailable: {err}"));
                    warn!(path = %model.file_path.display(), error = %err, "watcher failed");
                    None
                }
            }
        } else {
            None
        };
        let mut frame_idx: u64 = 0;
        let mut needs_render = true;
        let mut last_session_check = Instant::now();

        loop {
            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }

            if last_session_check.elapsed() >= Duration::from_secs(1) {
                last_session_check = Instant::now();
                if model.refresh_session(unix_now()) {
                    needs_render = true;
                }
            }

            let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            if let Some((width, height)) = resize_debouncer.take_ready(now_ms) {
                debug!(frame = frame_idx, width, height, "resize applied");
                *model = update(std::mem::take(model), Message::Resize(width, height));
                needs_render = true;
            }

            if model.watch_enabled
                && file_watcher
                    .as_mut()
                    .is_some_and(FileWatcher::take_change_ready)
            {
                *model = update(std::mem::take(model), Message::FileChanged);
                Self::handle_message_side_effects(model, &mut file_watcher, &Message::FileChanged);
                needs_render = true;
            }

            // Handle events
            let poll_ms = if needs_render {
                0
            } else if resize_debouncer.is_pending() {
                10
            } else {
                250
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                // Refresh timestamp after poll wait so the debouncer uses accurate times.
                let event_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                let msg =
                    Self::handle_event(&event::read()?, model, event_ms, &mut resize_debouncer);
                if let Some(msg) = msg {
                    trace!(frame = frame_idx, ?msg, "message");
                    Self::dispatch(model, &mut file_watcher, msg);
                    needs_render = true;
                }

                // Coalesce key repeat bursts and pastes into a single render.
                let mut drained = 0_u32;
                while event::poll(Duration::from_millis(0))? {
                    let drain_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                    let msg =
                        Self::handle_event(&event::read()?, model, drain_ms, &mut resize_debouncer);
                    if let Some(msg) = msg {
                        drained += 1;
                        Self::dispatch(model, &mut file_watcher, msg);
                        needs_render = true;
                    }
                }
                if drained > 0 {
                    trace!(frame = frame_idx, drained, "events drained");
                }
            }

            if needs_render {
                frame_idx += 1;
                let draw_start = Instant::now();
                terminal.draw(|frame| Self::view(model, frame))?;
                trace!(
                    frame = frame_idx,
                    draw_ms = draw_start.elapsed().as_secs_f64() * 1000.0,
                    "frame drawn"
                );
                needs_render = false;
            }

            if model.should_quit {
                info!(dirty = model.dirty, "quit");
                break;
            }
        }
        Ok(())
    }

    /// Apply one message: state transition, then its side effects.
    pub(super) fn dispatch(model: &mut Model, file_watcher: &mut Option<FileWatcher>, msg: Message) {
        let side_msg = msg.clone();
        *model = update(std::mem::take(model), msg);
        Self::handle_message_side_effects(model, file_watcher, &side_msg);
    }
}
