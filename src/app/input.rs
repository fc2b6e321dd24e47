use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::Frame;
use ratatui::layout::Rect;
use tracing::trace;

use crate::app::{App, Message, Model};
use crate::editor::{Direction, ToolbarAction, command_for_key};
use crate::ui::rows::offset_at;

use super::event_loop::ResizeDebouncer;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => Self::handle_key(*key, model),
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Paste(text) => Self::handle_paste(text, model),
            Event::FocusLost => Some(Message::Blur),
            Event::Resize(w, h) => {
                trace!(width = w, height = h, "resize queued");
                resize_debouncer.queue(*w, *h, now_ms);
                None
            }
            _ => None,
        }
    }

    pub(super) fn handle_paste(text: &str, model: &Model) -> Option<Message> {
        if model.help_visible {
            return None;
        }
        if let Some(url) = model.link_prompt.as_ref() {
            let mut next = url.clone();
            next.extend(text.chars().filter(|c| !c.is_control()));
            return Some(Message::LinkPromptInput(next));
        }
        Some(Message::Paste(text.to_string()))
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        if model.help_visible {
            return match key.code {
                KeyCode::Up => Some(Message::HelpScrollUp),
                KeyCode::Down => Some(Message::HelpScrollDown),
                _ => Some(Message::HideHelp),
            };
        }

        if let Some(url) = model.link_prompt.as_ref() {
            return match key.code {
                KeyCode::Esc => Some(Message::CancelLinkPrompt),
                KeyCode::Enter => Some(Message::ConfirmLink),
                KeyCode::Backspace => {
                    let mut next = url.clone();
                    next.pop();
                    Some(Message::LinkPromptInput(next))
                }
                KeyCode::Char(c)
                    if !key.modifiers.contains(KeyModifiers::CONTROL)
                        && !key.modifiers.contains(KeyModifiers::ALT) =>
                {
                    let mut next = url.clone();
                    next.push(c);
                    Some(Message::LinkPromptInput(next))
                }
                _ => None,
            };
        }

        if model.toolbar_armed {
            return match key.code {
                KeyCode::Char(c) => Some(
                    ToolbarAction::from_hotkey(c.to_ascii_lowercase())
                        .map_or(Message::DisarmToolbar, Message::Toolbar),
                ),
                _ => Some(Message::DisarmToolbar),
            };
        }

        if let Some(command) = command_for_key(key) {
            return Some(Message::Shortcut(command));
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            // Application
            KeyCode::Char('q') if ctrl => Some(Message::Quit),
            KeyCode::Char('s') if ctrl => Some(Message::Save),
            KeyCode::Char('t') if ctrl => Some(Message::ArmToolbar),
            KeyCode::Char('k') if ctrl => Some(Message::StartLinkPrompt),
            KeyCode::Char('a') if ctrl => Some(Message::SelectAll),
            KeyCode::Char('c') if ctrl => Some(Message::CopySelection),
            KeyCode::Char('r') if ctrl => Some(Message::ForceReload),
            KeyCode::Char('w') if ctrl => Some(Message::ToggleWatch),
            KeyCode::Char('l') if ctrl => Some(Message::Redraw),
            KeyCode::F(1) => Some(Message::ToggleHelp),

            // Caret
            KeyCode::Left => Some(Message::MoveCaret(Direction::Left, shift)),
            KeyCode::Right => Some(Message::MoveCaret(Direction::Right, shift)),
            KeyCode::Up => Some(Message::MoveCaret(Direction::Up, shift)),
            KeyCode::Down => Some(Message::MoveCaret(Direction::Down, shift)),
            KeyCode::Home if ctrl => Some(Message::DocumentStart(shift)),
            KeyCode::End if ctrl => Some(Message::DocumentEnd(shift)),
            KeyCode::Home => Some(Message::LineStart(shift)),
            KeyCode::End => Some(Message::LineEnd(shift)),
            KeyCode::PageUp => Some(Message::PageUp),
            KeyCode::PageDown => Some(Message::PageDown),
            KeyCode::Esc => Some(Message::Blur),

            // Editing
            KeyCode::Backspace => Some(Message::DeleteBackward),
            KeyCode::Delete => Some(Message::DeleteForward),
            KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                Some(Message::InsertText(c.to_string()))
            }

            _ => None,
        }
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        if model.help_visible || model.link_prompt.is_some() {
            return None;
        }

        if mouse.row == 0 {
            return match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => {
                    crate::ui::toolbar_button_at(model.toolbar_armed, mouse.column)
                        .map(Message::Toolbar)
                }
                _ => None,
            };
        }

        let doc_area = crate::ui::document_area(screen_area(model));
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if point_in_rect(mouse.column, mouse.row, doc_area) => {
                Some(Message::SetCaret(offset_for_cell(model, doc_area, mouse)))
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                Some(Message::ExtendTo(offset_for_cell(model, doc_area, mouse)))
            }
            MouseEventKind::ScrollDown => {
                if model.viewport.can_scroll_down() {
                    Some(Message::ScrollDown(3))
                } else {
                    None
                }
            }
            MouseEventKind::ScrollUp => {
                if model.viewport.can_scroll_up() {
                    Some(Message::ScrollUp(3))
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    pub(super) fn view(model: &Model, frame: &mut Frame) {
        crate::ui::render(model, frame);
    }
}

fn screen_area(model: &Model) -> Rect {
    Rect::new(
        0,
        0,
        model.viewport.width(),
        model
            .viewport
            .height()
            .saturating_add(crate::ui::CHROME_ROWS),
    )
}

const fn point_in_rect(col: u16, row: u16, rect: Rect) -> bool {
    col >= rect.x && col < rect.x + rect.width && row >= rect.y && row < rect.y + rect.height
}

/// Document offset under a mouse position. Rows past the text map to the
/// end of the document.
fn offset_for_cell(model: &Model, doc_area: Rect, mouse: MouseEvent) -> usize {
    let row = model.viewport.offset() + usize::from(mouse.row.saturating_sub(doc_area.y));
    let col = usize::from(mouse.column.saturating_sub(doc_area.x));
    offset_at(&model.rows, row, col).unwrap_or_else(|| model.editor.document().text_len())
}
