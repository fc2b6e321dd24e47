use tracing::debug;

use crate::app::{Model, ToastLevel};
use crate::editor::{Direction, EditOutcome, EditorCommand, RichTextEditor, ToolbarAction};

/// All possible events and actions in the application.
///
/// These represent user input, system events, and internal actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Editing
    /// Typed text
    InsertText(String),
    /// Plain text from the clipboard
    Paste(String),
    /// Backspace
    DeleteBackward,
    /// Delete
    DeleteForward,
    /// A fixed editor shortcut (Ctrl+B/I/U, Enter)
    Shortcut(EditorCommand),
    /// A toolbar control
    Toolbar(ToolbarAction),
    /// Ctrl+T: the next key picks a toolbar action
    ArmToolbar,
    /// Leave the toolbar prefix without an action
    DisarmToolbar,

    // Caret and selection (the flag extends the selection)
    MoveCaret(Direction, bool),
    LineStart(bool),
    LineEnd(bool),
    DocumentStart(bool),
    DocumentEnd(bool),
    SelectAll,
    /// Place the caret at an offset (mouse press)
    SetCaret(usize),
    /// Extend the selection to an offset (mouse drag)
    ExtendTo(usize),
    /// Copy the selected text to the clipboard
    CopySelection,
    /// Leave the editor
    Blur,

    // Link prompt
    StartLinkPrompt,
    LinkPromptInput(String),
    ConfirmLink,
    CancelLinkPrompt,

    // Navigation
    /// Scroll up by n rows
    ScrollUp(usize),
    /// Scroll down by n rows
    ScrollDown(usize),
    PageUp,
    PageDown,

    // File
    /// Save the content (a second press overwrites external changes)
    Save,
    /// File changed externally
    FileChanged,
    /// Reload from disk, discarding changes
    ForceReload,
    /// Toggle file watching
    ToggleWatch,

    // Help
    ToggleHelp,
    HideHelp,
    HelpScrollUp,
    HelpScrollDown,

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
/// Saving, reloading, watching and the clipboard are side effects and run
/// afterwards in `App::handle_message_side_effects`.
pub fn update(mut model: Model, msg: Message) -> Model {
    // Reset confirmation flags on any action other than the confirmed one.
    // Save preserves the quit flag so Ctrl+S can complete a pending quit.
    if !matches!(msg, Message::Quit | Message::Save) {
        model.quit_confirmed = false;
    }
    if !matches!(msg, Message::Save) {
        model.save_confirmed = false;
    }

    match msg {
        // Editing
        Message::InsertText(text) => edit(&mut model, |e| e.insert_text(&text)),
        Message::Paste(text) => edit(&mut model, |e| e.paste_text(&text)),
        Message::DeleteBackward => edit(&mut model, RichTextEditor::delete_backward),
        Message::DeleteForward => edit(&mut model, RichTextEditor::delete_forward),
        Message::Shortcut(command) => edit(&mut model, |e| e.execute(command)),
        Message::Toolbar(action) => {
            model.toolbar_armed = false;
            if action == ToolbarAction::Link {
                start_link_prompt(&mut model);
            } else {
                edit(&mut model, |e| e.apply_toolbar(action));
            }
        }
        Message::ArmToolbar => {
            model.toolbar_armed = model.editor.toolbar_enabled();
        }
        Message::DisarmToolbar => {
            model.toolbar_armed = false;
        }

        // Caret and selection
        Message::MoveCaret(direction, extend) => {
            navigate(&mut model, |e| e.move_caret(direction, extend));
        }
        Message::LineStart(extend) => navigate(&mut model, |e| e.move_line_start(extend)),
        Message::LineEnd(extend) => navigate(&mut model, |e| e.move_line_end(extend)),
        Message::DocumentStart(extend) => {
            navigate(&mut model, |e| e.move_document_start(extend));
        }
        Message::DocumentEnd(extend) => navigate(&mut model, |e| e.move_document_end(extend)),
        Message::SelectAll => navigate(&mut model, RichTextEditor::select_all),
        Message::SetCaret(offset) => navigate(&mut model, |e| e.set_caret(offset)),
        Message::ExtendTo(offset) => {
            let anchor = model.editor.selection().anchor;
            navigate(&mut model, |e| e.select(anchor, offset));
        }
        Message::Blur => {
            model.editor.blur();
        }

        // Link prompt
        Message::StartLinkPrompt => start_link_prompt(&mut model),
        Message::LinkPromptInput(url) => {
            if model.link_prompt.is_some() {
                model.link_prompt = Some(url);
            }
        }
        Message::ConfirmLink => {
            if let Some(url) = model.link_prompt.take() {
                edit(&mut model, |e| e.insert_link(&url));
            }
        }
        Message::CancelLinkPrompt => {
            model.link_prompt = None;
        }

        // Navigation
        Message::ScrollUp(n) => model.viewport.scroll_up(n),
        Message::ScrollDown(n) => model.viewport.scroll_down(n),
        Message::PageUp => model.viewport.page_up(),
        Message::PageDown => model.viewport.page_down(),

        // File watching
        Message::ToggleWatch => {
            model.watch_enabled = !model.watch_enabled;
        }
        // Save/FileChanged/ForceReload/CopySelection: handled in effects
        // Redraw: no state change needed
        Message::Save
        | Message::FileChanged
        | Message::ForceReload
        | Message::CopySelection
        | Message::Redraw => {}

        // Help
        Message::ToggleHelp => {
            model.help_visible = !model.help_visible;
            model.help_scroll_offset = 0;
        }
        Message::HideHelp => {
            model.help_visible = false;
        }
        Message::HelpScrollUp => {
            model.help_scroll_offset = model.help_scroll_offset.saturating_sub(1);
        }
        Message::HelpScrollDown => {
            model.help_scroll_offset = model.help_scroll_offset.saturating_add(1);
        }

        // Window
        Message::Resize(width, height) => {
            model
                .viewport
                .resize(width, height.saturating_sub(crate::ui::CHROME_ROWS));
            model.reflow();
            model.ensure_caret_visible();
        }

        // Application
        Message::Quit => {
            if model.dirty && !model.quit_confirmed {
                model.show_toast(
                    ToastLevel::Warning,
                    "Unsaved changes! Press Ctrl+Q again to quit, or Ctrl+S to save",
                );
                model.quit_confirmed = true;
            } else {
                model.should_quit = true;
            }
        }
    }
    model
}

/// Run a mutating editor operation and pull its change into the page state.
fn edit(model: &mut Model, op: impl FnOnce(&mut RichTextEditor) -> EditOutcome) {
    model.editor.focus();
    let outcome = op(&mut model.editor);
    if outcome.is_changed() && model.absorb_changes() {
        debug!(bytes = model.content.len(), "content changed");
        model.reflow();
    }
    model.ensure_caret_visible();
}

fn navigate(model: &mut Model, op: impl FnOnce(&mut RichTextEditor)) {
    model.editor.focus();
    op(&mut model.editor);
    model.ensure_caret_visible();
}

fn start_link_prompt(model: &mut Model) {
    if model.editor.toolbar_enabled() {
        model.link_prompt = Some(String::new());
    }
}
