//! Keyboard shortcuts handled by the editing surface itself.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::document::FormatTag;

/// A command produced by an editor shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCommand {
    Format(FormatTag),
    /// Plain Enter inserts a line break instead of splitting a paragraph.
    InsertLineBreak,
}

/// Map a key to an editor command.
///
/// The table is fixed: Ctrl/Cmd+B, Ctrl/Cmd+I and Ctrl/Cmd+U format the
/// selection, plain Enter inserts a line break. Everything else returns
/// `None` and is left to the caller.
pub fn command_for_key(key: KeyEvent) -> Option<EditorCommand> {
    let command_modifier = key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER);
    match key.code {
        KeyCode::Char(c) if command_modifier => match c.to_ascii_lowercase() {
            'b' => Some(EditorCommand::Format(FormatTag::Bold)),
            'i' => Some(EditorCommand::Format(FormatTag::Italic)),
            'u' => Some(EditorCommand::Format(FormatTag::Underline)),
            _ => None,
        },
        KeyCode::Enter if key.modifiers.is_empty() => Some(EditorCommand::InsertLineBreak),
        _ => None,
    }
}
