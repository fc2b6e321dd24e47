//! Rich-text editing surface.
//!
//! Wraps a [`crate::document::Document`] with a selection, implements
//! selection wrapping, caret-relative insertion and paste sanitizing, and
//! maps keyboard shortcuts and toolbar controls to those operations.

mod composer;
mod selection;
mod shortcuts;
mod toolbar;

pub use composer::{EditOutcome, RichTextEditor, sanitize_paste};
pub use selection::{Direction, Selection};
pub use shortcuts::{EditorCommand, command_for_key};
pub use toolbar::ToolbarAction;
