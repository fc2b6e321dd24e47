// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. editor::EditorCommand)
    clippy::module_name_repetitions
)]

//! # Inkdesk
//!
//! A terminal editor for the rich-text "About" page of an event.
//!
//! Inkdesk edits a small HTML fragment with:
//! - Bold, italic and underline formatting
//! - Headings, bullet and numbered lists, alignment and links
//! - A toolbar that freezes while editing is disabled
//! - A placeholder for empty pages
//! - A persisted session token gating edits
//!
//! ## Architecture
//!
//! Inkdesk uses The Elm Architecture (TEA) pattern:
//! - **Model**: Page state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`app`]: Main application loop and page state
//! - [`document`]: HTML fragment model, parsing and serialization
//! - [`editor`]: The rich-text editing surface and its toolbar
//! - [`session`]: Session tokens and their persistence
//! - [`context`]: Process-wide session and theme
//! - [`store`]: Where page content is loaded from and saved to
//! - [`ui`]: Terminal UI components
//! - [`watcher`]: File watching

pub mod app;
pub mod config;
pub mod context;
pub mod document;
pub mod editor;
pub mod session;
pub mod store;
pub mod ui;
pub mod watcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::document::Document;
    pub use crate::editor::{EditOutcome, RichTextEditor, ToolbarAction};
    pub use crate::ui::viewport::Viewport;
}
