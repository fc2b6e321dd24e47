//! Terminal UI components.
//!
//! This module contains all UI-related code including:
//! - [`viewport`]: Scroll position and visible range management
//! - [`rows`]: Wrapping display lines into terminal rows
//! - [`style`]: Theming and colors

pub mod rows;
pub mod style;
pub mod viewport;

mod overlays;
mod render;
mod status;
mod toolbar;

pub use render::{document_area, render};
pub use toolbar::{ToolbarButton, toolbar_button_at, toolbar_buttons};

pub const DOCUMENT_LEFT_PADDING: u16 = 2;

/// Rows taken by the toolbar and the status bar.
pub const CHROME_ROWS: u16 = 2;
