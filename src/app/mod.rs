//! Page state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete page state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{Model, ToastLevel};
pub use update::{Message, update};

use std::path::PathBuf;

use crate::context::AppContext;

/// Main application struct that owns the context and runs the event loop.
pub struct App {
    file_path: PathBuf,
    ctx: AppContext,
    watch_enabled: bool,
    read_only: bool,
    placeholder: Option<String>,
    config_global_path: Option<PathBuf>,
    config_local_path: Option<PathBuf>,
}

impl App {
    /// Create a new application editing the given file.
    pub fn new(file_path: PathBuf, ctx: AppContext) -> Self {
        Self {
            file_path,
            ctx,
            watch_enabled: false,
            read_only: false,
            placeholder: None,
            config_global_path: None,
            config_local_path: None,
        }
    }

    /// Enable or disable file watching.
    pub fn with_watch(mut self, enabled: bool) -> Self {
        self.watch_enabled = enabled;
        self
    }

    /// Open the page without saving.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Text shown while the document is empty.
    pub fn with_placeholder(mut self, placeholder: Option<String>) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// Set config paths to show in help.
    pub fn with_config_paths(
        mut self,
        global_path: Option<PathBuf>,
        local_path: Option<PathBuf>,
    ) -> Self {
        self.config_global_path = global_path;
        self.config_local_path = local_path;
        self
    }

    /// Hand the context back for teardown.
    pub fn into_context(self) -> AppContext {
        self.ctx
    }
}
