use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::context::AppContext;
use crate::editor::RichTextEditor;
use crate::store::{ContentStore, FileContentStore, StoreError};
use crate::ui::rows::{DisplayRow, caret_cell, wrap_lines};
use crate::ui::viewport::Viewport;
use crate::ui::{CHROME_ROWS, DOCUMENT_LEFT_PADDING};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// The complete state of the page editor.
///
/// All state lives here - no global or scattered state.
pub struct Model {
    /// The rich-text editing surface
    pub editor: RichTextEditor,
    /// Session and theme
    pub ctx: AppContext,
    /// The page's copy of the content, as last reported by the editor
    pub content: String,
    /// Document wrapped to the current width
    pub rows: Vec<DisplayRow>,
    /// Viewport managing scroll position over `rows`
    pub viewport: Viewport,
    /// Path of the content file
    pub file_path: PathBuf,
    store: Box<dyn ContentStore>,
    /// Whether file watching is enabled
    pub watch_enabled: bool,
    /// Saving disabled and editor frozen
    pub read_only: bool,
    /// Global config path shown in help
    pub config_global_path: Option<PathBuf>,
    /// Local override path shown in help
    pub config_local_path: Option<PathBuf>,
    /// Whether help overlay is visible
    pub help_visible: bool,
    pub help_scroll_offset: usize,
    /// URL being typed for a link insertion
    pub link_prompt: Option<String>,
    /// Ctrl+T was pressed; the next key picks a toolbar action
    pub toolbar_armed: bool,
    toast: Option<Toast>,
    /// Whether the app should quit
    pub should_quit: bool,
    /// Content changed since the last load or save
    pub dirty: bool,
    /// Hash of the stored content when it was last loaded or saved
    pub disk_hash: Option<u64>,
    /// The stored content changed under unsaved edits
    pub disk_conflict: bool,
    /// Set after first save attempt when disk conflict detected; allows second save to force
    pub save_confirmed: bool,
    /// Set after first quit attempt with unsaved changes; allows second quit to proceed
    pub quit_confirmed: bool,
    /// Latest content reported by the editor's change callback
    changes: Rc<RefCell<Option<String>>>,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("file_path", &self.file_path)
            .field("editor", &self.editor)
            .field("dirty", &self.dirty)
            .field("watch_enabled", &self.watch_enabled)
            .field("read_only", &self.read_only)
            .finish_non_exhaustive()
    }
}

impl Model {
    /// Create a model for `file_path` with an empty editor.
    ///
    /// Content is read separately with [`Self::load_content`].
    pub fn new(file_path: PathBuf, ctx: AppContext, terminal_size: (u16, u16)) -> Self {
        let mut editor = RichTextEditor::new();
        let changes = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&changes);
        editor.set_on_change(move |html| {
            *sink.borrow_mut() = Some(html.to_string());
        });

        let mut model = Self {
            editor,
            ctx,
            viewport: Viewport::new(
                terminal_size.0,
                terminal_size.1.saturating_sub(CHROME_ROWS),
                0,
            ),
            store: Box::new(FileContentStore::new(&file_path)),
            file_path,
            changes,
            ..Self::default()
        };
        model.apply_gates();
        model.reflow();
        model
    }

    /// Replace the content store.
    #[must_use]
    pub fn with_store(mut self, store: Box<dyn ContentStore>) -> Self {
        self.store = store;
        self
    }

    pub fn store(&self) -> &dyn ContentStore {
        self.store.as_ref()
    }

    /// Freeze the editor when saving is off or the session gate is closed.
    pub fn apply_gates(&mut self) {
        let disabled = self.read_only || !self.ctx.editing_allowed();
        if disabled != self.editor.is_disabled() {
            self.editor.set_disabled(disabled);
        }
    }

    /// Read the stored content into the editor, discarding local changes.
    pub fn load_content(&mut self) -> Result<(), StoreError> {
        let loaded = self.store.load()?;
        self.editor.set_content(&loaded.html);
        self.content = self.editor.content();
        self.disk_hash = Some(loaded.hash);
        self.dirty = false;
        self.disk_conflict = false;
        self.reflow();
        info!(source = %self.store.describe(), "content loaded");
        Ok(())
    }

    /// Pick up content reported by the editor's change callback.
    ///
    /// Returns true if anything was reported.
    pub(super) fn absorb_changes(&mut self) -> bool {
        let Some(html) = self.changes.borrow_mut().take() else {
            return false;
        };
        self.content = html;
        self.dirty = true;
        true
    }

    /// Columns available to document text.
    pub(super) fn content_width(&self) -> usize {
        usize::from(
            self.viewport
                .width()
                .saturating_sub(DOCUMENT_LEFT_PADDING)
                .max(1),
        )
    }

    /// Re-wrap the document after an edit or resize.
    pub(super) fn reflow(&mut self) {
        self.rows = wrap_lines(&self.editor.document().layout(), self.content_width());
        self.viewport.set_total_rows(self.rows.len());
    }

    pub(super) fn ensure_caret_visible(&mut self) {
        let (row, _) = caret_cell(&self.rows, self.editor.caret());
        self.viewport.ensure_visible(row);
    }

    /// Check the session clock. Returns true when the session just expired.
    pub fn refresh_session(&mut self, now: u64) -> bool {
        if !self.ctx.refresh_expiry(now) {
            return false;
        }
        self.apply_gates();
        self.show_toast(
            ToastLevel::Warning,
            "Session expired. Sign in again with --token",
        );
        true
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        let message = message.into();
        debug!(?level, %message, "toast");
        self.toast = Some(Toast {
            level,
            message,
            expires_at: Instant::now() + Duration::from_secs(4),
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }
}

// Implement Default for Model to allow std::mem::take
impl Default for Model {
    fn default() -> Self {
        Self {
            editor: RichTextEditor::new(),
            ctx: AppContext::default(),
            content: String::new(),
            rows: Vec::new(),
            viewport: Viewport::new(80, 22, 0),
            file_path: PathBuf::new(),
            store: Box::new(FileContentStore::new(PathBuf::new())),
            watch_enabled: false,
            read_only: false,
            config_global_path: None,
            config_local_path: None,
            help_visible: false,
            help_scroll_offset: 0,
            link_prompt: None,
            toolbar_armed: false,
            toast: None,
            should_quit: false,
            dirty: false,
            disk_hash: None,
            disk_conflict: false,
            save_confirmed: false,
            quit_confirmed: false,
            changes: Rc::default(),
        }
    }
}
