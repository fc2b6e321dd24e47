use std::io::{Write, stdout};
use std::path::Path;
use std::time::Duration;

use base64::Engine;
use tracing::{info, warn};

use crate::app::{App, Message, Model, ToastLevel};
use crate::watcher::FileWatcher;

impl App {
    pub(super) fn make_file_watcher(path: &Path) -> notify::Result<FileWatcher> {
        FileWatcher::new(path, Duration::from_millis(200))
    }

    pub(super) fn handle_message_side_effects(
        model: &mut Model,
        file_watcher: &mut Option<FileWatcher>,
        msg: &Message,
    ) {
        match msg {
            Message::ToggleWatch => {
                if model.watch_enabled {
                    match Self::make_file_watcher(&model.file_path) {
                        Ok(watcher) => {
                            *file_watcher = Some(watcher);
                            model.show_toast(ToastLevel::Info, "Watching file changes");
                        }
                        Err(err) => {
                            model.watch_enabled = false;
                            *file_watcher = None;
                            model.show_toast(
                                ToastLevel::Warning,
                                format!("Watch unavailable: {err}"),
                            );
                            warn!(path = %model.file_path.display(), error = %err, "watcher failed");
                        }
                    }
                } else {
                    *file_watcher = None;
                    model.show_toast(ToastLevel::Info, "Watch disabled");
                }
            }
            Message::Save => {
                if Self::save(model)
                    && let Some(watcher) = file_watcher.as_mut()
                {
                    watcher.discard_pending();
                }
            }
            Message::FileChanged => Self::external_change(model),
            Message::ForceReload => match model.load_content() {
                Ok(()) => {
                    model.ensure_caret_visible();
                    model.show_toast(ToastLevel::Info, "Reloaded");
                }
                Err(err) => {
                    model.show_toast(ToastLevel::Error, format!("Reload failed: {err}"));
                    warn!(error = %err, "reload failed");
                }
            },
            Message::CopySelection => Self::copy_selection(model),
            _ => {}
        }
    }

    /// Persist the page content. Returns true when something was written.
    ///
    /// A changed file on disk blocks the first attempt; a second Ctrl+S
    /// overwrites it.
    fn save(model: &mut Model) -> bool {
        if model.read_only {
            model.show_toast(ToastLevel::Warning, "Read-only: changes not saved");
            return false;
        }
        let current = model.store().current_hash();
        let changed_on_disk =
            current.is_some() && model.disk_hash.is_some() && current != model.disk_hash;
        if changed_on_disk && !model.save_confirmed {
            model.disk_conflict = true;
            model.save_confirmed = true;
            model.show_toast(
                ToastLevel::Warning,
                "File changed on disk! Press Ctrl+S again to overwrite",
            );
            return false;
        }

        match model.store().save(&model.content) {
            Ok(hash) => {
                model.disk_hash = Some(hash);
                model.dirty = false;
                model.disk_conflict = false;
                model.save_confirmed = false;
                info!(path = %model.file_path.display(), forced = changed_on_disk, "saved");
                model.show_toast(ToastLevel::Info, "Saved");
                true
            }
            Err(err) => {
                warn!(error = %err, "save failed");
                model.show_toast(ToastLevel::Error, format!("Save failed: {err}"));
                false
            }
        }
    }

    /// Reload a clean document; flag a conflict on a dirty one.
    fn external_change(model: &mut Model) {
        let current = model.store().current_hash();
        if current.is_some() && current == model.disk_hash {
            return;
        }
        if model.dirty {
            model.disk_conflict = true;
            model.show_toast(
                ToastLevel::Warning,
                "File changed on disk. Ctrl+S overwrites, Ctrl+R reloads",
            );
            return;
        }
        match model.load_content() {
            Ok(()) => {
                model.ensure_caret_visible();
                model.show_toast(ToastLevel::Info, "Reloaded external changes");
            }
            Err(err) => {
                model.show_toast(ToastLevel::Error, format!("Reload failed: {err}"));
                warn!(error = %err, "reload failed");
            }
        }
    }

    fn copy_selection(model: &mut Model) {
        let text = model.editor.selected_text();
        if text.is_empty() {
            return;
        }
        match copy_to_clipboard(&text) {
            Ok(()) => model.show_toast(
                ToastLevel::Info,
                format!("Copied {} character(s)", text.chars().count()),
            ),
            Err(err) => model.show_toast(ToastLevel::Error, format!("Copy failed: {err}")),
        }
    }
}

fn copy_to_clipboard(text: &str) -> std::io::Result<()> {
    let osc = osc52_sequence(text);
    let mut out = stdout();
    out.write_all(osc.as_bytes())?;
    out.flush()
}

fn osc52_sequence(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{encoded}\x07")
}
