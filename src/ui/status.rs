use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, ToastLevel};
use crate::session::{AuthState, unix_now};

pub fn render_link_prompt_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let url = model.link_prompt.as_deref().unwrap_or_default();
    let text = format!("Link URL: {url}\u{2588}  Enter: insert  Esc: cancel");
    let bar = Paragraph::new(text).style(Style::default().bg(Color::Blue).fg(Color::White));
    frame.render_widget(bar, area);
}

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let filename = model.file_path.file_name().map_or_else(
        || "untitled".to_string(),
        |s| s.to_string_lossy().to_string(),
    );

    let dirty_indicator = if model.dirty { " [modified]" } else { "" };
    let conflict_indicator = if model.disk_conflict {
        " [changed on disk]"
    } else {
        ""
    };
    let mode_indicator = if model.read_only {
        " [read-only]"
    } else if model.editor.is_disabled() {
        " [disabled]"
    } else {
        ""
    };
    let watch_indicator = if model.watch_enabled {
        " [watching]"
    } else {
        ""
    };
    let session = session_label(model.ctx.auth(), unix_now());
    let percent = model.viewport.scroll_percent();

    let status = format!(
        " {filename}{dirty_indicator}{conflict_indicator}{mode_indicator}  {session}{watch_indicator}  [{percent}%]  ^T:toolbar ^S:save F1:help"
    );

    let status_bar = Paragraph::new(status).style(model.ctx.theme().status_style());
    frame.render_widget(status_bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}

/// Who is signed in, for the status bar.
pub(super) fn session_label(auth: &AuthState, now: u64) -> String {
    match auth {
        AuthState::Anonymous => "signed out".to_string(),
        AuthState::Expired(session) => format!("{} [session expired]", session.label()),
        AuthState::Authenticated(session) => match session.claims().expires_at {
            Some(exp) => format!(
                "{}, expires in {}",
                session.label(),
                short_duration(exp.saturating_sub(now))
            ),
            None => session.label(),
        },
    }
}

fn short_duration(secs: u64) -> String {
    match secs {
        0..60 => "<1m".to_string(),
        60..3_600 => format!("{}m", secs / 60),
        3_600..86_400 => format!("{}h", secs / 3_600),
        _ => format!("{}d", secs / 86_400),
    }
}
