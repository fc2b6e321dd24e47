use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::app::Model;
use crate::editor::ToolbarAction;

pub fn render_help_overlay(model: &Model, frame: &mut Frame, area: Rect) {
    let popup_width = area.width.saturating_sub(12).max(48);
    let popup_height = area.height.saturating_sub(6).max(12);
    let popup = centered_popup_rect(popup_width, popup_height, area);

    let global_cfg = model
        .config_global_path
        .as_ref()
        .map_or_else(|| "<unknown>".to_string(), |p| p.display().to_string());
    let local_cfg = model
        .config_local_path
        .as_ref()
        .map_or_else(|| "<none>".to_string(), |p| p.display().to_string());
    let session_file = model.ctx.sessions().path().display().to_string();

    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let dim_style = Style::default().fg(Color::Indexed(245));

    let mut all_lines: Vec<Line> = Vec::new();

    all_lines.push(Line::styled("Editing", section_style));
    all_lines.push(Line::raw("  Type, Backspace, Del     Edit text"));
    all_lines.push(Line::raw("  Enter                    Line break"));
    all_lines.push(Line::raw("  Paste                    Insert plain text"));
    all_lines.push(Line::raw("  Esc                      Leave the editor"));
    all_lines.push(Line::raw(""));

    all_lines.push(Line::styled("Formatting", section_style));
    all_lines.push(Line::raw("  Ctrl-b / Ctrl-i / Ctrl-u Bold / italic / underline"));
    all_lines.push(Line::raw("  Ctrl-k                   Insert link"));
    all_lines.push(Line::raw("  Ctrl-t then key          Toolbar:"));
    for action in ToolbarAction::ALL {
        all_lines.push(Line::raw(format!(
            "    {}  {:<4} {action}",
            action.hotkey(),
            action.label()
        )));
    }
    all_lines.push(Line::raw(""));

    all_lines.push(Line::styled("Selection", section_style));
    all_lines.push(Line::raw("  Arrows, Home/End         Move caret"));
    all_lines.push(Line::raw("  Ctrl+Home/End            Document start / end"));
    all_lines.push(Line::raw("  Shift + movement         Extend selection"));
    all_lines.push(Line::raw("  Ctrl-a                   Select all"));
    all_lines.push(Line::raw("  Ctrl-c                   Copy selection"));
    all_lines.push(Line::raw("  Mouse click / drag       Place caret / select"));
    all_lines.push(Line::raw(""));

    all_lines.push(Line::styled("File", section_style));
    all_lines.push(Line::raw("  Ctrl-s                   Save (again to overwrite)"));
    all_lines.push(Line::raw("  Ctrl-r                   Reload, discarding changes"));
    all_lines.push(Line::raw("  Ctrl-w                   Toggle watch"));
    all_lines.push(Line::raw("  PageUp/PageDown          Scroll"));
    all_lines.push(Line::raw("  Ctrl-q                   Quit"));
    all_lines.push(Line::raw("  F1                       Toggle help"));
    all_lines.push(Line::raw(""));

    all_lines.push(Line::styled("Config", section_style));
    all_lines.push(Line::raw(format!("  Global: {global_cfg}")));
    all_lines.push(Line::raw(format!("  Local override: {local_cfg}")));
    all_lines.push(Line::raw(format!("  Session: {session_file}")));

    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .padding(Padding::uniform(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));

    frame.render_widget(Clear, popup);
    frame.render_widget(block, popup);

    // Inner area: border(1) + padding(1) on each side = 4
    let inner = Rect::new(
        popup.x + 2,
        popup.y + 2,
        popup.width.saturating_sub(4),
        popup.height.saturating_sub(4),
    );

    // Reserve 1 row at bottom for footer hint
    let content_height_u16 = inner.height.saturating_sub(1);
    let content_height = content_height_u16 as usize;
    let max_scroll = all_lines.len().saturating_sub(content_height);
    let scroll = model.help_scroll_offset.min(max_scroll);

    let end = (scroll + content_height).min(all_lines.len());
    let visible: Vec<Line> = all_lines[scroll..end].to_vec();

    let content_area = Rect::new(inner.x, inner.y, inner.width, content_height_u16);
    frame.render_widget(Paragraph::new(visible), content_area);

    let footer_area = Rect::new(inner.x, inner.y + content_height_u16, inner.width, 1);
    let footer = Line::styled("Up/Down scroll \u{2502} any other key closes", dim_style);
    frame.render_widget(Paragraph::new(footer), footer_area);
}

fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
