use ratatui::prelude::*;
use ratatui::widgets::{Clear, Paragraph};

use crate::app::Model;
use crate::editor::Selection;

use super::rows::{DisplayRow, caret_cell};
use super::style::Theme;
use super::{CHROME_ROWS, DOCUMENT_LEFT_PADDING, overlays, status, toolbar};

/// The rectangle holding document text inside the full terminal `area`.
pub fn document_area(area: Rect) -> Rect {
    Rect::new(
        area.x + DOCUMENT_LEFT_PADDING,
        area.y + 1,
        area.width.saturating_sub(DOCUMENT_LEFT_PADDING),
        area.height.saturating_sub(CHROME_ROWS),
    )
}

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();
    if area.height < CHROME_ROWS {
        return;
    }

    let bar_active = model.link_prompt.is_some() || model.active_toast().is_some();
    let mut doc_area = document_area(area);
    if bar_active {
        doc_area.height = doc_area.height.saturating_sub(1);
    }
    let toolbar_area = Rect { height: 1, ..area };
    let bar_area = Rect {
        y: area.y + area.height.saturating_sub(2),
        height: 1,
        ..area
    };
    let status_area = Rect {
        y: area.y + area.height.saturating_sub(1),
        height: 1,
        ..area
    };

    toolbar::render_toolbar(model, frame, toolbar_area);
    render_document(model, frame, doc_area);

    if model.link_prompt.is_some() {
        status::render_link_prompt_bar(model, frame, bar_area);
    } else if bar_active {
        status::render_toast_bar(model, frame, bar_area);
    }
    status::render_status_bar(model, frame, status_area);

    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    }
}

fn render_document(model: &Model, frame: &mut Frame, area: Rect) {
    let theme = model.ctx.theme();
    frame.render_widget(Clear, area);

    if model.editor.placeholder_visible() {
        if let Some(text) = model.editor.placeholder() {
            let line = Line::styled(text.to_string(), theme.placeholder);
            frame.render_widget(Paragraph::new(line), area);
        }
        return;
    }

    let show_caret = model.editor.is_focused();
    let caret = model.editor.caret();
    let selection = model.editor.selection();

    let mut content: Vec<Line> = Vec::new();
    if model.rows.is_empty() {
        if show_caret {
            content.push(Line::from(Span::styled(" ", theme.caret)));
        }
    } else {
        let (caret_row, _) = caret_cell(&model.rows, caret);
        let range = model.viewport.visible_range();
        let visible = range.len().min(area.height as usize);
        for (index, row) in model.rows.iter().enumerate().skip(range.start).take(visible) {
            let caret_here = (show_caret && index == caret_row).then_some(caret);
            content.push(row_line(theme, row, selection, caret_here));
        }
    }

    frame.render_widget(Paragraph::new(content), area);
}

fn row_line(
    theme: &Theme,
    row: &DisplayRow,
    selection: Selection,
    caret: Option<usize>,
) -> Line<'static> {
    let base = theme.line_style(row.line_type);
    let mut spans = Vec::new();
    if row.pad > 0 {
        spans.push(Span::raw(" ".repeat(row.pad)));
    }
    if !row.prefix.is_empty() {
        let style = if row.marker {
            theme.list_marker
        } else {
            Style::default()
        };
        spans.push(Span::styled(row.prefix.clone(), style));
    }

    let mut run = String::new();
    let mut run_style = base;
    for glyph in &row.glyphs {
        let mut style = theme.inline_style(base, glyph.style);
        if selection.covers(glyph.offset) {
            style = style.patch(theme.selection);
        }
        if caret == Some(glyph.offset) {
            style = style.patch(theme.caret);
        }
        if style != run_style && !run.is_empty() {
            spans.push(Span::styled(std::mem::take(&mut run), run_style));
        }
        run_style = style;
        run.push(glyph.ch);
    }
    if !run.is_empty() {
        spans.push(Span::styled(run, run_style));
    }

    // Caret past the last glyph: draw it on a blank cell.
    if caret.is_some_and(|c| !row.glyphs.iter().any(|g| g.offset == c)) {
        spans.push(Span::styled(" ", theme.caret));
    }
    Line::from(spans)
}
