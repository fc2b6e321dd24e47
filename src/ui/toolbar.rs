use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use crate::app::Model;
use crate::editor::ToolbarAction;

/// A toolbar control and the columns it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarButton {
    pub action: ToolbarAction,
    pub text: String,
    pub x: u16,
    pub width: u16,
}

/// Lay out the toolbar from column 0. While the toolbar prefix is armed
/// each button shows its hotkey.
pub fn toolbar_buttons(armed: bool) -> Vec<ToolbarButton> {
    let mut x: u16 = 0;
    ToolbarAction::ALL
        .into_iter()
        .map(|action| {
            let text = if armed {
                format!(" {}:{} ", action.hotkey(), action.label())
            } else {
                format!(" {} ", action.label())
            };
            let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
            let button = ToolbarButton {
                action,
                text,
                x,
                width,
            };
            x = x.saturating_add(width).saturating_add(1);
            button
        })
        .collect()
}

pub fn toolbar_button_at(armed: bool, column: u16) -> Option<ToolbarAction> {
    toolbar_buttons(armed)
        .into_iter()
        .find(|b| column >= b.x && column < b.x.saturating_add(b.width))
        .map(|b| b.action)
}

pub fn render_toolbar(model: &Model, frame: &mut Frame, area: Rect) {
    let theme = model.ctx.theme();
    let style = if model.editor.toolbar_enabled() {
        theme.toolbar
    } else {
        theme.toolbar_frozen
    };

    let mut spans = Vec::new();
    for button in toolbar_buttons(model.toolbar_armed) {
        let button_style = if model.toolbar_armed {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        };
        spans.push(Span::styled(button.text, button_style));
        spans.push(Span::raw(" "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
