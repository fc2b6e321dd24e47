//! Theming and color definitions.
//!
//! The palette is resolved once at startup and carried by
//! [`crate::context::AppContext`]; nothing here reads global state.

use ratatui::style::{Color, Modifier, Style};

use crate::config::ThemeMode;
use crate::document::{InlineStyle, LineType};

/// Colors for the whole application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Heading level 1 style
    pub h1: Style,
    /// Heading level 2 style
    pub h2: Style,
    /// Heading level 3 style
    pub h3: Style,
    /// Link style
    pub link: Style,
    /// List bullet/number style
    pub list_marker: Style,
    /// Selected text
    pub selection: Style,
    /// Cell under the caret
    pub caret: Style,
    /// Placeholder text shown in an empty editor
    pub placeholder: Style,
    /// Toolbar buttons
    pub toolbar: Style,
    /// Toolbar while the editor is disabled
    pub toolbar_frozen: Style,
    /// Status bar background
    pub status_bg: Color,
    /// Status bar foreground
    pub status_fg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            h1: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            h2: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            h3: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            link: Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::UNDERLINED),
            list_marker: Style::default().fg(Color::Yellow),
            selection: Style::default().bg(Color::Indexed(24)).fg(Color::White),
            caret: Style::default().bg(Color::White).fg(Color::Black),
            placeholder: Style::default()
                .fg(Color::Indexed(245))
                .add_modifier(Modifier::ITALIC),
            toolbar: Style::default().bg(Color::Indexed(238)).fg(Color::White),
            toolbar_frozen: Style::default()
                .bg(Color::Indexed(236))
                .fg(Color::Indexed(242)),
            status_bg: Color::Indexed(236), // Dark gray that works on both
            status_fg: Color::Indexed(252), // Light gray
        }
    }
}

impl Theme {
    /// Create a theme optimized for dark terminals.
    pub fn dark() -> Self {
        Self::default()
    }

    /// Create a theme optimized for light terminals.
    pub fn light() -> Self {
        Self {
            h1: Style::default()
                .fg(Color::Indexed(31)) // Darker cyan
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            h2: Style::default()
                .fg(Color::Indexed(28)) // Darker green
                .add_modifier(Modifier::BOLD),
            h3: Style::default()
                .fg(Color::Indexed(136)) // Darker yellow/olive
                .add_modifier(Modifier::BOLD),
            link: Style::default()
                .fg(Color::Indexed(25))
                .add_modifier(Modifier::UNDERLINED),
            list_marker: Style::default().fg(Color::Indexed(136)),
            selection: Style::default().bg(Color::Indexed(153)).fg(Color::Black),
            caret: Style::default().bg(Color::Black).fg(Color::White),
            placeholder: Style::default()
                .fg(Color::Indexed(244))
                .add_modifier(Modifier::ITALIC),
            toolbar: Style::default().bg(Color::Indexed(250)).fg(Color::Black),
            toolbar_frozen: Style::default()
                .bg(Color::Indexed(253))
                .fg(Color::Indexed(246)),
            status_bg: Color::Indexed(252),
            status_fg: Color::Indexed(235),
        }
    }

    /// Resolve a theme mode, detecting the background for `Auto`.
    pub fn for_mode(mode: ThemeMode) -> Self {
        let light = match mode {
            ThemeMode::Light => true,
            ThemeMode::Dark => false,
            ThemeMode::Auto => {
                background_is_light(std::env::var("COLORFGBG").ok().as_deref())
            }
        };
        if light { Self::light() } else { Self::dark() }
    }

    /// Base style for a display line.
    pub fn line_style(&self, line_type: LineType) -> Style {
        match line_type {
            LineType::Heading(1) => self.h1,
            LineType::Heading(2) => self.h2,
            LineType::Heading(_) => self.h3,
            LineType::Paragraph | LineType::ListItem { .. } => Style::default(),
        }
    }

    /// Style for an inline span, merged with a base line style.
    pub fn inline_style(&self, base: Style, inline: InlineStyle) -> Style {
        let mut style = base;
        if inline.bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        if inline.italic {
            style = style.add_modifier(Modifier::ITALIC);
        }
        if inline.underline {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        if inline.link {
            style = style.patch(self.link);
        }
        style
    }

    pub fn status_style(&self) -> Style {
        Style::default().bg(self.status_bg).fg(self.status_fg)
    }
}

/// `COLORFGBG` is `fg;bg` (sometimes `fg;default;bg`); a bright background
/// index means a light terminal.
fn background_is_light(colorfgbg: Option<&str>) -> bool {
    let Some(value) = colorfgbg else {
        return false;
    };
    let bg_str = value.rsplit(';').next().unwrap_or(value);
    bg_str.parse::<u8>().is_ok_and(|bg| bg >= 7)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_styles_are_bold() {
        let theme = Theme::default();
        for level in 1..=3 {
            let style = theme.line_style(LineType::Heading(level));
            assert!(style.add_modifier.contains(Modifier::BOLD));
        }
    }

    #[test]
    fn test_h1_is_underlined() {
        let style = Theme::dark().line_style(LineType::Heading(1));
        assert!(style.add_modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn test_light_theme() {
        let theme = Theme::light();
        assert!(theme.h1.add_modifier.contains(Modifier::BOLD));
        assert_ne!(theme, Theme::dark());
    }

    #[test]
    fn test_inline_style_combines_modifiers() {
        let theme = Theme::dark();
        let inline = InlineStyle {
            bold: true,
            italic: true,
            underline: false,
            link: true,
        };
        let style = theme.inline_style(Style::default(), inline);
        assert!(style.add_modifier.contains(Modifier::BOLD));
        assert!(style.add_modifier.contains(Modifier::ITALIC));
        assert!(style.add_modifier.contains(Modifier::UNDERLINED));
        assert_eq!(style.fg, Some(Color::LightBlue));
    }

    #[test]
    fn test_explicit_modes() {
        assert_eq!(Theme::for_mode(ThemeMode::Light), Theme::light());
        assert_eq!(Theme::for_mode(ThemeMode::Dark), Theme::dark());
    }

    #[test]
    fn test_colorfgbg_detection() {
        assert!(!background_is_light(Some("15;0")));
        assert!(background_is_light(Some("0;15")));
        assert!(background_is_light(Some("0;default;15")));
        assert!(!background_is_light(None));
        assert!(!background_is_light(Some("garbage")));
    }
}
