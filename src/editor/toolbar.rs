use std::fmt;

use crate::document::{Alignment, FormatTag, HeadingLevel};

/// Toolbar controls, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    Bold,
    Italic,
    Underline,
    Heading(HeadingLevel),
    BulletList,
    NumberedList,
    Align(Alignment),
    Link,
}

impl ToolbarAction {
    pub const ALL: [Self; 13] = [
        Self::Bold,
        Self::Italic,
        Self::Underline,
        Self::Heading(HeadingLevel::H1),
        Self::Heading(HeadingLevel::H2),
        Self::Heading(HeadingLevel::H3),
        Self::BulletList,
        Self::NumberedList,
        Self::Align(Alignment::Left),
        Self::Align(Alignment::Center),
        Self::Align(Alignment::Right),
        Self::Align(Alignment::Justify),
        Self::Link,
    ];

    /// The format this action wraps the selection in, if any.
    pub const fn format_tag(self) -> Option<FormatTag> {
        match self {
            Self::Bold => Some(FormatTag::Bold),
            Self::Italic => Some(FormatTag::Italic),
            Self::Underline => Some(FormatTag::Underline),
            Self::Heading(level) => Some(FormatTag::Heading(level)),
            Self::Align(alignment) => Some(FormatTag::Align(alignment)),
            Self::BulletList | Self::NumberedList | Self::Link => None,
        }
    }

    /// Short label for the toolbar.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bold => "B",
            Self::Italic => "I",
            Self::Underline => "U",
            Self::Heading(HeadingLevel::H1) => "H1",
            Self::Heading(HeadingLevel::H2) => "H2",
            Self::Heading(HeadingLevel::H3) => "H3",
            Self::BulletList => "•",
            Self::NumberedList => "1.",
            Self::Align(Alignment::Left) => "⇤",
            Self::Align(Alignment::Center) => "≡",
            Self::Align(Alignment::Right) => "⇥",
            Self::Align(Alignment::Justify) => "☰",
            Self::Link => "🔗",
        }
    }

    /// Key that triggers the action after the toolbar prefix (Ctrl+T).
    pub const fn hotkey(self) -> char {
        match self {
            Self::Bold => 'b',
            Self::Italic => 'i',
            Self::Underline => 'u',
            Self::Heading(HeadingLevel::H1) => '1',
            Self::Heading(HeadingLevel::H2) => '2',
            Self::Heading(HeadingLevel::H3) => '3',
            Self::BulletList => '-',
            Self::NumberedList => '#',
            Self::Align(Alignment::Left) => 'l',
            Self::Align(Alignment::Center) => 'c',
            Self::Align(Alignment::Right) => 'r',
            Self::Align(Alignment::Justify) => 'j',
            Self::Link => 'k',
        }
    }

    pub fn from_hotkey(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.hotkey() == c)
    }
}

impl fmt::Display for ToolbarAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bold => write!(f, "bold"),
            Self::Italic => write!(f, "italic"),
            Self::Underline => write!(f, "underline"),
            Self::Heading(level) => write!(f, "heading {}", level.level()),
            Self::BulletList => write!(f, "bullet list"),
            Self::NumberedList => write!(f, "numbered list"),
            Self::Align(alignment) => write!(f, "align {}", alignment.css_value()),
            Self::Link => write!(f, "link"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hotkeys_are_unique() {
        let mut keys: Vec<char> = ToolbarAction::ALL.iter().map(|a| a.hotkey()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), 13);
    }

    #[test]
    fn test_from_hotkey() {
        assert_eq!(
            ToolbarAction::from_hotkey('2'),
            Some(ToolbarAction::Heading(HeadingLevel::H2))
        );
        assert_eq!(ToolbarAction::from_hotkey('z'), None);
    }

    #[test]
    fn test_lists_and_link_have_no_format_tag() {
        assert_eq!(ToolbarAction::BulletList.format_tag(), None);
        assert_eq!(ToolbarAction::Link.format_tag(), None);
        assert_eq!(
            ToolbarAction::Align(Alignment::Justify).format_tag(),
            Some(FormatTag::Align(Alignment::Justify))
        );
    }
}
