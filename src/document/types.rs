//! Core document types.

use std::fmt;

/// Heading levels offered by the editor toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    /// Numeric level (1-3).
    pub const fn level(self) -> u8 {
        match self {
            Self::H1 => 1,
            Self::H2 => 2,
            Self::H3 => 3,
        }
    }

    /// Map an HTML heading level onto the supported range.
    ///
    /// `h4` through `h6` collapse into `H3`.
    pub const fn from_level(level: u8) -> Self {
        match level {
            0 | 1 => Self::H1,
            2 => Self::H2,
            _ => Self::H3,
        }
    }
}

/// Horizontal alignment of an alignment wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    /// CSS `text-align` value.
    pub const fn css_value(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Justify => "justify",
        }
    }

    pub fn from_css_value(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" | "start" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" | "end" => Some(Self::Right),
            "justify" => Some(Self::Justify),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Ordered,
    Unordered,
}

/// The closed set of elements a document may contain.
///
/// Anything else met while parsing is unwrapped to its children.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Bold,
    Italic,
    Underline,
    Heading(HeadingLevel),
    List(ListKind),
    ListItem,
    Align(Alignment),
    Link { href: String },
    /// Neutral container used around inserted fragments.
    Span,
    Paragraph,
    /// Plain `<div>` without alignment.
    Block,
}

impl ElementKind {
    pub const fn tag_name(&self) -> &'static str {
        match self {
            Self::Bold => "strong",
            Self::Italic => "em",
            Self::Underline => "u",
            Self::Heading(HeadingLevel::H1) => "h1",
            Self::Heading(HeadingLevel::H2) => "h2",
            Self::Heading(HeadingLevel::H3) => "h3",
            Self::List(ListKind::Ordered) => "ol",
            Self::List(ListKind::Unordered) => "ul",
            Self::ListItem => "li",
            Self::Align(_) | Self::Block => "div",
            Self::Link { .. } => "a",
            Self::Span => "span",
            Self::Paragraph => "p",
        }
    }

    /// Block elements start a new rendered line.
    pub const fn is_block(&self) -> bool {
        matches!(
            self,
            Self::Heading(_)
                | Self::List(_)
                | Self::ListItem
                | Self::Align(_)
                | Self::Paragraph
                | Self::Block
        )
    }

    /// Elements that survive normalization with no children.
    pub(crate) const fn keeps_when_empty(&self) -> bool {
        matches!(self, Self::ListItem)
    }
}

/// A semantic format applied around a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatTag {
    Bold,
    Italic,
    Underline,
    Heading(HeadingLevel),
    Align(Alignment),
}

impl FormatTag {
    pub fn element_kind(self) -> ElementKind {
        match self {
            Self::Bold => ElementKind::Bold,
            Self::Italic => ElementKind::Italic,
            Self::Underline => ElementKind::Underline,
            Self::Heading(level) => ElementKind::Heading(level),
            Self::Align(alignment) => ElementKind::Align(alignment),
        }
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bold => write!(f, "bold"),
            Self::Italic => write!(f, "italic"),
            Self::Underline => write!(f, "underline"),
            Self::Heading(level) => write!(f, "heading {}", level.level()),
            Self::Align(alignment) => write!(f, "align {}", alignment.css_value()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub kind: ElementKind,
    pub children: Vec<Node>,
}

impl Element {
    pub const fn new(kind: ElementKind, children: Vec<Node>) -> Self {
        Self { kind, children }
    }

    /// Number of visible characters inside this element.
    pub fn text_len(&self) -> usize {
        super::tree::nodes_len(&self.children)
    }
}

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    LineBreak,
    Element(Element),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub const fn element(kind: ElementKind, children: Vec<Node>) -> Self {
        Self::Element(Element::new(kind, children))
    }

    /// Visible characters: one per scalar value of text, one per line break.
    pub fn text_len(&self) -> usize {
        match self {
            Self::Text(text) => text.chars().count(),
            Self::LineBreak => 1,
            Self::Element(element) => element.text_len(),
        }
    }
}

/// Inline styling active on a run of rendered text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub link: bool,
}

/// A run of text with a single style, located in document offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineSpan {
    text: String,
    style: InlineStyle,
    start: usize,
}

impl InlineSpan {
    pub const fn new(text: String, style: InlineStyle, start: usize) -> Self {
        Self { text, style, start }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn style(&self) -> InlineStyle {
        self.style
    }

    /// Document offset of the first character.
    pub const fn start(&self) -> usize {
        self.start
    }
}

/// Type of a rendered line, driving its block style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineType {
    Heading(u8),
    Paragraph,
    /// List item at the given nesting depth, with its marker.
    ListItem {
        depth: usize,
        marker: ListMarker,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMarker {
    Bullet,
    Number(usize),
    /// Continuation line of an item (after a line break).
    None,
}

/// A single line laid out for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    spans: Vec<InlineSpan>,
    line_type: LineType,
    alignment: Option<Alignment>,
    start: usize,
    end: usize,
}

impl RenderedLine {
    pub(crate) const fn new(line_type: LineType, alignment: Option<Alignment>, start: usize) -> Self {
        Self {
            spans: Vec::new(),
            line_type,
            alignment,
            start,
            end: start,
        }
    }

    pub(crate) fn push_span(&mut self, span: InlineSpan) {
        self.end = span.start() + span.text().chars().count();
        self.spans.push(span);
    }

    pub fn spans(&self) -> &[InlineSpan] {
        &self.spans
    }

    pub const fn line_type(&self) -> LineType {
        self.line_type
    }

    pub const fn alignment(&self) -> Option<Alignment> {
        self.alignment
    }

    /// Offset of the first position on this line.
    pub const fn start(&self) -> usize {
        self.start
    }

    /// Offset of the last caret position on this line (exclusive of any break).
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Plain text content of the line.
    pub fn content(&self) -> String {
        self.spans.iter().map(InlineSpan::text).collect()
    }

    /// Whether `offset` is a caret position on this line.
    pub const fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset <= self.end
    }
}
