//! Rich-text document model.
//!
//! This module handles:
//! - Parsing HTML fragments into a closed element tree
//! - Offset-addressed edits on that tree
//! - Canonical HTML serialization
//! - Laying the tree out as display lines

mod layout;
mod parser;
mod tree;
mod types;

pub use layout::layout;
pub use parser::parse_nodes;
pub use types::{
    Alignment, Element, ElementKind, FormatTag, HeadingLevel, InlineSpan, InlineStyle, LineType,
    ListKind, ListMarker, Node, RenderedLine,
};

pub(crate) use tree::nodes_from_plain_text;

/// An editable rich-text document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Create an empty document.
    pub const fn empty() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Parse an HTML fragment.
    ///
    /// Parsing never fails: unsupported markup is unwrapped or dropped.
    pub fn parse(html: &str) -> Self {
        Self {
            nodes: parser::parse_nodes(html),
        }
    }

    /// Build a document from nodes, normalizing them.
    pub fn from_nodes(mut nodes: Vec<Node>) -> Self {
        tree::normalize(&mut nodes);
        Self { nodes }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of visible characters (text plus line breaks).
    pub fn text_len(&self) -> usize {
        tree::nodes_len(&self.nodes)
    }

    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The whole document as plain text, line breaks as `\n`.
    pub fn plain_text(&self) -> String {
        tree::text_in_range(&self.nodes, 0, usize::MAX)
    }

    /// Plain text of the visible characters in `[start, end)`.
    pub fn text_in_range(&self, start: usize, end: usize) -> String {
        tree::text_in_range(&self.nodes, start, end)
    }

    /// Serialize to canonical HTML.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        write_nodes(&mut out, &self.nodes);
        out
    }

    /// Lay the document out as display lines.
    pub fn layout(&self) -> Vec<RenderedLine> {
        layout::layout(&self.nodes)
    }

    pub(crate) fn remove_range(&mut self, start: usize, end: usize) {
        tree::remove_range(&mut self.nodes, start, end);
        tree::normalize(&mut self.nodes);
    }

    /// Insert nodes at `offset`, returning the number of visible characters added.
    pub(crate) fn insert_nodes(&mut self, offset: usize, nodes: Vec<Node>) -> usize {
        let added = tree::nodes_len(&nodes);
        let offset = offset.min(self.text_len());
        tree::insert_at(&mut self.nodes, offset, nodes);
        tree::normalize(&mut self.nodes);
        added
    }
}

fn write_nodes(out: &mut String, nodes: &[Node]) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(&html_escape::encode_text(text)),
            Node::LineBreak => out.push_str("<br>"),
            Node::Element(element) => {
                write_open_tag(out, &element.kind);
                write_nodes(out, &element.children);
                out.push_str("</");
                out.push_str(element.kind.tag_name());
                out.push('>');
            }
        }
    }
}

fn write_open_tag(out: &mut String, kind: &ElementKind) {
    match kind {
        ElementKind::Link { href } => {
            out.push_str("<a href=\"");
            out.push_str(&html_escape::encode_double_quoted_attribute(href));
            out.push_str("\">");
        }
        ElementKind::Align(alignment) => {
            out.push_str("<div style=\"text-align: ");
            out.push_str(alignment.css_value());
            out.push_str("\">");
        }
        other => {
            out.push('<');
            out.push_str(other.tag_name());
            out.push('>');
        }
    }
}
