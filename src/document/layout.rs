//! Lay out a document tree as display lines.
//!
//! Block elements start lines, line breaks split them. Every line records
//! the document offsets it covers so the caret and selection can be drawn.

use super::types::{
    Alignment, ElementKind, InlineSpan, InlineStyle, LineType, ListKind, ListMarker, Node,
    RenderedLine,
};

#[derive(Debug, Clone, Copy)]
struct BlockContext {
    line_type: LineType,
    alignment: Option<Alignment>,
    list_depth: usize,
}

impl BlockContext {
    const fn root() -> Self {
        Self {
            line_type: LineType::Paragraph,
            alignment: None,
            list_depth: 0,
        }
    }

    /// Context for lines after the first one of the same block.
    const fn continuation(self) -> Self {
        let line_type = match self.line_type {
            LineType::ListItem { depth, .. } => LineType::ListItem {
                depth,
                marker: ListMarker::None,
            },
            other => other,
        };
        Self { line_type, ..self }
    }
}

struct LayoutBuilder {
    lines: Vec<RenderedLine>,
    current: Option<RenderedLine>,
    offset: usize,
}

impl LayoutBuilder {
    const fn new() -> Self {
        Self {
            lines: Vec::new(),
            current: None,
            offset: 0,
        }
    }

    fn open_line(&mut self, ctx: BlockContext) {
        self.flush();
        self.current = Some(RenderedLine::new(ctx.line_type, ctx.alignment, self.offset));
    }

    fn ensure_line(&mut self, ctx: BlockContext) -> &mut RenderedLine {
        self.current
            .get_or_insert_with(|| RenderedLine::new(ctx.line_type, ctx.alignment, self.offset))
    }

    fn flush(&mut self) {
        if let Some(line) = self.current.take() {
            self.lines.push(line);
        }
    }

    fn walk(&mut self, nodes: &[Node], style: InlineStyle, ctx: BlockContext) {
        for node in nodes {
            match node {
                Node::Text(text) => {
                    let start = self.offset;
                    self.ensure_line(ctx)
                        .push_span(InlineSpan::new(text.clone(), style, start));
                    self.offset += text.chars().count();
                }
                Node::LineBreak => {
                    self.ensure_line(ctx);
                    self.flush();
                    self.offset += 1;
                    self.open_line(ctx.continuation());
                }
                Node::Element(element) => self.walk_element(&element.kind, &element.children, style, ctx),
            }
        }
    }

    fn walk_element(
        &mut self,
        kind: &ElementKind,
        children: &[Node],
        style: InlineStyle,
        ctx: BlockContext,
    ) {
        match kind {
            ElementKind::Bold => self.walk(children, InlineStyle { bold: true, ..style }, ctx),
            ElementKind::Italic => self.walk(children, InlineStyle { italic: true, ..style }, ctx),
            ElementKind::Underline => {
                self.walk(children, InlineStyle { underline: true, ..style }, ctx);
            }
            ElementKind::Link { .. } => self.walk(children, InlineStyle { link: true, ..style }, ctx),
            ElementKind::Span => self.walk(children, style, ctx),
            ElementKind::Heading(level) => {
                let block = BlockContext {
                    line_type: LineType::Heading(level.level()),
                    ..ctx
                };
                self.walk_block(children, style, block);
            }
            ElementKind::Paragraph | ElementKind::Block => {
                let block = BlockContext {
                    line_type: LineType::Paragraph,
                    ..ctx
                };
                self.walk_block(children, style, block);
            }
            ElementKind::Align(alignment) => {
                let block = BlockContext {
                    alignment: Some(*alignment),
                    ..ctx
                };
                self.walk_block(children, style, block);
            }
            ElementKind::List(list_kind) => self.walk_list(*list_kind, children, style, ctx),
            ElementKind::ListItem => {
                let block = BlockContext {
                    line_type: LineType::ListItem {
                        depth: ctx.list_depth,
                        marker: ListMarker::Bullet,
                    },
                    ..ctx
                };
                self.walk_block(children, style, block);
            }
        }
    }

    fn walk_block(&mut self, children: &[Node], style: InlineStyle, block: BlockContext) {
        self.open_line(block);
        self.walk(children, style, block.continuation());
        self.flush();
    }

    fn walk_list(
        &mut self,
        list_kind: ListKind,
        children: &[Node],
        style: InlineStyle,
        ctx: BlockContext,
    ) {
        self.flush();
        let mut number = 0;
        for child in children {
            match child {
                Node::Element(item) if item.kind == ElementKind::ListItem => {
                    number += 1;
                    let marker = match list_kind {
                        ListKind::Ordered => ListMarker::Number(number),
                        ListKind::Unordered => ListMarker::Bullet,
                    };
                    let block = BlockContext {
                        line_type: LineType::ListItem {
                            depth: ctx.list_depth,
                            marker,
                        },
                        alignment: ctx.alignment,
                        list_depth: ctx.list_depth + 1,
                    };
                    self.walk_block(&item.children, style, block);
                }
                other => self.walk(std::slice::from_ref(other), style, ctx),
            }
        }
        self.flush();
    }
}

/// Lay out `nodes` into display lines.
pub fn layout(nodes: &[Node]) -> Vec<RenderedLine> {
    let mut builder = LayoutBuilder::new();
    builder.walk(nodes, InlineStyle::default(), BlockContext::root());
    builder.flush();
    builder.lines
}
