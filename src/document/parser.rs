//! Lenient HTML fragment parser.
//!
//! Only the element set of [`ElementKind`] survives parsing. Unknown tags
//! are unwrapped to their children, `<script>` and `<style>` bodies are
//! dropped, and attributes other than a link's `href` or a block's
//! `text-align` are discarded.

use std::cell::RefCell;
use std::sync::LazyLock;

use html5ever::Attribute;
use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
    TokenizerResult,
};
use regex::Regex;

use super::tree::normalize;
use super::types::{Alignment, ElementKind, HeadingLevel, ListKind, Node};

static TEXT_ALIGN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)text-align\s*:\s*([a-z]+)")
        .expect("valid style pattern")
});

const VOID_TAGS: &[&str] = &[
    "area", "base", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const DROPPED_TAGS: &[&str] = &["script", "style", "template", "iframe", "object"];

const UNSAFE_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:"];

#[derive(Debug)]
enum FrameKind {
    Root,
    Known(ElementKind),
    /// Unknown tag: children are spliced into the parent.
    Unwrap,
    /// Content is discarded.
    Drop,
}

#[derive(Debug)]
struct Frame {
    tag: String,
    kind: FrameKind,
    children: Vec<Node>,
}

impl Frame {
    const fn new(tag: String, kind: FrameKind) -> Self {
        Self {
            tag,
            kind,
            children: Vec::new(),
        }
    }
}

/// Builds frames from the tokens html5ever hands over.
struct FragmentSink {
    stack: RefCell<Vec<Frame>>,
}

impl Default for FragmentSink {
    fn default() -> Self {
        Self {
            stack: RefCell::new(vec![Frame::new(String::new(), FrameKind::Root)]),
        }
    }
}

impl TokenSink for FragmentSink {
    type Handle = ();

    fn process_token(&self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        let mut stack = self.stack.borrow_mut();
        match token {
            Token::CharacterTokens(text) => push_text(&mut stack, &text),
            Token::TagToken(tag) => match tag.kind {
                TagKind::StartTag => return open_tag(&mut stack, &tag),
                TagKind::EndTag => close_tag(&mut stack, &tag.name),
            },
            // Comments, doctypes and tokenizer errors carry no content.
            _ => {}
        }
        TokenSinkResult::Continue
    }
}

/// Parse an HTML fragment into normalized document nodes.
pub fn parse_nodes(html: &str) -> Vec<Node> {
    let tokenizer = Tokenizer::new(FragmentSink::default(), TokenizerOpts::default());
    let input = BufferQueue::default();
    input.push_back(StrTendril::from_slice(html));
    while let TokenizerResult::Script(()) = tokenizer.feed(&input) {}
    tokenizer.end();

    let mut stack = tokenizer.sink.stack.take();
    while stack.len() > 1 {
        pop_frame(&mut stack);
    }
    let mut nodes = stack.pop().map(|frame| frame.children).unwrap_or_default();
    normalize(&mut nodes);
    nodes
}

fn dropping(stack: &[Frame]) -> bool {
    stack.iter().any(|frame| matches!(frame.kind, FrameKind::Drop))
}

fn push_text(stack: &mut [Frame], raw: &str) {
    if raw.is_empty() || dropping(stack) {
        return;
    }
    let text: String = raw
        .chars()
        .map(|c| if matches!(c, '\n' | '\r' | '\t') { ' ' } else { c })
        .collect();
    let Some(top) = stack.last_mut() else {
        return;
    };
    // Indentation between list items carries no content.
    if matches!(top.kind, FrameKind::Known(ElementKind::List(_))) && text.trim().is_empty() {
        return;
    }
    top.children.push(Node::Text(text));
}

fn open_tag(stack: &mut Vec<Frame>, tag: &Tag) -> TokenSinkResult<()> {
    let name: &str = &tag.name;
    if name == "br" {
        if !dropping(stack)
            && let Some(top) = stack.last_mut()
        {
            top.children.push(Node::LineBreak);
        }
        return TokenSinkResult::Continue;
    }
    if VOID_TAGS.contains(&name) || tag.self_closing {
        return TokenSinkResult::Continue;
    }
    // An open item is implicitly closed by the next one.
    if name == "li" && stack.last().is_some_and(|frame| frame.tag == "li") {
        pop_frame(stack);
    }
    let kind = frame_kind(name, &tag.attrs);
    stack.push(Frame::new(name.to_string(), kind));

    // Script and style bodies are raw text up to their closing tag.
    match name {
        "script" => TokenSinkResult::RawData(RawKind::ScriptData),
        "style" | "iframe" => TokenSinkResult::RawData(RawKind::Rawtext),
        _ => TokenSinkResult::Continue,
    }
}

fn close_tag(stack: &mut Vec<Frame>, tag: &str) {
    let Some(idx) = stack.iter().rposition(|frame| frame.tag == tag) else {
        return;
    };
    if idx == 0 {
        return;
    }
    while stack.len() > idx {
        pop_frame(stack);
    }
}

fn pop_frame(stack: &mut Vec<Frame>) {
    let Some(frame) = stack.pop() else {
        return;
    };
    let Some(parent) = stack.last_mut() else {
        return;
    };
    match frame.kind {
        FrameKind::Known(kind) => parent.children.push(Node::element(kind, frame.children)),
        FrameKind::Unwrap | FrameKind::Root => parent.children.extend(frame.children),
        FrameKind::Drop => {}
    }
}

fn frame_kind(tag: &str, attrs: &[Attribute]) -> FrameKind {
    if DROPPED_TAGS.contains(&tag) {
        return FrameKind::Drop;
    }
    let kind = match tag {
        "strong" | "b" => ElementKind::Bold,
        "em" | "i" => ElementKind::Italic,
        "u" => ElementKind::Underline,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = tag[1..].parse::<u8>().unwrap_or(1);
            ElementKind::Heading(HeadingLevel::from_level(level))
        }
        "ul" => ElementKind::List(ListKind::Unordered),
        "ol" => ElementKind::List(ListKind::Ordered),
        "li" => ElementKind::ListItem,
        "span" => ElementKind::Span,
        "p" => ElementKind::Paragraph,
        "div" => alignment_from_attrs(attrs).map_or(ElementKind::Block, ElementKind::Align),
        "a" => match safe_href(attrs) {
            Some(href) => ElementKind::Link { href },
            None => return FrameKind::Unwrap,
        },
        _ => return FrameKind::Unwrap,
    };
    FrameKind::Known(kind)
}

/// Attribute value with entities already decoded by the tokenizer.
fn attribute<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|attr| &*attr.name.local == name)
        .map(|attr| &*attr.value)
}

fn alignment_from_attrs(attrs: &[Attribute]) -> Option<Alignment> {
    let style = attribute(attrs, "style")?;
    let caps = TEXT_ALIGN_RE.captures(style)?;
    Alignment::from_css_value(caps.get(1)?.as_str())
}

fn safe_href(attrs: &[Attribute]) -> Option<String> {
    let href = attribute(attrs, "href")?.trim();
    let lowered: String = href
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    if href.is_empty() || UNSAFE_SCHEMES.iter().any(|scheme| lowered.starts_with(scheme)) {
        return None;
    }
    Some(href.to_string())
}
