use std::fmt;

use tracing::debug;

use super::selection::{Direction, Selection};
use super::shortcuts::EditorCommand;
use super::toolbar::ToolbarAction;
use crate::document::{Document, Element, ElementKind, FormatTag, ListKind, Node, RenderedLine};
use crate::document::{nodes_from_plain_text, parse_nodes};

/// Result of an editing operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The document changed and the change callback fired.
    Changed,
    /// Nothing happened: empty selection, disabled surface, or nothing to do.
    Unchanged,
}

impl EditOutcome {
    pub const fn is_changed(self) -> bool {
        matches!(self, Self::Changed)
    }
}

type ChangeCallback = Box<dyn FnMut(&str)>;

/// A rich-text editing surface over a [`Document`].
///
/// Every mutating operation replaces the selected range, places the caret
/// right after the inserted content and reports the new serialized HTML to
/// the change callback exactly once.
pub struct RichTextEditor {
    document: Document,
    selection: Selection,
    /// Remembered column for vertical movement.
    col_memory: Option<usize>,
    placeholder: Option<String>,
    disabled: bool,
    focused: bool,
    on_change: Option<ChangeCallback>,
}

impl RichTextEditor {
    /// Create an empty editor.
    pub fn new() -> Self {
        Self {
            document: Document::empty(),
            selection: Selection::default(),
            col_memory: None,
            placeholder: None,
            disabled: false,
            focused: false,
            on_change: None,
        }
    }

    /// Create an editor holding `html`, caret at the start.
    pub fn with_content(html: &str) -> Self {
        let mut editor = Self::new();
        editor.set_content(html);
        editor
    }

    /// Replace the content from the owner. Does not fire the change callback.
    ///
    /// Any selection is collapsed to a caret, since its range pointed into
    /// the old content.
    pub fn set_content(&mut self, html: &str) {
        self.document = Document::parse(html);
        self.selection = Selection::caret(self.selection.focus.min(self.document.text_len()));
        self.col_memory = None;
    }

    /// Serialized HTML of the current content.
    pub fn content(&self) -> String {
        self.document.to_html()
    }

    pub const fn document(&self) -> &Document {
        &self.document
    }

    pub const fn selection(&self) -> Selection {
        self.selection
    }

    /// Offset of the caret (the selection focus).
    pub const fn caret(&self) -> usize {
        self.selection.focus
    }

    pub fn selected_text(&self) -> String {
        self.document
            .text_in_range(self.selection.start(), self.selection.end())
    }

    pub fn set_on_change(&mut self, callback: impl FnMut(&str) + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    pub fn set_placeholder(&mut self, placeholder: Option<String>) {
        self.placeholder = placeholder;
    }

    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    /// The placeholder shows while the document is empty and unfocused.
    pub const fn placeholder_visible(&self) -> bool {
        self.placeholder.is_some() && self.document.is_empty() && !self.focused
    }

    pub const fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        debug!(disabled, "editor disabled flag set");
        self.disabled = disabled;
    }

    /// The toolbar is frozen while the surface is disabled.
    pub const fn toolbar_enabled(&self) -> bool {
        !self.disabled
    }

    pub const fn is_focused(&self) -> bool {
        self.focused
    }

    pub const fn focus(&mut self) {
        self.focused = true;
    }

    pub const fn blur(&mut self) {
        self.focused = false;
    }

    // ---- selection ----

    /// Select `[anchor, focus)`, clamped to the document.
    pub fn select(&mut self, anchor: usize, focus: usize) {
        self.selection = Selection::new(anchor, focus).clamped(self.document.text_len());
        self.col_memory = None;
    }

    pub fn select_all(&mut self) {
        self.select(0, self.document.text_len());
    }

    pub fn set_caret(&mut self, offset: usize) {
        self.select(offset, offset);
    }

    /// Move the caret, optionally extending the selection.
    pub fn move_caret(&mut self, direction: Direction, extend: bool) {
        match direction {
            Direction::Left => {
                let target = if !extend && !self.selection.is_collapsed() {
                    self.selection.start()
                } else {
                    self.caret().saturating_sub(1)
                };
                self.place_caret(target, extend);
            }
            Direction::Right => {
                let target = if !extend && !self.selection.is_collapsed() {
                    self.selection.end()
                } else {
                    (self.caret() + 1).min(self.document.text_len())
                };
                self.place_caret(target, extend);
            }
            Direction::Up | Direction::Down => self.move_vertical(direction, extend),
        }
    }

    /// Move to the start of the caret's display line.
    pub fn move_line_start(&mut self, extend: bool) {
        let lines = self.document.layout();
        if let Some(line) = line_for_offset(&lines, self.caret()) {
            self.place_caret(line.start(), extend);
        }
    }

    /// Move to the end of the caret's display line.
    pub fn move_line_end(&mut self, extend: bool) {
        let lines = self.document.layout();
        if let Some(line) = line_for_offset(&lines, self.caret()) {
            self.place_caret(line.end(), extend);
        }
    }

    pub fn move_document_start(&mut self, extend: bool) {
        self.place_caret(0, extend);
    }

    pub fn move_document_end(&mut self, extend: bool) {
        self.place_caret(self.document.text_len(), extend);
    }

    fn place_caret(&mut self, offset: usize, extend: bool) {
        let anchor = if extend { self.selection.anchor } else { offset };
        self.selection = Selection::new(anchor, offset);
        self.col_memory = None;
    }

    fn move_vertical(&mut self, direction: Direction, extend: bool) {
        let lines = self.document.layout();
        let Some(index) = lines.iter().position(|line| line.contains(self.caret())) else {
            return;
        };
        let col = self
            .col_memory
            .unwrap_or_else(|| self.caret() - lines[index].start());
        let target = match direction {
            Direction::Up => index.checked_sub(1),
            _ => Some(index + 1).filter(|next| *next < lines.len()),
        };
        let offset = match target {
            Some(target) => {
                let line = &lines[target];
                line.start() + col.min(line.end() - line.start())
            }
            None if direction == Direction::Up => 0,
            None => self.document.text_len(),
        };
        self.place_caret(offset, extend);
        self.col_memory = Some(col);
    }

    // ---- mutation ----

    /// Wrap the selected text in `tag`.
    ///
    /// The selection is flattened to plain text (line breaks survive),
    /// wrapped as `<span><tag>…</tag></span>` and put back in place.
    pub fn apply_format(&mut self, tag: FormatTag) -> EditOutcome {
        if self.disabled || self.selection.is_collapsed() {
            debug!(%tag, "format ignored: no selection or disabled");
            return EditOutcome::Unchanged;
        }
        let text = self.selected_text();
        let wrapped = Node::Element(Element::new(tag.element_kind(), nodes_from_plain_text(&text)));
        debug!(%tag, chars = self.selection.len(), "wrapping selection");
        self.replace_selection(vec![wrapped], true)
    }

    /// Insert an HTML fragment at the caret, replacing any selection.
    ///
    /// The fragment is parsed into the supported element set; anything
    /// else is unwrapped or dropped.
    pub fn insert_html(&mut self, html: &str) -> EditOutcome {
        if self.disabled {
            return EditOutcome::Unchanged;
        }
        let nodes = parse_nodes(html);
        if nodes.is_empty() && self.selection.is_collapsed() {
            return EditOutcome::Unchanged;
        }
        debug!(bytes = html.len(), "inserting fragment");
        self.replace_selection(nodes, true)
    }

    /// Insert a link to `url`. The selected text, or the URL itself, becomes
    /// the link text.
    pub fn insert_link(&mut self, url: &str) -> EditOutcome {
        let url = url.trim();
        if url.is_empty() {
            return EditOutcome::Unchanged;
        }
        let selected = self.selected_text();
        let text = if selected.is_empty() { url } else { selected.as_str() };
        let html = format!(
            "<a href=\"{}\">{}</a>",
            html_escape::encode_double_quoted_attribute(url),
            html_escape::encode_text(text)
        );
        self.insert_html(&html)
    }

    /// Insert an empty list with one item; typing then fills the item.
    pub fn insert_list(&mut self, kind: ListKind) -> EditOutcome {
        match kind {
            ListKind::Unordered => self.insert_html("<ul><li></li></ul>"),
            ListKind::Ordered => self.insert_html("<ol><li></li></ol>"),
        }
    }

    pub fn insert_line_break(&mut self) -> EditOutcome {
        self.insert_html("<br>")
    }

    /// Paste plain text, keeping only its line breaks.
    pub fn paste_text(&mut self, text: &str) -> EditOutcome {
        if text.is_empty() {
            return EditOutcome::Unchanged;
        }
        let html = sanitize_paste(text);
        debug!(chars = text.chars().count(), "pasting plain text");
        self.insert_html(&html)
    }

    /// Type text at the caret, replacing any selection.
    pub fn insert_text(&mut self, text: &str) -> EditOutcome {
        if self.disabled || text.is_empty() {
            return EditOutcome::Unchanged;
        }
        self.replace_selection(nodes_from_plain_text(text), false)
    }

    /// Backspace: remove the selection or the character before the caret.
    pub fn delete_backward(&mut self) -> EditOutcome {
        if self.disabled {
            return EditOutcome::Unchanged;
        }
        let (start, end) = if self.selection.is_collapsed() {
            let caret = self.caret();
            if caret == 0 {
                return EditOutcome::Unchanged;
            }
            (caret - 1, caret)
        } else {
            (self.selection.start(), self.selection.end())
        };
        self.remove(start, end)
    }

    /// Delete: remove the selection or the character after the caret.
    pub fn delete_forward(&mut self) -> EditOutcome {
        if self.disabled {
            return EditOutcome::Unchanged;
        }
        let (start, end) = if self.selection.is_collapsed() {
            let caret = self.caret();
            if caret >= self.document.text_len() {
                return EditOutcome::Unchanged;
            }
            (caret, caret + 1)
        } else {
            (self.selection.start(), self.selection.end())
        };
        self.remove(start, end)
    }

    /// Run a keyboard-shortcut command.
    pub fn execute(&mut self, command: EditorCommand) -> EditOutcome {
        debug!(?command, "executing shortcut");
        match command {
            EditorCommand::Format(tag) => self.apply_format(tag),
            EditorCommand::InsertLineBreak => self.insert_line_break(),
        }
    }

    /// Run a toolbar action.
    ///
    /// [`ToolbarAction::Link`] needs a URL and is left to the owner, which
    /// calls [`Self::insert_link`] once it has one.
    pub fn apply_toolbar(&mut self, action: ToolbarAction) -> EditOutcome {
        if !self.toolbar_enabled() {
            debug!(?action, "toolbar frozen");
            return EditOutcome::Unchanged;
        }
        if let Some(tag) = action.format_tag() {
            return self.apply_format(tag);
        }
        match action {
            ToolbarAction::BulletList => self.insert_list(ListKind::Unordered),
            ToolbarAction::NumberedList => self.insert_list(ListKind::Ordered),
            _ => EditOutcome::Unchanged,
        }
    }

    fn remove(&mut self, start: usize, end: usize) -> EditOutcome {
        self.document.remove_range(start, end);
        self.selection = Selection::caret(start.min(self.document.text_len()));
        self.col_memory = None;
        self.emit_change()
    }

    /// Replace the selection with `nodes` and put the caret after them.
    fn replace_selection(&mut self, nodes: Vec<Node>, contained: bool) -> EditOutcome {
        let start = self.selection.start();
        if !self.selection.is_collapsed() {
            self.document.remove_range(start, self.selection.end());
        }
        let nodes = if contained {
            vec![Node::Element(Element::new(ElementKind::Span, nodes))]
        } else {
            nodes
        };
        let added = self.document.insert_nodes(start, nodes);
        self.selection = Selection::caret((start + added).min(self.document.text_len()));
        self.col_memory = None;
        self.emit_change()
    }

    fn emit_change(&mut self) -> EditOutcome {
        let html = self.document.to_html();
        if let Some(callback) = self.on_change.as_mut() {
            callback(&html);
        }
        EditOutcome::Changed
    }
}

impl Default for RichTextEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RichTextEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RichTextEditor")
            .field("document", &self.document)
            .field("selection", &self.selection)
            .field("disabled", &self.disabled)
            .field("focused", &self.focused)
            .field("has_on_change", &self.on_change.is_some())
            .finish_non_exhaustive()
    }
}

/// Escape pasted text and turn every newline into `<br>`.
pub fn sanitize_paste(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    html_escape::encode_text(&unified).replace('\n', "<br>")
}

/// The display line holding `offset`. A shared boundary belongs to the
/// earlier line.
fn line_for_offset(lines: &[RenderedLine], offset: usize) -> Option<&RenderedLine> {
    lines
        .iter()
        .find(|line| line.contains(offset))
        .or_else(|| lines.last())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::document::{Alignment, HeadingLevel};

    fn typed(text: &str) -> RichTextEditor {
        let mut editor = RichTextEditor::new();
        editor.insert_text(text);
        editor
    }

    fn recording(editor: &mut RichTextEditor) -> Rc<RefCell<Vec<String>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        editor.set_on_change(move |html| sink.borrow_mut().push(html.to_string()));
        seen
    }

    #[test]
    fn test_bold_without_selection_is_noop() {
        let mut editor = RichTextEditor::new();
        let seen = recording(&mut editor);
        assert_eq!(editor.apply_format(FormatTag::Bold), EditOutcome::Unchanged);
        assert_eq!(editor.content(), "");
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_type_select_bold() {
        let mut editor = typed("hello");
        editor.select(0, 5);
        assert!(editor.apply_format(FormatTag::Bold).is_changed());
        assert_eq!(editor.content(), "<span><strong>hello</strong></span>");
    }

    #[test]
    fn test_format_places_caret_after_container() {
        let mut editor = typed("one two three");
        editor.select(4, 7);
        editor.apply_format(FormatTag::Italic);
        assert_eq!(editor.content(), "one <span><em>two</em></span> three");
        assert_eq!(editor.selection(), Selection::caret(7));
    }

    #[test]
    fn test_format_backward_selection() {
        let mut editor = typed("abc");
        editor.select(3, 1);
        editor.apply_format(FormatTag::Underline);
        assert_eq!(editor.content(), "a<span><u>bc</u></span>");
    }

    #[test]
    fn test_format_flattens_existing_markup() {
        let mut editor = RichTextEditor::with_content("a<em>bc</em>d");
        editor.select(0, 4);
        editor.apply_format(FormatTag::Bold);
        assert_eq!(editor.content(), "<span><strong>abcd</strong></span>");
    }

    #[test]
    fn test_format_keeps_line_breaks() {
        let mut editor = RichTextEditor::with_content("a<br>b");
        editor.select_all();
        editor.apply_format(FormatTag::Heading(HeadingLevel::H2));
        assert_eq!(editor.content(), "<span><h2>a<br>b</h2></span>");
    }

    #[test]
    fn test_alignment_format() {
        let mut editor = typed("x");
        editor.select_all();
        editor.apply_format(FormatTag::Align(Alignment::Center));
        assert_eq!(
            editor.content(),
            "<span><div style=\"text-align: center\">x</div></span>"
        );
    }

    #[test]
    fn test_change_callback_fires_once_per_action() {
        let mut editor = typed("hello");
        let seen = recording(&mut editor);
        editor.select_all();
        editor.apply_format(FormatTag::Bold);
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(seen.borrow()[0], "<span><strong>hello</strong></span>");
    }

    #[test]
    fn test_set_content_does_not_fire_callback() {
        let mut editor = RichTextEditor::new();
        let seen = recording(&mut editor);
        editor.set_content("<p>x</p>");
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_insert_html_places_caret_after_fragment() {
        let mut editor = typed("ad");
        editor.set_caret(1);
        editor.insert_html("<em>bc</em>");
        assert_eq!(editor.content(), "a<span><em>bc</em></span>d");
        assert_eq!(editor.caret(), 3);
    }

    #[test]
    fn test_insert_html_replaces_selection() {
        let mut editor = typed("abcd");
        editor.select(1, 3);
        editor.insert_html("X");
        assert_eq!(editor.content(), "a<span>X</span>d");
        assert_eq!(editor.caret(), 2);
    }

    #[test]
    fn test_insert_html_drops_script() {
        let mut editor = RichTextEditor::new();
        editor.insert_html("<script>alert(1)</script><b>ok</b>");
        assert_eq!(editor.content(), "<span><strong>ok</strong></span>");
    }

    #[test]
    fn test_insert_list_then_type_fills_item() {
        let mut editor = typed("ab");
        editor.insert_list(ListKind::Unordered);
        editor.insert_text("item");
        assert_eq!(editor.content(), "ab<span><ul><li>item</li></ul></span>");
        assert_eq!(editor.caret(), 6);
    }

    #[test]
    fn test_insert_link_uses_selection_as_text() {
        let mut editor = typed("see docs");
        editor.select(4, 8);
        editor.insert_link("https://x.test/a?b=1&c=2");
        assert_eq!(
            editor.content(),
            "see <span><a href=\"https://x.test/a?b=1&amp;c=2\">docs</a></span>"
        );
    }

    #[test]
    fn test_insert_link_without_selection_uses_url() {
        let mut editor = RichTextEditor::new();
        editor.insert_link("https://x.test");
        assert_eq!(
            editor.content(),
            "<span><a href=\"https://x.test\">https://x.test</a></span>"
        );
    }

    #[test]
    fn test_insert_unsafe_link_keeps_text_only() {
        let mut editor = RichTextEditor::new();
        editor.insert_link("javascript:alert(1)");
        assert_eq!(editor.content(), "<span>javascript:alert(1)</span>");
    }

    #[test]
    fn test_paste_converts_newlines() {
        let mut editor = RichTextEditor::new();
        editor.paste_text("a\r\nb\nc\rd <x>");
        assert_eq!(editor.content(), "<span>a<br>b<br>c<br>d &lt;x&gt;</span>");
        assert_eq!(editor.caret(), 11);
    }

    #[test]
    fn test_sanitize_paste() {
        assert_eq!(sanitize_paste("<b>x</b>\n"), "&lt;b&gt;x&lt;/b&gt;<br>");
    }

    #[test]
    fn test_enter_inserts_line_break() {
        let mut editor = typed("ab");
        editor.set_caret(1);
        editor.execute(EditorCommand::InsertLineBreak);
        assert_eq!(editor.content(), "a<span><br></span>b");
        assert_eq!(editor.caret(), 2);
    }

    #[test]
    fn test_disabled_freezes_everything() {
        let mut editor = typed("hello");
        let seen = recording(&mut editor);
        editor.set_disabled(true);
        editor.select_all();
        assert_eq!(editor.apply_format(FormatTag::Bold), EditOutcome::Unchanged);
        assert_eq!(editor.insert_text("x"), EditOutcome::Unchanged);
        assert_eq!(editor.paste_text("x"), EditOutcome::Unchanged);
        assert_eq!(editor.delete_backward(), EditOutcome::Unchanged);
        assert_eq!(
            editor.apply_toolbar(ToolbarAction::BulletList),
            EditOutcome::Unchanged
        );
        assert!(!editor.toolbar_enabled());
        assert_eq!(editor.content(), "hello");
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_typing_after_bold_extends_it() {
        let mut editor = RichTextEditor::with_content("<strong>ab</strong>");
        editor.move_document_end(false);
        editor.insert_text("c");
        assert_eq!(editor.content(), "<strong>abc</strong>");
    }

    #[test]
    fn test_delete_backward_and_forward() {
        let mut editor = typed("abc");
        editor.set_caret(2);
        editor.delete_backward();
        assert_eq!(editor.content(), "ac");
        assert_eq!(editor.caret(), 1);
        editor.delete_forward();
        assert_eq!(editor.content(), "a");
        assert_eq!(editor.delete_forward(), EditOutcome::Unchanged);
        editor.set_caret(0);
        assert_eq!(editor.delete_backward(), EditOutcome::Unchanged);
    }

    #[test]
    fn test_delete_selection() {
        let mut editor = RichTextEditor::with_content("a<strong>bc</strong>d");
        editor.select(1, 3);
        editor.delete_backward();
        assert_eq!(editor.content(), "ad");
        assert_eq!(editor.selection(), Selection::caret(1));
    }

    #[test]
    fn test_left_right_collapse_selection() {
        let mut editor = typed("abcd");
        editor.select(1, 3);
        editor.move_caret(Direction::Left, false);
        assert_eq!(editor.selection(), Selection::caret(1));
        editor.select(1, 3);
        editor.move_caret(Direction::Right, false);
        assert_eq!(editor.selection(), Selection::caret(3));
    }

    #[test]
    fn test_shift_arrows_extend() {
        let mut editor = typed("abcd");
        editor.set_caret(1);
        editor.move_caret(Direction::Right, true);
        editor.move_caret(Direction::Right, true);
        assert_eq!(editor.selected_text(), "bc");
    }

    #[test]
    fn test_home_end_are_line_aware() {
        let mut editor = RichTextEditor::with_content("ab<br>cde");
        editor.set_caret(4);
        editor.move_line_start(false);
        assert_eq!(editor.caret(), 3);
        editor.move_line_end(false);
        assert_eq!(editor.caret(), 6);
    }

    #[test]
    fn test_vertical_movement_remembers_column() {
        let mut editor = RichTextEditor::with_content("abcd<br>x<br>wxyz");
        editor.set_caret(3);
        editor.move_caret(Direction::Down, false);
        assert_eq!(editor.caret(), 6);
        editor.move_caret(Direction::Down, false);
        assert_eq!(editor.caret(), 10);
        editor.move_caret(Direction::Up, false);
        editor.move_caret(Direction::Up, false);
        assert_eq!(editor.caret(), 3);
    }

    #[test]
    fn test_placeholder_visibility() {
        let mut editor = RichTextEditor::new();
        editor.set_placeholder(Some("Write something".to_string()));
        assert!(editor.placeholder_visible());
        editor.focus();
        assert!(!editor.placeholder_visible());
        editor.blur();
        editor.set_content("x");
        assert!(!editor.placeholder_visible());
    }

    #[test]
    fn test_set_content_clamps_selection() {
        let mut editor = typed("abcdef");
        editor.select_all();
        editor.set_content("ab");
        assert_eq!(editor.selection(), Selection::new(2, 2));
    }

    #[test]
    fn test_set_content_then_bold_wraps_nothing() {
        let mut editor = RichTextEditor::with_content("hello world");
        editor.select(0, 11);
        editor.set_content("<p>reloaded from disk</p>");
        assert!(editor.selection().is_collapsed());
        assert_eq!(editor.apply_format(FormatTag::Bold), EditOutcome::Unchanged);
        assert_eq!(editor.content(), "<p>reloaded from disk</p>");
    }
}
