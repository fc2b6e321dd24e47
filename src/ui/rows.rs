//! Wrap display lines into terminal rows.
//!
//! Every glyph keeps its document offset so the caret, the selection and
//! mouse clicks can be mapped between offsets and cells.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::document::{Alignment, InlineStyle, LineType, ListMarker, RenderedLine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub offset: usize,
    pub style: InlineStyle,
    pub width: usize,
}

/// One terminal row of wrapped document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub line_type: LineType,
    /// List marker or its blank continuation indent.
    pub prefix: String,
    /// The prefix is a visible marker (first row of a list item).
    pub marker: bool,
    /// Blank columns from alignment, before the prefix.
    pub pad: usize,
    pub glyphs: Vec<Glyph>,
    pub start: usize,
    pub end: usize,
    /// Last row of its display line. Only such rows hold a caret at `end`.
    pub closes_line: bool,
}

impl DisplayRow {
    /// Columns before the first glyph.
    pub fn lead(&self) -> usize {
        self.pad + self.prefix.width()
    }

    pub fn width(&self) -> usize {
        self.lead() + self.glyphs.iter().map(|g| g.width).sum::<usize>()
    }

    pub const fn holds_caret(&self, offset: usize) -> bool {
        offset >= self.start && (offset < self.end || (self.closes_line && offset == self.end))
    }
}

/// Wrap `lines` to `width` columns.
pub fn wrap_lines(lines: &[RenderedLine], width: usize) -> Vec<DisplayRow> {
    let mut rows = Vec::new();
    for line in lines {
        wrap_line(line, width.max(1), &mut rows);
    }
    rows
}

fn wrap_line(line: &RenderedLine, width: usize, rows: &mut Vec<DisplayRow>) {
    let (prefix, marker) = prefix_for(line.line_type());
    let prefix_width = prefix.width();
    let avail = width.saturating_sub(prefix_width).max(1);

    let glyphs = line.spans().iter().flat_map(|span| {
        span.text().chars().enumerate().map(move |(i, ch)| Glyph {
            ch,
            offset: span.start() + i,
            style: span.style(),
            width: ch.width().unwrap_or(0),
        })
    });
    let chunks = break_glyphs(glyphs, avail);
    let last = chunks.len() - 1;

    for (index, chunk) in chunks.into_iter().enumerate() {
        let start = if index == 0 {
            line.start()
        } else {
            chunk.first().map_or(line.end(), |g| g.offset)
        };
        let end = if index == last {
            line.end()
        } else {
            chunk.last().map_or(start, |g| g.offset + 1)
        };
        let used: usize = chunk.iter().map(|g| g.width).sum();
        let free = avail.saturating_sub(used);
        let pad = match line.alignment() {
            Some(Alignment::Center) => free / 2,
            Some(Alignment::Right) => free,
            _ => 0,
        };
        let first = index == 0;
        rows.push(DisplayRow {
            line_type: line.line_type(),
            prefix: if first {
                prefix.clone()
            } else {
                " ".repeat(prefix_width)
            },
            marker: first && marker,
            pad,
            glyphs: chunk,
            start,
            end,
            closes_line: index == last,
        });
    }
}

fn prefix_for(line_type: LineType) -> (String, bool) {
    match line_type {
        LineType::ListItem { depth, marker } => {
            let indent = "  ".repeat(depth);
            match marker {
                ListMarker::Bullet => (format!("{indent}• "), true),
                ListMarker::Number(n) => (format!("{indent}{n}. "), true),
                ListMarker::None => (format!("{indent}  "), false),
            }
        }
        LineType::Heading(_) | LineType::Paragraph => (String::new(), false),
    }
}

/// Break glyphs into rows of at most `avail` columns, preferring to break
/// after a space. Always yields at least one (possibly empty) row.
fn break_glyphs(glyphs: impl Iterator<Item = Glyph>, avail: usize) -> Vec<Vec<Glyph>> {
    let mut rows = Vec::new();
    let mut current: Vec<Glyph> = Vec::new();
    let mut used = 0;
    for glyph in glyphs {
        while used + glyph.width > avail && !current.is_empty() {
            let carry = match current.iter().rposition(|g| g.ch == ' ') {
                Some(space) if space + 1 < current.len() => current.split_off(space + 1),
                _ => Vec::new(),
            };
            rows.push(std::mem::replace(&mut current, carry));
            used = current.iter().map(|g| g.width).sum();
        }
        used += glyph.width;
        current.push(glyph);
    }
    rows.push(current);
    rows
}

/// Row index and column of the caret at `offset`.
///
/// A caret on a boundary shared by two lines belongs to the earlier line.
pub fn caret_cell(rows: &[DisplayRow], offset: usize) -> (usize, usize) {
    let Some(index) = rows.iter().position(|row| row.holds_caret(offset)) else {
        return rows
            .len()
            .checked_sub(1)
            .map_or((0, 0), |last| (last, rows[last].width()));
    };
    let row = &rows[index];
    let col = row.lead()
        + row
            .glyphs
            .iter()
            .take_while(|g| g.offset < offset)
            .map(|g| g.width)
            .sum::<usize>();
    (index, col)
}

/// Document offset under the cell at (`row`, `col`).
///
/// Columns past the text resolve to the end of the row.
pub fn offset_at(rows: &[DisplayRow], row: usize, col: usize) -> Option<usize> {
    let row = rows.get(row)?;
    let mut x = row.lead();
    for glyph in &row.glyphs {
        if col < x + glyph.width.max(1) {
            return Some(glyph.offset);
        }
        x += glyph.width;
    }
    Some(if row.closes_line {
        row.end
    } else {
        row.end.saturating_sub(1).max(row.start)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn rows_for(html: &str, width: usize) -> Vec<DisplayRow> {
        wrap_lines(&Document::parse(html).layout(), width)
    }

    fn row_text(row: &DisplayRow) -> String {
        row.glyphs.iter().map(|g| g.ch).collect()
    }

    #[test]
    fn test_short_line_is_one_row() {
        let rows = rows_for("hello", 20);
        assert_eq!(rows.len(), 1);
        assert_eq!(row_text(&rows[0]), "hello");
        assert_eq!((rows[0].start, rows[0].end), (0, 5));
        assert!(rows[0].closes_line);
    }

    #[test]
    fn test_wraps_after_space() {
        let rows = rows_for("hello brave world", 12);
        assert_eq!(rows.len(), 2);
        assert_eq!(row_text(&rows[0]), "hello brave ");
        assert_eq!(row_text(&rows[1]), "world");
        assert_eq!(rows[0].end, 12);
        assert_eq!(rows[1].start, 12);
    }

    #[test]
    fn test_long_word_breaks_mid_word() {
        let rows = rows_for("abcdefgh", 3);
        let texts: Vec<String> = rows.iter().map(row_text).collect();
        assert_eq!(texts, ["abc", "def", "gh"]);
    }

    #[test]
    fn test_wide_chars_count_two_columns() {
        let rows = rows_for("日本語", 4);
        assert_eq!(rows.len(), 2);
        assert_eq!(row_text(&rows[0]), "日本");
    }

    #[test]
    fn test_list_prefix_and_continuation_indent() {
        let rows = rows_for("<ol><li>one two three</li></ol>", 10);
        assert_eq!(rows[0].prefix, "1. ");
        assert!(rows[0].marker);
        assert_eq!(rows[1].prefix, "   ");
        assert!(!rows[1].marker);
    }

    #[test]
    fn test_right_alignment_pads() {
        let rows = rows_for(r#"<div style="text-align: right">ab</div>"#, 10);
        assert_eq!(rows[0].pad, 8);
        let (_, col) = caret_cell(&rows, 0);
        assert_eq!(col, 8);
    }

    #[test]
    fn test_caret_cell_at_wrap_boundary_goes_to_next_row() {
        let rows = rows_for("hello brave world", 12);
        assert_eq!(caret_cell(&rows, 12), (1, 0));
        assert_eq!(caret_cell(&rows, 17), (1, 5));
    }

    #[test]
    fn test_caret_cell_on_empty_document() {
        assert_eq!(caret_cell(&[], 0), (0, 0));
    }

    #[test]
    fn test_caret_after_line_break() {
        let rows = rows_for("ab<br>cd", 20);
        assert_eq!(caret_cell(&rows, 2), (0, 2));
        assert_eq!(caret_cell(&rows, 3), (1, 0));
    }

    #[test]
    fn test_offset_at_maps_cells_back() {
        let rows = rows_for("ab<br>cd", 20);
        assert_eq!(offset_at(&rows, 1, 1), Some(4));
        assert_eq!(offset_at(&rows, 1, 50), Some(5));
        assert_eq!(offset_at(&rows, 0, 0), Some(0));
        assert_eq!(offset_at(&rows, 7, 0), None);
    }

    #[test]
    fn test_offset_at_past_wrapped_row_stays_on_row() {
        let rows = rows_for("hello brave world", 12);
        assert_eq!(offset_at(&rows, 0, 30), Some(11));
    }
}
