/// A selection in visible-character offsets.
///
/// `anchor` stays put while extending; `focus` is where the caret is drawn.
/// A collapsed selection is a plain caret.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub anchor: usize,
    pub focus: usize,
}

impl Selection {
    /// A collapsed selection at `offset`.
    pub const fn caret(offset: usize) -> Self {
        Self {
            anchor: offset,
            focus: offset,
        }
    }

    pub const fn new(anchor: usize, focus: usize) -> Self {
        Self { anchor, focus }
    }

    pub const fn start(self) -> usize {
        if self.anchor < self.focus {
            self.anchor
        } else {
            self.focus
        }
    }

    pub const fn end(self) -> usize {
        if self.anchor > self.focus {
            self.anchor
        } else {
            self.focus
        }
    }

    pub const fn is_collapsed(self) -> bool {
        self.anchor == self.focus
    }

    pub const fn len(self) -> usize {
        self.end() - self.start()
    }

    pub const fn is_empty(self) -> bool {
        self.is_collapsed()
    }

    /// Whether the visible character at `offset` is selected.
    pub const fn covers(self, offset: usize) -> bool {
        offset >= self.start() && offset < self.end()
    }

    /// Clamp both ends to `max`.
    pub fn clamped(self, max: usize) -> Self {
        Self {
            anchor: self.anchor.min(max),
            focus: self.focus.min(max),
        }
    }
}

/// Direction for caret movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}
