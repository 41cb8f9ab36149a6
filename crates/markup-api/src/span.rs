use std::ops::Range;

/// A byte range in the original input document.
///
/// Spans always refer to the unmodified input; edits are recorded
/// against them and only resolved when the updated document is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HtmlSpan {
    pub start: usize,
    pub length: usize,
}

impl HtmlSpan {
    pub fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    pub fn end(&self) -> usize {
        self.start + self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }

    /// Whether the two spans share at least one byte.
    ///
    /// Empty spans never overlap anything; they mark an insertion point.
    pub fn overlaps(&self, other: &HtmlSpan) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.start < other.end()
            && other.start < self.end()
    }
}
