use crate::{errors::EditError, span::HtmlSpan};
use std::collections::BTreeMap;

/// Pending replacements against an immutable input document.
///
/// Nothing is ever written into the input. Each patch names the span of
/// original bytes it replaces; the updated document is only assembled when
/// it's asked for, copying every unpatched range verbatim. Because the
/// input never moves, spans recorded for earlier tokens stay valid no
/// matter how many patches pile up.
///
/// An empty span is an insertion point. Patches may touch but never
/// overlap, and an insertion point may not fall strictly inside a
/// replaced span.
#[derive(Debug, Default, Clone)]
pub struct LexicalUpdates {
    patches: BTreeMap<HtmlSpan, Box<[u8]>>,
}

impl LexicalUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `replacement` for `span` in a document of `document_length` bytes.
    ///
    /// A patch over exactly the same span as an earlier one replaces it.
    pub fn apply(
        &mut self,
        document_length: usize,
        span: HtmlSpan,
        replacement: &[u8],
    ) -> Result<(), EditError> {
        if span.end() > document_length {
            return Err(EditError::out_of_bounds(span, document_length));
        }

        if !self.patches.contains_key(&span) {
            if let Some(other) = self.conflicting_patch(span) {
                return Err(EditError::overlapping(span, other));
            }
        }

        log::trace!(
            target: "markup_api::lexical_updates",
            "patch {}..{} with {} bytes",
            span.start,
            span.end(),
            replacement.len()
        );
        self.patches.insert(span, replacement.into());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Builds the updated document from `original` and the pending patches.
    ///
    /// This never changes the recorded patches, so it may be called any
    /// number of times.
    pub fn serialize(&self, original: &[u8]) -> Vec<u8> {
        let added: usize = self.patches.values().map(|r| r.len()).sum();
        let mut output = Vec::with_capacity(original.len() + added);
        let mut at = 0;

        for (span, replacement) in &self.patches {
            output.extend_from_slice(&original[at..span.start]);
            output.extend_from_slice(replacement);
            at = span.end();
        }

        output.extend_from_slice(&original[at..]);
        output
    }

    /// Finds a recorded patch which can't coexist with one over `span`.
    ///
    /// Recorded patches never conflict, so sorted by where they start they
    /// are also sorted by where they end: walking back from the last one
    /// starting inside `span` stops at the first which ends before it.
    fn conflicting_patch(&self, span: HtmlSpan) -> Option<HtmlSpan> {
        let last_candidate = HtmlSpan::new(span.end(), usize::MAX);

        for other in self.patches.range(..=last_candidate).rev().map(|(k, _)| k) {
            if other.end() < span.start {
                break;
            }

            if conflicts(&span, other) {
                return Some(*other);
            }
        }

        None
    }
}

fn conflicts(a: &HtmlSpan, b: &HtmlSpan) -> bool {
    match (a.is_empty(), b.is_empty()) {
        (false, false) => a.overlaps(b),
        (true, false) => b.start < a.start && a.start < b.end(),
        (false, true) => a.start < b.start && b.start < a.end(),
        (true, true) => false,
    }
}
