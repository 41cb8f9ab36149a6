use crate::span::HtmlSpan;
use thiserror::Error;

/// Rejection of a patch by the lazy edit buffer.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum EditError {
    #[error("patch over {start}..{end} overlaps the pending patch over {other_start}..{other_end}")]
    OverlappingPatch {
        start: usize,
        end: usize,
        other_start: usize,
        other_end: usize,
    },

    #[error("patch over {start}..{end} lies outside of the {document_length}-byte document")]
    OutOfBounds {
        start: usize,
        end: usize,
        document_length: usize,
    },
}

impl EditError {
    pub(crate) fn overlapping(span: HtmlSpan, other: HtmlSpan) -> Self {
        EditError::OverlappingPatch {
            start: span.start,
            end: span.end(),
            other_start: other.start,
            other_end: other.end(),
        }
    }

    pub(crate) fn out_of_bounds(span: HtmlSpan, document_length: usize) -> Self {
        EditError::OutOfBounds {
            start: span.start,
            end: span.end(),
            document_length,
        }
    }
}

/// Reason a call to `set_modifiable_text()` was refused.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum TextUpdateError {
    #[error("the processor is not paused on a token")]
    NoToken,

    #[error("the current token has no modifiable text")]
    NoModifiableText,

    #[error("the modifiable text of {0} tokens cannot be replaced")]
    ReadOnly(&'static str),

    #[error("the new text would close the {0} element")]
    WouldCloseElement(Box<str>),

    #[error("the new text would change how the enclosing SCRIPT element is parsed")]
    UnsafeScriptContent,

    #[error(transparent)]
    Edit(#[from] EditError),
}
