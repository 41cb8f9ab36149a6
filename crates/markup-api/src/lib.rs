//! Streaming HTML and XML tag processing with lazy text replacement.
//!
//! A processor walks a document one token at a time, reports what it
//! finds, and records replacements for the text of the tokens it visits.
//! The input is never re-parsed or copied while scanning; edits are only
//! stitched into the output when the updated document is requested.

#[macro_use]
mod macros;

pub mod attributes;
pub mod errors;
pub mod lexical_updates;
pub mod modifiable_text;
pub mod settings;
pub mod span;
pub mod stack_of_open_elements;
pub mod str_fns;
pub mod tag_name;
pub mod tag_processor;
pub mod token;
pub mod xml_processor;

pub use attributes::AttributeValue;
pub use errors::{EditError, TextUpdateError};
pub use settings::{Dialect, Settings};
pub use tag_name::TagName;
pub use tag_processor::{ParsingNamespace, TagProcessor, TagQuery, VisitClosers};
pub use token::{CommentType, NodeName, Token, TokenFlags, TokenKind, TokenType};
pub use xml_processor::XmlProcessor;
