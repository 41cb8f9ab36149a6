use crate::{span::HtmlSpan, tag_name::TagName};
use bitflags::bitflags;
use std::fmt;

/// Kind of the matched token, as reported by `get_token_type()`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TokenType {
    Tag,
    Text,
    CdataSection,
    Comment,
    Doctype,
    PresumptuousCloser,
    FunkyComment,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Tag => "#tag",
            TokenType::Text => "#text",
            TokenType::CdataSection => "#cdata-section",
            TokenType::Comment => "#comment",
            TokenType::Doctype => "#doctype",
            TokenType::PresumptuousCloser => "#presumptuous-closer",
            TokenType::FunkyComment => "#funky-comment",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of the matched token, as reported by `get_token_name()`.
///
/// Tags report their tag name, a DOCTYPE reports `html`, and every
/// other token reports its token type.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum NodeName {
    Tag(TagName),
    Doctype,
    Token(TokenType),
}

impl NodeName {
    pub fn as_str(&self) -> &str {
        match self {
            NodeName::Tag(tag_name) => tag_name.as_str(),
            NodeName::Doctype => "html",
            NodeName::Token(token_type) => token_type.as_str(),
        }
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<TagName> for NodeName {
    fn from(tag_name: TagName) -> Self {
        NodeName::Tag(tag_name)
    }
}

impl From<TokenType> for NodeName {
    fn from(token_type: TokenType) -> Self {
        NodeName::Token(token_type)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CommentType {
    /// Comment created when encountering an abruptly-closed HTML comment.
    ///
    /// Example:
    ///
    /// ```text
    /// <!-->
    /// <!--->
    /// ```
    AbruptlyClosedComment,

    /// Comment which would be parsed as a CDATA node,
    /// were HTML to allow CDATA nodes outside of foreign content.
    ///
    /// Example:
    ///
    /// ```text
    /// <![CDATA[This is a CDATA node.]]>
    /// ```
    CdataLookalike,

    /// Comment created when encountering normative HTML comment syntax.
    ///
    /// Example:
    ///
    /// ```text
    /// <!-- this is a comment -->
    /// ```
    HtmlComment,

    /// Comment which would be parsed as a Processing Instruction node,
    /// were they to exist within HTML.
    ///
    /// Example:
    ///
    /// ```text
    /// <?wp __( 'Like' ) ?>
    /// ```
    PiNodeLookalike,

    /// Comment created when encountering invalid HTML input,
    /// a so-called "bogus comment."
    ///
    /// Example:
    ///
    /// ```text
    /// <?nothing special>
    /// <!{nothing special}>
    /// ```
    InvalidHtml,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TokenKind {
    TagOpen,
    TagClose,
    Text,
    Comment(CommentType),
    CdataSection,
    Doctype,
    FunkyComment,
    PresumptuousCloser,
    EndOfStream,
    Incomplete,
}

impl TokenKind {
    /// The reported token type; `None` for the end-of-stream and incomplete markers.
    pub fn token_type(&self) -> Option<TokenType> {
        match self {
            TokenKind::TagOpen | TokenKind::TagClose => Some(TokenType::Tag),
            TokenKind::Text => Some(TokenType::Text),
            TokenKind::Comment(_) => Some(TokenType::Comment),
            TokenKind::CdataSection => Some(TokenType::CdataSection),
            TokenKind::Doctype => Some(TokenType::Doctype),
            TokenKind::FunkyComment => Some(TokenType::FunkyComment),
            TokenKind::PresumptuousCloser => Some(TokenType::PresumptuousCloser),
            TokenKind::EndOfStream | TokenKind::Incomplete => None,
        }
    }
}

bitflags! {
    #[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
    pub struct TokenFlags: u8 {
        const SELF_CLOSING = 0b0000_0001;
        const VOID = 0b0000_0010;
        const RAW_TEXT = 0b0000_0100;
        const ESCAPABLE_RAW_TEXT = 0b0000_1000;
        const MODIFIABLE = 0b0001_0000;
    }
}

/// A classified token with byte offsets into the original document.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Token {
    pub kind: TokenKind,

    /// Tag name for tags, target for processing-instruction lookalikes.
    pub name_span: Option<HtmlSpan>,

    /// Every byte of the token, from its first `<` to its last `>`.
    pub full_span: HtmlSpan,

    pub flags: TokenFlags,
}

impl Token {
    pub fn end_of_stream(at: usize) -> Self {
        Self {
            kind: TokenKind::EndOfStream,
            name_span: None,
            full_span: HtmlSpan::new(at, 0),
            flags: TokenFlags::empty(),
        }
    }

    pub fn incomplete(full_span: HtmlSpan) -> Self {
        Self {
            kind: TokenKind::Incomplete,
            name_span: None,
            full_span,
            flags: TokenFlags::empty(),
        }
    }

    pub fn is_end(&self) -> bool {
        matches!(self.kind, TokenKind::EndOfStream | TokenKind::Incomplete)
    }
}
