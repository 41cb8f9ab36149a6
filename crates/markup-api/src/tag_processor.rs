use crate::{
    attributes::{scan_attributes, AttributeToken, AttributeValue},
    errors::TextUpdateError,
    lexical_updates::LexicalUpdates,
    modifiable_text::{ModifiableText, TextDecoding, TextEscaping},
    settings::{Dialect, Settings},
    span::HtmlSpan,
    stack_of_open_elements::{OpenElement, StackOfOpenElements},
    str_fns::{
        is_html_whitespace, is_tag_name_terminator, starts_with_ignore_ascii_case, stripos, strpos,
    },
    tag_name::{TagName, TextMode},
    token::{CommentType, NodeName, Token, TokenFlags, TokenKind, TokenType},
};
use entities::{decode, decode_xml, HtmlContext};
use std::{cell::OnceCell, fmt, rc::Rc};

/// Scans a document token by token, tracking open elements and recording
/// edits to the text of the tokens it passes.
///
/// The processor only ever moves forward. Edits are recorded against
/// the original byte offsets and applied when the updated document is
/// requested, so the input is never re-scanned.
///
/// Example:
///
/// ```text
/// let mut processor = TagProcessor::new(b"<p>Hello</p>");
/// processor.next_token(); // <p>
/// processor.next_token(); // Hello
/// processor.set_modifiable_text("Hi & bye");
/// processor.get_updated_html() == "<p>Hi &amp; bye</p>";
/// ```
pub struct TagProcessor {
    html_bytes: Box<[u8]>,
    settings: Settings,
    bytes_already_parsed: usize,
    parser_state: ParserState,

    /// Token the processor is paused on, or the incomplete and
    /// end-of-stream markers once scanning stops.
    token: Option<Token>,

    /// Span of the modifiable text of the current token, if it has any.
    text_span: Option<HtmlSpan>,

    /// Element name of a tag, or target of a processing instruction lookalike.
    tag_name: Option<TagName>,

    /// Whether the current tag is written as a closer, even when it's
    /// reported as an opener, as with `</br>`.
    is_closing_tag: bool,

    /// Namespace of the current token.
    parsing_namespace: ParsingNamespace,

    /// The last opener entered an element whose contents are raw text,
    /// so the next token is that text, whatever it looks like.
    expects_raw_text: bool,

    /// For LISTING, PRE, and TEXTAREA, the first linefeed of an
    /// immediately-following text node is ignored as an authoring
    /// convenience. This is where that text node would start.
    skip_newline_at: Option<usize>,

    stack: StackOfOpenElements,

    /// A matched element which isn't on the stack but still ends the
    /// breadcrumbs: void and self-closing elements, and closed elements.
    breadcrumb_tail: Option<OpenElement>,

    /// Attributes of the current tag, parsed on first access.
    attributes: OnceCell<Vec<AttributeToken>>,

    lexical_updates: LexicalUpdates,

    /// Text written to the current token, if it was replaced.
    updated_text: Option<Rc<str>>,
}

#[derive(Default, PartialEq, Eq, Debug, Clone, Copy)]
pub enum ParsingNamespace {
    #[default]
    Html,
    Svg,
    MathML,
}

impl ParsingNamespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParsingNamespace::Html => "html",
            ParsingNamespace::Svg => "svg",
            ParsingNamespace::MathML => "math",
        }
    }
}

impl fmt::Display for ParsingNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Default, PartialEq, Eq, Debug, Clone, Copy)]
enum ParserState {
    #[default]
    Ready,
    Matched,
    Complete,
    IncompleteInput,
}

/// Outcome of scanning from the current position.
enum Lexed {
    Token {
        token: Token,
        text: Option<HtmlSpan>,
    },
    Incomplete,
    End,
}

impl Lexed {
    fn text(starts_at: usize, ends_at: usize, flags: TokenFlags) -> Self {
        let span = HtmlSpan::new(starts_at, ends_at - starts_at);
        Lexed::Token {
            token: Token {
                kind: TokenKind::Text,
                name_span: None,
                full_span: span,
                flags,
            },
            text: Some(span),
        }
    }

    /// A comment-like token from `starts_at` up to `ends_at`, whose text
    /// runs from `text_starts_at` up to `text_ends_at`.
    fn commentish(
        kind: TokenKind,
        starts_at: usize,
        ends_at: usize,
        text_starts_at: usize,
        text_ends_at: usize,
    ) -> Self {
        Lexed::Token {
            token: Token {
                kind,
                name_span: None,
                full_span: HtmlSpan::new(starts_at, ends_at - starts_at),
                flags: TokenFlags::empty(),
            },
            text: Some(HtmlSpan::new(text_starts_at, text_ends_at - text_starts_at)),
        }
    }
}

/// Which tags `next_tag()` stops on.
#[derive(Debug, Clone, Default)]
pub struct TagQuery<'q> {
    /// Matches the tag name; ASCII case-insensitive for HTML.
    pub tag_name: Option<&'q str>,

    /// Matches tags whose `class` attribute contains this class name.
    pub class_name: Option<&'q str>,

    /// Matches the innermost breadcrumbs, with `*` matching any element.
    pub breadcrumbs: Option<&'q [&'q str]>,

    /// Stop on the nth matching tag instead of the first.
    pub match_offset: usize,

    pub tag_closers: VisitClosers,
}

impl<'q> TagQuery<'q> {
    pub fn tag(tag_name: &'q str) -> Self {
        Self {
            tag_name: Some(tag_name),
            ..Default::default()
        }
    }

    pub fn class(class_name: &'q str) -> Self {
        Self {
            class_name: Some(class_name),
            ..Default::default()
        }
    }

    pub fn breadcrumbs(breadcrumbs: &'q [&'q str]) -> Self {
        Self {
            breadcrumbs: Some(breadcrumbs),
            ..Default::default()
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum VisitClosers {
    #[default]
    Skip,
    Visit,
}

#[derive(PartialEq, Eq, Clone, Copy)]
enum ScriptState {
    Unescaped,
    Escaped,
    DoubleEscaped,
}

impl TagProcessor {
    pub fn new(html: &[u8]) -> Self {
        Self::with_settings(html, Settings::default())
    }

    pub fn create_fragment(html: &str) -> Self {
        Self::new(html.as_bytes())
    }

    pub fn with_settings(html: &[u8], settings: Settings) -> Self {
        Self {
            html_bytes: html.into(),
            settings,
            bytes_already_parsed: 0,
            parser_state: ParserState::Ready,
            token: None,
            text_span: None,
            tag_name: None,
            is_closing_tag: false,
            parsing_namespace: ParsingNamespace::Html,
            expects_raw_text: false,
            skip_newline_at: None,
            stack: StackOfOpenElements::new(),
            breadcrumb_tail: None,
            attributes: OnceCell::new(),
            lexical_updates: LexicalUpdates::new(),
            updated_text: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Treats the contents of every later `name` element as raw text.
    pub(crate) fn declare_pcdata_element(&mut self, name: &str) {
        self.settings.pcdata_elements.insert(name.into());
    }

    fn is_xml(&self) -> bool {
        self.settings.is_xml()
    }

    /// Finds the next token in the document.
    ///
    /// A document can be viewed as a stream of tokens,
    /// where tokens are things like tags, comments,
    /// text nodes, etc. This method finds the next token in
    /// the document and returns whether it found one.
    ///
    /// If it starts parsing a token and reaches the end of the
    /// document then it will pause at the start of that last
    /// token, returning `false` to indicate that it failed to
    /// find a complete token. Nothing is consumed after that.
    ///
    /// @return bool Whether a token was parsed.
    pub fn next_token(&mut self) -> bool {
        if matches!(
            self.parser_state,
            ParserState::Complete | ParserState::IncompleteInput
        ) {
            return false;
        }

        self.after_token();

        let was_at = self.bytes_already_parsed;
        let lexed = if std::mem::take(&mut self.expects_raw_text) {
            self.lex_raw_text(was_at)
        } else {
            self.lex_markup(was_at)
        };

        match lexed {
            Lexed::Token { token, text } => {
                self.parser_state = ParserState::Matched;
                self.bytes_already_parsed = token.full_span.end();
                self.text_span = text;
                self.token = Some(token);
                self.after_match();

                log::trace!(
                    target: "markup_api::tokenizer",
                    "{:?} at {}..{}",
                    token.kind,
                    token.full_span.start,
                    token.full_span.end()
                );
                true
            }

            Lexed::Incomplete => {
                let remaining = HtmlSpan::new(was_at, self.html_bytes.len() - was_at);
                self.parser_state = ParserState::IncompleteInput;
                self.token = Some(Token::incomplete(remaining));

                log::trace!(
                    target: "markup_api::tokenizer",
                    "incomplete input at {}",
                    was_at
                );
                false
            }

            Lexed::End => {
                self.parser_state = ParserState::Complete;
                self.token = Some(Token::end_of_stream(self.html_bytes.len()));
                false
            }
        }
    }

    /// Finds the next token and returns it.
    ///
    /// Once there are no more tokens this returns the end-of-stream
    /// token, or the incomplete token when the document was cut short
    /// inside of one.
    pub fn advance(&mut self) -> Token {
        self.next_token();
        self.token
            .unwrap_or_else(|| Token::end_of_stream(self.bytes_already_parsed))
    }

    /// Token the processor is paused on, if any.
    pub fn current_token(&self) -> Option<Token> {
        self.token
    }

    /// Whether the document ended inside of a token.
    pub fn paused_at_incomplete_token(&self) -> bool {
        self.parser_state == ParserState::IncompleteInput
    }

    /// Finds the next tag matching the query.
    ///
    /// Example:
    ///
    /// ```text
    /// let mut processor = TagProcessor::new(b"<div><img class='wp-image'></div>");
    /// processor.next_tag(&TagQuery::class("wp-image")) == true;
    /// processor.get_tag() == Some(TagName::IMG);
    /// ```
    ///
    /// @return bool Whether a tag was matched.
    pub fn next_tag(&mut self, query: &TagQuery) -> bool {
        let wanted_match = query.match_offset.max(1);
        let mut already_found = 0;

        while self.next_token() {
            if self.get_token_type() != Some(TokenType::Tag) {
                continue;
            }

            if self.is_tag_closer() && query.tag_closers == VisitClosers::Skip {
                continue;
            }

            if self.matches(query) {
                already_found += 1;
                if already_found >= wanted_match {
                    return true;
                }
            }
        }

        false
    }

    fn matches(&self, query: &TagQuery) -> bool {
        if let Some(wanted_tag) = query.tag_name {
            let Some(tag_name) = &self.tag_name else {
                return false;
            };
            if !self.names_match(tag_name.as_str(), wanted_tag) {
                return false;
            }
        }

        if let Some(wanted_class) = query.class_name {
            if self.has_class(wanted_class) != Some(true) {
                return false;
            }
        }

        if let Some(breadcrumbs) = query.breadcrumbs {
            if !self.matches_breadcrumbs(breadcrumbs) {
                return false;
            }
        }

        true
    }

    /// Indicates if the current breadcrumbs end with the given ones.
    ///
    /// `*` matches any single element.
    ///
    /// Example:
    ///
    /// ```text
    /// <div><span><figure><img></figure></span></div>
    ///                    ^^^^^
    /// matches_breadcrumbs(&["span", "figure", "img"]) == true;
    /// matches_breadcrumbs(&["span", "*", "img"]) == true;
    /// matches_breadcrumbs(&["div", "img"]) == false;
    /// ```
    pub fn matches_breadcrumbs(&self, breadcrumbs: &[&str]) -> bool {
        let current = self.get_breadcrumbs();
        if breadcrumbs.len() > current.len() {
            return false;
        }

        breadcrumbs
            .iter()
            .rev()
            .zip(current.iter().rev())
            .all(|(wanted, crumb)| *wanted == "*" || self.names_match(crumb, wanted))
    }

    fn names_match(&self, name: &str, wanted: &str) -> bool {
        if self.is_xml() {
            name == wanted
        } else {
            name.eq_ignore_ascii_case(wanted)
        }
    }

    /// Clears the state belonging to the previous token.
    fn after_token(&mut self) {
        self.token = None;
        self.text_span = None;
        self.tag_name = None;
        self.is_closing_tag = false;
        self.breadcrumb_tail = None;
        self.attributes = OnceCell::new();
        self.updated_text = None;
    }

    /// Tracks the elements opened and closed by the matched token.
    fn after_match(&mut self) {
        let Some(mut token) = self.token else {
            return;
        };

        self.parsing_namespace = self.context_namespace();

        match (token.kind, token.name_span) {
            (TokenKind::TagOpen | TokenKind::TagClose, Some(name_span)) => {
                let name = &self.html_bytes[name_span.range()];
                let tag_name = if self.is_xml() {
                    TagName::from_xml(name)
                } else {
                    TagName::from_html(name)
                };

                self.is_closing_tag = token.kind == TokenKind::TagClose;

                /*
                 * `</br>` is a parse error which browsers treat as `<br>`.
                 *
                 * @see https://html.spec.whatwg.org/#parsing-main-inbody
                 */
                if self.is_closing_tag && !self.is_xml() && tag_name == TagName::BR {
                    token.kind = TokenKind::TagOpen;
                }

                if token.kind == TokenKind::TagOpen {
                    self.open_element(&mut token, tag_name.clone());
                } else {
                    self.close_element(tag_name.clone());
                }

                self.tag_name = Some(tag_name);
            }

            (TokenKind::Comment(CommentType::PiNodeLookalike), Some(target_span)) => {
                self.tag_name = Some(TagName::from_xml(&self.html_bytes[target_span.range()]));
            }

            _ => {}
        }

        self.token = Some(token);
        if self
            .modifiable_text()
            .is_some_and(|text| text.is_writable())
        {
            token.flags |= TokenFlags::MODIFIABLE;
            self.token = Some(token);
        }
    }

    fn open_element(&mut self, token: &mut Token, tag_name: TagName) {
        let namespace = self.namespace_for(&tag_name);
        let element = OpenElement::new(tag_name, namespace);
        let is_html_element = !self.is_xml() && namespace == ParsingNamespace::Html;
        let text_mode = self.text_mode_of(&element);

        self.parsing_namespace = namespace;

        let is_void = is_html_element && element.tag_name.is_void();
        if is_void {
            token.flags |= TokenFlags::VOID;
        }

        if is_html_element && element.tag_name.ignores_leading_newline() {
            self.skip_newline_at = Some(token.full_span.end());
        }

        /*
         * In HTML the self-closing flag doesn't stop the tokenizer from
         * switching into a raw text state, so those elements are always
         * entered. In XML `<name/>` is an empty element.
         */
        let is_self_closing = token.flags.contains(TokenFlags::SELF_CLOSING)
            && (self.is_xml() || text_mode == TextMode::Data);
        if is_void || is_self_closing {
            self.breadcrumb_tail = Some(element);
            return;
        }

        match text_mode {
            TextMode::Data => {}
            TextMode::EscapableRawText => token.flags |= TokenFlags::ESCAPABLE_RAW_TEXT,
            TextMode::RawText | TextMode::ScriptData | TextMode::Plaintext => {
                token.flags |= TokenFlags::RAW_TEXT
            }
        }

        self.expects_raw_text = text_mode != TextMode::Data;
        self.stack.push(element);
    }

    fn close_element(&mut self, tag_name: TagName) {
        match self.stack.pop_until(&tag_name) {
            Some(element) => {
                self.parsing_namespace = element.namespace;
                self.breadcrumb_tail = Some(element);
            }

            // Closers without a matching opener are ignored.
            None => {
                self.breadcrumb_tail = Some(OpenElement::new(tag_name, self.parsing_namespace));
            }
        }
    }

    /// Namespace in which the next element or text would be found.
    fn context_namespace(&self) -> ParsingNamespace {
        if self.is_xml() {
            return ParsingNamespace::Html;
        }

        self.stack
            .current_node()
            .map(OpenElement::children_namespace)
            .unwrap_or_default()
    }

    fn namespace_for(&self, tag_name: &TagName) -> ParsingNamespace {
        match self.context_namespace() {
            ParsingNamespace::Html if !self.is_xml() => match tag_name {
                TagName::SVG => ParsingNamespace::Svg,
                TagName::MATH => ParsingNamespace::MathML,
                _ => ParsingNamespace::Html,
            },
            namespace => namespace,
        }
    }

    fn text_mode_of(&self, element: &OpenElement) -> TextMode {
        match self.settings.dialect {
            Dialect::Xml if self.settings.pcdata_elements.contains(element.tag_name.as_str()) => {
                TextMode::RawText
            }
            Dialect::Xml => TextMode::Data,
            Dialect::Html if element.namespace == ParsingNamespace::Html => {
                element.tag_name.text_mode()
            }
            Dialect::Html => TextMode::Data,
        }
    }

    /// Scans the contents of the element at the top of the stack as one text token.
    fn lex_raw_text(&self, at: usize) -> Lexed {
        let Some(element) = self.stack.current_node() else {
            return self.lex_markup(at);
        };

        let html = &self.html_bytes;
        let text_mode = self.text_mode_of(element);
        let closer_at = match text_mode {
            TextMode::Data => return self.lex_markup(at),
            TextMode::Plaintext => Some(html.len()),
            TextMode::ScriptData => find_script_closer(html, at),
            TextMode::RawText | TextMode::EscapableRawText => find_closing_tag(
                html,
                at,
                element.tag_name.as_str().as_bytes(),
                self.is_xml(),
            ),
        };

        let Some(closer_at) = closer_at else {
            return Lexed::Incomplete;
        };

        let flags = if text_mode == TextMode::EscapableRawText {
            TokenFlags::ESCAPABLE_RAW_TEXT
        } else {
            TokenFlags::RAW_TEXT
        };

        Lexed::text(at, closer_at, flags)
    }

    fn lex_markup(&self, was_at: usize) -> Lexed {
        let html = &self.html_bytes;
        let doc_length = html.len();
        if was_at >= doc_length {
            return Lexed::End;
        }

        let mut at = was_at;
        while at < doc_length {
            let Some(next_at) = memchr::memchr(b'<', &html[at..]) else {
                break;
            };
            at += next_at;

            if at > was_at {
                /*
                 * A "<" normally starts a new tag or syntax token, but in cases where the
                 * following character can't produce a valid token, the "<" is instead treated
                 * as plaintext and the parser should skip over it. This avoids a problem when
                 * following earlier practices of typing emoji with text, e.g. "<3". This
                 * should be a heart, not a tag. It's supposed to be rendered, not hidden.
                 *
                 * @see https://html.spec.whatwg.org/#tag-open-state
                 */
                if at + 1 < doc_length
                    && !matches!(html[at + 1], b'!' | b'/' | b'?' | b'a'..=b'z' | b'A'..=b'Z')
                {
                    at += 1;
                    continue;
                }

                return Lexed::text(was_at, at, TokenFlags::empty());
            }

            // A lone "<" at the end of the document could still become anything.
            if at + 1 >= doc_length {
                return Lexed::Incomplete;
            }

            let is_closing_tag = html[at + 1] == b'/';
            let name_at = at + 1 + usize::from(is_closing_tag);

            /*
             * Tag names must start with [a-zA-Z] otherwise they are not tags.
             * For example, "<3" is rendered as text, not a tag opener. If at least
             * one letter follows the "<" then _it is_ a tag, but if the following
             * character is anything else it _is not a tag_.
             *
             * @see https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state
             */
            if name_at < doc_length && html[name_at].is_ascii_alphabetic() {
                return lex_tag(html, at, name_at, is_closing_tag);
            }

            if is_closing_tag {
                // `</` at the end of the document.
                if at + 2 >= doc_length {
                    return Lexed::Incomplete;
                }

                /*
                 * </> is a missing end tag name, which is ignored.
                 *
                 * This was also known as the "presumptuous empty tag"
                 * in early discussions as it was proposed to close
                 * the nearest previous opening tag.
                 *
                 * @see https://html.spec.whatwg.org/#parse-error-missing-end-tag-name
                 */
                if html[at + 2] == b'>' {
                    return Lexed::Token {
                        token: Token {
                            kind: TokenKind::PresumptuousCloser,
                            name_span: None,
                            full_span: HtmlSpan::new(at, 3),
                            flags: TokenFlags::empty(),
                        },
                        text: None,
                    };
                }

                /*
                 * If a non-alpha starts the tag name in a tag closer it's a comment.
                 * Find the first `>`, which closes the comment.
                 *
                 * These particular comments are classified as "funky comments"
                 * which are made available for further processing.
                 *
                 * @see https://html.spec.whatwg.org/#parse-error-invalid-first-character-of-tag-name
                 */
                let Some(closer_at) = strpos(html, b">", at + 2) else {
                    return Lexed::Incomplete;
                };
                return Lexed::commentish(
                    TokenKind::FunkyComment,
                    at,
                    closer_at + 1,
                    at + 2,
                    closer_at,
                );
            }

            match html[at + 1] {
                b'!' => return self.lex_markup_declaration(at),
                b'?' => return lex_bogus_processing_instruction(html, at),

                // `<>` and the like are plaintext.
                _ => at += 1,
            }
        }

        /*
         * This does not imply an incomplete parse; it indicates that there
         * can be nothing left in the document other than a #text node.
         */
        Lexed::text(was_at, doc_length, TokenFlags::empty())
    }

    /// Scans `<!` constructs: comments, DOCTYPE, CDATA, and bogus comments.
    ///
    /// @see https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state
    fn lex_markup_declaration(&self, at: usize) -> Lexed {
        let html = &self.html_bytes;
        let doc_length = html.len();
        let declaration = &html[at + 2..];

        if declaration.starts_with(b"--") {
            let mut closer_at = at + 4;
            let span_of_dashes = strspn!(html, b'-', closer_at);
            let after_dashes = closer_at + span_of_dashes;
            if after_dashes >= doc_length {
                return Lexed::Incomplete;
            }

            // Abruptly-closed empty comments are a sequence of dashes followed by `>`.
            if html[after_dashes] == b'>' {
                return if span_of_dashes >= 2 {
                    Lexed::commentish(
                        TokenKind::Comment(CommentType::HtmlComment),
                        at,
                        after_dashes + 1,
                        at + 4,
                        after_dashes - 2,
                    )
                } else {
                    Lexed::commentish(
                        TokenKind::Comment(CommentType::AbruptlyClosedComment),
                        at,
                        after_dashes + 1,
                        at + 4,
                        at + 4,
                    )
                };
            }

            /*
             * Comments may be closed by either a --> or an invalid --!>.
             * The first occurrence closes the comment.
             *
             * @see https://html.spec.whatwg.org/#parse-error-incorrectly-closed-comment
             */
            loop {
                let Some(dashes_at) = strpos(html, b"--", closer_at) else {
                    return Lexed::Incomplete;
                };

                let closer_length = match html.get(dashes_at + 2..) {
                    Some([b'>', ..]) => Some(3),
                    Some([b'!', b'>', ..]) => Some(4),
                    _ => None,
                };

                if let Some(closer_length) = closer_length {
                    return Lexed::commentish(
                        TokenKind::Comment(CommentType::HtmlComment),
                        at,
                        dashes_at + closer_length,
                        at + 4,
                        dashes_at,
                    );
                }

                closer_at = dashes_at + 1;
            }
        }

        // `<!DOCTYPE` is ASCII-case-insensitive; its text is everything up to the nearest `>`.
        if starts_with_ignore_ascii_case(declaration, b"DOCTYPE") {
            let Some(closer_at) = strpos(html, b">", at + 9) else {
                return Lexed::Incomplete;
            };
            return Lexed::commentish(TokenKind::Doctype, at, closer_at + 1, at + 9, closer_at);
        }

        /*
         * Real CDATA sections only exist in foreign content and in XML,
         * where they end at the first `]]>`.
         */
        let is_cdata_opener = declaration.starts_with(b"[CDATA[");
        if is_cdata_opener
            && (self.is_xml() || self.context_namespace() != ParsingNamespace::Html)
        {
            let Some(closer_at) = strpos(html, b"]]>", at + 9) else {
                return Lexed::Incomplete;
            };
            return Lexed::commentish(TokenKind::CdataSection, at, closer_at + 3, at + 9, closer_at);
        }

        /*
         * Anything else here is an incorrectly-opened comment and transitions
         * to the bogus comment state - skip to the nearest >. If no closer is
         * found then the document was truncated inside the markup declaration.
         */
        let Some(closer_at) = strpos(html, b">", at + 2) else {
            return Lexed::Incomplete;
        };

        /*
         * Identify nodes that would be CDATA if HTML had CDATA sections.
         *
         * This must come after finding the bogus comment end because in
         * HTML it spans to the nearest `>`, even if there's no `]]>` as
         * would be required in an XML document. It is therefore not possible
         * to write a CDATA section containing a `>` in the HTML syntax.
         */
        if is_cdata_opener && closer_at >= at + 11 && &html[closer_at - 2..closer_at] == b"]]" {
            return Lexed::commentish(
                TokenKind::Comment(CommentType::CdataLookalike),
                at,
                closer_at + 1,
                at + 9,
                closer_at - 2,
            );
        }

        Lexed::commentish(
            TokenKind::Comment(CommentType::InvalidHtml),
            at,
            closer_at + 1,
            at + 2,
            closer_at,
        )
    }

    /// Indicates the kind of matched token, if any.
    ///
    /// This differs from `get_token_name()` in that it always
    /// returns a static string indicating the type, whereas
    /// `get_token_name()` may return values derived from the
    /// token itself, such as a tag name.
    ///
    /// Possible values:
    ///  - `#tag` when matched on a tag.
    ///  - `#text` when matched on a text node.
    ///  - `#cdata-section` when matched on a CDATA node.
    ///  - `#comment` when matched on a comment.
    ///  - `#doctype` when matched on a DOCTYPE declaration.
    ///  - `#presumptuous-closer` when matched on an empty tag closer.
    ///  - `#funky-comment` when matched on a funky comment.
    pub fn get_token_type(&self) -> Option<TokenType> {
        self.matched_token()?.kind.token_type()
    }

    /// Returns the node name of the matched token: the tag name for
    /// tags, `html` for a DOCTYPE, and the token type otherwise.
    pub fn get_token_name(&self) -> Option<NodeName> {
        let token = self.matched_token()?;
        match token.kind {
            TokenKind::TagOpen | TokenKind::TagClose => self.tag_name.clone().map(NodeName::Tag),
            TokenKind::Doctype => Some(NodeName::Doctype),
            kind => kind.token_type().map(NodeName::Token),
        }
    }

    /// Returns the name of the matched tag, or the target of a
    /// processing instruction lookalike.
    pub fn get_tag(&self) -> Option<TagName> {
        self.matched_token()?;
        self.tag_name.clone()
    }

    pub fn get_comment_type(&self) -> Option<CommentType> {
        match self.matched_token()?.kind {
            TokenKind::Comment(comment_type) => Some(comment_type),
            _ => None,
        }
    }

    /// Returns the namespace of the matched token.
    pub fn get_namespace(&self) -> ParsingNamespace {
        self.parsing_namespace
    }

    /// Indicates if the current tag token is a tag closer.
    ///
    /// Example:
    ///
    /// ```text
    /// let mut p = TagProcessor::new(b"<div></div>");
    /// p.next_tag(&TagQuery { tag_closers: VisitClosers::Visit, ..TagQuery::tag("div") });
    /// p.is_tag_closer() == false;
    ///
    /// p.next_tag(&TagQuery { tag_closers: VisitClosers::Visit, ..TagQuery::tag("div") });
    /// p.is_tag_closer() == true;
    /// ```
    pub fn is_tag_closer(&self) -> bool {
        self.matched_token()
            .is_some_and(|token| token.kind == TokenKind::TagClose)
    }

    /// Indicates if the currently matched tag contains the self-closing flag.
    ///
    /// No HTML elements ought to have the self-closing flag and for those, the self-closing
    /// flag will be ignored. For void elements this is benign because they "self close"
    /// automatically. For non-void HTML elements though problems will appear if someone
    /// intends to use a self-closing element in place of that element with an empty body.
    /// For HTML foreign elements and custom elements the self-closing flag determines if
    /// they self-close or not.
    ///
    /// This function does not determine if a tag is self-closing,
    /// but only if the self-closing flag is present in the syntax.
    pub fn has_self_closing_flag(&self) -> bool {
        self.matched_token()
            .is_some_and(|token| token.flags.contains(TokenFlags::SELF_CLOSING))
    }

    fn matched_token(&self) -> Option<&Token> {
        match self.parser_state {
            ParserState::Matched => self.token.as_ref(),
            _ => None,
        }
    }

    /// Element names from the root to the current token.
    ///
    /// For tags, the tag's own element is last, including for void
    /// elements and for closers whose element was just popped.
    ///
    /// Example:
    ///
    /// ```text
    /// <div><span><img></span></div>
    ///            ^^^^^ ["div", "span", "img"]
    /// ```
    pub fn get_breadcrumbs(&self) -> Vec<&str> {
        let mut breadcrumbs = self.stack.breadcrumbs();
        if let Some(tail) = &self.breadcrumb_tail {
            breadcrumbs.push(tail.tag_name.as_str());
        }
        breadcrumbs
    }

    pub fn get_current_depth(&self) -> usize {
        self.stack.count() + usize::from(self.breadcrumb_tail.is_some())
    }

    /// Describes what the current token allows to be read and written as text.
    pub fn modifiable_text(&self) -> Option<ModifiableText> {
        let token = self.matched_token()?;
        let span = self.text_span?;
        let is_xml = self.is_xml();

        let mut text = ModifiableText {
            span,
            decoding: TextDecoding::None,
            escaping: TextEscaping::Unsupported,
            element: None,
            token_type: token.kind.token_type()?,
            strip_nulls: false,
            skip_leading_newline: false,
            case_sensitive_names: is_xml,
        };

        if token.kind != TokenKind::Text {
            return Some(text);
        }

        text.skip_leading_newline = self.skip_newline_at == Some(span.start);

        if token
            .flags
            .intersects(TokenFlags::RAW_TEXT | TokenFlags::ESCAPABLE_RAW_TEXT)
        {
            let element = self.stack.current_node()?;
            (text.decoding, text.escaping) = match self.text_mode_of(element) {
                TextMode::ScriptData => (TextDecoding::None, TextEscaping::ScriptGuard),
                TextMode::EscapableRawText => {
                    (TextDecoding::Html, TextEscaping::ConditionalClosingTagGuard)
                }
                TextMode::RawText if !is_xml && element.tag_name == TagName::STYLE => {
                    (TextDecoding::None, TextEscaping::CssBreakoutGuard)
                }
                TextMode::RawText => (TextDecoding::None, TextEscaping::ClosingTagRejection),
                TextMode::Plaintext => (TextDecoding::None, TextEscaping::Verbatim),
                TextMode::Data => (TextDecoding::None, TextEscaping::Unsupported),
            };
            text.element = Some(element.tag_name.clone());
        } else if is_xml {
            text.decoding = TextDecoding::Xml;
            text.escaping = TextEscaping::Html;
        } else {
            text.decoding = TextDecoding::Html;
            text.escaping = TextEscaping::Html;
            text.strip_nulls = self.parsing_namespace == ParsingNamespace::Html;
        }

        Some(text)
    }

    /// Returns the modifiable text of the matched token, decoded as
    /// a reader of the document would see it.
    ///
    /// Tags, presumptuous closers and incomplete tokens have none.
    /// After a successful `set_modifiable_text()` this returns the
    /// new text.
    ///
    /// Example:
    ///
    /// ```text
    /// <p>Fish &amp; Chips</p>
    ///    ^^^^^^^^^^^^^^^^ "Fish & Chips"
    /// ```
    pub fn get_modifiable_text(&self) -> Option<String> {
        let text = self.modifiable_text()?;
        if let Some(updated_text) = &self.updated_text {
            return Some(updated_text.to_string());
        }

        Some(text.read(&self.html_bytes))
    }

    /// Replaces the modifiable text of the matched token.
    ///
    /// @return bool Whether the text was replaced.
    pub fn set_modifiable_text(&mut self, updated_text: &str) -> bool {
        self.try_set_modifiable_text(updated_text).is_ok()
    }

    /// Replaces the modifiable text of the matched token, escaping it
    /// for the context it's found in, or reports why it can't be.
    ///
    /// A refused update leaves the document untouched.
    pub fn try_set_modifiable_text(&mut self, updated_text: &str) -> Result<(), TextUpdateError> {
        let result = self.update_modifiable_text(updated_text);
        if let Err(error) = &result {
            log::debug!(
                target: "markup_api::modifiable_text",
                "refused text update at {}: {}",
                self.bytes_already_parsed,
                error
            );
        }
        result
    }

    fn update_modifiable_text(&mut self, updated_text: &str) -> Result<(), TextUpdateError> {
        if self.parser_state != ParserState::Matched {
            return Err(TextUpdateError::NoToken);
        }

        let text = self
            .modifiable_text()
            .ok_or(TextUpdateError::NoModifiableText)?;
        let escaped = text.escape(updated_text)?;

        self.lexical_updates
            .apply(self.html_bytes.len(), text.span, &escaped)?;
        self.updated_text = Some(updated_text.into());
        Ok(())
    }

    /// Attributes of the matched tag opener, in document order.
    fn attributes(&self) -> Option<&[AttributeToken]> {
        let token = self.matched_token()?;
        if token.kind != TokenKind::TagOpen || self.is_closing_tag {
            return None;
        }
        let name_span = token.name_span?;

        let attributes = self.attributes.get_or_init(|| {
            let mut attributes = Vec::new();
            scan_attributes(&self.html_bytes, name_span.end(), |attribute| {
                attributes.push(attribute)
            });
            attributes
        });

        Some(attributes.as_slice())
    }

    fn attribute_name_matches(&self, attribute: &AttributeToken, name: &str) -> bool {
        let attribute_name = &self.html_bytes[attribute.name.range()];
        if self.is_xml() {
            attribute_name == name.as_bytes()
        } else {
            attribute_name.eq_ignore_ascii_case(name.as_bytes())
        }
    }

    /// Returns the location of the named attribute on the matched tag.
    ///
    /// When an attribute appears more than once, the first one wins.
    pub fn get_attribute_token(&self, name: &str) -> Option<AttributeToken> {
        self.attributes()?
            .iter()
            .find(|attribute| self.attribute_name_matches(attribute, name))
            .copied()
    }

    /// Returns the value of a requested attribute from a matched tag opener if that attribute exists.
    ///
    /// Example:
    ///
    /// ```text
    /// let mut p = TagProcessor::new(b"<div enabled class=\"test\" data-test-id=\"14\">Test</div>");
    /// p.next_tag(&TagQuery::class("test")) == true;
    /// p.get_attribute("data-test-id") == Some(AttributeValue::String("14".into()));
    /// p.get_attribute("enabled") == Some(AttributeValue::BooleanTrue);
    /// p.get_attribute("aria-label") == Some(AttributeValue::BooleanFalse);
    ///
    /// p.next_tag(&TagQuery::default()) == false;
    /// p.get_attribute("class") == None;
    /// ```
    pub fn get_attribute(&self, name: &str) -> Option<AttributeValue> {
        let Some(attribute) = self.get_attribute_token(name) else {
            return self.attributes().map(|_| AttributeValue::BooleanFalse);
        };

        if attribute.is_true {
            return Some(AttributeValue::BooleanTrue);
        }

        let raw_value = &self.html_bytes[attribute.value.range()];
        let decoded = if self.is_xml() {
            decode_xml(raw_value)
        } else {
            decode(&HtmlContext::Attribute, raw_value)
        };

        Some(AttributeValue::String(Rc::from(
            String::from_utf8_lossy(&decoded).as_ref(),
        )))
    }

    /// Gets names of all attributes matching a given prefix in the current tag.
    ///
    /// HTML names are lowercased and matched ASCII case-insensitively:
    ///
    /// > There must never be two or more attributes on
    /// > the same start tag whose names are an ASCII
    /// > case-insensitive match for each other.
    ///     - HTML 5 spec
    ///
    /// Example:
    ///
    /// ```text
    /// <div data-ENABLED class="test" DATA-test-id="14">Test</div>
    /// get_attribute_names_with_prefix("data-") == Some(vec!["data-enabled", "data-test-id"]);
    /// ```
    pub fn get_attribute_names_with_prefix(&self, prefix: &str) -> Option<Vec<Rc<str>>> {
        let attributes = self.attributes()?;
        let is_xml = self.is_xml();
        let mut names: Vec<Rc<str>> = Vec::new();

        for attribute in attributes {
            let raw_name = String::from_utf8_lossy(&self.html_bytes[attribute.name.range()]);
            let name = if is_xml {
                raw_name.into_owned()
            } else {
                raw_name.to_ascii_lowercase()
            };

            let has_prefix = if is_xml {
                name.starts_with(prefix)
            } else {
                starts_with_ignore_ascii_case(name.as_bytes(), prefix.as_bytes())
            };

            if has_prefix && !names.iter().any(|seen| **seen == *name) {
                names.push(name.into());
            }
        }

        Some(names)
    }

    /// Returns if a matched tag contains the given class name.
    ///
    /// Class names are compared byte-for-byte, as in a no-quirks document.
    ///
    /// @return Whether the matched tag contains the given class name, or `None` if not matched.
    pub fn has_class(&self, wanted_class: &str) -> Option<bool> {
        let class = self.get_attribute("class")?;
        let Some(class) = class.as_str() else {
            return Some(false);
        };

        Some(
            class
                .split(|c: char| c.is_ascii() && is_html_whitespace(c as u8))
                .any(|class_name| class_name == wanted_class),
        )
    }

    /// Returns the updated document.
    ///
    /// This may be called at any point and as often as wanted;
    /// it never changes the processor or the pending edits.
    pub fn get_updated_html(&self) -> String {
        String::from_utf8_lossy(&self.get_updated_bytes()).into_owned()
    }

    pub fn get_updated_bytes(&self) -> Box<[u8]> {
        self.lexical_updates
            .serialize(&self.html_bytes)
            .into_boxed_slice()
    }
}

/// Scans a tag opener or closer whose name starts at `name_at`.
fn lex_tag(html: &[u8], at: usize, name_at: usize, is_closing_tag: bool) -> Lexed {
    let name_length = strcspn!(
        html,
        b' ' | b'\t' | 0x0c | b'\r' | b'\n' | b'/' | b'>',
        name_at
    );

    let Some(closer_at) = scan_attributes(html, name_at + name_length, |_| {}) else {
        return Lexed::Incomplete;
    };

    let mut flags = TokenFlags::empty();

    /*
     * The self-closing flag is the solidus at the _end_ of the tag, not the beginning.
     *
     * Example:
     *
     *     <figure />
     *             ^ this appears one character before the end of the closing ">".
     */
    if !is_closing_tag && html[closer_at - 1] == b'/' {
        flags |= TokenFlags::SELF_CLOSING;
    }

    Lexed::Token {
        token: Token {
            kind: if is_closing_tag {
                TokenKind::TagClose
            } else {
                TokenKind::TagOpen
            },
            name_span: Some(HtmlSpan::new(name_at, name_length)),
            full_span: HtmlSpan::new(at, closer_at + 1 - at),
            flags,
        },
        text: None,
    }
}

/// Scans `<?` up to the nearest `>` as a bogus comment.
///
/// Where the comment ends in `?` and starts with an XML name it looks like
/// a Processing Instruction node were HTML to have them, and the name is
/// reported as its target.
///
/// This must find the bogus comment end first because in HTML it spans
/// to the nearest `>`, even if there's no `?>` as would be required in an
/// XML document. It is therefore not possible to write a Processing
/// Instruction containing a `>` in the HTML syntax.
///
/// Only ASCII target names are recognized. Some Processing Instruction
/// lookalikes are then reported as plain bogus comments, but the document
/// structure is never misread, and no UTF-8 decoding is needed.
///
/// > NameStartChar ::= ":" | [A-Z] | "_" | [a-z] | [#xC0-#xD6] | ...
/// > NameChar      ::= NameStartChar | "-" | "." | [0-9] | #xB7 | ...
///
/// @see https://www.w3.org/TR/2006/REC-xml11-20060816/#NT-PITarget
fn lex_bogus_processing_instruction(html: &[u8], at: usize) -> Lexed {
    let Some(closer_at) = strpos(html, b">", at + 2) else {
        return Lexed::Incomplete;
    };

    if closer_at + 1 - at >= 5 && html[closer_at - 1] == b'?' {
        let body = &html[at + 2..closer_at - 1];
        let mut target_length = strspn!(body, b'a'..=b'z' | b'A'..=b'Z' | b':' | b'_', 0);

        if target_length > 0 {
            target_length += strspn!(
                body,
                b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b':' | b'_' | b'-' | b'.',
                target_length
            );

            let text_starts_at = at + 2 + target_length;
            return Lexed::Token {
                token: Token {
                    kind: TokenKind::Comment(CommentType::PiNodeLookalike),
                    name_span: Some(HtmlSpan::new(at + 2, target_length)),
                    full_span: HtmlSpan::new(at, closer_at + 1 - at),
                    flags: TokenFlags::empty(),
                },
                text: Some(HtmlSpan::new(
                    text_starts_at,
                    closer_at - 1 - text_starts_at,
                )),
            };
        }
    }

    Lexed::commentish(
        TokenKind::Comment(CommentType::InvalidHtml),
        at,
        closer_at + 1,
        at + 2,
        closer_at,
    )
}

/// Finds where the closing tag of a RAWTEXT or RCDATA element starts.
///
/// The closing tag must be complete: `None` means the document ends
/// before the element does.
///
/// @see https://html.spec.whatwg.org/multipage/parsing.html#rcdata-state
/// @see https://html.spec.whatwg.org/#generic-raw-text-element-parsing-algorithm
fn find_closing_tag(
    html: &[u8],
    mut at: usize,
    tag_name: &[u8],
    case_sensitive: bool,
) -> Option<usize> {
    let mut closer = Vec::with_capacity(tag_name.len() + 2);
    closer.extend_from_slice(b"</");
    closer.extend_from_slice(tag_name);

    loop {
        let candidate_at = if case_sensitive {
            strpos(html, &closer, at)
        } else {
            stripos(html, &closer, at)
        }?;

        /*
         * Ensure that the tag name terminates to avoid matching on
         * substrings of a longer tag name. For example, the sequence
         * "</textarearug" should not match for "</textarea" even
         * though "textarea" is found within the text.
         */
        let name_ends_at = candidate_at + closer.len();
        if !is_tag_name_terminator(*html.get(name_ends_at)?) {
            at = candidate_at + 1;
            continue;
        }

        scan_attributes(html, name_ends_at, |_| {})?;
        return Some(candidate_at);
    }
}

/// Finds where the closing tag of a SCRIPT element starts.
///
/// `<!--` and `<script` move the tokenizer into the escaped and
/// double-escaped states, in which a `</script>` doesn't end the element.
///
/// @see https://html.spec.whatwg.org/#script-data-state
fn find_script_closer(html: &[u8], mut at: usize) -> Option<usize> {
    let mut state = ScriptState::Unescaped;
    let doc_length = html.len();

    while at < doc_length {
        at += strcspn!(html, b'-' | b'<', at);

        /*
         * For all script states a "-->" transitions
         * back into the normal unescaped script mode,
         * even if that's the current state.
         */
        if html[at..].starts_with(b"-->") {
            at += 3;
            state = ScriptState::Unescaped;
            continue;
        }

        if at + 1 >= doc_length {
            return None;
        }

        /*
         * Everything of interest past here starts with "<".
         * Check this character and advance position regardless.
         */
        at += 1;
        if html[at - 1] != b'<' {
            continue;
        }

        /*
         * Unlike with "-->", the "<!--" only transitions
         * into the escaped mode if not already there.
         *
         * Inside the escaped modes it will be ignored; and
         * should never break out of the double-escaped
         * mode and back into the escaped mode.
         */
        if html[at..].starts_with(b"!--") {
            at += 3;
            if state == ScriptState::Unescaped {
                state = ScriptState::Escaped;
            }
            continue;
        }

        let tag_starts_at = at - 1;
        let is_closing = html[at] == b'/';
        if is_closing {
            at += 1;
        }

        /*
         * At this point the only remaining state-changes occur with the
         * <script> and </script> tags; unless one of these appears next,
         * proceed scanning to the next potential token in the text.
         *
         * The name must be followed by something which ends a tag name
         * so that "<script123" doesn't count.
         */
        if !(at + 6 < doc_length
            && starts_with_ignore_ascii_case(&html[at..], b"script")
            && is_tag_name_terminator(html[at + 6]))
        {
            continue;
        }
        at += 6;

        match (state, is_closing) {
            (ScriptState::Escaped, false) => state = ScriptState::DoubleEscaped,
            (ScriptState::DoubleEscaped, true) => state = ScriptState::Escaped,
            (_, true) => {
                scan_attributes(html, at, |_| {})?;
                return Some(tag_starts_at);
            }
            (_, false) => {}
        }
    }

    None
}
