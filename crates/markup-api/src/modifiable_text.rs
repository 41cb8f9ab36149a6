//! Reading and replacing the text a token carries.
//!
//! Which text a token exposes, how it reads, and what may be written back
//! all depend on the token and the element enclosing it. A text token
//! inside `<style>` is CSS and must not be HTML-escaped, while the same
//! bytes inside `<p>` must be. The descriptor built for each token
//! captures those decisions so that reading and writing agree.

use crate::{
    errors::TextUpdateError,
    span::HtmlSpan,
    str_fns::{is_tag_name_terminator, starts_with_ignore_ascii_case, stripos},
    tag_name::TagName,
    token::TokenType,
};
use entities::{decode, decode_xml, HtmlContext, UNICODE_REPLACEMENT_CHAR};

/// How modifiable text is decoded when read.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TextDecoding {
    /// The bytes as written.
    None,

    /// HTML character references are decoded.
    Html,

    /// XML character references are decoded.
    Xml,
}

/// How replacement text is made safe before it's written.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TextEscaping {
    /// The text cannot be replaced.
    Unsupported,

    /// `&`, `<` and `>` become character references.
    Html,

    /// Every `</style` has its `</` rewritten as the CSS escapes `\3c\2f`.
    CssBreakoutGuard,

    /// Only a `<` starting the element's own closing tag is encoded.
    ConditionalClosingTagGuard,

    /// Verbatim, unless it would leave or re-enter the script data states.
    ScriptGuard,

    /// Verbatim, unless it contains the element's closing tag.
    ClosingTagRejection,

    /// Verbatim, nothing can end the text.
    Verbatim,
}

/// What the current token allows to be read and written as its text.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ModifiableText {
    /// Bytes of the original document holding the text.
    pub span: HtmlSpan,

    pub decoding: TextDecoding,

    pub escaping: TextEscaping,

    /// Element whose content this is, when the element decides the rules.
    pub element: Option<TagName>,

    /// Kind of the token carrying the text.
    pub token_type: TokenType,

    /// NUL bytes are dropped on read instead of replaced with U+FFFD.
    pub strip_nulls: bool,

    /// A leading newline is ignored, as directly after `<pre>`.
    pub skip_leading_newline: bool,

    /// Closing tags inside the text are matched exactly rather than
    /// ASCII case-insensitively.
    pub case_sensitive_names: bool,
}

impl ModifiableText {
    pub fn is_writable(&self) -> bool {
        self.escaping != TextEscaping::Unsupported
    }

    /// Text as a reader of the document would see it.
    pub fn read(&self, html: &[u8]) -> String {
        let mut raw = &html[self.span.range()];
        if self.skip_leading_newline && raw.first() == Some(&b'\n') {
            raw = &raw[1..];
        }

        let raw = self.replace_nulls(raw);
        let decoded = match self.decoding {
            TextDecoding::None => raw.into_boxed_slice(),
            TextDecoding::Html => decode(&HtmlContext::BodyText, &raw),
            TextDecoding::Xml => decode_xml(&raw),
        };

        String::from_utf8_lossy(&decoded).into_owned()
    }

    /// Bytes to store in place of the text so it reads back as `text`.
    pub fn escape(&self, text: &str) -> Result<Vec<u8>, TextUpdateError> {
        let element = self.element.as_ref().map(TagName::as_str).unwrap_or("");

        let mut escaped = match self.escaping {
            TextEscaping::Unsupported => {
                return Err(TextUpdateError::ReadOnly(self.token_type.as_str()))
            }

            TextEscaping::Html => escape_html_text(text),

            TextEscaping::CssBreakoutGuard => escape_style_closers(text),

            TextEscaping::ConditionalClosingTagGuard => escape_own_closer(text, element),

            TextEscaping::ScriptGuard => {
                if is_unsafe_script_text(text) {
                    return Err(TextUpdateError::UnsafeScriptContent);
                }
                text.as_bytes().to_vec()
            }

            TextEscaping::ClosingTagRejection => {
                if contains_closing_tag(text.as_bytes(), element, self.case_sensitive_names) {
                    return Err(TextUpdateError::WouldCloseElement(element.into()));
                }
                text.as_bytes().to_vec()
            }

            TextEscaping::Verbatim => text.as_bytes().to_vec(),
        };

        /*
         * The first newline would be swallowed when reading
         * the text back, so protect the one the caller wants.
         */
        if self.skip_leading_newline && escaped.first() == Some(&b'\n') {
            escaped.insert(0, b'\n');
        }

        Ok(escaped)
    }

    fn replace_nulls(&self, raw: &[u8]) -> Vec<u8> {
        if memchr::memchr(0, raw).is_none() {
            return raw.to_vec();
        }

        let mut replaced = Vec::with_capacity(raw.len() + 2);
        for &b in raw {
            match b {
                0 if self.strip_nulls => {}
                0 => replaced.extend_from_slice(UNICODE_REPLACEMENT_CHAR),
                b => replaced.push(b),
            }
        }
        replaced
    }
}

/// Encodes the three characters which could start markup or a reference.
pub fn escape_html_text(text: &str) -> Vec<u8> {
    let mut escaped = Vec::with_capacity(text.len());
    for &b in text.as_bytes() {
        match b {
            b'&' => escaped.extend_from_slice(b"&amp;"),
            b'<' => escaped.extend_from_slice(b"&lt;"),
            b'>' => escaped.extend_from_slice(b"&gt;"),
            b => escaped.push(b),
        }
    }
    escaped
}

/// Neutralizes anything which could close a STYLE element.
///
/// CSS can't contain a literal `</style` without ending the element, but
/// CSS escapes read the same to the stylesheet: `\3c\2fstyle` is still
/// `</style` inside a string or comment.
pub fn escape_style_closers(text: &str) -> Vec<u8> {
    let bytes = text.as_bytes();
    let mut escaped = Vec::with_capacity(bytes.len());
    let mut was_at = 0;

    while let Some(at) = stripos(bytes, b"</style", was_at) {
        escaped.extend_from_slice(&bytes[was_at..at]);
        escaped.extend_from_slice(b"\\3c\\2f");
        was_at = at + 2;
    }

    escaped.extend_from_slice(&bytes[was_at..]);
    escaped
}

/// Encodes the `<` of any closing tag for `element`, leaving all else alone.
pub fn escape_own_closer(text: &str, element: &str) -> Vec<u8> {
    let bytes = text.as_bytes();
    let mut escaped = Vec::with_capacity(bytes.len());
    let mut was_at = 0;
    let mut at = 0;

    while let Some(pos) = memchr::memchr(b'<', &bytes[at..]) {
        at += pos;
        if is_closing_tag_at(bytes, at, element.as_bytes(), false) {
            escaped.extend_from_slice(&bytes[was_at..at]);
            escaped.extend_from_slice(b"&lt;");
            was_at = at + 1;
        }
        at += 1;
    }

    escaped.extend_from_slice(&bytes[was_at..]);
    escaped
}

/// Whether a closing tag for `element` starts at `at`.
///
/// The name must be followed by the end of the text or a byte which
/// would end a tag name; `</stylesheet` doesn't close STYLE.
fn is_closing_tag_at(bytes: &[u8], at: usize, element: &[u8], case_sensitive: bool) -> bool {
    let Some(rest) = bytes.get(at..) else {
        return false;
    };
    if !rest.starts_with(b"</") {
        return false;
    }

    let name = &rest[2..];
    let name_matches = if case_sensitive {
        name.starts_with(element)
    } else {
        starts_with_ignore_ascii_case(name, element)
    };

    name_matches
        && name
            .get(element.len())
            .map_or(true, |&b| is_tag_name_terminator(b))
}

fn contains_closing_tag(bytes: &[u8], element: &str, case_sensitive: bool) -> bool {
    memchr::memchr_iter(b'<', bytes)
        .any(|at| is_closing_tag_at(bytes, at, element.as_bytes(), case_sensitive))
}

/// Whether the text would change the script data state it lives in.
///
/// Once inside a SCRIPT element, `<!--` and `<script` push the tokenizer
/// into the escaped states, which change where the element ends; a
/// `</script` ends it outright. None of these can be escaped in a way the
/// script would read the same, so text containing them is refused.
pub fn is_unsafe_script_text(text: &str) -> bool {
    let bytes = text.as_bytes();
    memchr::memchr_iter(b'<', bytes).any(|at| {
        let rest = &bytes[at + 1..];
        if rest.starts_with(b"!--") {
            return true;
        }

        let name = rest.strip_prefix(b"/").unwrap_or(rest);
        starts_with_ignore_ascii_case(name, b"script")
            && name.get(6).map_or(true, |&b| is_tag_name_terminator(b))
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text_descriptor(html: &str, escaping: TextEscaping, element: Option<TagName>) -> ModifiableText {
        ModifiableText {
            span: HtmlSpan::new(0, html.len()),
            decoding: TextDecoding::Html,
            escaping,
            element,
            token_type: TokenType::Text,
            strip_nulls: true,
            skip_leading_newline: false,
            case_sensitive_names: false,
        }
    }

    fn escaped(descriptor: &ModifiableText, text: &str) -> String {
        String::from_utf8(descriptor.escape(text).unwrap()).unwrap()
    }

    #[test]
    fn html_text_is_escaped() {
        assert_eq!(
            escape_html_text("<birds> & <dogs>"),
            b"&lt;birds&gt; &amp; &lt;dogs&gt;"
        );
    }

    #[test]
    fn style_closers_become_css_escapes() {
        assert_eq!(
            escape_style_closers(r#"p::before { content: "<img> & </style>"; }"#),
            br#"p::before { content: "<img> & \3c\2fstyle>"; }"#
        );
        assert_eq!(escape_style_closers("</STYLE</stylesheet"), br"\3c\2fSTYLE\3c\2fstylesheet");
    }

    #[test]
    fn only_own_closer_is_escaped_in_escapable_raw_text() {
        assert_eq!(escape_own_closer("so it <doesn't>", "textarea"), b"so it <doesn't>");
        assert_eq!(
            escape_own_closer("but it does for </textarea>", "textarea"),
            b"but it does for &lt;/textarea>"
        );
        assert_eq!(
            escape_own_closer("</TITLE not an=\"attribute\">", "title"),
            b"&lt;/TITLE not an=\"attribute\">"
        );
        assert_eq!(escape_own_closer("</titles>", "title"), b"</titles>");
        assert_eq!(escape_own_closer("ends with </title", "title"), b"ends with &lt;/title");
    }

    #[test]
    fn script_breakouts_are_detected() {
        assert!(!is_unsafe_script_text(r#"const img = "<img> & <br>";"#));
        assert!(!is_unsafe_script_text("if (a<script_count) {}"));
        assert!(is_unsafe_script_text("<!-- hidden"));
        assert!(is_unsafe_script_text("x = '</script>'"));
        assert!(is_unsafe_script_text("x = '<SCRIPT src=a>'"));
        assert!(is_unsafe_script_text("ends with </script"));
    }

    #[test]
    fn raw_text_rejects_its_closer() {
        let iframe = text_descriptor("", TextEscaping::ClosingTagRejection, Some(TagName::IFRAME));
        assert_eq!(escaped(&iframe, "<p>fine</p>"), "<p>fine</p>");
        assert_eq!(
            iframe.escape("nope </iframe>"),
            Err(TextUpdateError::WouldCloseElement("iframe".into()))
        );

        let mut pcdata = text_descriptor("", TextEscaping::ClosingTagRejection, Some(TagName::from_xml(b"span")));
        pcdata.case_sensitive_names = true;
        assert!(pcdata.escape("</SPAN>").is_ok());
        assert!(pcdata.escape("</span>").is_err());
    }

    #[test]
    fn comments_are_read_only() {
        let mut comment = text_descriptor("", TextEscaping::Unsupported, None);
        comment.token_type = TokenType::Comment;
        assert_eq!(comment.escape("x"), Err(TextUpdateError::ReadOnly("#comment")));
    }

    #[test]
    fn reading_decodes_and_handles_nulls() {
        let html = "a&amp;b\0c";
        let mut descriptor = text_descriptor(html, TextEscaping::Html, None);
        assert_eq!(descriptor.read(html.as_bytes()), "a&bc");

        descriptor.strip_nulls = false;
        descriptor.decoding = TextDecoding::None;
        assert_eq!(descriptor.read(html.as_bytes()), "a&amp;b\u{FFFD}c");
    }

    #[test]
    fn leading_newline_survives_a_round_trip() {
        let html = "\nline";
        let mut descriptor = text_descriptor(html, TextEscaping::Html, Some(TagName::PRE));
        descriptor.skip_leading_newline = true;
        assert_eq!(descriptor.read(html.as_bytes()), "line");
        assert_eq!(escaped(&descriptor, "\nnew"), "\n\nnew");
        assert_eq!(escaped(&descriptor, "new"), "new");
    }
}
