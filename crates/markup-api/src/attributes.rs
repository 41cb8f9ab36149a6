use crate::{span::HtmlSpan, str_fns::strpos};
use std::rc::Rc;

/// How an attribute value was written.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum QuoteStyle {
    /// `name="value"`
    Double,

    /// `name='value'`
    Single,

    /// `name=value`
    Unquoted,

    /// `name`, a boolean attribute without any value.
    None,
}

/// Location of one attribute inside a tag opener.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct AttributeToken {
    pub name: HtmlSpan,

    /// Raw, still-encoded value; empty for boolean attributes.
    pub value: HtmlSpan,

    pub quote_style: QuoteStyle,

    /// Text spanning the attribute inside a tag.
    ///
    /// This span starts at the first character of the attribute name
    /// and it ends after one of three cases:
    ///
    ///  - at the end of the attribute name for boolean attributes.
    ///  - at the end of the value for unquoted attributes.
    ///  - at the final single or double quote for quoted attributes.
    ///
    /// Example:
    ///
    /// ```text
    /// <div class="post">
    ///      ------------ length is 12, including quotes
    ///
    /// <input type="checked" checked id="selector">
    ///                       ------- length is 7
    ///
    /// <a rel=noopener>
    ///    ------------ length is 12
    /// ```
    ///
    pub span: HtmlSpan,

    /// Whether the attribute is a boolean attribute with value `true`.
    pub is_true: bool,
}

#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub enum AttributeValue {
    /// The attribute isn't present on the tag.
    #[default]
    BooleanFalse,

    /// The attribute is present without a value.
    BooleanTrue,

    /// Decoded attribute value.
    String(Rc<str>),
}

impl AttributeValue {
    /// The value as a string; `None` for boolean attributes.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(value) => Some(value),
            _ => None,
        }
    }
}

/// Walks the attribute syntax of a tag, starting right after its name.
///
/// Each attribute found is passed to `on_attribute` in document order,
/// duplicates included. Returns the offset of the `>` that closes the tag,
/// or `None` when the document ends before the tag does.
///
/// Quoted values may contain `>`, which is why the closing `>` of a tag
/// can only be found by walking its attributes.
pub(crate) fn scan_attributes(
    html: &[u8],
    mut at: usize,
    mut on_attribute: impl FnMut(AttributeToken),
) -> Option<usize> {
    let doc_length = html.len();

    loop {
        // Skip whitespace and slashes.
        at += strspn!(html, b' ' | b'\t' | 0x0c | b'\r' | b'\n' | b'/', at);
        if at >= doc_length {
            return None;
        }

        if html[at] == b'>' {
            return Some(at);
        }

        /*
         * Treat the equal sign as a part of the attribute
         * name if it is the first encountered byte.
         *
         * @see https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state
         */
        let start_shift = usize::from(html[at] == b'=');
        let name_length = start_shift
            + strcspn!(
                html,
                b'=' | b'/' | b'>' | b' ' | b'\t' | 0x0c | b'\r' | b'\n',
                at + start_shift
            );

        let attribute_start = at;
        let name = HtmlSpan::new(attribute_start, name_length);
        at += name_length;
        at += strspn!(html, b' ' | b'\t' | 0x0c | b'\r' | b'\n', at);
        if at >= doc_length {
            return None;
        }

        if html[at] != b'=' {
            on_attribute(AttributeToken {
                name,
                value: HtmlSpan::new(name.end(), 0),
                quote_style: QuoteStyle::None,
                span: name,
                is_true: true,
            });
            continue;
        }

        at += 1;
        at += strspn!(html, b' ' | b'\t' | 0x0c | b'\r' | b'\n', at);
        if at >= doc_length {
            return None;
        }

        let (value, quote_style) = match html[at] {
            quote @ (b'\'' | b'"') => {
                let value_start = at + 1;
                let end_quote_at = strpos(html, &[quote], value_start)?;
                at = end_quote_at + 1;
                let quote_style = if quote == b'"' {
                    QuoteStyle::Double
                } else {
                    QuoteStyle::Single
                };
                (
                    HtmlSpan::new(value_start, end_quote_at - value_start),
                    quote_style,
                )
            }

            _ => {
                let value_length =
                    strcspn!(html, b'>' | b' ' | b'\t' | 0x0c | b'\r' | b'\n', at);
                let value = HtmlSpan::new(at, value_length);
                at += value_length;
                (value, QuoteStyle::Unquoted)
            }
        };

        on_attribute(AttributeToken {
            name,
            value,
            quote_style,
            span: HtmlSpan::new(attribute_start, at - attribute_start),
            is_true: false,
        });
    }
}
