#![allow(non_camel_case_types, clippy::upper_case_acronyms)]

use std::fmt;

/// Name of an element as seen by the tokenizer.
///
/// Only the elements whose names change how the tokenizer or the stack of
/// open elements behaves get their own variant; everything else is kept
/// verbatim in `Arbitrary`. HTML names are ASCII-lowercased on the way in,
/// XML names are kept exactly as written.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum TagName {
    // Elements whose contents are not parsed as markup.
    IFRAME,
    NOEMBED,
    NOFRAMES,
    PLAINTEXT,
    SCRIPT,
    STYLE,
    TEXTAREA,
    TITLE,
    XMP,

    // Elements which drop a leading newline from their contents.
    LISTING,
    PRE,

    // Void elements.
    AREA,
    BASE,
    BASEFONT,
    BGSOUND,
    BR,
    COL,
    EMBED,
    FRAME,
    HR,
    IMG,
    INPUT,
    KEYGEN,
    LINK,
    META,
    PARAM,
    SOURCE,
    TRACK,
    WBR,

    // Foreign content and its HTML integration points.
    MATH,
    SVG,
    DESC,
    FOREIGNOBJECT,
    MI,
    MN,
    MO,
    MS,
    MTEXT,

    Arbitrary(Box<str>),
}

/// How the contents of an element are tokenized.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TextMode {
    /// Normal markup.
    Data,

    /// Opaque text until the closing tag, no character references.
    RawText,

    /// Like `RawText` but following the SCRIPT escaping states.
    ScriptData,

    /// Opaque text until the closing tag, character references decoded on read.
    EscapableRawText,

    /// Everything until the end of the document is text.
    Plaintext,
}

impl TagName {
    /// Creates an HTML tag name; matching is ASCII case-insensitive.
    pub fn from_html(name: &[u8]) -> Self {
        let lower = name.to_ascii_lowercase();
        match lower.as_slice() {
            b"iframe" => Self::IFRAME,
            b"noembed" => Self::NOEMBED,
            b"noframes" => Self::NOFRAMES,
            b"plaintext" => Self::PLAINTEXT,
            b"script" => Self::SCRIPT,
            b"style" => Self::STYLE,
            b"textarea" => Self::TEXTAREA,
            b"title" => Self::TITLE,
            b"xmp" => Self::XMP,
            b"listing" => Self::LISTING,
            b"pre" => Self::PRE,
            b"area" => Self::AREA,
            b"base" => Self::BASE,
            b"basefont" => Self::BASEFONT,
            b"bgsound" => Self::BGSOUND,
            b"br" => Self::BR,
            b"col" => Self::COL,
            b"embed" => Self::EMBED,
            b"frame" => Self::FRAME,
            b"hr" => Self::HR,
            b"img" => Self::IMG,
            b"input" => Self::INPUT,
            b"keygen" => Self::KEYGEN,
            b"link" => Self::LINK,
            b"meta" => Self::META,
            b"param" => Self::PARAM,
            b"source" => Self::SOURCE,
            b"track" => Self::TRACK,
            b"wbr" => Self::WBR,
            b"math" => Self::MATH,
            b"svg" => Self::SVG,
            b"desc" => Self::DESC,
            b"foreignobject" => Self::FOREIGNOBJECT,
            b"mi" => Self::MI,
            b"mn" => Self::MN,
            b"mo" => Self::MO,
            b"ms" => Self::MS,
            b"mtext" => Self::MTEXT,
            _ => Self::Arbitrary(String::from_utf8_lossy(&lower).into()),
        }
    }

    /// Creates an XML tag name; matching is exact.
    pub fn from_xml(name: &[u8]) -> Self {
        Self::Arbitrary(String::from_utf8_lossy(name).into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::IFRAME => "iframe",
            Self::NOEMBED => "noembed",
            Self::NOFRAMES => "noframes",
            Self::PLAINTEXT => "plaintext",
            Self::SCRIPT => "script",
            Self::STYLE => "style",
            Self::TEXTAREA => "textarea",
            Self::TITLE => "title",
            Self::XMP => "xmp",
            Self::LISTING => "listing",
            Self::PRE => "pre",
            Self::AREA => "area",
            Self::BASE => "base",
            Self::BASEFONT => "basefont",
            Self::BGSOUND => "bgsound",
            Self::BR => "br",
            Self::COL => "col",
            Self::EMBED => "embed",
            Self::FRAME => "frame",
            Self::HR => "hr",
            Self::IMG => "img",
            Self::INPUT => "input",
            Self::KEYGEN => "keygen",
            Self::LINK => "link",
            Self::META => "meta",
            Self::PARAM => "param",
            Self::SOURCE => "source",
            Self::TRACK => "track",
            Self::WBR => "wbr",
            Self::MATH => "math",
            Self::SVG => "svg",
            Self::DESC => "desc",
            Self::FOREIGNOBJECT => "foreignobject",
            Self::MI => "mi",
            Self::MN => "mn",
            Self::MO => "mo",
            Self::MS => "ms",
            Self::MTEXT => "mtext",
            Self::Arbitrary(name) => name,
        }
    }

    /// Content model of this element when found in the HTML namespace.
    ///
    /// NOSCRIPT is absent on purpose: the tokenizer runs with scripting
    /// disabled, so its contents are normal markup.
    pub fn text_mode(&self) -> TextMode {
        match self {
            Self::SCRIPT => TextMode::ScriptData,
            Self::TEXTAREA | Self::TITLE => TextMode::EscapableRawText,
            Self::IFRAME | Self::NOEMBED | Self::NOFRAMES | Self::STYLE | Self::XMP => {
                TextMode::RawText
            }
            Self::PLAINTEXT => TextMode::Plaintext,
            _ => TextMode::Data,
        }
    }

    /// Whether this is an HTML void element.
    ///
    /// @see https://html.spec.whatwg.org/#void-elements
    pub fn is_void(&self) -> bool {
        matches!(
            self,
            Self::AREA
                | Self::BASE
                | Self::BASEFONT // Obsolete but still treated as void.
                | Self::BGSOUND // Obsolete but still treated as void.
                | Self::BR
                | Self::COL
                | Self::EMBED
                | Self::FRAME
                | Self::HR
                | Self::IMG
                | Self::INPUT
                | Self::KEYGEN // Obsolete but still treated as void.
                | Self::LINK
                | Self::META
                | Self::PARAM // Obsolete but still treated as void.
                | Self::SOURCE
                | Self::TRACK
                | Self::WBR
        )
    }

    /// Whether the first newline inside this element is ignored.
    pub fn ignores_leading_newline(&self) -> bool {
        matches!(self, Self::LISTING | Self::PRE | Self::TEXTAREA)
    }
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<str> for TagName {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for TagName {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}
