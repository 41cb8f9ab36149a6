//! Character reference decoding for HTML and the restricted XML dialect.
//!
//! Both decoders are pure functions over byte slices. They never fail:
//! anything that isn't a recognizable character reference is passed
//! through untouched.

pub mod xml;

pub use xml::{decode_xml, decode_xml_ref};

/// U+FFFD REPLACEMENT CHARACTER
pub const UNICODE_REPLACEMENT_CHAR: &[u8] = b"\xEF\xBF\xBD";

gen_entities::entities_lookup!("data/entities.json");

/// Where the text being decoded was found.
///
/// Attribute values follow an extra rule for ambiguous ampersands:
/// a named reference without its trailing semicolon is left alone
/// when the next byte is alphanumeric or `=`.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum HtmlContext {
    Attribute,
    BodyText,
}

/// Decodes every character reference in `input`.
pub fn decode(ctx: &HtmlContext, input: &[u8]) -> Box<[u8]> {
    let end = input.len();
    let mut decoded: Vec<u8> = Vec::with_capacity(end);
    let mut at = 0;
    let mut was_at = 0;

    while at < end {
        let next_character_reference_at = match memchr::memchr(b'&', &input[at..]) {
            Some(pos) => at + pos,
            None => break,
        };

        let Some((character_reference, token_len)) =
            decode_html_ref(ctx, input, next_character_reference_at)
        else {
            at = next_character_reference_at + 1;
            continue;
        };

        if *ctx == HtmlContext::Attribute {
            let after = next_character_reference_at + token_len;
            let is_ambiguous_entity_terminator = input[after - 1] != b';'
                && input[next_character_reference_at + 1] != b'#'
                && after < end
                && (input[after].is_ascii_alphanumeric() || input[after] == b'=');

            if is_ambiguous_entity_terminator {
                at = next_character_reference_at + 1;
                continue;
            }
        }

        decoded.extend_from_slice(&input[was_at..next_character_reference_at]);
        decoded.extend_from_slice(&character_reference);
        at = next_character_reference_at + token_len;
        was_at = at;
    }

    if was_at < end {
        decoded.extend_from_slice(&input[was_at..]);
    }

    decoded.into_boxed_slice()
}

/// Decodes the character reference starting at `offset`, if there is one.
///
/// Returns the decoded UTF-8 bytes and the number of input bytes consumed.
pub fn decode_html_ref(
    _ctx: &HtmlContext,
    input: &[u8],
    offset: usize,
) -> Option<(Box<[u8]>, usize)> {
    if input.len() < offset + 3 {
        return None;
    }

    if input[offset] != b'&' {
        return None;
    }

    if input[offset + 1] == b'#' {
        return decode_html5_numeric_character_reference(input, offset);
    }

    let prefix = [input[offset + 1], input[offset + 2]];
    let candidates = NAMED_REFERENCES.get(&prefix)?;
    let rest = &input[offset + 3..];

    candidates.iter().find_map(|(suffix, decoded_bytes)| {
        rest.starts_with(suffix)
            .then(|| ((*decoded_bytes).into(), 3 + suffix.len()))
    })
}

fn decode_html5_numeric_character_reference(
    input: &[u8],
    offset: usize,
) -> Option<(Box<[u8]>, usize)> {
    static CP1252_REPLACEMENTS: [u32; 32] = [
        0x20AC, // 0x80 -> EURO SIGN (€).
        0x81,   // 0x81 -> (no change).
        0x201A, // 0x82 -> SINGLE LOW-9 QUOTATION MARK (‚).
        0x0192, // 0x83 -> LATIN SMALL LETTER F WITH HOOK (ƒ).
        0x201E, // 0x84 -> DOUBLE LOW-9 QUOTATION MARK („).
        0x2026, // 0x85 -> HORIZONTAL ELLIPSIS (…).
        0x2020, // 0x86 -> DAGGER (†).
        0x2021, // 0x87 -> DOUBLE DAGGER (‡).
        0x02C6, // 0x88 -> MODIFIER LETTER CIRCUMFLEX ACCENT (ˆ).
        0x2030, // 0x89 -> PER MILLE SIGN (‰).
        0x0160, // 0x8A -> LATIN CAPITAL LETTER S WITH CARON (Š).
        0x2039, // 0x8B -> SINGLE LEFT-POINTING ANGLE QUOTATION MARK (‹).
        0x0152, // 0x8C -> LATIN CAPITAL LIGATURE OE (Œ).
        0x8D,   // 0x8D -> (no change).
        0x017D, // 0x8E -> LATIN CAPITAL LETTER Z WITH CARON (Ž).
        0x8F,   // 0x8F -> (no change).
        0x90,   // 0x90 -> (no change).
        0x2018, // 0x91 -> LEFT SINGLE QUOTATION MARK (‘).
        0x2019, // 0x92 -> RIGHT SINGLE QUOTATION MARK (’).
        0x201C, // 0x93 -> LEFT DOUBLE QUOTATION MARK (“).
        0x201D, // 0x94 -> RIGHT DOUBLE QUOTATION MARK (”).
        0x2022, // 0x95 -> BULLET (•).
        0x2013, // 0x96 -> EN DASH (–).
        0x2014, // 0x97 -> EM DASH (—).
        0x02DC, // 0x98 -> SMALL TILDE (˜).
        0x2122, // 0x99 -> TRADE MARK SIGN (™).
        0x0161, // 0x9A -> LATIN SMALL LETTER S WITH CARON (š).
        0x203A, // 0x9B -> SINGLE RIGHT-POINTING ANGLE QUOTATION MARK (›).
        0x0153, // 0x9C -> LATIN SMALL LIGATURE OE (œ).
        0x9D,   // 0x9D -> (no change).
        0x017E, // 0x9E -> LATIN SMALL LETTER Z WITH CARON (ž).
        0x0178, // 0x9F -> LATIN CAPITAL LETTER Y WITH DIAERESIS (Ÿ).
    ];

    let end = input.len();
    let (digits_at, radix) = numeric_reference_radix(input, offset)?;

    let mut at = digits_at;
    while at < end && b'0' == input[at] {
        at += 1;
    }
    let zero_count = at - digits_at;

    let significant_at = at;
    while at < end && char::from(input[at]).is_digit(radix) {
        at += 1;
    }
    let digit_count = at - significant_at;

    let has_trailing_semicolon = at < end && b';' == input[at];
    let end_of_span = if has_trailing_semicolon { at + 1 } else { at };
    let matched_byte_length = end_of_span - offset;

    // `&#` or `&#x` without digits returns into plaintext.
    if zero_count == 0 && digit_count == 0 {
        return None;
    }

    // Whereas `&#` and only zeros is invalid.
    if digit_count == 0 {
        return Some((UNICODE_REPLACEMENT_CHAR.into(), matched_byte_length));
    }

    // Too many digits can't be a valid code point and isn't worth parsing.
    let max_digits = if radix == 16 { 6 } else { 7 };
    if digit_count > max_digits {
        return Some((UNICODE_REPLACEMENT_CHAR.into(), matched_byte_length));
    }

    let mut code_point = input[significant_at..at].iter().fold(0u32, |value, &b| {
        value * radix + char::from(b).to_digit(radix).unwrap_or(0)
    });

    if (0x80..=0x9F).contains(&code_point) {
        code_point = CP1252_REPLACEMENTS[(code_point - 0x80) as usize];
    }

    Some((
        html5_code_point_to_utf8_bytes(code_point),
        matched_byte_length,
    ))
}

/// Returns where the digits of a numeric reference begin and their radix.
pub(crate) fn numeric_reference_radix(input: &[u8], offset: usize) -> Option<(usize, u32)> {
    if input.len() < offset + 3 || input[offset] != b'&' || input[offset + 1] != b'#' {
        return None;
    }

    if b'X' == (input[offset + 2] & 0xDF) {
        Some((offset + 3, 16))
    } else {
        Some((offset + 2, 10))
    }
}

/// Surrogates and values beyond U+10FFFF become U+FFFD.
pub(crate) fn html5_code_point_to_utf8_bytes(code_point: u32) -> Box<[u8]> {
    let mut slice = [0u8; 4];
    char::from_u32(code_point).map_or(UNICODE_REPLACEMENT_CHAR.into(), |c| {
        c.encode_utf8(&mut slice).as_bytes().into()
    })
}
