//! The restricted XML rule set.
//!
//! Only the five predefined entities and numeric references are
//! recognized, every reference must end with `;`, and references to
//! characters outside the XML `Char` production are left as-is.

use crate::html5_code_point_to_utf8_bytes;

const PREDEFINED_ENTITIES: [(&[u8], &[u8]); 5] = [
    (b"amp;", b"&"),
    (b"apos;", b"'"),
    (b"gt;", b">"),
    (b"lt;", b"<"),
    (b"quot;", b"\""),
];

/// Decodes every well-formed XML character reference in `input`.
pub fn decode_xml(input: &[u8]) -> Box<[u8]> {
    let end = input.len();
    let mut decoded: Vec<u8> = Vec::with_capacity(end);
    let mut at = 0;
    let mut was_at = 0;

    while let Some(pos) = memchr::memchr(b'&', &input[at..]) {
        let reference_at = at + pos;
        match decode_xml_ref(input, reference_at) {
            Some((character, token_len)) => {
                decoded.extend_from_slice(&input[was_at..reference_at]);
                decoded.extend_from_slice(&character);
                at = reference_at + token_len;
                was_at = at;
            }
            None => at = reference_at + 1,
        }
    }

    decoded.extend_from_slice(&input[was_at..]);
    decoded.into_boxed_slice()
}

/// Decodes the XML character reference starting at `offset`, if there is one.
///
/// Returns the decoded UTF-8 bytes and the number of input bytes consumed.
pub fn decode_xml_ref(input: &[u8], offset: usize) -> Option<(Box<[u8]>, usize)> {
    if input.get(offset) != Some(&b'&') {
        return None;
    }

    if input.get(offset + 1) == Some(&b'#') {
        return decode_numeric_ref(input, offset);
    }

    let rest = &input[offset + 1..];
    PREDEFINED_ENTITIES
        .iter()
        .find(|(name, _)| rest.starts_with(name))
        .map(|(name, character)| ((*character).into(), 1 + name.len()))
}

fn decode_numeric_ref(input: &[u8], offset: usize) -> Option<(Box<[u8]>, usize)> {
    // Unlike HTML, only a lowercase `x` introduces a hexadecimal reference.
    let (digits_at, radix) = match input.get(offset + 2) {
        Some(b'x') => (offset + 3, 16),
        _ => (offset + 2, 10),
    };
    let digit_count = input[digits_at..]
        .iter()
        .take_while(|&&b| char::from(b).is_digit(radix))
        .count();

    let semicolon_at = digits_at + digit_count;
    if digit_count == 0 || input.get(semicolon_at) != Some(&b';') {
        return None;
    }

    let code_point = input[digits_at..semicolon_at]
        .iter()
        .try_fold(0u32, |value, &b| {
            value
                .checked_mul(radix)?
                .checked_add(char::from(b).to_digit(radix)?)
        })?;

    if !is_xml_char(code_point) {
        return None;
    }

    Some((
        html5_code_point_to_utf8_bytes(code_point),
        semicolon_at + 1 - offset,
    ))
}

fn is_xml_char(code_point: u32) -> bool {
    matches!(
        code_point,
        0x9 | 0xA | 0xD | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x10000..=0x10FFFF
    )
}
