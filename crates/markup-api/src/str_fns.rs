use memchr::{memchr2, memmem};

/// Finds `pattern` in `s` at or after `offset`.
pub fn strpos(s: &[u8], pattern: &[u8], offset: usize) -> Option<usize> {
    if offset > s.len() {
        return None;
    }

    memmem::find(&s[offset..], pattern).map(|at| at + offset)
}

/// Finds `pattern` in `s` at or after `offset`, comparing ASCII case-insensitively.
pub fn stripos(s: &[u8], pattern: &[u8], offset: usize) -> Option<usize> {
    let Some(&first) = pattern.first() else {
        return (offset <= s.len()).then_some(offset);
    };

    let p_len = pattern.len();
    let mut at = offset;
    while at + p_len <= s.len() {
        let candidate = at
            + memchr2(
                first.to_ascii_lowercase(),
                first.to_ascii_uppercase(),
                &s[at..=s.len() - p_len],
            )?;

        if pattern.eq_ignore_ascii_case(&s[candidate..candidate + p_len]) {
            return Some(candidate);
        }

        at = candidate + 1;
    }

    None
}

/// Whether `s` starts with `prefix`, comparing ASCII case-insensitively.
pub fn starts_with_ignore_ascii_case(s: &[u8], prefix: &[u8]) -> bool {
    s.len() >= prefix.len() && s[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// HTML whitespace as understood by the tokenizer.
pub fn is_html_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | 0x0c | b'\r' | b'\n')
}

/// Bytes which may follow a tag name: whitespace, `/`, or `>`.
pub fn is_tag_name_terminator(b: u8) -> bool {
    is_html_whitespace(b) || matches!(b, b'/' | b'>')
}
