//! Whitespace and entity handling for extracted text.

use html5ever::data::NAMED_ENTITIES;

/// Whitespace in the sense of the HTML tokenizer, plus the no-break space.
fn is_actually_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\u{0C}' | '\r' | '\u{A0}')
}

/// Characters with no rendering which are dropped from normalized text.
fn is_invisible(c: char) -> bool {
    matches!(c, '\u{200B}' | '\u{AD}')
}

/// Whitespace which does not end a line.
pub(crate) fn is_inline_whitespace(c: char) -> bool {
    c.is_whitespace()
        && !matches!(
            c,
            '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{85}' | '\u{2028}' | '\u{2029}'
        )
}

/// Append `text` to `acc`, collapsing whitespace runs into single spaces.
///
/// When `strip_leading` is set, whitespace before the first visible
/// character of `text` is dropped entirely.
pub fn append_normalized_whitespace(acc: &mut String, text: &str, strip_leading: bool) {
    let mut last_was_white = false;
    let mut reached_non_white = false;

    for c in text.chars() {
        if is_actually_whitespace(c) {
            if (strip_leading && !reached_non_white) || last_was_white {
                continue;
            }
            acc.push(' ');
            last_was_white = true;
        } else if !is_invisible(c) {
            acc.push(c);
            last_was_white = false;
            reached_non_white = true;
        }
    }
}

pub fn trim_leading_whitespace(s: &str) -> &str {
    s.trim_start_matches(char::is_whitespace)
}

pub fn trim_trailing_whitespace(s: &str) -> &str {
    s.trim_end_matches(char::is_whitespace)
}

pub fn is_blank(s: &str) -> bool {
    s.chars().all(char::is_whitespace)
}

/// The last `n` characters of `s`.
pub fn suffix_chars(s: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    match s.char_indices().rev().nth(n - 1) {
        Some((i, _)) => &s[i..],
        None => s,
    }
}

/// Decode character references left in already-parsed text.
///
/// Handles numeric references and every named reference of the HTML
/// entity table, which is what double-escaped markup leaves behind.
/// Unknown references are kept verbatim.
pub fn unescape_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp..];
        match decode_reference(candidate) {
            Some((decoded, consumed)) => {
                out.extend(decoded.into_iter().flatten());
                rest = &candidate[consumed..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Longest named reference, `&CounterClockwiseContourIntegral;`.
const MAX_REFERENCE_LEN: usize = 33;

/// Decode the reference at the start of `s` (which begins with `&`).
///
/// Returns the decoded characters (named references may stand for two)
/// and the number of bytes consumed.
fn decode_reference(s: &str) -> Option<([Option<char>; 2], usize)> {
    let end = s[1..].find(';')? + 1;
    if end > MAX_REFERENCE_LEN {
        return None;
    }
    let name = &s[1..end];

    let decoded = if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        [Some(char::from_u32(code)?), None]
    } else {
        // Keys carry their semicolon; prefixes of longer names map to 0
        let &(first, second) = NAMED_ENTITIES.get(&s[1..=end])?;
        if first == 0 {
            return None;
        }
        [Some(char::from_u32(first)?), char::from_u32(second).filter(|_| second != 0)]
    };

    Some((decoded, end + 1))
}
