//! Decoding and media type helpers.

use std::borrow::Cow;

/// Media type of XHTML resources.
pub const XHTML_MEDIA_TYPE: &str = "application/xhtml+xml";

/// Media type of HTML resources.
pub const HTML_MEDIA_TYPE: &str = "text/html";

/// Decode bytes to a string, handling various encodings.
///
/// This function:
/// 1. First tries UTF-8 (a BOM is handled by encoding_rs)
/// 2. If malformed, tries the hint encoding (from `<?xml encoding="..."?>`
///    or `<meta charset>`)
/// 3. Falls back to Windows-1252 (common in old ebooks)
///
/// Uses `Cow<str>` to avoid allocation when the input is valid UTF-8.
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);
    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Extract encoding from XML declaration.
///
/// Parses `<?xml ... encoding="..." ?>` within the first 100 bytes.
pub fn extract_xml_encoding(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(100)];

    let xml_start = prefix.windows(5).position(|w| w == b"<?xml")?;
    let after_xml = &prefix[xml_start..];

    let enc_pos = after_xml
        .windows(9)
        .position(|w| w.eq_ignore_ascii_case(b"encoding="))?;
    quoted_value(&after_xml[enc_pos + 9..])
}

/// Extract encoding from a `<meta charset="...">` declaration.
///
/// Only the first 1024 bytes are scanned, as browsers do.
pub fn extract_meta_charset(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(1024)];

    let charset_pos = prefix
        .windows(8)
        .position(|w| w.eq_ignore_ascii_case(b"charset="))?;
    let after = &prefix[charset_pos + 8..];

    match after.first()? {
        b'"' | b'\'' => quoted_value(after),
        _ => {
            let end = after
                .iter()
                .position(|&b| matches!(b, b'"' | b'\'' | b';' | b'>' | b'/') || b.is_ascii_whitespace())
                .unwrap_or(after.len());
            std::str::from_utf8(&after[..end]).ok().filter(|s| !s.is_empty())
        }
    }
}

/// The value of a quoted string at the start of `bytes`.
fn quoted_value(bytes: &[u8]) -> Option<&str> {
    let quote = *bytes.first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let end = bytes[1..].iter().position(|&b| b == quote)? + 1;
    std::str::from_utf8(&bytes[1..end]).ok()
}

/// Whether `media_type` designates an HTML or XHTML document.
///
/// Parameters such as `; charset=utf-8` are ignored.
pub fn is_html_media_type(media_type: &str) -> bool {
    let essence = media_type.split(';').next().unwrap_or_default().trim();
    essence.eq_ignore_ascii_case(HTML_MEDIA_TYPE) || essence.eq_ignore_ascii_case(XHTML_MEDIA_TYPE)
}

/// Guess a resource media type from its path extension.
pub fn media_type_for_path(path: &str) -> Option<&'static str> {
    let ext = path.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "xhtml" | "xht" | "xml" => Some(XHTML_MEDIA_TYPE),
        "html" | "htm" => Some(HTML_MEDIA_TYPE),
        _ => None,
    }
}
