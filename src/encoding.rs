//! Character encoding detection and transcoding.
//!
//! Search result pages arrive as bytes. The charset is taken from the HTTP
//! `Content-Type` header when one is given, otherwise from the document's
//! own `<meta>` declarations, and the bytes are decoded to UTF-8.

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use std::sync::LazyLock;

/// Only this many leading bytes are scanned for `<meta>` declarations.
const SNIFF_LEN: usize = 1024;

/// Match `<meta charset="...">` tag
#[allow(clippy::expect_used)]
static CHARSET_META_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s>;]+)"#).expect("valid regex")
});

/// Match `<meta http-equiv="Content-Type" content="...; charset=...">` tag
#[allow(clippy::expect_used)]
static CONTENT_TYPE_META_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+http-equiv\s*=\s*["']?content-type["']?[^>]+content\s*=\s*["']?[^"'>]*;\s*charset\s*=\s*([^"'\s>]+)"#).expect("valid regex")
});

/// Match the `charset` parameter of a `Content-Type` header value
#[allow(clippy::expect_used)]
static HEADER_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i);\s*charset\s*=\s*["']?([^"'\s;]+)"#).expect("valid regex")
});

/// Detects the encoding declared inside an HTML document.
///
/// Looks for `<meta charset>`, then `<meta http-equiv="Content-Type">`,
/// and falls back to UTF-8.
#[must_use]
pub fn detect_encoding(html: &[u8]) -> &'static Encoding {
    let head = String::from_utf8_lossy(&html[..html.len().min(SNIFF_LEN)]);

    capture(&CHARSET_META_RE, &head)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .or_else(|| {
            capture(&CONTENT_TYPE_META_RE, &head)
                .and_then(|label| Encoding::for_label(label.as_bytes()))
        })
        .unwrap_or(UTF_8)
}

/// Extracts the charset label from a `Content-Type` header value such as
/// `text/html; charset=ISO-8859-1`.
#[must_use]
pub fn charset_from_content_type(content_type: &str) -> Option<&'static Encoding> {
    capture(&HEADER_CHARSET_RE, content_type)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
}

fn capture<'t>(re: &Regex, haystack: &'t str) -> Option<&'t str> {
    re.captures(haystack)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Decodes HTML bytes to UTF-8 using the encoding declared in the document.
///
/// Decoding is lossy: invalid sequences become U+FFFD instead of failing.
///
/// ```
/// use dorkali::encoding::transcode_to_utf8;
///
/// let html = b"<meta charset=\"ISO-8859-1\"><p>Caf\xE9</p>";
/// assert!(transcode_to_utf8(html).contains("Café"));
/// ```
#[must_use]
pub fn transcode_to_utf8(html: &[u8]) -> String {
    transcode(html, detect_encoding(html))
}

/// Like [`transcode_to_utf8`], but an encoding named by the transport
/// (`Content-Type` header) takes precedence over in-document declarations.
#[must_use]
pub fn transcode_with_header(html: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(charset_from_content_type)
        .unwrap_or_else(|| detect_encoding(html));
    transcode(html, encoding)
}

fn transcode(html: &[u8], encoding: &'static Encoding) -> String {
    if encoding == UTF_8 {
        return String::from_utf8_lossy(html).into_owned();
    }

    let (decoded, used, had_errors) = encoding.decode(html);
    if had_errors {
        tracing::debug!(encoding = used.name(), "replaced undecodable bytes");
    }
    decoded.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_from_meta_charset() {
        let html = br#"<html><head><meta charset="ISO-8859-1"></head><body>Test</body></html>"#;
        // encoding_rs maps ISO-8859-1 to windows-1252 per WHATWG
        assert_eq!(detect_encoding(html).name(), "windows-1252");
    }

    #[test]
    fn detect_from_http_equiv() {
        let html = br#"<meta http-equiv="Content-Type" content="text/html; charset=Shift_JIS">"#;
        assert_eq!(detect_encoding(html).name(), "Shift_JIS");
    }

    #[test]
    fn default_to_utf8() {
        assert_eq!(detect_encoding(b"<html><body>Test</body></html>"), UTF_8);
    }

    #[test]
    fn unknown_label_falls_back_to_utf8() {
        assert_eq!(detect_encoding(br#"<meta charset="klingon">"#), UTF_8);
    }

    #[test]
    fn header_charset() {
        assert_eq!(
            charset_from_content_type("text/html; charset=ISO-8859-1").map(Encoding::name),
            Some("windows-1252")
        );
        assert_eq!(
            charset_from_content_type("text/html;charset=\"utf-8\"").map(Encoding::name),
            Some("UTF-8")
        );
        assert!(charset_from_content_type("text/html").is_none());
    }

    #[test]
    fn header_wins_over_meta() {
        let html = b"<meta charset=\"utf-8\"><p>Caf\xE9</p>";
        let decoded = transcode_with_header(html, Some("text/html; charset=windows-1252"));
        assert!(decoded.contains("Café"));
    }

    #[test]
    fn missing_header_uses_meta() {
        let html = b"<meta charset=\"windows-1252\"><p>\x93Hi\x94</p>";
        let decoded = transcode_with_header(html, None);
        assert!(decoded.contains("\u{201C}Hi\u{201D}"));
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let result = transcode_to_utf8(b"<p>Test \xFF\xFE Invalid</p>");
        assert!(result.contains("Test"));
        assert!(result.contains('\u{FFFD}'));
    }
}
