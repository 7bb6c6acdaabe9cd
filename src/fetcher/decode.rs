use encoding_rs::Encoding;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// How far into the body to look for a `<meta>` charset declaration.
const SNIFF_WINDOW: usize = 4096;

static HEADER_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

// Matches both `<meta charset=..>` and the http-equiv content-type form.
static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta\s+[^>]*?charset\s*=\s*["']?([^"'\s;/>]+)"#).unwrap()
});

/// Decode a response body, preferring the header charset, then a `<meta>`
/// declaration, then a statistical guess.
///
/// Malformed sequences become U+FFFD, the way a browser renders them.
pub fn decode_body(content_type: &str, body: &[u8]) -> (String, &'static Encoding) {
    let encoding = sniff_encoding(content_type, body);
    let (decoded, _, had_errors) = encoding.decode(body);
    if had_errors {
        debug!(encoding = encoding.name(), "body had malformed sequences, replaced");
    }
    (decoded.into_owned(), encoding)
}

fn sniff_encoding(content_type: &str, body: &[u8]) -> &'static Encoding {
    if let Some(encoding) = label_from(&HEADER_CHARSET, content_type) {
        return encoding;
    }

    let window = &body[..body.len().min(SNIFF_WINDOW)];
    let head = String::from_utf8_lossy(window);
    if let Some(encoding) = label_from(&META_CHARSET, &head) {
        return encoding;
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(window, body.len() <= SNIFF_WINDOW);
    detector.guess(None, true)
}

fn label_from(pattern: &Regex, haystack: &str) -> Option<&'static Encoding> {
    let label = pattern.captures(haystack)?.get(1)?.as_str();
    Encoding::for_label(label.trim().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_charset_wins() {
        let (_, encoding) = decode_body(
            "text/html; charset=utf-8",
            b"<meta charset=\"windows-1252\"><p>hi</p>",
        );
        assert_eq!(encoding, encoding_rs::UTF_8);
    }

    #[test]
    fn test_meta_charset_detected() {
        let body = b"<html><head><meta charset=\"iso-8859-1\"><title>T</title></head></html>";
        let (_, encoding) = decode_body("text/html", body);
        // iso-8859-1 is an alias of windows-1252 in the WHATWG table
        assert_eq!(encoding, encoding_rs::WINDOWS_1252);
    }

    #[test]
    fn test_http_equiv_charset_detected() {
        let body = b"<html><head><meta http-equiv=\"Content-Type\" content=\"text/html; charset=gbk\"></head></html>";
        let (_, encoding) = decode_body("text/html", body);
        assert_eq!(encoding, encoding_rs::GBK);
    }

    #[test]
    fn test_decode_gbk_body() {
        let (bytes, _, _) = encoding_rs::GBK.encode("并发编程");
        let (decoded, _) = decode_body("text/html; charset=gbk", &bytes);
        assert_eq!(decoded, "并发编程");
    }

    #[test]
    fn test_invalid_bytes_are_replaced() {
        let (decoded, encoding) = decode_body("text/html; charset=utf-8", &[0x66, 0xff, 0x67]);
        assert_eq!(encoding, encoding_rs::UTF_8);
        assert_eq!(decoded, "f\u{FFFD}g");
    }
}
