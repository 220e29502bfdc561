// ABOUTME: Loading HTML documents from disk for analysis.
// ABOUTME: Decodes bytes using a BOM, a <meta> charset declaration, or chardetng detection.

use std::fs;
use std::path::Path;

use anyhow::Context;
use encoding_rs::Encoding;
use once_cell::sync::Lazy;
use regex::bytes::Regex;

/// How far into the document a charset declaration is looked for.
pub const CHARSET_SNIFF_LIMIT: usize = 1024;

static META_CHARSET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i-u)<meta[^>]+charset\s*=\s*["']?\s*([A-Za-z0-9_:.\-]+)"#).unwrap()
});

/// Read an HTML file and decode it to a String.
pub fn load_html(path: impl AsRef<Path>) -> anyhow::Result<String> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(decode_html(&bytes))
}

/// Decode raw HTML bytes.
///
/// A byte order mark wins, then a `<meta charset>` or `http-equiv` content
/// type within the first [`CHARSET_SNIFF_LIMIT`] bytes, then chardetng.
pub fn decode_html(bytes: &[u8]) -> String {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (decoded, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return decoded.into_owned();
    }

    if let Some(encoding) = sniff_meta_charset(bytes) {
        tracing::debug!(encoding = encoding.name(), "using declared charset");
        let (decoded, _, _) = encoding.decode(bytes);
        return decoded.into_owned();
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);
    tracing::debug!(encoding = encoding.name(), "detected charset");
    let (decoded, _, _) = encoding.decode(bytes);
    decoded.into_owned()
}

fn sniff_meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(CHARSET_SNIFF_LIMIT)];
    let label = META_CHARSET_RE.captures(head)?.get(1)?;
    let encoding = Encoding::for_label(label.as_bytes())?;
    // A document that reached us as bytes cannot really be UTF-16.
    if encoding == encoding_rs::UTF_16LE || encoding == encoding_rs::UTF_16BE {
        return Some(encoding_rs::UTF_8);
    }
    Some(encoding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_meta_charset_is_honored() {
        let mut html = b"<html><head><meta charset=\"windows-1252\"></head><body>caf".to_vec();
        html.push(0xe9);
        html.extend_from_slice(b"</body></html>");
        assert!(decode_html(&html).contains("caf\u{e9}"));
    }

    #[test]
    fn test_http_equiv_charset_is_honored() {
        let mut html =
            b"<meta http-equiv=\"Content-Type\" content=\"text/html; charset=ISO-8859-1\"><p>na"
                .to_vec();
        html.push(0xef);
        html.extend_from_slice(b"ve</p>");
        assert!(decode_html(&html).contains("na\u{ef}ve"));
    }

    #[test]
    fn test_sniff_ignores_late_declarations() {
        let mut html = vec![b' '; CHARSET_SNIFF_LIMIT];
        html.extend_from_slice(b"<meta charset=\"koi8-r\">");
        assert_eq!(sniff_meta_charset(&html), None);
    }

    #[test]
    fn test_utf16_declaration_falls_back_to_utf8() {
        assert_eq!(
            sniff_meta_charset(b"<meta charset=utf-16>"),
            Some(encoding_rs::UTF_8)
        );
    }

    #[test]
    fn test_bom_wins() {
        let mut html = vec![0xef, 0xbb, 0xbf];
        html.extend_from_slice("<meta charset=\"windows-1252\"><p>\u{e9}t\u{e9}</p>".as_bytes());
        let decoded = decode_html(&html);
        assert!(decoded.starts_with("<meta"));
        assert!(decoded.contains("\u{e9}t\u{e9}"));
    }

    #[test]
    fn test_undeclared_latin1_is_detected() {
        let decoded = decode_html(&[0x63, 0x61, 0x66, 0xe9]);
        assert_eq!(decoded, "caf\u{e9}");
    }

    #[test]
    fn test_load_html_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all("<p>plain utf-8 \u{2713}</p>".as_bytes()).unwrap();
        let html = load_html(file.path()).unwrap();
        assert_eq!(html, "<p>plain utf-8 \u{2713}</p>");
    }

    #[test]
    fn test_load_html_missing_file() {
        let err = load_html("/nonexistent/depthscan/page.html").unwrap_err();
        assert!(err.to_string().contains("reading /nonexistent/depthscan/page.html"));
    }
}
