//! `Content-Disposition` header construction for downloads.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// RFC 5987 `attr-char`: everything outside it is percent-encoded.
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// `attachment` disposition carrying both a plain `filename` and a UTF-8
/// `filename*`, so non-ASCII names survive in clients that honor the latter.
pub fn content_disposition(file_name: &str) -> String {
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        escape_quoted(file_name),
        utf8_percent_encode(file_name, ATTR_CHAR)
    )
}

/// Makes a name safe inside a quoted header parameter. HTML-special
/// characters become entities; backslashes and control characters, which
/// could end the quoted string or the header line, become `_`.
pub fn escape_quoted(file_name: &str) -> String {
    let mut escaped = String::with_capacity(file_name.len());
    for c in file_name.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            '\\' => escaped.push('_'),
            c if c.is_control() => escaped.push('_'),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_ascii_name() {
        assert_eq!(
            content_disposition("report.pdf"),
            "attachment; filename=\"report.pdf\"; filename*=UTF-8''report.pdf"
        );
    }

    #[test]
    fn test_non_ascii_name_is_percent_encoded() {
        let header = content_disposition("报告 1.pdf");
        assert!(header.ends_with("filename*=UTF-8''%E6%8A%A5%E5%91%8A%201.pdf"));
        assert!(header.contains("filename=\"报告 1.pdf\""));
    }

    #[test]
    fn test_quote_cannot_break_out() {
        let header = content_disposition("a\"; filename=evil.exe");
        assert!(header.starts_with("attachment; filename=\"a&#34;; filename=evil.exe\";"));
        assert_eq!(header.matches('"').count(), 2);
    }

    #[test]
    fn test_control_and_backslash_are_replaced() {
        assert_eq!(escape_quoted("a\r\nb\\"), "a__b_");
        assert_eq!(escape_quoted("<x>&'y'"), "&lt;x&gt;&amp;&#39;y&#39;");
    }
}
