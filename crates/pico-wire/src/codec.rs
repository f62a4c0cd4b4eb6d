use crate::error::{WireError, WireResult};
use crate::headers::Headers;

/// Recognized document-type tags for the embedded header block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocType {
    Html0,
    Html1,
}

impl DocType {
    /// Parse a tag line. Anything unrecognized is an [`WireError::UnsupportedFormat`].
    pub fn from_tag(tag: &str) -> WireResult<Self> {
        match tag {
            "html0" => Ok(Self::Html0),
            "html1" => Ok(Self::Html1),
            other => Err(WireError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::Html0 => "html0",
            Self::Html1 => "html1",
        }
    }

    /// The runlevel this tag encodes: `html0` ⇔ 0, `html1` ⇔ 1.
    pub fn runlevel(&self) -> u8 {
        match self {
            Self::Html0 => 0,
            Self::Html1 => 1,
        }
    }

    /// The tag for a runlevel, inverse of [`DocType::runlevel`].
    pub fn from_runlevel(level: u8) -> WireResult<Self> {
        match level {
            0 => Ok(Self::Html0),
            1 => Ok(Self::Html1),
            other => Err(WireError::UnsupportedFormat(format!("html{other}"))),
        }
    }
}

/// Result of [`parse_header`]: the tag, the header map, and the byte offset
/// where the payload starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedHeader {
    pub doc_type: DocType,
    pub headers: Headers,
    /// Offset immediately after the blank line terminating the header block.
    pub end: usize,
}

/// Serialize a header block.
///
/// Emits the doc-type tag, one `key: value` line per entry (repeated names
/// as repeated lines), and a blank-line terminator. There is no escaping:
/// a value containing `\n` is rejected rather than silently corrupting the
/// frame.
pub fn encode_header(doc_type: DocType, headers: &Headers) -> WireResult<Vec<u8>> {
    let mut out = String::new();
    out.push_str(doc_type.as_tag());
    out.push('\n');
    for (key, value) in headers.iter() {
        if value.contains('\n') {
            return Err(WireError::HeaderValue(key.to_string()));
        }
        out.push_str(key);
        out.push_str(": ");
        out.push_str(value);
        out.push('\n');
    }
    out.push('\n');
    Ok(out.into_bytes())
}

/// Parse a header block from the start of `input`.
///
/// The first line is the doc-type tag; header lines follow until a blank
/// line. Each line splits on the first `:` (values may contain colons), the
/// key is trimmed and lower-cased, the value trimmed. A line with no `:` is
/// a key with an empty value. Only the header region must be UTF-8; the
/// payload after `end` stays untouched bytes.
pub fn parse_header(input: &[u8]) -> WireResult<ParsedHeader> {
    let mut pos = 0;

    let tag = next_line(input, &mut pos)
        .ok_or_else(|| WireError::UnsupportedFormat(String::new()))?;
    let tag = std::str::from_utf8(tag).map_err(|_| WireError::HeaderEncoding)?;
    let doc_type = DocType::from_tag(tag)?;

    let mut headers = Headers::new();
    loop {
        let line = next_line(input, &mut pos).ok_or(WireError::HeaderEncoding)?;
        if line.is_empty() {
            break;
        }
        let line = std::str::from_utf8(line).map_err(|_| WireError::HeaderEncoding)?;
        let (key, value) = match line.split_once(':') {
            Some((k, v)) => (k, v),
            None => (line, ""),
        };
        headers.append(key, value.trim());
    }

    Ok(ParsedHeader {
        doc_type,
        headers,
        end: pos,
    })
}

/// Slice out the next `\n`-terminated line, advancing `pos` past the
/// terminator. `None` when no newline remains.
fn next_line<'a>(input: &'a [u8], pos: &mut usize) -> Option<&'a [u8]> {
    let rest = input.get(*pos..)?;
    let nl = rest.iter().position(|&b| b == b'\n')?;
    let line = &rest[..nl];
    *pos += nl + 1;
    Some(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_minimal_document() {
        let parsed = parse_header(b"html0\n\npayload").unwrap();
        assert_eq!(parsed.doc_type, DocType::Html0);
        assert!(parsed.headers.is_empty());
        assert_eq!(&b"html0\n\npayload"[parsed.end..], b"payload");
    }

    #[test]
    fn parse_headers_and_offset() {
        let input = b"html0\ndate: 1700000000000\ntitle: hi\n\n<h1>x</h1>";
        let parsed = parse_header(input).unwrap();
        assert_eq!(parsed.headers.get("date"), Some("1700000000000"));
        assert_eq!(parsed.headers.get("title"), Some("hi"));
        assert_eq!(&input[parsed.end..], b"<h1>x</h1>");
    }

    #[test]
    fn empty_input_is_unsupported_format() {
        assert!(matches!(
            parse_header(b""),
            Err(WireError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn unknown_tag_is_unsupported_format() {
        let err = parse_header(b"html9\n\n").unwrap_err();
        assert_eq!(err, WireError::UnsupportedFormat("html9".to_string()));
    }

    #[test]
    fn html1_is_recognized() {
        let parsed = parse_header(b"html1\n\n").unwrap();
        assert_eq!(parsed.doc_type, DocType::Html1);
        assert_eq!(parsed.doc_type.runlevel(), 1);
    }

    #[test]
    fn value_splits_on_first_colon_only() {
        let parsed = parse_header(b"html0\nlink: https://example.com:8080/x\n\n").unwrap();
        assert_eq!(parsed.headers.get("link"), Some("https://example.com:8080/x"));
    }

    #[test]
    fn line_without_colon_is_key_with_empty_value() {
        let parsed = parse_header(b"html0\nmarker\n\n").unwrap();
        assert_eq!(parsed.headers.get("marker"), Some(""));
    }

    #[test]
    fn keys_trimmed_and_lowercased_values_trimmed() {
        let parsed = parse_header(b"html0\n  Title :  Spaced Out  \n\n").unwrap();
        assert_eq!(parsed.headers.get("title"), Some("Spaced Out"));
    }

    #[test]
    fn missing_blank_line_is_an_error() {
        assert_eq!(parse_header(b"html0\nkey: v\n"), Err(WireError::HeaderEncoding));
    }

    #[test]
    fn repeated_names_accumulate() {
        let parsed = parse_header(b"html0\ntag: a\ntag: b\n\n").unwrap();
        assert_eq!(parsed.headers.get_all("tag"), vec!["a", "b"]);
    }

    #[test]
    fn encode_rejects_newline_in_value() {
        let mut h = Headers::new();
        h.append("bad", "two\nlines");
        assert_eq!(
            encode_header(DocType::Html0, &h),
            Err(WireError::HeaderValue("bad".to_string()))
        );
    }

    #[test]
    fn encode_emits_repeated_lines() {
        let mut h = Headers::new();
        h.append("tag", "a");
        h.append("tag", "b");
        let bytes = encode_header(DocType::Html0, &h).unwrap();
        assert_eq!(bytes, b"html0\ntag: a\ntag: b\n\n");
    }

    #[test]
    fn encode_parse_roundtrip() {
        let h: Headers = [("date", "123"), ("title", "x: y"), ("empty", "")]
            .into_iter()
            .collect();
        let bytes = encode_header(DocType::Html0, &h).unwrap();
        let parsed = parse_header(&bytes).unwrap();
        assert_eq!(parsed.doc_type, DocType::Html0);
        assert_eq!(parsed.headers, h);
        assert_eq!(parsed.end, bytes.len());
    }

    proptest! {
        /// Single-valued headers with newline-free, trimmed values survive
        /// an encode/parse cycle exactly.
        #[test]
        fn roundtrip_property(
            entries in proptest::collection::vec(
                ("[a-z][a-z0-9-]{0,15}", "([!-~]([ -~]{0,30}[!-~])?)?"),
                0..8,
            )
        ) {
            let mut h = Headers::new();
            for (k, v) in &entries {
                h.set(k, v.trim());
            }
            let bytes = encode_header(DocType::Html1, &h).unwrap();
            let parsed = parse_header(&bytes).unwrap();
            prop_assert_eq!(parsed.headers, h);
            prop_assert_eq!(parsed.end, bytes.len());
        }
    }
}
