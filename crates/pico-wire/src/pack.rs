use chrono::Utc;
use pico_feed::{Feed, SecretKey};

use crate::codec::{encode_header, parse_header, DocType};
use crate::error::{WireError, WireResult};
use crate::headers::Headers;

/// Inputs to [`pack`] beyond the HTML itself.
#[derive(Debug, Default)]
pub struct PackOptions<'a> {
    /// Signing secret. An embedded `secret` header in the HTML overrides it.
    pub secret: Option<&'a SecretKey>,
    /// Caller headers, overriding any same-named embedded header.
    pub extra_headers: Headers,
    /// Runlevel used for the doc-type tag when the HTML embeds none.
    pub runlevel: u8,
    /// Feed to append onto; a fresh empty feed when `None`.
    pub feed: Option<Feed>,
}

/// Build a signed feed from an HTML document.
///
/// The input may itself start with a POP-04 header block; those embedded
/// headers are the lowest-precedence layer. Caller headers override them,
/// and the computed `key` and `date` headers overwrite everything so the
/// packed site always carries authoritative identity and timestamp, no
/// matter what the HTML claims. An embedded `secret` header signs the feed
/// instead of the passed secret and is stripped before serialization.
pub fn pack(html: &str, opts: PackOptions<'_>) -> WireResult<Feed> {
    let (embedded_type, mut headers, offset) = match parse_header(html.as_bytes()) {
        Ok(parsed) => (Some(parsed.doc_type), parsed.headers, parsed.end),
        // Not framed at all: the whole input is payload.
        Err(WireError::UnsupportedFormat(_)) => (None, Headers::new(), 0),
        Err(e) => return Err(e),
    };

    let embedded_secret = match headers.get("secret") {
        Some(raw) => Some(SecretKey::from_hex(raw)?),
        None => None,
    };
    headers.remove("secret");

    let secret = embedded_secret
        .as_ref()
        .or(opts.secret)
        .ok_or(WireError::NoSecret)?;

    let doc_type = match embedded_type {
        Some(t) => t,
        None => DocType::from_runlevel(opts.runlevel)?,
    };

    for (name, value) in opts.extra_headers.iter() {
        headers.set(name, value);
    }
    headers.set("key", secret.public_key().to_hex());
    headers.set("date", Utc::now().timestamp_millis().to_string());

    let mut body = encode_header(doc_type, &headers)?;
    body.extend_from_slice(&html.as_bytes()[offset..]);

    let mut feed = opts.feed.unwrap_or_default();
    feed.append(body, secret);
    Ok(feed)
}
