use pico_feed::{Block, Feed, PublicKey};

use crate::codec::{parse_header, DocType};
use crate::error::{WireError, WireResult};
use crate::headers::Headers;

/// Decoded view of a published document.
///
/// Derived from a signed block on demand; never stored as its own record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Site {
    /// The document-type tag the block declared.
    pub format: DocType,
    /// Signer public key, the document's permanent identity.
    pub key: PublicKey,
    /// Publication time, epoch milliseconds. 0 when the header is absent.
    pub date: i64,
    /// All embedded headers, `date` included.
    pub headers: Headers,
    /// Payload after the header block, decoded as text.
    pub html: String,
}

/// Unpack the last block of a feed. [`WireError::NotABlock`] for an empty feed.
pub fn unpack(feed: &Feed) -> WireResult<Site> {
    let block = feed.last().ok_or(WireError::NotABlock)?;
    unpack_block(block)
}

/// Unpack a single signed block into a [`Site`].
pub fn unpack_block(block: &Block) -> WireResult<Site> {
    let parsed = parse_header(&block.body)?;
    let date = match parsed.headers.get("date") {
        Some(raw) => raw
            .parse::<i64>()
            .map_err(|_| WireError::BadDate(raw.to_string()))?,
        None => 0,
    };
    let html = String::from_utf8_lossy(&block.body[parsed.end..]).into_owned();
    Ok(Site {
        format: parsed.doc_type,
        key: block.key,
        date,
        headers: parsed.headers,
        html,
    })
}
