//! POP-04 wire encoding for pico web apps.
//!
//! A published document travels as the body of a signed block: a one-line
//! document-type tag, a block of `key: value` header lines, a blank line,
//! then the HTML payload. This crate owns that grammar plus the packer that
//! turns HTML and a secret key into a signed feed, and the unpacker that
//! turns a feed back into a [`Site`].
//!
//! # Key Types
//!
//! - [`DocType`] — recognized document-type tags (`html0`, `html1`)
//! - [`Headers`] — ordered, case-insensitive header multimap
//! - [`Site`] — the decoded view of a block: format, key, date, headers, html
//! - [`pack`] / [`unpack`] — feed construction and deconstruction

pub mod codec;
pub mod error;
pub mod headers;
pub mod pack;
pub mod site;

pub use codec::{encode_header, parse_header, DocType, ParsedHeader};
pub use error::{WireError, WireResult};
pub use headers::Headers;
pub use pack::{pack, PackOptions};
pub use site::{unpack, unpack_block, Site};
