//! Versioned storage of pico web apps.
//!
//! The [`Silo`] layers a hard policy on top of the feed repository: at most
//! one live version per signer key. A new version wins only if its embedded
//! `date` is strictly newer than the stored one; everything else is a quiet
//! `false`, the normal outcome for duplicates and out-of-order delivery.
//! Alongside the feeds it keeps a derived metadata index (date, title,
//! runlevel, size) and a per-key hit counter.

pub mod error;
pub mod silo;
pub mod title;

pub use error::{SiloError, SiloResult};
pub use silo::{SiteListing, SiteMeta, SiteStat, Silo, CLOCK_SKEW_MS};
pub use title::extract_title;
