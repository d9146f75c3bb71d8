//! Instagram highlight extraction surface.
//!
//! Leaf-first: [`timestamp`] and [`handle`] normalise scalars, [`embedded`] pulls the
//! page's inline JSON state out of raw HTML, [`walker`] finds the user and highlight
//! collections inside that tree, [`media`] flattens each collection into records, and
//! [`extract`] strings them together. [`client`] adds the fetch step on top.
pub mod client;
pub mod embedded;
pub mod extract;
pub mod handle;
pub mod media;
pub mod path;
pub mod timestamp;
pub mod types;
pub mod walker;

pub use client::{HighlightScraper, PageFetcher};
pub use extract::extract_highlights;
pub use handle::{normalize_username, profile_url, profile_url_at};
pub use timestamp::to_unix_timestamp;
pub use types::{Extraction, HighlightMediaItem, MissReason};
