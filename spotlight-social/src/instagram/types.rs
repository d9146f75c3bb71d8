use serde::{Deserialize, Serialize};
use std::fmt;

/// One flattened media entry of a profile highlight.
///
/// Serialises with exactly the nine exported field names
/// (`username`, `id`, `highlightId`, `highlightTitle`, `media`, `mediaType`,
/// `mentions`, `timestamp`, `thumbnail`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightMediaItem {
    pub username: String,
    pub id: String,
    pub highlight_id: String,
    pub highlight_title: String,
    pub media: String,
    pub media_type: String,
    #[serde(default)]
    pub mentions: Vec<String>,
    #[serde(default)]
    pub timestamp: u64,
    #[serde(default)]
    pub thumbnail: String,
}

/// Why a stage came back empty-handed. Misses are expected, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissReason {
    /// No page text was available to look at.
    NoPage,
    /// None of the known embedding patterns produced parseable JSON.
    NoEmbeddedJson,
    /// The JSON parsed but no known key-path led to highlight collections.
    NoHighlights,
}

impl fmt::Display for MissReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MissReason::NoPage => "no_page",
            MissReason::NoEmbeddedJson => "no_embedded_json",
            MissReason::NoHighlights => "no_highlights",
        };
        f.write_str(s)
    }
}

/// Outcome of an extraction stage that cannot fail the caller.
///
/// Paired with `Result<_, SpotlightError>` this gives the three tiers the pipeline
/// distinguishes: found, expected miss, and caller-facing validation failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction<T> {
    Found(T),
    Miss(MissReason),
}

impl<T> Extraction<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Extraction::Found(v) => Some(v),
            Extraction::Miss(_) => None,
        }
    }
}
