//! Locate the client-side state a profile page embeds in inline `<script>` blocks.
//!
//! The variable name and wrapping syntax drift over time, so the locator walks a
//! fixed-priority table of patterns (oldest, best-known first). Every match of a
//! pattern is a candidate; the first candidate that parses as JSON wins. A candidate
//! that matches but fails to parse is a miss and the search moves on.
//!
//! New page layouts are handled by appending to [`PATTERNS`]; nothing downstream
//! needs to change.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

struct EmbeddingPattern {
    name: &'static str,
    regex: Regex,
    /// Candidate must contain this substring to be considered at all. Used for
    /// generic script blocks, where most matches are unrelated state.
    marker: Option<&'static str>,
}

impl EmbeddingPattern {
    fn new(name: &'static str, pattern: &str, marker: Option<&'static str>) -> Self {
        Self {
            name,
            regex: Regex::new(pattern).expect("embedding pattern compiles"),
            marker,
        }
    }
}

static PATTERNS: LazyLock<Vec<EmbeddingPattern>> = LazyLock::new(|| {
    vec![
        EmbeddingPattern::new(
            "shared_data",
            r"(?s)window\._sharedData\s*=\s*(\{.*?\})\s*;\s*</script>",
            None,
        ),
        EmbeddingPattern::new(
            "additional_data_loaded",
            r#"(?s)window\.__additionalDataLoaded\(\s*['"][^'"]*['"]\s*,\s*(\{.*?\})\s*\)\s*;\s*</script>"#,
            None,
        ),
        EmbeddingPattern::new(
            "application_json",
            r#"(?s)<script[^>]*type=["']application/json["'][^>]*>\s*(\{.*?\})\s*</script>"#,
            Some("highlight"),
        ),
        EmbeddingPattern::new(
            "next_data",
            r#"(?s)<script[^>]*id=["']__NEXT_DATA__["'][^>]*>\s*(\{.*?\})\s*</script>"#,
            None,
        ),
    ]
});

/// A parsed JSON document plus the pattern that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedDocument {
    pub pattern: &'static str,
    pub value: Value,
}

/// Return the first embedded JSON document that parses, or `None`.
pub fn locate_embedded_json(html: &str) -> Option<Value> {
    locate_document(html).map(|doc| doc.value)
}

/// Like [`locate_embedded_json`] but also reports which pattern matched.
pub fn locate_document(html: &str) -> Option<EmbeddedDocument> {
    for pattern in PATTERNS.iter() {
        for caps in pattern.regex.captures_iter(html) {
            let Some(candidate) = caps.get(1).map(|m| m.as_str()) else {
                continue;
            };
            if pattern.marker.is_some_and(|marker| !candidate.contains(marker)) {
                continue;
            }
            match serde_json::from_str::<Value>(candidate) {
                Ok(value) => {
                    tracing::debug!(
                        pattern = pattern.name,
                        bytes = candidate.len(),
                        "embedded.json.found"
                    );
                    return Some(EmbeddedDocument {
                        pattern: pattern.name,
                        value,
                    });
                }
                Err(e) => {
                    tracing::debug!(
                        pattern = pattern.name,
                        error = %e,
                        "embedded.json.unparseable_candidate"
                    );
                }
            }
        }
    }

    tracing::debug!(html_len = html.len(), "embedded.json.none");
    None
}
