//! HTML in, highlight records out.
//!
//! Only an unusable handle is an error. Everything downstream of it (no embedded
//! JSON, an unfamiliar document shape, a malformed collection) degrades to fewer
//! records and a log line.

use super::embedded::locate_document;
use super::handle::normalize_username;
use super::media::expand_collection;
use super::types::{Extraction, HighlightMediaItem, MissReason};
use super::walker::walk_highlights;
use serde_json::Value;
use spotlight_common::SpotlightError;

/// Normalise `username_or_url`, then extract every highlight record from `html`.
///
/// ```
/// use spotlight_social::instagram::extract_highlights;
///
/// let html = r#"<script>window._sharedData = {"entry_data":{"ProfilePage":[{"graphql":{"user":{
///     "id":"1","edge_highlight_reels":{"edges":[{"node":{"id":"h1","title":"Trip",
///     "items":[{"id":"m1","type":"image","timestamp":"2023-01-01T00:00:00Z","mentions":["bob"]}]}}]}
/// }}}]}};</script>"#;
///
/// let items = extract_highlights("@alice", html).unwrap();
/// assert_eq!(items.len(), 1);
/// assert_eq!(items[0].username, "alice");
/// assert_eq!(items[0].timestamp, 1_672_531_200);
///
/// assert!(extract_highlights("@alice", "<html></html>").unwrap().is_empty());
/// assert!(extract_highlights("  ", html).is_err());
/// ```
pub fn extract_highlights(
    username_or_url: &str,
    html: &str,
) -> Result<Vec<HighlightMediaItem>, SpotlightError> {
    let handle = normalize_username(username_or_url);
    if handle.is_empty() {
        return Err(SpotlightError::InvalidHandle(username_or_url.to_string()));
    }
    Ok(extract_for_handle(&handle, html).found().unwrap_or_default())
}

/// Run the extraction stages for an already-canonical handle.
pub fn extract_for_handle(handle: &str, html: &str) -> Extraction<Vec<HighlightMediaItem>> {
    let Some(doc) = locate_document(html) else {
        tracing::warn!(username = %handle, "highlights.extract.no_embedded_json");
        return Extraction::Miss(MissReason::NoEmbeddedJson);
    };
    tracing::debug!(username = %handle, pattern = doc.pattern, "highlights.extract.document");
    extract_from_document(handle, &doc.value)
}

/// Walk a parsed document and flatten all of its highlight collections.
pub fn extract_from_document(handle: &str, doc: &Value) -> Extraction<Vec<HighlightMediaItem>> {
    let set = match walk_highlights(doc) {
        Ok(Extraction::Found(set)) => set,
        Ok(Extraction::Miss(reason)) => {
            tracing::info!(username = %handle, %reason, "highlights.extract.miss");
            return Extraction::Miss(reason);
        }
        Err(e) => {
            tracing::error!(username = %handle, error = %e, "highlights.extract.walk_failed");
            return Extraction::Miss(MissReason::NoHighlights);
        }
    };

    let items: Vec<HighlightMediaItem> = set
        .collections
        .iter()
        .flat_map(|c| expand_collection(handle, set.user_id.as_deref(), c))
        .collect();

    tracing::info!(
        username = %handle,
        user_id = ?set.user_id,
        path = set.path,
        collections = set.collections.len(),
        items = items.len(),
        "highlights.extract.done"
    );
    Extraction::Found(items)
}
