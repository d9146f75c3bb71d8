//! JSON export of scraped records.
use chrono::{DateTime, Utc};
use spotlight_common::Result;
use spotlight_social::instagram::HighlightMediaItem;
use std::path::{Path, PathBuf};

/// Write `items` as a pretty-printed JSON array, creating parent directories.
pub fn export_highlights_to_json(items: &[HighlightMediaItem], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let body = serde_json::to_string_pretty(items)?;
    std::fs::write(path, body)?;
    tracing::info!(path = %path.display(), items = items.len(), "export.json.written");
    Ok(())
}

/// Resolve where the export goes.
///
/// An explicit file path is used as-is; an existing directory gets a timestamped
/// file inside it; no argument means `<data_dir>/highlights_<ts>.json`.
pub fn determine_output_path(output: Option<&Path>, data_dir: &Path, now: DateTime<Utc>) -> PathBuf {
    let file_name = format!("highlights_{}.json", now.format("%Y%m%d_%H%M%S"));
    match output {
        Some(p) if p.is_dir() => p.join(file_name),
        Some(p) => p.to_path_buf(),
        None => data_dir.join(file_name),
    }
}
