//! Reading the list of profiles to scrape.
use anyhow::{Context, Result};
use std::path::Path;

/// One username or profile URL per line; blank lines and `#` comments are skipped.
pub fn read_inputs(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read input file {}", path.display()))?;
    Ok(parse_inputs(&raw))
}

fn parse_inputs(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
