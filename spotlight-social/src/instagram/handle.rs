//! Username / profile URL normalisation.

use url::Url;

const INSTAGRAM_BASE: &str = "https://www.instagram.com";
const DOMAIN_MARKER: &str = "instagram.com";

/// Accept a raw username or a full profile URL and return the canonical handle.
///
/// Anything past the first path segment (a post, `tagged`, a specific highlight)
/// is dropped: highlight listings are always scoped to the profile. An empty string
/// means nothing usable was present.
///
/// ```
/// use spotlight_social::instagram::normalize_username;
///
/// assert_eq!(normalize_username("@alice"), "alice");
/// assert_eq!(normalize_username("https://www.instagram.com/alice/tagged/"), "alice");
/// assert_eq!(normalize_username("   "), "");
/// ```
pub fn normalize_username(username_or_url: &str) -> String {
    let s = username_or_url.trim();
    if s.is_empty() {
        return String::new();
    }

    if !s.contains(DOMAIN_MARKER) {
        return s
            .trim_matches(|c: char| c == '@' || c == '/' || c.is_whitespace())
            .to_string();
    }

    let Some(url) = parse_profile_url(s) else {
        tracing::debug!(input = %s, "handle.unparseable_url");
        return String::new();
    };

    url.path()
        .trim_matches('/')
        .split('/')
        .next()
        .unwrap_or_default()
        .trim_matches('@')
        .to_string()
}

/// Canonical profile page for a handle.
pub fn profile_url(handle: &str) -> String {
    profile_url_at(INSTAGRAM_BASE, handle)
}

/// Profile page for a handle under another origin (mirror, local test server).
pub fn profile_url_at(base: &str, handle: &str) -> String {
    format!("{}/{handle}/", base.trim_end_matches('/'))
}

/// `instagram.com/alice` has no scheme; `Url` would read it as a relative path.
fn parse_profile_url(s: &str) -> Option<Url> {
    Url::parse(s)
        .ok()
        .filter(|u| u.has_host())
        .or_else(|| Url::parse(&format!("https://{}", s.trim_start_matches('/'))).ok())
}
