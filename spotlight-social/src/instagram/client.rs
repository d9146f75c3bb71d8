//! Fetch-then-extract driver for profile highlights.
//!
//! The network is reduced to [`PageFetcher`]: a URL in, page text or nothing out.
//! Retries, timeouts and headers are the fetcher's business; the scraper only
//! validates the handle, picks the profile URL and hands the page to the pipeline.
use super::extract::extract_for_handle;
use super::handle::{normalize_username, profile_url, profile_url_at};
use super::types::{Extraction, HighlightMediaItem, MissReason};
use async_trait::async_trait;
use spotlight_common::SpotlightError;
use spotlight_http::{HttpClient, RequestOpts};

/// Source of raw page text. `None` means the fetch failed; the reason is logged by
/// the implementation, not propagated.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Option<String>;
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch_page(&self, url: &str) -> Option<String> {
        let opts = RequestOpts {
            allow_absolute: true,
            ..Default::default()
        };
        match self.get_text(url, opts).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(url, error = %e, "scraper.fetch_failed");
                None
            }
        }
    }
}

#[derive(Clone)]
pub struct HighlightScraper<F> {
    fetcher: F,
    /// `None` targets the public site.
    base: Option<String>,
}

impl<F: PageFetcher> HighlightScraper<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            base: None,
        }
    }

    /// Point profile URLs at another origin (mirrors, test servers).
    pub fn with_base(mut self, base: &str) -> Self {
        self.base = Some(base.to_string());
        self
    }

    /// Scrape every highlight media record of one profile.
    ///
    /// Errors only when `username_or_url` holds no usable handle; in that case
    /// nothing is fetched. A failed fetch or an unrecognised page is an empty list.
    pub async fn scrape_highlights(
        &self,
        username_or_url: &str,
    ) -> Result<Vec<HighlightMediaItem>, SpotlightError> {
        Ok(self.scrape(username_or_url).await?.found().unwrap_or_default())
    }

    /// Like [`HighlightScraper::scrape_highlights`] but keeps the reason for a miss.
    pub async fn scrape(
        &self,
        username_or_url: &str,
    ) -> Result<Extraction<Vec<HighlightMediaItem>>, SpotlightError> {
        let handle = normalize_username(username_or_url);
        if handle.is_empty() {
            return Err(SpotlightError::InvalidHandle(username_or_url.to_string()));
        }

        let url = match &self.base {
            Some(base) => profile_url_at(base, &handle),
            None => profile_url(&handle),
        };
        tracing::debug!(%url, "scraper.fetch_profile");

        let Some(html) = self.fetcher.fetch_page(&url).await else {
            tracing::warn!(%url, "scraper.no_html");
            return Ok(Extraction::Miss(MissReason::NoPage));
        };

        Ok(extract_for_handle(&handle, &html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct StaticPages {
        pages: HashMap<String, String>,
        requested: Mutex<Vec<String>>,
    }

    impl StaticPages {
        fn with_page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), html.to_string());
            self
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for StaticPages {
        async fn fetch_page(&self, url: &str) -> Option<String> {
            self.requested.lock().unwrap().push(url.to_string());
            self.pages.get(url).cloned()
        }
    }

    const PAGE: &str = r#"<script>window._sharedData = {"graphql":{"user":{"id":"9","highlight_reels":[{"id":"h1","title":"Trip","items":[{"id":"m1","type":"image","url":"https://cdn.example/m1.jpg"}]}]}}};</script>"#;

    #[tokio::test]
    async fn scrapes_profile_page_for_url_input() {
        let pages = StaticPages::default().with_page("https://www.instagram.com/alice/", PAGE);
        let scraper = HighlightScraper::new(pages);

        let items = scraper
            .scrape_highlights("https://www.instagram.com/alice/tagged/")
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].username, "alice");
        assert_eq!(items[0].media, "https://cdn.example/m1.jpg");
        assert_eq!(scraper.fetcher.requested(), ["https://www.instagram.com/alice/"]);
    }

    #[tokio::test]
    async fn invalid_handle_is_rejected_before_fetching() {
        let scraper = HighlightScraper::new(StaticPages::default());
        let err = scraper.scrape_highlights("  @ ").await.unwrap_err();
        assert!(err.is_input_validation());
        assert!(scraper.fetcher.requested().is_empty());
    }

    #[tokio::test]
    async fn failed_fetch_is_an_empty_list() {
        let scraper = HighlightScraper::new(StaticPages::default());
        assert!(scraper.scrape_highlights("bob").await.unwrap().is_empty());
        assert_eq!(
            scraper.scrape("bob").await.unwrap(),
            Extraction::Miss(MissReason::NoPage)
        );
    }

    #[tokio::test]
    async fn custom_base_is_used_for_profile_urls() {
        let pages = StaticPages::default().with_page("http://127.0.0.1:9/alice/", PAGE);
        let scraper = HighlightScraper::new(pages).with_base("http://127.0.0.1:9/");
        assert_eq!(scraper.scrape_highlights("alice").await.unwrap().len(), 1);
    }
}
