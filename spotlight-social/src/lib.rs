//! Social network scrapers and extractors used by Spotlight.
//!
//! Currently only the Instagram highlight pipeline is implemented. The extraction core
//! is pure and synchronous; networking sits behind [`instagram::PageFetcher`].
pub mod instagram;
