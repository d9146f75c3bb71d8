//! Common types and utilities shared across Spotlight crates.
//!
//! This crate defines the shared error type and observability helpers used throughout
//! the Spotlight workspace. It is intentionally lightweight so that every crate can
//! depend on it without introducing heavy transitive costs.
//!
//! # Overview
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`SpotlightError`] and [`Result`]: Shared error handling
//!
//! # Examples
//!
//! An empty handle is the one failure callers must surface:
//!
//! ```rust
//! use spotlight_common::SpotlightError;
//!
//! let err = SpotlightError::InvalidHandle("   ".into());
//! assert!(err.is_input_validation());
//! assert_eq!(err.to_string(), "could not normalize username from '   '");
//! ```

pub mod observability;

/// Error types used across the Spotlight system.
///
/// Extraction misses are not listed: a page that changed format yields an
/// empty result, not an error. Only problems the caller can act on live here.
#[derive(thiserror::Error, Debug)]
pub enum SpotlightError {
    /// The raw username/URL did not contain a usable handle.
    #[error("could not normalize username from '{0}'")]
    InvalidHandle(String),

    /// Writing exported records failed.
    #[error("export failed: {0}")]
    Export(#[from] std::io::Error),

    /// Records could not be serialized.
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl SpotlightError {
    /// True when the caller supplied bad input and must not proceed to fetch/parse.
    pub fn is_input_validation(&self) -> bool {
        matches!(self, SpotlightError::InvalidHandle(_))
    }
}

/// Convenient alias for results that use [`SpotlightError`].
pub type Result<T> = std::result::Result<T, SpotlightError>;
