//! Data models shared by the acquisition pipeline.
//!
//! This module defines the values that flow between the pipeline stages:
//! - [`UrlCandidate`]: a validated URL returned by the search step
//! - [`FetchOutcome`]: the tagged result of fetching one candidate
//! - [`PreviewRating`] / [`PreviewEntry`]: the volume estimate shown before committing
//! - [`ProcessedArticle`]: the cleaned text of one candidate after the commit pass
//!
//! Search order is significant everywhere: every collection in this module is
//! kept in the order the search provider returned the candidates.

use std::fmt;
use thiserror::Error;
use url::Url;

/// A web address returned by the search step, not yet fetched.
///
/// Only constructed from a successfully parsed absolute `http`/`https` URL, so
/// downstream stages never have to re-validate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlCandidate(Url);

impl UrlCandidate {
    /// Validate a raw string into a candidate.
    ///
    /// Returns `None` for anything that is not an absolute `http`/`https` URL.
    pub fn parse(raw: &str) -> Option<Self> {
        let url = Url::parse(raw.trim()).ok()?;
        match url.scheme() {
            "http" | "https" => Some(Self(url)),
            _ => None,
        }
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UrlCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Why a fetch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchFailureKind {
    /// The request did not complete within the per-request timeout.
    Timeout,
    /// The connection could not be established.
    Connect,
    /// Certificate or TLS handshake validation failed.
    Tls,
    /// The server answered with a non-success status.
    HttpStatus(u16),
    /// The response body could not be read or decoded.
    Body,
    /// Any other transport failure.
    Other,
}

impl fmt::Display for FetchFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchFailureKind::Timeout => f.write_str("timeout"),
            FetchFailureKind::Connect => f.write_str("connection failure"),
            FetchFailureKind::Tls => f.write_str("TLS failure"),
            FetchFailureKind::HttpStatus(code) => write!(f, "HTTP {code}"),
            FetchFailureKind::Body => f.write_str("unreadable body"),
            FetchFailureKind::Other => f.write_str("transport error"),
        }
    }
}

/// A failed fetch, carried inside [`FetchOutcome::Failure`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FetchFailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FetchFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Tagged result of fetching one URL. Never partially filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The raw page markup.
    Success(String),
    Failure(FetchError),
}

/// Content volume label derived from the word count of cleaned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PreviewRating {
    Short,
    Medium,
    Long,
}

impl PreviewRating {
    /// Words below this count rate as [`PreviewRating::Short`].
    pub const MEDIUM_THRESHOLD: usize = 500;
    /// Words at or above this count rate as [`PreviewRating::Long`].
    pub const LONG_THRESHOLD: usize = 2000;

    pub fn from_word_count(words: usize) -> Self {
        if words < Self::MEDIUM_THRESHOLD {
            PreviewRating::Short
        } else if words < Self::LONG_THRESHOLD {
            PreviewRating::Medium
        } else {
            PreviewRating::Long
        }
    }

    /// Numeric level out of 3.
    pub fn level(self) -> u8 {
        match self {
            PreviewRating::Short => 1,
            PreviewRating::Medium => 2,
            PreviewRating::Long => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PreviewRating::Short => "Short",
            PreviewRating::Medium => "Medium",
            PreviewRating::Long => "Long",
        }
    }
}

impl fmt::Display for PreviewRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}/3)", self.label(), self.level())
    }
}

/// A candidate that survived the preview pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewEntry {
    /// 1-based position of the candidate in the search results.
    pub position: usize,
    pub candidate: UrlCandidate,
    pub rating: PreviewRating,
}

/// The cleaned text of one candidate after the commit pass. Identity is the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedArticle {
    pub url: UrlCandidate,
    pub cleaned_text: String,
}
