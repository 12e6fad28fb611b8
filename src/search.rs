//! Candidate discovery through a web search provider.
//!
//! Providers return raw [`SearchHit`]s, which are validated into
//! [`UrlCandidate`]s at this boundary. Result order is preserved and
//! duplicates are kept: downstream stages treat the provider's ranking as the
//! canonical article order.

use crate::fetch::headers::{browser_headers, RotatingUserAgents, UserAgentSource};
use crate::models::UrlCandidate;
use crate::utils::truncate_for_log;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://html.duckduckgo.com/html/";
pub const MIN_RESULTS: usize = 1;
pub const MAX_RESULTS: usize = 20;

static RESULT_LINKS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.result__a[href]").expect("static selector"));

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("search provider answered HTTP {0}")]
    Status(u16),
}

/// A result link as it appears on the provider's page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchHit {
    /// A plain link to the target page.
    Direct(String),
    /// A provider redirect link carrying the target in its `uddg` parameter.
    Redirect(String),
}

impl SearchHit {
    fn from_href(href: &str) -> Self {
        if href.contains("uddg=") {
            SearchHit::Redirect(href.to_string())
        } else {
            SearchHit::Direct(href.to_string())
        }
    }

    /// Resolve and validate the hit. Provider-internal links (ads, tracking)
    /// are rejected.
    pub fn into_candidate(self) -> Option<UrlCandidate> {
        let target = match self {
            SearchHit::Direct(href) => href,
            SearchHit::Redirect(href) => {
                let start = href.find("uddg=")? + "uddg=".len();
                let encoded = href[start..].split('&').next().unwrap_or_default();
                urlencoding::decode(encoded).ok()?.into_owned()
            }
        };
        let candidate = UrlCandidate::parse(&target)?;
        let internal = candidate
            .as_url()
            .host_str()
            .is_some_and(|host| host == "duckduckgo.com" || host.ends_with(".duckduckgo.com"));
        if internal { None } else { Some(candidate) }
    }
}

/// Clamp an operator-requested result count into the accepted range.
pub fn clamp_results(requested: usize) -> usize {
    requested.clamp(MIN_RESULTS, MAX_RESULTS)
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Up to `max_results` candidates in provider order.
    async fn search(&self, query: &str, max_results: usize)
    -> Result<Vec<UrlCandidate>, SearchError>;
}

/// Searches through DuckDuckGo's HTML interface (no API key required).
#[derive(Debug, Clone)]
pub struct DuckDuckGoSearch {
    client: Client,
    endpoint: String,
}

impl DuckDuckGoSearch {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, SearchError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    #[instrument(level = "info", skip(self), fields(endpoint = %self.endpoint))]
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<UrlCandidate>, SearchError> {
        let max_results = clamp_results(max_results);
        let response = self
            .client
            .post(&self.endpoint)
            .headers(browser_headers(&RotatingUserAgents.next_user_agent()))
            .form(&[("q", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Search provider rejected request");
            return Err(SearchError::Status(status.as_u16()));
        }

        let html = response.text().await?;
        let candidates = parse_results(&html, max_results);
        if candidates.is_empty() {
            debug!(page = %truncate_for_log(&html, 300), "No usable result links on page");
        }
        info!(count = candidates.len(), "Search returned candidates");
        Ok(candidates)
    }
}

/// Pull validated candidates out of a DuckDuckGo HTML result page.
pub fn parse_results(html: &str, max_results: usize) -> Vec<UrlCandidate> {
    let document = Html::parse_document(html);
    document
        .select(&RESULT_LINKS)
        .filter_map(|link| link.value().attr("href"))
        .filter_map(|href| {
            let candidate = SearchHit::from_href(href).into_candidate();
            if candidate.is_none() {
                debug!(href, "Dropped unusable search hit");
            }
            candidate
        })
        .take(max_results)
        .collect()
}
