//! HTTP transport used by the [`Fetcher`](super::Fetcher).
//!
//! The transport performs exactly one GET per call; all retry decisions live in
//! the fetcher. Every attempt is described by an immutable [`AttemptContext`]
//! so retries never mutate state shared with other workers.

use super::headers::browser_headers;
use crate::models::{FetchError, FetchFailureKind};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, USER_AGENT};
use reqwest::Client;
use std::error::Error as StdError;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Everything that varies between two attempts at the same URL.
#[derive(Debug, Clone)]
pub struct AttemptContext {
    headers: HeaderMap,
    verify_tls: bool,
}

impl AttemptContext {
    /// A first attempt: browser headers for `user_agent`, certificates verified.
    pub fn new(user_agent: &str) -> Self {
        Self {
            headers: browser_headers(user_agent),
            verify_tls: true,
        }
    }

    /// Same context with a different User-Agent.
    pub fn with_user_agent(&self, user_agent: &str) -> Self {
        Self {
            headers: browser_headers(user_agent),
            verify_tls: self.verify_tls,
        }
    }

    /// Same headers with certificate validation disabled.
    pub fn without_tls_verification(&self) -> Self {
        Self {
            headers: self.headers.clone(),
            verify_tls: false,
        }
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn verify_tls(&self) -> bool {
        self.verify_tls
    }

    pub fn user_agent(&self) -> &str {
        self.headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }
}

/// Status and body of one completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// Empty unless the status is a success.
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One GET request under a given [`AttemptContext`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url, ctx: &AttemptContext) -> Result<RawResponse, FetchError>;
}

/// [`Transport`] backed by two `reqwest` clients: one that validates
/// certificates and one that does not.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    verified: Client,
    unverified: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let verified = Client::builder().timeout(timeout).build()?;
        let unverified = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(true)
            .build()?;
        Ok(Self {
            verified,
            unverified,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(level = "debug", skip_all, fields(%url, verify_tls = ctx.verify_tls()))]
    async fn get(&self, url: &Url, ctx: &AttemptContext) -> Result<RawResponse, FetchError> {
        let client = if ctx.verify_tls() {
            &self.verified
        } else {
            &self.unverified
        };

        let response = client
            .get(url.clone())
            .headers(ctx.headers().clone())
            .send()
            .await
            .map_err(|e| classify(&e))?;

        let status = response.status().as_u16();
        debug!(status, "Received response");

        let body = if response.status().is_success() {
            response.text().await.map_err(|e| classify(&e))?
        } else {
            String::new()
        };
        Ok(RawResponse { status, body })
    }
}

/// Map a `reqwest` error onto the failure taxonomy.
///
/// Certificate problems surface as connect errors, so the source chain is
/// inspected for TLS wording before the generic connect check. The top-level
/// message embeds the request URL and is left out of that check.
pub fn classify(e: &reqwest::Error) -> FetchError {
    let message = error_chain(e);
    let kind = if e.is_timeout() {
        FetchFailureKind::Timeout
    } else if e.source().is_some_and(|source| looks_like_tls(&error_chain(source))) {
        FetchFailureKind::Tls
    } else if e.is_connect() {
        FetchFailureKind::Connect
    } else if e.is_body() || e.is_decode() {
        FetchFailureKind::Body
    } else if let Some(status) = e.status() {
        FetchFailureKind::HttpStatus(status.as_u16())
    } else {
        FetchFailureKind::Other
    };
    FetchError::new(kind, message)
}

fn error_chain(e: &(dyn StdError + 'static)) -> String {
    let mut parts = vec![e.to_string()];
    let mut source = e.source();
    while let Some(inner) = source {
        parts.push(inner.to_string());
        source = inner.source();
    }
    parts.join(": ")
}

fn looks_like_tls(message: &str) -> bool {
    let lower = message.to_lowercase();
    ["certificate", "tls", "ssl", "handshake"]
        .iter()
        .any(|needle| lower.contains(needle))
}
