//! Page acquisition with anti-blocking measures and a bounded retry policy.
//!
//! The [`Fetcher`] wraps a [`Transport`] and applies a fixed policy to every
//! URL it is asked for:
//!
//! 1. Pick a random browser User-Agent and the full browser header set
//! 2. Sleep a random 0.5–2.0 s before each attempt
//! 3. Issue the request with a 10 s timeout
//! 4. On `403`, rotate the User-Agent, wait 1 s and retry once
//! 5. On a certificate/TLS failure, retry once without certificate validation
//! 6. Anything else is final
//!
//! Failures are logged and returned as [`FetchOutcome::Failure`]; the fetcher
//! never returns an error to its caller.

pub mod headers;
pub mod transport;

use crate::models::{FetchError, FetchFailureKind, FetchOutcome, UrlCandidate};
use async_trait::async_trait;
use headers::{fresh_user_agent, RotatingUserAgents, UserAgentSource};
use rand::{rng, Rng};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};
use transport::{AttemptContext, RawResponse, ReqwestTransport, Transport};

/// Timing constants of the anti-blocking policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    pub min_delay: Duration,
    pub max_delay: Duration,
    /// Extra wait before retrying a `403`.
    pub forbidden_backoff: Duration,
    pub timeout: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(500),
            max_delay: Duration::from_millis(2000),
            forbidden_backoff: Duration::from_secs(1),
            timeout: Duration::from_secs(10),
        }
    }
}

impl FetchPolicy {
    #[cfg(test)]
    pub(crate) fn immediate() -> Self {
        Self {
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            forbidden_backoff: Duration::ZERO,
            timeout: Duration::from_secs(5),
        }
    }

    fn jitter(&self) -> Duration {
        if self.max_delay <= self.min_delay {
            return self.min_delay;
        }
        let lo = self.min_delay.as_millis() as u64;
        let hi = self.max_delay.as_millis() as u64;
        Duration::from_millis(rng().random_range(lo..=hi))
    }
}

/// Anything that can turn a candidate URL into a [`FetchOutcome`].
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &UrlCandidate) -> FetchOutcome;
}

/// The production fetcher.
#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    agents: Arc<dyn UserAgentSource>,
    policy: FetchPolicy,
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("policy", &self.policy)
            .finish()
    }
}

impl Fetcher {
    /// A fetcher using `reqwest` and the rotating User-Agent pool.
    pub fn new() -> Result<Self, reqwest::Error> {
        let policy = FetchPolicy::default();
        let transport = ReqwestTransport::new(policy.timeout)?;
        Ok(Self::with_parts(
            Arc::new(transport),
            Arc::new(RotatingUserAgents),
            policy,
        ))
    }

    pub fn with_parts(
        transport: Arc<dyn Transport>,
        agents: Arc<dyn UserAgentSource>,
        policy: FetchPolicy,
    ) -> Self {
        Self {
            transport,
            agents,
            policy,
        }
    }

    async fn attempt(
        &self,
        url: &UrlCandidate,
        ctx: &AttemptContext,
    ) -> Result<RawResponse, FetchError> {
        let delay = self.policy.jitter();
        debug!(?delay, "Throttling before request");
        sleep(delay).await;
        self.transport.get(url.as_url(), ctx).await
    }

    /// Run the first attempt and at most one policy-driven retry.
    async fn fetch_with_retry(&self, url: &UrlCandidate) -> Result<RawResponse, FetchError> {
        let ctx = AttemptContext::new(&self.agents.next_user_agent());

        match self.attempt(url, &ctx).await {
            Ok(resp) if resp.status == 403 => {
                let retry = ctx.with_user_agent(&fresh_user_agent(
                    self.agents.as_ref(),
                    ctx.user_agent(),
                ));
                warn!(%url, "Got 403; rotating User-Agent and retrying once");
                sleep(self.policy.forbidden_backoff).await;
                self.attempt(url, &retry).await
            }
            Err(e) if e.kind == FetchFailureKind::Tls => {
                warn!(%url, error = %e, "TLS failure; retrying once without certificate validation");
                self.attempt(url, &ctx.without_tls_verification()).await
            }
            other => other,
        }
    }
}

#[async_trait]
impl PageFetcher for Fetcher {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &UrlCandidate) -> FetchOutcome {
        let t0 = Instant::now();
        let result = self.fetch_with_retry(url).await.and_then(|resp| {
            if resp.is_success() {
                Ok(resp.body)
            } else {
                Err(FetchError::new(
                    FetchFailureKind::HttpStatus(resp.status),
                    format!("server answered {}", resp.status),
                ))
            }
        });
        let elapsed_ms = t0.elapsed().as_millis() as u64;

        match result {
            Ok(body) => {
                info!(%url, bytes = body.len(), elapsed_ms, "Fetched page");
                FetchOutcome::Success(body)
            }
            Err(e) => {
                warn!(%url, kind = %e.kind, error = %e.message, elapsed_ms, "Fetch failed");
                FetchOutcome::Failure(e)
            }
        }
    }
}
