//! Two-phase scatter/gather over the candidate URLs.
//!
//! A run moves through [`RunStage::Search`] → [`RunStage::Preview`] →
//! [`RunStage::Gate`] → [`RunStage::Commit`] → [`RunStage::Assemble`]. The
//! pipeline owns the two network phases:
//!
//! - **Preview**: fetch → extract → clean → classify every candidate
//! - **Commit**: fetch → extract → clean every candidate that survived preview
//!
//! Both phases fan out over a bounded pool and gather results in submission
//! order through [`ordered_fan_out`]: article numbering always follows the
//! search ranking, never completion timing. A candidate that fails at any
//! step is logged and dropped without affecting its siblings.

use crate::clean::clean;
use crate::extract::extract;
use crate::fetch::PageFetcher;
use crate::models::{FetchOutcome, PreviewEntry, PreviewRating, ProcessedArticle, UrlCandidate};
use crate::preview::classify;
use futures::stream::{self, Stream, StreamExt};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

/// Workers per phase.
pub const DEFAULT_WORKERS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Search,
    Preview,
    Gate,
    Commit,
    Assemble,
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunStage::Search => "search",
            RunStage::Preview => "preview",
            RunStage::Gate => "confirmation",
            RunStage::Commit => "extraction",
            RunStage::Assemble => "assembly",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    NoResults,
    Declined,
    NoContent,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::NoResults => f.write_str("no results found"),
            FailureReason::Declined => f.write_str("declined by operator"),
            FailureReason::NoContent => f.write_str("no usable content"),
        }
    }
}

/// A run that ended before producing a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{stage} stage ended: {reason}")]
pub struct RunFailure {
    pub stage: RunStage,
    pub reason: FailureReason,
}

impl RunFailure {
    pub fn new(stage: RunStage, reason: FailureReason) -> Self {
        Self { stage, reason }
    }
}

/// Run `work` over `items` with at most `workers` units in flight, yielding
/// results in the order the items were submitted.
///
/// Each unit runs as its own tokio task. A unit that panics yields `None` at
/// its position; the remaining units are unaffected.
pub fn ordered_fan_out<T, R, F, Fut>(
    items: Vec<T>,
    workers: usize,
    work: F,
) -> impl Stream<Item = Option<R>>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = R> + Send + 'static,
    R: Send + 'static,
{
    stream::iter(items.into_iter().enumerate())
        .map(move |(index, item)| {
            let unit = work(item);
            async move {
                match tokio::spawn(unit).await {
                    Ok(result) => Some(result),
                    Err(e) => {
                        error!(index, error = %e, "Worker task failed");
                        None
                    }
                }
            }
        })
        .buffered(workers.max(1))
}

/// Fetch a page and reduce it to cleaned text; `None` when any step fails or
/// nothing usable remains.
async fn acquire(fetcher: &dyn PageFetcher, url: &UrlCandidate) -> Option<String> {
    let raw = match fetcher.fetch(url).await {
        FetchOutcome::Success(raw) => raw,
        FetchOutcome::Failure(_) => return None,
    };
    let cleaned = clean(&extract(&raw));
    if cleaned.is_empty() {
        warn!(%url, "No usable content after extraction");
        return None;
    }
    Some(cleaned)
}

async fn preview_one(fetcher: Arc<dyn PageFetcher>, url: UrlCandidate) -> Option<PreviewRating> {
    let text = acquire(fetcher.as_ref(), &url).await?;
    let rating = classify(&text)?;
    debug!(%url, %rating, "Previewed candidate");
    Some(rating)
}

async fn commit_one(fetcher: Arc<dyn PageFetcher>, url: UrlCandidate) -> Option<ProcessedArticle> {
    let cleaned_text = acquire(fetcher.as_ref(), &url).await?;
    Some(ProcessedArticle { url, cleaned_text })
}

/// The preview and commit phases over a shared fetcher.
#[derive(Clone)]
pub struct Pipeline {
    fetcher: Arc<dyn PageFetcher>,
    workers: usize,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("workers", &self.workers)
            .finish()
    }
}

impl Pipeline {
    pub fn new(fetcher: Arc<dyn PageFetcher>, workers: usize) -> Self {
        Self {
            fetcher,
            workers: workers.max(1),
        }
    }

    /// Rate every candidate. Entries keep their 1-based search position.
    #[instrument(level = "info", skip_all, fields(candidates = candidates.len(), workers = self.workers))]
    pub async fn preview(&self, candidates: &[UrlCandidate]) -> Result<Vec<PreviewEntry>, RunFailure> {
        let fetcher = Arc::clone(&self.fetcher);
        let results: Vec<Option<Option<PreviewRating>>> =
            ordered_fan_out(candidates.to_vec(), self.workers, move |url| {
                preview_one(Arc::clone(&fetcher), url)
            })
            .collect()
            .await;

        let entries: Vec<PreviewEntry> = candidates
            .iter()
            .zip(results)
            .enumerate()
            .filter_map(|(i, (candidate, result))| {
                result.flatten().map(|rating| PreviewEntry {
                    position: i + 1,
                    candidate: candidate.clone(),
                    rating,
                })
            })
            .collect();

        info!(
            total = candidates.len(),
            previewed = entries.len(),
            "Preview phase complete"
        );
        if entries.is_empty() {
            return Err(RunFailure::new(RunStage::Preview, FailureReason::NoContent));
        }
        Ok(entries)
    }

    /// Fully process the previewed candidates.
    pub async fn commit(&self, entries: &[PreviewEntry]) -> Result<Vec<ProcessedArticle>, RunFailure> {
        self.commit_with_progress(entries, |_, _| {}).await
    }

    /// Like [`Pipeline::commit`], calling `progress(i, n)` as the i-th result
    /// (1-based, submission order) is collected.
    #[instrument(level = "info", skip_all, fields(entries = entries.len(), workers = self.workers))]
    pub async fn commit_with_progress<P>(
        &self,
        entries: &[PreviewEntry],
        mut progress: P,
    ) -> Result<Vec<ProcessedArticle>, RunFailure>
    where
        P: FnMut(usize, usize),
    {
        let total = entries.len();
        let fetcher = Arc::clone(&self.fetcher);
        let urls: Vec<UrlCandidate> = entries.iter().map(|e| e.candidate.clone()).collect();

        let mut results = Box::pin(ordered_fan_out(urls, self.workers, move |url| {
            commit_one(Arc::clone(&fetcher), url)
        }));

        let mut articles = Vec::with_capacity(total);
        let mut collected = 0;
        while let Some(result) = results.next().await {
            collected += 1;
            progress(collected, total);
            if let Some(article) = result.flatten() {
                articles.push(article);
            }
        }

        info!(total, extracted = articles.len(), "Commit phase complete");
        if articles.is_empty() {
            return Err(RunFailure::new(RunStage::Commit, FailureReason::NoContent));
        }
        Ok(articles)
    }
}
