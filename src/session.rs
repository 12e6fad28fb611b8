//! The interactive research loop.
//!
//! One pass of the loop is a run: topic → search → preview → confirmation →
//! extraction → document. A run that ends early (no results, no content,
//! declined, or a failed save) asks whether to start over; the loop only exits
//! on the operator's choice or end of input.
//!
//! The session is written against `BufRead`/`Write` so tests can script it.

use crate::assemble::assemble;
use crate::models::UrlCandidate;
use crate::outputs::{write_document, DocumentFormat, OutputError};
use crate::pipeline::{FailureReason, Pipeline, RunFailure, RunStage};
use crate::search::{SearchProvider, MAX_RESULTS, MIN_RESULTS};
use crate::utils::{ensure_output_dir, fallback_filename, sanitize_filename};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// How a single run ended.
#[derive(Debug)]
pub enum RunOutcome {
    Saved(PathBuf),
    Failed(RunFailure),
    OutputFailed(OutputError),
    /// Input ended mid-run.
    Interrupted,
}

pub struct Session<R, W> {
    input: R,
    output: W,
    search: Arc<dyn SearchProvider>,
    pipeline: Pipeline,
    output_dir: PathBuf,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(
        input: R,
        output: W,
        search: Arc<dyn SearchProvider>,
        pipeline: Pipeline,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            input,
            output,
            search,
            pipeline,
            output_dir,
        }
    }

    /// Run until the operator chooses to stop or input ends.
    pub async fn run(&mut self) -> io::Result<()> {
        loop {
            writeln!(self.output, "\nWelcome to the Research Assistant!")?;
            let again = match self.run_once().await? {
                RunOutcome::Saved(_) => {
                    writeln!(self.output, "\nResearch compilation complete!")?;
                    self.confirm("\nWould you like to perform another search? (yes/no): ")?
                }
                RunOutcome::Failed(_) | RunOutcome::OutputFailed(_) => {
                    self.confirm("\nWould you like to try another search? (yes/no): ")?
                }
                RunOutcome::Interrupted => false,
            };
            if !again {
                break;
            }
        }
        writeln!(self.output, "\nThank you for using the Research Assistant!")?;
        self.output.flush()
    }

    /// One full run from topic to saved document.
    #[instrument(level = "info", skip_all)]
    pub async fn run_once(&mut self) -> io::Result<RunOutcome> {
        let Some(topic) = self.prompt("Enter your research topic: ")? else {
            return Ok(RunOutcome::Interrupted);
        };
        let Some(count) = self.prompt_count()? else {
            return Ok(RunOutcome::Interrupted);
        };

        writeln!(self.output, "\nSearching DuckDuckGo...")?;
        let candidates = self.find_candidates(&topic, count).await;
        if candidates.is_empty() {
            writeln!(self.output, "No results found.")?;
            return Ok(fail(RunStage::Search, FailureReason::NoResults));
        }

        writeln!(
            self.output,
            "\nFound {} URLs. Analyzing content length...",
            candidates.len()
        )?;
        let previews = match self.pipeline.preview(&candidates).await {
            Ok(previews) => previews,
            Err(failure) => {
                writeln!(self.output, "No valid content found.")?;
                return Ok(RunOutcome::Failed(failure));
            }
        };
        for entry in &previews {
            writeln!(self.output, "\nURL {}: {}", entry.position, entry.candidate)?;
            writeln!(self.output, "Expected Content Length: {}", entry.rating)?;
        }

        match self.prompt("\nWould you like to proceed with content extraction? (yes/no): ")? {
            None => return Ok(RunOutcome::Interrupted),
            Some(answer) if is_yes(&answer) => {}
            Some(_) => return Ok(fail(RunStage::Gate, FailureReason::Declined)),
        }

        let output = &mut self.output;
        let mut progress_error = None;
        let committed = self
            .pipeline
            .commit_with_progress(&previews, |i, n| {
                if progress_error.is_none() {
                    if let Err(e) = writeln!(output, "\nExtracting content from URL {i}/{n}") {
                        progress_error = Some(e);
                    }
                }
            })
            .await;
        if let Some(e) = progress_error {
            return Err(e);
        }
        let articles = match committed {
            Ok(articles) => articles,
            Err(failure) => {
                writeln!(self.output, "No valid content extracted.")?;
                return Ok(RunOutcome::Failed(failure));
            }
        };

        if let Err(e) = ensure_output_dir(&self.output_dir).await {
            error!(error = %e, "Output directory unavailable");
            writeln!(self.output, "Error creating directory: {e}")?;
            return Ok(RunOutcome::OutputFailed(e));
        }

        let Some(format) = self.prompt_format()? else {
            return Ok(RunOutcome::Interrupted);
        };
        let Some(raw_name) =
            self.prompt("\nEnter a name for your research file (without extension): ")?
        else {
            return Ok(RunOutcome::Interrupted);
        };
        let mut name = sanitize_filename(&raw_name);
        if name.is_empty() {
            name = fallback_filename();
        }

        let blob = assemble(&articles);
        match write_document(format, &blob, &self.output_dir, &name).await {
            Ok(path) => {
                writeln!(
                    self.output,
                    "\nYour file has been saved to: {}",
                    self.output_dir.display()
                )?;
                writeln!(self.output, "Filename: {name}.{}", format.extension())?;
                info!(path = %path.display(), articles = articles.len(), "Run complete");
                Ok(RunOutcome::Saved(path))
            }
            Err(e) => {
                writeln!(self.output, "Error saving file: {e}")?;
                Ok(RunOutcome::OutputFailed(e))
            }
        }
    }

    async fn find_candidates(&self, topic: &str, count: usize) -> Vec<UrlCandidate> {
        match self.search.search(topic, count).await {
            Ok(candidates) => candidates,
            Err(e) => {
                error!(error = %e, "Search failed");
                Vec::new()
            }
        }
    }

    /// Print `question` and read one trimmed line; `None` at end of input.
    fn prompt(&mut self, question: &str) -> io::Result<Option<String>> {
        write!(self.output, "{question}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        Ok(self.prompt(question)?.is_some_and(|a| is_yes(&a)))
    }

    fn prompt_count(&mut self) -> io::Result<Option<usize>> {
        loop {
            let question = format!(
                "\nHow many URLs would you like to analyze? ({MIN_RESULTS}-{MAX_RESULTS}): "
            );
            let Some(answer) = self.prompt(&question)? else {
                return Ok(None);
            };
            match answer.parse::<usize>() {
                Ok(n) if (MIN_RESULTS..=MAX_RESULTS).contains(&n) => return Ok(Some(n)),
                Ok(_) => writeln!(
                    self.output,
                    "Please enter a number between {MIN_RESULTS} and {MAX_RESULTS}."
                )?,
                Err(_) => writeln!(self.output, "Please enter a valid number.")?,
            }
        }
    }

    fn prompt_format(&mut self) -> io::Result<Option<DocumentFormat>> {
        writeln!(self.output, "\nChoose file format:\n1. DOCX\n2. PDF")?;
        loop {
            let Some(answer) = self.prompt("Enter your choice (1 or 2): ")? else {
                return Ok(None);
            };
            match DocumentFormat::from_choice(&answer) {
                Some(format) => return Ok(Some(format)),
                None => writeln!(self.output, "Please enter either 1 for DOCX or 2 for PDF.")?,
            }
        }
    }
}

fn fail(stage: RunStage, reason: FailureReason) -> RunOutcome {
    RunOutcome::Failed(RunFailure::new(stage, reason))
}

fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::PageFetcher;
    use crate::models::{FetchError, FetchFailureKind, FetchOutcome};
    use crate::search::SearchError;
    use async_trait::async_trait;
    use std::io::Cursor;
    use tempfile::TempDir;

    struct FixedSearch(Vec<&'static str>);

    #[async_trait]
    impl SearchProvider for FixedSearch {
        async fn search(
            &self,
            _query: &str,
            max_results: usize,
        ) -> Result<Vec<UrlCandidate>, SearchError> {
            Ok(self
                .0
                .iter()
                .filter_map(|u| UrlCandidate::parse(u))
                .take(max_results)
                .collect())
        }
    }

    /// Serves an article for `good` URLs and fails everything else.
    struct GoodOrBad;

    #[async_trait]
    impl PageFetcher for GoodOrBad {
        async fn fetch(&self, url: &UrlCandidate) -> FetchOutcome {
            if url.as_str().contains("good") {
                let words = vec!["insight"; 40].join(" ");
                FetchOutcome::Success(format!("<article><p>{words}</p></article>"))
            } else {
                FetchOutcome::Failure(FetchError::new(FetchFailureKind::HttpStatus(404), "gone"))
            }
        }
    }

    fn session(
        script: &str,
        urls: Vec<&'static str>,
        dir: PathBuf,
    ) -> Session<Cursor<Vec<u8>>, Vec<u8>> {
        Session::new(
            Cursor::new(script.as_bytes().to_vec()),
            Vec::new(),
            Arc::new(FixedSearch(urls)),
            Pipeline::new(Arc::new(GoodOrBad), 5),
            dir,
        )
    }

    fn transcript(session: &Session<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8_lossy(&session.output).into_owned()
    }

    #[tokio::test]
    async fn test_full_run_saves_document() {
        let tmp = TempDir::new().unwrap();
        let out_dir = tmp.path().join("Customer Research");
        let mut s = session(
            "rust concurrency\nabc\n30\n3\nyes\n7\n2\nmy:report?\nno\n",
            vec!["https://bad.example/", "https://good.example/one", "https://good.example/two"],
            out_dir.clone(),
        );

        s.run().await.unwrap();

        let text = transcript(&s);
        assert!(text.contains("Please enter a valid number."));
        assert!(text.contains("Please enter a number between 1 and 20."));
        assert!(text.contains("URL 2: https://good.example/one"));
        assert!(text.contains("URL 3: https://good.example/two"));
        assert!(!text.contains("URL 1:"));
        assert!(text.contains("Expected Content Length: Short (1/3)"));
        assert!(text.contains("Extracting content from URL 2/2"));
        assert!(text.contains("Please enter either 1 for DOCX or 2 for PDF."));
        assert!(text.contains("Filename: myreport.pdf"));
        assert!(text.ends_with("Thank you for using the Research Assistant!\n"));
        assert!(out_dir.join("myreport.pdf").is_file());
    }

    #[tokio::test]
    async fn test_declined_gate_saves_nothing() {
        let tmp = TempDir::new().unwrap();
        let mut s = session(
            "topic\n1\nno\n",
            vec!["https://good.example/"],
            tmp.path().to_path_buf(),
        );

        let outcome = s.run_once().await.unwrap();

        match outcome {
            RunOutcome::Failed(f) => {
                assert_eq!(f, RunFailure::new(RunStage::Gate, FailureReason::Declined))
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_no_content_offers_retry_then_exits() {
        let tmp = TempDir::new().unwrap();
        let mut s = session(
            "topic\n2\nno\n",
            vec!["https://bad.example/1", "https://bad.example/2"],
            tmp.path().to_path_buf(),
        );

        s.run().await.unwrap();

        let text = transcript(&s);
        assert!(text.contains("No valid content found."));
        assert!(text.contains("Would you like to try another search?"));
        assert_eq!(text.matches("Welcome to the Research Assistant!").count(), 1);
    }

    #[tokio::test]
    async fn test_empty_search_results_fail_the_run() {
        let tmp = TempDir::new().unwrap();
        let mut s = session("topic\n5\n", vec![], tmp.path().to_path_buf());

        let outcome = s.run_once().await.unwrap();

        assert!(matches!(
            outcome,
            RunOutcome::Failed(RunFailure {
                stage: RunStage::Search,
                reason: FailureReason::NoResults
            })
        ));
        assert!(transcript(&s).contains("No results found."));
    }

    #[tokio::test]
    async fn test_empty_filename_uses_fallback() {
        let tmp = TempDir::new().unwrap();
        let mut s = session(
            "topic\n1\nyes\n1\n  ::  \n",
            vec!["https://good.example/"],
            tmp.path().to_path_buf(),
        );

        let outcome = s.run_once().await.unwrap();

        match outcome {
            RunOutcome::Saved(path) => {
                let name = path.file_name().unwrap().to_string_lossy().into_owned();
                assert!(name.starts_with("research_"));
                assert!(name.ends_with(".docx"));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_end_of_input_interrupts() {
        let tmp = TempDir::new().unwrap();
        let mut s = session("topic\n", vec![], tmp.path().to_path_buf());

        assert!(matches!(s.run_once().await.unwrap(), RunOutcome::Interrupted));
    }

    /// Accepts prompts but fails once extraction progress is printed.
    struct ProgressBreaks(Vec<u8>);

    impl Write for ProgressBreaks {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if String::from_utf8_lossy(buf).contains("Extracting") {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal closed"));
            }
            self.0.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_progress_write_failure_is_returned() {
        let tmp = TempDir::new().unwrap();
        let mut s = Session::new(
            Cursor::new(b"topic\n1\nyes\n1\nreport\n".to_vec()),
            ProgressBreaks(Vec::new()),
            Arc::new(FixedSearch(vec!["https://good.example/"])),
            Pipeline::new(Arc::new(GoodOrBad), 5),
            tmp.path().to_path_buf(),
        );

        let err = s.run_once().await.unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(!tmp.path().join("report.docx").exists());
    }

    #[test]
    fn test_is_yes() {
        assert!(is_yes("yes"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("y"));
        assert!(!is_yes("no"));
    }
}
