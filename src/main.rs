//! # Research Compiler
//!
//! An interactive research assistant that searches a topic, previews how much
//! readable content each result holds, then fetches, cleans and compiles the
//! accepted pages into a single DOCX or PDF document.
//!
//! ## Usage
//!
//! ```sh
//! research_compiler
//! research_compiler --output-dir ./research --verbose
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Search**: Discover candidate URLs for the topic (DuckDuckGo HTML)
//! 2. **Preview**: Fetch, extract and clean every candidate, rate its length (5 workers)
//! 3. **Commit**: After confirmation, re-fetch and clean the survivors (5 workers)
//! 4. **Output**: Assemble the articles in search order and write the document

use clap::Parser;
use std::error::Error;
use std::io;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

use research_compiler::cli::Cli;
use research_compiler::config::{load_config, Config};
use research_compiler::fetch::Fetcher;
use research_compiler::pipeline::Pipeline;
use research_compiler::search::DuckDuckGoSearch;
use research_compiler::session::Session;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    // --- Tracing init ---
    let default_level = if args.verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tfmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("research_compiler starting up");
    debug!(?args, "Parsed CLI arguments");

    // ---- Load configuration ----
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    }
    .with_output_dir(args.output_dir.clone());
    let output_dir = config.output_dir();
    info!(output_dir = %output_dir.display(), workers = config.workers(), "Configuration resolved");

    // ---- Wire the pipeline ----
    let fetcher = Fetcher::new()?;
    let search = DuckDuckGoSearch::new(config.search_endpoint.clone())?;
    let pipeline = Pipeline::new(Arc::new(fetcher), config.workers());

    let stdin = io::stdin();
    let mut session = Session::new(
        stdin.lock(),
        io::stdout(),
        Arc::new(search),
        pipeline,
        output_dir,
    );
    if let Err(e) = session.run().await {
        warn!(error = %e, "Terminal I/O failed; ending session");
        return Err(e.into());
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, secs = elapsed.as_secs(), "Session ended");
    Ok(())
}
