//! Document writers for the compiled research blob.
//!
//! # Submodules
//!
//! - [`docx`]: the blob as a single paragraph of a WordprocessingML package
//! - [`pdf`]: the blob word-wrapped onto US-Letter pages
//!
//! Both renderers produce bytes in memory; [`write_document`] puts them on
//! disk as `{dir}/{name}.{ext}`.

pub mod docx;
pub mod pdf;

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{error, info, instrument};

/// Directory name created under the desktop (or home) directory.
pub const OUTPUT_FOLDER: &str = "Customer Research";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("could not create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("output directory {path} is not writable: {source}")]
    NotWritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not encode document: {0}")]
    Encode(String),

    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Docx,
    Pdf,
}

impl DocumentFormat {
    /// Map the operator's menu choice (`1` or `2`).
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(DocumentFormat::Docx),
            "2" => Some(DocumentFormat::Pdf),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Docx => "docx",
            DocumentFormat::Pdf => "pdf",
        }
    }

    pub fn render(self, blob: &str) -> Result<Vec<u8>, OutputError> {
        match self {
            DocumentFormat::Docx => docx::render(blob),
            DocumentFormat::Pdf => pdf::render(blob),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Docx => f.write_str("DOCX"),
            DocumentFormat::Pdf => f.write_str("PDF"),
        }
    }
}

/// `<Desktop>/Customer Research`, or `<home>/Customer Research` when the
/// platform has no desktop directory.
pub fn default_output_dir() -> PathBuf {
    dirs::desktop_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(OUTPUT_FOLDER)
}

/// Render `blob` in `format` and write it to `{dir}/{name}.{ext}`.
#[instrument(level = "info", skip_all, fields(dir = %dir.display(), %format, %name))]
pub async fn write_document(
    format: DocumentFormat,
    blob: &str,
    dir: &Path,
    name: &str,
) -> Result<PathBuf, OutputError> {
    let bytes = format.render(blob)?;
    let path = dir.join(format!("{name}.{}", format.extension()));

    if let Err(e) = fs::write(&path, &bytes).await {
        error!(path = %path.display(), error = %e, "Failed writing document");
        return Err(OutputError::Write { path, source: e });
    }
    info!(path = %path.display(), bytes = bytes.len(), "Wrote document");
    Ok(path)
}
