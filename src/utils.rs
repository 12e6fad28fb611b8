//! Utility functions for file naming, log formatting and output directories.
//!
//! This module provides helper functions used throughout the application:
//! - Filename sanitization for operator-supplied document names
//! - String truncation for logging long payloads
//! - Output directory creation and write validation

use crate::outputs::OutputError;
use chrono::Local;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

static FORBIDDEN_FILENAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("static regex"));

/// Remove characters that are invalid in filenames and trim whitespace.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(sanitize_filename("a:b*c?d"), "abcd");
/// assert_eq!(sanitize_filename("  name  "), "name");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    FORBIDDEN_FILENAME_CHARS
        .replace_all(name, "")
        .trim()
        .to_string()
}

/// Name used when the operator's filename sanitizes to nothing.
pub fn fallback_filename() -> String {
    format!("research_{}", Local::now().date_naive())
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut at the last character boundary at or before `max`
/// bytes, with an ellipsis and the number of dropped bytes appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory (and parents) if it doesn't exist, then performs a
/// write test by creating and immediately deleting a probe file.
///
/// # Errors
///
/// - [`OutputError::CreateDir`] if the directory cannot be created
/// - [`OutputError::NotWritable`] if the probe file cannot be written
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_output_dir(path: &Path) -> Result<(), OutputError> {
    let existed = fs::try_exists(path).await.unwrap_or(false);
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(OutputError::CreateDir {
            path: path.to_path_buf(),
            source: e,
        });
    }
    if !existed {
        info!("Created output directory");
    }

    let probe_path = path.join("..__probe_write__");
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(OutputError::NotWritable {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("a:b*c?d"), "abcd");
        assert_eq!(sanitize_filename("  name  "), "name");
        assert_eq!(sanitize_filename(r#"<x>"y"/z\w|"#), "xyzw");
        assert_eq!(sanitize_filename(" ?* "), "");
    }

    #[test]
    fn test_fallback_filename() {
        let name = fallback_filename();
        assert!(name.starts_with("research_"));
        assert_eq!(sanitize_filename(&name), name);
    }

    #[test]
    fn test_truncate_for_log() {
        let long = "x".repeat(300);
        let cases = [
            ("", 10, String::new()),
            ("under limit", 100, "under limit".to_string()),
            ("exact", 5, "exact".to_string()),
            (long.as_str(), 120, format!("{}…(+180 bytes)", "x".repeat(120))),
            ("ééé", 3, "é…(+4 bytes)".to_string()),
            ("aé", 2, "a…(+2 bytes)".to_string()),
        ];
        for (input, max, expected) in cases {
            assert_eq!(truncate_for_log(input, max), expected, "input={input:?} max={max}");
        }
    }

    #[tokio::test]
    async fn test_ensure_output_dir_creates_nested() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("a").join("Customer Research");

        ensure_output_dir(&target).await.unwrap();

        assert!(target.is_dir());
        assert!(!target.join("..__probe_write__").exists());
    }

    #[tokio::test]
    async fn test_ensure_output_dir_fails_when_path_is_a_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("occupied");
        std::fs::write(&file, "x").unwrap();

        let err = ensure_output_dir(&file).await.unwrap_err();
        assert!(matches!(err, OutputError::CreateDir { .. }));
    }
}
