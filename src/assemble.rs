//! Renders the committed articles into the single text blob handed to the
//! document writers.

use crate::models::ProcessedArticle;

const DELIMITER_WIDTH: usize = 80;

/// Concatenate articles in order, each framed by `=` delimiter lines and
/// numbered from 1. URLs and ratings are not included.
pub fn assemble(articles: &[ProcessedArticle]) -> String {
    let delimiter = "=".repeat(DELIMITER_WIDTH);
    let mut blob = String::new();
    for (i, article) in articles.iter().enumerate() {
        blob.push_str(&format!(
            "\nArticle {}\n{delimiter}\n\n{}\n\n{delimiter}\n",
            i + 1,
            article.cleaned_text.trim()
        ));
    }
    blob
}
