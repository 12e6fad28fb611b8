//! Content-volume rating shown to the operator before the commit pass.

use crate::clean::word_count;
use crate::models::PreviewRating;

/// Rate cleaned text by word count; `None` for empty or whitespace-only text.
pub fn classify(text: &str) -> Option<PreviewRating> {
    match word_count(text) {
        0 => None,
        words => Some(PreviewRating::from_word_count(words)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn test_classify_boundaries() {
        let cases = [
            (1, PreviewRating::Short, 1),
            (499, PreviewRating::Short, 1),
            (500, PreviewRating::Medium, 2),
            (1999, PreviewRating::Medium, 2),
            (2000, PreviewRating::Long, 3),
        ];
        for (count, rating, level) in cases {
            let got = classify(&words(count)).unwrap();
            assert_eq!(got, rating, "word_count={count}");
            assert_eq!(got.level(), level);
        }
    }

    #[test]
    fn test_classify_skips_empty_text() {
        assert_eq!(classify(""), None);
        assert_eq!(classify(" \n\t "), None);
    }
}
