//! Best-effort text normalization for extracted page text.
//!
//! The passes run in a fixed order. Contact artifacts (emails, handles, URLs)
//! are removed before the final punctuation strip so no fragments of them
//! survive as stray words.

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

static CITATIONS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\d+\]|\[citation needed\]|\(cite:.*?\)|\[\w+\s\d{4}\]").expect("static regex")
});

static BOILERPLATE: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)copyright ©.*",
        r"(?i)all rights reserved.*",
        r"(?i)terms (?:of use|of service).*",
        r"(?i)privacy policy.*",
        r"(?i)follow us on.*",
        r"(?i)share this:.*",
        r"(?i)subscribe to our newsletter.*",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static regex"))
    .collect()
});

static EMAILS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\w.-]+@[\w.-]+\.\w+").expect("static regex"));
static HANDLES: Lazy<Regex> = Lazy::new(|| Regex::new(r"@\w+").expect("static regex"));
static URLS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)https?://\S+|www\.\S+").expect("static regex"));

static NAV_TOKENS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:skip to content|back to top|menu|home|about|contact|search)\b")
        .expect("static regex")
});

static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n+").expect("static regex"));
static DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s.,!?-]").expect("static regex"));

/// Normalize extracted text.
///
/// Removes citation markers, legal and social boilerplate, contact details,
/// navigation words and stray symbols, then collapses whitespace.
pub fn clean(text: &str) -> String {
    let text = CITATIONS.replace_all(text, "");

    let mut text = text.into_owned();
    for pattern in BOILERPLATE.iter() {
        text = pattern.replace_all(&text, "").into_owned();
    }

    let text = EMAILS.replace_all(&text, "");
    let text = HANDLES.replace_all(&text, "");
    let text = URLS.replace_all(&text, "");
    let text = NAV_TOKENS.replace_all(&text, "");

    let text = text.split_whitespace().join(" ");
    let text = BLANK_LINES.replace_all(&text, "\n\n");
    let text = DISALLOWED.replace_all(&text, " ");

    text.trim().to_string()
}

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_citations() {
        let out = clean("Rust is fast[1] and safe[23][citation needed] (cite: Smith) [Jones 2019] indeed");
        assert_eq!(out, "Rust is fast and safe indeed");
    }

    #[test]
    fn test_removes_boilerplate_to_end_of_line() {
        let out = clean("Body text here.\nCopyright © 2024 Example Corp\nAll Rights Reserved worldwide\nMore body.");
        assert!(out.contains("Body text here."));
        assert!(out.contains("More body."));
        assert!(!out.to_lowercase().contains("copyright"));
        assert!(!out.to_lowercase().contains("rights"));
    }

    #[test]
    fn test_removes_social_and_legal_prompts() {
        let out = clean("Keep me\nFollow us on Twitter today\nSHARE THIS: facebook\nPrivacy Policy | Terms of Use\nSubscribe to our newsletter now");
        assert_eq!(out, "Keep me");
    }

    #[test]
    fn test_strips_urls_emails_and_handles() {
        let input = "Contact jane.doe@example.org or @jane_doe, see https://example.com/a?b=c \
                     and http://foo.bar/baz plus www.example.net/page for more, HTTPS://LOUD.EXAMPLE too.";
        let out = clean(input);
        assert!(!out.contains("http"));
        assert!(!out.to_lowercase().contains("https"));
        assert!(!out.contains("www."));
        assert!(!out.contains('@'));
        assert!(!out.contains("example.org"));
        assert!(!out.contains("jane_doe"));
        assert!(out.contains("for more"));
    }

    #[test]
    fn test_removes_navigation_words_only_as_words() {
        let out = clean("Menu Home About Contact Search Skip to content The homework was hard. Back to top");
        assert_eq!(out, "The homework was hard.");
    }

    #[test]
    fn test_collapses_whitespace() {
        let out = clean("  one\t\ttwo\n\n\n\nthree   four  ");
        assert_eq!(out, "one two three four");
    }

    #[test]
    fn test_strips_disallowed_symbols() {
        let out = clean("Price: $5 & more; done! Really? Yes-no, ok.");
        assert!(!out.contains('$'));
        assert!(!out.contains('&'));
        assert!(!out.contains(';'));
        assert!(!out.contains(':'));
        assert!(out.contains("done!"));
        assert!(out.contains("Really?"));
        assert!(out.contains("Yes-no, ok."));
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        assert_eq!(clean(""), "");
        assert_eq!(clean("   \n\t  "), "");
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("  a b\tc\nd "), 4);
    }
}
