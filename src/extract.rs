//! Main-content extraction from raw HTML.
//!
//! Pages are parsed with `scraper`. Instead of mutating the tree, boilerplate
//! elements are skipped while walking it: an element is *removed* when its tag
//! is on [`TAG_DENYLIST`], or when one of its classes or its id contains a
//! [`KEYWORD_DENYLIST`] keyword (case-insensitive), and so is everything
//! beneath it.
//!
//! The main content is the first surviving element matching, in priority
//! order, `article`, `main`, `div`, `section`. Without one, the text of the
//! whole surviving document is used.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

const TAG_DENYLIST: &[&str] = &[
    "script",
    "style",
    "noscript",
    "iframe",
    "header",
    "footer",
    "nav",
    "aside",
    "advertisement",
    "form",
    "button",
];

/// Matched against every class and the id of an element.
const KEYWORD_DENYLIST: &[&str] = &[
    "header",
    "footer",
    "nav",
    "sidebar",
    "ad",
    "social",
    "comment",
    "cookie",
    "popup",
    "newsletter",
    "modal",
    "advertisement",
];

static CONTENT_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["article", "main", "div", "section"]
        .iter()
        .map(|tag| Selector::parse(tag).expect("static selector"))
        .collect()
});

/// Extract the visible main-content text of an HTML page.
///
/// An empty result means "no usable content", not an error.
pub fn extract(raw: &str) -> String {
    let document = Html::parse_document(raw);

    for (selector, tag) in CONTENT_SELECTORS
        .iter()
        .zip(["article", "main", "div", "section"])
    {
        if let Some(container) = document.select(selector).find(|el| !is_removed(el)) {
            let text = visible_text(container);
            debug!(tag, chars = text.len(), "Selected content container");
            if !text.is_empty() {
                return text;
            }
            break;
        }
    }

    debug!("No content container; using full document text");
    visible_text(document.root_element())
}

fn is_denied(element: &ElementRef<'_>) -> bool {
    let value = element.value();
    if TAG_DENYLIST.contains(&value.name()) {
        return true;
    }
    value
        .classes()
        .chain(value.id())
        .any(has_denied_keyword)
}

fn has_denied_keyword(name: &str) -> bool {
    let name = name.to_lowercase();
    KEYWORD_DENYLIST.iter().any(|kw| name.contains(kw))
}

/// Whether the element or any of its ancestors is denied.
fn is_removed(element: &ElementRef<'_>) -> bool {
    is_denied(element)
        || element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| is_denied(&ancestor))
}

/// Text nodes under `element`, skipping denied subtrees, joined by a space.
fn visible_text(element: ElementRef<'_>) -> String {
    if is_denied(&element) {
        return String::new();
    }
    let mut parts = Vec::new();
    collect_text(element, &mut parts);
    parts.join(" ")
}

fn collect_text<'a>(element: ElementRef<'a>, out: &mut Vec<&'a str>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push(&**text),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    if !is_denied(&child_el) {
                        collect_text(child_el, out);
                    }
                }
            }
            _ => {}
        }
    }
}
