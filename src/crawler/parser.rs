//! HTML parser for response bodies
//!
//! Failure strings are normally matched against the raw body. When the
//! simple method is disabled they are matched against the text a visitor
//! would see, so markup, scripts and styles cannot produce false positives.

use scraper::{Html, Node};

/// Elements whose text content is never rendered
const HIDDEN_ELEMENTS: [&str; 5] = ["script", "style", "noscript", "template", "head"];

/// Extracts the visible text of an HTML document
///
/// Text nodes are joined with single spaces and whitespace runs are
/// collapsed.
///
/// # Example
///
/// ```
/// use adlink_audit::crawler::visible_text;
///
/// let html = "<html><body><h1>Out of stock</h1><script>var x = 1;</script></body></html>";
/// assert_eq!(visible_text(html), "Out of stock");
/// ```
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut words: Vec<&str> = Vec::new();

    for node in document.tree.nodes() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map(|element| HIDDEN_ELEMENTS.contains(&element.name()))
                .unwrap_or(false)
        });
        if hidden {
            continue;
        }

        words.extend(text.split_whitespace());
    }

    words.join(" ")
}

/// Returns the first failure string contained in the body
///
/// # Arguments
///
/// * `body` - The response body
/// * `failure_strings` - Substrings that mark a broken landing page
/// * `visible_only` - Match the visible text instead of the raw body
pub fn find_failure_string<'a>(
    body: &str,
    failure_strings: &'a [String],
    visible_only: bool,
) -> Option<&'a str> {
    let mut candidates = failure_strings.iter().filter(|s| !s.is_empty());

    if !visible_only {
        return candidates
            .find(|needle| body.contains(needle.as_str()))
            .map(String::as_str);
    }

    let text = visible_text(body);
    candidates
        .find(|needle| text.contains(needle.as_str()))
        .map(String::as_str)
}
