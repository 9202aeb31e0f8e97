//! Stable element paths and snippets for violation reports.

use super::text::truncate_chars;
use scraper::ElementRef;

/// Maximum characters of outer HTML kept in a snippet.
const SNIPPET_MAX_CHARS: usize = 200;

/// Builds a structural CSS path such as `html > body > div:nth-of-type(2) > img`.
///
/// The path only depends on tag names and sibling positions, so it is stable
/// across repeated parses of the same markup and can be fed back to any CSS
/// engine to locate the element again.
#[must_use]
pub fn element_path(element: ElementRef<'_>) -> String {
    let mut segments = Vec::new();
    let chain = std::iter::once(element).chain(element.ancestors().filter_map(ElementRef::wrap));

    for el in chain {
        let name = el.value().name();
        let same_tag: Vec<ElementRef<'_>> = el
            .parent()
            .map(|p| {
                p.children()
                    .filter_map(ElementRef::wrap)
                    .filter(|s| s.value().name() == name)
                    .collect()
            })
            .unwrap_or_default();

        if same_tag.len() > 1 {
            let position = same_tag.iter().position(|s| s.id() == el.id()).unwrap_or(0) + 1;
            segments.push(format!("{name}:nth-of-type({position})"));
        } else {
            segments.push(name.to_string());
        }
    }

    segments.reverse();
    segments.join(" > ")
}

/// Returns the element's opening markup, truncated for display.
#[must_use]
pub fn element_snippet(element: ElementRef<'_>) -> String {
    let html = element.html();
    let snippet = truncate_chars(&html, SNIPPET_MAX_CHARS);
    if snippet.len() < html.len() {
        format!("{snippet}…")
    } else {
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Document;

    #[test]
    fn path_uses_nth_of_type_for_repeated_tags() {
        let doc = Document::parse("<div><p>a</p><p><img id=t src=x></p></div>");
        let img = doc.element_by_id("t").unwrap();
        assert_eq!(element_path(img), "html > body > div > p:nth-of-type(2) > img");
    }

    #[test]
    fn snippet_is_truncated() {
        let long = "x".repeat(500);
        let doc = Document::parse(&format!("<p id=t>{long}</p>"));
        let snippet = element_snippet(doc.element_by_id("t").unwrap());
        assert!(snippet.ends_with('…'));
        assert!(snippet.chars().count() <= SNIPPET_MAX_CHARS + 1);
    }
}
