//! Attribute and ancestry helpers for element inspection.

use scraper::ElementRef;

/// Returns the first token of the `role` attribute, lowercased.
#[must_use]
pub fn role(element: ElementRef<'_>) -> Option<String> {
    element
        .value()
        .attr("role")
        .and_then(|r| r.split_whitespace().next())
        .map(str::to_ascii_lowercase)
}

/// Returns true if the element's `role` is `expected` (case-insensitive).
#[must_use]
pub fn has_role(element: ElementRef<'_>, expected: &str) -> bool {
    role(element).is_some_and(|r| r == expected)
}

/// Returns true for `role="presentation"` or `role="none"`.
#[must_use]
pub fn is_presentational(element: ElementRef<'_>) -> bool {
    matches!(role(element).as_deref(), Some("presentation" | "none"))
}

/// Returns true if the element itself carries `aria-hidden="true"`.
#[must_use]
pub fn is_aria_hidden(element: ElementRef<'_>) -> bool {
    element
        .value()
        .attr("aria-hidden")
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// Returns the nearest ancestor (excluding `element`) matching `predicate`.
pub fn closest<'a, P>(element: ElementRef<'a>, predicate: P) -> Option<ElementRef<'a>>
where
    P: Fn(ElementRef<'a>) -> bool,
{
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| predicate(*el))
}

/// Returns the trimmed attribute value, or `None` when absent or blank.
#[must_use]
pub fn non_empty_attr<'a>(element: ElementRef<'a>, name: &str) -> Option<&'a str> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Splits an ID reference list attribute such as `aria-labelledby`.
#[must_use]
pub fn id_refs<'a>(element: ElementRef<'a>, name: &str) -> Vec<&'a str> {
    element
        .value()
        .attr(name)
        .map(|v| v.split_whitespace().collect())
        .unwrap_or_default()
}

/// Returns the outline level of a heading: `h1`..`h6`, or
/// `role="heading"` with `aria-level` (defaulting to 2).
#[must_use]
pub fn heading_level(element: ElementRef<'_>) -> Option<u8> {
    let name = element.value().name();
    if let Some(level) = name
        .strip_prefix('h')
        .and_then(|n| n.parse::<u8>().ok())
        .filter(|n| (1..=6).contains(n))
    {
        return Some(level);
    }
    if has_role(element, "heading") {
        let level = element
            .value()
            .attr("aria-level")
            .and_then(|v| v.trim().parse::<u8>().ok())
            .filter(|n| *n >= 1)
            .unwrap_or(2);
        return Some(level);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Document;

    #[test]
    fn role_helpers() {
        let doc = Document::parse(r#"<img id=a role="None presentation"><div id=b role=button>"#);
        let a = doc.element_by_id("a").unwrap();
        let b = doc.element_by_id("b").unwrap();
        assert_eq!(role(a).as_deref(), Some("none"));
        assert!(is_presentational(a));
        assert!(has_role(b, "button"));
        assert!(!is_presentational(b));
    }

    #[test]
    fn closest_finds_ancestor() {
        let doc = Document::parse("<figure id=f><div><img id=i></div></figure>");
        let img = doc.element_by_id("i").unwrap();
        let fig = closest(img, |el| el.value().name() == "figure").unwrap();
        assert_eq!(fig.value().id(), Some("f"));
        assert!(closest(img, |el| el.value().name() == "table").is_none());
    }

    #[test]
    fn id_ref_lists() {
        let doc = Document::parse(r#"<p id=t aria-labelledby=" a  b ">"#);
        assert_eq!(id_refs(doc.element_by_id("t").unwrap(), "aria-labelledby"), vec!["a", "b"]);
    }

    #[test]
    fn heading_levels() {
        let doc = Document::parse(
            r#"<h3 id=a></h3><div id=b role=heading aria-level="4"></div><div id=c role=heading></div><header id=d></header>"#,
        );
        let level = |id| heading_level(doc.element_by_id(id).unwrap());
        assert_eq!(level("a"), Some(3));
        assert_eq!(level("b"), Some(4));
        assert_eq!(level("c"), Some(2));
        assert_eq!(level("d"), None);
    }
}
