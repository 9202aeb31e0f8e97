//! Link anti-pattern checks.

use crate::accessible_name::{labelledby_text, name_from, NameSource};
use a11y_audit_core::utils::{collapse_whitespace, has_role};
use a11y_audit_core::{CheckError, ElementRef, FnCheck, ScanContext, Verdict};

/// Phrases that warn a link opens a new browsing context.
pub const NEW_WINDOW_PHRASES: &[&str] = &["new window", "new tab", "new document"];

/// Schemes whose link text is expected to echo the target.
const ECHO_EXEMPT_SCHEMES: &[&str] = &["mailto:", "tel:"];

/// Every text a `target="_blank"` warning may appear in.
fn warning_texts(element: ElementRef<'_>, ctx: &ScanContext<'_>) -> Vec<String> {
    let document = ctx.document();
    let mut texts = vec![collapse_whitespace(&ctx.visibility().visible_text(element))];
    texts.extend(element.value().attr("aria-label").map(str::to_string));
    texts.extend(labelledby_text(element, document));
    texts.extend(
        element
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "img")
            .filter_map(|img| img.value().attr("alt").map(str::to_string)),
    );
    texts
}

/// Returns true if `text` contains a new-window phrase.
#[must_use]
pub fn mentions_new_window(text: &str) -> bool {
    let lowered = collapse_whitespace(text).to_lowercase();
    NEW_WINDOW_PHRASES.iter().any(|p| lowered.contains(p))
}

fn new_window_warning(
    element: ElementRef<'_>,
    ctx: &mut ScanContext<'_>,
) -> Result<Verdict, CheckError> {
    let opens_new = element
        .value()
        .attr("target")
        .is_some_and(|t| t.trim().eq_ignore_ascii_case("_blank"));
    if !opens_new {
        return Ok(Verdict::Inapplicable);
    }
    Ok(Verdict::from_pass(
        warning_texts(element, ctx).iter().any(|t| mentions_new_window(t)),
    ))
}

/// Reduces a URL or URL-like text to a comparable form: no scheme, no
/// `www.`, no trailing slash, lowercased.
#[must_use]
pub fn comparable_url(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let rest = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .or_else(|| lowered.strip_prefix("//"))
        .unwrap_or(&lowered);
    let rest = rest.strip_prefix("www.").unwrap_or(rest);
    rest.trim_end_matches('/').to_string()
}

fn link_text_not_url(
    element: ElementRef<'_>,
    ctx: &mut ScanContext<'_>,
) -> Result<Verdict, CheckError> {
    let Some(href) = element.value().attr("href").map(str::trim).filter(|h| !h.is_empty()) else {
        return Ok(Verdict::Inapplicable);
    };
    let lowered = href.to_lowercase();
    if ECHO_EXEMPT_SCHEMES.iter().any(|s| lowered.starts_with(s)) {
        return Ok(Verdict::Inapplicable);
    }
    let Some(text) = name_from(NameSource::VisibleText, element, ctx.document()) else {
        return Ok(Verdict::Inapplicable);
    };
    Ok(Verdict::from_pass(comparable_url(&text) != comparable_url(href)))
}

/// Returns true for an `href` that navigates somewhere.
#[must_use]
pub fn is_usable_href(href: &str) -> bool {
    let href = href.trim();
    !href.is_empty() && href != "#" && !href.to_ascii_lowercase().starts_with("javascript:")
}

fn link_has_href(element: ElementRef<'_>, _: &mut ScanContext<'_>) -> Result<Verdict, CheckError> {
    if has_role(element, "button") {
        return Ok(Verdict::Inapplicable);
    }
    match element.value().attr("href") {
        Some(href) => Ok(Verdict::from_pass(is_usable_href(href))),
        // A bare `<a name>` is a fragment target, not a link.
        None if element.value().attr("name").is_some() => Ok(Verdict::Inapplicable),
        None => Ok(Verdict::Fail),
    }
}

/// `target="_blank"` links warn about the new window.
pub const NEW_WINDOW_WARNING: FnCheck = FnCheck::new(
    "new_window_warning",
    "Link opening a new window says so in its text, label, or image alt",
    new_window_warning,
);

/// Link text is not just its URL.
pub const LINK_TEXT_NOT_URL: FnCheck = FnCheck::new(
    "link_text_not_url",
    "Link text is not a copy of its href",
    link_text_not_url,
);

/// Anchor has a usable `href` or a button role.
pub const LINK_HAS_HREF: FnCheck = FnCheck::new(
    "link_has_href",
    "Anchor has a usable href or role=\"button\"",
    link_has_href,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{verdict, verdicts};

    #[test]
    fn blank_target_needs_a_warning_somewhere() {
        let html = r#"
            <a href="/a" target="_blank">Report (opens in a New Window)</a>
            <a href="/b" target="_blank" aria-label="Report, new tab">Report</a>
            <span id="w">opens new document</span>
            <a href="/c" target="_blank" aria-labelledby="w">Report</a>
            <a href="/d" target="_BLANK"><img src="r.png" alt="Report (new window)"></a>
            <a href="/e" target="_blank" title="new window">Report</a>
            <a href="/f" target="_self">Report</a>"#;
        assert_eq!(
            verdicts(html, "a", &NEW_WINDOW_WARNING),
            vec![
                Verdict::Pass,
                Verdict::Pass,
                Verdict::Pass,
                Verdict::Pass,
                Verdict::Fail,
                Verdict::Inapplicable,
            ]
        );
    }

    #[test]
    fn url_echo_ignores_scheme_and_www() {
        assert_eq!(comparable_url("https://www.Example.com/"), "example.com");
        let html = r#"
            <a href="https://www.example.com/">example.com</a>
            <a href="https://example.com/docs">Read the docs</a>
            <a href="mailto:hi@example.com">hi@example.com</a>
            <a href="http://example.com/a">www.example.com/a/</a>"#;
        assert_eq!(
            verdicts(html, "a", &LINK_TEXT_NOT_URL),
            vec![Verdict::Fail, Verdict::Pass, Verdict::Inapplicable, Verdict::Fail]
        );
    }

    #[test]
    fn improper_links() {
        assert_eq!(verdict("<a>Click</a>", "a", &LINK_HAS_HREF), Verdict::Fail);
        assert_eq!(verdict(r##"<a href="#">Click</a>"##, "a", &LINK_HAS_HREF), Verdict::Fail);
        assert_eq!(
            verdict(r#"<a href="javascript:void(0)">Click</a>"#, "a", &LINK_HAS_HREF),
            Verdict::Fail
        );
        assert_eq!(
            verdict(r#"<a role="button">Click</a>"#, "a", &LINK_HAS_HREF),
            Verdict::Inapplicable
        );
        assert_eq!(verdict(r#"<a name="top"></a>"#, "a", &LINK_HAS_HREF), Verdict::Inapplicable);
        assert_eq!(verdict(r#"<a href="/x">Go</a>"#, "a", &LINK_HAS_HREF), Verdict::Pass);
    }
}
