//! Styling and markup anti-patterns.

use a11y_audit_core::utils::{closest, has_role, is_aria_hidden, is_presentational, non_empty_attr};
use a11y_audit_core::{CheckError, ElementRef, FnCheck, ScanContext, Verdict};
use url::Url;

/// Extensions that make a `longdesc` point at an image instead of a
/// description.
const IMAGE_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".webp", ".svg", ".bmp", ".tif", ".tiff", ".avif", ".ico",
];

/// Returns true if `longdesc` can be followed to a description document.
#[must_use]
pub fn is_valid_longdesc(value: &str, base: Option<&Url>) -> bool {
    let value = value.trim();
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let parsed = match (Url::parse(value), base) {
        (Err(url::ParseError::RelativeUrlWithoutBase), Some(base)) => base.join(value),
        // Without a base, any well-formed relative reference is accepted.
        (Err(url::ParseError::RelativeUrlWithoutBase), None) => {
            Url::parse("http://localhost/").and_then(|fallback| fallback.join(value))
        }
        (result, _) => result,
    };
    let Ok(resolved) = parsed else {
        return false;
    };
    if !matches!(resolved.scheme(), "http" | "https" | "file") {
        return false;
    }
    let path = resolved.path().to_ascii_lowercase();
    !IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

fn longdesc_valid(
    element: ElementRef<'_>,
    ctx: &mut ScanContext<'_>,
) -> Result<Verdict, CheckError> {
    let Some(value) = non_empty_attr(element, "longdesc") else {
        return Ok(Verdict::Inapplicable);
    };
    Ok(Verdict::from_pass(is_valid_longdesc(value, ctx.document().base_url())))
}

fn in_link_context(element: ElementRef<'_>) -> bool {
    let is_link = |el: ElementRef<'_>| el.value().name() == "a" || has_role(el, "link");
    is_link(element) || closest(element, is_link).is_some()
}

/// Returns true if a `text-decoration`/`text-decoration-line` value
/// includes `underline`.
fn underlines(value: &str) -> bool {
    value.split_whitespace().any(|token| token == "underline")
}

fn not_underlined(
    element: ElementRef<'_>,
    ctx: &mut ScanContext<'_>,
) -> Result<Verdict, CheckError> {
    if in_link_context(element) {
        return Ok(Verdict::Inapplicable);
    }
    if element.value().name() == "u" {
        return Ok(Verdict::Fail);
    }
    let document = ctx.document();
    let underlined = ["text-decoration", "text-decoration-line"]
        .iter()
        .filter_map(|property| document.cascaded_value(element, property))
        .any(|value| underlines(&value));
    Ok(Verdict::from_pass(!underlined))
}

fn not_justified(
    element: ElementRef<'_>,
    ctx: &mut ScanContext<'_>,
) -> Result<Verdict, CheckError> {
    let legacy = element
        .value()
        .attr("align")
        .is_some_and(|a| a.trim().eq_ignore_ascii_case("justify"));
    let styled = ctx
        .document()
        .cascaded_value(element, "text-align")
        .is_some_and(|v| v == "justify");
    Ok(Verdict::from_pass(!(legacy || styled)))
}

fn iframe_title(element: ElementRef<'_>, _: &mut ScanContext<'_>) -> Result<Verdict, CheckError> {
    if is_presentational(element) || is_aria_hidden(element) {
        return Ok(Verdict::Inapplicable);
    }
    Ok(Verdict::from_pass(
        non_empty_attr(element, "title").is_some()
            || non_empty_attr(element, "aria-label").is_some()
            || non_empty_attr(element, "aria-labelledby").is_some(),
    ))
}

fn document_lang(element: ElementRef<'_>, _: &mut ScanContext<'_>) -> Result<Verdict, CheckError> {
    if element.value().name() != "html" {
        return Ok(Verdict::Inapplicable);
    }
    Ok(Verdict::from_pass(
        non_empty_attr(element, "lang").is_some() || non_empty_attr(element, "xml:lang").is_some(),
    ))
}

/// `longdesc` resolves to a description document.
pub const LONGDESC_VALID: FnCheck = FnCheck::new(
    "longdesc_valid",
    "longdesc is a resolvable URL that does not point at an image",
    longdesc_valid,
);

/// No underline outside links.
pub const NOT_UNDERLINED: FnCheck = FnCheck::new(
    "not_underlined",
    "Text outside links is not underlined with <u> or text-decoration",
    not_underlined,
);

/// No justified text.
pub const NOT_JUSTIFIED: FnCheck = FnCheck::new(
    "not_justified",
    "Text is not justified",
    not_justified,
);

/// Iframes carry a title.
pub const IFRAME_TITLE: FnCheck = FnCheck::new(
    "iframe_title",
    "Iframe has a title or ARIA label",
    iframe_title,
);

/// The root element declares a language.
pub const DOCUMENT_LANG: FnCheck = FnCheck::new(
    "document_lang",
    "The html element has a lang attribute",
    document_lang,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{verdict, verdicts};

    #[test]
    fn longdesc_values() {
        assert!(is_valid_longdesc("chart-description.html", None));
        assert!(is_valid_longdesc("https://example.com/desc#chart", None));
        assert!(!is_valid_longdesc("chart.png", None));
        assert!(!is_valid_longdesc("http://[broken", None));
        assert!(!is_valid_longdesc("a description of the chart", None));
        assert!(!is_valid_longdesc("javascript:alert(1)", None));
        assert_eq!(
            verdict(r#"<img src="c.png" longdesc="c.jpg">"#, "img", &LONGDESC_VALID),
            Verdict::Fail
        );
        assert_eq!(
            verdict(r#"<img src="c.png" longdesc=" ">"#, "img", &LONGDESC_VALID),
            Verdict::Inapplicable
        );
    }

    #[test]
    fn underline_outside_links() {
        let html = r#"
            <style>
              .u { text-decoration: red wavy underline; }
              .plain { text-decoration-line: line-through; }
              nav a { text-decoration: underline; }
            </style>
            <body>
              <p class="u">one</p>
              <u>two</u>
              <p class="plain">three</p>
              <nav><a href="/"><u>four</u></a></nav>
              <span role="link" style="text-decoration-line: underline">five</span>
              <em style="text-decoration: underline overline">six</em>
            </body>"#;
        assert_eq!(
            verdicts(html, "p, u, span, em", &NOT_UNDERLINED),
            vec![
                Verdict::Fail,
                Verdict::Fail,
                Verdict::Pass,
                Verdict::Inapplicable,
                Verdict::Inapplicable,
                Verdict::Fail,
            ]
        );
    }

    #[test]
    fn justified_text() {
        let html = r#"<style>.j { text-align: justify }</style>
            <p class="j">a</p><p align="justify">b</p><p style="text-align: left">c</p>"#;
        assert_eq!(
            verdicts(html, "p", &NOT_JUSTIFIED),
            vec![Verdict::Fail, Verdict::Fail, Verdict::Pass]
        );
    }

    #[test]
    fn iframe_titles_and_document_language() {
        assert_eq!(
            verdict(r#"<iframe src="/map"></iframe>"#, "iframe", &IFRAME_TITLE),
            Verdict::Fail
        );
        assert_eq!(
            verdict(r#"<iframe src="/map" title="Office map"></iframe>"#, "iframe", &IFRAME_TITLE),
            Verdict::Pass
        );
        assert_eq!(
            verdict(r#"<html><body></body></html>"#, "html", &DOCUMENT_LANG),
            Verdict::Fail
        );
        assert_eq!(
            verdict(r#"<html lang="en"><body></body></html>"#, "html", &DOCUMENT_LANG),
            Verdict::Pass
        );
    }
}
