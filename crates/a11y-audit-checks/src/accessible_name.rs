//! Accessible-name computation and the checks built on it.
//!
//! # Precedence
//!
//! When several sources are present the first usable one wins:
//!
//! 1. `aria-label`
//! 2. `aria-labelledby` (every referenced element resolved, text joined)
//! 3. visible text content
//! 4. `title`
//! 5. `alt` of a nested image
//! 6. `value` of an input button
//!
//! Whitespace and punctuation-only strings (`---`, `...`, `___`) never
//! count as a name.

use a11y_audit_core::utils::{
    collapse_whitespace, id_refs, is_aria_hidden, is_placeholder_text, non_empty_attr,
};
use a11y_audit_core::{
    text_content, CheckError, Document, ElementRef, FnCheck, ScanContext, Verdict, Visibility,
};

/// A source an accessible name can be taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSource {
    /// `aria-label` attribute.
    AriaLabel,
    /// Text of the elements referenced by `aria-labelledby`.
    AriaLabelledby,
    /// Rendered text content.
    VisibleText,
    /// `title` attribute.
    Title,
    /// `alt` of a descendant image.
    ImageAlt,
    /// `value` of `input` buttons.
    Value,
}

impl NameSource {
    /// Every source in precedence order.
    pub const PRECEDENCE: [Self; 6] = [
        Self::AriaLabel,
        Self::AriaLabelledby,
        Self::VisibleText,
        Self::Title,
        Self::ImageAlt,
        Self::Value,
    ];
}

/// Normalises candidate name text, rejecting placeholders.
fn usable(text: &str) -> Option<String> {
    let text = collapse_whitespace(text);
    (!is_placeholder_text(&text)).then_some(text)
}

/// Resolves the name contributed by one source, if usable.
#[must_use]
pub fn name_from(
    source: NameSource,
    element: ElementRef<'_>,
    document: &Document,
) -> Option<String> {
    let visibility = Visibility::new(document);
    match source {
        NameSource::AriaLabel => element.value().attr("aria-label").and_then(usable),
        NameSource::AriaLabelledby => labelledby_text(element, document),
        NameSource::VisibleText => usable(&visibility.visible_text(element)),
        NameSource::Title => element.value().attr("title").and_then(usable),
        NameSource::ImageAlt => element
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "img" && !visibility.is_self_hidden(*el))
            .find_map(|img| img.value().attr("alt").and_then(usable)),
        NameSource::Value => {
            if !is_input_button(element) {
                return None;
            }
            match element.value().attr("value") {
                Some(value) => usable(value),
                None => default_button_label(element).map(str::to_string),
            }
        }
    }
}

/// Computes the accessible name and the source it came from.
#[must_use]
pub fn accessible_name(
    element: ElementRef<'_>,
    document: &Document,
) -> Option<(NameSource, String)> {
    NameSource::PRECEDENCE
        .into_iter()
        .find_map(|source| name_from(source, element, document).map(|name| (source, name)))
}

/// Joined text of every element referenced by `aria-labelledby`.
///
/// Returns `None` if the attribute is absent, any reference is dangling,
/// or the joined text is not usable.
#[must_use]
pub fn labelledby_text(element: ElementRef<'_>, document: &Document) -> Option<String> {
    let ids = id_refs(element, "aria-labelledby");
    if ids.is_empty() {
        return None;
    }
    let mut parts = Vec::with_capacity(ids.len());
    for id in ids {
        parts.push(referenced_text(document.element_by_id(id)?));
    }
    usable(&parts.join(" "))
}

/// Text a referenced element contributes: its `aria-label`, an image's
/// `alt`, or its full text content (hidden or not).
#[must_use]
pub fn referenced_text(element: ElementRef<'_>) -> String {
    if let Some(label) = non_empty_attr(element, "aria-label") {
        return label.to_string();
    }
    if element.value().name() == "img" {
        return element.value().attr("alt").unwrap_or_default().to_string();
    }
    text_content(element)
}

fn is_input_button(element: ElementRef<'_>) -> bool {
    element.value().name() == "input"
        && matches!(
            element
                .value()
                .attr("type")
                .map(str::to_ascii_lowercase)
                .as_deref(),
            Some("submit" | "reset" | "button" | "image")
        )
}

/// Label the user agent renders for submit and reset inputs with no value.
fn default_button_label(element: ElementRef<'_>) -> Option<&'static str> {
    match element.value().attr("type")?.to_ascii_lowercase().as_str() {
        "submit" => Some("Submit"),
        "reset" => Some("Reset"),
        _ => None,
    }
}

fn source_check(source: NameSource, element: ElementRef<'_>, ctx: &ScanContext<'_>) -> Verdict {
    if is_aria_hidden(element) {
        return Verdict::Inapplicable;
    }
    Verdict::from_pass(name_from(source, element, ctx.document()).is_some())
}

fn has_aria_label(
    element: ElementRef<'_>,
    ctx: &mut ScanContext<'_>,
) -> Result<Verdict, CheckError> {
    Ok(source_check(NameSource::AriaLabel, element, ctx))
}

fn has_aria_labelledby(
    element: ElementRef<'_>,
    ctx: &mut ScanContext<'_>,
) -> Result<Verdict, CheckError> {
    Ok(source_check(NameSource::AriaLabelledby, element, ctx))
}

fn has_visible_text(
    element: ElementRef<'_>,
    ctx: &mut ScanContext<'_>,
) -> Result<Verdict, CheckError> {
    Ok(source_check(NameSource::VisibleText, element, ctx))
}

fn has_title(element: ElementRef<'_>, ctx: &mut ScanContext<'_>) -> Result<Verdict, CheckError> {
    Ok(source_check(NameSource::Title, element, ctx))
}

fn has_image_alt(
    element: ElementRef<'_>,
    ctx: &mut ScanContext<'_>,
) -> Result<Verdict, CheckError> {
    Ok(source_check(NameSource::ImageAlt, element, ctx))
}

fn has_value(element: ElementRef<'_>, ctx: &mut ScanContext<'_>) -> Result<Verdict, CheckError> {
    if !is_input_button(element) {
        return Ok(Verdict::Inapplicable);
    }
    Ok(source_check(NameSource::Value, element, ctx))
}

fn has_accessible_name(
    element: ElementRef<'_>,
    ctx: &mut ScanContext<'_>,
) -> Result<Verdict, CheckError> {
    if is_aria_hidden(element) {
        return Ok(Verdict::Inapplicable);
    }
    Ok(Verdict::from_pass(accessible_name(element, ctx.document()).is_some()))
}

/// Non-blank `aria-label`.
pub const HAS_ARIA_LABEL: FnCheck =
    FnCheck::new("has_aria_label", "Element has a non-blank aria-label", has_aria_label);

/// Resolvable, non-empty `aria-labelledby`.
pub const HAS_ARIA_LABELLEDBY: FnCheck = FnCheck::new(
    "has_aria_labelledby",
    "Every aria-labelledby reference exists and the joined text is non-empty",
    has_aria_labelledby,
);

/// Rendered text that is not just punctuation.
pub const HAS_VISIBLE_TEXT: FnCheck = FnCheck::new(
    "has_visible_text",
    "Element renders text that is not whitespace or punctuation only",
    has_visible_text,
);

/// Non-blank `title`.
pub const HAS_TITLE: FnCheck =
    FnCheck::new("has_title", "Element has a non-blank title", has_title);

/// A nested image with usable `alt`.
pub const HAS_IMAGE_ALT: FnCheck = FnCheck::new(
    "has_image_alt",
    "Element contains a visible image with usable alt text",
    has_image_alt,
);

/// Input buttons with a value (or a UA default label).
pub const HAS_VALUE: FnCheck = FnCheck::new(
    "has_value",
    "Input button has a usable value",
    has_value,
);

/// Any source in precedence order.
pub const HAS_ACCESSIBLE_NAME: FnCheck = FnCheck::new(
    "has_accessible_name",
    "Element has a non-empty accessible name",
    has_accessible_name,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::verdict;

    fn name_of(html: &str) -> Option<(NameSource, String)> {
        let document = Document::parse(html);
        let target = document.element_by_id("t").unwrap();
        accessible_name(target, &document)
    }

    #[test]
    fn aria_label_wins_over_visible_text() {
        // Pinned precedence: aria-label beats every other source.
        assert_eq!(
            name_of(r#"<button id="t" aria-label="Close dialog" title="x">X</button>"#),
            Some((NameSource::AriaLabel, "Close dialog".to_string()))
        );
    }

    #[test]
    fn labelledby_beats_text_and_joins_references() {
        let html = r#"
            <span id="a">Save</span><span id="b" hidden>draft</span>
            <button id="t" aria-labelledby="a b">S</button>"#;
        assert_eq!(
            name_of(html),
            Some((NameSource::AriaLabelledby, "Save draft".to_string()))
        );
    }

    #[test]
    fn dangling_labelledby_falls_through() {
        assert_eq!(
            name_of(r#"<button id="t" aria-labelledby="nope">Go</button>"#),
            Some((NameSource::VisibleText, "Go".to_string()))
        );
    }

    #[test]
    fn placeholders_are_not_names() {
        assert_eq!(name_of(r#"<a id="t" href="/x"> --- </a>"#), None);
        assert_eq!(name_of(r#"<a id="t" href="/x" aria-label="   ">___</a>"#), None);
    }

    #[test]
    fn title_then_image_alt_then_value() {
        assert_eq!(
            name_of(r#"<a id="t" href="/" title="Home"><img src="h.png" alt="House"></a>"#)
                .map(|(s, _)| s),
            Some(NameSource::Title)
        );
        assert_eq!(
            name_of(r#"<a id="t" href="/"><img src="h.png" alt="House"></a>"#),
            Some((NameSource::ImageAlt, "House".to_string()))
        );
        assert_eq!(
            name_of(r#"<input id="t" type="button" value="Go">"#),
            Some((NameSource::Value, "Go".to_string()))
        );
        assert_eq!(
            name_of(r#"<input id="t" type="submit">"#),
            Some((NameSource::Value, "Submit".to_string()))
        );
        assert_eq!(name_of(r#"<input id="t" type="button">"#), None);
    }

    #[test]
    fn hidden_text_is_not_visible_text() {
        assert_eq!(
            name_of(r#"<button id="t"><span style="display:none">Secret</span></button>"#),
            None
        );
    }

    #[test]
    fn source_checks_gate_on_aria_hidden() {
        let html = r#"<button aria-hidden="true"></button>"#;
        assert_eq!(verdict(html, "button", &HAS_VISIBLE_TEXT), Verdict::Inapplicable);
        assert_eq!(verdict(html, "button", &HAS_ACCESSIBLE_NAME), Verdict::Inapplicable);
    }

    #[test]
    fn value_check_only_applies_to_inputs() {
        assert_eq!(verdict("<button>Go</button>", "button", &HAS_VALUE), Verdict::Inapplicable);
        assert_eq!(
            verdict(r#"<input type="reset" value="  ">"#, "input", &HAS_VALUE),
            Verdict::Fail
        );
    }

    #[test]
    fn empty_button_with_aria_label_passes() {
        let html = r#"<button aria-label="Submit"></button>"#;
        assert_eq!(verdict(html, "button", &HAS_ARIA_LABEL), Verdict::Pass);
        assert_eq!(verdict(html, "button", &HAS_VISIBLE_TEXT), Verdict::Fail);
        assert_eq!(verdict(html, "button", &HAS_ACCESSIBLE_NAME), Verdict::Pass);
    }
}
