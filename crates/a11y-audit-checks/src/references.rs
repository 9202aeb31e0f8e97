//! Reference-integrity checks for ARIA id references and in-page anchors.

use crate::accessible_name::referenced_text;
use a11y_audit_core::utils::{collapse_whitespace, has_role, id_refs};
use a11y_audit_core::{CheckError, ElementRef, FnCheck, ScanContext, Verdict};

/// ARIA attributes holding id reference lists, and whether the referenced
/// element must contribute text.
const ARIA_REFERENCE_ATTRIBUTES: &[(&str, bool)] = &[
    ("aria-labelledby", true),
    ("aria-describedby", true),
    ("aria-owns", false),
];

/// Returns the first broken reference on `element` as `(attribute, id)`.
///
/// An attribute that is present but lists no ids is reported with an
/// empty id.
#[must_use]
pub fn broken_reference<'a>(
    element: ElementRef<'a>,
    ctx: &ScanContext<'_>,
) -> Option<(&'static str, &'a str)> {
    let document = ctx.document();
    for &(attribute, needs_text) in ARIA_REFERENCE_ATTRIBUTES {
        if element.value().attr(attribute).is_none() {
            continue;
        }
        let ids = id_refs(element, attribute);
        if ids.is_empty() {
            return Some((attribute, ""));
        }
        for id in ids {
            match document.element_by_id(id) {
                None => return Some((attribute, id)),
                Some(target)
                    if needs_text && collapse_whitespace(&referenced_text(target)).is_empty() =>
                {
                    return Some((attribute, id));
                }
                Some(_) => {}
            }
        }
    }
    None
}

fn aria_references_resolve(
    element: ElementRef<'_>,
    ctx: &mut ScanContext<'_>,
) -> Result<Verdict, CheckError> {
    if !ARIA_REFERENCE_ATTRIBUTES
        .iter()
        .any(|(attribute, _)| element.value().attr(attribute).is_some())
    {
        return Ok(Verdict::Inapplicable);
    }
    match broken_reference(element, ctx) {
        Some((attribute, id)) => {
            tracing::trace!(attribute, id, "unresolved aria reference");
            Ok(Verdict::Fail)
        }
        None => Ok(Verdict::Pass),
    }
}

fn anchor_target_exists(
    element: ElementRef<'_>,
    ctx: &mut ScanContext<'_>,
) -> Result<Verdict, CheckError> {
    let Some(fragment) = element
        .value()
        .attr("href")
        .map(str::trim)
        .and_then(|href| href.strip_prefix('#'))
    else {
        return Ok(Verdict::Inapplicable);
    };
    if fragment.is_empty() || has_role(element, "button") {
        return Ok(Verdict::Inapplicable);
    }
    let targets = ctx.anchor_targets();
    if targets.lookup(fragment) {
        return Ok(Verdict::Pass);
    }
    // Browsers retry with the percent-decoded fragment.
    let decoded = urlencoding::decode(fragment).is_ok_and(|d| d != fragment && targets.lookup(&d));
    Ok(Verdict::from_pass(decoded))
}

/// Every ARIA id reference resolves to an element with text.
pub const ARIA_REFERENCES_RESOLVE: FnCheck = FnCheck::new(
    "aria_references_resolve",
    "aria-labelledby, aria-describedby and aria-owns reference existing elements",
    aria_references_resolve,
);

/// In-page `href="#id"` resolves to an `id` or legacy `a[name]`.
pub const ANCHOR_TARGET_EXISTS: FnCheck = FnCheck::new(
    "anchor_target_exists",
    "Fragment link points at an element in the document",
    anchor_target_exists,
);
