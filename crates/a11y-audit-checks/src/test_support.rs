//! Helpers for evaluating checks against inline HTML in unit tests.

use a11y_audit_core::{Check, Document, ScanContext, ScanStores, Verdict};
use scraper::Selector;

/// Evaluates `check` against every element matching `selector`, in
/// document order, sharing one set of stores.
pub(crate) fn verdicts(html: &str, selector: &str, check: &dyn Check) -> Vec<Verdict> {
    let document = Document::parse(html);
    verdicts_in(&document, selector, check)
}

pub(crate) fn verdicts_in(document: &Document, selector: &str, check: &dyn Check) -> Vec<Verdict> {
    let selector = Selector::parse(selector).unwrap();
    let mut stores = ScanStores::new();
    let mut ctx = ScanContext::new(document, &mut stores);
    ctx.enter_rule("test", None);
    document
        .html()
        .select(&selector)
        .map(|el| check.evaluate(el, &mut ctx).unwrap())
        .collect()
}

/// Evaluates `check` against the single element matching `selector`.
pub(crate) fn verdict(html: &str, selector: &str, check: &dyn Check) -> Verdict {
    let all = verdicts(html, selector, check);
    assert_eq!(all.len(), 1, "expected exactly one `{selector}` in {html}");
    all[0]
}
