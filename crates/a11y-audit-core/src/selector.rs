//! Candidate selection for rules.
//!
//! Rule authors write selectors in a constrained subset of CSS:
//!
//! | Form | Example |
//! |------|---------|
//! | type / universal | `img`, `*` |
//! | id / class | `#main`, `.slider` |
//! | attribute presence | `[aria-labelledby]` |
//! | attribute operators | `[type="image"]`, `[href^="#"]`, `[class*="carousel"]`, `~=`, `|=`, `$=` |
//! | selector lists | `button, [role="button"]` |
//! | combinators | descendant (`a img`) and child (`ul > li`) |
//!
//! Pseudo-classes, pseudo-elements, and sibling combinators are rejected
//! when the rule is registered.

use scraper::{ElementRef, Selector};
use std::collections::HashSet;

/// Reasons a selector is refused at registration time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    /// The selector is blank.
    #[error("selector is empty")]
    Empty,

    /// The selector uses syntax outside the supported subset.
    #[error("unsupported selector syntax `{found}` in `{selector}`")]
    Unsupported {
        /// The full selector text.
        selector: String,
        /// The offending construct.
        found: String,
    },

    /// The CSS parser rejected the selector.
    #[error("malformed selector `{selector}`: {message}")]
    Malformed {
        /// The full selector text.
        selector: String,
        /// Parser diagnostics.
        message: String,
    },
}

/// A validated, compiled candidate selector.
#[derive(Debug, Clone)]
pub struct CandidateSelector {
    source: String,
    compiled: Selector,
}

impl CandidateSelector {
    /// Validates `source` against the supported subset and compiles it.
    ///
    /// # Errors
    ///
    /// Returns a [`SelectorError`] if the selector is empty, uses an
    /// unsupported construct, or cannot be parsed.
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return Err(SelectorError::Empty);
        }
        if let Some(found) = unsupported_construct(trimmed) {
            return Err(SelectorError::Unsupported {
                selector: trimmed.to_string(),
                found,
            });
        }
        let compiled = Selector::parse(trimmed).map_err(|e| SelectorError::Malformed {
            selector: trimmed.to_string(),
            message: format!("{e:?}"),
        })?;
        Ok(Self {
            source: trimmed.to_string(),
            compiled,
        })
    }

    /// Returns the selector text as written by the rule author.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns true if `element` matches this selector.
    #[must_use]
    pub fn matches(&self, element: &ElementRef<'_>) -> bool {
        self.compiled.matches(element)
    }
}

/// Returns the elements under `root` (inclusive) matching any of
/// `selectors`, in document order, each element at most once.
#[must_use]
pub fn find_candidates<'a>(
    root: ElementRef<'a>,
    selectors: &[CandidateSelector],
) -> Vec<ElementRef<'a>> {
    let mut seen = HashSet::new();
    root.descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| selectors.iter().any(|s| s.matches(el)))
        .filter(|el| seen.insert(el.id()))
        .collect()
}

/// Scans for constructs outside the supported subset, ignoring anything
/// inside attribute brackets or quotes.
fn unsupported_construct(selector: &str) -> Option<String> {
    let mut in_brackets = false;
    let mut quote: Option<char> = None;

    for c in selector.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => in_brackets = true,
            (None, ']') => in_brackets = false,
            (None, ':') if !in_brackets => return Some(":".to_string()),
            (None, '+' | '~') if !in_brackets => return Some(c.to_string()),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Document;

    fn sel(s: &str) -> CandidateSelector {
        CandidateSelector::parse(s).expect("valid selector")
    }

    #[test]
    fn accepts_supported_subset() {
        for s in [
            "img",
            "*",
            "#main .slider",
            "a[href^=\"#\"]",
            "input[type=image], button",
            "ul > li",
            "[class~=\"a:b\"]",
        ] {
            assert!(CandidateSelector::parse(s).is_ok(), "{s} should be accepted");
        }
    }

    #[test]
    fn rejects_pseudo_and_sibling() {
        assert!(matches!(
            CandidateSelector::parse("a:hover"),
            Err(SelectorError::Unsupported { .. })
        ));
        assert!(matches!(
            CandidateSelector::parse("h1 + p"),
            Err(SelectorError::Unsupported { .. })
        ));
        assert!(matches!(
            CandidateSelector::parse("img[alt"),
            Err(SelectorError::Malformed { .. })
        ));
        assert_eq!(CandidateSelector::parse("  ").unwrap_err(), SelectorError::Empty);
    }

    #[test]
    fn candidates_in_document_order_without_duplicates() {
        let doc = Document::parse(
            r#"<div><img id=a alt=x><span><img id=b></span></div><img id=c alt="">"#,
        );
        let selectors = vec![sel("img[alt]"), sel("img"), sel("div img")];
        let found: Vec<_> = find_candidates(doc.root_element(), &selectors)
            .into_iter()
            .filter_map(|el| el.value().id())
            .collect();
        assert_eq!(found, vec!["a", "b", "c"]);
    }

    #[test]
    fn subtree_root_is_inclusive() {
        let doc = Document::parse("<section id=s><p>x</p></section><p>y</p>");
        let root = doc.element_by_id("s").unwrap();
        assert_eq!(find_candidates(root, &[sel("section, p")]).len(), 2);
    }
}
