//! Context handed to checks during a scan.

use crate::check::CheckError;
use crate::config::RuleConfig;
use crate::document::Document;
use crate::store::{AltTextStore, AnchorTargetStore, CrossElementStore, HeadingIndex, ScanStores};
use crate::utils::attributes::heading_level;
use crate::verifier::AnimationResults;
use crate::visibility::Visibility;

/// Per-scan state visible to checks.
///
/// Reference lookups (ids, anchors, heading outline) always consult the
/// whole document, even when the scan is restricted to a subtree.
pub struct ScanContext<'a> {
    document: &'a Document,
    stores: &'a mut ScanStores,
    animations: Option<&'a AnimationResults>,
    rule: &'a str,
    options: Option<&'a RuleConfig>,
}

impl<'a> ScanContext<'a> {
    /// Creates a context over `document` using `stores`.
    #[must_use]
    pub fn new(document: &'a Document, stores: &'a mut ScanStores) -> Self {
        Self {
            document,
            stores,
            animations: None,
            rule: "",
            options: None,
        }
    }

    /// Supplies resolved animated-image results.
    #[must_use]
    pub fn with_animations(mut self, animations: Option<&'a AnimationResults>) -> Self {
        self.animations = animations;
        self
    }

    /// Switches to evaluating `rule` with its configured options.
    ///
    /// The alt-text registry starts empty for every rule, so each rule that
    /// tracks duplicates sees the first occurrence first. Anchor and heading
    /// indexes describe the document and are kept.
    pub fn enter_rule(&mut self, rule: &'a str, options: Option<&'a RuleConfig>) {
        self.rule = rule;
        self.options = options;
        self.stores.alt_text.clear();
    }

    /// The document being scanned.
    #[must_use]
    pub fn document(&self) -> &'a Document {
        self.document
    }

    /// The visibility oracle for this document.
    #[must_use]
    pub fn visibility(&self) -> Visibility<'a> {
        Visibility::new(self.document)
    }

    /// Slug of the rule currently being evaluated.
    #[must_use]
    pub fn rule(&self) -> &str {
        self.rule
    }

    /// Duplicate alt-text registry, populated in document order.
    pub fn alt_text(&mut self) -> &mut AltTextStore {
        &mut self.stores.alt_text
    }

    /// Fragment targets across the whole document, indexed on first use.
    pub fn anchor_targets(&mut self) -> &AnchorTargetStore {
        let store = &mut self.stores.anchors;
        if !store.is_indexed() {
            for el in self.document.elements() {
                if let Some(id) = el.value().id() {
                    store.register(id);
                }
                if el.value().name() == "a" {
                    if let Some(name) = el.value().attr("name") {
                        store.register(name);
                    }
                }
            }
            store.mark_indexed();
            tracing::trace!("indexed anchor targets");
        }
        &self.stores.anchors
    }

    /// Visible headings across the whole document, indexed on first use.
    pub fn headings(&mut self) -> &HeadingIndex {
        let index = &mut self.stores.headings;
        if !index.is_indexed() {
            let visibility = Visibility::new(self.document);
            for el in self.document.elements() {
                if let Some(level) = heading_level(el) {
                    if !visibility.is_effectively_hidden(el) {
                        index.register(el.id(), level);
                    }
                }
            }
            index.mark_indexed();
            tracing::trace!(count = index.headings().len(), "indexed headings");
        }
        &self.stores.headings
    }

    /// Resolved animated-image results.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::MissingResource`] when the scan was started
    /// without results. The engine refuses such scans up front, so checks
    /// only see this when evaluated outside the engine.
    pub fn animations(&self) -> Result<&'a AnimationResults, CheckError> {
        self.animations
            .ok_or(CheckError::MissingResource("animation results"))
    }

    /// Integer option for the current rule.
    #[must_use]
    pub fn option_int(&self, key: &str, default: i64) -> i64 {
        self.options.map_or(default, |o| o.get_int(key, default))
    }

    /// Boolean option for the current rule.
    #[must_use]
    pub fn option_bool(&self, key: &str, default: bool) -> bool {
        self.options.map_or(default, |o| o.get_bool(key, default))
    }

    /// String-array option for the current rule.
    #[must_use]
    pub fn option_str_array(&self, key: &str) -> Vec<String> {
        self.options
            .map(|o| o.get_str_array(key))
            .unwrap_or_default()
    }

    /// Non-negative integer option, validated.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::InvalidOption`] for negative values.
    pub fn option_usize(&self, key: &str, default: usize) -> Result<usize, CheckError> {
        let fallback = i64::try_from(default).unwrap_or(i64::MAX);
        usize::try_from(self.option_int(key, fallback)).map_err(|_| CheckError::InvalidOption {
            option: key.to_string(),
            message: "must be a non-negative integer".to_string(),
        })
    }
}

impl std::fmt::Debug for ScanContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanContext")
            .field("rule", &self.rule)
            .field("has_animations", &self.animations.is_some())
            .finish_non_exhaustive()
    }
}
