//! Rule definitions and registration-time validation.
//!
//! A [`RuleDefinition`] is the mutable builder a host (or the declarative
//! loader) fills in. [`Rule::compile`] validates it and produces an
//! immutable [`Rule`]; any malformed definition is rejected there, never
//! mid-scan.
//!
//! # Example
//!
//! ```ignore
//! use a11y_audit_core::{RuleDefinition, Severity, VisibilityPolicy};
//!
//! let def = RuleDefinition::new("iframe_missing_title")
//!     .selector("iframe")
//!     .check(IFRAME_TITLE)
//!     .severity(Severity::Error)
//!     .visibility(VisibilityPolicy::SkipHidden);
//! registry.register(def, &checks)?;
//! ```

use crate::check::{Check, CheckRef, CheckRegistry, Requirement, Verdict};
use crate::selector::{CandidateSelector, SelectorError};
use crate::types::Severity;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// How per-check verdicts combine into one candidate verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CombinationMode {
    /// Any applicable `Fail` fails the candidate.
    #[default]
    #[serde(rename = "all")]
    AllMustPass,
    /// Any applicable `Pass` is sufficient.
    #[serde(rename = "any")]
    AnyMustPass,
}

impl CombinationMode {
    /// Combines verdicts, ignoring inapplicable ones.
    ///
    /// Returns [`Verdict::Inapplicable`] when no check applied; the engine
    /// only reports [`Verdict::Fail`].
    #[must_use]
    pub fn combine(self, verdicts: impl IntoIterator<Item = Verdict>) -> Verdict {
        let (mut passed, mut failed) = (false, false);
        for verdict in verdicts {
            match verdict {
                Verdict::Pass => passed = true,
                Verdict::Fail => failed = true,
                Verdict::Inapplicable => {}
            }
        }
        match (self, passed, failed) {
            (Self::AllMustPass, _, true) | (Self::AnyMustPass, false, true) => Verdict::Fail,
            (_, true, _) => Verdict::Pass,
            _ => Verdict::Inapplicable,
        }
    }
}

impl std::fmt::Display for CombinationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AllMustPass => write!(f, "all"),
            Self::AnyMustPass => write!(f, "any"),
        }
    }
}

/// Whether a rule evaluates hidden candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisibilityPolicy {
    /// Candidates the visibility oracle marks hidden are skipped.
    #[default]
    SkipHidden,
    /// Hidden candidates are evaluated like any other.
    IncludeHidden,
}

/// Presentation metadata carried opaquely for the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMetadata {
    /// Human title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Remediation summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    /// Affected-disability or WCAG tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Any further host-defined fields.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

/// A check reference in a definition: either a concrete check or an id to
/// resolve against a [`CheckRegistry`].
#[derive(Clone)]
enum CheckSpec {
    Resolved(CheckRef),
    Named(String),
}

/// Builder form of a rule, validated by [`Rule::compile`].
#[derive(Clone)]
pub struct RuleDefinition {
    slug: String,
    selectors: Vec<String>,
    checks: Vec<CheckSpec>,
    mode: CombinationMode,
    visibility: VisibilityPolicy,
    severity: Severity,
    metadata: RuleMetadata,
}

impl RuleDefinition {
    /// Starts a definition with the given slug.
    #[must_use]
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            selectors: Vec::new(),
            checks: Vec::new(),
            mode: CombinationMode::default(),
            visibility: VisibilityPolicy::default(),
            severity: Severity::Error,
            metadata: RuleMetadata::default(),
        }
    }

    /// Adds a candidate selector. A selector list (`a, b`) is allowed.
    #[must_use]
    pub fn selector(mut self, selector: impl Into<String>) -> Self {
        self.selectors.push(selector.into());
        self
    }

    /// Appends a check.
    #[must_use]
    pub fn check(mut self, check: impl Check + 'static) -> Self {
        self.checks.push(CheckSpec::Resolved(Arc::new(check)));
        self
    }

    /// Appends a shared check.
    #[must_use]
    pub fn check_ref(mut self, check: CheckRef) -> Self {
        self.checks.push(CheckSpec::Resolved(check));
        self
    }

    /// Appends a check by id, resolved at registration.
    #[must_use]
    pub fn check_id(mut self, id: impl Into<String>) -> Self {
        self.checks.push(CheckSpec::Named(id.into()));
        self
    }

    /// Sets the combination mode.
    #[must_use]
    pub fn mode(mut self, mode: CombinationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the visibility policy.
    #[must_use]
    pub fn visibility(mut self, visibility: VisibilityPolicy) -> Self {
        self.visibility = visibility;
        self
    }

    /// Sets the default severity.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Attaches presentation metadata.
    #[must_use]
    pub fn metadata(mut self, metadata: RuleMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Sets the metadata title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.metadata.title = Some(title.into());
        self
    }

    /// Returns the slug.
    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }
}

impl std::fmt::Debug for RuleDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleDefinition")
            .field("slug", &self.slug)
            .field("selectors", &self.selectors)
            .field("checks", &self.checks.len())
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

/// Registration-time rule errors.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum RuleError {
    /// Slug is empty.
    #[error("rule slug is empty")]
    #[diagnostic(code(a11y_audit::rule::empty_slug))]
    EmptySlug,

    /// Slug contains characters outside `[a-z0-9_-]` or does not start with a letter.
    #[error("invalid rule slug `{slug}`")]
    #[diagnostic(
        code(a11y_audit::rule::invalid_slug),
        help("slugs are lowercase ASCII letters, digits, `_` or `-`, starting with a letter")
    )]
    InvalidSlug {
        /// The rejected slug.
        slug: String,
    },

    /// No selectors were given.
    #[error("rule `{slug}` has no selectors")]
    #[diagnostic(code(a11y_audit::rule::no_selectors))]
    NoSelectors {
        /// Rule slug.
        slug: String,
    },

    /// A selector failed validation.
    #[error("rule `{slug}`: {source}")]
    #[diagnostic(
        code(a11y_audit::rule::invalid_selector),
        help("supported: type, *, #id, .class, [attr], [attr op value], lists, descendant and child combinators")
    )]
    InvalidSelector {
        /// Rule slug.
        slug: String,
        /// Selector failure.
        #[source]
        source: SelectorError,
    },

    /// No checks were given.
    #[error("rule `{slug}` has no checks")]
    #[diagnostic(code(a11y_audit::rule::no_checks))]
    NoChecks {
        /// Rule slug.
        slug: String,
    },

    /// A check id could not be resolved.
    #[error("rule `{slug}` references unknown check `{check}`")]
    #[diagnostic(
        code(a11y_audit::rule::unknown_check),
        help("run `a11y-audit list-rules --checks` to see available check ids")
    )]
    UnknownCheck {
        /// Rule slug.
        slug: String,
        /// The unresolved id.
        check: String,
    },

    /// A rule with the same slug is already registered.
    #[error("rule `{slug}` is already registered")]
    #[diagnostic(code(a11y_audit::rule::duplicate))]
    DuplicateRule {
        /// Rule slug.
        slug: String,
    },
}

/// A validated, immutable rule.
#[derive(Clone)]
pub struct Rule {
    slug: String,
    selectors: Vec<CandidateSelector>,
    checks: Vec<CheckRef>,
    mode: CombinationMode,
    visibility: VisibilityPolicy,
    severity: Severity,
    metadata: RuleMetadata,
}

impl Rule {
    /// Validates a definition, resolving check ids against `checks`.
    ///
    /// # Errors
    ///
    /// Returns the first [`RuleError`] found.
    pub fn compile(def: RuleDefinition, checks: &CheckRegistry) -> Result<Self, RuleError> {
        validate_slug(&def.slug)?;
        let slug = def.slug;

        if def.selectors.is_empty() {
            return Err(RuleError::NoSelectors { slug });
        }
        let mut selectors = Vec::with_capacity(def.selectors.len());
        for raw in &def.selectors {
            match CandidateSelector::parse(raw) {
                Ok(selector) => selectors.push(selector),
                Err(source) => return Err(RuleError::InvalidSelector { slug, source }),
            }
        }

        if def.checks.is_empty() {
            return Err(RuleError::NoChecks { slug });
        }
        let mut resolved = Vec::with_capacity(def.checks.len());
        for spec in def.checks {
            match spec {
                CheckSpec::Resolved(check) => resolved.push(check),
                CheckSpec::Named(id) => match checks.get(&id) {
                    Some(check) => resolved.push(check),
                    None => return Err(RuleError::UnknownCheck { slug, check: id }),
                },
            }
        }

        Ok(Self {
            slug,
            selectors,
            checks: resolved,
            mode: def.mode,
            visibility: def.visibility,
            severity: def.severity,
            metadata: def.metadata,
        })
    }

    /// Stable slug.
    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Candidate selectors.
    #[must_use]
    pub fn selectors(&self) -> &[CandidateSelector] {
        &self.selectors
    }

    /// Checks in evaluation order.
    #[must_use]
    pub fn checks(&self) -> &[CheckRef] {
        &self.checks
    }

    /// Combination mode.
    #[must_use]
    pub fn mode(&self) -> CombinationMode {
        self.mode
    }

    /// Visibility policy.
    #[must_use]
    pub fn visibility(&self) -> VisibilityPolicy {
        self.visibility
    }

    /// Default severity.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Presentation metadata.
    #[must_use]
    pub fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    /// Returns true if any check needs animated-image results.
    #[must_use]
    pub fn requires_animation_results(&self) -> bool {
        self.checks
            .iter()
            .any(|c| c.requires() == Requirement::AnimationResults)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("slug", &self.slug)
            .field(
                "selectors",
                &self.selectors.iter().map(CandidateSelector::as_str).collect::<Vec<_>>(),
            )
            .field("checks", &self.checks.iter().map(|c| c.id()).collect::<Vec<_>>())
            .field("mode", &self.mode)
            .field("visibility", &self.visibility)
            .field("severity", &self.severity)
            .finish()
    }
}

fn validate_slug(slug: &str) -> Result<(), RuleError> {
    if slug.is_empty() {
        return Err(RuleError::EmptySlug);
    }
    let mut chars = slug.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_lowercase());
    let rest_ok =
        chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    if starts_with_letter && rest_ok {
        Ok(())
    } else {
        Err(RuleError::InvalidSlug {
            slug: slug.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{CheckError, FnCheck};
    use crate::context::ScanContext;
    use scraper::ElementRef;

    fn pass(_: ElementRef<'_>, _: &mut ScanContext<'_>) -> Result<Verdict, CheckError> {
        Ok(Verdict::Pass)
    }

    const PASS: FnCheck = FnCheck::new("pass", "", pass);

    #[test]
    fn all_must_pass_combination() {
        use Verdict::{Fail, Inapplicable, Pass};
        let mode = CombinationMode::AllMustPass;
        assert_eq!(mode.combine([Pass, Fail]), Fail);
        assert_eq!(mode.combine([Pass, Inapplicable]), Pass);
        assert_eq!(mode.combine([Inapplicable, Inapplicable]), Inapplicable);
        assert_eq!(mode.combine([]), Inapplicable);
    }

    #[test]
    fn any_must_pass_combination() {
        use Verdict::{Fail, Inapplicable, Pass};
        let mode = CombinationMode::AnyMustPass;
        assert_eq!(mode.combine([Fail, Pass]), Pass);
        assert_eq!(mode.combine([Fail, Inapplicable]), Fail);
        assert_eq!(mode.combine([Inapplicable]), Inapplicable);
    }

    #[test]
    fn compile_valid_rule() {
        let rule = Rule::compile(
            RuleDefinition::new("img_alt_missing")
                .selector("img, input[type=image]")
                .check(PASS)
                .severity(Severity::Warning),
            &CheckRegistry::new(),
        )
        .expect("valid");
        assert_eq!(rule.slug(), "img_alt_missing");
        assert_eq!(rule.severity(), Severity::Warning);
        assert_eq!(rule.mode(), CombinationMode::AllMustPass);
        assert_eq!(rule.visibility(), VisibilityPolicy::SkipHidden);
        assert!(!rule.requires_animation_results());
    }

    #[test]
    fn compile_rejects_bad_slugs() {
        let checks = CheckRegistry::new();
        let err = Rule::compile(RuleDefinition::new("").selector("a").check(PASS), &checks);
        assert!(matches!(err, Err(RuleError::EmptySlug)));
        let err = Rule::compile(RuleDefinition::new("Bad Slug").selector("a").check(PASS), &checks);
        assert!(matches!(err, Err(RuleError::InvalidSlug { .. })));
    }

    #[test]
    fn compile_rejects_missing_parts() {
        let checks = CheckRegistry::new();
        let err = Rule::compile(RuleDefinition::new("r").check(PASS), &checks);
        assert!(matches!(err, Err(RuleError::NoSelectors { .. })));
        let err = Rule::compile(RuleDefinition::new("r").selector("a"), &checks);
        assert!(matches!(err, Err(RuleError::NoChecks { .. })));
    }

    #[test]
    fn compile_rejects_bad_selector_loudly() {
        let err = Rule::compile(
            RuleDefinition::new("r").selector("a:focus").check(PASS),
            &CheckRegistry::new(),
        );
        assert!(matches!(err, Err(RuleError::InvalidSelector { .. })));
    }

    #[test]
    fn compile_resolves_named_checks() {
        let mut checks = CheckRegistry::new();
        checks.register(PASS);
        let rule = Rule::compile(RuleDefinition::new("r").selector("a").check_id("pass"), &checks)
            .expect("resolved");
        assert_eq!(rule.checks()[0].id(), "pass");

        let err = Rule::compile(RuleDefinition::new("r").selector("a").check_id("nope"), &checks);
        assert!(matches!(err, Err(RuleError::UnknownCheck { check, .. }) if check == "nope"));
    }
}
