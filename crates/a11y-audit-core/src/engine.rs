//! The composition engine: runs selected rules against a document.

use crate::check::{Check, Verdict};
use crate::config::Config;
use crate::context::ScanContext;
use crate::document::Document;
use crate::registry::RuleRegistry;
use crate::rule::{Rule, RuleDefinition, RuleError, VisibilityPolicy};
use crate::selector::find_candidates;
use crate::store::{CrossElementStore, ScanStores};
use crate::types::{CheckFailure, ElementLocation, ScanReport, Violation};
use crate::utils::paths::element_path;
use crate::verifier::AnimationResults;
use crate::visibility::Visibility;
use ego_tree::NodeId;
use miette::Diagnostic;
use scraper::ElementRef;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, info, trace, warn};

/// Scan-level failures. Individual check failures never surface here.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum ScanError {
    /// The requested subtree root is not an element of the document.
    #[error("scan root {0:?} is not an element of the document")]
    #[diagnostic(code(a11y_audit::scan::unknown_root))]
    UnknownRoot(NodeId),

    /// A selected rule depends on the animated-image pre-scan, which has
    /// not been supplied.
    #[error("rule `{rule}` requires animated-image results")]
    #[diagnostic(
        code(a11y_audit::scan::resources_not_ready),
        help("await AnimationVerifier::pre_scan and pass the results with ScanRequest::animations")
    )]
    MissingAnimationResults {
        /// First rule that needed the results.
        rule: String,
    },
}

/// Where the engine is within a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanPhase {
    /// No scan in progress.
    #[default]
    Idle,
    /// Resolving a rule's candidates.
    CollectingCandidates,
    /// Running checks on candidates.
    EvaluatingChecks,
    /// Folding a rule's results into the report.
    Aggregating,
}

/// Parameters for one scan.
#[derive(Debug, Clone, Default)]
pub struct ScanRequest<'a> {
    root: Option<NodeId>,
    rules: Option<Vec<String>>,
    animations: Option<&'a AnimationResults>,
}

impl<'a> ScanRequest<'a> {
    /// Scans the whole document with every registered rule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts candidates to the subtree rooted at `node` (inclusive).
    #[must_use]
    pub fn root(mut self, node: NodeId) -> Self {
        self.root = Some(node);
        self
    }

    /// Runs only the listed rules.
    #[must_use]
    pub fn rules<I, S>(mut self, slugs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules = Some(slugs.into_iter().map(Into::into).collect());
        self
    }

    /// Supplies completed animated-image results.
    #[must_use]
    pub fn animations(mut self, results: &'a AnimationResults) -> Self {
        self.animations = Some(results);
        self
    }
}

/// Builder for an [`Engine`].
#[derive(Debug, Default)]
pub struct EngineBuilder {
    registry: Option<RuleRegistry>,
    config: Option<Config>,
    stores: Option<ScanStores>,
}

impl EngineBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the rule registry.
    #[must_use]
    pub fn registry(mut self, registry: RuleRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Sets the configuration (rule enable flags, severity overrides, options).
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Injects store instances.
    #[must_use]
    pub fn stores(mut self, stores: ScanStores) -> Self {
        self.stores = Some(stores);
        self
    }

    /// Builds the engine.
    #[must_use]
    pub fn build(self) -> Engine {
        Engine {
            registry: self.registry.unwrap_or_default(),
            stores: self.stores.unwrap_or_default(),
            config: self.config.unwrap_or_default(),
            phase: ScanPhase::Idle,
        }
    }
}

/// Runs rules against documents.
///
/// Use [`Engine::builder()`] to construct an instance. The engine owns its
/// cross-element stores and clears them at the start of every scan.
#[derive(Debug)]
pub struct Engine {
    registry: RuleRegistry,
    stores: ScanStores,
    config: Config,
    phase: ScanPhase,
}

impl Engine {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// The rule catalog.
    #[must_use]
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Mutable access to the rule catalog.
    pub fn registry_mut(&mut self) -> &mut RuleRegistry {
        &mut self.registry
    }

    /// Registers a rule definition.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleError`] if the definition is rejected.
    pub fn register(&mut self, definition: RuleDefinition) -> Result<(), RuleError> {
        self.registry.register(definition).map(|_| ())
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The cross-element stores as left by the last scan.
    #[must_use]
    pub fn stores(&self) -> &ScanStores {
        &self.stores
    }

    /// Empties the cross-element stores.
    pub fn clear_stores(&mut self) {
        self.stores.clear();
    }

    /// Current phase; [`ScanPhase::Idle`] outside of a scan.
    #[must_use]
    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    /// Scans the whole document with every enabled rule.
    ///
    /// # Errors
    ///
    /// See [`Engine::run_scan`].
    pub fn scan(&mut self, document: &Document) -> Result<ScanReport, ScanError> {
        self.run_scan(document, &ScanRequest::new())
    }

    /// Runs a scan.
    ///
    /// Rules run in registration order and candidates in document order,
    /// so reports are reproducible for an unchanged document.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::UnknownRoot`] for a root outside the document,
    /// or [`ScanError::MissingAnimationResults`] when a selected rule needs
    /// pre-scan results that were not supplied.
    pub fn run_scan(
        &mut self,
        document: &Document,
        request: &ScanRequest<'_>,
    ) -> Result<ScanReport, ScanError> {
        let root = match request.root {
            Some(node) => document.element(node).ok_or(ScanError::UnknownRoot(node))?,
            None => document.root_element(),
        };

        let config = &self.config;
        let selected: Vec<&Rule> = self
            .registry
            .select(request.rules.as_deref())
            .into_iter()
            .filter(|rule| {
                let enabled = config.is_rule_enabled(rule.slug());
                if !enabled {
                    debug!(rule = rule.slug(), "skipping disabled rule");
                }
                enabled
            })
            .collect();

        if request.animations.is_none() {
            if let Some(rule) = selected.iter().find(|r| r.requires_animation_results()) {
                return Err(ScanError::MissingAnimationResults {
                    rule: rule.slug().to_string(),
                });
            }
        }

        info!(rules = selected.len(), "starting scan");
        self.stores.clear();

        let visibility = Visibility::new(document);
        let mut report = ScanReport::new();
        let mut ctx =
            ScanContext::new(document, &mut self.stores).with_animations(request.animations);

        for rule in selected {
            let slug = rule.slug();
            ctx.enter_rule(slug, config.rule_config(slug));

            enter(&mut self.phase, ScanPhase::CollectingCandidates, slug);
            let candidates = find_candidates(root, rule.selectors());

            enter(&mut self.phase, ScanPhase::EvaluatingChecks, slug);
            let severity = config.rule_severity(slug).unwrap_or_else(|| rule.severity());
            let mut found = Vec::new();
            for candidate in candidates {
                if rule.visibility() == VisibilityPolicy::SkipHidden
                    && visibility.is_effectively_hidden(candidate)
                {
                    trace!(
                        rule = slug,
                        path = %element_path(candidate),
                        "skipping hidden candidate"
                    );
                    report.skipped_hidden += 1;
                    continue;
                }
                report.candidates_evaluated += 1;

                let mut verdicts = Vec::with_capacity(rule.checks().len());
                let mut failed = Vec::new();
                for check in rule.checks() {
                    let verdict =
                        run_check(check.as_ref(), candidate, &mut ctx, &mut report.check_failures);
                    if verdict.is_fail() {
                        failed.push(check.id().to_string());
                    }
                    verdicts.push(verdict);
                }

                if rule.mode().combine(verdicts).is_fail() {
                    found.push(
                        Violation::new(slug, severity, ElementLocation::of(candidate))
                            .with_failed_checks(failed)
                            .with_title(rule.metadata().title.clone()),
                    );
                }
            }

            enter(&mut self.phase, ScanPhase::Aggregating, slug);
            debug!(rule = slug, violations = found.len(), "rule complete");
            report.violations.extend(found);
            report.rules_run += 1;
        }

        enter(&mut self.phase, ScanPhase::Idle, "");
        info!(
            violations = report.violations.len(),
            candidates = report.candidates_evaluated,
            "scan complete"
        );
        Ok(report)
    }
}

fn enter(phase: &mut ScanPhase, next: ScanPhase, rule: &str) {
    trace!(from = ?*phase, to = ?next, rule, "scan phase");
    *phase = next;
}

/// Evaluates one check, converting errors and panics into `Inapplicable`.
fn run_check(
    check: &dyn Check,
    element: ElementRef<'_>,
    ctx: &mut ScanContext<'_>,
    failures: &mut Vec<CheckFailure>,
) -> Verdict {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| check.evaluate(element, ctx)));
    let message = match outcome {
        Ok(Ok(verdict)) => return verdict,
        Ok(Err(error)) => error.to_string(),
        Err(payload) => format!("check panicked: {}", panic_message(payload.as_ref())),
    };
    let path = element_path(element);
    warn!(
        rule = ctx.rule(),
        check = check.id(),
        %path,
        %message,
        "check failed; treating as inapplicable"
    );
    failures.push(CheckFailure {
        rule: ctx.rule().to_string(),
        check: check.id().to_string(),
        path,
        message,
    });
    Verdict::Inapplicable
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
