//! The host-side audit pipeline.

use a11y_audit_checks::{registry, Preset};
use a11y_audit_core::declarative::{self, LoadRulesError};
use a11y_audit_core::verifier::FetchError;
use a11y_audit_core::{
    AnimationResults, AnimationVerifier, Config, ConfigError, Document, Engine, RuleError,
    ScanError, ScanReport, ScanRequest, Severity,
};
use miette::Diagnostic;
use url::Url;

/// Failures while preparing or running an audit.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum AuditError {
    /// The configuration could not be read or holds invalid values.
    #[error(transparent)]
    #[diagnostic(code(a11y_audit::config))]
    Config(#[from] ConfigError),

    /// The configured preset is unknown.
    #[error("{0}")]
    #[diagnostic(code(a11y_audit::config::preset))]
    Preset(String),

    /// A `[[custom-rule]]` section is invalid.
    #[error(transparent)]
    #[diagnostic(code(a11y_audit::custom_rule))]
    CustomRules(#[from] LoadRulesError),

    /// A built-in rule failed validation.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Rule(#[from] RuleError),

    /// The HTTP client for the animated-image pre-scan could not be built.
    #[error(transparent)]
    #[diagnostic(code(a11y_audit::fetch))]
    Fetch(#[from] FetchError),

    /// The scan itself failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Scan(#[from] ScanError),
}

/// Resolves the effective preset: explicit argument > config > default.
fn resolve_preset(explicit: Option<&str>, config: &Config) -> Result<Preset, AuditError> {
    match explicit.or(config.preset.as_deref()) {
        None => Ok(Preset::default()),
        Some(name) => name.parse().map_err(AuditError::Preset),
    }
}

/// Configured engine plus the animated-image verifier.
///
/// The verifier cache lives as long as the auditor, so auditing many pages
/// fetches each image once.
#[derive(Debug)]
pub struct Auditor {
    engine: Engine,
    verifier: Option<AnimationVerifier>,
    base_url: Option<Url>,
    fail_on: Severity,
    preset: Preset,
    rules: Option<Vec<String>>,
}

impl Auditor {
    /// Builds an auditor from a parsed config and the raw TOML it came
    /// from (for `[[custom-rule]]` sections).
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown preset or severity, an invalid base
    /// URL, a malformed custom rule, or an HTTP client that cannot start.
    pub fn new(config: Config, content: &str, preset: Option<&str>) -> Result<Self, AuditError> {
        let preset = resolve_preset(preset, &config)?;
        let fail_on = config.fail_on_severity()?;
        let base_url = config.scan.parsed_base_url()?;

        let mut rules = registry(preset)?;
        let custom = if content.is_empty() {
            0
        } else {
            declarative::register_custom_rules(&mut rules, content)?
        };

        let verifier = if config.scan.fetch_remote {
            Some(AnimationVerifier::new()?)
        } else {
            None
        };

        tracing::debug!(%preset, rules = rules.len(), custom, "auditor configured");
        let engine = Engine::builder().registry(rules).config(config).build();
        Ok(Self {
            engine,
            verifier,
            base_url,
            fail_on,
            preset,
            rules: None,
        })
    }

    /// Builds an auditor from TOML configuration text.
    ///
    /// # Errors
    ///
    /// See [`Auditor::new`].
    pub fn from_toml(content: &str) -> Result<Self, AuditError> {
        let config = if content.trim().is_empty() {
            Config::default()
        } else {
            Config::parse(content)?
        };
        Self::new(config, content, None)
    }

    /// Parses `html`, applying the configured base URL.
    #[must_use]
    pub fn document(&self, html: &str) -> Document {
        let document = Document::parse(html);
        match &self.base_url {
            Some(base) if document.base_url().is_none() => document.with_base_url(base.clone()),
            _ => document,
        }
    }

    /// The underlying engine.
    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Mutable access to the engine, e.g. to register more rules.
    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    /// Severity at which a report counts as failing.
    #[must_use]
    pub fn fail_on(&self) -> Severity {
        self.fail_on
    }

    /// The preset the registry was built from.
    #[must_use]
    pub fn preset(&self) -> Preset {
        self.preset
    }

    /// Restricts later audits to the listed rule slugs.
    #[must_use]
    pub fn only_rules<I, S>(mut self, slugs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules = Some(slugs.into_iter().map(Into::into).collect());
        self
    }

    /// Returns true if an enabled, selected rule consumes pre-scan results.
    #[must_use]
    pub fn needs_pre_scan(&self) -> bool {
        let config = self.engine.config();
        self.engine
            .registry()
            .select(self.rules.as_deref())
            .into_iter()
            .any(|rule| rule.requires_animation_results() && config.is_rule_enabled(rule.slug()))
    }

    /// Runs the pre-scan (when fetching is enabled and a rule needs it) and
    /// then every enabled rule.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Scan`] if the scan cannot start.
    pub async fn audit(&mut self, document: &Document) -> Result<ScanReport, AuditError> {
        let timeout = self.engine.config().scan.animation_timeout();
        let results = match &self.verifier {
            Some(verifier) if self.needs_pre_scan() => verifier.pre_scan(document, timeout).await,
            _ => AnimationResults::unverified(),
        };
        self.scan_with(document, &results)
    }

    /// Runs every enabled rule without fetching anything; images are
    /// never reported as animated.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Scan`] if the scan cannot start.
    pub fn audit_offline(&mut self, document: &Document) -> Result<ScanReport, AuditError> {
        self.scan_with(document, &AnimationResults::unverified())
    }

    fn scan_with(
        &mut self,
        document: &Document,
        results: &AnimationResults,
    ) -> Result<ScanReport, AuditError> {
        let mut request = ScanRequest::new().animations(results);
        if let Some(rules) = &self.rules {
            request = request.rules(rules.iter().cloned());
        }
        Ok(self.engine.run_scan(document, &request)?)
    }
}

/// Audits `html` with `preset` as part of `cargo test`, without network
/// access.
///
/// # Panics
///
/// Panics with a formatted report if violations at `error` severity are
/// found, or if the preset is unknown.
pub fn assert_accessible(html: &str, preset: &str) {
    let config = Config {
        preset: Some(preset.to_string()),
        scan: a11y_audit_core::ScanConfig {
            fetch_remote: false,
            ..Default::default()
        },
        ..Config::default()
    };
    let mut auditor = Auditor::new(config, "", None)
        .unwrap_or_else(|e| panic!("a11y-audit: failed to configure auditor: {e}"));
    let document = auditor.document(html);
    let report = auditor
        .audit_offline(&document)
        .unwrap_or_else(|e| panic!("a11y-audit: scan failed: {e}"));

    if report.has_violations_at(auditor.fail_on()) {
        panic!("{}", report.format_test_report(auditor.fail_on()));
    }
}
