//! Core types for violations and scan reports.

use crate::utils::paths::{element_path, element_snippet};
use ego_tree::NodeId;
use scraper::ElementRef;
use serde::{Deserialize, Serialize};

/// Severity classification for violations.
///
/// Downstream scoring depends on this mapping, so every built-in rule
/// declares one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational, needs manual review.
    Info,
    /// Should be addressed.
    Warning,
    /// Must be fixed.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown severity `{other}`, expected: error, warning, info")),
        }
    }
}

/// Where a violating element lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementLocation {
    /// Structural path from the root, e.g. `html > body > div:nth-of-type(2) > img`.
    pub path: String,
    /// Truncated outer HTML.
    pub snippet: String,
    /// Tree node id, valid for the scanned document only.
    #[serde(skip)]
    pub node: Option<NodeId>,
}

impl ElementLocation {
    /// Describes `element`.
    #[must_use]
    pub fn of(element: ElementRef<'_>) -> Self {
        Self {
            path: element_path(element),
            snippet: element_snippet(element),
            node: Some(element.id()),
        }
    }
}

/// A candidate that failed its rule's combined checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Rule slug (e.g., `img_alt_missing`).
    pub rule: String,
    /// Effective severity after configuration overrides.
    pub severity: Severity,
    /// The failing element.
    pub location: ElementLocation,
    /// Ids of checks that returned `fail`.
    pub failed_checks: Vec<String>,
    /// Rule title, if the rule carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Violation {
    /// Creates a violation.
    #[must_use]
    pub fn new(rule: impl Into<String>, severity: Severity, location: ElementLocation) -> Self {
        Self {
            rule: rule.into(),
            severity,
            location,
            failed_checks: Vec::new(),
            title: None,
        }
    }

    /// Records the failing check ids.
    #[must_use]
    pub fn with_failed_checks(mut self, checks: Vec<String>) -> Self {
        self.failed_checks = checks;
        self
    }

    /// Attaches the rule title.
    #[must_use]
    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    /// Formats the violation for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = format!("{} at {}\n", self.rule, self.location.path);
        let _ = writeln!(
            output,
            "  {}: {}",
            self.severity,
            self.title.as_deref().unwrap_or("accessibility violation")
        );
        let _ = writeln!(output, "  | {}", self.location.snippet);
        if !self.failed_checks.is_empty() {
            let _ = writeln!(output, "  = failed: {}", self.failed_checks.join(", "));
        }
        output
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} [{}]", self.location.path, self.severity, self.rule)?;
        if let Some(title) = &self.title {
            write!(f, " {title}")?;
        }
        Ok(())
    }
}

/// A check that errored or panicked and was treated as inapplicable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckFailure {
    /// Rule being evaluated.
    pub rule: String,
    /// Check that failed.
    pub check: String,
    /// Element path.
    pub path: String,
    /// Error or panic message.
    pub message: String,
}

/// Result of one scan.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// Violations in rule order, then document order.
    pub violations: Vec<Violation>,
    /// Recovered check failures.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub check_failures: Vec<CheckFailure>,
    /// Rules executed.
    pub rules_run: usize,
    /// Candidates passed to checks.
    pub candidates_evaluated: usize,
    /// Candidates skipped by the visibility policy.
    pub skipped_hidden: usize,
}

impl ScanReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.has_violations_at(Severity::Error)
    }

    /// Returns true if any violation meets or exceeds `severity`.
    #[must_use]
    pub fn has_violations_at(&self, severity: Severity) -> bool {
        self.violations.iter().any(|v| v.severity >= severity)
    }

    /// Returns violations for one rule.
    #[must_use]
    pub fn by_rule(&self, rule: &str) -> Vec<&Violation> {
        self.violations.iter().filter(|v| v.rule == rule).collect()
    }

    /// Returns the distinct rule slugs with violations, in report order.
    #[must_use]
    pub fn failing_rules(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for v in &self.violations {
            if !out.contains(&v.rule.as_str()) {
                out.push(&v.rule);
            }
        }
        out
    }

    /// Counts violations by severity as `(errors, warnings, infos)`.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        let count = |s: Severity| self.violations.iter().filter(|v| v.severity == s).count();
        (
            count(Severity::Error),
            count(Severity::Warning),
            count(Severity::Info),
        )
    }

    /// Formats a human-readable report of violations at or above `fail_on`.
    #[must_use]
    pub fn format_test_report(&self, fail_on: Severity) -> String {
        use std::fmt::Write;

        let failing: Vec<&Violation> = self
            .violations
            .iter()
            .filter(|v| v.severity >= fail_on)
            .collect();

        let mut report = String::new();
        let _ = writeln!(
            report,
            "\n=== a11y-audit: {} violation(s) ===\n",
            failing.len()
        );
        for v in &failing {
            let _ = writeln!(report, "{}", v.format());
        }

        let (errors, warnings, infos) = self.count_by_severity();
        let _ = writeln!(
            report,
            "Total: {errors} error(s), {warnings} warning(s), {infos} info(s) from {} rule(s)",
            self.rules_run
        );
        report
    }

    /// Merges another report into this one.
    pub fn extend(&mut self, other: Self) {
        self.violations.extend(other.violations);
        self.check_failures.extend(other.check_failures);
        self.rules_run += other.rules_run;
        self.candidates_evaluated += other.candidates_evaluated;
        self.skipped_hidden += other.skipped_hidden;
    }
}
