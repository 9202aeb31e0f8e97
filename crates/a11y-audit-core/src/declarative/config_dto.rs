//! TOML deserialization types (DTO layer).
//!
//! These types exist solely for serde deserialization.
//! They are converted to [`RuleDefinition`](crate::RuleDefinition)s by the
//! loader.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Raw TOML representation of declarative rules.
///
/// Extends the base `Config` with `[[custom-rule]]` sections.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeclarativeConfigDto {
    /// Custom rule definitions.
    #[serde(rename = "custom-rule", default)]
    pub custom_rules: Vec<CustomRuleDto>,
}

/// TOML representation of a custom rule.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomRuleDto {
    /// Rule slug (e.g., "no_marquee").
    pub slug: String,
    /// Candidate selectors.
    #[serde(default)]
    pub selectors: Vec<String>,
    /// Check ids from the check library, evaluated in order.
    #[serde(default)]
    pub checks: Vec<String>,
    /// Combination mode: "all" (default) or "any".
    #[serde(default = "default_mode_str")]
    pub mode: String,
    /// Evaluate hidden elements too.
    #[serde(default)]
    pub include_hidden: bool,
    /// Severity (default: "warning").
    #[serde(default = "default_severity_str")]
    pub severity: String,
    /// Human title.
    #[serde(default)]
    pub title: Option<String>,
    /// Remediation text.
    #[serde(default)]
    pub help: Option<String>,
    /// Tags passed through to reports.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Additional host metadata.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

fn default_mode_str() -> String {
    "all".to_string()
}

fn default_severity_str() -> String {
    "warning".to_string()
}
