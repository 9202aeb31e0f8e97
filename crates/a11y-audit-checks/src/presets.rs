//! Rule presets for common configurations.

use crate::catalog::{BuiltinRule, BUILTIN_RULES};
use a11y_audit_core::{RuleDefinition, Severity};
use serde::Deserialize;

/// Preset configurations for a11y-audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Errors and warnings, without the advisory presence rules.
    #[default]
    Recommended,
    /// Every rule.
    Strict,
    /// Error-severity rules only, for gradual adoption.
    Minimal,
}

impl Preset {
    /// Returns true if `rule` belongs to this preset.
    #[must_use]
    pub fn includes(self, rule: &BuiltinRule) -> bool {
        match self {
            Self::Strict => true,
            Self::Recommended => !rule.advisory && rule.severity >= Severity::Warning,
            Self::Minimal => rule.severity == Severity::Error,
        }
    }

    /// Catalog entries in this preset, in registration order.
    #[must_use]
    pub fn entries(self) -> Vec<&'static BuiltinRule> {
        BUILTIN_RULES.iter().filter(|r| self.includes(r)).collect()
    }

    /// Returns the rule definitions for this preset.
    #[must_use]
    pub fn rules(self) -> Vec<RuleDefinition> {
        self.entries().into_iter().map(BuiltinRule::definition).collect()
    }
}

impl std::str::FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "recommended" => Ok(Self::Recommended),
            "strict" => Ok(Self::Strict),
            "minimal" => Ok(Self::Minimal),
            other => Err(format!(
                "unknown preset `{other}`, expected: minimal, recommended, strict"
            )),
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Recommended => write!(f, "recommended"),
            Self::Strict => write!(f, "strict"),
            Self::Minimal => write!(f, "minimal"),
        }
    }
}

/// Returns the recommended set of rules.
#[must_use]
pub fn recommended_rules() -> Vec<RuleDefinition> {
    Preset::Recommended.rules()
}

/// Returns the strict set of rules.
#[must_use]
pub fn strict_rules() -> Vec<RuleDefinition> {
    Preset::Strict.rules()
}

/// Returns the minimal set of rules.
#[must_use]
pub fn minimal_rules() -> Vec<RuleDefinition> {
    Preset::Minimal.rules()
}

/// Returns all available rules.
#[must_use]
pub fn all_rules() -> Vec<RuleDefinition> {
    BUILTIN_RULES.iter().map(BuiltinRule::definition).collect()
}
