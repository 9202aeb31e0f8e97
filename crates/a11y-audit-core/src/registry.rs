//! The rule catalog.

use crate::check::CheckRegistry;
use crate::rule::{Rule, RuleDefinition, RuleError};
use std::collections::HashSet;

/// Registered rules in registration order.
///
/// Constructed by the host and handed to the [`Engine`](crate::Engine);
/// there is no process-wide registry.
#[derive(Debug, Default, Clone)]
pub struct RuleRegistry {
    rules: Vec<Rule>,
    checks: CheckRegistry,
}

impl RuleRegistry {
    /// Creates an empty registry with no named checks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry that resolves check ids against `checks`.
    #[must_use]
    pub fn with_checks(checks: CheckRegistry) -> Self {
        Self {
            rules: Vec::new(),
            checks,
        }
    }

    /// Named checks available to definitions registered here.
    #[must_use]
    pub fn checks(&self) -> &CheckRegistry {
        &self.checks
    }

    /// Mutable access to the named checks.
    pub fn checks_mut(&mut self) -> &mut CheckRegistry {
        &mut self.checks
    }

    /// Validates and registers a definition.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleError`] if the definition is malformed or the slug
    /// is already taken.
    pub fn register(&mut self, definition: RuleDefinition) -> Result<&Rule, RuleError> {
        if self.contains(definition.slug()) {
            return Err(RuleError::DuplicateRule {
                slug: definition.slug().to_string(),
            });
        }
        let rule = Rule::compile(definition, &self.checks)?;
        self.insert(rule)
    }

    /// Registers an already compiled rule.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::DuplicateRule`] if the slug is taken.
    pub fn register_rule(&mut self, rule: Rule) -> Result<&Rule, RuleError> {
        if self.contains(rule.slug()) {
            return Err(RuleError::DuplicateRule {
                slug: rule.slug().to_string(),
            });
        }
        self.insert(rule)
    }

    fn insert(&mut self, rule: Rule) -> Result<&Rule, RuleError> {
        tracing::trace!(rule = rule.slug(), "registered rule");
        let index = self.rules.len();
        self.rules.push(rule);
        Ok(&self.rules[index])
    }

    /// Removes every rule, keeping named checks.
    pub fn reset(&mut self) {
        self.rules.clear();
    }

    /// Returns true if a rule with `slug` is registered.
    #[must_use]
    pub fn contains(&self, slug: &str) -> bool {
        self.get(slug).is_some()
    }

    /// Looks up a rule by slug.
    #[must_use]
    pub fn get(&self, slug: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.slug() == slug)
    }

    /// Iterates rules in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Selects rules to run, in registration order.
    ///
    /// With no allow-list every rule is selected. Unknown slugs in the
    /// allow-list are logged and skipped.
    #[must_use]
    pub fn select(&self, allow: Option<&[String]>) -> Vec<&Rule> {
        let Some(allow) = allow else {
            return self.rules.iter().collect();
        };
        let wanted: HashSet<&str> = allow.iter().map(String::as_str).collect();
        for slug in &wanted {
            if !self.contains(slug) {
                tracing::warn!(rule = *slug, "unknown rule in allow-list; skipping");
            }
        }
        self.rules
            .iter()
            .filter(|r| wanted.contains(r.slug()))
            .collect()
    }
}
