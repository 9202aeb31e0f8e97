//! DTO → [`RuleDefinition`] conversion with validation.

use crate::rule::{CombinationMode, RuleDefinition, RuleMetadata, VisibilityPolicy};
use crate::types::Severity;

use super::config_dto::{CustomRuleDto, DeclarativeConfigDto};

/// Errors during DTO → definition conversion.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Unknown severity string.
    #[error("{context}: unknown severity `{value}`, expected: error, warning, info")]
    UnknownSeverity {
        /// Where the error occurred.
        context: String,
        /// The invalid value.
        value: String,
    },

    /// Unknown combination mode string.
    #[error("{context}: unknown mode `{value}`, expected: all, any")]
    UnknownMode {
        /// Where the error occurred.
        context: String,
        /// The invalid value.
        value: String,
    },

    /// Two custom rules share a slug.
    #[error("custom-rule[{index}]: duplicate slug `{slug}`")]
    DuplicateSlug {
        /// Position of the second definition.
        index: usize,
        /// The repeated slug.
        slug: String,
    },
}

/// Converts a `DeclarativeConfigDto` into rule definitions.
///
/// Structural validation (slug format, selectors, check ids) happens when
/// the definitions are registered.
///
/// # Errors
///
/// Returns the first error encountered during conversion.
pub fn load(dto: DeclarativeConfigDto) -> Result<Vec<RuleDefinition>, LoadError> {
    let mut seen = std::collections::HashSet::new();
    dto.custom_rules
        .into_iter()
        .enumerate()
        .map(|(index, rule)| {
            if !seen.insert(rule.slug.clone()) {
                return Err(LoadError::DuplicateSlug {
                    index,
                    slug: rule.slug,
                });
            }
            convert_rule(rule, index)
        })
        .collect()
}

fn convert_rule(dto: CustomRuleDto, index: usize) -> Result<RuleDefinition, LoadError> {
    let ctx = format!("custom-rule[{index}] '{}'", dto.slug);
    let severity = parse_severity(&dto.severity, &ctx)?;
    let mode = parse_mode(&dto.mode, &ctx)?;
    let visibility = if dto.include_hidden {
        VisibilityPolicy::IncludeHidden
    } else {
        VisibilityPolicy::SkipHidden
    };

    let metadata = RuleMetadata {
        title: dto.title,
        help: dto.help,
        tags: dto.tags,
        extra: dto.metadata,
    };

    let definition = dto
        .selectors
        .into_iter()
        .fold(RuleDefinition::new(dto.slug), RuleDefinition::selector);
    let definition = dto
        .checks
        .into_iter()
        .fold(definition, RuleDefinition::check_id);

    Ok(definition
        .mode(mode)
        .visibility(visibility)
        .severity(severity)
        .metadata(metadata))
}

fn parse_severity(value: &str, context: &str) -> Result<Severity, LoadError> {
    match value {
        "error" => Ok(Severity::Error),
        "warning" => Ok(Severity::Warning),
        "info" => Ok(Severity::Info),
        _ => Err(LoadError::UnknownSeverity {
            context: context.to_string(),
            value: value.to_string(),
        }),
    }
}

fn parse_mode(value: &str, context: &str) -> Result<CombinationMode, LoadError> {
    match value {
        "all" => Ok(CombinationMode::AllMustPass),
        "any" => Ok(CombinationMode::AnyMustPass),
        _ => Err(LoadError::UnknownMode {
            context: context.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_and_load(toml_str: &str) -> Result<Vec<RuleDefinition>, LoadError> {
        let dto: DeclarativeConfigDto = toml::from_str(toml_str).unwrap();
        load(dto)
    }

    // -- Happy path --

    #[test]
    fn load_empty_config() {
        assert!(parse_and_load("").unwrap().is_empty());
    }

    #[test]
    fn load_rules_in_order() {
        let defs = parse_and_load(
            r#"
[[custom-rule]]
slug = "first"
selectors = ["marquee"]
checks = ["element_present"]

[[custom-rule]]
slug = "second"
selectors = ["blink"]
checks = ["element_present"]
severity = "error"
"#,
        )
        .unwrap();
        let slugs: Vec<_> = defs.iter().map(RuleDefinition::slug).collect();
        assert_eq!(slugs, vec!["first", "second"]);
    }

    // -- Error cases --

    #[test]
    fn load_rejects_unknown_severity() {
        let result = parse_and_load(
            r#"
[[custom-rule]]
slug = "bad"
selectors = ["a"]
checks = ["element_present"]
severity = "critical"
"#,
        );
        assert!(matches!(result, Err(LoadError::UnknownSeverity { .. })));
    }

    #[test]
    fn load_rejects_unknown_mode() {
        let result = parse_and_load(
            r#"
[[custom-rule]]
slug = "bad"
selectors = ["a"]
checks = ["element_present"]
mode = "most"
"#,
        );
        assert!(matches!(result, Err(LoadError::UnknownMode { .. })));
    }

    #[test]
    fn load_rejects_duplicate_slugs() {
        let result = parse_and_load(
            r#"
[[custom-rule]]
slug = "same"
selectors = ["a"]
checks = ["element_present"]

[[custom-rule]]
slug = "same"
selectors = ["b"]
checks = ["element_present"]
"#,
        );
        assert!(matches!(result, Err(LoadError::DuplicateSlug { index: 1, .. })));
    }
}
