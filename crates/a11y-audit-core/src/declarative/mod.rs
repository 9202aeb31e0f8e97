//! Declarative rules driven by TOML configuration.
//!
//! Hosts can bind library checks to their own selectors without writing
//! Rust code.
//!
//! # Architecture
//!
//! ```text
//! TOML text
//!   ↓ serde (DTO layer)
//! config_dto types
//!   ↓ convert (severity, mode)
//! Vec<RuleDefinition>
//!   ↓ RuleRegistry::register (slug, selectors, check ids)
//! Rule
//! ```

pub mod config_dto;
pub mod loader;

use crate::registry::RuleRegistry;
use crate::rule::{RuleDefinition, RuleError};

/// Errors from parsing TOML and loading declarative rules.
#[derive(Debug, thiserror::Error)]
pub enum LoadRulesError {
    /// TOML deserialization failed.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// DTO conversion failed.
    #[error("{0}")]
    Load(#[from] loader::LoadError),

    /// A definition was rejected at registration.
    #[error("{0}")]
    Rule(#[from] RuleError),
}

/// Parses TOML content into custom rule definitions.
///
/// Returns `Ok(vec![])` if no `[[custom-rule]]` sections are present.
///
/// # Errors
///
/// Returns an error if TOML parsing or conversion fails.
pub fn load_rules_from_toml(content: &str) -> Result<Vec<RuleDefinition>, LoadRulesError> {
    let dto: config_dto::DeclarativeConfigDto = toml::from_str(content)?;
    Ok(loader::load(dto)?)
}

/// Parses and registers every custom rule in `content`.
///
/// Returns the number of rules registered.
///
/// # Errors
///
/// Fails on the first definition that cannot be parsed or registered;
/// rules registered before it remain in `registry`.
pub fn register_custom_rules(
    registry: &mut RuleRegistry,
    content: &str,
) -> Result<usize, LoadRulesError> {
    let definitions = load_rules_from_toml(content)?;
    let count = definitions.len();
    for definition in definitions {
        registry.register(definition)?;
    }
    if count > 0 {
        tracing::debug!(count, "registered custom rules");
    }
    Ok(count)
}
